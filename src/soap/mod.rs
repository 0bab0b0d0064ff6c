//! The envelope-based protocol: parser, operation registry, handlers,
//! response builder and the dispatcher that ties them together.

pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod ops;
pub mod registry;
pub mod response;

pub use dispatcher::{Dispatcher, SoapReply};
pub use error::OperationError;
