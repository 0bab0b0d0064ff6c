//! Bearer-token issuance, resolution and revocation.
//!
//! Tokens are HMAC-SHA256 signed: `base64url(subject \n issued_at_ms \n
//! hex(mac))`, with the mac computed over the first two parts. Expiry is
//! derived from the signed issuance instant, so an expired token is
//! recognizable without consulting the revocation store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{RevokedToken, User};

type HmacSha256 = Hmac<Sha256>;

/// Persistence capabilities the token manager needs: subject lookup and
/// the revocation set. Implemented by [`crate::db::Store`].
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn find_subject(&self, id: &str) -> Result<Option<User>>;
    async fn is_revoked(&self, token: &str) -> Result<bool>;
    async fn insert_revocation(&self, record: RevokedToken) -> Result<()>;
    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Outcome of resolving a token, in decreasing order of trust.
#[derive(Debug)]
pub enum TokenStatus {
    Valid(User),
    Expired,
    Revoked,
    Malformed,
    UnknownSubject,
}

struct Claims {
    subject: String,
    issued_at: DateTime<Utc>,
}

pub struct TokenService {
    secret: Vec<u8>,
    ttl: Duration,
    revocation_default_ttl: Duration,
    store: Arc<dyn TokenStore>,
}

impl TokenService {
    #[must_use]
    pub fn new(
        secret: Vec<u8>,
        ttl_seconds: u64,
        revocation_default_ttl_seconds: u64,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            secret,
            ttl: Duration::seconds(ttl_seconds.min(i64::MAX as u64) as i64),
            revocation_default_ttl: Duration::seconds(
                revocation_default_ttl_seconds.min(i64::MAX as u64) as i64,
            ),
            store,
        }
    }

    /// Issue a token for a subject. Millisecond issuance instants keep
    /// tokens unique per issuance.
    #[must_use]
    pub fn issue(&self, subject_id: &str, now: DateTime<Utc>) -> String {
        let payload = format!("{subject_id}\n{}", now.timestamp_millis());
        let sig = encode_hex(&self.sign(payload.as_bytes()));
        URL_SAFE_NO_PAD.encode(format!("{payload}\n{sig}"))
    }

    /// Resolve a token: structure and signature first, then expiry, then
    /// the blacklist, then the subject lookup. An unresolvable subject
    /// fails closed.
    pub async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<TokenStatus> {
        let Some(claims) = self.decode(token) else {
            return Ok(TokenStatus::Malformed);
        };

        if now >= claims.issued_at + self.ttl {
            return Ok(TokenStatus::Expired);
        }

        if self.store.is_revoked(token).await? {
            return Ok(TokenStatus::Revoked);
        }

        match self.store.find_subject(&claims.subject).await? {
            Some(user) => Ok(TokenStatus::Valid(user)),
            None => Ok(TokenStatus::UnknownSubject),
        }
    }

    /// Revoke a token. The record keeps the token's own expiry horizon
    /// when the token decodes, else a default horizon from now.
    /// Idempotent at the store level.
    pub async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<()> {
        let expires_at = match self.decode(token) {
            Some(claims) => claims.issued_at + self.ttl,
            None => now + self.revocation_default_ttl,
        };

        self.store
            .insert_revocation(RevokedToken {
                token: token.to_string(),
                expires_at,
                revoked_at: now,
            })
            .await
    }

    /// Drop revocation records whose expiry has passed.
    pub async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        self.store.prune_expired(now).await
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length.
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC key");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    fn decode(&self, token: &str) -> Option<Claims> {
        let raw = URL_SAFE_NO_PAD.decode(token).ok()?;
        let text = String::from_utf8(raw).ok()?;

        let mut parts = text.splitn(3, '\n');
        let subject = parts.next()?;
        let issued_ms: i64 = parts.next()?.parse().ok()?;
        let sig_hex = parts.next()?;

        let sig = decode_hex(sig_hex)?;
        let payload = format!("{subject}\n{issued_ms}");

        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig).ok()?;

        let issued_at = Utc.timestamp_millis_opt(issued_ms).single()?;
        Some(Claims {
            subject: subject.to_string(),
            issued_at,
        })
    }
}

/// Load the signing secret from config when set (hex), else from
/// `<data_dir>/token.secret`, generating and persisting a fresh one on
/// first start.
pub async fn load_or_generate_secret(config: &Config) -> Result<Vec<u8>> {
    if let Some(hex) = &config.security.token_secret {
        return decode_hex(hex.trim())
            .filter(|bytes| !bytes.is_empty())
            .context("security.token_secret is not valid hex");
    }

    let path = config.general.data_dir.join("token.secret");
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => decode_hex(contents.trim())
            .filter(|bytes| !bytes.is_empty())
            .with_context(|| format!("Corrupt secret file: {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let secret = generate_secret();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            tokio::fs::write(&path, encode_hex(&secret))
                .await
                .with_context(|| format!("Failed to write secret file: {}", path.display()))?;
            tracing::info!("Generated new token secret at {}", path.display());
            Ok(secret)
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read secret file: {}", path.display()))
        }
    }
}

/// Generate a random 32-byte signing secret.
#[must_use]
pub fn generate_secret() -> Vec<u8> {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    bytes.to_vec()
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut acc, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        },
    )
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
