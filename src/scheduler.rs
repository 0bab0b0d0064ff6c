//! Background maintenance: periodic pruning of expired revocation
//! records. Pruning goes through the same store locks as
//! request-driven mutations of the blacklist.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};

use crate::config::SchedulerConfig;
use crate::services::TokenService;

pub struct Scheduler {
    tokens: Arc<TokenService>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(tokens: Arc<TokenService>, config: SchedulerConfig) -> Self {
        Self {
            tokens,
            config,
            running: Arc::new(RwLock::new(true)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if let Some(cron_expr) = self.config.cron_expression.clone() {
            self.run_with_cron(&cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    pub async fn stop(&self) {
        *self.running.write().await = false;
    }

    /// One pruning pass, also used by the startup sweep.
    pub async fn run_once(&self) -> Result<()> {
        prune_revocations(&self.tokens).await
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let tokens = Arc::clone(&self.tokens);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let tokens = Arc::clone(&tokens);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                if let Err(e) = prune_revocations(&tokens).await {
                    error!("Scheduled revocation pruning failed: {}", e);
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let interval_mins = self.config.prune_interval_minutes;

        info!("Scheduler pruning revocations every {} minutes", interval_mins);

        let mut prune_interval = interval(Duration::from_secs(u64::from(interval_mins) * 60));
        // The first tick fires immediately; the startup sweep already
        // ran via `run_once`, so consume it.
        prune_interval.tick().await;

        loop {
            prune_interval.tick().await;
            if !*self.running.read().await {
                break;
            }
            if let Err(e) = prune_revocations(&self.tokens).await {
                error!("Scheduled revocation pruning failed: {}", e);
            }
        }

        Ok(())
    }
}

async fn prune_revocations(tokens: &TokenService) -> Result<()> {
    let removed = tokens.prune_expired(Utc::now()).await?;
    if removed > 0 {
        info!("Pruned {} expired revocation record(s)", removed);
    } else {
        debug!("Revocation pruning pass found nothing to remove");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::models::RevokedToken;
    use chrono::Duration as ChronoDuration;

    async fn scheduler(dir: &tempfile::TempDir, config: SchedulerConfig) -> Scheduler {
        let store = Store::open(dir.path()).await.unwrap();
        let tokens = Arc::new(TokenService::new(
            b"scheduler-test-secret".to_vec(),
            3600,
            3600,
            Arc::new(store.clone()),
        ));

        store
            .revocations()
            .insert(RevokedToken {
                token: "lapsed".to_string(),
                expires_at: Utc::now() - ChronoDuration::minutes(5),
                revoked_at: Utc::now() - ChronoDuration::hours(2),
            })
            .await
            .unwrap();

        Scheduler::new(tokens, config)
    }

    #[tokio::test]
    async fn run_once_sweeps_lapsed_revocations() {
        let dir = tempfile::tempdir().unwrap();
        let sched = scheduler(&dir, SchedulerConfig::default()).await;

        sched.run_once().await.unwrap();

        let store = Store::open(dir.path()).await.unwrap();
        assert!(!store.revocations().contains("lapsed").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_interval_loop() {
        let dir = tempfile::tempdir().unwrap();
        let sched = Arc::new(
            scheduler(
                &dir,
                SchedulerConfig {
                    enabled: true,
                    prune_interval_minutes: 1,
                    cron_expression: None,
                },
            )
            .await,
        );

        let task = Arc::clone(&sched);
        let handle = tokio::spawn(async move { task.start().await });

        sched.stop().await;
        // Paused time auto-advances past the next tick, at which point
        // the loop observes the cleared flag and exits.
        handle.await.unwrap().unwrap();
    }
}
