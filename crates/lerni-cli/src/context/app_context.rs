use std::future::Future;
use std::path::Path;

use anyhow::Context;
use lerni_config::LerniConfig;
use lerni_db::error::DatabaseError;
use lerni_db::retry::{RetryConfig, with_retry};
use lerni_db::service::{LerniService, ReviewPolicy};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: LerniService,
    pub config: LerniConfig,
    retry: RetryConfig,
}

impl AppContext {
    /// Open (creating if needed) the database under the resolved data directory.
    pub async fn init(config: LerniConfig, data_dir_override: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = match data_dir_override {
            Some(dir) => dir.to_path_buf(),
            None => config.data_dir()?,
        };
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let db_path = data_dir.join(lerni_db::DB_FILE_NAME);
        let db_path_str = db_path.to_string_lossy();
        let service = LerniService::new_local(&db_path_str, review_policy(&config)?)
            .await
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        tracing::debug!(path = %db_path.display(), "opened lerni database");

        Ok(Self {
            retry: retry_config(&config),
            service,
            config,
        })
    }

    /// Run a mutation, retrying while another process holds the database lock.
    pub async fn write<T, F, Fut>(&self, op: F) -> Result<T, DatabaseError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DatabaseError>>,
    {
        with_retry(&self.retry, op).await
    }
}

fn review_policy(config: &LerniConfig) -> anyhow::Result<ReviewPolicy> {
    let skip_delay = chrono::Duration::from_std(config.review.skip_delay())
        .context("review.skip_delay_hours is out of range")?;
    Ok(ReviewPolicy { skip_delay })
}

fn retry_config(config: &LerniConfig) -> RetryConfig {
    RetryConfig {
        max_attempts: config.storage.max_attempts,
        base_delay: config.storage.base_delay(),
        max_delay: config.storage.max_delay(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn storage_section_maps_to_retry_config() {
        let mut config = LerniConfig::default();
        config.storage.max_attempts = 7;
        config.storage.base_delay_ms = 25;
        config.storage.max_delay_ms = 500;

        let retry = retry_config(&config);
        assert_eq!(retry.max_attempts, 7);
        assert_eq!(retry.base_delay, Duration::from_millis(25));
        assert_eq!(retry.max_delay, Duration::from_millis(500));
    }

    #[test]
    fn skip_delay_follows_review_section() {
        let mut config = LerniConfig::default();
        config.review.skip_delay_hours = 6;
        let policy = review_policy(&config).unwrap();
        assert_eq!(policy.skip_delay, chrono::Duration::hours(6));
    }

    #[tokio::test]
    async fn init_creates_database_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested");
        let ctx = AppContext::init(LerniConfig::default(), Some(&data_dir))
            .await
            .unwrap();

        assert!(data_dir.join(lerni_db::DB_FILE_NAME).exists());
        assert!(ctx.service.list_concepts().await.unwrap().is_empty());
    }
}
