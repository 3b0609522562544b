use crate::model::error::Error;
use async_trait::async_trait;

/// Decides whether a backup may start right now, e.g. network or power checks.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn can_backup(&self) -> Result<bool, Error>;
}

/// Used when no check is configured, and as the fallback when a configured one fails.
pub struct DefaultChecker;

#[async_trait]
impl Checker for DefaultChecker {
    async fn can_backup(&self) -> Result<bool, Error> {
        Ok(true)
    }
}
