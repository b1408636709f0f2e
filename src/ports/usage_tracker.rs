//! UsageTracker port - reads recorded resource usage.

use async_trait::async_trait;

use crate::domain::billing::UsageResource;
use crate::domain::foundation::{DomainError, UserId};

/// Port for reading how much of a metered resource a user has
/// consumed in the current period.
///
/// Recording usage happens elsewhere (the transcription pipeline);
/// billing only reads the totals to answer limit checks.
#[async_trait]
pub trait UsageTracker: Send + Sync {
    /// Returns the user's recorded usage for the resource.
    ///
    /// Users with no usage rows read as zero.
    async fn recorded_usage(
        &self,
        user_id: &UserId,
        resource: UsageResource,
    ) -> Result<i64, DomainError>;
}
