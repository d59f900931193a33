mod sheets;

use async_trait::async_trait;

use crate::config::Destination;
use crate::error::PublishError;
use crate::record::OfferRecord;

pub use sheets::{GoogleSheets, ServiceAccountKey};

/// Replaces the contents of a destination tab with a fresh record set.
///
/// A publisher creates the tab when it does not exist, clears it when it does,
/// then writes `header` followed by one row per record.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn replace(
        &self,
        destination: &Destination,
        header: &[&str],
        records: &[OfferRecord],
    ) -> Result<(), PublishError>;
}
