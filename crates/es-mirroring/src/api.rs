use async_trait::async_trait;

use crate::Result;
use crate::state::{InstanceDetails, MirroringTopicSelection};

/// Remote services the mirroring config resource talks to.
///
/// Every operation takes the admin endpoint explicitly, implementations
/// keep no per-instance state between calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventStreamsApi: Send + Sync {
    /// look up a service instance by id or CRN in the resource controller
    async fn instance_details(&self, instance_id: &str) -> Result<InstanceDetails>;

    /// current mirroring include patterns
    async fn topic_selection(&self, admin_url: &str) -> Result<MirroringTopicSelection>;

    /// replace the full set of include patterns, returns the stored selection
    async fn replace_topic_selection(
        &self,
        admin_url: &str,
        selection: &MirroringTopicSelection,
    ) -> Result<MirroringTopicSelection>;
}
