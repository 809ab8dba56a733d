use async_trait::async_trait;
use hoard_store::BlobFetcher;
use hoard_types::BlobRef;

use crate::error::GateError;
use crate::stage::{Hop, HopStage, ReadPolicy};

/// Interior hops: the hop's bytes must contain the next hop's ref string.
///
/// This is a literal substring match over the first `max_read` bytes, not
/// a structural parse. A ref that appears anywhere in the blob counts.
pub struct ReferenceStage {
    max_read: u64,
}

impl ReferenceStage {
    pub fn new(max_read: u64) -> Self {
        Self { max_read }
    }
}

#[async_trait]
impl HopStage for ReferenceStage {
    fn name(&self) -> &str {
        "reference"
    }

    fn read_policy(&self) -> ReadPolicy {
        ReadPolicy::Truncate(self.max_read)
    }

    async fn check(
        &self,
        hop: &Hop,
        next: &BlobRef,
        _fetcher: &dyn BlobFetcher,
    ) -> Result<(), GateError> {
        if contains(&hop.bytes, next.to_string().as_bytes()) {
            Ok(())
        } else {
            Err(GateError::MissingReference {
                hop: hop.index,
                blob: hop.blob.clone(),
                next: next.clone(),
            })
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
