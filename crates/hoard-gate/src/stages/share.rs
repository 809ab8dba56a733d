use async_trait::async_trait;
use hoard_schema::{verify_signed, SchemaMap};
use hoard_store::BlobFetcher;
use hoard_types::BlobRef;

use crate::error::GateError;
use crate::stage::{Hop, HopStage, ReadPolicy};

/// Hop 0: a share object whose `target` is exactly the next hop.
///
/// The share is parsed as a plain map, so only `camliType` and `target`
/// matter. `transitive` is not consulted.
pub struct ShareStage {
    max_size: u64,
    require_signature: bool,
}

impl ShareStage {
    pub fn new(max_size: u64, require_signature: bool) -> Self {
        Self {
            max_size,
            require_signature,
        }
    }
}

#[async_trait]
impl HopStage for ShareStage {
    fn name(&self) -> &str {
        "share"
    }

    fn read_policy(&self) -> ReadPolicy {
        ReadPolicy::RejectAbove(self.max_size)
    }

    async fn check(
        &self,
        hop: &Hop,
        next: &BlobRef,
        fetcher: &dyn BlobFetcher,
    ) -> Result<(), GateError> {
        let map = SchemaMap::from_slice(&hop.bytes).map_err(|source| GateError::Parse {
            hop: hop.index,
            blob: hop.blob.clone(),
            source,
        })?;

        if map.camli_type() != "share" {
            return Err(GateError::NotAShare {
                hop: hop.index,
                blob: hop.blob.clone(),
                found: map.camli_type().to_string(),
            });
        }

        let target = map.get_str("target").unwrap_or_default();
        if target != next.to_string() {
            return Err(GateError::TargetMismatch {
                hop: hop.index,
                blob: hop.blob.clone(),
                expected: next.clone(),
                found: target.to_string(),
            });
        }

        if self.require_signature {
            verify_signed(&hop.bytes, fetcher)
                .await
                .map_err(|e| GateError::BadShareSignature {
                    hop: hop.index,
                    blob: hop.blob.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}
