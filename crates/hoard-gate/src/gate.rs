use std::sync::Arc;

use hoard_store::BlobFetcher;
use hoard_types::BlobRef;
use tracing::{debug, trace};

use crate::chain::FetchChain;
use crate::config::GateConfig;
use crate::error::{GateError, Unauthorized};
use crate::floor::MinimumDuration;
use crate::stage::{Hop, HopStage, ReadPolicy};
use crate::stages::{ReferenceStage, ShareStage};

/// Decides whether an anonymous caller may read a blob.
///
/// The caller presents `via` hops leading from a share object to the
/// target. Hop 0 goes through the [`ShareStage`], every interior hop
/// through the [`ReferenceStage`]. The target itself is not fetched here.
///
/// Evaluation is strictly sequential: hop `i + 1` is never fetched before
/// hop `i` has passed. Any failure yields the same [`Unauthorized`] after
/// the configured floor has elapsed.
pub struct ChainAuthorizer {
    fetcher: Arc<dyn BlobFetcher>,
    config: GateConfig,
    share: ShareStage,
    reference: ReferenceStage,
}

impl ChainAuthorizer {
    pub fn new(fetcher: Arc<dyn BlobFetcher>, config: GateConfig) -> Self {
        let share = ShareStage::new(config.max_share_size, config.require_signed_shares);
        let reference = ReferenceStage::new(config.max_hop_read);
        Self {
            fetcher,
            config,
            share,
            reference,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Authorize an anonymous read of `target` through `via`.
    pub async fn authorize(&self, via: &[BlobRef], target: &BlobRef) -> Result<(), Unauthorized> {
        let floor = MinimumDuration::start(self.config.failure_floor());
        let chain = FetchChain::new(via.to_vec(), target.clone());

        match self.verify(&chain).await {
            Ok(()) => {
                debug!(chain = %chain, "fetch chain authorized");
                Ok(())
            }
            Err(err) => {
                debug!(chain = %chain, hop = ?err.hop(), error = %err, "fetch chain rejected");
                floor.wait().await;
                Err(Unauthorized)
            }
        }
    }

    /// Run every stage over `chain` and report the first failure in detail.
    ///
    /// No timing floor is applied. Use [`ChainAuthorizer::authorize`] at
    /// the request boundary.
    pub async fn verify(&self, chain: &FetchChain) -> Result<(), GateError> {
        if chain.len() < 2 {
            return Err(GateError::ChainTooShort);
        }

        let hops = chain.hops();
        for (index, pair) in hops.windows(2).enumerate() {
            let stage: &dyn HopStage = if index == 0 {
                &self.share
            } else {
                &self.reference
            };
            let hop = self.load(index, &pair[0], stage.read_policy()).await?;
            stage.check(&hop, &pair[1], self.fetcher.as_ref()).await?;
            trace!(hop = index, stage = stage.name(), blob = %hop.blob.short(), "hop passed");
        }
        Ok(())
    }

    async fn load(&self, index: usize, blob: &BlobRef, policy: ReadPolicy) -> Result<Hop, GateError> {
        let fetched = self
            .fetcher
            .fetch(blob)
            .await
            .map_err(|source| GateError::Fetch {
                hop: index,
                blob: blob.clone(),
                source,
            })?;
        let size = fetched.size;

        let limit = match policy {
            ReadPolicy::RejectAbove(max) if size > max => {
                return Err(GateError::SizeExceeded {
                    hop: index,
                    blob: blob.clone(),
                    size,
                    max,
                })
            }
            ReadPolicy::RejectAbove(max) | ReadPolicy::Truncate(max) => max,
        };

        let bytes = fetched
            .read_limited(limit)
            .await
            .map_err(|source| GateError::Read {
                hop: index,
                blob: blob.clone(),
                source,
            })?;
        Ok(Hop {
            index,
            blob: blob.clone(),
            size,
            bytes,
        })
    }
}

impl std::fmt::Debug for ChainAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainAuthorizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
