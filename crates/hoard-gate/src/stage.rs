use async_trait::async_trait;
use hoard_store::BlobFetcher;
use hoard_types::BlobRef;

use crate::error::GateError;

/// One fetched hop of a chain, bounded by its stage's [`ReadPolicy`].
#[derive(Clone, Debug)]
pub struct Hop {
    /// Position in the chain; the share is hop 0.
    pub index: usize,
    pub blob: BlobRef,
    /// Full size reported by the store.
    pub size: u64,
    /// The bytes read, at most the policy's limit.
    pub bytes: Vec<u8>,
}

/// How much of a hop a stage needs to see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Reject hops larger than this before reading them.
    RejectAbove(u64),
    /// Read at most this many bytes and ignore the rest.
    Truncate(u64),
}

/// A check applied to one hop, proving it leads to the next.
///
/// Stages are evaluated in chain order and fail fast. The trait is
/// object-safe and `Send + Sync` so stages can live behind `&dyn`.
#[async_trait]
pub trait HopStage: Send + Sync {
    /// Short name used in logs (e.g. "share", "reference").
    fn name(&self) -> &str;

    fn read_policy(&self) -> ReadPolicy;

    /// Accept `hop` only if it leads to `next`.
    ///
    /// `fetcher` is available for stages that need additional blobs.
    async fn check(
        &self,
        hop: &Hop,
        next: &BlobRef,
        fetcher: &dyn BlobFetcher,
    ) -> Result<(), GateError>;
}
