//! Capability-chain authorization for anonymous reads.
//!
//! An anonymous caller may read a blob only by presenting a chain of
//! `via` hops: a share object whose `target` is the next hop, then zero or
//! more intermediate blobs that each mention the next hop, ending at the
//! requested blob. The [`ChainAuthorizer`] walks that chain through a
//! [`BlobFetcher`](hoard_store::BlobFetcher) and answers yes or a uniform
//! [`Unauthorized`].
//!
//! Rejections are padded to a fixed minimum duration ([`MinimumDuration`])
//! so that timing does not reveal which hop failed or whether a blob
//! exists.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hoard_gate::{ChainAuthorizer, GateConfig};
//! use hoard_store::InMemoryBlobStore;
//! # async fn demo(via: Vec<hoard_types::BlobRef>, target: hoard_types::BlobRef) {
//! let gate = ChainAuthorizer::new(Arc::new(InMemoryBlobStore::new()), GateConfig::default());
//! if gate.authorize(&via, &target).await.is_ok() {
//!     // stream the target
//! }
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod floor;
pub mod gate;
pub mod stage;
pub mod stages;

pub use chain::FetchChain;
pub use config::GateConfig;
pub use error::{GateError, Unauthorized};
pub use floor::MinimumDuration;
pub use gate::ChainAuthorizer;
pub use stage::{Hop, HopStage, ReadPolicy};
pub use stages::{ReferenceStage, ShareStage};
