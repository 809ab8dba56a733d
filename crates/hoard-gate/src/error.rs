use hoard_schema::SchemaError;
use hoard_store::StoreError;
use hoard_types::BlobRef;

/// Why a fetch chain was rejected.
///
/// These details are for server-side logs only. Callers see
/// [`Unauthorized`] whatever the reason.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The chain is just the target; anonymous reads need a share hop.
    #[error("chain has no share hop")]
    ChainTooShort,

    #[error("hop {hop} ({blob}): fetch failed: {source}")]
    Fetch {
        hop: usize,
        blob: BlobRef,
        source: StoreError,
    },

    #[error("hop {hop} ({blob}): read failed: {source}")]
    Read {
        hop: usize,
        blob: BlobRef,
        source: std::io::Error,
    },

    #[error("hop {hop} ({blob}): {size} bytes exceeds the {max} byte limit")]
    SizeExceeded {
        hop: usize,
        blob: BlobRef,
        size: u64,
        max: u64,
    },

    #[error("hop {hop} ({blob}): not a schema object: {source}")]
    Parse {
        hop: usize,
        blob: BlobRef,
        source: SchemaError,
    },

    #[error("hop {hop} ({blob}): camliType {found:?} is not a share")]
    NotAShare {
        hop: usize,
        blob: BlobRef,
        found: String,
    },

    #[error("hop {hop} ({blob}): share targets {found:?}, chain continues with {expected}")]
    TargetMismatch {
        hop: usize,
        blob: BlobRef,
        expected: BlobRef,
        found: String,
    },

    #[error("hop {hop} ({blob}): does not reference {next}")]
    MissingReference {
        hop: usize,
        blob: BlobRef,
        next: BlobRef,
    },

    #[error("hop {hop} ({blob}): share signature rejected: {reason}")]
    BadShareSignature {
        hop: usize,
        blob: BlobRef,
        reason: String,
    },
}

impl GateError {
    /// Index of the failing hop, if the failure belongs to one.
    pub fn hop(&self) -> Option<usize> {
        match self {
            Self::ChainTooShort => None,
            Self::Fetch { hop, .. }
            | Self::Read { hop, .. }
            | Self::SizeExceeded { hop, .. }
            | Self::Parse { hop, .. }
            | Self::NotAShare { hop, .. }
            | Self::TargetMismatch { hop, .. }
            | Self::MissingReference { hop, .. }
            | Self::BadShareSignature { hop, .. } => Some(*hop),
        }
    }
}

/// The only rejection a caller ever sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unauthorized")]
pub struct Unauthorized;

impl From<GateError> for Unauthorized {
    fn from(_: GateError) -> Self {
        Unauthorized
    }
}
