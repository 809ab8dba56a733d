use std::fmt;

use hoard_types::{BlobRef, TypeError};

/// The hops checked for one anonymous read: the caller's `via` refs
/// followed by the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchChain {
    hops: Vec<BlobRef>,
}

impl FetchChain {
    pub fn new(via: Vec<BlobRef>, target: BlobRef) -> Self {
        let mut hops = via;
        hops.push(target);
        Self { hops }
    }

    /// Parse a comma-separated `via` parameter. An empty string is no hops.
    pub fn parse_via(raw: &str) -> Result<Vec<BlobRef>, TypeError> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        raw.split(',').map(BlobRef::parse).collect()
    }

    pub fn hops(&self) -> &[BlobRef] {
        &self.hops
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Always `false`: a chain holds at least its target.
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn target(&self) -> &BlobRef {
        &self.hops[self.hops.len() - 1]
    }

    /// The share hop, if the chain has one.
    pub fn share(&self) -> Option<&BlobRef> {
        (self.hops.len() > 1).then(|| &self.hops[0])
    }
}

impl fmt::Display for FetchChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hop) in self.hops.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{hop}")?;
        }
        Ok(())
    }
}
