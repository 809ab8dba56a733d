//! `Range: bytes=A-B` handling.
//!
//! Only single ranges with an explicit start are understood: `bytes=A-B`
//! (inclusive end) and `bytes=A-`. Suffix and multi-part ranges are
//! rejected as unparseable.

use crate::error::{ServerError, ServerResult};

/// A requested sub-range as a skip offset plus an optional byte limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub skip: u64,
    pub limit: Option<u64>,
}

impl ByteRange {
    pub fn parse(header: &str) -> Option<Self> {
        let spec = header.trim().strip_prefix("bytes=")?;
        let (start, end) = spec.split_once('-')?;
        let skip: u64 = start.trim().parse().ok()?;
        let end = end.trim();
        let limit = if end.is_empty() {
            None
        } else {
            let end: u64 = end.parse().ok()?;
            if end < skip {
                return None;
            }
            Some(end - skip + 1)
        };
        Some(Self { skip, limit })
    }

    /// Clamp to a blob of `size` bytes, returning `(skip, length)`.
    pub fn resolve(&self, size: u64) -> ServerResult<(u64, u64)> {
        if self.skip >= size {
            return Err(ServerError::RangeNotSatisfiable {
                skip: self.skip,
                size,
            });
        }
        let available = size - self.skip;
        let len = self.limit.map_or(available, |limit| limit.min(available));
        Ok((self.skip, len))
    }
}

/// `Content-Range` value for a partial response.
///
/// The end is reported as `skip + len`, one past the last byte sent.
pub fn content_range(skip: u64, len: u64, size: u64) -> String {
    format!("bytes {}-{}/{}", skip, skip + len, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_range() {
        assert_eq!(
            ByteRange::parse("bytes=10-14"),
            Some(ByteRange {
                skip: 10,
                limit: Some(5)
            })
        );
    }

    #[test]
    fn open_range() {
        assert_eq!(
            ByteRange::parse("bytes=7-"),
            Some(ByteRange {
                skip: 7,
                limit: None
            })
        );
    }

    #[test]
    fn unsupported_forms() {
        assert_eq!(ByteRange::parse("bytes=-500"), None);
        assert_eq!(ByteRange::parse("bytes=0-1,5-6"), None);
        assert_eq!(ByteRange::parse("items=0-1"), None);
        assert_eq!(ByteRange::parse("bytes=9-3"), None);
    }

    #[test]
    fn resolve_clamps_to_size() {
        let r = ByteRange::parse("bytes=90-199").unwrap();
        assert_eq!(r.resolve(100).unwrap(), (90, 10));
        let r = ByteRange::parse("bytes=10-").unwrap();
        assert_eq!(r.resolve(100).unwrap(), (10, 90));
    }

    #[test]
    fn resolve_past_end() {
        let r = ByteRange::parse("bytes=100-").unwrap();
        assert!(matches!(
            r.resolve(100),
            Err(ServerError::RangeNotSatisfiable { skip: 100, size: 100 })
        ));
    }

    #[test]
    fn content_range_format() {
        assert_eq!(content_range(10, 5, 100), "bytes 10-15/100");
    }
}
