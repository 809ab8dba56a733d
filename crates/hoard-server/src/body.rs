use std::io;

use axum::body::Body;
use bytes::Bytes;
use hoard_store::BlobReader;
use hoard_types::BlobRef;
use tokio::io::AsyncReadExt;
use tracing::warn;

const CHUNK_SIZE: usize = 64 * 1024;

struct Guard {
    blob: BlobRef,
    reader: Box<dyn BlobReader>,
    head: Option<Bytes>,
    expected: u64,
    sent: u64,
    done: bool,
}

/// A response body that streams exactly `expected` bytes: `head` (bytes
/// already read, e.g. for sniffing) followed by the rest of `reader`.
///
/// If the reader ends early or fails, the stream yields an error instead
/// of ending. Hyper then aborts the connection, so a client never sees a
/// short body as a complete blob. The reader is dropped when the body is,
/// including when the client disconnects.
pub fn guarded_body(
    blob: BlobRef,
    reader: Box<dyn BlobReader>,
    head: Bytes,
    expected: u64,
) -> Body {
    let guard = Guard {
        blob,
        reader,
        head: Some(head),
        expected,
        sent: 0,
        done: false,
    };
    Body::from_stream(futures::stream::unfold(guard, next_chunk))
}

async fn next_chunk(mut g: Guard) -> Option<(io::Result<Bytes>, Guard)> {
    if g.done {
        return None;
    }

    if let Some(head) = g.head.take().filter(|h| !h.is_empty()) {
        let head = if head.len() as u64 > g.expected {
            head.slice(..g.expected as usize)
        } else {
            head
        };
        g.sent += head.len() as u64;
        return Some((Ok(head), g));
    }

    let remaining = g.expected - g.sent;
    if remaining == 0 {
        return None;
    }

    let mut buf = vec![0u8; remaining.min(CHUNK_SIZE as u64) as usize];
    match g.reader.read(&mut buf).await {
        Ok(0) => {
            warn!(blob = %g.blob, sent = g.sent, expected = g.expected, "blob ended early; aborting response");
            g.done = true;
            let err = io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("sent {} of {} bytes", g.sent, g.expected),
            );
            Some((Err(err), g))
        }
        Ok(n) => {
            buf.truncate(n);
            g.sent += n as u64;
            Some((Ok(Bytes::from(buf)), g))
        }
        Err(err) => {
            warn!(blob = %g.blob, sent = g.sent, error = %err, "read failed mid-stream; aborting response");
            g.done = true;
            Some((Err(err), g))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn blob() -> BlobRef {
        BlobRef::parse("sha1-aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d").unwrap()
    }

    async fn collect(body: Body) -> Result<Bytes, axum::Error> {
        axum::body::to_bytes(body, usize::MAX).await
    }

    #[tokio::test]
    async fn head_then_rest() {
        let reader = Box::new(Cursor::new(b" world".to_vec()));
        let body = guarded_body(blob(), reader, Bytes::from_static(b"hello"), 11);
        assert_eq!(collect(body).await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn stops_at_expected_length() {
        let reader = Box::new(Cursor::new(b"0123456789".to_vec()));
        let body = guarded_body(blob(), reader, Bytes::new(), 4);
        assert_eq!(collect(body).await.unwrap(), "0123");
    }

    #[tokio::test]
    async fn short_reader_is_an_error() {
        let reader = Box::new(Cursor::new(b"abc".to_vec()));
        let body = guarded_body(blob(), reader, Bytes::new(), 10);
        assert!(collect(body).await.is_err());
    }

    #[tokio::test]
    async fn large_body_spans_chunks() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 10];
        let reader = Box::new(Cursor::new(data.clone()));
        let body = guarded_body(blob(), reader, Bytes::new(), data.len() as u64);
        assert_eq!(collect(body).await.unwrap().len(), data.len());
    }
}
