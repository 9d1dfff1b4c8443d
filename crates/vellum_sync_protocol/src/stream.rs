//! Whole-stream encode/decode.

use crate::error::{FrameError, FrameResult};
use crate::frame::{self, FrameLimits};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;
use vellum_core::{Entry, StoreError};

/// Drains `entries` into `writer` as a framed stream.
///
/// Entries are pulled one at a time, so a slow writer slows the producer.
/// The end marker is written and the writer flushed only once the input is
/// exhausted. Returns the number of entries written.
///
/// # Errors
///
/// Returns `Upstream` if the input stream yields an error, in which case no
/// end marker is written and a reader will see `Truncated`. I/O failures
/// are returned as `Io`.
pub async fn write_entries<S, E, W>(entries: S, writer: &mut W) -> FrameResult<u64>
where
    S: Stream<Item = Result<Entry, E>>,
    E: Into<StoreError>,
    W: AsyncWrite + Unpin,
{
    futures::pin_mut!(entries);
    frame::write_magic(writer).await?;

    let mut written = 0u64;
    while let Some(item) = entries.next().await {
        let entry = item.map_err(|e| FrameError::Upstream(e.into()))?;
        frame::write_entry(writer, &entry).await?;
        written += 1;
    }

    frame::write_end(writer).await?;
    writer.flush().await?;

    debug!(written, "framed stream written");
    Ok(written)
}

struct Decoder<R> {
    reader: R,
    limits: FrameLimits,
    started: bool,
    finished: bool,
}

impl<R> Decoder<R>
where
    R: AsyncRead + Unpin,
{
    async fn next_entry(&mut self) -> FrameResult<Option<Entry>> {
        if !self.started {
            frame::read_magic(&mut self.reader).await?;
            self.started = true;
        }
        frame::read_entry(&mut self.reader, &self.limits).await
    }
}

/// Lazily decodes a framed stream from `reader`.
///
/// Frames are read only as the returned stream is polled. The stream ends
/// after the end marker; any bytes after it are left unread. The first
/// decoding error is yielded as a final `Err` item.
///
/// The result plugs straight into `VersionStore::sink`, since
/// [`FrameError`] converts into `StoreError`.
pub fn read_entries<R>(reader: R, limits: FrameLimits) -> BoxStream<'static, FrameResult<Entry>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let decoder = Decoder {
        reader,
        limits,
        started: false,
        finished: false,
    };

    stream::unfold(decoder, |mut decoder| async move {
        if decoder.finished {
            return None;
        }

        match decoder.next_entry().await {
            Ok(Some(entry)) => Some((Ok(entry), decoder)),
            Ok(None) => None,
            Err(e) => {
                decoder.finished = true;
                Some((Err(e), decoder))
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::io::Cursor;

    fn entries() -> Vec<Entry> {
        vec![
            Entry::new("a@1", b"first".to_vec()),
            Entry::new("b@2", Vec::<u8>::new()),
            Entry::new("c@3", vec![0u8, 1, 2, 255]),
        ]
    }

    async fn encode(items: Vec<Entry>) -> Vec<u8> {
        let mut buf: Vec<u8> = Vec::new();
        let input = stream::iter(items.into_iter().map(Ok::<_, StoreError>));
        write_entries(input, &mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn decodes_what_was_written() {
        let buf = encode(entries()).await;
        let decoded: Vec<Entry> = read_entries(Cursor::new(buf), FrameLimits::default())
            .try_collect()
            .await
            .unwrap();

        assert_eq!(decoded, entries());
    }

    #[tokio::test]
    async fn empty_stream_has_magic_and_end_marker() {
        let buf = encode(Vec::new()).await;
        assert_eq!(buf, [b'V', b'L', b'M', b'1', 0xff, 0xff, 0xff, 0xff]);

        let decoded: Vec<Entry> = read_entries(Cursor::new(buf), FrameLimits::default())
            .try_collect()
            .await
            .unwrap();
        assert!(decoded.is_empty());
    }

    #[tokio::test]
    async fn missing_end_marker_is_truncation() {
        let mut buf = encode(entries()).await;
        buf.truncate(buf.len() - 4);

        let items: Vec<_> = read_entries(Cursor::new(buf), FrameLimits::default())
            .collect()
            .await;
        assert_eq!(items.len(), 4);
        assert!(items[..3].iter().all(Result::is_ok));
        assert!(matches!(items[3], Err(FrameError::Truncated)));
    }

    #[tokio::test]
    async fn empty_input_is_truncation() {
        let items: Vec<_> = read_entries(Cursor::new(Vec::<u8>::new()), FrameLimits::default())
            .collect()
            .await;
        assert!(matches!(items.as_slice(), [Err(FrameError::Truncated)]));
    }

    #[tokio::test]
    async fn trailing_bytes_are_ignored() {
        let mut buf = encode(entries()).await;
        buf.extend_from_slice(b"garbage");

        let decoded: Vec<Entry> = read_entries(Cursor::new(buf), FrameLimits::default())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(decoded.len(), 3);
    }

    #[tokio::test]
    async fn upstream_error_omits_end_marker() {
        let items = vec![
            Ok(Entry::new("a@1", b"x".to_vec())),
            Err(StoreError::transport("disk gone")),
        ];
        let mut buf: Vec<u8> = Vec::new();

        let err = write_entries(stream::iter(items), &mut buf).await.unwrap_err();
        assert!(matches!(err, FrameError::Upstream(_)));
        assert!(!buf.ends_with(&[0xff, 0xff, 0xff, 0xff]));
    }
}
