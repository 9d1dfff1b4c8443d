//! Frame layout and single-frame encode/decode.

use crate::error::{FrameError, FrameResult};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use vellum_core::{Entry, VersionKey};

/// Magic bytes opening every framed stream.
pub const MAGIC: [u8; 4] = *b"VLM1";

/// Length prefix that marks the end of a stream.
pub const END_OF_STREAM: u32 = u32::MAX;

/// Upper bounds enforced while decoding, before any allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    /// Largest accepted key, in bytes.
    pub max_key_len: u32,
    /// Largest accepted value, in bytes.
    pub max_value_len: u32,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_key_len: 4 * 1024,          // 4 KiB
            max_value_len: 64 * 1024 * 1024, // 64 MiB
        }
    }
}

impl FrameLimits {
    /// Sets the largest accepted key.
    #[must_use]
    pub const fn with_max_key_len(mut self, len: u32) -> Self {
        self.max_key_len = len;
        self
    }

    /// Sets the largest accepted value.
    #[must_use]
    pub const fn with_max_value_len(mut self, len: u32) -> Self {
        self.max_value_len = len;
        self
    }
}

pub(crate) async fn write_magic<W>(writer: &mut W) -> FrameResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&MAGIC).await?;
    Ok(())
}

pub(crate) async fn read_magic<R>(reader: &mut R) -> FrameResult<()>
where
    R: AsyncRead + Unpin,
{
    let mut found = [0u8; 4];
    reader.read_exact(&mut found).await?;
    if found != MAGIC {
        return Err(FrameError::BadMagic { found });
    }
    Ok(())
}

pub(crate) async fn write_entry<W>(writer: &mut W, entry: &Entry) -> FrameResult<()>
where
    W: AsyncWrite + Unpin,
{
    let key = entry.key.as_str().as_bytes();
    let key_len = u32::try_from(key.len())
        .ok()
        .filter(|len| *len != END_OF_STREAM)
        .ok_or(FrameError::KeyTooLarge {
            len: key.len() as u64,
            max: u64::from(END_OF_STREAM - 1),
        })?;
    let value_len = u32::try_from(entry.value.len()).map_err(|_| FrameError::ValueTooLarge {
        len: entry.value.len() as u64,
        max: u64::from(u32::MAX),
    })?;

    writer.write_u32(key_len).await?;
    writer.write_all(key).await?;
    writer.write_u32(value_len).await?;
    writer.write_all(&entry.value).await?;
    Ok(())
}

pub(crate) async fn write_end<W>(writer: &mut W) -> FrameResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u32(END_OF_STREAM).await?;
    Ok(())
}

/// Reads one frame. Returns `None` at the end marker.
pub(crate) async fn read_entry<R>(reader: &mut R, limits: &FrameLimits) -> FrameResult<Option<Entry>>
where
    R: AsyncRead + Unpin,
{
    let key_len = reader.read_u32().await?;
    if key_len == END_OF_STREAM {
        return Ok(None);
    }
    if key_len > limits.max_key_len {
        return Err(FrameError::KeyTooLarge {
            len: u64::from(key_len),
            max: u64::from(limits.max_key_len),
        });
    }

    let mut key = vec![0u8; key_len as usize];
    reader.read_exact(&mut key).await?;
    let key = String::from_utf8(key).map_err(|_| FrameError::InvalidKey)?;

    let value_len = reader.read_u32().await?;
    if value_len > limits.max_value_len {
        return Err(FrameError::ValueTooLarge {
            len: u64::from(value_len),
            max: u64::from(limits.max_value_len),
        });
    }

    let mut value = vec![0u8; value_len as usize];
    reader.read_exact(&mut value).await?;

    Ok(Some(Entry {
        key: VersionKey::from(key),
        value: Bytes::from(value),
    }))
}
