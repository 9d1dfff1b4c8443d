//! # Vellum Sync Protocol
//!
//! Byte framing for Vellum replication streams.
//!
//! A store's `source()` is a stream of `(key, value)` entries; this crate
//! turns such a stream into bytes on any [`tokio::io::AsyncWrite`] and back
//! into entries from any [`tokio::io::AsyncRead`], so a source on one node
//! can feed a sink on another over a socket, a pipe or a file.
//!
//! ## Wire Format
//!
//! All integers are big-endian.
//!
//! ```text
//! "VLM1"                                   magic, once
//! u32 key_len | key | u32 value_len | value   one frame per entry
//! u32 0xFFFF_FFFF                           end of stream
//! ```
//!
//! Values are arbitrary bytes. A stream that ends without the end marker was
//! cut short and is reported as [`FrameError::Truncated`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod frame;
mod stream;

pub use error::{FrameError, FrameResult};
pub use frame::{FrameLimits, END_OF_STREAM, MAGIC};
pub use stream::{read_entries, write_entries};
