//! Framing layer.
//!
//! Every wire unit is `[declared_length: u16 LE][magic: 0x05][type: u8][payload]`
//! where `declared_length` counts the magic and type bytes, so the payload is
//! `declared_length - 2` bytes long.
//!
//! Three entry points share one header validation:
//! - `parser`: buffer+offset reads over a captured segment, plus an
//!   incremental `decode_frame` for reassembly buffers.
//! - `reader`: blocking pull from any `std::io::Read`.
//! - `streaming`: async pull from any `tokio::io::AsyncRead`.
//!
//! All `FrameError`s are structural: once one is returned the stream has lost
//! alignment and no later frame can be trusted.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod streaming;

pub use error::FrameError;
pub use parser::{Frame, FrameIter, decode_frame, read_frame_from_bytes};
pub use reader::{FrameReader, read_frame};
pub use streaming::AsyncFrameReader;
