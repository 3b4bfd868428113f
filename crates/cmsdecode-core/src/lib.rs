//! Decoder for the binary telemetry stream of central-monitoring patient
//! monitors.
//!
//! The crate is layered leaves-first:
//! - `codec`: bounds-checked field reads and the reserved-zero and 0/255
//!   sentinel conventions.
//! - `frame`: length-delimited framing over byte buffers, blocking readers
//!   and async readers.
//! - `blocks`: the dispatcher and typed decoders, including the second
//!   dispatch level on the telemetry lead byte.
//! - `record`: the named-value view collaborators consume.
//! - `source` and `capture`: offline decoding of recorded traffic.
//!
//! Decoding is pure per frame. Structural errors (`FrameError`) mean the
//! stream lost alignment; semantic errors (`DecodeError`) reject one block and
//! leave the stream usable.
//!
//! # Examples
//! ```
//! use cmsdecode_core::{Block, FrameIter, Record, decode_frame_block};
//!
//! let wire = [
//!     0x06, 0x00, 0x05, 0x45, 0x00, 0x00, 0x07, 0xFF, // bed assignment
//!     0x02, 0x00, 0x05, 0x47, // end of cycle
//! ];
//! let mut blocks: Vec<Block> = Vec::new();
//! for frame in FrameIter::new(&wire) {
//!     blocks.push(decode_frame_block(&frame?)?);
//! }
//! assert_eq!(blocks[0].values()[0].0, "bed");
//! assert!(blocks[1].is_end_of_cycle());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod blocks;
pub mod capture;
pub mod codec;
pub mod config;
pub mod frame;
pub mod record;
pub mod source;

pub use blocks::{
    BedAssign, Block, DecodeError, ErrorNotice, Lead, PatientInfo, RawBlock, SyncKind, Telemetry,
    decode_block, decode_block_with, decode_frame_block, decode_frame_block_with,
};
pub use capture::{
    CaptureConfig, CaptureError, CaptureEvent, CaptureSummary, DEFAULT_MONITOR_PORT, FlowKey,
    Outcome, SessionState, convert_source, convert_to_csv, decode_source,
};
pub use codec::{FieldError, FieldReader};
pub use config::{DecodeConfig, ReservedPolicy};
pub use frame::{
    AsyncFrameReader, Frame, FrameError, FrameIter, FrameReader, decode_frame, read_frame,
    read_frame_from_bytes,
};
pub use record::{AlarmLimits, FieldValue, Record, UnknownField};
pub use source::{PacketEvent, PacketSource, PcapFileSource, PcapSource, SourceError};
