//! Offline decoding of recorded monitor traffic.
//!
//! Packets from a `PacketSource` are sliced to TCP, reassembled per flow,
//! framed and decoded. Every outcome is handed to a sink, so callers choose
//! what to do with blocks and errors; `convert_to_csv` is one such caller.

pub mod flows;
pub mod session;
pub mod table;
pub mod tcp;

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, warn};

use crate::blocks::{Block, DecodeError, decode_frame_block_with};
use crate::config::DecodeConfig;
use crate::frame::FrameError;
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

pub use flows::{FlowKey, Reassembler};
pub use session::SessionState;
pub use table::CycleWriter;
pub use tcp::{TcpError, TcpSegment, parse_tcp_segment};

/// TCP port the monitors stream to.
pub const DEFAULT_MONITOR_PORT: u16 = 515;

#[derive(Debug, Clone, Copy)]
pub struct CaptureConfig {
    /// Only segments sent to this port are decoded.
    pub port: u16,
    pub decode: DecodeConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_MONITOR_PORT,
            decode: DecodeConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// What became of one frame found in the capture.
#[derive(Debug)]
pub enum Outcome {
    Block(Block),
    /// The frame was sound but its contents failed validation.
    Rejected(DecodeError),
    /// Alignment was lost; the flow's buffered bytes were dropped.
    Desynchronized(FrameError),
}

#[derive(Debug)]
pub struct CaptureEvent {
    pub ts: Option<f64>,
    pub flow: FlowKey,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureSummary {
    pub packets_total: u64,
    pub segments: u64,
    pub frames: u64,
    pub blocks: u64,
    pub rows: u64,
    pub structural_errors: u64,
    pub decode_errors: u64,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
}

/// Decode every monitor frame in `source`, feeding each outcome to `sink`.
pub fn decode_source<S, F>(
    mut source: S,
    config: &CaptureConfig,
    mut sink: F,
) -> Result<CaptureSummary, CaptureError>
where
    S: PacketSource,
    F: FnMut(CaptureEvent) -> Result<(), CaptureError>,
{
    let mut summary = CaptureSummary::default();
    let mut first_ts = None;
    let mut last_ts = None;
    let mut flows = Reassembler::new();

    while let Some(PacketEvent { ts, linktype, data }) = source.next_packet()? {
        summary.packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);

        let segment = match parse_tcp_segment(linktype, &data) {
            Ok(Some(segment)) if segment.dst_port == config.port => segment,
            Ok(_) => continue,
            Err(err) => {
                debug!(packet = summary.packets_total, error = %err, "packet skipped");
                continue;
            }
        };
        summary.segments += 1;
        let flow = FlowKey::of(&segment);

        for framed in flows.push(&segment) {
            let outcome = match framed {
                Ok(frame) => {
                    summary.frames += 1;
                    match decode_frame_block_with(&frame, &config.decode) {
                        Ok(block) => {
                            summary.blocks += 1;
                            Outcome::Block(block)
                        }
                        Err(err) => {
                            summary.decode_errors += 1;
                            warn!(%flow, error = %err, "block skipped");
                            Outcome::Rejected(err)
                        }
                    }
                }
                Err(err) => {
                    summary.structural_errors += 1;
                    warn!(%flow, error = %err, "stream desynchronized");
                    Outcome::Desynchronized(err)
                }
            };
            sink(CaptureEvent { ts, flow, outcome })?;
        }
    }

    summary.time_start = ts_to_rfc3339(first_ts);
    summary.time_end = ts_to_rfc3339(last_ts);
    Ok(summary)
}

/// Convert a capture file to CSV, one row per end-of-cycle marker.
pub fn convert_to_csv<W: Write>(
    path: &Path,
    output: W,
    config: &CaptureConfig,
) -> Result<CaptureSummary, CaptureError> {
    let source = PcapFileSource::open(path)?;
    convert_source(source, output, config)
}

pub fn convert_source<S: PacketSource, W: Write>(
    source: S,
    output: W,
    config: &CaptureConfig,
) -> Result<CaptureSummary, CaptureError> {
    let mut state = SessionState::new();
    let mut table = CycleWriter::new(output);

    let mut summary = decode_source(source, config, |event| {
        state.set_time(event.ts);
        if let Outcome::Block(block) = &event.outcome {
            state.apply(block);
            if block.is_end_of_cycle() {
                table.write_row(&state)?;
            }
        }
        Ok(())
    })?;
    table.flush()?;
    summary.rows = table.rows();
    Ok(summary)
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

/// Capture time (seconds since the Unix epoch) as an RFC 3339 string.
pub fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
