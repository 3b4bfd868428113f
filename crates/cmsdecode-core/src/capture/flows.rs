use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use serde::Serialize;
use tracing::debug;

use crate::frame::{Frame, FrameError, decode_frame};

use super::tcp::TcpSegment;

/// One direction of a TCP connection.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FlowKey {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

impl FlowKey {
    pub fn of(segment: &TcpSegment<'_>) -> Self {
        Self {
            src_ip: segment.src_ip,
            src_port: segment.src_port,
            dst_ip: segment.dst_ip,
            dst_port: segment.dst_port,
        }
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            format_endpoint(self.src_ip, self.src_port),
            format_endpoint(self.dst_ip, self.dst_port)
        )
    }
}

fn format_endpoint(ip: IpAddr, port: u16) -> String {
    match ip {
        IpAddr::V4(addr) => format!("{addr}:{port}"),
        IpAddr::V6(addr) => format!("[{addr}]:{port}"),
    }
}

/// Per-flow byte buffers that turn TCP payloads back into frames.
///
/// Frames may span segments, and one segment may carry several frames.
/// A structural error drops the flow's buffered bytes; decoding resumes
/// with the next segment of that flow.
#[derive(Debug, Default)]
pub struct Reassembler {
    buffers: HashMap<FlowKey, Vec<u8>>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment and return every frame it completes.
    pub fn push(&mut self, segment: &TcpSegment<'_>) -> Vec<Result<Frame, FrameError>> {
        let key = FlowKey::of(segment);
        if segment.syn || segment.rst {
            self.reset(&key);
        }
        let mut out = Vec::new();
        if segment.payload.is_empty() {
            if segment.fin {
                self.reset(&key);
            }
            return out;
        }

        let buffer = self.buffers.entry(key).or_default();
        buffer.extend_from_slice(segment.payload);
        let mut start = 0;
        loop {
            match decode_frame(&buffer[start..]) {
                Ok(Some((frame, consumed))) => {
                    start += consumed;
                    out.push(Ok(frame));
                }
                Ok(None) => break,
                Err(err) => {
                    debug!(flow = %key, error = %err, "dropping flow buffer");
                    start = buffer.len();
                    out.push(Err(err));
                    break;
                }
            }
        }
        buffer.drain(..start);
        if buffer.is_empty() || segment.fin {
            self.reset(&key);
        }
        out
    }

    /// Bytes still waiting for the rest of their frame.
    pub fn pending(&self, key: &FlowKey) -> usize {
        self.buffers.get(key).map_or(0, Vec::len)
    }

    fn reset(&mut self, key: &FlowKey) {
        self.buffers.remove(key);
    }
}
