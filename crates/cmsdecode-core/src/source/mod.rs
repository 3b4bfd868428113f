//! Packet sources feeding the capture pipeline.

pub mod pcap;

pub use pcap::{PcapFileSource, PcapSource};

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured link-layer frame.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    /// Capture time in seconds since the Unix epoch, when recorded.
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

impl<S: PacketSource + ?Sized> PacketSource for &mut S {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        (**self).next_packet()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
        }
    }
}
