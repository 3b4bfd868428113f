use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader};
use tracing::debug;

use crate::source::{PacketEvent, PacketSource, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
    read_magic_and_rewind,
};

/// Packet source over any seekable pcap or pcapng byte stream.
pub struct PcapSource<R: Read> {
    inner: Container<R>,
}

/// Packet source backed by a capture file on disk.
pub type PcapFileSource = PcapSource<File>;

enum Container<R: Read> {
    Legacy {
        reader: LegacyPcapReader<R>,
        linktype: Option<Linktype>,
    },
    Ng {
        reader: PcapNGReader<R>,
        linktypes: Vec<Linktype>,
    },
}

impl PcapSource<File> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        debug!(path = %path.display(), "opening capture file");
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> PcapSource<R> {
    /// Sniff the container format and wrap the matching reader.
    pub fn from_reader(mut input: R) -> Result<Self, SourceError> {
        let magic = read_magic_and_rewind(&mut input)?;
        let inner = if is_pcapng_magic(&magic) {
            let reader = PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, input)
                .map_err(|e| pcap_error("pcapng reader init", e))?;
            Container::Ng {
                reader,
                linktypes: Vec::new(),
            }
        } else {
            let reader = LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, input)
                .map_err(|e| pcap_error("pcap reader init", e))?;
            Container::Legacy {
                reader,
                linktype: None,
            }
        };
        Ok(Self { inner })
    }
}

impl<R: Read> PacketSource for PcapSource<R> {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        Ok(self.inner.next_packet()?)
    }
}

impl<R: Read> Container<R> {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, PcapSourceError> {
        loop {
            let step = match self {
                Container::Legacy { reader, linktype } => match reader.next() {
                    Ok((offset, block)) => {
                        let event = match block {
                            PcapBlockOwned::LegacyHeader(header) => {
                                *linktype = Some(header.network);
                                None
                            }
                            PcapBlockOwned::Legacy(packet) => Some(PacketEvent {
                                ts: Some(legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec)),
                                linktype: linktype.unwrap_or(Linktype::ETHERNET),
                                data: packet.data.to_vec(),
                            }),
                            _ => None,
                        };
                        reader.consume(offset);
                        Step::Block(event)
                    }
                    Err(PcapError::Eof) => Step::Eof,
                    Err(PcapError::Incomplete(_)) => {
                        reader
                            .refill()
                            .map_err(|e| pcap_error("pcap reader refill", e))?;
                        Step::Refilled
                    }
                    Err(e) => return Err(pcap_error("pcap reader next", e)),
                },
                Container::Ng { reader, linktypes } => match reader.next() {
                    Ok((offset, block)) => {
                        let event = match block {
                            PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                                linktypes.clear();
                                None
                            }
                            PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                                linktypes.push(intf.linktype);
                                None
                            }
                            PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(PacketEvent {
                                ts: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                                linktype: linktype_for_interface(linktypes, packet.if_id),
                                data: packet.data.to_vec(),
                            }),
                            PcapBlockOwned::NG(Block::SimplePacket(packet)) => Some(PacketEvent {
                                ts: None,
                                linktype: linktype_for_interface(linktypes, 0),
                                data: packet.data.to_vec(),
                            }),
                            _ => None,
                        };
                        reader.consume(offset);
                        Step::Block(event)
                    }
                    Err(PcapError::Eof) => Step::Eof,
                    Err(PcapError::Incomplete(_)) => {
                        reader
                            .refill()
                            .map_err(|e| pcap_error("pcapng reader refill", e))?;
                        Step::Refilled
                    }
                    Err(e) => return Err(pcap_error("pcapng reader next", e)),
                },
            };
            match step {
                Step::Block(Some(event)) => return Ok(Some(event)),
                Step::Block(None) | Step::Refilled => continue,
                Step::Eof => return Ok(None),
            }
        }
    }
}

enum Step {
    Block(Option<PacketEvent>),
    Refilled,
    Eof,
}

fn pcap_error<E: std::fmt::Display>(context: &'static str, err: E) -> PcapSourceError {
    PcapSourceError::Pcap {
        context,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::PcapSource;
    use crate::source::{PacketSource, SourceError};

    fn legacy_capture(packets: &[(u32, u32, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&65_535u32.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        for (sec, usec, data) in packets {
            out.extend_from_slice(&sec.to_le_bytes());
            out.extend_from_slice(&usec.to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(data);
        }
        out
    }

    #[test]
    fn legacy_packets_in_order() {
        let bytes = legacy_capture(&[(10, 500_000, &[1, 2, 3]), (11, 0, &[4])]);
        let mut source = PcapSource::from_reader(Cursor::new(bytes)).unwrap();

        let first = source.next_packet().unwrap().unwrap();
        assert_eq!(first.data, vec![1, 2, 3]);
        assert!((first.ts.unwrap() - 10.5).abs() < 1e-9);
        let second = source.next_packet().unwrap().unwrap();
        assert_eq!(second.data, vec![4]);
        assert!(source.next_packet().unwrap().is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        let result = PcapSource::from_reader(Cursor::new(vec![0u8; 64]));
        assert!(matches!(result, Err(SourceError::Pcap(_))));
    }

    #[test]
    fn too_short_for_magic() {
        let result = PcapSource::from_reader(Cursor::new(vec![0xd4, 0xc3]));
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
