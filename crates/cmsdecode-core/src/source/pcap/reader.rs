use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::error::PcapSourceError;
use super::layout;

/// Read the container magic and rewind so the format reader sees it again.
///
/// # Errors
/// Returns `PcapSourceError::Io` when fewer than four bytes are available or
/// the stream cannot be rewound.
pub fn read_magic_and_rewind<R: Read + Seek>(
    reader: &mut R,
) -> Result<[u8; layout::MAGIC_LEN], PcapSourceError> {
    let mut magic = [0u8; layout::MAGIC_LEN];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; layout::MAGIC_LEN]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Linktype of the interface a pcapng packet was captured on.
///
/// Unknown interface ids fall back to Ethernet, the monitor network's link.
pub fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    linktypes
        .get(if_id as usize)
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

/// pcapng timestamps are a 64-bit microsecond count split in two words.
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let ts = (u64::from(ts_high) << 32) | u64::from(ts_low);
    ts as f64 / layout::MICROS_PER_SECOND
}

pub fn legacy_ts_to_seconds(ts_sec: u32, ts_usec: u32) -> f64 {
    f64::from(ts_sec) + f64::from(ts_usec) / layout::MICROS_PER_SECOND
}
