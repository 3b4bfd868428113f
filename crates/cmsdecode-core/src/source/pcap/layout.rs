/// Initial buffer handed to the pcap-parser readers; grown on demand.
pub const PCAP_READER_BUFFER_SIZE: usize = 65_536;
/// Section header block type, the first four bytes of every pcapng file.
pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];
pub const MAGIC_LEN: usize = 4;
/// Capture timestamps are microsecond counts.
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;
