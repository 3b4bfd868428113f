//! Capture-file packet source (pcap and pcapng).
//!
//! Only file I/O and container parsing live here. Link-layer and TCP
//! handling belong to `capture`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{PcapFileSource, PcapSource};
