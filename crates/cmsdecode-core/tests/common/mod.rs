#![allow(dead_code)]

use std::fs;
use std::path::Path;

use etherparse::PacketBuilder;

pub const MONITOR_IP: [u8; 4] = [10, 0, 0, 7];
pub const CENTRAL_IP: [u8; 4] = [10, 0, 0, 1];
pub const MONITOR_PORT: u16 = 40_000;
pub const CMS_PORT: u16 = 515;

/// `[len u16 LE][0x05][type][payload]`.
pub fn frame(block_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 2) as u16).to_le_bytes().to_vec();
    out.push(0x05);
    out.push(block_type);
    out.extend_from_slice(payload);
    out
}

pub fn bed_assign(bed: u8) -> Vec<u8> {
    frame(0x45, &[0x00, 0x00, bed, 0xFF])
}

pub fn end_of_cycle() -> Vec<u8> {
    frame(0x47, &[])
}

fn put(payload: &mut [u8], at: usize, text: &str) {
    payload[at..at + text.len()].copy_from_slice(text.as_bytes());
}

pub fn patient_info(department: &str, bed: u8) -> Vec<u8> {
    let mut payload = vec![0u8; 0xAD];
    put(&mut payload, 0x00, department);
    payload[0x22] = bed;
    put(&mut payload, 0x23, "DOE JOHN");
    put(&mut payload, 0x43, "H-77");
    put(&mut payload, 0x63, "2020");
    put(&mut payload, 0x68, "3");
    put(&mut payload, 0x6B, "15");
    payload[0x74..0x76].copy_from_slice(&1800u16.to_le_bytes());
    payload[0x76..0x78].copy_from_slice(&800u16.to_le_bytes());
    put(&mut payload, 0x7C, "1970");
    put(&mut payload, 0x81, "12");
    put(&mut payload, 0x84, "31");
    payload[0x8C] = 1;
    put(&mut payload, 0x8D, "DR WHO");
    frame(0x3E, &payload)
}

pub fn spo2_payload(spo2: u8, hr: u8, valid: u8) -> Vec<u8> {
    let mut payload = vec![0u8; 0x114];
    payload[2] = 0x15;
    for (idx, b) in payload[0x04..0x104].iter_mut().enumerate() {
        *b = (idx % 200) as u8;
    }
    payload[0x104] = spo2;
    payload[0x105] = 0x00;
    payload[0x106] = hr;
    payload[0x107] = valid;
    payload
}

pub fn spo2(spo2: u8, hr: u8) -> Vec<u8> {
    frame(0x46, &spo2_payload(spo2, hr, 0x00))
}

pub fn temperature(t1: f32, t2: f32) -> Vec<u8> {
    let mut payload = vec![0u8; 0x2E];
    payload[2] = 0x17;
    payload[0x04..0x08].copy_from_slice(&t1.to_le_bytes());
    payload[0x08..0x0C].copy_from_slice(&t2.to_le_bytes());
    payload[0x0C..0x10].copy_from_slice(&(t1 - t2).to_le_bytes());
    frame(0x46, &payload)
}

/// Ethernet/IPv4/TCP packet from the monitor to the central station.
pub fn tcp_packet(dst_port: u16, sequence: u32, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([2, 0, 0, 0, 0, 7], [2, 0, 0, 0, 0, 1])
        .ipv4(MONITOR_IP, CENTRAL_IP, 64)
        .tcp(MONITOR_PORT, dst_port, sequence, 8192);
    let mut packet = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut packet, payload)
        .expect("packet build failed");
    packet
}

/// Segments in capture order with their timestamps in microseconds.
pub fn monitor_capture(segments: &[(u64, Vec<u8>)]) -> Vec<(u64, Vec<u8>)> {
    let mut sequence = 1u32;
    segments
        .iter()
        .map(|(ts_us, payload)| {
            let packet = tcp_packet(CMS_PORT, sequence, payload);
            sequence = sequence.wrapping_add(payload.len() as u32);
            (*ts_us, packet)
        })
        .collect()
}

pub fn pcapng(packets: &[(u64, Vec<u8>)]) -> Vec<u8> {
    let mut output = Vec::new();
    output.extend_from_slice(&pcapng_block(0x0A0D0D0A, &section_header_body()));
    output.extend_from_slice(&pcapng_block(1, &interface_desc_body()));
    for (ts_us, data) in packets {
        output.extend_from_slice(&pcapng_block(6, &enhanced_packet_body(*ts_us, data)));
    }
    output
}

pub fn write_pcapng(path: &Path, packets: &[(u64, Vec<u8>)]) {
    fs::write(path, pcapng(packets)).expect("failed to write capture");
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (8 + body.len() + 4) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x1A2B3C4Du32.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_desc_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&65535u32.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, data: &[u8]) -> Vec<u8> {
    let cap_len = data.len() as u32;
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&((ts_us >> 32) as u32).to_be_bytes());
    body.extend_from_slice(&(ts_us as u32).to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(data);
    let pad_len = (4 - (data.len() % 4)) % 4;
    body.extend(std::iter::repeat_n(0u8, pad_len));
    body
}
