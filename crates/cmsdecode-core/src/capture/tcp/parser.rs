use std::net::IpAddr;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;

use super::error::TcpError;

/// One TCP segment with its endpoints and control bits.
#[derive(Debug)]
pub struct TcpSegment<'a> {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    pub syn: bool,
    pub fin: bool,
    pub rst: bool,
    pub payload: &'a [u8],
}

/// Slice a link-layer frame down to its TCP segment.
///
/// Returns `Ok(None)` for linktypes without an IP path and for non-TCP traffic.
pub fn parse_tcp_segment(
    linktype: Linktype,
    data: &[u8],
) -> Result<Option<TcpSegment<'_>>, TcpError> {
    let sliced = match linktype {
        Linktype::ETHERNET => {
            SlicedPacket::from_ethernet(data).map_err(|e| TcpError::Slice(e.to_string()))?
        }
        Linktype::LINUX_SLL => {
            SlicedPacket::from_linux_sll(data).map_err(|e| TcpError::Slice(e.to_string()))?
        }
        Linktype::RAW | Linktype::IPV4 | Linktype::IPV6 => {
            SlicedPacket::from_ip(data).map_err(|e| TcpError::Slice(e.to_string()))?
        }
        _ => return Ok(None),
    };

    let net = sliced.net.ok_or(TcpError::MissingNetworkLayer)?;
    let Some(TransportSlice::Tcp(tcp)) = sliced.transport else {
        return Ok(None);
    };

    let (src_ip, dst_ip) = match net {
        NetSlice::Ipv4(ref ipv4) => (
            IpAddr::V4(ipv4.header().source_addr()),
            IpAddr::V4(ipv4.header().destination_addr()),
        ),
        NetSlice::Ipv6(ref ipv6) => (
            IpAddr::V6(ipv6.header().source_addr()),
            IpAddr::V6(ipv6.header().destination_addr()),
        ),
    };

    Ok(Some(TcpSegment {
        src_ip,
        src_port: tcp.source_port(),
        dst_ip,
        dst_port: tcp.destination_port(),
        syn: tcp.syn(),
        fin: tcp.fin(),
        rst: tcp.rst(),
        payload: tcp.payload(),
    }))
}

#[cfg(test)]
mod tests {
    use etherparse::PacketBuilder;
    use pcap_parser::Linktype;

    use super::parse_tcp_segment;
    use crate::capture::tcp::error::TcpError;

    #[test]
    fn tcp_payload_and_endpoints() {
        let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
            .ipv4([10, 0, 0, 7], [10, 0, 0, 1], 64)
            .tcp(40_000, 515, 1_000, 4096);
        let payload = [0x02, 0x00, 0x05, 0x47];
        let mut packet = Vec::<u8>::with_capacity(builder.size(payload.len()));
        builder.write(&mut packet, &payload).unwrap();

        let segment = parse_tcp_segment(Linktype::ETHERNET, &packet)
            .unwrap()
            .unwrap();
        assert_eq!(segment.src_port, 40_000);
        assert_eq!(segment.dst_port, 515);
        assert_eq!(segment.src_ip.to_string(), "10.0.0.7");
        assert_eq!(segment.payload, payload);
        assert!(!segment.syn);
    }

    #[test]
    fn udp_is_skipped() {
        let builder = PacketBuilder::ethernet2([1; 6], [2; 6])
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .udp(515, 515);
        let mut packet = Vec::<u8>::with_capacity(builder.size(4));
        builder.write(&mut packet, &[0u8; 4]).unwrap();
        assert!(parse_tcp_segment(Linktype::ETHERNET, &packet)
            .unwrap()
            .is_none());
    }

    #[test]
    fn raw_ip_linktype() {
        let builder = PacketBuilder::ipv4([192, 168, 1, 2], [192, 168, 1, 3], 64).tcp(1, 515, 0, 0);
        let mut packet = Vec::<u8>::with_capacity(builder.size(2));
        builder.write(&mut packet, &[0xAA, 0xBB]).unwrap();
        let segment = parse_tcp_segment(Linktype::RAW, &packet).unwrap().unwrap();
        assert_eq!(segment.payload, [0xAA, 0xBB]);
    }

    #[test]
    fn slice_error() {
        let result = parse_tcp_segment(Linktype::ETHERNET, &[]);
        assert!(matches!(result, Err(TcpError::Slice(_))));
    }
}
