use std::collections::VecDeque;
use std::fs;

use etherparse::PacketBuilder;
use itchcast_core::{
    DatagramReceiver, FrameSource, ItchMessage, ListenOptions, MessageFilter, StopFlag,
    TransportError, VecSink, decode_source, encode_frame, listen, open_capture,
};
use tempfile::TempDir;

fn directory_frame(stock: &str) -> Vec<u8> {
    let mut frame = vec![b'R', 0, 0, 0, 0];
    frame.extend_from_slice(&1_000u64.to_be_bytes());
    let mut field = stock.as_bytes().to_vec();
    field.resize(8, b' ');
    frame.extend_from_slice(&field);
    frame.push(b'Q');
    frame
}

fn delete_frame(order_ref: u64) -> Vec<u8> {
    let mut frame = vec![b'D', 0, 0, 0, 0];
    frame.extend_from_slice(&2_000u64.to_be_bytes());
    frame.extend_from_slice(&order_ref.to_be_bytes());
    frame
}

fn records() -> Vec<Vec<u8>> {
    vec![
        encode_frame(&directory_frame("AAPL")).unwrap(),
        encode_frame(&delete_frame(7)).unwrap(),
        encode_frame(&directory_frame("MSFT")).unwrap(),
        encode_frame(b"Z").unwrap(),
    ]
}

/// Serves queued datagrams, then trips the stop flag.
struct QueueReceiver {
    queue: VecDeque<Vec<u8>>,
    current: Vec<u8>,
    stop: StopFlag,
}

impl DatagramReceiver for QueueReceiver {
    fn receive(&mut self) -> Result<Option<&[u8]>, TransportError> {
        match self.queue.pop_front() {
            Some(datagram) => {
                self.current = datagram;
                Ok(Some(&self.current))
            }
            None => {
                self.stop.stop();
                Ok(None)
            }
        }
    }
}

fn legacy_pcap(datagrams: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&65_535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    for (i, (port, payload)) in datagrams.iter().enumerate() {
        let packet = ethernet_udp(*port, payload);
        out.extend_from_slice(&(i as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(packet.len() as u32).to_le_bytes());
        out.extend_from_slice(&(packet.len() as u32).to_le_bytes());
        out.extend_from_slice(&packet);
    }
    out
}

fn ethernet_udp(port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([2, 0, 0, 0, 0, 1], [1, 0, 94, 64, 0, 1])
        .ipv4([192, 168, 1, 10], [239, 192, 0, 1], 1)
        .udp(40_000, port);
    let mut packet = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut packet, payload).unwrap();
    packet
}

fn raw_ip_udp(payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ipv4([192, 168, 1, 10], [239, 192, 0, 1], 1).udp(40_000, 12345);
    let mut packet = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut packet, payload).unwrap();
    packet
}

/// Little-endian pcapng block: type, total length, padded body, total length.
fn ng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let padded = body.len().div_ceil(4) * 4;
    let total = (12 + padded) as u32;
    let mut out = Vec::with_capacity(total as usize);
    out.extend_from_slice(&block_type.to_le_bytes());
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(body);
    out.resize(8 + padded, 0);
    out.extend_from_slice(&total.to_le_bytes());
    out
}

fn ng_section_header() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x1a2b_3c4du32.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&(-1i64).to_le_bytes());
    ng_block(0x0a0d_0d0a, &body)
}

fn ng_interface(linktype: u16) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&linktype.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&65_535u32.to_le_bytes());
    ng_block(1, &body)
}

fn ng_enhanced_packet(if_id: u32, packet: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&if_id.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&(packet.len() as u32).to_le_bytes());
    body.extend_from_slice(&(packet.len() as u32).to_le_bytes());
    body.extend_from_slice(packet);
    ng_block(6, &body)
}

fn ng_simple_packet(packet: &[u8]) -> Vec<u8> {
    let mut body = (packet.len() as u32).to_le_bytes().to_vec();
    body.extend_from_slice(packet);
    ng_block(3, &body)
}

#[test]
fn listen_delivers_filtered_messages_in_order() {
    let stop = StopFlag::new();
    let mut datagrams: VecDeque<Vec<u8>> = records().into();
    datagrams.push_back(vec![0x00]);
    let mut receiver = QueueReceiver {
        queue: datagrams,
        current: Vec::new(),
        stop: stop.clone(),
    };
    let options = ListenOptions {
        filter: MessageFilter::new().with_stocks(["msft", "AAPL"]),
        ..ListenOptions::default()
    };
    let mut sink = VecSink::default();

    let summary = listen(&mut receiver, &mut sink, &options, &stop).unwrap();

    assert_eq!(summary.stats.received, 5);
    assert_eq!(summary.stats.delivered, 2);
    assert_eq!(summary.stats.filtered_out, 2);
    assert_eq!(summary.stats.frame_errors, 1);
    let stocks: Vec<_> = sink
        .messages
        .iter()
        .map(|(seq, message)| (*seq, message.stock().unwrap().to_string()))
        .collect();
    assert_eq!(stocks, vec![(1, "AAPL".to_string()), (2, "MSFT".to_string())]);
}

#[test]
fn listen_stops_at_max_messages() {
    let stop = StopFlag::new();
    let mut receiver = QueueReceiver {
        queue: records().into(),
        current: Vec::new(),
        stop: stop.clone(),
    };
    let options = ListenOptions {
        max_messages: Some(1),
        ..ListenOptions::default()
    };
    let mut sink = VecSink::default();
    let summary = listen(&mut receiver, &mut sink, &options, &stop).unwrap();
    assert_eq!(summary.stats.delivered, 1);
    assert_eq!(receiver.queue.len(), 3);
}

#[test]
fn decode_raw_capture_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("feed.itch");
    fs::write(&path, records().concat()).unwrap();

    let mut source = open_capture(&path, None).unwrap();
    let mut sink = VecSink::default();
    let summary = decode_source(
        source.as_mut(),
        &mut sink,
        &ListenOptions::default(),
        &StopFlag::new(),
    )
    .unwrap();

    assert_eq!(summary.stats.received, 4);
    assert_eq!(summary.stats.delivered, 4);
    assert_eq!(summary.stats.unknown, 1);
    assert!(matches!(sink.messages[1].1, ItchMessage::OrderDelete(ref d) if d.order_ref == 7));
}

#[test]
fn pcap_capture_yields_udp_payloads_for_port() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("feed.pcap");
    let records = records();
    let datagrams = vec![
        (12345, records[0].clone()),
        (9999, records[1].clone()),
        (12345, records[2].clone()),
    ];
    fs::write(&path, legacy_pcap(&datagrams)).unwrap();

    let mut source = open_capture(&path, Some(12345)).unwrap();
    assert_eq!(source.next_record().unwrap(), Some(records[0].clone()));
    assert_eq!(source.next_record().unwrap(), Some(records[2].clone()));
    assert_eq!(source.next_record().unwrap(), None);

    let mut all = open_capture(&path, None).unwrap();
    let mut count = 0;
    while all.next_record().unwrap().is_some() {
        count += 1;
    }
    assert_eq!(count, 3);
}

#[test]
fn pcapng_capture_maps_packets_to_their_interface() {
    const ETHERNET: u16 = 1;
    const RAW: u16 = 101;
    let records = records();
    let mut capture = Vec::new();
    capture.extend(ng_section_header());
    capture.extend(ng_interface(ETHERNET));
    capture.extend(ng_interface(RAW));
    capture.extend(ng_enhanced_packet(1, &raw_ip_udp(&records[2])));
    capture.extend(ng_enhanced_packet(0, &ethernet_udp(12345, &records[0])));
    capture.extend(ng_simple_packet(&ethernet_udp(12345, &records[1])));
    // A new section drops the previous interfaces, so id 0 is raw IP here.
    capture.extend(ng_section_header());
    capture.extend(ng_interface(RAW));
    capture.extend(ng_enhanced_packet(0, &raw_ip_udp(&records[3])));

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("feed.pcapng");
    fs::write(&path, capture).unwrap();

    let mut source = open_capture(&path, Some(12345)).unwrap();
    let mut yielded = Vec::new();
    while let Some(record) = source.next_record().unwrap() {
        yielded.push(record);
    }
    assert_eq!(
        yielded,
        vec![
            records[2].clone(),
            records[0].clone(),
            records[1].clone(),
            records[3].clone(),
        ]
    );
}

#[test]
fn missing_capture_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = match open_capture(&temp.path().join("missing.itch"), None) {
        Ok(_) => panic!("expected missing file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, itchcast_core::SourceError::Io(_)));
}
