//! Peer-side dispatch through the public API.

use unpadded::Error;
use unpadded::rpc::PacketStatus;

use crate::mock_peer::{doubling_peer, triple};

#[test]
fn resolve_doubles_the_argument() {
    let mut peer = doubling_peer();
    assert_eq!(peer.resolve(b"\x01\x10\x00").unwrap().as_slice(), b"\x20\x00");
}

#[test]
fn replaced_handler_answers_with_the_same_width() {
    let mut peer = doubling_peer();
    peer.replace(0x01, triple).unwrap();
    for n in (0..=u16::MAX).step_by(997) {
        let [lo, hi] = n.to_le_bytes();
        let response = peer.resolve(&[0x01, lo, hi]).unwrap();
        assert_eq!(response.as_slice(), n.wrapping_mul(3).to_le_bytes());
    }
}

#[test]
fn streamed_bytes_match_bulk_resolution() {
    let mut streamed = doubling_peer();
    let mut bulk = doubling_peer();
    let packet = [0x01, 0x34, 0x12];

    let statuses: Vec<_> = packet.iter().map(|&b| streamed.put(b).unwrap()).collect();
    assert_eq!(
        statuses,
        [PacketStatus::Loading, PacketStatus::Loading, PacketStatus::Resolved]
    );
    let mut out = Vec::new();
    while streamed.is_loaded() {
        out.push(streamed.get().unwrap());
    }
    assert_eq!(out, bulk.resolve(&packet).unwrap().as_slice());
}

#[test]
fn unknown_opcode_fails_resolution() {
    let mut peer = doubling_peer();
    assert_eq!(peer.resolve(b"\xff"), Err(Error::UnknownOpcode(0xff)));
    assert_eq!(peer.put(0xff), Err(Error::UnknownOpcode(0xff)));
}

#[test]
fn concatenated_packets_leave_the_tail() {
    let mut peer = doubling_peer();
    let batch = peer
        .resolve_completely(b"\x00\x01\x10\x20\x02\x67\x89")
        .unwrap();
    let responses: Vec<&[u8]> = batch.responses.iter().map(|r| r.as_slice()).collect();
    assert_eq!(responses, [&b""[..], &b"\x20\x40"[..], &b""[..]]);
    assert_eq!(batch.unconsumed, 2);

    // A full-length request with an unknown opcode fails the batch.
    assert!(matches!(
        peer.resolve_completely(b"\x67\x89\x00"),
        Err(Error::UnknownOpcode(0x67))
    ));
}
