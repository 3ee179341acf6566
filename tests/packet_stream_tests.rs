use tandem::packet::{Packet, PacketCodec, PacketStreamDecoder, ProtocolError};

#[test]
fn two_packets_in_one_chunk_decode_in_arrival_order() {
    let first = Packet::request("first", 1, true, b"[1]".to_vec());
    let second = Packet::request("second", 2, true, b"[2]".to_vec());

    let mut chunk = PacketCodec::encode(&first).expect("encode failed");
    chunk.extend(PacketCodec::encode(&second).expect("encode failed"));

    let mut decoder = PacketStreamDecoder::new();
    decoder.append(&chunk);

    assert_eq!(decoder.next_packet().unwrap(), Some(first));
    assert_eq!(decoder.next_packet().unwrap(), Some(second));
    assert_eq!(decoder.next_packet().unwrap(), None);
    assert_eq!(decoder.buffered_len(), 0);
}

#[test]
fn byte_by_byte_delivery_yields_the_packet_once_complete() {
    let packet = Packet::request("drip", 77, false, b"\"slow network\"".to_vec());
    let wire = PacketCodec::encode(&packet).expect("encode failed");

    let mut decoder = PacketStreamDecoder::new();
    for (i, byte) in wire.iter().enumerate() {
        decoder.append(&[*byte]);
        let decoded = decoder.next_packet().expect("no protocol error expected");
        if i + 1 < wire.len() {
            assert!(decoded.is_none(), "packet surfaced before byte {}", i + 1);
        } else {
            assert_eq!(decoded, Some(packet.clone()));
        }
    }
}

#[test]
fn frame_split_mid_header_resumes_cleanly() {
    let packet = Packet::request("split", 3, true, vec![9; 64]);
    let wire = PacketCodec::encode(&packet).expect("encode failed");

    let mut decoder = PacketStreamDecoder::new();
    decoder.append(&wire[..5]);
    assert_eq!(decoder.next_packet().unwrap(), None);

    decoder.append(&wire[5..]);
    assert_eq!(decoder.next_packet().unwrap(), Some(packet));
}

#[test]
fn lowered_frame_cap_applies_to_the_stream() {
    let packet = Packet::request("big", 4, true, vec![0; 256]);
    let wire = PacketCodec::encode(&packet).expect("encode failed");

    let mut decoder = PacketStreamDecoder::with_max_frame_bytes(64);
    decoder.append(&wire);

    let err = decoder
        .next_packet()
        .expect_err("frame above the cap must be rejected");
    assert!(matches!(err, ProtocolError::FrameTooLarge { .. }));
}

#[test]
fn trailing_bytes_after_a_packet_stay_buffered() {
    let packet = Packet::request("keep", 8, false, b"[]".to_vec());
    let mut wire = PacketCodec::encode(&packet).expect("encode failed");
    wire.extend_from_slice(&[0, 0]); // start of the next frame's length field

    let mut decoder = PacketStreamDecoder::new();
    decoder.append(&wire);

    assert_eq!(decoder.next_packet().unwrap(), Some(packet));
    assert_eq!(decoder.buffered_len(), 2);
    assert_eq!(decoder.next_packet().unwrap(), None);
}
