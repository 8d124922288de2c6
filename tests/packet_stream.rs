#![allow(clippy::unwrap_used)]

use std::io::Read;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use pgp_packets::packet::{Packet, SignatureParams};
use pgp_packets::types::{
    CompressionAlgorithm, HashAlgorithm, PublicKeyAlgorithm, S2kMode, SymmetricKeyAlgorithm, Tag,
};
use pgp_packets::{
    copy_all_packets, copy_some_packets, parse_packet, search_packet, skip_some_packets,
    ByteSource,
};

#[test]
fn test_user_id_packet() {
    let _ = pretty_env_logger::try_init();

    let bytes = [0xcd, 0x05, b'A', b'l', b'i', b'c', b'e'];
    let mut src = ByteSource::new(&bytes[..]);

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::UserId(uid) => {
            assert_eq!(&uid.id[..], b"Alice");
            assert_eq!(uid.id.len(), 5);
        }
        other => panic!("expected user id, got {other:?}"),
    }

    assert!(parse_packet(&mut src).unwrap().is_none());
    assert_eq!(src.tell(), bytes.len() as u64);
}

#[test]
fn test_one_pass_signature_packet() {
    let bytes = [
        0x90, 0x0d, 0x03, 0x01, 0x02, 0x01, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x00,
    ];
    let mut src = ByteSource::new(&bytes[..]);

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::OnePassSignature(ops) => {
            assert_eq!(ops.version, 3);
            assert_eq!(ops.sig_class, 0x01);
            assert_eq!(ops.digest_algo, HashAlgorithm::SHA1);
            assert_eq!(ops.pubkey_algo, PublicKeyAlgorithm::RSA);
            assert_eq!(format!("{:X}", ops.key_id), "1122334455667788");
            assert_eq!(ops.last, 0);
        }
        other => panic!("expected one-pass signature, got {other:?}"),
    }
    assert_eq!(src.tell(), bytes.len() as u64);
}

#[test]
fn test_minimal_symkey_enc_packet() {
    let bytes = [0xc3, 0x04, 0x04, 0x07, 0x00, 0x02];
    let mut src = ByteSource::new(&bytes[..]);

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::SymKeyEncryptedSessionKey(sk) => {
            assert_eq!(sk.version, 4);
            assert_eq!(sk.cipher, SymmetricKeyAlgorithm::Other(7));
            assert_eq!(sk.s2k.mode, S2kMode::Simple);
            assert_eq!(sk.s2k.hash, HashAlgorithm::SHA1);
            assert!(sk.session_key.is_empty());
        }
        other => panic!("expected symkey enc, got {other:?}"),
    }
}

#[test]
fn test_partial_body_signature() {
    // new format signature whose body arrives in a one byte chunk followed
    // by a final fixed chunk of 15 bytes
    let bytes = [
        0xc2, 0xe0, // tag 2, first chunk 1 << 0
        0x04, // chunk 1: version
        0x0f, // final chunk: 15 bytes
        0x00, 0x11, 0x02, // sig class, dsa, sha1
        0x00, 0x00, // empty hashed area
        0x00, 0x00, // empty unhashed area
        0xab, 0xcd, // digest start
        0x00, 0x01, 0x01, // dsa r
        0x00, 0x01, 0x01, // dsa s
    ];
    let mut src = ByteSource::new(&bytes[..]);

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::Signature(sig) => {
            assert_eq!(sig.version, 4);
            assert_eq!(sig.sig_class, 0x00);
            assert_eq!(sig.pubkey_algo, PublicKeyAlgorithm::DSA);
            assert_eq!(sig.digest_algo, HashAlgorithm::SHA1);
            assert_eq!(sig.digest_start, [0xab, 0xcd]);
            // no subpacket areas, so no timestamp and no issuer
            assert_eq!(sig.created, None);
            assert_eq!(sig.key_id, None);
            match &sig.params {
                SignatureParams::Dsa { r, s } => {
                    assert_eq!(r.bits(), 1);
                    assert_eq!(s.bits(), 1);
                }
                other => panic!("expected dsa params, got {other:?}"),
            }
        }
        other => panic!("expected signature, got {other:?}"),
    }

    // the partial body is fully consumed and the mode is gone
    assert!(parse_packet(&mut src).unwrap().is_none());
    assert!(!src.in_block_mode());
}

#[test]
fn test_indeterminate_compressed_packet() {
    let mut bytes = vec![0xa3, 0x01];
    let stream = [0x78u8, 0x9c, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01];
    bytes.extend_from_slice(&stream);

    let mut src = ByteSource::new(&bytes[..]);
    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::CompressedData(mut cd) => {
            assert_eq!(cd.algorithm, CompressionAlgorithm::ZIP);
            // the compression layer delimits itself; the source must not be
            // in block mode
            assert!(!cd.body().source().in_block_mode());

            let mut data = Vec::new();
            cd.read_to_end(&mut data).unwrap();
            assert_eq!(data, stream);
        }
        other => panic!("expected compressed data, got {other:?}"),
    }
}

#[test]
fn test_literal_data_packet() {
    let bytes = [
        0xcb, 0x0f, // new format, tag 11, 15 bytes
        0x62, // mode 'b'
        0x04, b't', b'e', b's', b't', // name
        0x00, 0x00, 0x00, 0x00, // created
        b'h', b'e', b'l', b'l', b'o',
    ];
    let mut src = ByteSource::new(&bytes[..]);

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::LiteralData(mut lit) => {
            assert_eq!(lit.mode, pgp_packets::packet::DataMode::Binary);
            assert_eq!(&lit.file_name[..], b"test");
            assert_eq!(lit.created.timestamp(), 0);
            assert_eq!(lit.len, Some(5));

            let mut data = Vec::new();
            lit.read_to_end(&mut data).unwrap();
            assert_eq!(data, b"hello");
        }
        other => panic!("expected literal data, got {other:?}"),
    }
    assert!(parse_packet(&mut src).unwrap().is_none());
}

#[test]
fn test_partial_body_literal_data() {
    let bytes = [
        0xcb, 0xe1, // tag 11, first chunk 1 << 1
        0x62, 0x00, // chunk 1: mode 'b', empty name
        0x09, // final chunk: 9 bytes
        0x00, 0x00, 0x00, 0x00, // created
        b'h', b'e', b'l', b'l', b'o',
    ];
    let mut src = ByteSource::new(&bytes[..]);

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::LiteralData(mut lit) => {
            assert!(lit.file_name.is_empty());
            // the enclosing length is unknown for partial bodies
            assert_eq!(lit.len, None);

            let mut data = Vec::new();
            lit.read_to_end(&mut data).unwrap();
            assert_eq!(data, b"hello");
        }
        other => panic!("expected literal data, got {other:?}"),
    }
    assert!(!src.in_block_mode());
    assert!(parse_packet(&mut src).unwrap().is_none());
}

#[test]
fn test_encrypted_data_packet() {
    let mut bytes = vec![0xc9, 0x0c]; // new format, tag 9, 12 bytes
    let ciphertext: Vec<u8> = (0u8..12).collect();
    bytes.extend_from_slice(&ciphertext);

    let mut src = ByteSource::new(&bytes[..]);
    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::SymEncryptedData(mut enc) => {
            assert_eq!(enc.len, Some(12));
            let mut data = Vec::new();
            enc.read_to_end(&mut data).unwrap();
            assert_eq!(data, ciphertext);
        }
        other => panic!("expected encrypted data, got {other:?}"),
    }
}

#[test]
fn test_encrypted_data_too_short() {
    let bytes = [0xc9, 0x04, 1, 2, 3, 4];
    let mut src = ByteSource::new(&bytes[..]);
    let err = parse_packet(&mut src).unwrap_err();
    assert!(err.is_invalid_packet());
    // the body was drained, the stream ends cleanly
    assert!(parse_packet(&mut src).unwrap().is_none());
}

#[test]
fn test_zero_type_is_skipped() {
    let bytes = [0x80, 0x00];
    let mut src = ByteSource::new(&bytes[..]);
    assert!(parse_packet(&mut src).unwrap().is_none());
    assert_eq!(src.tell(), 2);
}

#[test]
fn test_marker_packet_is_skipped() {
    // marker, then a user id
    let bytes = [
        0xa8, 0x03, 0x50, 0x47, 0x50, // "PGP"
        0xcd, 0x02, b'h', b'i',
    ];
    let mut src = ByteSource::new(&bytes[..]);
    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    assert_eq!(pkt.tag(), Tag::UserId);
}

#[test]
fn test_v3_signature_packet() {
    let bytes = [
        0x88, 0x16, // old format, tag 2, 22 bytes
        0x03, 0x05, 0x00, // version, md5len, sig class
        0x36, 0x50, 0x00, 0x00, // timestamp
        0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, // key id
        0x01, 0x01, // rsa, md5
        0xbe, 0xef, // digest start
        0x00, 0x01, 0x01, // rsa integer
    ];
    let mut src = ByteSource::new(&bytes[..]);

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::Signature(sig) => {
            assert_eq!(sig.version, 3);
            assert_eq!(sig.md5_len, 5);
            assert_eq!(sig.sig_class, 0x00);
            assert_eq!(sig.created.unwrap().timestamp(), 0x3650_0000);
            assert_eq!(format!("{:X}", sig.key_id.unwrap()), "1122334455667788");
            assert_eq!(sig.digest_start, [0xbe, 0xef]);
            assert!(matches!(sig.params, SignatureParams::Rsa { .. }));
        }
        other => panic!("expected signature, got {other:?}"),
    }
}

fn v4_signature_with_subpackets() -> Vec<u8> {
    let mut body = vec![
        0x04, 0x10, // version, sig class
        0x01, 0x02, // rsa, sha1
    ];
    // hashed area: signature creation time 0x01020304
    body.extend_from_slice(&[0x00, 0x06, 0x05, 0x02, 0x01, 0x02, 0x03, 0x04]);
    // unhashed area: issuer key id
    body.extend_from_slice(&[
        0x00, 0x0a, 0x09, 0x10, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88,
    ]);
    body.extend_from_slice(&[0xbe, 0xef]); // digest start
    body.extend_from_slice(&[0x00, 0x01, 0x01]); // rsa integer

    let mut bytes = vec![0xc2, body.len() as u8];
    bytes.extend_from_slice(&body);
    bytes
}

#[test]
fn test_v4_signature_subpacket_extraction() {
    let bytes = v4_signature_with_subpackets();
    let mut src = ByteSource::new(&bytes[..]);

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::Signature(sig) => {
            assert_eq!(sig.version, 4);
            assert_eq!(sig.created.unwrap().timestamp(), 0x0102_0304);
            assert_eq!(format!("{:X}", sig.key_id.unwrap()), "1122334455667788");
            // the stored areas keep their on-wire length prefix
            assert_eq!(
                sig.hashed.as_deref().unwrap(),
                &[0x00, 0x06, 0x05, 0x02, 0x01, 0x02, 0x03, 0x04]
            );
            assert_eq!(sig.unhashed.as_deref().unwrap().len(), 12);
        }
        other => panic!("expected signature, got {other:?}"),
    }
}

#[test]
fn test_v4_public_key_packet() {
    let bytes = [
        0x98, 0x12, // old format, tag 6, 18 bytes
        0x04, // version
        0x36, 0x50, 0x00, 0x00, // created
        0x11, // dsa
        0x00, 0x01, 0x01, // p
        0x00, 0x01, 0x01, // q
        0x00, 0x01, 0x01, // g
        0x00, 0x01, 0x01, // y
    ];
    let mut src = ByteSource::new(&bytes[..]);

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::PublicKey(key) => {
            assert_eq!(key.version, 4);
            assert_eq!(key.valid_days, 0);
            assert_eq!(key.algorithm, PublicKeyAlgorithm::DSA);
            assert!(matches!(
                key.params,
                pgp_packets::packet::PublicParams::Dsa { .. }
            ));
        }
        other => panic!("expected public key, got {other:?}"),
    }
}

#[test]
fn test_protected_secret_key_rsa_drops_iv() {
    // v4 rsa secret key, s2k protected (extended 255 form, salted s2k)
    let mut body = vec![0x04];
    body.extend_from_slice(&[0x36, 0x50, 0x00, 0x00]); // created
    body.push(0x01); // rsa
    body.extend_from_slice(&[0x00, 0x01, 0x01]); // n
    body.extend_from_slice(&[0x00, 0x01, 0x01]); // e
    body.push(255); // extended protection
    body.push(0x02); // cipher: 3des
    body.extend_from_slice(&[0x01, 0x02]); // s2k: salted, sha1
    body.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]); // salt
    body.extend_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]); // iv
    for _ in 0..4 {
        body.extend_from_slice(&[0x00, 0x01, 0x01]); // d, p, q, u
    }
    body.extend_from_slice(&[0xab, 0xcd]); // checksum

    let mut bytes = vec![0x94, body.len() as u8]; // old format, tag 5
    bytes.extend_from_slice(&body);

    let mut src = ByteSource::new(&bytes[..]);
    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::SecretKey(key) => {
            assert_eq!(key.details.algorithm, PublicKeyAlgorithm::RSA);
            let protection = key.protection.expect("protected");
            assert_eq!(protection.cipher, SymmetricKeyAlgorithm::TripleDES);
            assert_eq!(protection.s2k.mode, S2kMode::Salted);
            assert_eq!(protection.s2k.salt, Some([1, 2, 3, 4, 5, 6, 7, 8]));
            // the legacy rsa path never stored an IV for ciphers other than
            // blowfish160
            assert_eq!(protection.iv, None);
            assert_eq!(key.checksum, Some(0xabcd));
        }
        other => panic!("expected secret key, got {other:?}"),
    }
}

#[test]
fn test_legacy_protected_elgamal_secret_key() {
    let mut body = vec![0x04];
    body.extend_from_slice(&[0x36, 0x50, 0x00, 0x00]); // created
    body.push(16); // elgamal
    for _ in 0..3 {
        body.extend_from_slice(&[0x00, 0x01, 0x01]); // p, g, y
    }
    body.push(4); // legacy protection: blowfish160 cipher byte
    body.extend_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]); // iv
    body.extend_from_slice(&[0x00, 0x01, 0x01]); // x
    body.extend_from_slice(&[0xab, 0xcd]); // checksum

    let mut bytes = vec![0x94, body.len() as u8];
    bytes.extend_from_slice(&body);

    let mut src = ByteSource::new(&bytes[..]);
    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::SecretKey(key) => {
            let protection = key.protection.expect("protected");
            assert_eq!(protection.cipher, SymmetricKeyAlgorithm::Blowfish160);
            // fabricated s2k for the pre-s2k format
            assert_eq!(protection.s2k.mode, S2kMode::Simple);
            assert_eq!(protection.s2k.hash, HashAlgorithm::RIPEMD160);
            assert_eq!(protection.iv, Some([9, 10, 11, 12, 13, 14, 15, 16]));
        }
        other => panic!("expected secret key, got {other:?}"),
    }
}

#[test]
fn test_subkey_comment_quirk_is_skipped() {
    // a public subkey whose version byte is '#': an rfc1991 comment stored
    // by very old implementations, to be skipped
    let bytes = [0xb8, 0x06, b'#', b'h', b'e', b'l', b'l', b'o'];
    let mut src = ByteSource::new(&bytes[..]);
    assert!(parse_packet(&mut src).unwrap().is_none());
    assert_eq!(src.tell(), bytes.len() as u64);
}

#[test]
fn test_search_returns_matching_subsequence() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0xcd, 0x03, b'o', b'n', b'e']);
    bytes.extend_from_slice(&[0xc3, 0x04, 0x04, 0x07, 0x00, 0x02]);
    bytes.extend_from_slice(&[0xcd, 0x03, b't', b'w', b'o']);

    let mut src = ByteSource::new(&bytes[..]);

    let (pos, pkt) = search_packet(&mut src, Tag::UserId).unwrap().unwrap();
    assert_eq!(pos, 0);
    match pkt {
        Packet::UserId(uid) => assert_eq!(&uid.id[..], b"one"),
        other => panic!("expected user id, got {other:?}"),
    }

    let (pos, pkt) = search_packet(&mut src, Tag::UserId).unwrap().unwrap();
    assert_eq!(pos, 11);
    match pkt {
        Packet::UserId(uid) => assert_eq!(&uid.id[..], b"two"),
        other => panic!("expected user id, got {other:?}"),
    }

    assert!(search_packet(&mut src, Tag::UserId).unwrap().is_none());
}

#[test]
fn test_skip_some_packets() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0xcd, 0x03, b'o', b'n', b'e']);
    bytes.extend_from_slice(&[0xcd, 0x03, b't', b'w', b'o']);
    bytes.extend_from_slice(&[0xcd, 0x05, b't', b'h', b'r', b'e', b'e']);

    let mut src = ByteSource::new(&bytes[..]);
    skip_some_packets(&mut src, 2).unwrap();

    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    match pkt {
        Packet::UserId(uid) => assert_eq!(&uid.id[..], b"three"),
        other => panic!("expected user id, got {other:?}"),
    }
}

#[test]
fn test_copy_all_is_byte_identical() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0xcd, 0x05, b'A', b'l', b'i', b'c', b'e']);
    bytes.extend_from_slice(&[
        0x90, 0x0d, 0x03, 0x01, 0x02, 0x01, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x00,
    ]);
    bytes.extend_from_slice(&v4_signature_with_subpackets());

    let mut src = ByteSource::new(&bytes[..]);
    let mut out = Vec::new();
    copy_all_packets(&mut src, &mut out).unwrap();
    assert_eq!(out, bytes);
}

#[test]
fn test_copy_drops_deleted_packets() {
    let mut bytes = vec![0x80, 0x00]; // deleted entry
    bytes.extend_from_slice(&[0xcd, 0x02, b'h', b'i']);

    let mut src = ByteSource::new(&bytes[..]);
    let mut out = Vec::new();
    copy_all_packets(&mut src, &mut out).unwrap();
    assert_eq!(out, &bytes[2..]);
}

#[test]
fn test_copy_some_stops_at_offset() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0xcd, 0x03, b'o', b'n', b'e']);
    bytes.extend_from_slice(&[0xcd, 0x03, b't', b'w', b'o']);

    let mut src = ByteSource::new(&bytes[..]);
    let mut out = Vec::new();
    copy_some_packets(&mut src, &mut out, 5).unwrap();
    assert_eq!(out, &bytes[..5]);
}

#[test]
fn test_list_mode_smoke() {
    // exercise the printing paths once; output goes to the captured stdout
    let previous = pgp_packets::set_packet_list_mode(true, true);

    let bytes = v4_signature_with_subpackets();
    let mut src = ByteSource::new(&bytes[..]);
    let pkt = parse_packet(&mut src).unwrap().expect("one packet");
    assert_eq!(pkt.tag(), Tag::Signature);

    pgp_packets::set_packet_list_mode(previous, false);
}

fn encode_user_id(body: &[u8], old_format: bool) -> Vec<u8> {
    let len = body.len();
    let mut bytes = Vec::with_capacity(len + 6);
    if old_format {
        if len < 256 {
            bytes.push(0x80 | (13 << 2));
            bytes.push(len as u8);
        } else {
            bytes.push(0x80 | (13 << 2) | 1);
            bytes.extend_from_slice(&(len as u16).to_be_bytes());
        }
    } else {
        bytes.push(0xc0 | 13);
        if len < 192 {
            bytes.push(len as u8);
        } else if len < 8384 {
            bytes.push((((len - 192) >> 8) + 192) as u8);
            bytes.push(((len - 192) & 0xff) as u8);
        } else {
            bytes.push(255);
            bytes.extend_from_slice(&(len as u32).to_be_bytes());
        }
    }
    bytes.extend_from_slice(body);
    bytes
}

proptest! {
    #[test]
    fn prop_length_budget(
        body in proptest::collection::vec(any::<u8>(), 0..600),
        old_format in any::<bool>(),
    ) {
        let bytes = encode_user_id(&body, old_format);
        let mut src = ByteSource::new(&bytes[..]);

        let pkt = parse_packet(&mut src).unwrap().expect("one packet");
        match pkt {
            Packet::UserId(uid) => prop_assert_eq!(&uid.id[..], &body[..]),
            other => prop_assert!(false, "expected user id, got {:?}", other),
        }
        // exactly header plus body consumed
        prop_assert_eq!(src.tell(), bytes.len() as u64);
        prop_assert!(parse_packet(&mut src).unwrap().is_none());
    }

    #[test]
    fn prop_copy_roundtrip(
        bodies in proptest::collection::vec(
            (proptest::collection::vec(any::<u8>(), 0..300), any::<bool>()),
            1..8,
        ),
    ) {
        let mut bytes = Vec::new();
        for (body, old_format) in &bodies {
            bytes.extend_from_slice(&encode_user_id(body, *old_format));
        }

        let mut src = ByteSource::new(&bytes[..]);
        let mut out = Vec::new();
        copy_all_packets(&mut src, &mut out).unwrap();
        prop_assert_eq!(out, bytes);
    }

    #[test]
    fn prop_truncated_packet_never_decodes(
        body in proptest::collection::vec(any::<u8>(), 1..300),
        old_format in any::<bool>(),
    ) {
        let mut bytes = encode_user_id(&body, old_format);
        bytes.pop();

        let mut src = ByteSource::new(&bytes[..]);
        let err = parse_packet(&mut src).unwrap_err();
        prop_assert!(err.is_invalid_packet() || err.is_read_error());
    }
}
