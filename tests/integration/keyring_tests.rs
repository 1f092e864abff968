//! Keyring manifests and the keys they produce.

use unpadded::rpc::{Keyring, Value};
use unpadded::{Endianness, WireFormat};

use crate::mock_peer::{calculator_keyring, calculator_peer};

const MANIFEST: &str = r#"{
    "functions": [
        { "name": "f1", "ret": "u8" },
        { "name": "f2", "params": ["u8"] },
        { "name": "f3" },
        { "name": "f4", "params": ["u8"], "ret": "u8" }
    ]
}"#;

#[test]
fn manifest_keys_encode_by_declaration_order() {
    let keyring = Keyring::from_json(MANIFEST).unwrap();
    let encode =
        |name: &str, args: &[Value]| keyring.key_by_name(name).unwrap().encode(args).unwrap();

    assert_eq!(encode("f1", &[]), b"\x00");
    assert_eq!(encode("f2", &[0x10u8.into()]), b"\x01\x10");
    assert_eq!(encode("f3", &[]), b"\x02");
    assert_eq!(encode("f4", &[0x20u8.into()]), b"\x03\x20");
}

#[test]
fn manifest_keys_decode_replies() {
    let keyring = Keyring::from_json(MANIFEST).unwrap();
    let f1 = keyring.key_by_name("f1").unwrap();
    assert_eq!(f1.decode(b"\xee"), Ok(Some(Value::Unsigned(0xee))));
    assert_eq!(f1.decode(b""), Ok(None));
}

#[test]
fn keys_from_json_drive_a_peer_built_in_code() {
    let format = WireFormat::big_endian();
    let host = Keyring::from_json(&calculator_keyring(format).to_json().unwrap()).unwrap();
    assert_eq!(host.format().endianness, Endianness::Big);

    let mut peer = calculator_peer(&calculator_keyring(format));
    let add = host.key_by_name("add").unwrap();
    let packet = add.encode(&[300i16.into(), (-1i16).into()]).unwrap();
    assert_eq!(packet, [0x00, 0x01, 0x2c, 0xff, 0xff]);

    let reply = peer.resolve(&packet).unwrap();
    assert_eq!(reply.as_slice(), [0x01, 0x2b]);
    assert_eq!(add.decode(&reply), Ok(Some(Value::Signed(299))));
}

#[test]
fn postcard_manifest_matches_json() {
    let keyring = calculator_keyring(WireFormat::default());
    let bytes = keyring.to_postcard().unwrap();
    assert_eq!(Keyring::from_postcard(&bytes).unwrap(), keyring);
    assert!(Keyring::from_postcard(&bytes[..bytes.len() / 2]).is_err());
}
