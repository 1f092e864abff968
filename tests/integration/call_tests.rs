//! Host-side calls over the in-process transports.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use futures_lite::future::{block_on, or};
use unpadded::config::SignedMode;
use unpadded::rpc::{ByteLink, CallError, Client, FunctionKey, Loopback, Value, serve};
use unpadded::{Error, WireFormat};

use crate::mock_peer::{calculator_keyring, calculator_peer};

fn formats() -> [WireFormat; 3] {
    [
        WireFormat::default(),
        WireFormat::big_endian(),
        WireFormat::little_endian().with_signed_mode(SignedMode::OffsetBinary),
    ]
}

#[test]
fn loopback_calls_every_operation() {
    for format in formats() {
        let keyring = calculator_keyring(format);
        let mut client = Client::new(Loopback::new(calculator_peer(&keyring)));
        let key = |name| keyring.key_by_name(name).unwrap();

        let call = |client: &mut Client<Loopback<64, 64>>, k: FunctionKey, args: &[Value]| {
            block_on(client.call(&k, args)).unwrap()
        };

        assert_eq!(
            call(&mut client, key("add"), &[i16::MAX.into(), 1i16.into()]),
            Some(Value::Signed(i64::from(i16::MIN)))
        );
        assert_eq!(
            call(&mut client, key("negate"), &[123_456i32.into()]),
            Some(Value::Signed(-123_456))
        );
        assert_eq!(
            call(&mut client, key("is_even"), &[u64::MAX.into()]),
            Some(Value::Bool(false))
        );
        assert_eq!(call(&mut client, key("store"), &[7u8.into()]), None);
        assert_eq!(
            call(&mut client, key("load"), &[]),
            Some(Value::Unsigned(7))
        );
    }
}

#[test]
fn loopback_reports_unknown_opcodes() {
    let keyring = calculator_keyring(WireFormat::default());
    let mut client = Client::new(Loopback::new(calculator_peer(&keyring)));
    let stray = FunctionKey::new(
        9,
        keyring.signature(4).unwrap().clone(),
        keyring.format(),
    );
    assert_eq!(
        block_on(client.call(&stray, &[])),
        Err(CallError::Transport(Error::UnknownOpcode(9)))
    );
}

#[test]
fn byte_link_carries_a_session() {
    let keyring = calculator_keyring(WireFormat::big_endian());
    let link = ByteLink::<CriticalSectionRawMutex, 4>::new();
    let mut peer = calculator_peer(&keyring);
    let mut client = Client::new(link.transport(&keyring));

    let session = async {
        let mut results = Vec::new();
        for v in [1u8, 2, 250] {
            client
                .call(&keyring.key_by_name("store").unwrap(), &[v.into()])
                .await
                .unwrap();
            results.push(
                client
                    .call(&keyring.key_by_name("load").unwrap(), &[])
                    .await
                    .unwrap(),
            );
        }
        let negated = client
            .call(&keyring.key_by_name("negate").unwrap(), &[(-9i32).into()])
            .await
            .unwrap();
        results.push(negated);
        Ok(results)
    };

    let results = block_on(or(async { Err(serve(&link, &mut peer).await) }, session));
    assert_eq!(
        results,
        Ok(vec![
            Some(Value::Unsigned(1)),
            Some(Value::Unsigned(2)),
            Some(Value::Unsigned(250)),
            Some(Value::Signed(9)),
        ])
    );
}
