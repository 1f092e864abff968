//! Peer tables shared by the integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use unpadded::WireFormat;
use unpadded::rpc::{Dispatcher, Keyring, Registry, Scalar, Signature, Value};

// ── Byte-level table ──────────────────────────────────────────

pub fn double(args: &[u8], out: &mut [u8]) {
    let v = u16::from_le_bytes([args[0], args[1]]);
    out.copy_from_slice(&v.wrapping_mul(2).to_le_bytes());
}

pub fn triple(args: &[u8], out: &mut [u8]) {
    let v = u16::from_le_bytes([args[0], args[1]]);
    out.copy_from_slice(&v.wrapping_mul(3).to_le_bytes());
}

fn noop(_: &[u8], _: &mut [u8]) {}

/// 0x00: no-arg, 0x01: 2-byte-arg doubling, 0x02: no-arg.
pub fn doubling_peer() -> Dispatcher {
    let mut r = Registry::new(3).unwrap();
    r.register(0x00, 0, 0, noop).unwrap();
    r.register(0x01, 2, 2, double).unwrap();
    r.register(0x02, 0, 0, noop).unwrap();
    Dispatcher::new(r).unwrap()
}

// ── Typed calculator table ────────────────────────────────────

pub fn calculator_keyring(format: WireFormat) -> Keyring {
    Keyring::new(
        format,
        vec![
            Signature::new("add", &[Scalar::I16, Scalar::I16], Some(Scalar::I16)).unwrap(),
            Signature::new("negate", &[Scalar::I32], Some(Scalar::I32)).unwrap(),
            Signature::new("is_even", &[Scalar::U64], Some(Scalar::Bool)).unwrap(),
            Signature::new("store", &[Scalar::U8], None).unwrap(),
            Signature::new("load", &[], Some(Scalar::U8)).unwrap(),
        ],
    )
    .unwrap()
}

/// Peer for `calculator_keyring`; `store`/`load` share one cell.
pub fn calculator_peer(keyring: &Keyring) -> Dispatcher {
    let cell = Arc::new(AtomicU8::new(0));
    let stored = Arc::clone(&cell);

    let mut r = Registry::new(keyring.len()).unwrap();
    r.register_action(
        0,
        keyring
            .action(0, |args| {
                let a = args[0].as_i64()? as i16;
                let b = args[1].as_i64()? as i16;
                Some(a.wrapping_add(b).into())
            })
            .unwrap(),
    )
    .unwrap();
    r.register_action(
        1,
        keyring
            .action(1, |args| Some(Value::Signed(-args[0].as_i64()?)))
            .unwrap(),
    )
    .unwrap();
    r.register_action(
        2,
        keyring
            .action(2, |args| Some((args[0].as_u64()? % 2 == 0).into()))
            .unwrap(),
    )
    .unwrap();
    r.register_action(
        3,
        keyring
            .action(3, move |args| {
                stored.store(args[0].as_u64()? as u8, Ordering::Relaxed);
                None
            })
            .unwrap(),
    )
    .unwrap();
    r.register_action(
        4,
        keyring
            .action(4, move |_| Some(cell.load(Ordering::Relaxed).into()))
            .unwrap(),
    )
    .unwrap();
    Dispatcher::new(r).unwrap()
}
