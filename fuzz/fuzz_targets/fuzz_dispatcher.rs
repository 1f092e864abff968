//! Fuzz target: `Dispatcher::put` / `Dispatcher::resolve_completely`
//!
//! Drives arbitrary byte sequences through the streaming and the bulk
//! interface of the same table and asserts that neither panics, that the
//! response queue never exceeds its buffer, and that the bulk interface
//! never claims more bytes than it was given.
//!
//! cargo fuzz run fuzz_dispatcher

#![no_main]

use libfuzzer_sys::fuzz_target;
use unpadded::rpc::{Dispatcher, Registry};

fn peer() -> Dispatcher<8, 8> {
    let mut r = Registry::new(4).unwrap();
    r.register(0, 0, 1, |_: &[u8], out: &mut [u8]| out[0] = 1).unwrap();
    r.register(1, 2, 2, |args: &[u8], out: &mut [u8]| out.copy_from_slice(args))
        .unwrap();
    r.register(3, 8, 8, |args: &[u8], out: &mut [u8]| out.copy_from_slice(args))
        .unwrap();
    Dispatcher::with_buffers(r).unwrap()
}

fuzz_target!(|data: &[u8]| {
    let mut streaming = peer();
    for &b in data {
        if streaming.put(b).is_err() {
            streaming.reset();
        }
        assert!(streaming.pending() <= 8, "pending queue exceeds its buffer");
        // Drain slowly so the queue can fill up.
        if b & 1 == 0 {
            let _ = streaming.get();
        }
    }

    let mut bulk = peer();
    if let Ok(batch) = bulk.resolve_completely(data) {
        assert_eq!(batch.consumed + batch.unconsumed, data.len());
    }
    let _ = bulk.resolve(data);
});
