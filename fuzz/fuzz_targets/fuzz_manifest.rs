//! Fuzz target: `Keyring::from_postcard`
//!
//! Arbitrary manifest bytes must either be rejected or load into a
//! keyring whose keys can all be built and measured.
//!
//! cargo fuzz run fuzz_manifest

#![no_main]

use libfuzzer_sys::fuzz_target;
use unpadded::rpc::Keyring;

fuzz_target!(|data: &[u8]| {
    if let Ok(keyring) = Keyring::from_postcard(data) {
        assert!(keyring.len() <= 256);
        for key in keyring.keys() {
            assert_eq!(key.payload_len(), 1 + key.signature().argument_width());
        }
    }
});
