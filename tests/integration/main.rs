//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one side of the
//! protocol against the shared peer tables in `mock_peer`. Everything
//! runs in-process; no serial link is required.

mod call_tests;
mod dispatch_tests;
mod keyring_tests;
mod mock_peer;
