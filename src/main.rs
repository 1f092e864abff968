//! upd-peer: a demo peer served over stdin/stdout.
//!
//! ```text
//! stdin ──▶ StdioTransport ──▶ service() ──▶ Dispatcher ──▶ demo handlers
//! stdout ◀──────────────────────────────────── responses
//! ```
//!
//! `upd-peer --manifest` prints the keyring as JSON so a host can build
//! its function keys from it.

// ── Imports ───────────────────────────────────────────────────
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use clap::Parser;
use log::info;

use unpadded::WireFormat;
use unpadded::rpc::codec::{Scalar, Value};
use unpadded::rpc::{Dispatcher, Keyring, Registry, Signature, Transport, service};

/// Calls served since start, reported by `call_count`.
static CALLS: AtomicU32 = AtomicU32::new(0);

// ── Demo table ────────────────────────────────────────────────

fn demo_keyring() -> unpadded::Result<Keyring> {
    Keyring::new(
        WireFormat::default(),
        vec![
            Signature::new("ping", &[], Some(Scalar::U8))?,
            Signature::new("double", &[Scalar::U16], Some(Scalar::U16))?,
            Signature::new("add", &[Scalar::I32, Scalar::I32], Some(Scalar::I32))?,
            Signature::new("set_led", &[Scalar::U8, Scalar::Bool], None)?,
            Signature::new("call_count", &[], Some(Scalar::U32))?,
        ],
    )
}

fn count() {
    CALLS.fetch_add(1, Ordering::Relaxed);
}

fn demo_registry(keyring: &Keyring) -> unpadded::Result<Registry> {
    let mut registry = Registry::new(keyring.len())?;

    registry.register_action(
        0,
        keyring.action(0, |_| {
            count();
            Some(Value::Unsigned(0x55))
        })?,
    )?;
    registry.register_action(
        1,
        keyring.action(1, |args| {
            count();
            let v = args[0].as_u64()? as u16;
            Some(v.wrapping_mul(2).into())
        })?,
    )?;
    registry.register_action(
        2,
        keyring.action(2, |args| {
            count();
            let a = args[0].as_i64()? as i32;
            let b = args[1].as_i64()? as i32;
            Some(a.wrapping_add(b).into())
        })?,
    )?;
    registry.register_action(
        3,
        keyring.action(3, |args| {
            count();
            info!(
                "LED {} -> {}",
                args[0].as_u64().unwrap_or_default(),
                if args[1].as_bool() == Some(true) { "on" } else { "off" }
            );
            None
        })?,
    )?;
    registry.register_action(
        4,
        keyring.action(4, |_| Some(CALLS.load(Ordering::Relaxed).into()))?,
    )?;

    Ok(registry)
}

// ── stdin/stdout transport ────────────────────────────────────

struct StdioTransport {
    stdin: io::Stdin,
    stdout: io::Stdout,
    eof: bool,
}

impl StdioTransport {
    fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
            eof: false,
        }
    }
}

impl Transport for StdioTransport {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stdin.lock().read(buf)?;
        if n == 0 {
            self.eof = true;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stdout.lock().write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.lock().flush()
    }

    fn available(&self) -> bool {
        !self.eof
    }
}

// ── Entry point ───────────────────────────────────────────────

/// Demo peer serving a built-in operation table over stdin/stdout
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Print the keyring as JSON and exit
    #[arg(long, default_value_t = false)]
    manifest: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::init();

    let keyring = demo_keyring()?;
    if args.manifest {
        println!("{}", keyring.to_json()?);
        return Ok(());
    }

    info!(
        "upd-peer v{}: {} operations, {:?}",
        env!("CARGO_PKG_VERSION"),
        keyring.len(),
        keyring.format()
    );

    let mut dispatcher = Dispatcher::new(demo_registry(&keyring)?)?;
    let mut transport = StdioTransport::new();
    let resolved = service(&mut dispatcher, &mut transport)?;

    info!("EOF after {} packets", resolved);
    Ok(())
}
