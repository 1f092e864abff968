//! Host-side call client.
//!
//! The client turns a typed call into a request packet, hands it to a
//! [`RequestTransport`] and decodes whatever comes back. Taking
//! `&mut self` in [`Client::call`] keeps exactly one call outstanding per
//! client.

use core::fmt;

use log::debug;

use super::codec::Value;
use super::key::FunctionKey;
use crate::error::{DecodingError, EncodingError};

/// What a transport hands back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Raw response bytes, decoded by the client through the key.
    Raw(Vec<u8>),
    /// A value the transport already decoded; passed through unchanged.
    Decoded(Option<Value>),
}

/// Sends one request packet and resolves to its reply.
pub trait RequestTransport {
    type Error;

    fn new_request(
        &mut self,
        payload: &[u8],
    ) -> impl Future<Output = Result<Reply, Self::Error>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError<E> {
    Encoding(EncodingError),
    Decoding(DecodingError),
    Transport(E),
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding(e) => write!(f, "encoding: {e}"),
            Self::Decoding(e) => write!(f, "decoding: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for CallError<E> {}

/// Host-side caller for the operations of one peer.
pub struct Client<T> {
    transport: T,
}

impl<T: RequestTransport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Call the operation behind `key` with `args`.
    ///
    /// Resolves to `None` for void operations.
    pub async fn call(
        &mut self,
        key: &FunctionKey,
        args: &[Value],
    ) -> Result<Option<Value>, CallError<T::Error>> {
        let payload = key.encode(args).map_err(CallError::Encoding)?;
        debug!("CLIENT: {} -> {} byte request", key.name(), payload.len());

        let reply = self
            .transport
            .new_request(&payload)
            .await
            .map_err(CallError::Transport)?;

        match reply {
            Reply::Raw(bytes) => key.decode(&bytes).map_err(CallError::Decoding),
            Reply::Decoded(value) => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_lite::future::block_on;

    use super::*;
    use crate::config::WireFormat;
    use crate::rpc::codec::Scalar;
    use crate::rpc::key::Signature;

    /// Records each payload and answers with a canned reply.
    struct Canned {
        sent: Vec<Vec<u8>>,
        reply: Result<Reply, &'static str>,
    }

    impl RequestTransport for Canned {
        type Error = &'static str;

        async fn new_request(&mut self, payload: &[u8]) -> Result<Reply, &'static str> {
            self.sent.push(payload.to_vec());
            self.reply.clone()
        }
    }

    fn client(reply: Result<Reply, &'static str>) -> Client<Canned> {
        Client::new(Canned {
            sent: Vec::new(),
            reply,
        })
    }

    fn key(opcode: u8, params: &[Scalar], ret: Option<Scalar>) -> FunctionKey {
        FunctionKey::new(
            opcode,
            Signature::new("f", params, ret).unwrap(),
            WireFormat::default(),
        )
    }

    #[test]
    fn raw_reply_is_decoded_through_the_key() {
        let mut c = client(Ok(Reply::Raw(vec![0x20, 0x00])));
        let k = key(1, &[Scalar::U16], Some(Scalar::U16));
        let v = block_on(c.call(&k, &[0x10u16.into()])).unwrap();
        assert_eq!(v, Some(Value::Unsigned(0x20)));
        assert_eq!(c.transport().sent, [vec![0x01, 0x10, 0x00]]);
    }

    #[test]
    fn decoded_reply_passes_through() {
        let mut c = client(Ok(Reply::Decoded(Some(Value::Signed(-4)))));
        let k = key(0, &[], Some(Scalar::U8));
        assert_eq!(block_on(c.call(&k, &[])), Ok(Some(Value::Signed(-4))));
    }

    #[test]
    fn empty_raw_reply_is_void() {
        let mut c = client(Ok(Reply::Raw(Vec::new())));
        let k = key(2, &[], None);
        assert_eq!(block_on(c.call(&k, &[])), Ok(None));
    }

    #[test]
    fn bad_arguments_never_reach_the_transport() {
        let mut c = client(Ok(Reply::Raw(Vec::new())));
        let k = key(1, &[Scalar::U8], None);
        assert_eq!(
            block_on(c.call(&k, &[])),
            Err(CallError::Encoding(EncodingError::ArgumentCount {
                expected: 1,
                got: 0
            }))
        );
        assert!(c.into_inner().sent.is_empty());
    }

    #[test]
    fn transport_and_decoding_failures_surface() {
        let mut c = client(Err("link down"));
        let k = key(0, &[], Some(Scalar::U8));
        let err = block_on(c.call(&k, &[])).unwrap_err();
        assert_eq!(err, CallError::Transport("link down"));
        assert_eq!(err.to_string(), "transport: link down");

        let mut c = client(Ok(Reply::Raw(vec![1, 2])));
        assert_eq!(
            block_on(c.call(&k, &[])),
            Err(CallError::Decoding(DecodingError::Length {
                expected: 1,
                got: 2
            }))
        );
    }
}
