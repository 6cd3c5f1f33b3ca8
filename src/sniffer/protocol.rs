// src/sniffer/protocol.rs
//! External capability contracts consumed by the interception core
//!
//! The core never implements a wire protocol or a transport itself: a
//! [`Protocol`] decoder comes from a plugin factory and a [`Reader`] comes
//! from the transport layer, one per traffic direction. [`IoReader`] adapts
//! any tokio `AsyncRead` (sockets, pipes, in-memory buffers) to the
//! [`Reader`] contract.

use crate::utils::errors::Result;
use bytes::Bytes;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Traffic direction of one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Client to server
    Outgoing,
    /// Server to client
    Incoming,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outgoing => write!(f, "outgoing"),
            Direction::Incoming => write!(f, "incoming"),
        }
    }
}

/// Protocol decoder bound to one connection
///
/// Produced by a plugin factory, owned by exactly one interceptor. Turns one
/// raw chunk into a loggable summary; an `Err` is a fatal decode error that
/// stops the worker and marks the interceptor for reclamation.
pub trait Protocol: Send {
    fn describe(&mut self, direction: Direction, payload: &[u8]) -> Result<String>;
}

/// Transport-level chunk source for one traffic direction
///
/// `Ok(Some(bytes))` delivers the next chunk, `Ok(None)` signals
/// end-of-stream, `Err` a transport failure. Both terminal outcomes make the
/// direction worker stop and mark its interceptor.
pub trait Reader: Send {
    fn next_chunk(&mut self) -> BoxFuture<'_, io::Result<Option<Bytes>>>;
}

/// Default chunk size for [`IoReader`]
const DEFAULT_CHUNK_SIZE: usize = 4096;

/// [`Reader`] adapter over any tokio `AsyncRead`
pub struct IoReader<R> {
    inner: R,
    chunk_size: usize,
}

impl<R: AsyncRead + Send + Unpin> IoReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(inner: R, chunk_size: usize) -> Self {
        Self { inner, chunk_size }
    }
}

impl<R: AsyncRead + Send + Unpin> Reader for IoReader<R> {
    fn next_chunk(&mut self) -> BoxFuture<'_, io::Result<Option<Bytes>>> {
        Box::pin(async move {
            let mut buf = vec![0u8; self.chunk_size];
            let n = self.inner.read(&mut buf).await?;
            if n == 0 {
                Ok(None)
            } else {
                buf.truncate(n);
                Ok(Some(Bytes::from(buf)))
            }
        })
    }
}
