// src/testutil.rs
//! Shared test doubles: in-memory sinks, readers and decoders

use crate::sniffer::protocol::{Direction, Protocol, Reader};
use crate::utils::errors::Result;
use bytes::Bytes;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

/// In-memory `AsyncWrite` whose contents stay inspectable through clones
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contents_utf8(&self) -> String {
        String::from_utf8(self.inner.lock().clone()).expect("log output not utf-8")
    }
}

impl AsyncWrite for SharedBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.inner.lock().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Reader fed chunk by chunk from a channel; dropping the sender is
/// end-of-stream
pub(crate) struct ChannelReader {
    rx: mpsc::UnboundedReceiver<Bytes>,
}

impl ChannelReader {
    pub(crate) fn new() -> (mpsc::UnboundedSender<Bytes>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

impl Reader for ChannelReader {
    fn next_chunk(&mut self) -> BoxFuture<'_, io::Result<Option<Bytes>>> {
        Box::pin(async move { Ok(self.rx.recv().await) })
    }
}

/// Reader whose every read fails
pub(crate) struct FailingReader;

impl Reader for FailingReader {
    fn next_chunk(&mut self) -> BoxFuture<'_, io::Result<Option<Bytes>>> {
        Box::pin(async move {
            Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            ))
        })
    }
}

/// Pass-through decoder: the summary is the chunk itself, lossily decoded
pub(crate) struct EchoProtocol;

impl Protocol for EchoProtocol {
    fn describe(&mut self, _direction: Direction, payload: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(payload).into_owned())
    }
}
