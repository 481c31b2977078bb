//! I/O adapter that routes every read and write through the interceptor.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::guard::accounting::AccountingSink;
use crate::guard::interceptor::{Chunk, TrafficInterceptor};

/// Wraps an admitted connection's stream.
///
/// Reads are inbound chunks, writes are outbound chunks. Only completed
/// operations are counted: a pending or failed poll touches nothing, and a
/// zero-length read (EOF) is not a chunk. Errors pass through unchanged.
pub struct MeteredStream<S> {
    inner: S,
    interceptor: Arc<TrafficInterceptor>,
    sink: Arc<dyn AccountingSink>,
}

impl<S> MeteredStream<S> {
    pub fn new(inner: S, interceptor: Arc<TrafficInterceptor>, sink: Arc<dyn AccountingSink>) -> Self {
        Self {
            inner,
            interceptor,
            sink,
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for MeteredStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let result = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = result {
            let chunk = &buf.filled()[before..];
            if !chunk.is_empty() {
                this.interceptor.on_inbound(Chunk::Data(chunk), this.sink.as_ref());
            }
        }
        result
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for MeteredStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let result = Pin::new(&mut this.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = result {
            if n > 0 {
                this.interceptor.on_outbound(Chunk::Data(&buf[..n]), this.sink.as_ref());
            }
        }
        result
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
