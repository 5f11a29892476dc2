//! Push-to-pull byte relay.
//!
//! The media extractor emits bytes whenever it has them; the playback sink
//! reads on its own schedule. [`relay`] bridges the two over an unbounded
//! channel with an end-of-stream sentinel. Buffering is unbounded on
//! purpose: clip lengths are capped per round, so the producer can never
//! run far ahead for long.

use bytes::Bytes;
use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;

/// Creates a connected producer/consumer pair for one playback pipeline.
pub fn relay() -> (RelaySink, RelayStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RelaySink { tx }, RelayStream { rx, pending: None })
}

/// The producer half, handed to the media extractor.
#[derive(Debug, Clone)]
pub struct RelaySink {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl RelaySink {
    /// Buffers one chunk for the consumer. Returns `false` once the
    /// consumer is gone.
    pub fn write(&self, chunk: Bytes) -> bool {
        self.tx.send(chunk).is_ok()
    }

    /// Signals end-of-stream. Dropping the sink is equivalent.
    pub fn finish(self) {}
}

/// The consumer half, handed to the playback sink.
#[derive(Debug)]
pub struct RelayStream {
    rx: mpsc::UnboundedReceiver<Bytes>,
    pending: Option<Bytes>,
}

impl RelayStream {
    /// Reads the next buffered chunk; `None` means end-of-stream.
    pub async fn read(&mut self) -> Option<Bytes> {
        if let Some(chunk) = self.pending.take() {
            return Some(chunk);
        }
        self.rx.recv().await
    }
}

impl AsyncRead for RelayStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            if let Some(chunk) = this.pending.as_mut() {
                let take = chunk.len().min(buf.remaining());
                buf.put_slice(&chunk.split_to(take));
                if chunk.is_empty() {
                    this.pending = None;
                }
                return Poll::Ready(Ok(()));
            }
            match this.rx.poll_recv(cx) {
                Poll::Ready(Some(chunk)) => {
                    if !chunk.is_empty() {
                        this.pending = Some(chunk);
                    }
                }
                // Sender dropped or finished: EOF.
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn chunks_arrive_in_order_then_eof() {
        let (sink, mut stream) = relay();
        assert!(sink.write(Bytes::from_static(b"first")));
        assert!(sink.write(Bytes::from_static(b"second")));
        sink.finish();

        assert_eq!(stream.read().await.unwrap(), Bytes::from_static(b"first"));
        assert_eq!(stream.read().await.unwrap(), Bytes::from_static(b"second"));
        assert!(stream.read().await.is_none());
    }

    #[tokio::test]
    async fn dropping_the_sink_is_end_of_stream() {
        let (sink, mut stream) = relay();
        sink.write(Bytes::from_static(b"only"));
        drop(sink);

        assert_eq!(stream.read().await.unwrap(), Bytes::from_static(b"only"));
        assert!(stream.read().await.is_none());
    }

    #[tokio::test]
    async fn write_fails_once_the_consumer_is_gone() {
        let (sink, stream) = relay();
        drop(stream);
        assert!(!sink.write(Bytes::from_static(b"late")));
    }

    #[tokio::test]
    async fn async_read_carries_partial_chunks() {
        let (sink, mut stream) = relay();
        sink.write(Bytes::from_static(b"hello world"));
        sink.finish();

        let mut small = [0u8; 5];
        stream.read_exact(&mut small).await.unwrap();
        assert_eq!(&small, b"hello");

        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b" world");
    }

    #[tokio::test]
    async fn async_read_reports_eof_as_zero_bytes() {
        let (sink, mut stream) = relay();
        sink.finish();

        let mut buf = [0u8; 8];
        // Disambiguated: `RelayStream::read` is the chunk-level API.
        let read = AsyncReadExt::read(&mut stream, &mut buf).await.unwrap();
        assert_eq!(read, 0);
    }

    #[tokio::test]
    async fn producer_can_run_ahead_of_the_consumer() {
        let (sink, mut stream) = relay();
        for i in 0..256u16 {
            assert!(sink.write(Bytes::from(i.to_le_bytes().to_vec())));
        }
        sink.finish();

        let mut all = Vec::new();
        stream.read_to_end(&mut all).await.unwrap();
        assert_eq!(all.len(), 512);
    }
}
