use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    sync::mpsc,
    task::JoinHandle,
    time,
};

const CHUNK: usize = 8 * 1024;

/// Drain a pipe of the child in background
///
/// The reader is started right after spawn so a child never blocks on a
/// full pipe. Chunks are handed over through a channel, whatever arrived
/// before [`Capture::freeze`] is the captured output.
pub struct Capture {
    rx: mpsc::UnboundedReceiver<Bytes>,
    reader: JoinHandle<()>,
}

async fn forward<R: AsyncRead + Unpin>(mut pipe: R, tx: mpsc::UnboundedSender<Bytes>) {
    let mut buf = BytesMut::with_capacity(CHUNK);
    loop {
        buf.reserve(CHUNK);
        match pipe.read_buf(&mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(buf.split().freeze()).is_err() {
                    // frozen
                    break;
                }
            }
            Err(err) => {
                log::debug!("capture ends early: {}", err);
                break;
            }
        }
    }
}

impl Capture {
    /// start draining `pipe`, a missing pipe yields empty output
    pub fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = match pipe {
            Some(pipe) => tokio::spawn(forward(pipe, tx)),
            None => tokio::spawn(async {}),
        };
        Self { rx, reader }
    }
    /// wait up to `grace` for EOF, then freeze
    ///
    /// Descendants of the child may still hold the pipe open,
    /// so the reader is abandoned after `grace`.
    pub async fn finish(mut self, grace: Duration) -> Vec<u8> {
        if time::timeout(grace, &mut self.reader).await.is_err() {
            log::debug!("pipe still open {:?} after exit, abandon reader", grace);
        }
        self.freeze()
    }
    /// stop capturing, return what was read so far
    ///
    /// Nothing read after this call is appended.
    pub fn freeze(mut self) -> Vec<u8> {
        self.rx.close();
        let mut output = Vec::new();
        while let Ok(chunk) = self.rx.try_recv() {
            output.extend_from_slice(&chunk);
        }
        output
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
