// src/system/relay.rs

use std::io::{self, Write};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const RELAY_BUFFER_SIZE: usize = 8 * 1024;

/// Inserts a `\r` before every `\n` of `chunk`.
fn translate_line_feeds(chunk: &[u8], out: &mut Vec<u8>) {
    out.clear();
    for &byte in chunk {
        if byte == b'\n' {
            out.push(b'\r');
        }
        out.push(byte);
    }
}

/// Copies `reader` to `writer` until end of file, turning every `\n` into `\r\n`.
///
/// Returns the number of bytes read. The writer is flushed after every chunk so the
/// terminal shows output as soon as the child produces it.
pub async fn relay_crlf<R, W>(mut reader: R, mut writer: W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; RELAY_BUFFER_SIZE];
    let mut translated = Vec::with_capacity(RELAY_BUFFER_SIZE * 2);
    let mut total = 0u64;

    loop {
        let read = reader.read(&mut buffer).await?;
        let Some(chunk) = buffer.get(..read).filter(|chunk| !chunk.is_empty()) else {
            break;
        };
        translate_line_feeds(chunk, &mut translated);
        writer.write_all(&translated).await?;
        writer.flush().await?;
        total += read as u64;
    }
    Ok(total)
}

/// A blocking writer adapter applying the same `\n` -> `\r\n` translation.
///
/// Internal commands write through this when their stream is the raw-mode terminal.
#[derive(Debug)]
pub struct CrlfWriter<W> {
    inner: W,
    scratch: Vec<u8>,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            scratch: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        translate_line_feeds(buf, &mut self.scratch);
        self.inner.write_all(&self.scratch)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
