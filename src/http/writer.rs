use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

fn serialize_head(resp: &Response, buf: &mut Vec<u8>) {
    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");
}

pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256 + resp.body.len());
    serialize_head(resp, &mut buf);
    buf.extend_from_slice(&resp.body);
    buf
}

/// Serialized response bytes plus how much of them reached the peer.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    /// Status line and headers only; the body follows as a stream.
    pub fn head_only(response: &Response) -> Self {
        let mut buffer = Vec::with_capacity(256);
        serialize_head(response, &mut buffer);
        Self { buffer, written: 0 }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream
                .write(&self.buffer[self.written..])
                .await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}

/// Moves everything from `source` to `sink` in `chunk_size` pieces.
///
/// Returns the number of bytes written. Stops at end of input; any read or
/// write error ends the transfer.
pub async fn copy_chunked<R, W>(
    source: &mut R,
    sink: &mut W,
    chunk_size: usize,
) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = source.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        sink.write_all(&chunk[..n]).await?;
        total += n as u64;
    }

    sink.flush().await?;
    Ok(total)
}
