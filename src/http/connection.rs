use std::time::Duration;

use anyhow::Context;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::api::{dispatch, Reply};
use crate::http::parser::{find_headers_end, parse_head, parse_http_request};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{copy_chunked, ResponseWriter};
use crate::server::ServerContext;

/// Size of a single socket read.
const READ_CHUNK: usize = 8192;

/// One client connection, serving exactly one request.
pub struct Connection<S> {
    stream: S,
    ctx: ServerContext,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(Reply),
    Closed,
}

/// Total bytes (headers + body) to accumulate for a request, when it is a
/// POST whose `Content-Length` lies in `(0, max_body)`.
///
/// `buf` must already hold the complete header block.
pub fn body_target(buf: &[u8], max_body: usize) -> Option<usize> {
    let headers_end = find_headers_end(buf)?;
    let head = parse_head(&buf[..headers_end]).ok()?;
    if head.method != Method::POST {
        return None;
    }
    let len = head.content_length()?;
    if len == 0 || len >= max_body {
        return None;
    }
    Some(headers_end + 4 + len)
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, ctx: ServerContext) -> Self {
        Self {
            stream,
            ctx,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);
            self.state = match state {
                ConnectionState::Reading => match self.read_request().await? {
                    Some(raw) => match parse_http_request(raw) {
                        Ok(req) => ConnectionState::Processing(req),
                        Err(e) => {
                            warn!(error = %e, "rejecting malformed request");
                            ConnectionState::Writing(Reply::Full(Response::text(
                                StatusCode::BadRequest,
                                e.to_string(),
                            )))
                        }
                    },
                    None => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    ConnectionState::Writing(dispatch(&req, &self.ctx).await)
                }

                ConnectionState::Writing(reply) => {
                    self.write_reply(reply).await?;
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    /// Reads one request into a single buffer.
    ///
    /// Headers are read until the blank line shows up, the header limit is
    /// reached, or the peer closes. A qualifying POST body is then read up to
    /// `Content-Length`; if the peer closes first the body is left short.
    /// Returns `None` when the peer sent nothing.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Bytes>> {
        let server = &self.ctx.config.server;
        let limit = server.header_buffer_bytes.max(1);
        let max_body = server.max_body_bytes;

        let mut buffer = BytesMut::with_capacity(READ_CHUNK.min(limit));

        while buffer.len() < limit && find_headers_end(&buffer).is_none() {
            buffer.reserve(READ_CHUNK);
            let n = (&mut self.stream)
                .take((limit - buffer.len()) as u64)
                .read_buf(&mut buffer)
                .await?;

            if n == 0 {
                break;
            }
        }

        if buffer.is_empty() {
            return Ok(None);
        }

        if let Some(target) = body_target(&buffer, max_body) {
            while buffer.len() < target {
                buffer.reserve((target - buffer.len()).min(READ_CHUNK));
                let n = (&mut self.stream)
                    .take((target - buffer.len()) as u64)
                    .read_buf(&mut buffer)
                    .await?;

                if n == 0 {
                    debug!(
                        received = buffer.len(),
                        expected = target,
                        "peer closed before the full body arrived"
                    );
                    break;
                }
            }
        }

        Ok(Some(buffer.freeze()))
    }

    async fn write_reply(&mut self, reply: Reply) -> anyhow::Result<()> {
        match reply {
            Reply::Full(response) => {
                debug!(status = response.status.as_u16(), "sending response");
                ResponseWriter::new(&response)
                    .write_to_stream(&mut self.stream)
                    .await
            }
            Reply::File(mut download) => {
                ResponseWriter::head_only(&download.head())
                    .write_to_stream(&mut self.stream)
                    .await?;

                let sent = copy_chunked(
                    &mut download.file,
                    &mut self.stream,
                    self.ctx.config.server.chunk_size,
                )
                .await
                .with_context(|| format!("streaming {}", download.filename))?;

                self.ctx.counters.record_transfer(sent);
                info!(file = %download.filename, bytes = sent, "download complete");
                Ok(())
            }
        }
    }

    /// Waits `grace` so the last send can flush, then shuts the stream down.
    pub async fn close(mut self, grace: Duration) {
        if !grace.is_zero() {
            tokio::time::sleep(grace).await;
        }
        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "shutdown after response failed");
        }
    }
}
