use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::http::connection::Connection;
use crate::server::ServerContext;

/// Binds the configured address and serves until the accept loop fails.
pub async fn run(ctx: ServerContext) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&ctx.config.server.listen_addr).await?;
    info!("Listening on {}", ctx.config.server.listen_addr);

    announce(&listener, &ctx);
    serve(listener, ctx).await
}

/// Startup notice with the address a browser on the LAN should open.
fn announce(listener: &TcpListener, ctx: &ServerContext) {
    let port = listener.local_addr().map(|a| a.port()).unwrap_or(0);
    let ip = ctx
        .telemetry
        .ipv4_address()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "0.0.0.0".to_string());
    info!("Web Manager: http://{}:{}", ip, port);
}

/// Accept loop: one task per connection, no cap.
pub async fn serve(listener: TcpListener, ctx: ServerContext) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Accept failed: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let ctx = ctx.clone();
        tokio::spawn(async move {
            handle(socket, ctx).await;
            debug!("Closed connection from {}", peer);
        });
    }
}

async fn handle(socket: TcpStream, ctx: ServerContext) {
    let _active = ctx.counters.connection_opened();
    ctx.counters.record_request();

    if let Err(e) = socket.set_nodelay(true) {
        debug!("TCP_NODELAY not applied: {}", e);
    }
    let peer = socket.peer_addr().ok();
    let grace = Duration::from_millis(ctx.config.server.close_grace_ms);

    let mut conn = Connection::new(socket, ctx);
    if let Err(e) = conn.run().await {
        error!("Connection error from {:?}: {}", peer, e);
    }
    conn.close(grace).await;
}
