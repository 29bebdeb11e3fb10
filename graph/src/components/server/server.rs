use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::Request;

use crate::cheap_clone::CheapClone;
use crate::hyper::server::conn::http1;
use crate::hyper::service::service_fn;
use crate::hyper_util::rt::TokioIo;
use crate::slog::{debug, error, info};
use crate::tokio::net::TcpListener;
use crate::tokio::task::JoinHandle;
use crate::anyhow;

use crate::prelude::Logger;

use super::query::ServerResult;

/// A handle to the server that can be used to shut it down. The `accepting`
/// field is only used in tests to check if the server is running
pub struct ServerHandle {
    pub handle: JoinHandle<()>,
    pub accepting: Arc<AtomicBool>,
    pub local_addr: SocketAddr,
}

/// Bind to `port` on all interfaces and serve every connection with
/// `handler`. Port 0 picks a free port; the bound address is reported in
/// the returned handle.
pub async fn start<F, S>(
    logger: Logger,
    port: u16,
    handler: F,
) -> Result<ServerHandle, anyhow::Error>
where
    F: Fn(Request<Incoming>) -> S + Send + Clone + 'static,
    S: Future<Output = ServerResult> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!(logger, "Listening for GraphQL queries"; "addr" => local_addr.to_string());

    let accepting = Arc::new(AtomicBool::new(false));
    let accepting2 = accepting.cheap_clone();
    let handle = crate::spawn(async move {
        accepting2.store(true, Ordering::SeqCst);
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(res) => res,
                Err(e) => {
                    error!(logger, "Error accepting connection"; "error" => e.to_string());
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let handler = handler.clone();
            let logger = logger.cheap_clone();
            crate::spawn_allow_panic(async move {
                let service = service_fn(handler);
                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(logger, "Connection closed with error";
                           "peer" => peer.to_string(), "error" => e.to_string());
                }
            });
        }
    });
    Ok(ServerHandle {
        handle,
        accepting,
        local_addr,
    })
}
