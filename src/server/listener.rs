use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::info;

use crate::http::connection::Connection;
use crate::server::handler::Handler;

/// Pause after a failed accept before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Handle to a running server.
///
/// Dropping the handle requests shutdown the same way [`Server::close`]
/// does, without waiting for the accept loop to finish.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    accept_task: Option<JoinHandle<()>>,
}

/// Binds `addr` and starts accepting connections in the background.
///
/// Every accepted connection gets its own task that reads one request,
/// passes it to `handler`, writes the response and closes the socket.
pub async fn serve<A, H>(addr: A, handler: H) -> anyhow::Result<Server>
where
    A: ToSocketAddrs,
    H: Handler,
{
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind listener")?;
    let local_addr = listener.local_addr()?;
    info!("Listening on {}", local_addr);

    let closed = Arc::new(AtomicBool::new(false));
    let shutdown = Arc::new(Notify::new());

    let accept_task = tokio::spawn(accept_loop(
        listener,
        Arc::new(handler),
        Arc::clone(&closed),
        Arc::clone(&shutdown),
    ));

    Ok(Server {
        local_addr,
        closed,
        shutdown,
        accept_task: Some(accept_task),
    })
}

impl Server {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops accepting connections and closes the listening socket.
    ///
    /// Only the first call has any effect. Connections already being served
    /// run to completion on their own tasks.
    pub async fn close(&mut self) -> anyhow::Result<()> {
        if !self.mark_closed() {
            return Ok(());
        }

        if let Some(task) = self.accept_task.take() {
            task.await.context("Accept loop panicked")?;
        }

        info!("Listener on {} closed", self.local_addr);
        Ok(())
    }

    /// Flips the shutdown flag and wakes the accept loop. Returns `false` if
    /// the server was already closed.
    fn mark_closed(&self) -> bool {
        let first = self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if first {
            self.shutdown.notify_one();
        }

        first
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.mark_closed();
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    while !closed.load(Ordering::Acquire) {
        let accepted = tokio::select! {
            _ = shutdown.notified() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((socket, peer)) => {
                tracing::debug!(%peer, "Accepted connection");

                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    let mut conn = Connection::new(socket, handler);
                    if let Err(e) = conn.run().await {
                        tracing::error!("Connection error from {}: {}", peer, e);
                    }
                });
            }

            Err(e) => {
                if closed.load(Ordering::Acquire) {
                    break;
                }
                tracing::warn!(error = %e, "Accept failed, continuing");

                // EMFILE and friends persist; don't spin on them.
                tokio::select! {
                    _ = shutdown.notified() => break,
                    _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => {}
                }
            }
        }
    }

    // Dropping the listener closes the socket.
    drop(listener);
    tracing::debug!("Accept loop stopped");
}
