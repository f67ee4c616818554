use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use powlink_transport::{EndpointListener, Result, TransportError};
use tracing::{debug, info};

use crate::session::{run_session, BrokerContext};

/// The broker: accepts connections on a local endpoint and hands each one
/// to its own session thread.
///
/// Sessions share nothing but the [`BrokerContext`]; backpressure is the
/// blocking I/O of each session plus the engine mutex.
pub struct Broker {
    listener: EndpointListener,
    ctx: Arc<BrokerContext>,
}

impl Broker {
    /// Bind the endpoint, removing a stale socket of the same name first.
    pub fn bind(path: impl AsRef<Path>, ctx: BrokerContext) -> Result<Self> {
        let listener = EndpointListener::bind(path)?;
        Ok(Self {
            listener,
            ctx: Arc::new(ctx),
        })
    }

    /// The bound endpoint path.
    pub fn path(&self) -> &Path {
        self.listener.path()
    }

    /// Shared session state, mostly useful for inspecting engine metrics.
    pub fn context(&self) -> &Arc<BrokerContext> {
        &self.ctx
    }

    /// Accept connections until `shutdown` is set or accept fails.
    ///
    /// The flag is checked between accepts; existing sessions run to their
    /// next I/O error on their own threads.
    pub fn serve(&self, shutdown: &AtomicBool) -> Result<()> {
        while !shutdown.load(Ordering::SeqCst) {
            let stream = match self.listener.accept() {
                Ok(stream) => stream,
                Err(TransportError::Accept(err))
                    if err.kind() == std::io::ErrorKind::Interrupted =>
                {
                    continue;
                }
                Err(err) => {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    return Err(err);
                }
            };

            let ctx = Arc::clone(&self.ctx);
            thread::spawn(move || {
                run_session(stream, &ctx);
                debug!("session thread finished");
            });
        }

        info!("broker stopped accepting connections");
        Ok(())
    }
}
