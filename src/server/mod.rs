//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Une las piezas:
//! 1. Crea el pool de workers con su cola de admisión
//! 2. Hace bind del listener
//! 3. Corre el loop de accept hasta que se active el [`Shutdown`]
//! 4. Cierra el listener y drena/une el pool
//!
//! ```text
//! accept → pool.submit ──(cola llena)──→ 503 + close
//!              │
//!              └→ worker → ConnectionHandler::serve → close
//! ```

pub mod connection;
pub mod listener;
pub mod shutdown;

pub use connection::{CloseReason, ConnectionHandler, ConnectionSummary};
pub use listener::Listener;
pub use shutdown::{Shutdown, SignalListener};

use crate::config::Config;
use crate::error::ServerError;
use crate::pool::WorkerPool;
use crate::router::Handler;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use tracing::info;

/// Servidor listo para aceptar conexiones
#[derive(Debug)]
pub struct Server {
    listener: Listener,
    pool: WorkerPool<TcpStream>,
    shutdown: Shutdown,
}

impl Server {
    /// Crea el pool y hace bind según `config`
    ///
    /// El pool se crea primero; si el bind falla, sus workers se detienen y
    /// se unen antes de retornar el error.
    pub fn bind(config: &Config, handler: Arc<dyn Handler>, shutdown: Shutdown) -> Result<Self, ServerError> {
        config.validate()?;

        let connections = ConnectionHandler::new(handler, config.idle_timeout());
        let pool = WorkerPool::new(config.pool_size(), config.queue_capacity, move |stream: TcpStream| {
            connections.serve(stream);
        })
        .map_err(|source| ServerError::Spawn {
            name: "worker".to_string(),
            source,
        })?;

        let listener = Listener::bind(config.host.as_deref(), &config.port)?;
        shutdown.arm(listener.local_addr());

        Ok(Self {
            listener,
            pool,
            shutdown,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Token para detener el servidor desde otro thread
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Corre hasta que se active el shutdown
    ///
    /// Al retornar ya no se aceptan conexiones y todas las encoladas fueron
    /// atendidas hasta su cierre.
    pub fn run(self) {
        let Server {
            listener,
            pool,
            shutdown,
        } = self;

        listener.serve(&pool, &shutdown);

        info!("Shutting down server...");
        drop(listener);
        pool.shutdown();
        info!("Bye!");
    }
}
