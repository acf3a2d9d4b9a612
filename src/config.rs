//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./pool_server 8080 5 --queue-capacity 1000 --idle-timeout 5
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=9000 WORKERS=8 ./pool_server
//! ```

use crate::error::ServerError;
use crate::pool::queue::DEFAULT_CAPACITY;
use crate::server::connection::DEFAULT_IDLE_TIMEOUT;
use clap::Parser;
use std::time::Duration;
use tracing::Level;

/// Workers mínimos cuando el tamaño del pool se deja en automático (`0`)
pub const MIN_AUTO_WORKERS: usize = 4;

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "pool_server")]
#[command(about = "Servidor HTTP/1.1 keep-alive con pool fijo de workers")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(default_value = "8080", env = "HTTP_PORT")]
    pub port: String,

    /// Número de workers del pool (0 = paralelismo disponible, mínimo 4)
    #[arg(default_value = "5", env = "WORKERS")]
    pub workers: usize,

    /// Host/IP en el que escucha (por defecto todas las interfaces, dual-stack)
    #[arg(long, env = "HTTP_HOST")]
    pub host: Option<String>,

    // === Backpressure ===

    /// Capacidad máxima de la cola de admisión; al llenarse se responde 503
    #[arg(long = "queue-capacity", default_value = "1000", env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    // === Timeouts ===

    /// Segundos de silencio tras los cuales se cierra una conexión
    #[arg(long = "idle-timeout", default_value = "5", env = "IDLE_TIMEOUT")]
    pub idle_timeout_secs: u64,

    // === Rutas ===

    /// Directorio desde el que se sirve `index.html`
    #[arg(long = "static-dir", default_value = ".", env = "STATIC_DIR")]
    pub static_dir: String,

    /// Nivel de log (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: Level,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección legible para logs (`host:port` o `*:port`)
    pub fn address(&self) -> String {
        match &self.host {
            Some(host) => format!("{}:{}", host, self.port),
            None => format!("*:{}", self.port),
        }
    }

    /// Tamaño efectivo del pool
    ///
    /// `0` significa "automático": el paralelismo disponible, nunca menos
    /// de [`MIN_AUTO_WORKERS`].
    pub fn pool_size(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(MIN_AUTO_WORKERS)
            .max(MIN_AUTO_WORKERS)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.queue_capacity == 0 {
            return Err(ServerError::InvalidConfig(
                "queue capacity must be >= 1".to_string(),
            ));
        }
        // Un read timeout de cero es inválido para el socket
        if self.idle_timeout_secs == 0 {
            return Err(ServerError::InvalidConfig(
                "idle timeout must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════╗");
        println!("║        Pool HTTP/1.1 Server Configuration     ║");
        println!("╚══════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Static dir:   {}", self.static_dir);
        println!();
        println!("👷 Worker Pool:");
        println!("   Workers:      {}", self.pool_size());
        println!("   Queue cap:    {}", self.queue_capacity);
        println!("   Idle timeout: {} s", self.idle_timeout_secs);
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: "8080".to_string(),
            workers: 5,
            host: None,
            queue_capacity: DEFAULT_CAPACITY,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT.as_secs(),
            static_dir: ".".to_string(),
            log_level: Level::INFO,
        }
    }
}
