//! # Errores del Servidor
//! src/error.rs
//!
//! Solo los fallos de arranque (configuración, señales, resolución, bind,
//! creación de threads) llegan hasta aquí. Los fallos por conexión se
//! resuelven dentro de `server::connection` y nunca se propagan.

use std::io;
use thiserror::Error;

/// Errores fatales que terminan el proceso
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to resolve address {address}: {reason}")]
    Resolve { address: String, reason: String },

    #[error("failed to install signal handler: {source}")]
    Signal {
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind/listen on any address for port {port}: {source}")]
    Bind {
        port: String,
        #[source]
        source: io::Error,
    },
}

impl ServerError {
    /// Código de salida del proceso para este error
    ///
    /// - `2`: no se pudo hacer bind/listen en ninguna dirección candidata
    /// - `1`: cualquier otro fallo de arranque
    pub fn exit_code(&self) -> i32 {
        match self {
            ServerError::Bind { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_exits_with_two() {
        let err = ServerError::Bind {
            port: "8080".to_string(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("8080"));
    }

    #[test]
    fn test_other_errors_exit_with_one() {
        let resolve = ServerError::Resolve {
            address: "nope:abc".to_string(),
            reason: "invalid port".to_string(),
        };
        let signal = ServerError::Signal {
            source: io::Error::from(io::ErrorKind::Other),
        };
        let config = ServerError::InvalidConfig("queue capacity must be >= 1".to_string());

        assert_eq!(resolve.exit_code(), 1);
        assert_eq!(signal.exit_code(), 1);
        assert_eq!(config.exit_code(), 1);
    }
}
