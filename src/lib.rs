//! # Pool Server
//! src/lib.rs
//!
//! Servidor TCP concurrente que habla un subconjunto reducido de HTTP/1.1.
//! Las conexiones aceptadas pasan por una cola de admisión acotada hacia un
//! pool fijo de workers; cada worker atiende una conexión keep-alive
//! completa (read → parse → route → write) hasta que el cliente cierra o
//! vence el idle timeout.
//!
//! ## Arquitectura
//!
//! - `server`: listener, loop de accept, conexión por worker y apagado
//! - `pool`: cola de admisión y pool de workers
//! - `http`: request/response mínimos
//! - `router`: trait `Handler` y router por tabla
//! - `commands`: rutas por defecto del sitio
//! - `config`: configuración CLI/env
//! - `error`: errores fatales de arranque
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use pool_server::commands::site_router;
//! use pool_server::config::Config;
//! use pool_server::server::{Server, Shutdown};
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let handler = Arc::new(site_router(&config.static_dir));
//! let server = Server::bind(&config, handler, Shutdown::new()).expect("bind");
//! server.run();
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod pool;
pub mod router;
pub mod server;
