//! # Rutas del Servidor
//!
//! Lógica de negocio que vive detrás del trait `router::Handler`. El núcleo
//! del servidor no depende de nada de este módulo.
//!
//! - **site**: rutas por defecto (/, /cpu, /info, /login, /dashboard, /logout)

pub mod site;

pub use site::site_router;
