//! # Módulo HTTP
//!
//! Subconjunto reducido de HTTP/1.1 que entiende el servidor:
//!
//! - Request: solo método, path y una cookie de sesión fija
//! - Response: layout fijo con `Content-Length` y headers keep-alive
//! - Status codes: 200, 403, 404, 503 (el resto se envía como `Error`)
//!
//! No hay chunked transfer-encoding, header folding ni parsing general de
//! headers.

pub mod request;   // Parsing de requests
pub mod response;  // Construcción de responses
pub mod status;    // Códigos de estado

// Re-exportamos los tipos principales para facilitar su uso
pub use request::Request;
pub use response::{ConnectionMode, Response};
pub use status::StatusCode;
