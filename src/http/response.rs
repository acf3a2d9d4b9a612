//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas de forma programática y serializarlas con
//! el layout fijo del servidor.
//!
//! ## Formato (conexión keep-alive)
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 25\r\n
//! Connection: keep-alive\r\n
//! Keep-Alive: timeout=5, max=100\r\n
//! Set-Cookie: ...\r\n
//! \r\n
//! <h1>Login Successful</h1>
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use pool_server::http::{ConnectionMode, Response, StatusCode};
//!
//! let response = Response::new(StatusCode::OK)
//!     .with_content_type("application/json")
//!     .with_body(r#"{"ok": true}"#);
//!
//! let bytes = response.to_bytes(ConnectionMode::keep_alive_secs(5));
//! ```

use super::StatusCode;
use std::time::Duration;

/// Content-Type por defecto de las respuestas
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Máximo de requests anunciado en `Keep-Alive` (no se aplica)
pub const KEEP_ALIVE_MAX: u32 = 100;

/// Body de la respuesta de rechazo por cola llena
pub const BUSY_BODY: &str = "Server is too busy. Try again later.";

/// Headers de conexión que acompañan a la respuesta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// `Connection: keep-alive` + `Keep-Alive: timeout=N, max=100`
    KeepAlive { timeout_secs: u64 },

    /// `Connection: close`
    Close,
}

impl ConnectionMode {
    pub fn keep_alive_secs(timeout_secs: u64) -> Self {
        ConnectionMode::KeepAlive { timeout_secs }
    }

    pub fn keep_alive(idle_timeout: Duration) -> Self {
        Self::keep_alive_secs(idle_timeout.as_secs())
    }
}

/// Respuesta HTTP; vive un solo ciclo de escritura
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    content_type: String,
    body: Vec<u8>,
    /// Headers adicionales en orden de inserción (ej: Set-Cookie)
    extra_headers: Vec<(String, String)>,
}

impl Response {
    /// Crea una respuesta vacía `text/html` con el código indicado
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            body: Vec::new(),
            extra_headers: Vec::new(),
        }
    }

    /// Respuesta 200 `text/html`
    pub fn html(body: &str) -> Self {
        Self::new(StatusCode::OK).with_body(body)
    }

    /// Respuesta 200 `application/json`
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::OK)
            .with_content_type("application/json")
            .with_body(body)
    }

    /// Respuesta de rechazo cuando la cola de admisión está llena
    ///
    /// Se envía con [`ConnectionMode::Close`].
    pub fn service_unavailable() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE)
            .with_content_type("text/plain")
            .with_body(BUSY_BODY)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Agrega un header extra; se serializa después de los headers fijos
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn add_header(&mut self, name: &str, value: &str) {
        self.extra_headers.push((name.to_string(), value.to_string()));
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// `Content-Length` siempre se calcula a partir del body.
    pub fn to_bytes(&self, mode: ConnectionMode) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status,
            self.content_type,
            self.body.len()
        );

        match mode {
            ConnectionMode::KeepAlive { timeout_secs } => {
                head.push_str("Connection: keep-alive\r\n");
                head.push_str(&format!(
                    "Keep-Alive: timeout={}, max={}\r\n",
                    timeout_secs, KEEP_ALIVE_MAX
                ));
            }
            ConnectionMode::Close => head.push_str("Connection: close\r\n"),
        }

        for (name, value) in &self.extra_headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");

        let mut result = head.into_bytes();
        result.extend_from_slice(&self.body);
        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.extra_headers
    }

    /// Busca un header extra por nombre (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.extra_headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
