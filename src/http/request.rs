//! # Parsing de Requests
//! src/http/request.rs
//!
//! El parser es deliberadamente mínimo: solo extrae los dos primeros tokens
//! (método y path) y busca la cookie de sesión. No hay errores de parseo;
//! una entrada basura produce tokens vacíos y el router responde 404.
//!
//! ## Formato reconocido
//!
//! ```text
//! GET /dashboard HTTP/1.1\r\n
//! Cookie: session_token=secretkey12345\r\n
//! \r\n
//! ```
//!
//! La sesión es un único token compartido y fijo, no un almacén de
//! sesiones: cualquiera que conozca el valor queda autenticado.

/// Nombre de la cookie de sesión
pub const SESSION_COOKIE_NAME: &str = "session_token";

/// Valor fijo del token de sesión
pub const SESSION_TOKEN: &str = "secretkey12345";

/// Línea de header que marca un request como autenticado
const SESSION_COOKIE_LINE: &str = "Cookie: session_token=secretkey12345";

/// Request parseado; vive un solo ciclo de lectura
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    authenticated: bool,
}

impl Request {
    /// Parsea un request desde los bytes recibidos
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use pool_server::http::Request;
    ///
    /// let raw = b"GET /info HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw);
    ///
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.path(), "/info");
    /// assert!(!request.is_authenticated());
    /// ```
    pub fn parse(buffer: &[u8]) -> Self {
        let text = String::from_utf8_lossy(buffer);
        let mut tokens = text.split_ascii_whitespace();

        let method = tokens.next().unwrap_or_default().to_string();
        let path = tokens.next().unwrap_or_default().to_string();
        let authenticated = text.contains(SESSION_COOKIE_LINE);

        Self {
            method,
            path,
            authenticated,
        }
    }

    /// Construye un request directamente (útil para routers y tests)
    pub fn new(method: &str, path: &str, authenticated: bool) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            authenticated,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `true` si el request trae la cookie de sesión fija
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
