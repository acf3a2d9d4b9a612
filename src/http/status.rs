//! # Códigos de Estado HTTP
//!
//! El servidor solo conoce cuatro reason phrases. Cualquier otro código se
//! envía tal cual con el texto genérico `Error`, así el router puede devolver
//! códigos arbitrarios sin tocar este módulo.

/// Código de estado HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK - La petición fue exitosa
    pub const OK: StatusCode = StatusCode(200);

    /// 403 Forbidden - Falta la cookie de sesión
    pub const FORBIDDEN: StatusCode = StatusCode(403);

    /// 404 Not Found - Ruta no encontrada
    pub const NOT_FOUND: StatusCode = StatusCode(404);

    /// 503 Service Unavailable - Cola de admisión llena
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use pool_server::http::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use pool_server::http::StatusCode;
    /// assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), "Not Found");
    /// assert_eq!(StatusCode::from_u16(500).reason_phrase(), "Error");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            403 => "Forbidden",
            404 => "Not Found",
            503 => "Service Unavailable",
            _ => "Error",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}
