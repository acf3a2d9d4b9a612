//! # Rutas del Sitio
//! src/commands/site.rs
//!
//! Rutas por defecto del servidor:
//! - /: sirve `index.html` desde el directorio estático
//! - /cpu: carga del kernel (`/proc/loadavg`)
//! - /info: JSON fijo con información del proyecto
//! - /login (POST): entrega la cookie de sesión
//! - /dashboard: área protegida por la cookie
//! - /logout: borra la cookie
//!
//! La "sesión" es un único token fijo compartido por todos los clientes
//! (ver `http::request::SESSION_TOKEN`). No hay almacén de sesiones ni
//! usuarios; es una simplificación con implicaciones de seguridad.

use crate::http::request::{SESSION_COOKIE_NAME, SESSION_TOKEN};
use crate::http::{Request, Response, StatusCode};
use crate::router::Router;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Archivo de carga del kernel en Linux
const LOADAVG_PATH: &str = "/proc/loadavg";

const FORBIDDEN_BODY: &str = "<h1>403 Forbidden: Please POST /login</h1>";

/// Body de `/info`
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub purpose: &'static str,
    pub experience: &'static str,
    pub learning: &'static str,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            purpose: "to build own server",
            experience: "its fantastic",
            learning: "how system calls and networks work",
        }
    }
}

/// Construye el router con todas las rutas del sitio
///
/// `static_dir` es el directorio donde se busca `index.html`.
pub fn site_router(static_dir: impl AsRef<Path>) -> Router {
    let index_path = static_dir.as_ref().join("index.html");

    let mut router = Router::new();
    router.register("/", move |req: &Request| index_handler(req, &index_path));
    router.register("/cpu", cpu_handler);
    router.register("/info", info_handler);
    router.register_method("POST", "/login", login_handler);
    router.register("/dashboard", dashboard_handler);
    router.register("/logout", logout_handler);
    router
}

/// Handler para /
///
/// Un `index.html` vacío se trata igual que uno inexistente.
pub fn index_handler(_req: &Request, index_path: &Path) -> Response {
    match fs::read(index_path) {
        Ok(content) if !content.is_empty() => Response::new(StatusCode::OK).with_body_bytes(content),
        _ => Response::html("<h1>404 Error</h1><p>index.html not found on server.</p>")
            .with_status(StatusCode::NOT_FOUND),
    }
}

/// Handler para /cpu
pub fn cpu_handler(_req: &Request) -> Response {
    Response::html(&cpu_stats(Path::new(LOADAVG_PATH)))
}

fn cpu_stats(loadavg: &Path) -> String {
    match fs::read_to_string(loadavg) {
        Ok(content) => {
            let line = content.lines().next().unwrap_or_default();
            format!("<h1>Kernel Load: </h1><h2>{}</h2>", line)
        }
        Err(_) => "Error: Not on Linux".to_string(),
    }
}

/// Handler para /info
///
/// # Ejemplo de response
/// ```json
/// {"purpose": "to build own server", "experience": "its fantastic", "learning": "..."}
/// ```
pub fn info_handler(_req: &Request) -> Response {
    match serde_json::to_string(&ServiceInfo::default()) {
        Ok(body) => Response::json(&body),
        Err(e) => Response::new(StatusCode::from_u16(500)).with_body(&e.to_string()),
    }
}

/// Handler para POST /login
pub fn login_handler(_req: &Request) -> Response {
    Response::html("<h1>Login Successful</h1>").with_header(
        "Set-Cookie",
        &format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE_NAME, SESSION_TOKEN),
    )
}

/// Handler para /dashboard
pub fn dashboard_handler(req: &Request) -> Response {
    if !req.is_authenticated() {
        return forbidden();
    }
    Response::html("<h1>Admin Dashboard</h1><p>Secure Area.</p>")
}

/// Handler para /logout
pub fn logout_handler(req: &Request) -> Response {
    if !req.is_authenticated() {
        return forbidden();
    }
    Response::html("<h1>You are logged out</h1>").with_header(
        "Set-Cookie",
        &format!("{}=; Path=/; Max-Age=0; HttpOnly", SESSION_COOKIE_NAME),
    )
}

fn forbidden() -> Response {
    Response::html(FORBIDDEN_BODY).with_status(StatusCode::FORBIDDEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Handler;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pool_server_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_info_is_json_with_fixed_schema() {
        let response = info_handler(&Request::new("GET", "/info", false));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), "application/json");

        let json: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(json["purpose"], "to build own server");
        assert_eq!(json["experience"], "its fantastic");
        assert_eq!(json["learning"], "how system calls and networks work");
    }

    #[test]
    fn test_login_sets_session_cookie() {
        let response = login_handler(&Request::new("POST", "/login", false));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.header("Set-Cookie"),
            Some("session_token=secretkey12345; Path=/; HttpOnly")
        );
    }

    #[test]
    fn test_login_requires_post() {
        let router = site_router(".");
        let response = router.handle(&Request::new("GET", "/login", false));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_dashboard_requires_session() {
        let denied = dashboard_handler(&Request::new("GET", "/dashboard", false));
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert_eq!(denied.body(), FORBIDDEN_BODY.as_bytes());

        let allowed = dashboard_handler(&Request::new("GET", "/dashboard", true));
        assert_eq!(allowed.status(), StatusCode::OK);
        assert!(String::from_utf8_lossy(allowed.body()).contains("Admin Dashboard"));
    }

    #[test]
    fn test_logout_clears_cookie() {
        let response = logout_handler(&Request::new("GET", "/logout", true));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.header("Set-Cookie"),
            Some("session_token=; Path=/; Max-Age=0; HttpOnly")
        );

        let denied = logout_handler(&Request::new("GET", "/logout", false));
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert!(denied.header("Set-Cookie").is_none());
    }

    #[test]
    fn test_index_served_from_static_dir() {
        let dir = temp_dir("index_ok");
        let mut file = fs::File::create(dir.join("index.html")).unwrap();
        file.write_all(b"<h1>home</h1>").unwrap();

        let router = site_router(&dir);
        let response = router.handle(&Request::new("GET", "/", false));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), b"<h1>home</h1>");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_index_is_not_found() {
        let dir = temp_dir("index_missing");
        let router = site_router(&dir);
        let response = router.handle(&Request::new("GET", "/", false));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(String::from_utf8_lossy(response.body()).contains("index.html not found"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cpu_stats_formats_first_line() {
        let dir = temp_dir("loadavg");
        let path = dir.join("loadavg");
        fs::write(&path, "0.52 0.58 0.59 1/467 12345\n").unwrap();

        assert_eq!(
            cpu_stats(&path),
            "<h1>Kernel Load: </h1><h2>0.52 0.58 0.59 1/467 12345</h2>"
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cpu_stats_without_proc() {
        assert_eq!(cpu_stats(Path::new("/definitely/not/here")), "Error: Not on Linux");
    }

    #[test]
    fn test_unknown_route() {
        let router = site_router(".");
        let response = router.handle(&Request::new("GET", "/nope", false));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), b"<h1>404 Not Found</h1>");
    }
}
