//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Frontera entre el núcleo del servidor y la lógica de negocio.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Handler::handle → Response
//! ```
//!
//! El núcleo solo conoce el trait [`Handler`]: una llamada síncrona que
//! siempre produce una respuesta. [`Router`] es la implementación por tabla
//! (path + método opcional) que usan las rutas del sitio.

use crate::http::{Request, Response, StatusCode};

/// Contrato del colaborador externo: request parseado → respuesta
///
/// Se invoca desde varios workers a la vez, por eso `Send + Sync`.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn handle(&self, request: &Request) -> Response {
        self(request)
    }
}

struct Route {
    /// `None` acepta cualquier método
    method: Option<String>,
    path: String,
    handler: Box<dyn Handler>,
}

/// Router que mapea (método, path) a handlers
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta para cualquier método
    ///
    /// # Ejemplo
    /// ```
    /// use pool_server::router::{Handler, Router};
    /// use pool_server::http::{Request, Response};
    ///
    /// let mut router = Router::new();
    /// router.register("/hello", |_req: &Request| Response::html("<h1>Hello</h1>"));
    ///
    /// let response = router.handle(&Request::parse(b"GET /hello HTTP/1.1\r\n\r\n"));
    /// assert_eq!(response.status().as_u16(), 200);
    /// ```
    pub fn register(&mut self, path: &str, handler: impl Handler + 'static) {
        self.routes.push(Route {
            method: None,
            path: path.to_string(),
            handler: Box::new(handler),
        });
    }

    /// Registra una ruta que solo responde a `method`
    pub fn register_method(&mut self, method: &str, path: &str, handler: impl Handler + 'static) {
        self.routes.push(Route {
            method: Some(method.to_string()),
            path: path.to_string(),
            handler: Box::new(handler),
        });
    }

    /// Número de rutas registradas
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Encuentra y ejecuta el handler apropiado; 404 si no hay ninguno
    ///
    /// Una ruta con método distinto no coincide, así que también da 404.
    pub fn route(&self, request: &Request) -> Response {
        let found = self.routes.iter().find(|route| {
            route.path == request.path()
                && route
                    .method
                    .as_deref()
                    .map_or(true, |method| method == request.method())
        });

        match found {
            Some(route) => route.handler.handle(request),
            None => not_found(),
        }
    }
}

impl Handler for Router {
    fn handle(&self, request: &Request) -> Response {
        self.route(request)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes: Vec<String> = self
            .routes
            .iter()
            .map(|r| format!("{} {}", r.method.as_deref().unwrap_or("*"), r.path))
            .collect();
        f.debug_struct("Router").field("routes", &routes).finish()
    }
}

/// Respuesta genérica para rutas desconocidas
pub fn not_found() -> Response {
    Response::new(StatusCode::NOT_FOUND).with_body("<h1>404 Not Found</h1>")
}
