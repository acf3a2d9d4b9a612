//! # Manejo de Conexiones
//! src/server/connection.rs
//!
//! Máquina de estados por conexión:
//!
//! ```text
//! Reading → Parsing → Routing → Responding → Reading ...
//!    │
//!    └── EOF / timeout / error ──→ Closed
//! ```
//!
//! Un mismo socket atiende requests sucesivos (keep-alive) hasta que el
//! cliente cierra o pasa el idle timeout sin recibir nada. Ningún error de
//! la conexión sale de aquí: el worker solo ve cuántas respuestas se
//! enviaron.

use crate::http::{ConnectionMode, Request, Response};
use crate::router::Handler;
use crate::server::listener::display_addr;
use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Tamaño del buffer de lectura y límite de un request sin terminar
pub const READ_BUFFER_SIZE: usize = 4096;

/// Idle timeout por defecto
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Motivo por el que terminó una conexión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// El cliente cerró (read = 0)
    PeerClosed,
    /// Pasó el idle timeout sin datos
    IdleTimeout,
    /// Cualquier otro error de lectura
    ReadError,
    /// No se pudo configurar el socket
    SetupFailed,
}

enum ConnectionState {
    Reading,
    Parsing(Vec<u8>),
    Routing(Request),
    Responding(Response),
    Closed(CloseReason),
}

/// Resultado de atender una conexión completa
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub responses: usize,
    pub reason: CloseReason,
}

/// Ejecuta el protocolo de una conexión de principio a fin
#[derive(Clone)]
pub struct ConnectionHandler {
    handler: Arc<dyn Handler>,
    idle_timeout: Duration,
}

impl ConnectionHandler {
    pub fn new(handler: Arc<dyn Handler>, idle_timeout: Duration) -> Self {
        Self {
            handler,
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Atiende la conexión hasta cerrarla
    ///
    /// El socket se cierra al retornar (se consume `stream`).
    pub fn serve(&self, mut stream: TcpStream) -> ConnectionSummary {
        let peer = stream
            .peer_addr()
            .map(display_addr)
            .unwrap_or_else(|_| "unknown".to_string());

        let mut responses = 0;
        let mut pending = RequestBuffer::new();
        let mut buffer = [0u8; READ_BUFFER_SIZE];

        let mut state = match stream.set_read_timeout(Some(self.idle_timeout)) {
            Ok(()) => ConnectionState::Reading,
            Err(e) => {
                warn!(peer = %peer, cause = %e, "failed to set idle timeout");
                ConnectionState::Closed(CloseReason::SetupFailed)
            }
        };

        let reason = loop {
            state = match state {
                ConnectionState::Reading => match pending.next_request() {
                    Some(raw) => ConnectionState::Parsing(raw),
                    None => match stream.read(&mut buffer) {
                        Ok(0) => ConnectionState::Closed(CloseReason::PeerClosed),
                        Ok(n) => {
                            pending.push(&buffer[..n]);
                            ConnectionState::Reading
                        }
                        Err(e) if e.kind() == ErrorKind::Interrupted => ConnectionState::Reading,
                        Err(e) if is_timeout(&e) => ConnectionState::Closed(CloseReason::IdleTimeout),
                        Err(e) => {
                            debug!(peer = %peer, cause = %e, "read failed");
                            ConnectionState::Closed(CloseReason::ReadError)
                        }
                    },
                },
                ConnectionState::Parsing(raw) => ConnectionState::Routing(Request::parse(&raw)),
                ConnectionState::Routing(request) => {
                    debug!(peer = %peer, method = request.method(), path = request.path(), "handling request");
                    ConnectionState::Responding(self.handler.handle(&request))
                }
                ConnectionState::Responding(response) => {
                    let bytes = response.to_bytes(ConnectionMode::keep_alive(self.idle_timeout));
                    // Sin reintentos: si el socket está roto lo detecta el próximo read
                    if let Err(e) = stream.write_all(&bytes) {
                        debug!(peer = %peer, cause = %e, "write failed");
                    }
                    responses += 1;
                    ConnectionState::Reading
                }
                ConnectionState::Closed(reason) => break reason,
            };
        };

        debug!(peer = %peer, responses, reason = ?reason, "connection closed");
        ConnectionSummary { responses, reason }
    }
}

impl std::fmt::Debug for ConnectionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandler")
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

/// Marca de `Content-Length` en los headers; se busca tal cual, como la cookie
const CONTENT_LENGTH_MARKER: &[u8] = b"Content-Length:";

/// Bytes recibidos que todavía no forman un request
///
/// Un request está completo al encontrar la línea vacía que cierra los
/// headers. Si declara `Content-Length`, ese body se descarta (también la
/// parte que aún no llegó) y lo que sigue queda para el próximo ciclo
/// (pipelining). Si se llenó el buffer sin terminador, se entrega todo tal
/// cual para no bloquear la conexión.
#[derive(Debug, Default)]
struct RequestBuffer {
    pending: Vec<u8>,
    /// Bytes de body pendientes de descartar
    skip: usize,
}

impl RequestBuffer {
    fn new() -> Self {
        Self {
            pending: Vec::with_capacity(READ_BUFFER_SIZE),
            skip: 0,
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        let skipped = self.skip.min(bytes.len());
        self.skip -= skipped;
        self.pending.extend_from_slice(&bytes[skipped..]);
    }

    fn next_request(&mut self) -> Option<Vec<u8>> {
        if let Some(end) = header_end(&self.pending) {
            let rest = self.pending.split_off(end);
            let head = std::mem::replace(&mut self.pending, rest);

            let body = content_length(&head);
            let available = body.min(self.pending.len());
            self.pending.drain(..available);
            self.skip = body - available;
            return Some(head);
        }
        if self.pending.len() >= READ_BUFFER_SIZE {
            return Some(std::mem::take(&mut self.pending));
        }
        None
    }
}

/// Valor de `Content-Length` en los headers, o 0
fn content_length(head: &[u8]) -> usize {
    let Some(pos) = head
        .windows(CONTENT_LENGTH_MARKER.len())
        .position(|w| w == CONTENT_LENGTH_MARKER)
    else {
        return 0;
    };

    let value = &head[pos + CONTENT_LENGTH_MARKER.len()..];
    let digits: String = value
        .iter()
        .skip_while(|b| **b == b' ' || **b == b'\t')
        .take_while(|b| b.is_ascii_digit())
        .map(|b| *b as char)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Posición justo después del primer `\r\n\r\n` o `\n\n`
fn header_end(bytes: &[u8]) -> Option<usize> {
    let crlf = bytes.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4);
    let lf = bytes.windows(2).position(|w| w == b"\n\n").map(|i| i + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
