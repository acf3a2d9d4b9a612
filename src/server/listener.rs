//! # Listener TCP
//! src/server/listener.rs
//!
//! Dueño del socket de escucha. Prueba las direcciones candidatas en orden
//! hasta poder hacer bind + listen en una, y luego corre el loop de accept
//! que alimenta al pool.
//!
//! Sin host configurado se intenta primero `[::]` en modo dual-stack y luego
//! `0.0.0.0`.

use crate::error::ServerError;
use crate::http::{ConnectionMode, Response};
use crate::pool::WorkerPool;
use crate::server::shutdown::Shutdown;
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, ErrorKind, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, info, warn};

/// Socket de escucha configurado
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Resuelve, configura, hace bind y listen
    ///
    /// # Errores
    ///
    /// - [`ServerError::Resolve`] si el puerto o el host no son válidos
    /// - [`ServerError::Bind`] si ninguna candidata pudo usarse
    pub fn bind(host: Option<&str>, port: &str) -> Result<Self, ServerError> {
        let candidates = resolve(host, port)?;

        let mut last_error = None;
        for addr in candidates {
            match open(addr) {
                Ok(inner) => {
                    let local_addr = inner.local_addr().unwrap_or(addr);
                    info!(address = %display_addr(local_addr), "Server started");
                    return Ok(Self { inner, local_addr });
                }
                Err(e) => {
                    warn!(address = %addr, cause = %e, "server: bind");
                    last_error = Some(e);
                }
            }
        }

        Err(ServerError::Bind {
            port: port.to_string(),
            source: last_error.unwrap_or_else(|| io::Error::from(ErrorKind::AddrNotAvailable)),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Loop de accept
    ///
    /// Corre hasta que `shutdown` se active. Cada conexión aceptada pasa al
    /// pool; si la cola está llena se responde 503 y se cierra en el acto.
    pub fn serve(&self, pool: &WorkerPool<TcpStream>, shutdown: &Shutdown) {
        while !shutdown.is_triggered() {
            match self.inner.accept() {
                Ok((stream, peer)) => {
                    // Puede ser la conexión de despertar del propio shutdown
                    if shutdown.is_triggered() {
                        debug!(peer = %display_addr(peer), "dropping connection accepted during shutdown");
                        break;
                    }

                    info!(peer = %display_addr(peer), "Got connection");
                    if let Err(stream) = pool.submit(stream) {
                        reject(stream);
                        warn!(peer = %display_addr(peer), "Dropped client (Queue Full)");
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {
                    if shutdown.is_triggered() {
                        break;
                    }
                }
                Err(e) => warn!(cause = %e, "server: accept"),
            }
        }
    }
}

/// Escribe la respuesta 503 fija y cierra la conexión
///
/// Best-effort: un error de escritura solo se registra.
pub fn reject(mut stream: TcpStream) {
    let bytes = Response::service_unavailable().to_bytes(ConnectionMode::Close);
    if let Err(e) = stream.write_all(&bytes) {
        debug!(cause = %e, "failed to send 503");
    }
}

/// Formato imprimible de una dirección
///
/// Las direcciones IPv4 mapeadas en IPv6 (clientes IPv4 sobre un socket
/// dual-stack) se muestran como IPv4.
///
/// # Ejemplo
/// ```
/// use pool_server::server::listener::display_addr;
///
/// assert_eq!(display_addr("[::ffff:127.0.0.1]:80".parse().unwrap()), "127.0.0.1:80");
/// assert_eq!(display_addr("[::1]:80".parse().unwrap()), "[::1]:80");
/// ```
pub fn display_addr(addr: SocketAddr) -> String {
    match addr {
        SocketAddr::V6(v6) => match v6.ip().to_ipv4_mapped() {
            Some(v4) => SocketAddr::new(IpAddr::V4(v4), v6.port()).to_string(),
            None => addr.to_string(),
        },
        SocketAddr::V4(_) => addr.to_string(),
    }
}

/// Lista de direcciones candidatas para `host:port`
fn resolve(host: Option<&str>, port: &str) -> Result<Vec<SocketAddr>, ServerError> {
    let port_number: u16 = port.trim().parse().map_err(|_| ServerError::Resolve {
        address: format!("{}:{}", host.unwrap_or("*"), port),
        reason: "invalid port".to_string(),
    })?;

    let Some(host) = host else {
        return Ok(vec![
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port_number),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port_number),
        ]);
    };

    let addrs: Vec<SocketAddr> = (host, port_number)
        .to_socket_addrs()
        .map_err(|e| ServerError::Resolve {
            address: format!("{}:{}", host, port),
            reason: e.to_string(),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ServerError::Resolve {
            address: format!("{}:{}", host, port),
            reason: "no addresses found".to_string(),
        });
    }
    Ok(addrs)
}

/// socket + SO_REUSEADDR + bind + listen(SOMAXCONN)
fn open(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;

    if addr.is_ipv6() && addr.ip().is_unspecified() {
        // Dual-stack; si el sistema no lo permite queda solo IPv6
        if let Err(e) = socket.set_only_v6(false) {
            debug!(cause = %e, "dual-stack not available");
        }
    }

    socket.bind(&addr.into())?;
    socket.listen(libc::SOMAXCONN)?;
    Ok(socket.into())
}
