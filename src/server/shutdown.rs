//! # Coordinador de Apagado
//! src/server/shutdown.rs
//!
//! [`Shutdown`] es un token de cancelación compartido: un solo escritor lo
//! activa y el loop de accept lo consulta. Activarlo es monótono.
//!
//! El handler de señal real lo instala `signal-hook` y solo escribe en un
//! pipe; la reacción corre en un thread normal ([`SignalListener`]) que
//! llama a [`Shutdown::trigger`]. Como `accept` de la librería estándar
//! reintenta ante `EINTR`, `trigger` además abre una conexión desechable al
//! propio listener para desbloquearlo.

use crate::error::ServerError;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Tiempo máximo para la conexión de despertar
const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Token de apagado compartido entre el loop de accept y las señales
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    triggered: Arc<AtomicBool>,
    /// Dirección a la que conectarse para desbloquear `accept`
    wake_addr: Arc<OnceLock<SocketAddr>>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Registra la dirección del listener a despertar
    ///
    /// Solo cuenta la primera llamada.
    pub fn arm(&self, listen_addr: SocketAddr) {
        let _ = self.wake_addr.set(wake_target(listen_addr));
    }

    /// Activa el apagado y desbloquea el `accept` pendiente
    pub fn trigger(&self) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(addr) = self.wake_addr.get() {
            // Si falla, el loop igual verá el flag en el próximo accept
            if let Err(e) = TcpStream::connect_timeout(addr, WAKE_TIMEOUT) {
                debug!(address = %addr, cause = %e, "wake-up connection failed");
            }
        }
    }
}

/// Las direcciones "any" no son conectables: usar loopback de la misma familia
fn wake_target(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port()),
        _ => addr,
    }
}

/// Thread que espera SIGINT/SIGTERM y activa el [`Shutdown`]
///
/// Al descartarse cierra el iterador de señales y une el thread.
#[derive(Debug)]
pub struct SignalListener {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Instala los handlers y arranca el thread
    ///
    /// # Errores
    ///
    /// [`ServerError::Signal`] si no se pudo registrar el handler o crear el
    /// thread.
    pub fn install(shutdown: Shutdown) -> Result<Self, ServerError> {
        let mut signals =
            Signals::new([SIGINT, SIGTERM]).map_err(|source| ServerError::Signal { source })?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("signals".to_string())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    info!(signal, "Shutting down server...");
                    shutdown.trigger();
                }
            })
            .map_err(|source| ServerError::Signal { source })?;

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
