//! # Cola de Admisión
//! src/pool/queue.rs
//!
//! Cola FIFO acotada y thread-safe entre el listener (productor) y los
//! workers (consumidores). Llenarse es la única señal de backpressure: el
//! productor recibe de vuelta el elemento rechazado y decide qué hacer con él.
//!
//! La cola y el flag `stopping` comparten un único `Mutex` y un `Condvar`,
//! así el predicado de espera de los workers se evalúa siempre de forma
//! atómica.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Capacidad por defecto de la cola
pub const DEFAULT_CAPACITY: usize = 1000;

struct State<T> {
    items: VecDeque<T>,
    /// Monótono: una vez `true` no vuelve a `false`
    stopping: bool,
}

/// Cola FIFO acotada con señal de parada
pub struct AdmissionQueue<T> {
    state: Mutex<State<T>>,
    /// Despierta workers cuando hay elementos o cuando se detiene la cola
    available: Condvar,
    capacity: usize,
}

impl<T> AdmissionQueue<T> {
    /// Crea una nueva cola con capacidad fija
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
                stopping: false,
            }),
            available: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // Ninguna sección crítica deja el estado a medias, así que un
        // panic en otro thread no lo invalida
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encola un elemento al final
    ///
    /// Retorna `Err(item)` si la cola está llena (`len >= capacity`) o
    /// detenida; el llamador recupera así el elemento para rechazarlo.
    pub fn enqueue(&self, item: T) -> Result<(), T> {
        {
            let mut state = self.lock();
            if state.stopping || state.items.len() >= self.capacity {
                return Err(item);
            }
            state.items.push_back(item);
        }

        // Notificar a un worker esperando
        self.available.notify_one();
        Ok(())
    }

    /// Desencola el elemento más antiguo
    ///
    /// Bloquea hasta que haya un elemento. Retorna `None` solo cuando la cola
    /// está detenida **y** vacía: los elementos pendientes se drenan antes de
    /// que los workers vean la señal de parada.
    pub fn dequeue(&self) -> Option<T> {
        let guard = self.lock();
        let mut state = self
            .available
            .wait_while(guard, |state| !state.stopping && state.items.is_empty())
            .unwrap_or_else(PoisonError::into_inner);

        state.items.pop_front()
    }

    /// Desencola sin bloquear
    #[cfg(test)]
    pub(crate) fn try_dequeue(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    /// Marca la cola como detenida y despierta a todos los workers
    pub fn stop(&self) {
        self.lock().stopping = true;
        self.available.notify_all();
    }

    pub fn is_stopping(&self) -> bool {
        self.lock().stopping
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Verifica si la cola está llena
    #[cfg(test)]
    pub(crate) fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }
}

impl<T> Default for AdmissionQueue<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> std::fmt::Debug for AdmissionQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("AdmissionQueue")
            .field("len", &state.items.len())
            .field("capacity", &self.capacity)
            .field("stopping", &state.stopping)
            .finish()
    }
}
