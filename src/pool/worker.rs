//! # Pool de Workers
//! src/pool/worker.rs
//!
//! Conjunto fijo de threads de larga vida que consumen la cola de admisión.
//! Cada worker procesa un elemento a la vez hasta completarlo; el tamaño del
//! pool no cambia nunca en tiempo de ejecución.
//!
//! ## Apagado
//!
//! ```text
//! shutdown() → queue.stop() → workers drenan lo encolado → dequeue() = None → join
//! ```
//!
//! `Drop` ejecuta el mismo protocolo, así ningún thread queda desacoplado ni
//! ningún elemento encolado se pierde.

use crate::pool::queue::AdmissionQueue;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Pool fijo de workers alimentado por una [`AdmissionQueue`]
pub struct WorkerPool<T: Send + 'static> {
    queue: Arc<AdmissionQueue<T>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Crea el pool e inicia `size` workers
    ///
    /// `job` se ejecuta en el worker que desencola cada elemento; es dueño
    /// exclusivo del elemento durante toda la llamada.
    ///
    /// # Errores
    ///
    /// Falla si el sistema no permite crear otro thread. Los workers ya
    /// creados se detienen y se unen antes de retornar.
    pub fn new<F>(size: usize, capacity: usize, job: F) -> io::Result<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let queue = Arc::new(AdmissionQueue::new(capacity));
        let job = Arc::new(job);

        let mut pool = Self {
            queue,
            workers: Vec::with_capacity(size),
        };

        for i in 0..size {
            let queue = Arc::clone(&pool.queue);
            let job = Arc::clone(&job);

            // Si falla aquí, `pool` se descarta y Drop une a los ya creados
            let handle = thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || Self::worker_loop(queue, job))?;
            pool.workers.push(handle);
        }

        info!(workers = size, queue_capacity = capacity, "Created pool");
        Ok(pool)
    }

    /// Loop principal del worker
    fn worker_loop<F>(queue: Arc<AdmissionQueue<T>>, job: Arc<F>)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let name = thread::current().name().unwrap_or("worker").to_string();
        debug!(worker = %name, "worker started");

        while let Some(item) = queue.dequeue() {
            debug!(worker = %name, pending = queue.len(), "picked up connection");

            // Un handler que hace panic no debe matar al worker
            if panic::catch_unwind(AssertUnwindSafe(|| job(item))).is_err() {
                error!(worker = %name, "job panicked; worker continues");
            }
        }

        debug!(worker = %name, "worker terminated");
    }

    /// Intenta encolar un elemento
    ///
    /// Retorna `Err(item)` si la cola está llena o el pool se está deteniendo.
    pub fn submit(&self, item: T) -> Result<(), T> {
        self.queue.enqueue(item)
    }

    /// Número de workers del pool
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Elementos esperando en la cola
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Detiene el pool: drena la cola y espera a todos los workers
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.queue.stop();

        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                error!(worker = %name, "worker thread panicked");
            }
        }
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.stop_and_join();
        }
    }
}

impl<T: Send + 'static> std::fmt::Debug for WorkerPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .field("queue", &self.queue)
            .finish()
    }
}
