//! # Pool de Workers
//! src/pool/mod.rs
//!
//! - `queue`: cola de admisión FIFO acotada (backpressure)
//! - `worker`: pool fijo de threads que la consume

pub mod queue;
pub mod worker;

pub use queue::AdmissionQueue;
pub use worker::WorkerPool;
