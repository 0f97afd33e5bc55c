//! Infrastructure Layer
//!
//! Session store and profile repository implementations.

pub mod hosted;
pub mod memory;

pub use hosted::HostedBackend;
pub use memory::InMemoryBackend;
