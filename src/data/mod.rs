pub mod memory;
pub mod model;

pub use memory::MemoryBackend;
pub use model::*;
