//! Neurodrive Core - shared foundation for the neuroevolution workspace
//!
//! Holds the error taxonomy used by every other crate in the workspace and
//! the usual version/init plumbing. Domain types live in the crates that
//! own them (`neurodrive-network`, `neurodrive-genetics`,
//! `neurodrive-evolution`).

pub mod error;

pub use error::{EvolutionError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn init() {
    tracing::info!("neurodrive-core v{} initialized", VERSION);
}
