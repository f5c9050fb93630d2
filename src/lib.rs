// src/lib.rs

// Import the top-level `aip` module.
pub mod aip;

// Re-exporting key items for easier external access: the client entry points
// and the types callers touch on every check.
pub use aip::client::{create_client, AipClient};
pub use aip::error::AipError;
pub use aip::event::EventHandler;
pub use aip::schemas::{AipConfig, IntegritySignal};

/// Initialize the global logger from the `RUST_LOG` environment variable.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
