// All core functionality is in slidelint-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod render;

// Re-export core types for convenience
pub use slidelint_core::*;

// Re-export CLI utilities
pub use render::{render, render_text, OutputFormat};
