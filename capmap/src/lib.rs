pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{ConnectionConfig, load_token_from_file, render_node, resolve_token};
