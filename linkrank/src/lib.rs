pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    collect_existing, expand_path, format_verdicts, load_existing_from_file, parse_existing_line,
    resolve_config_path, write_default_config,
};
