// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    GroupSelection,
    parse_engine_list,
    report_formats,
    report_path,
};
