pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    load_scan_file, render_output, resolve_credentials, resolve_source, viewer_title,
};

// Re-export scan functionality from cloudscope-core
pub use cloudscope_core::report::ReportFormat;
pub use cloudscope_core::scan::{ScanOptions, ScanOutput, ScanSource, execute_scan};
