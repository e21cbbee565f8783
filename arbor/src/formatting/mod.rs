//! Terminal output for the CLI.
//!
//! Everything here writes to stdout with consistent colors and symbols.
//! Diagnostics go through `tracing` to stderr instead.

mod headers;
mod output;
mod progress;
mod status;
mod tables;

pub use headers::{print_section_header, SectionStyle};
pub use output::{format_duration, print_key_value};
pub use progress::create_progress_bar;
pub use status::{print_success, print_warning, Status};
pub use tables::{print_hoist_table, print_package_list, print_run_summary};
