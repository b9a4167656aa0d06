// Terminal table and CSV export of dashboard rows
pub mod csv_export;
pub mod format;
pub mod table;

// Re-export commonly used types
pub use csv_export::{export_csv, write_csv};
pub use table::render_table;
