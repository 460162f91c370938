//! Input handling module

pub mod glob_resolver;
pub mod table_reader;

pub use glob_resolver::resolve_patterns;
pub use table_reader::{read_table, TableFormat};
