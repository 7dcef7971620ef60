//! Display module for coloured terminal output and tables

pub mod colours;
pub mod table;

pub use colours::ColourManager;
pub use table::format_plugin_table;
