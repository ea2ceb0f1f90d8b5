// JSON utilities
pub mod json;

// Display helpers shared by pages and the CLI
pub mod display;
pub mod table;

pub use display::{hostname_from_url, or_dash};
pub use json::value_to_short_string;
pub use table::new_table;
