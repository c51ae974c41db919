pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{empty, field, header, highlight, success, warn};
pub use table::{channels_table, entries_table, stats_table};
pub use theme::{theme, Theme};
