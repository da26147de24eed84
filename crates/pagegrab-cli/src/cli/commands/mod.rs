//! CLI command handlers, one per file.

mod attrs;
mod fetch;
mod images;
mod menu;
mod save;

pub use attrs::run_attrs;
pub(crate) use attrs::attribute_values;
pub use fetch::run_fetch;
pub use images::run_images;
pub use menu::run_menu;
pub use save::run_save;
