pub mod categories;
pub mod menus;
pub mod uploads;

pub use categories::{CategoryListing, CategoryService};
pub use menus::MenuService;
pub use uploads::UploadService;
