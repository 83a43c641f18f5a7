//! Application Layer
//!
//! Use cases and application services.

pub mod arrange_pages;
pub mod config;
pub mod delete_page;
pub mod list_pages;
pub mod page_form;
pub mod store_page;
pub mod tags;

// Re-exports
pub use arrange_pages::ArrangePagesUseCase;
pub use config::{ConfigError, PagesConfig};
pub use delete_page::{DeletePageOutput, DeletePageUseCase};
pub use list_pages::{ListPagesUseCase, PageRow, PageTree, parse_expanded_rows};
pub use page_form::{FormAction, PageFormData, PageFormUseCase};
pub use store_page::{StoreOutcome, StorePageInput, StorePageUseCase, StoreTarget};
