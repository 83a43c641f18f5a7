//! Presentation Layer
//!
//! HTTP handlers, form DTOs, flash cookies, views, router, and middleware.

pub mod dto;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod views;

pub use handlers::PagesAppState;
pub use middleware::require_editor;
pub use router::{pages_router, pages_router_generic};
pub use views::PageViews;
