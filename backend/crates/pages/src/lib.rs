//! Pages (Back-Office Page Administration) Module
//!
//! Clean Architecture structure:
//! - `domain/` - Page tree entities, validation, lifecycle events, repository traits
//! - `application/` - Use cases (list, form, store, delete, reorder, copy)
//! - `infra/` - PostgreSQL and in-memory stores
//! - `presentation/` - HTTP handlers, form DTOs, views, router
//!
//! ## Features
//! - Collapsible page tree with lazily loaded branches
//! - Add/edit forms with named content parts and tags
//! - Recursive delete, drag-and-drop reorder, and branch copy
//! - Observers notified around every save and delete
//!
//! ## Security Model
//! - Every route requires an editor session (signed cookie token)
//! - Protected pages are editable by administrators and developers only
//! - The root page can be neither deleted nor moved
//! - Page titles are HTML-stripped unless configured otherwise

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::PagesConfig;
pub use domain::events::{Observers, PageEvent, PageObserver, TracingObserver};
pub use error::{PageError, PageResult};
pub use infra::memory::MemoryPageStore;
pub use infra::postgres::PgPageStore;
pub use presentation::router::pages_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};

pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgPageStore as PageStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
