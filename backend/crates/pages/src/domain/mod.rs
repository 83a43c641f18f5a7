//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Page, PagePart, Tag, Layout, Editor, FlashData)
//! - Domain value objects (PageStatus, LoginRequirement, Role, PositionMap)
//! - Domain services (validation, part reconciliation, tag and position parsing)
//! - Lifecycle events and observers
//! - Repository traits (interfaces)

pub mod entities;
pub mod events;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use entities::{Editor, FlashData, Layout, Page, PageInput, PagePart, PartInput, Tag};
pub use events::{Observers, PageEvent, PageObserver, TracingObserver};
pub use repository::PagesStore;
