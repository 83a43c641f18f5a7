//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by every
//! backend crate:
//! - The HTTP-facing error type
//! - Typed record identifiers
//!
//! Only things with a stable meaning across all domains belong here.

pub mod error {
    pub mod app_error;
    pub mod kind;
}
pub mod id;
