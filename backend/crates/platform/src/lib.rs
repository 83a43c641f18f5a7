//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, signed tokens, secrets)
//! - Cookie management
//! - Bracket-style form decoding (`page[title]`, `part[1][name]`)
//! - HTML tag stripping

pub mod cookie;
pub mod crypto;
pub mod form;
pub mod html;
