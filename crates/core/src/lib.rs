//! Party Finder Core - Shared types library.
//!
//! This crate provides common types used across all party finder components:
//! - `bot` - Telegram front end (identity store, role resolution, menus)
//! - `cli` - Command-line tools for migrations and admin bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for store IDs, chat identities and the admin list

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
