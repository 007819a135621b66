//! Party Finder bot library.
//!
//! Core of a Telegram bot that helps members find game events:
//! - [`db`] - Identity store (users, admin flag)
//! - [`services`] - Admin reconciliation and per-message role resolution
//! - [`menu`] - Reply keyboards and button dispatch
//! - [`handlers`] - Greeting and button handling for one inbound message
//! - [`telegram`] / [`poller`] - Bot API transport
//!
//! The binary in `main.rs` wires these together; everything here is also
//! usable from the CLI and tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod menu;
pub mod models;
pub mod poller;
pub mod services;
pub mod state;
pub mod telegram;
