#![warn(clippy::all, missing_docs)]

//! Core domain logic for the backlog catalog.
//!
//! This crate hosts the wire data model, configuration handling,
//! the HTTP catalog client with its response decoding, and the
//! notification boundary used by the terminal UI and any future
//! frontends.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;

pub use catalog::{decode_game_list, CatalogClient, ListBody};
pub use config::AppConfig;
pub use error::CatalogError;
pub use models::Game;
pub use notify::{MutationKind, Notifier};
