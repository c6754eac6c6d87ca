//! Catalog operations against the backlog API.

mod client;
mod decode;

pub use client::CatalogClient;
pub use decode::{decode_game_list, ListBody};
