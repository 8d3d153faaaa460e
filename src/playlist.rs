//! Playlist model and its on-disk store.
//!
//! `Playlist` keeps tracks in insertion order plus the (possibly shuffled)
//! order used for navigation; `PlaylistStore` persists the insertion order.

mod model;
mod store;

pub use model::*;
pub use store::PlaylistStore;

#[cfg(test)]
mod tests;
