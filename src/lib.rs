//! Champion recommendations and play-style clustering from a player's
//! League of Legends champion mastery.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod data;
pub mod display;
pub mod engine;
pub mod error;
pub mod model;
