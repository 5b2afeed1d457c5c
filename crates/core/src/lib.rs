//! Deck logic. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod controller;
pub mod deck;
pub mod events;
pub mod filter;
pub mod gesture;
pub mod prefs;
pub mod rng;
pub mod roster;
pub mod schedule;

pub use cards::*;
pub use config::*;
pub use controller::*;
pub use deck::*;
pub use events::*;
pub use filter::*;
pub use gesture::*;
pub use prefs::*;
pub use rng::*;
pub use roster::*;
pub use schedule::*;
