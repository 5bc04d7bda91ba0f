//! Artifact Sim - Monte-Carlo simulator for farming and optimizing artifact loadouts
//!
//! Rolls random 5-star artifacts the way the game's domains drop them, levels the
//! promising ones, searches for the loadout with the highest damage index and
//! aggregates the results of many farming sessions.

pub mod types;
pub mod tables;
pub mod artifact;
pub mod config;
pub mod profile;
pub mod damage;
pub mod farm;
pub mod stats;

pub use types::*;
pub use artifact::*;
pub use config::*;
pub use profile::*;
pub use damage::*;
pub use farm::*;
pub use stats::*;
