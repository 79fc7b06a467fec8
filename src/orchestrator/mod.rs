//! Playback orchestration.
//!
//! Owns the session a presentation layer steps through: the walkthrough built
//! for the current problem, the cursor over it and the staged reveal of each
//! step. UI/CLI layers only talk to this module.

mod controller;

pub use controller::{Playback, RevealPhase, RevealTicket};
