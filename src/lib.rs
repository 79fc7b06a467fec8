//! Step-by-step long division.
//!
//! Given a non-negative dividend and a positive divisor, this crate produces
//! the sequence of teaching steps a person goes through when dividing by hand,
//! together with the exact grid position of every symbol written on the page.
//!
//! The pipeline only runs forward:
//! 1. [`engine`] computes the quotient digit by digit.
//! 2. [`layout`] assigns every digit and symbol a (row, column).
//! 3. [`sequencer`] splits the work into bring-down / divide / multiply /
//!    subtract micro-steps with explanations.
//! 4. [`orchestrator::Playback`] is a forward-only cursor over those steps.
//!
//! ```
//! use long_division::orchestrator::Playback;
//!
//! let mut playback = Playback::new();
//! playback.begin_integers(84, 3).unwrap();
//! while playback.advance().is_some() {}
//! assert!(playback.is_complete());
//! assert_eq!(playback.walkthrough().unwrap().quotient, "28");
//! ```

pub mod engine;
pub mod error;
pub mod layout;
pub mod model;
pub mod orchestrator;
pub mod sequencer;
pub mod text_summary;

pub use crate::error::ValidationError;
pub use crate::model::{Problem, Step, Walkthrough};
pub use crate::orchestrator::Playback;
