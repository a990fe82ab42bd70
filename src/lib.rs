//! Commit Chords Library
//!
//! Turns a profile's contribution calendar into a looping chord sequence.
//! This library exposes the internal modules for the binaries and for testing.

pub mod config;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod playback;
pub mod sequence;
pub mod server;

// Re-export commonly used types for convenience
pub use error::{FetchError, ParseError};
pub use grid::{ColorCell, ColorColumn, ColorGrid};
pub use playback::{PlaybackController, PlaybackScheduler, Transition};
pub use sequence::{map_to_sequence, ChordEvent, PitchLabel, STEP};
pub use server::{run_server, RequestsLoggingLevel};
