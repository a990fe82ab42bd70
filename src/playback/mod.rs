//! Transport, scheduling and rendering of a chord sequence.
//!
//! Everything in here runs on a single logical thread: the owner of the
//! [`PlaybackController`] advances it from its own loop, and nothing is shared.

mod renderer;
mod scheduler;
mod session;
mod transport;

pub use renderer::{GraphRenderer, RenderedCell, RenderedRow};
pub use scheduler::{
    LoopReset, PlaybackScheduler, PlaybackSettings, RenderJob, RenderSurface, SoundEngine,
};
pub use session::{Completion, FetchTicket, PlaybackController, PlaybackSession, StartAction};
pub use transport::{IgnoredReason, Transition, Transport, TransportState};
