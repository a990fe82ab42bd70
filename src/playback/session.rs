//! Start/stop state machine driving playback of one profile at a time.
//!
//! Fetches are tagged with a ticket. Issuing a new fetch, or resuming the
//! current session, supersedes any fetch still in flight: its completion is
//! reported as stale and dropped.

use super::scheduler::{PlaybackScheduler, PlaybackSettings, RenderSurface, SoundEngine};
use super::transport::{IgnoredReason, Transition, TransportState};
use crate::grid::ColorGrid;
use crate::sequence::{map_to_sequence, ChordEvent};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub identifier: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartAction {
    /// The caller must fetch the grid for the ticket's identifier and hand it
    /// to [`PlaybackController::complete_fetch`].
    Fetch(FetchTicket),
    Resumed,
    Ignored(IgnoredReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Playing { events: usize },
    /// Nothing to play, the current session is left untouched.
    NoData,
    Stale,
}

/// A loaded sequence and its transport, bound to the identifier it came from.
pub struct PlaybackSession {
    identifier: String,
    scheduler: PlaybackScheduler,
}

impl PlaybackSession {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn events(&self) -> &[ChordEvent] {
        self.scheduler.events()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn looping(&self) -> bool {
        self.scheduler.looping()
    }

    pub fn state(&self) -> TransportState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }
}

pub struct PlaybackController {
    settings: PlaybackSettings,
    session: Option<PlaybackSession>,
    pending: Option<FetchTicket>,
    last_ticket_id: u64,
}

impl PlaybackController {
    pub fn new(settings: PlaybackSettings) -> PlaybackController {
        PlaybackController {
            settings,
            session: None,
            pending: None,
            last_ticket_id: 0,
        }
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn pending_fetch(&self) -> Option<&FetchTicket> {
        self.pending.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(PlaybackSession::is_running)
    }

    fn issue_ticket(&mut self, identifier: &str) -> FetchTicket {
        self.last_ticket_id += 1;
        let ticket = FetchTicket {
            id: self.last_ticket_id,
            identifier: identifier.to_owned(),
        };
        if let Some(superseded) = self.pending.replace(ticket.clone()) {
            debug!(
                "Fetch #{} for {} superseded by #{}",
                superseded.id, superseded.identifier, ticket.id
            );
        }
        ticket
    }

    /// Start button. Switching identifier while playing is ignored.
    pub fn request_start(&mut self, identifier: &str) -> StartAction {
        let Some(session) = self.session.as_mut() else {
            return StartAction::Fetch(self.issue_ticket(identifier));
        };

        if session.is_running() {
            return StartAction::Ignored(IgnoredReason::AlreadyRunning);
        }

        if session.identifier != identifier {
            info!(
                "Switching from {} to {}, fetching new data",
                session.identifier, identifier
            );
            return StartAction::Fetch(self.issue_ticket(identifier));
        }

        match session.scheduler.start() {
            Transition::Applied => {
                self.pending = None;
                StartAction::Resumed
            }
            Transition::Ignored(reason) => StartAction::Ignored(reason),
        }
    }

    /// Stop button.
    pub fn request_stop(&mut self) -> Transition {
        match self.session.as_mut() {
            Some(session) => session.scheduler.pause(),
            None => Transition::Ignored(IgnoredReason::NotRunning),
        }
    }

    /// Hands the fetched grid for `ticket` over. Only the latest ticket is
    /// accepted; on success the session is replaced and starts playing.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, grid: &ColorGrid) -> Completion {
        if self.pending.as_ref() != Some(ticket) {
            debug!("Dropping stale fetch #{} for {}", ticket.id, ticket.identifier);
            return Completion::Stale;
        }
        self.pending = None;

        if grid.is_empty() {
            info!("No contribution data for {}", ticket.identifier);
            return Completion::NoData;
        }

        let events = map_to_sequence(grid);
        let count = events.len();
        let mut scheduler = PlaybackScheduler::new(self.settings.clone());
        scheduler.load_sequence(events);
        scheduler.start();

        info!("Playing {} weeks for {}", count, ticket.identifier);
        self.session = Some(PlaybackSession {
            identifier: ticket.identifier.clone(),
            scheduler,
        });
        Completion::Playing { events: count }
    }

    /// Advances the clock then runs the draw-safe render point.
    pub fn tick<E, S>(&mut self, ticks: u64, engine: &mut E, surface: &mut S) -> usize
    where
        E: SoundEngine + ?Sized,
        S: RenderSurface + ?Sized,
    {
        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        let fired = session.scheduler.advance(ticks, engine);
        session.scheduler.drain_render(surface);
        fired
    }
}
