use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Running,
    Paused,
}

/// Why a transport or session operation was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoredReason {
    AlreadyRunning,
    NotRunning,
    EmptySequence,
    /// The sequence cannot be swapped while it is playing.
    Busy,
}

/// Outcome of a state-changing call. Calls made in the wrong state are not
/// errors, they are ignored and say why.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored(IgnoredReason),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Logical clock counted in ticks. It only moves while running.
#[derive(Debug)]
pub struct Transport {
    state: TransportState,
    position: u64,
}

impl Default for Transport {
    fn default() -> Self {
        Transport {
            state: TransportState::Idle,
            position: 0,
        }
    }
}

impl Transport {
    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }

    pub fn start(&mut self) -> Transition {
        if self.is_running() {
            return Transition::Ignored(IgnoredReason::AlreadyRunning);
        }
        self.state = TransportState::Running;
        Transition::Applied
    }

    pub fn pause(&mut self) -> Transition {
        if !self.is_running() {
            return Transition::Ignored(IgnoredReason::NotRunning);
        }
        self.state = TransportState::Paused;
        Transition::Applied
    }

    /// Back to tick 0, idle.
    pub fn rewind(&mut self) -> Transition {
        if self.is_running() {
            return Transition::Ignored(IgnoredReason::Busy);
        }
        self.state = TransportState::Idle;
        self.position = 0;
        Transition::Applied
    }

    /// Moves the clock forward and returns the ticks that elapsed, as a
    /// half-open range. Nothing elapses unless running.
    pub fn advance(&mut self, ticks: u64) -> Option<Range<u64>> {
        if !self.is_running() {
            return None;
        }
        let from = self.position;
        self.position += ticks;
        Some(from..self.position)
    }
}
