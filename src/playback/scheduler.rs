use super::transport::{IgnoredReason, Transition, Transport, TransportState};
use crate::sequence::{ChordEvent, PitchLabel, STEP};
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Audio side of playback. Receives every chord at its scheduled tick.
pub trait SoundEngine {
    fn trigger_attack_release(&mut self, pitches: &[PitchLabel], duration_ticks: u64, at_tick: u64);
}

/// Visual side of playback. Only ever called from [`PlaybackScheduler::drain_render`].
pub trait RenderSurface {
    fn render_row(&mut self, event: &ChordEvent);
    fn reset_surface(&mut self);
}

/// When the surface is wiped at a loop boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LoopReset {
    /// Right before the first row of every pass is drawn.
    #[default]
    BeforeFirstRow,
    /// Right after the first row of every pass is drawn.
    AfterFirstRow,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackSettings {
    pub bpm: u32,
    /// Ticks per quarter note.
    pub ppq: u32,
    pub looping: bool,
    pub loop_reset: LoopReset,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        PlaybackSettings {
            bpm: 10,
            ppq: 192,
            looping: true,
            loop_reset: LoopReset::default(),
        }
    }
}

impl PlaybackSettings {
    /// Wall-clock length of one logical tick.
    pub fn tick_duration(&self) -> Duration {
        let ticks_per_minute = self.bpm.max(1) as f64 * self.ppq.max(1) as f64;
        Duration::from_secs_f64(60.0 / ticks_per_minute)
    }

    /// A sixteenth note.
    pub fn note_duration_ticks(&self) -> u64 {
        (self.ppq as u64 / 4).max(1)
    }
}

/// A fired chord waiting for the draw-safe point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderJob {
    pub at_tick: u64,
    pub index: usize,
    pub pass: u64,
    pub event: ChordEvent,
}

pub struct PlaybackScheduler {
    settings: PlaybackSettings,
    events: Vec<ChordEvent>,
    transport: Transport,
    next_index: usize,
    pass: u64,
    render_queue: VecDeque<RenderJob>,
}

impl PlaybackScheduler {
    pub fn new(settings: PlaybackSettings) -> PlaybackScheduler {
        PlaybackScheduler {
            settings,
            events: vec![],
            transport: Transport::default(),
            next_index: 0,
            pass: 0,
            render_queue: VecDeque::new(),
        }
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn events(&self) -> &[ChordEvent] {
        &self.events
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn position(&self) -> u64 {
        self.transport.position()
    }

    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    pub fn looping(&self) -> bool {
        self.settings.looping
    }

    /// Passes played to the end so far.
    pub fn completed_passes(&self) -> u64 {
        self.pass + u64::from(!self.events.is_empty() && self.next_index == self.events.len())
    }

    pub fn pending_renders(&self) -> usize {
        self.render_queue.len()
    }

    /// Installs a new sequence and rewinds to tick 0. Refused while running.
    pub fn load_sequence(&mut self, events: Vec<ChordEvent>) -> Transition {
        let rewound = self.transport.rewind();
        if !rewound.is_applied() {
            return rewound;
        }
        self.events = events;
        self.next_index = 0;
        self.pass = 0;
        self.render_queue.clear();
        Transition::Applied
    }

    pub fn start(&mut self) -> Transition {
        if self.events.is_empty() {
            return Transition::Ignored(IgnoredReason::EmptySequence);
        }
        self.transport.start()
    }

    pub fn pause(&mut self) -> Transition {
        self.transport.pause()
    }

    fn loop_length(&self) -> u64 {
        self.events.last().map(|e| e.offset + STEP).unwrap_or(0)
    }

    /// Absolute tick of the next event to fire, if any is left.
    pub fn next_due_tick(&self) -> Option<u64> {
        self.events
            .get(self.next_index)
            .map(|event| self.pass * self.loop_length() + event.offset)
    }

    /// Advances the clock and fires, in order, every event scheduled in the
    /// elapsed ticks. Each fired event is sent to the engine right away and
    /// queued for rendering. Returns how many events fired.
    pub fn advance<E>(&mut self, ticks: u64, engine: &mut E) -> usize
    where
        E: SoundEngine + ?Sized,
    {
        let Some(elapsed) = self.transport.advance(ticks) else {
            return 0;
        };

        let note_duration = self.settings.note_duration_ticks();
        let mut fired = 0;
        while let Some(due) = self.next_due_tick() {
            if due >= elapsed.end {
                break;
            }
            let event = &self.events[self.next_index];
            engine.trigger_attack_release(&event.pitches, note_duration, due);
            self.render_queue.push_back(RenderJob {
                at_tick: due,
                index: self.next_index,
                pass: self.pass,
                event: event.clone(),
            });
            fired += 1;

            self.next_index += 1;
            if self.next_index == self.events.len() && self.settings.looping {
                self.next_index = 0;
                self.pass += 1;
            }
        }
        fired
    }

    /// Draw-safe point: applies every queued render job to the surface.
    pub fn drain_render<S>(&mut self, surface: &mut S) -> usize
    where
        S: RenderSurface + ?Sized,
    {
        let mut drawn = 0;
        while let Some(job) = self.render_queue.pop_front() {
            let first_row = job.index == 0;
            if first_row && self.settings.loop_reset == LoopReset::BeforeFirstRow {
                surface.reset_surface();
            }
            surface.render_row(&job.event);
            if first_row && self.settings.loop_reset == LoopReset::AfterFirstRow {
                surface.reset_surface();
            }
            drawn += 1;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::PitchClass;

    #[derive(Default)]
    struct RecordingEngine {
        triggers: Vec<(Vec<String>, u64, u64)>,
    }

    impl SoundEngine for RecordingEngine {
        fn trigger_attack_release(
            &mut self,
            pitches: &[PitchLabel],
            duration_ticks: u64,
            at_tick: u64,
        ) {
            let pitches = pitches.iter().map(|p| p.to_string()).collect();
            self.triggers.push((pitches, duration_ticks, at_tick));
        }
    }

    impl RecordingEngine {
        fn ticks(&self) -> Vec<u64> {
            self.triggers.iter().map(|t| t.2).collect()
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<String>,
    }

    impl RenderSurface for RecordingSurface {
        fn render_row(&mut self, event: &ChordEvent) {
            self.calls.push(format!("row@{}", event.offset));
        }

        fn reset_surface(&mut self) {
            self.calls.push("reset".to_string());
        }
    }

    fn sequence(len: usize) -> Vec<ChordEvent> {
        (0..len)
            .map(|i| ChordEvent {
                offset: i as u64 * STEP,
                pitches: vec![PitchLabel::new(PitchClass::E, (i % 7 + 1) as u8)],
            })
            .collect()
    }

    fn scheduler(len: usize) -> PlaybackScheduler {
        let mut scheduler = PlaybackScheduler::new(PlaybackSettings::default());
        assert!(scheduler.load_sequence(sequence(len)).is_applied());
        scheduler
    }

    #[test]
    fn fires_each_event_at_its_offset() {
        let mut scheduler = scheduler(3);
        let mut engine = RecordingEngine::default();
        scheduler.start();

        assert_eq!(scheduler.advance(1, &mut engine), 1);
        assert_eq!(scheduler.advance(9, &mut engine), 0);
        assert_eq!(scheduler.advance(1, &mut engine), 1);
        assert_eq!(engine.ticks(), vec![0, 10]);
        assert_eq!(engine.triggers[0].0, vec!["E1"]);
        assert_eq!(engine.triggers[0].1, 48);
    }

    #[test]
    fn paused_interval_is_not_counted() {
        let mut scheduler = scheduler(2);
        let mut engine = RecordingEngine::default();

        scheduler.start();
        scheduler.advance(4, &mut engine);
        assert!(scheduler.pause().is_applied());
        assert_eq!(scheduler.advance(1000, &mut engine), 0);
        assert!(scheduler.start().is_applied());

        assert_eq!(scheduler.advance(6, &mut engine), 0);
        assert_eq!(scheduler.position(), 10);
        assert_eq!(scheduler.advance(1, &mut engine), 1);
        assert_eq!(engine.ticks(), vec![0, 10]);
    }

    #[test]
    fn loops_back_to_first_event_one_step_after_the_last() {
        let mut scheduler = scheduler(3);
        let mut engine = RecordingEngine::default();
        scheduler.start();

        scheduler.advance(31, &mut engine);
        assert_eq!(engine.ticks(), vec![0, 10, 20, 30]);
        assert_eq!(engine.triggers[3].0, engine.triggers[0].0);
        assert_eq!(scheduler.completed_passes(), 1);

        scheduler.advance(30, &mut engine);
        assert_eq!(engine.ticks(), vec![0, 10, 20, 30, 40, 50, 60]);
        assert_eq!(scheduler.completed_passes(), 2);
    }

    #[test]
    fn without_looping_each_event_fires_once() {
        let mut scheduler = PlaybackScheduler::new(PlaybackSettings {
            looping: false,
            ..PlaybackSettings::default()
        });
        scheduler.load_sequence(sequence(2));
        let mut engine = RecordingEngine::default();
        scheduler.start();

        scheduler.advance(500, &mut engine);
        assert_eq!(engine.ticks(), vec![0, 10]);
        assert_eq!(scheduler.completed_passes(), 1);
        assert_eq!(scheduler.next_due_tick(), None);
    }

    #[test]
    fn empty_sequence_stays_idle() {
        let mut scheduler = scheduler(0);
        let mut engine = RecordingEngine::default();
        let mut surface = RecordingSurface::default();

        assert_eq!(
            scheduler.start(),
            Transition::Ignored(IgnoredReason::EmptySequence)
        );
        assert_eq!(scheduler.state(), TransportState::Idle);
        assert_eq!(scheduler.advance(100, &mut engine), 0);
        assert_eq!(scheduler.drain_render(&mut surface), 0);
        assert!(engine.triggers.is_empty());
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn sequence_cannot_be_swapped_while_running() {
        let mut scheduler = scheduler(2);
        scheduler.start();
        assert_eq!(
            scheduler.load_sequence(sequence(5)),
            Transition::Ignored(IgnoredReason::Busy)
        );
        assert_eq!(scheduler.events().len(), 2);

        scheduler.pause();
        assert!(scheduler.load_sequence(sequence(5)).is_applied());
        assert_eq!(scheduler.events().len(), 5);
        assert_eq!(scheduler.position(), 0);
        assert_eq!(scheduler.state(), TransportState::Idle);
    }

    #[test]
    fn pause_while_idle_is_ignored() {
        let mut scheduler = scheduler(2);
        assert_eq!(
            scheduler.pause(),
            Transition::Ignored(IgnoredReason::NotRunning)
        );
    }

    #[test]
    fn rendering_waits_for_the_draw_point() {
        let mut scheduler = scheduler(2);
        let mut engine = RecordingEngine::default();
        let mut surface = RecordingSurface::default();
        scheduler.start();

        scheduler.advance(11, &mut engine);
        assert_eq!(engine.triggers.len(), 2);
        assert!(surface.calls.is_empty());
        assert_eq!(scheduler.pending_renders(), 2);

        assert_eq!(scheduler.drain_render(&mut surface), 2);
        assert_eq!(surface.calls, vec!["reset", "row@0", "row@10"]);
        assert_eq!(scheduler.pending_renders(), 0);
    }

    #[test]
    fn surface_is_reset_at_each_loop_start() {
        let mut scheduler = scheduler(2);
        let mut engine = RecordingEngine::default();
        let mut surface = RecordingSurface::default();
        scheduler.start();

        scheduler.advance(41, &mut engine);
        scheduler.drain_render(&mut surface);
        assert_eq!(
            surface.calls,
            vec!["reset", "row@0", "row@10", "reset", "row@0", "row@10", "reset", "row@0"]
        );
    }

    #[test]
    fn compat_reset_happens_after_first_row() {
        let mut scheduler = PlaybackScheduler::new(PlaybackSettings {
            loop_reset: LoopReset::AfterFirstRow,
            ..PlaybackSettings::default()
        });
        scheduler.load_sequence(sequence(2));
        let mut engine = RecordingEngine::default();
        let mut surface = RecordingSurface::default();
        scheduler.start();

        scheduler.advance(21, &mut engine);
        scheduler.drain_render(&mut surface);
        assert_eq!(
            surface.calls,
            vec!["row@0", "reset", "row@10", "row@0", "reset"]
        );
    }

    #[test]
    fn tick_duration_follows_tempo() {
        let settings = PlaybackSettings {
            bpm: 60,
            ppq: 4,
            ..PlaybackSettings::default()
        };
        assert_eq!(settings.tick_duration(), Duration::from_millis(250));
        assert_eq!(settings.note_duration_ticks(), 1);
    }
}
