//! The practice session state machine.
//!
//! A [`Session`] owns the source text, the typed text and the attempt
//! timing. Every change goes through [`Session::apply`], which either
//! performs a transition or rejects the event and leaves the session as it
//! was. Timer ticks arrive as ordinary events so the whole machine stays
//! deterministic under test.

use std::time::Instant;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Rejection;
use crate::finger::Alphabet;
use crate::scoring::{compute_stats, Stats};

/// Error budget shown as "∞".
pub const UNLIMITED_ERRORS: usize = 999;
pub const MAX_ERROR_PRESETS: [usize; 5] = [3, 5, 10, 15, UNLIMITED_ERRORS];
pub const DEFAULT_MAX_ERRORS: usize = 5;

/// Height of the source and typing panes, in lines.
pub const TEXT_HEIGHT_PRESETS: [u16; 7] = [4, 6, 8, 10, 12, 14, 16];
pub const DEFAULT_TEXT_HEIGHT: u16 = 8;
/// Taller panes are clamped to this many lines.
pub const MAX_TEXT_HEIGHT: u16 = 200;

pub const DEFAULT_SOURCE_TEXT: &str = "The quick brown fox jumps over the lazy dog. \
Practice makes perfect. Keep typing to improve your skills.";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Source and typing panes side by side.
    #[default]
    Horizontal,
    /// Source pane above the typing pane.
    Vertical,
}

impl Orientation {
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Settings that may only change while no attempt is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub max_errors: usize,
    pub alphabet: Alphabet,
    pub orientation: Orientation,
    pub text_height: u16,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ERRORS,
            alphabet: Alphabet::default(),
            orientation: Orientation::default(),
            text_height: DEFAULT_TEXT_HEIGHT,
        }
    }
}

impl SessionSettings {
    pub fn unlimited_errors(&self) -> bool {
        self.max_errors >= UNLIMITED_ERRORS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    MaxErrors(usize),
    Alphabet(Alphabet),
    Orientation(Orientation),
    TextHeight(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Status {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user asked to stop.
    Manual,
    /// The positional error count reached the budget.
    ErrorLimit,
    /// The typed text matches the source exactly.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start { now: Instant },
    Stop,
    Tick { now: Instant },
    /// Full current value of the input surface.
    TypeInput(String),
    SetSource(String),
    Configure(SettingsChange),
    /// Discard a finished attempt and return to Idle.
    Reset,
}

/// What an accepted event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Now running; the input surface should take focus.
    Started,
    Stopped(StopReason),
    Ticked { elapsed_secs: u64 },
    Typed { last_key: Option<char> },
    SourceChanged,
    Configured,
    Reset,
    Unchanged,
}

/// Count typed positions that do not match the source. Positions past the
/// end of the source always count.
pub fn positional_errors(source: &str, typed: &str) -> usize {
    let mut expected = source.chars();
    typed.chars().filter(|c| expected.next() != Some(*c)).count()
}

#[derive(Debug, Clone)]
pub struct Session {
    source_text: String,
    typed_text: String,
    status: Status,
    start_time: Option<Instant>,
    elapsed_secs: u64,
    errors: usize,
    last_key: Option<char>,
    stop_reason: Option<StopReason>,
    settings: SessionSettings,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_TEXT.to_string(), SessionSettings::default())
    }
}

impl Session {
    pub fn new(source_text: String, settings: SessionSettings) -> Self {
        Self {
            source_text,
            typed_text: String::new(),
            status: Status::Idle,
            start_time: None,
            elapsed_secs: 0,
            errors: 0,
            last_key: None,
            stop_reason: None,
            settings,
        }
    }

    pub fn apply(&mut self, event: SessionEvent) -> Result<Transition, Rejection> {
        let transition = match event {
            SessionEvent::Start { now } => self.start(now)?,
            SessionEvent::Stop => self.stop(StopReason::Manual),
            SessionEvent::Tick { now } => self.tick(now),
            SessionEvent::TypeInput(text) => self.type_input(text)?,
            SessionEvent::SetSource(text) => self.set_source(text)?,
            SessionEvent::Configure(change) => self.configure(change)?,
            SessionEvent::Reset => self.reset()?,
        };

        if transition != Transition::Unchanged {
            debug!(status = %self.status, ?transition, "session transition");
        }
        Ok(transition)
    }

    fn start(&mut self, now: Instant) -> Result<Transition, Rejection> {
        if self.status == Status::Running {
            return Err(Rejection::AlreadyRunning);
        }
        if self.source_text.trim().is_empty() {
            return Err(Rejection::EmptySource);
        }

        self.clear_attempt();
        self.start_time = Some(now);
        self.status = Status::Running;
        Ok(Transition::Started)
    }

    fn stop(&mut self, reason: StopReason) -> Transition {
        if self.status != Status::Running {
            return Transition::Unchanged;
        }
        self.status = Status::Stopped;
        self.stop_reason = Some(reason);
        Transition::Stopped(reason)
    }

    fn tick(&mut self, now: Instant) -> Transition {
        let Some(start) = self.start_time.filter(|_| self.status == Status::Running) else {
            return Transition::Unchanged;
        };
        self.elapsed_secs = now.saturating_duration_since(start).as_secs();
        Transition::Ticked {
            elapsed_secs: self.elapsed_secs,
        }
    }

    fn type_input(&mut self, text: String) -> Result<Transition, Rejection> {
        if self.status != Status::Running {
            return Err(Rejection::NotRunning);
        }

        self.last_key = text.chars().last();
        self.typed_text = text;
        self.errors = positional_errors(&self.source_text, &self.typed_text);

        if self.errors >= self.settings.max_errors {
            return Ok(self.stop(StopReason::ErrorLimit));
        }
        if self.typed_text.chars().count() >= self.source_text.chars().count()
            && self.typed_text == self.source_text
        {
            return Ok(self.stop(StopReason::Completed));
        }

        Ok(Transition::Typed {
            last_key: self.last_key,
        })
    }

    fn set_source(&mut self, text: String) -> Result<Transition, Rejection> {
        self.ensure_not_running()?;
        if self.status == Status::Stopped {
            self.clear_attempt();
            self.status = Status::Idle;
        }
        self.source_text = text;
        Ok(Transition::SourceChanged)
    }

    fn configure(&mut self, change: SettingsChange) -> Result<Transition, Rejection> {
        self.ensure_not_running()?;
        match change {
            SettingsChange::MaxErrors(0) => return Err(Rejection::InvalidMaxErrors(0)),
            SettingsChange::MaxErrors(max) => self.settings.max_errors = max,
            SettingsChange::Alphabet(alphabet) => self.settings.alphabet = alphabet,
            SettingsChange::Orientation(orientation) => self.settings.orientation = orientation,
            SettingsChange::TextHeight(0) => return Err(Rejection::InvalidTextHeight),
            SettingsChange::TextHeight(lines) => {
                self.settings.text_height = lines.min(MAX_TEXT_HEIGHT)
            }
        }
        Ok(Transition::Configured)
    }

    fn reset(&mut self) -> Result<Transition, Rejection> {
        self.ensure_not_running()?;
        if self.status == Status::Idle {
            return Ok(Transition::Unchanged);
        }
        self.clear_attempt();
        self.status = Status::Idle;
        Ok(Transition::Reset)
    }

    fn ensure_not_running(&self) -> Result<(), Rejection> {
        if self.status == Status::Running {
            Err(Rejection::SessionRunning)
        } else {
            Ok(())
        }
    }

    fn clear_attempt(&mut self) {
        self.typed_text.clear();
        self.errors = 0;
        self.elapsed_secs = 0;
        self.start_time = None;
        self.last_key = None;
        self.stop_reason = None;
    }

    pub fn stats(&self) -> Stats {
        compute_stats(&self.source_text, &self.typed_text, self.elapsed_secs)
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn error_limit_reached(&self) -> bool {
        self.errors >= self.settings.max_errors
    }

    pub fn last_key(&self) -> Option<char> {
        self.last_key
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }
}
