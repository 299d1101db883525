//! The application aggregate: one session, the saved-text store and the
//! short-lived view state around them (focus, search, notices, key pulse).
//!
//! Everything is mutated from a single event loop; each key, tick or
//! request is handled to completion before the next one.

use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::error::Rejection;
use crate::kv::KeyValueStore;
use crate::pulse::KeyPulse;
use crate::runtime::{AppEvent, IntervalTimer};
use crate::saved_texts::{SavedTextEntry, SavedTextStore};
use crate::scoring::Stats;
use crate::session::{
    Session, SessionEvent, SettingsChange, Status, StopReason, Transition, MAX_ERROR_PRESETS,
    TEXT_HEIGHT_PRESETS,
};

pub const SESSION_TICK: Duration = Duration::from_secs(1);
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

pub type DynStore = SavedTextStore<Box<dyn KeyValueStore>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message shown to the user, like a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Main,
    /// The typing pane. Input here is only accepted while Running.
    Typing,
    SourceEditor,
    Search,
}

/// Everything the renderer needs from the core for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<'a> {
    pub stats: Stats,
    pub status: Status,
    pub errors: usize,
    pub max_errors: usize,
    pub elapsed_secs: u64,
    pub pressed_key: Option<char>,
    pub saved_texts: Vec<&'a SavedTextEntry>,
}

#[derive(Debug)]
pub struct App {
    session: Session,
    store: DynStore,
    pulse: KeyPulse,
    timer: IntervalTimer,
    notice: Option<Notice>,
    focus: Focus,
    search_query: String,
    selected: usize,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session, store: DynStore) -> Self {
        Self {
            session,
            store,
            pulse: KeyPulse::default(),
            timer: IntervalTimer::new(SESSION_TICK),
            notice: None,
            focus: Focus::Main,
            search_query: String::new(),
            selected: 0,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &DynStore {
        &self.store
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            stats: self.session.stats(),
            status: self.session.status(),
            errors: self.session.errors(),
            max_errors: self.session.settings().max_errors,
            elapsed_secs: self.session.elapsed_secs(),
            pressed_key: self.pulse.key(),
            saved_texts: self.filtered_texts(),
        }
    }

    pub fn filtered_texts(&self) -> Vec<&SavedTextEntry> {
        self.store.list(&self.search_query)
    }

    pub fn selected_entry(&self) -> Option<&SavedTextEntry> {
        self.filtered_texts().get(self.selected).copied()
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) {
        let message = message.into();
        debug!(?kind, %message, "notice");
        self.notice = Some(Notice {
            kind,
            message,
            expires_at: now + NOTICE_DURATION,
        });
    }

    fn reject(&mut self, rejection: Rejection, now: Instant) {
        self.notify(NoticeKind::Error, rejection.to_string(), now);
    }

    fn apply(&mut self, event: SessionEvent, now: Instant) -> Option<Transition> {
        match self.session.apply(event) {
            Ok(transition) => {
                self.after_transition(transition, now);
                Some(transition)
            }
            // Input outside a run is dropped without a notice, like a disabled field.
            Err(Rejection::NotRunning) => None,
            Err(rejection) => {
                self.reject(rejection, now);
                None
            }
        }
    }

    fn after_transition(&mut self, transition: Transition, now: Instant) {
        match transition {
            Transition::Started => {
                self.timer.start(now);
                self.pulse.cancel();
                self.focus = Focus::Typing;
                info!(source_chars = self.session.source_text().chars().count(), "session started");
            }
            Transition::Typed { last_key } => match last_key {
                Some(key) => self.pulse.press(key, now),
                None => self.pulse.cancel(),
            },
            Transition::Stopped(reason) => {
                self.timer.cancel();
                if let Some(key) = self.session.last_key().filter(|_| reason != StopReason::Manual)
                {
                    self.pulse.press(key, now);
                }
                let stats = self.session.stats();
                info!(?reason, wpm = stats.wpm, accuracy = stats.accuracy, "session stopped");
                match reason {
                    StopReason::Completed => self.notify(
                        NoticeKind::Success,
                        format!(
                            "Completed: {} WPM at {}% accuracy",
                            stats.wpm, stats.accuracy
                        ),
                        now,
                    ),
                    StopReason::ErrorLimit => {
                        self.notify(NoticeKind::Error, "Error limit reached", now)
                    }
                    StopReason::Manual => {}
                }
            }
            Transition::Ticked { .. }
            | Transition::SourceChanged
            | Transition::Configured
            | Transition::Reset
            | Transition::Unchanged => {}
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.apply(SessionEvent::Start { now }, now);
    }

    pub fn stop(&mut self, now: Instant) {
        self.apply(SessionEvent::Stop, now);
    }

    pub fn reset(&mut self, now: Instant) {
        self.apply(SessionEvent::Reset, now);
    }

    /// Feed the full current value of the typing surface.
    pub fn type_text(&mut self, text: String, now: Instant) {
        self.apply(SessionEvent::TypeInput(text), now);
    }

    pub fn set_source(&mut self, text: String, now: Instant) {
        self.apply(SessionEvent::SetSource(text), now);
    }

    pub fn configure(&mut self, change: SettingsChange, now: Instant) {
        self.apply(SessionEvent::Configure(change), now);
    }

    /// Advance timers. Fires the session tick at most once per second.
    pub fn on_tick(&mut self, now: Instant) {
        self.pulse.tick(now);
        if self.timer.poll(now) {
            self.apply(SessionEvent::Tick { now }, now);
        }
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }
    }

    /// Cancel every pending timer; used when the view closes.
    pub fn shutdown(&mut self) {
        self.timer.cancel();
        self.pulse.cancel();
        self.notice = None;
        self.should_quit = true;
    }

    pub fn save_source(&mut self, now_ms: i64, now: Instant) {
        if self.session.is_running() {
            self.reject(Rejection::SessionRunning, now);
            return;
        }
        let text = self.session.source_text().to_string();
        match self.store.save(&text, now_ms) {
            Ok(_) => {
                self.selected = 0;
                self.notify(NoticeKind::Success, "Text saved successfully", now);
            }
            Err(rejection) => self.reject(rejection, now),
        }
    }

    pub fn load_saved(&mut self, id: &str, now: Instant) {
        match self.store.load_into(id, &mut self.session) {
            Ok(()) => self.notify(NoticeKind::Success, "Text loaded", now),
            Err(rejection) => self.reject(rejection, now),
        }
    }

    pub fn delete_saved(&mut self, id: &str, now: Instant) {
        self.store.delete(id);
        self.clamp_selection();
        self.notify(NoticeKind::Success, "Text deleted", now);
    }

    pub fn cycle_max_errors(&mut self, now: Instant) {
        let current = self.session.settings().max_errors;
        let next = next_preset(&MAX_ERROR_PRESETS, current);
        self.configure(SettingsChange::MaxErrors(next), now);
    }

    pub fn cycle_text_height(&mut self, now: Instant) {
        let current = self.session.settings().text_height;
        let next = next_preset(&TEXT_HEIGHT_PRESETS, current);
        self.configure(SettingsChange::TextHeight(next), now);
    }

    pub fn toggle_alphabet(&mut self, now: Instant) {
        let next = self.session.settings().alphabet.toggled();
        self.configure(SettingsChange::Alphabet(next), now);
    }

    pub fn toggle_orientation(&mut self, now: Instant) {
        let next = self.session.settings().orientation.toggled();
        self.configure(SettingsChange::Orientation(next), now);
    }

    pub fn set_search_query(&mut self, query: String) {
        self.search_query = query;
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        let len = self.filtered_texts().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_texts().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Dispatch one runtime event. Timers are polled after every event so a
    /// steady stream of keys cannot starve the session tick.
    pub fn on_event(&mut self, event: AppEvent, now: Instant) {
        match event {
            AppEvent::Key(key) => {
                self.handle_key(key, now);
                self.on_tick(now);
            }
            AppEvent::Tick => self.on_tick(now),
            AppEvent::Resize => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.shutdown();
            return;
        }
        match self.focus {
            Focus::Main => self.handle_main_key(key, now),
            Focus::Typing => self.handle_typing_key(key, now),
            Focus::SourceEditor => self.handle_editor_key(key, now),
            Focus::Search => self.handle_search_key(key),
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Enter => self.start(now),
            KeyCode::Esc | KeyCode::Char('q') => self.shutdown(),
            KeyCode::Char('e') => self.focus = Focus::SourceEditor,
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('s') => self.save_source(Utc::now().timestamp_millis(), now),
            KeyCode::Char('r') => self.reset(now),
            KeyCode::Char('m') => self.cycle_max_errors(now),
            KeyCode::Char('h') => self.cycle_text_height(now),
            KeyCode::Char('c') => self.toggle_alphabet(now),
            KeyCode::Char('v') => self.toggle_orientation(now),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char('o') => {
                if let Some(id) = self.selected_entry().map(|e| e.id.clone()) {
                    self.load_saved(&id, now);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_entry().map(|e| e.id.clone()) {
                    self.delete_saved(&id, now);
                }
            }
            _ => {}
        }
    }

    fn handle_typing_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Esc {
            if self.session.is_running() {
                self.stop(now);
            } else {
                self.focus = Focus::Main;
            }
            return;
        }
        if let Some(text) = edit_text(self.session.typed_text(), key) {
            self.type_text(text, now);
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Esc {
            self.focus = Focus::Main;
            return;
        }
        if let Some(text) = edit_text(self.session.source_text(), key) {
            self.set_source(text, now);
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.set_search_query(String::new());
                self.focus = Focus::Main;
            }
            KeyCode::Enter => self.focus = Focus::Main,
            _ => {
                if let Some(query) = edit_text(&self.search_query, key) {
                    self.set_search_query(query.replace('\n', ""));
                }
            }
        }
    }
}

/// Apply a single editing key to `current`, returning the new full value.
fn edit_text(current: &str, key: KeyEvent) -> Option<String> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    let mut text = current.to_string();
    match key.code {
        KeyCode::Char(c) => text.push(c),
        KeyCode::Enter => text.push('\n'),
        KeyCode::Backspace => {
            text.pop()?;
        }
        _ => return None,
    }
    Some(text)
}

/// The preset after `current`, wrapping around. Unknown values restart the cycle.
fn next_preset<T: Copy + PartialEq>(presets: &[T], current: T) -> T {
    presets
        .iter()
        .position(|p| *p == current)
        .map(|i| presets[(i + 1) % presets.len()])
        .unwrap_or(presets[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finger::Alphabet;
    use crate::kv::MemoryKeyValueStore;
    use crate::pulse::PULSE_DURATION;
    use crate::session::{Orientation, SessionSettings, UNLIMITED_ERRORS};

    fn app_with(source: &str, max_errors: usize) -> App {
        let session = Session::new(
            source.to_string(),
            SessionSettings {
                max_errors,
                ..SessionSettings::default()
            },
        );
        let backend: Box<dyn KeyValueStore> = Box::new(MemoryKeyValueStore::default());
        App::new(session, SavedTextStore::open(backend))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str, now: Instant) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)), now);
        }
    }

    #[test]
    fn test_enter_starts_and_focuses_typing() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();

        app.handle_key(key(KeyCode::Enter), now);

        assert_eq!(app.session().status(), Status::Running);
        assert_eq!(app.focus(), Focus::Typing);
        assert!(app.timer_armed());
    }

    #[test]
    fn test_typing_updates_session_and_pulse() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();
        app.start(now);

        type_str(&mut app, "he", now);

        let snap = app.snapshot();
        assert_eq!(app.session().typed_text(), "he");
        assert_eq!(snap.pressed_key, Some('e'));
        assert_eq!(snap.stats.correct_chars, 2);
    }

    #[test]
    fn test_pulse_clears_after_duration() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();
        app.start(now);
        type_str(&mut app, "h", now);

        app.on_tick(now + PULSE_DURATION);
        assert_eq!(app.snapshot().pressed_key, None);
    }

    #[test]
    fn test_backspace_to_empty_clears_pulse() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();
        app.start(now);
        type_str(&mut app, "h", now);
        assert_eq!(app.snapshot().pressed_key, Some('h'));

        app.handle_key(key(KeyCode::Backspace), now);

        assert_eq!(app.session().typed_text(), "");
        assert_eq!(app.snapshot().pressed_key, None);
    }

    #[test]
    fn test_backspace_removes_last_char() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();
        app.start(now);
        type_str(&mut app, "hx", now);

        app.handle_key(key(KeyCode::Backspace), now);

        assert_eq!(app.session().typed_text(), "h");
        assert_eq!(app.session().errors(), 0);
    }

    #[test]
    fn test_ticks_advance_elapsed_once_per_second() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();
        app.start(now);

        app.on_tick(now + Duration::from_millis(500));
        assert_eq!(app.session().elapsed_secs(), 0);
        app.on_tick(now + Duration::from_millis(1_050));
        assert_eq!(app.session().elapsed_secs(), 1);
        app.on_tick(now + Duration::from_millis(2_100));
        assert_eq!(app.session().elapsed_secs(), 2);
    }

    #[test]
    fn test_completion_stops_and_cancels_timer() {
        let mut app = app_with("cat", 5);
        let now = Instant::now();
        app.start(now);

        type_str(&mut app, "cat", now);

        assert_eq!(app.session().status(), Status::Stopped);
        assert!(!app.timer_armed());
        assert_eq!(app.notice().map(|n| n.kind), Some(NoticeKind::Success));

        app.on_tick(now + Duration::from_secs(5));
        assert_eq!(app.session().elapsed_secs(), 0);
    }

    #[test]
    fn test_keys_after_auto_stop_are_dropped() {
        let mut app = app_with("ab", 1);
        let now = Instant::now();
        app.start(now);
        type_str(&mut app, "x", now);
        assert_eq!(app.session().status(), Status::Stopped);

        type_str(&mut app, "sq", now);

        assert_eq!(app.session().typed_text(), "x");
        assert!(!app.should_quit());
        assert_eq!(app.store().len(), 0);
        assert_eq!(app.focus(), Focus::Typing);

        app.handle_key(key(KeyCode::Esc), now);
        assert_eq!(app.focus(), Focus::Main);
    }

    #[test]
    fn test_esc_stops_running_session() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();
        app.start(now);

        app.handle_key(key(KeyCode::Esc), now);

        assert_eq!(app.session().status(), Status::Stopped);
        assert_eq!(app.session().stop_reason(), Some(StopReason::Manual));
    }

    #[test]
    fn test_save_and_load_flow() {
        let mut app = app_with("practice text", 5);
        let now = Instant::now();

        app.save_source(1_000, now);
        assert_eq!(app.store().len(), 1);
        assert_eq!(
            app.notice().map(|n| n.message.as_str()),
            Some("Text saved successfully")
        );

        app.set_source("something else".into(), now);
        app.load_saved("1000", now);
        assert_eq!(app.session().source_text(), "practice text");
        assert_eq!(app.notice().map(|n| n.message.as_str()), Some("Text loaded"));
    }

    #[test]
    fn test_save_empty_source_notifies_error() {
        let mut app = app_with("", 5);
        let now = Instant::now();

        app.save_source(1, now);

        assert!(app.store().is_empty());
        let notice = app.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Cannot save empty text");
    }

    #[test]
    fn test_load_while_running_is_rejected() {
        let mut app = app_with("original", 5);
        let now = Instant::now();
        app.save_source(7, now);
        app.set_source("current".into(), now);
        app.start(now);

        app.load_saved("7", now);

        assert_eq!(app.session().source_text(), "current");
        assert_eq!(
            app.notice().map(|n| n.message.as_str()),
            Some("Stop the current session before loading a saved text")
        );
    }

    #[test]
    fn test_notice_expires() {
        let mut app = app_with("", 5);
        let now = Instant::now();
        app.save_source(1, now);
        assert!(app.notice().is_some());

        app.on_tick(now + NOTICE_DURATION);
        assert!(app.notice().is_none());
    }

    #[test]
    fn test_settings_cycle_when_idle() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();

        app.handle_key(key(KeyCode::Char('m')), now);
        assert_eq!(app.session().settings().max_errors, 10);
        app.handle_key(key(KeyCode::Char('m')), now);
        app.handle_key(key(KeyCode::Char('m')), now);
        assert_eq!(app.session().settings().max_errors, UNLIMITED_ERRORS);
        app.handle_key(key(KeyCode::Char('m')), now);
        assert_eq!(app.session().settings().max_errors, 3);

        app.handle_key(key(KeyCode::Char('c')), now);
        app.handle_key(key(KeyCode::Char('v')), now);
        app.handle_key(key(KeyCode::Char('h')), now);
        assert_eq!(app.session().settings().alphabet, Alphabet::Cyrillic);
        assert_eq!(app.session().settings().orientation, Orientation::Vertical);
        assert_eq!(app.session().settings().text_height, 10);
    }

    #[test]
    fn test_settings_rejected_while_running() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();
        app.start(now);

        app.cycle_max_errors(now);
        app.toggle_alphabet(now);

        assert_eq!(app.session().settings().max_errors, 5);
        assert_eq!(app.session().settings().alphabet, Alphabet::Latin);
        assert_eq!(app.notice().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[test]
    fn test_source_editor_edits_text() {
        let mut app = app_with("ab", 5);
        let now = Instant::now();

        app.handle_key(key(KeyCode::Char('e')), now);
        assert_eq!(app.focus(), Focus::SourceEditor);
        app.handle_key(key(KeyCode::Backspace), now);
        type_str(&mut app, "cd", now);
        app.handle_key(key(KeyCode::Enter), now);
        app.handle_key(key(KeyCode::Esc), now);

        assert_eq!(app.session().source_text(), "acd\n");
        assert_eq!(app.focus(), Focus::Main);
    }

    #[test]
    fn test_search_and_selection() {
        let mut app = app_with("alpha", 5);
        let now = Instant::now();
        app.save_source(1, now);
        app.set_source("beta".into(), now);
        app.save_source(2, now);
        app.set_source("alphabet".into(), now);
        app.save_source(3, now);

        app.handle_key(key(KeyCode::Char('/')), now);
        type_str(&mut app, "ALPHA", now);
        app.handle_key(key(KeyCode::Enter), now);

        let ids: Vec<&str> = app.filtered_texts().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);

        app.handle_key(key(KeyCode::Down), now);
        app.handle_key(key(KeyCode::Down), now);
        assert_eq!(app.selected(), 1);
        assert_eq!(app.selected_entry().map(|e| e.id.as_str()), Some("1"));

        app.handle_key(key(KeyCode::Char('d')), now);
        assert_eq!(app.store().len(), 2);
        assert_eq!(app.selected(), 0);
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut app = app_with("hello", 5);
        let now = Instant::now();
        app.start(now);

        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), now);

        assert!(app.should_quit());
        assert!(!app.timer_armed());
    }

    #[test]
    fn test_next_preset_wraps_and_recovers() {
        assert_eq!(next_preset(&[1, 2, 3], 3), 1);
        assert_eq!(next_preset(&[1, 2, 3], 1), 2);
        assert_eq!(next_preset(&[1, 2, 3], 7), 1);
    }
}
