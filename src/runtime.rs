use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{
    self, Event as CtEvent, KeyEvent, MouseButton, MouseEvent, MouseEventKind,
};

/// Unified event type consumed by the app runner. Pointer, touch and legacy
/// pointer families all arrive through the terminal's mouse protocol and
/// surface here as the three abstract gesture events.
#[derive(Clone, Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Primary button pressed at a terminal position (column, row).
    Press(u16, u16),
    /// Pointer dragged to a terminal position with the button held.
    Move(u16, u16),
    /// Primary button released.
    Release,
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize).
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<Event>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let translated = match event::read() {
                Ok(CtEvent::Key(key)) => Some(Event::Key(key)),
                Ok(CtEvent::Mouse(mouse)) => translate_mouse(mouse),
                Ok(CtEvent::Resize(_, _)) => Some(Event::Resize),
                Ok(_) => None,
                Err(_) => break,
            };

            if let Some(ev) = translated {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

fn translate_mouse(mouse: MouseEvent) -> Option<Event> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Event::Press(mouse.column, mouse.row)),
        MouseEventKind::Drag(MouseButton::Left) => Some(Event::Move(mouse.column, mouse.row)),
        MouseEventKind::Up(MouseButton::Left) => Some(Event::Release),
        _ => None,
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<Event>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<Event>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> Event {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Event::Tick,
        }
    }
}
