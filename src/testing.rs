//! Fakes shared by unit tests

use std::sync::{Arc, Mutex};

use crate::commands::{Collaborators, Navigator, Notification, Notifier, Viewport};
use tokio::sync::mpsc;

use crate::recognition::{RecognitionBackend, RecognitionError, RecognitionEvent, RecognitionSource};

type EventSink = mpsc::UnboundedSender<RecognitionEvent>;

/// Everything the fake collaborators observed
#[derive(Debug, Default)]
pub struct EffectLog {
    pub paths: Vec<String>,
    pub history: Vec<i32>,
    pub scrolls: Vec<i64>,
    pub notifications: Vec<Notification>,
}

impl EffectLog {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
            && self.history.is_empty()
            && self.scrolls.is_empty()
            && self.notifications.is_empty()
    }
}

pub type SharedLog = Arc<Mutex<EffectLog>>;

struct FakeNavigator(SharedLog);

impl Navigator for FakeNavigator {
    fn navigate_to(&mut self, path: &str) {
        self.0.lock().unwrap().paths.push(path.to_string());
    }

    fn go(&mut self, offset: i32) {
        self.0.lock().unwrap().history.push(offset);
    }
}

struct FakeViewport(SharedLog, i64);

impl Viewport for FakeViewport {
    fn height(&self) -> i64 {
        self.1
    }

    fn scroll_by(&mut self, delta: i64) {
        self.0.lock().unwrap().scrolls.push(delta);
    }
}

struct FakeNotifier(SharedLog);

impl Notifier for FakeNotifier {
    fn notify(&mut self, notification: Notification) {
        self.0.lock().unwrap().notifications.push(notification);
    }
}

/// Collaborators recording into a shared log
pub fn recording_collaborators(viewport_height: i64) -> (Collaborators, SharedLog) {
    let log = SharedLog::default();
    let collaborators = Collaborators {
        navigator: Box::new(FakeNavigator(Arc::clone(&log))),
        viewport: Box::new(FakeViewport(Arc::clone(&log), viewport_height)),
        notifier: Box::new(FakeNotifier(Arc::clone(&log))),
    };
    (collaborators, log)
}

/// Calls observed on fake sources, across every instance the backend made
#[derive(Debug, Default)]
pub struct SourceCalls {
    pub created: usize,
    pub starts: usize,
    pub stops: usize,
    pub capturing: bool,
    pub sink: Option<EventSink>,
    pub fail_next_start: Option<RecognitionError>,
}

pub type SharedCalls = Arc<Mutex<SourceCalls>>;

impl SourceCalls {
    /// Emit an event as the live source would
    pub fn emit(calls: &SharedCalls, event: RecognitionEvent) {
        let calls = calls.lock().unwrap();
        if let Some(sink) = calls.sink.as_ref() {
            let _ = sink.send(event);
        }
    }
}

pub struct FakeBackend {
    pub supported: bool,
    pub calls: SharedCalls,
}

impl FakeBackend {
    pub fn new() -> (Self, SharedCalls) {
        let calls = SharedCalls::default();
        (
            Self {
                supported: true,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    pub fn unsupported() -> (Self, SharedCalls) {
        let (mut backend, calls) = Self::new();
        backend.supported = false;
        (backend, calls)
    }
}

impl RecognitionBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self) -> Result<Box<dyn RecognitionSource>, RecognitionError> {
        if !self.supported {
            return Err(RecognitionError::Unavailable);
        }
        self.calls.lock().unwrap().created += 1;
        Ok(Box::new(FakeSource(Arc::clone(&self.calls))))
    }
}

/// Source that records calls; it does not emit `End` on stop so tests
/// control exactly which events arrive
struct FakeSource(SharedCalls);

impl RecognitionSource for FakeSource {
    fn start(&mut self) -> Result<(), RecognitionError> {
        let mut calls = self.0.lock().unwrap();
        calls.starts += 1;
        if let Some(err) = calls.fail_next_start.take() {
            return Err(err);
        }
        calls.capturing = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut calls = self.0.lock().unwrap();
        calls.stops += 1;
        calls.capturing = false;
    }

    fn subscribe(&mut self, sink: EventSink) {
        self.0.lock().unwrap().sink = Some(sink);
    }

    fn unsubscribe(&mut self) {
        self.0.lock().unwrap().sink = None;
    }
}
