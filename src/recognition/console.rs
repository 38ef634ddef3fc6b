//! Console-backed recognition source
//!
//! Lines typed on stdin stand in for recognized speech. The console reader
//! thread pushes text through a [`SpeechFeed`]; the feed only delivers it
//! while the current source is capturing, the way a microphone only hears
//! while it is open.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::source::{
    ErrorReason, EventSink, RecognitionBackend, RecognitionError, RecognitionEvent,
    RecognitionSource, TranscriptEvent,
};

/// State shared between the live source and the console feed
#[derive(Default)]
struct FeedState {
    capturing: AtomicBool,
    sink: Mutex<Option<EventSink>>,
    /// Error the next start attempt fails with
    refusal: Mutex<Option<ErrorReason>>,
}

impl FeedState {
    fn send(&self, event: RecognitionEvent) -> bool {
        let sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        match sink.as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    fn set_sink(&self, value: Option<EventSink>) {
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        *sink = value;
    }

    fn set_refusal(&self, value: Option<ErrorReason>) -> Option<ErrorReason> {
        let mut refusal = match self.refusal.lock() {
            Ok(refusal) => refusal,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *refusal, value)
    }
}

/// Backend that hands out console sources
pub struct ConsoleBackend {
    state: Arc<FeedState>,
}

impl ConsoleBackend {
    /// Create a backend and the feed used to push console text into it
    pub fn new() -> (Self, SpeechFeed) {
        let state = Arc::new(FeedState::default());
        let feed = SpeechFeed {
            state: Arc::clone(&state),
        };
        (Self { state }, feed)
    }
}

impl RecognitionBackend for ConsoleBackend {
    fn name(&self) -> &'static str {
        "console"
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn create(&self) -> Result<Box<dyn RecognitionSource>, RecognitionError> {
        self.state.capturing.store(false, Ordering::SeqCst);
        Ok(Box::new(ConsoleSource {
            state: Arc::clone(&self.state),
        }))
    }
}

/// A recognition source reading from the console feed
pub struct ConsoleSource {
    state: Arc<FeedState>,
}

impl RecognitionSource for ConsoleSource {
    fn start(&mut self) -> Result<(), RecognitionError> {
        if self.state.capturing.load(Ordering::SeqCst) {
            return Err(RecognitionError::AlreadyStarted);
        }
        if let Some(reason) = self.state.set_refusal(None) {
            warn!(%reason, "console capture refused");
            return Err(RecognitionError::Fault(reason));
        }
        self.state.capturing.store(true, Ordering::SeqCst);
        debug!("console capture started");
        Ok(())
    }

    fn stop(&mut self) {
        if self.state.capturing.swap(false, Ordering::SeqCst) {
            debug!("console capture stopped");
            self.state.send(RecognitionEvent::End);
        }
    }

    fn subscribe(&mut self, sink: EventSink) {
        self.state.set_sink(Some(sink));
    }

    fn unsubscribe(&mut self) {
        self.state.set_sink(None);
    }
}

impl Drop for ConsoleSource {
    fn drop(&mut self) {
        self.state.capturing.store(false, Ordering::SeqCst);
        self.state.set_sink(None);
    }
}

/// Handle used by the console reader to inject recognizer activity
#[derive(Clone)]
pub struct SpeechFeed {
    state: Arc<FeedState>,
}

impl SpeechFeed {
    /// Whether the live source is currently capturing
    pub fn is_capturing(&self) -> bool {
        self.state.capturing.load(Ordering::SeqCst)
    }

    /// Deliver recognized text; returns false when nobody is listening
    pub fn speak(&self, event: TranscriptEvent) -> bool {
        if !self.is_capturing() {
            debug!(text = %event.text, "speech ignored, capture is off");
            return false;
        }
        self.state.send(RecognitionEvent::Result(event))
    }

    /// End capture without a stop request
    pub fn drop_capture(&self) -> bool {
        if !self.state.capturing.swap(false, Ordering::SeqCst) {
            return false;
        }
        warn!("console capture dropped");
        self.state.send(RecognitionEvent::End)
    }

    /// Report a recognizer error
    pub fn fault(&self, reason: ErrorReason) -> bool {
        self.state.send(RecognitionEvent::Error(reason))
    }

    /// Make the next start attempt fail, as when the microphone is refused
    pub fn refuse_next_start(&self, reason: ErrorReason) {
        self.state.set_refusal(Some(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn live_source() -> (
        Box<dyn RecognitionSource>,
        SpeechFeed,
        mpsc::UnboundedReceiver<RecognitionEvent>,
    ) {
        let (backend, feed) = ConsoleBackend::new();
        let mut source = backend.create().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        source.subscribe(tx);
        (source, feed, rx)
    }

    #[test]
    fn test_speech_only_delivered_while_capturing() {
        let (mut source, feed, mut rx) = live_source();

        assert!(!feed.speak(TranscriptEvent::final_text("go back")));
        assert!(rx.try_recv().is_err());

        source.start().unwrap();
        assert!(feed.speak(TranscriptEvent::final_text("go back")));
        assert_eq!(
            rx.try_recv().unwrap(),
            RecognitionEvent::Result(TranscriptEvent::final_text("go back"))
        );
    }

    #[test]
    fn test_stop_emits_end_once() {
        let (mut source, _feed, mut rx) = live_source();
        source.start().unwrap();

        source.stop();
        source.stop();

        assert_eq!(rx.try_recv().unwrap(), RecognitionEvent::End);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_double_start_rejected() {
        let (mut source, _feed, _rx) = live_source();
        source.start().unwrap();
        assert_eq!(source.start(), Err(RecognitionError::AlreadyStarted));
    }

    #[test]
    fn test_drop_capture_ends_without_stop() {
        let (mut source, feed, mut rx) = live_source();
        source.start().unwrap();

        assert!(feed.drop_capture());
        assert!(!feed.is_capturing());
        assert_eq!(rx.try_recv().unwrap(), RecognitionEvent::End);

        // Capturing was already off, nothing to drop
        assert!(!feed.drop_capture());
    }

    #[test]
    fn test_refused_start_fails_once() {
        let (mut source, feed, mut rx) = live_source();
        feed.refuse_next_start(ErrorReason::NotAllowed);

        assert_eq!(
            source.start(),
            Err(RecognitionError::Fault(ErrorReason::NotAllowed))
        );
        assert!(!feed.is_capturing());
        assert!(rx.try_recv().is_err());

        source.start().unwrap();
        assert!(feed.is_capturing());
    }

    #[test]
    fn test_unsubscribe_releases_sink() {
        let (mut source, feed, mut rx) = live_source();
        source.start().unwrap();
        source.unsubscribe();

        assert!(!feed.speak(TranscriptEvent::final_text("scroll up")));
        assert!(!feed.fault(ErrorReason::Network));
        assert!(rx.try_recv().is_err());
    }
}
