//! Console input for the voice overlay
//!
//! Reads stdin on a dedicated thread. Lines starting with `:` are overlay
//! controls; anything else is treated as recognized speech and handed to
//! the console recognition feed.

use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::recognition::{ErrorReason, SpeechFeed, TranscriptEvent};
use crate::session::UserIntent;

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Intent(UserIntent),
    /// Recognized speech; `~text` is an interim result
    Speech(TranscriptEvent),
    /// Simulate capture ending without a stop request
    DropCapture,
    /// Simulate a recognizer error
    Fault(ErrorReason),
    /// Make the next capture start fail
    Deny(ErrorReason),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown command :{0} (try :open, :close, :start, :stop, :toggle, :drop, :fault <reason>, :deny <reason>, :quit)")]
    UnknownCommand(String),

    #[error(":{0} needs a reason, e.g. :{0} network")]
    MissingReason(&'static str),
}

/// Parse a console line; blank lines yield `None`
pub fn parse_console_line(line: &str) -> Result<Option<ConsoleInput>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(command) = line.strip_prefix(':') else {
        let input = match line.strip_prefix('~') {
            Some(partial) => TranscriptEvent::interim(partial),
            None => TranscriptEvent::final_text(line),
        };
        return Ok(Some(ConsoleInput::Speech(input)));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let input = match name.as_str() {
        "open" => ConsoleInput::Intent(UserIntent::Open),
        "close" => ConsoleInput::Intent(UserIntent::Close),
        "start" => ConsoleInput::Intent(UserIntent::Start),
        "stop" => ConsoleInput::Intent(UserIntent::Stop),
        "toggle" => ConsoleInput::Intent(UserIntent::Toggle),
        "drop" => ConsoleInput::DropCapture,
        "fault" => {
            let reason = parts.next().ok_or(InputError::MissingReason("fault"))?;
            ConsoleInput::Fault(ErrorReason::from_code(reason))
        }
        "deny" => {
            let reason = parts.next().ok_or(InputError::MissingReason("deny"))?;
            ConsoleInput::Deny(ErrorReason::from_code(reason))
        }
        "quit" | "exit" => ConsoleInput::Quit,
        _ => return Err(InputError::UnknownCommand(name)),
    };
    Ok(Some(input))
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("failed to spawn console reader thread: {0}")]
    ThreadSpawn(String),
}

/// Reads console lines and forwards them as intents or speech
pub struct ConsoleReader {
    intent_tx: mpsc::Sender<UserIntent>,
    feed: Option<SpeechFeed>,
}

impl ConsoleReader {
    /// `feed` is `None` when no recognition backend is available
    pub fn new(intent_tx: mpsc::Sender<UserIntent>, feed: Option<SpeechFeed>) -> Self {
        Self { intent_tx, feed }
    }

    /// Spawn the reader thread
    ///
    /// The thread exits on `:quit` or end of input, dropping its intent
    /// sender so the session loop winds down.
    pub fn start(self) -> Result<(), ConsoleError> {
        thread::Builder::new()
            .name("console-reader".to_string())
            .spawn(move || {
                info!("console reader started");
                let stdin = std::io::stdin();
                self.read_lines(stdin.lock());
                info!("console reader stopped");
            })
            .map_err(|e| ConsoleError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    fn read_lines<R: BufRead>(&self, reader: R) {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "failed to read console input");
                    break;
                }
            };
            match parse_console_line(&line) {
                Ok(Some(ConsoleInput::Quit)) => break,
                Ok(Some(input)) => {
                    if !self.forward(input) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => println!("{}", e),
            }
        }
    }

    /// Returns false once the session has gone away
    fn forward(&self, input: ConsoleInput) -> bool {
        match input {
            ConsoleInput::Intent(intent) => {
                // Not in an async context, so block on the bounded channel
                if self.intent_tx.blocking_send(intent).is_err() {
                    warn!("failed to send intent - channel closed?");
                    return false;
                }
            }
            ConsoleInput::Speech(event) => match &self.feed {
                Some(feed) => {
                    if !feed.speak(event) {
                        println!("(microphone is off - :start to listen)");
                    }
                }
                None => println!("(speech recognition unavailable)"),
            },
            ConsoleInput::DropCapture => {
                if let Some(feed) = &self.feed {
                    if !feed.drop_capture() {
                        debug!("nothing to drop, capture is off");
                    }
                }
            }
            ConsoleInput::Fault(reason) => {
                if let Some(feed) = &self.feed {
                    feed.fault(reason);
                }
            }
            ConsoleInput::Deny(reason) => {
                if let Some(feed) = &self.feed {
                    feed.refuse_next_start(reason);
                }
            }
            ConsoleInput::Quit => return false,
        }
        true
    }
}
