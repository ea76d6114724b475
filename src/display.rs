//! Progress and message display
//!
//! The sequencer and the readiness poller report through [`ProgressDisplay`]
//! so the console output can be swapped out in tests.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Trait for displaying progress and messages
pub trait ProgressDisplay: Send + Sync {
    /// Announce the start of a provisioning step
    fn banner(&self, message: &str);

    fn info(&self, message: &str);

    fn success(&self, message: &str);

    /// Start an indicator for a wait that ticks once per poll
    fn start_wait(&self, message: &str) -> Box<dyn WaitIndicator>;
}

/// Handle for an in-progress wait
pub trait WaitIndicator: Send {
    /// One poll did not satisfy the condition
    fn tick(&mut self, attempt: u32, observed: usize);

    fn finish(&mut self, message: &str);

    fn fail(&mut self, message: &str);
}

/// Console output with an indicatif spinner per wait
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressDisplay for ConsoleDisplay {
    fn banner(&self, message: &str) {
        println!("\n🚀 {message}");
    }

    fn info(&self, message: &str) {
        println!("   {message}");
    }

    fn success(&self, message: &str) {
        println!("✅ {message}");
    }

    fn start_wait(&self, message: &str) -> Box<dyn WaitIndicator> {
        Box::new(SpinnerIndicator::new(message))
    }
}

struct SpinnerIndicator {
    bar: ProgressBar,
    message: String,
}

impl SpinnerIndicator {
    fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            message: message.to_string(),
        }
    }
}

impl WaitIndicator for SpinnerIndicator {
    fn tick(&mut self, attempt: u32, observed: usize) {
        self.bar.set_message(format!(
            "{} (attempt {}, {} running)",
            self.message, attempt, observed
        ));
    }

    fn finish(&mut self, message: &str) {
        self.bar.finish_with_message(format!("✓ {message}"));
    }

    fn fail(&mut self, message: &str) {
        self.bar.abandon_with_message(format!("✗ {message}"));
    }
}

impl Drop for SpinnerIndicator {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

/// Display that records every message instead of printing it
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    fn push(&self, message: String) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }
}

impl ProgressDisplay for RecordingDisplay {
    fn banner(&self, message: &str) {
        self.push(format!("BANNER: {message}"));
    }

    fn info(&self, message: &str) {
        self.push(format!("INFO: {message}"));
    }

    fn success(&self, message: &str) {
        self.push(format!("SUCCESS: {message}"));
    }

    fn start_wait(&self, message: &str) -> Box<dyn WaitIndicator> {
        self.push(format!("WAIT: {message}"));
        Box::new(RecordingIndicator {
            display: self.clone(),
        })
    }
}

struct RecordingIndicator {
    display: RecordingDisplay,
}

impl WaitIndicator for RecordingIndicator {
    fn tick(&mut self, attempt: u32, observed: usize) {
        self.display
            .push(format!("TICK: attempt {attempt}, observed {observed}"));
    }

    fn finish(&mut self, message: &str) {
        self.display.push(format!("DONE: {message}"));
    }

    fn fail(&mut self, message: &str) {
        self.display.push(format!("FAIL: {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_display_captures_wait() {
        let display = RecordingDisplay::new();
        display.banner("Starting metadata-db");

        let mut wait = display.start_wait("Waiting for name=metadata-db");
        wait.tick(1, 0);
        wait.finish("metadata-db is up");

        assert_eq!(
            display.messages(),
            vec![
                "BANNER: Starting metadata-db",
                "WAIT: Waiting for name=metadata-db",
                "TICK: attempt 1, observed 0",
                "DONE: metadata-db is up",
            ]
        );
    }

    #[test]
    fn test_console_spinner_lifecycle() {
        // Hidden when not attached to a terminal, but must not panic.
        let display = ConsoleDisplay::new();
        let mut wait = display.start_wait("Waiting");
        wait.tick(3, 2);
        wait.fail("gave up");
    }
}
