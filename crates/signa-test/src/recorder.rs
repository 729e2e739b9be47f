//! Event recorder - keeps every engine event a scenario observed

use std::time::Duration;

use signa_core::EngineEvent;
use signa_runtime::{drain, EventSink, EventStream};

/// Records engine events in arrival order
pub struct EventRecorder {
    stream: EventStream,
    history: Vec<EngineEvent>,
}

impl EventRecorder {
    pub fn new(stream: EventStream) -> Self {
        EventRecorder {
            stream,
            history: Vec::new(),
        }
    }

    /// Sink for the engine and the recorder listening to it
    pub fn channel() -> (EventSink, Self) {
        let (sink, stream) = EventSink::channel();
        (sink, Self::new(stream))
    }

    /// Pull in everything already delivered
    pub fn collect(&mut self) -> &[EngineEvent] {
        self.history.extend(drain(&mut self.stream));
        &self.history
    }

    /// Wait for the next event matching `pred`.
    ///
    /// Every event received on the way is recorded. Returns `None` once the
    /// engine has dropped its sink.
    pub async fn wait_for<F>(&mut self, pred: F) -> Option<EngineEvent>
    where
        F: Fn(&EngineEvent) -> bool,
    {
        while let Some(event) = self.stream.recv().await {
            self.history.push(event.clone());
            if pred(&event) {
                return Some(event);
            }
        }
        None
    }

    /// Wait until the current round has wound down
    pub async fn wait_round_end(&mut self) -> Option<EngineEvent> {
        self.wait_for(|e| *e == EngineEvent::ProgressCleared).await
    }

    pub fn history(&self) -> &[EngineEvent] {
        &self.history
    }

    /// Hand over the recorded history and start afresh
    pub fn take(&mut self) -> Vec<EngineEvent> {
        self.collect();
        std::mem::take(&mut self.history)
    }

    pub fn contains(&self, event: &EngineEvent) -> bool {
        self.history.contains(event)
    }

    pub fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&EngineEvent) -> bool,
    {
        self.history.iter().filter(|e| pred(e)).count()
    }

    /// Remaining times of every recorded countdown
    pub fn countdowns(&self) -> Vec<Duration> {
        self.history
            .iter()
            .filter_map(|e| match e {
                EngineEvent::Countdown { remaining } => Some(*remaining),
                _ => None,
            })
            .collect()
    }

    /// Terminal events (success, feedback, cancellation)
    pub fn terminals(&self) -> Vec<&EngineEvent> {
        self.history.iter().filter(|e| e.is_terminal()).collect()
    }
}
