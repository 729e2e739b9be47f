//! Event delivery to the surrounding page code

use signa_core::EngineEvent;
use tokio::sync::mpsc;
use tracing::trace;

/// Receiving end of the engine's event stream
pub type EventStream = mpsc::UnboundedReceiver<EngineEvent>;

/// Fire-and-forget event publisher
///
/// Publishing never blocks the engine. Events to a dropped receiver are
/// discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<EngineEvent>>,
}

impl EventSink {
    /// Connected sink and its stream
    pub fn channel() -> (Self, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Sink that drops everything
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: EngineEvent) {
        trace!(%event, "Engine event");
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

/// Drain every event currently buffered in a stream
pub fn drain(stream: &mut EventStream) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = stream.try_recv() {
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_drain() {
        let (sink, mut stream) = EventSink::channel();
        sink.emit(EngineEvent::Success);
        sink.emit(EngineEvent::ScoreUpdated(90));

        assert_eq!(
            drain(&mut stream),
            vec![EngineEvent::Success, EngineEvent::ScoreUpdated(90)]
        );
        assert!(drain(&mut stream).is_empty());
    }

    #[test]
    fn test_dropped_receiver_is_harmless() {
        let (sink, stream) = EventSink::channel();
        drop(stream);
        sink.emit(EngineEvent::Success);
        EventSink::disabled().emit(EngineEvent::ProgressCleared);
    }
}
