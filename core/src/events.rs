use serde::Serialize;
use tokio::sync::broadcast;

/// Change notifications for whoever renders the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ViewEvent {
    TextChanged { chars: usize },
    TextCleared,
    ImageChanged { id: u64, mime: String, bytes: usize },
    ImageReleased { id: u64 },
    ChooserOpened,
    MirrorWritten { mime: String, bytes: usize },
    MirrorFailed { mime: String, reason: String },
}

impl ViewEvent {
    /// Whether the visible content changed and should be drawn again.
    pub fn needs_render(&self) -> bool {
        matches!(
            self,
            Self::TextChanged { .. } | Self::TextCleared | Self::ImageChanged { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ViewEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn emit(&self, event: ViewEvent) {
        // Ignore send errors (no active receivers)
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_tagged() {
        let event = ViewEvent::ImageChanged {
            id: 7,
            mime: "image/png".into(),
            bytes: 42,
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "ImageChanged");
        assert_eq!(parsed["data"]["id"], 7);
        assert_eq!(parsed["data"]["mime"], "image/png");
    }

    #[test]
    fn test_unit_variant_serializes() {
        let json = serde_json::to_string(&ViewEvent::ChooserOpened).unwrap();
        assert_eq!(json, r#"{"type":"ChooserOpened"}"#);
    }

    #[test]
    fn test_needs_render() {
        assert!(ViewEvent::TextCleared.needs_render());
        assert!(ViewEvent::TextChanged { chars: 1 }.needs_render());
        assert!(!ViewEvent::ImageReleased { id: 1 }.needs_render());
        assert!(!ViewEvent::ChooserOpened.needs_render());
    }

    #[test]
    fn test_emit_without_subscribers() {
        EventBus::default().emit(ViewEvent::TextCleared);
    }

    #[tokio::test]
    async fn test_subscriber_receives() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.emit(ViewEvent::TextChanged { chars: 5 });
        assert_eq!(rx.recv().await.unwrap(), ViewEvent::TextChanged { chars: 5 });
    }
}
