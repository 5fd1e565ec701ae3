use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Fire-and-forget user notifications. Implementations swallow their own
/// failures.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!(title, body, "notification");
    }
}

/// Published to observers after a state change has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum WirdEvent {
    DayRolledOver {
        from: NaiveDate,
        to: NaiveDate,
        day_index: u32,
    },
    DayCompleted {
        day_index: u32,
    },
}

impl WirdEvent {
    fn message(&self) -> (&'static str, String) {
        match self {
            WirdEvent::DayRolledOver { day_index, .. } => {
                ("New day", format!("Your wird moved on to day {day_index}."))
            }
            WirdEvent::DayCompleted { day_index } => {
                ("Well done", format!("You finished the full wird for day {day_index}."))
            }
        }
    }
}

const EVENT_BUFFER: usize = 16;

/// Fans committed events out to the user and to subscribers.
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<WirdEvent>,
    sink: Arc<dyn NotificationSink>,
}

impl EventHub {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER);
        Self { sender, sink }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WirdEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: WirdEvent) {
        let (title, body) = event.message();
        self.sink.notify(title, &body);
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }
}
