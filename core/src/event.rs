use crate::telemetry::LogSink;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Why a flow asked its host to repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderReason {
    Start,
    UpdateState,
    Next,
    Back,
    End,
}

impl RenderReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderReason::Start => "start",
            RenderReason::UpdateState => "update-state",
            RenderReason::Next => "next",
            RenderReason::Back => "back",
            RenderReason::End => "end",
        }
    }
}

impl fmt::Display for RenderReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Arc<dyn Fn(RenderReason) -> anyhow::Result<()> + Send + Sync>;

/// Render-reason subscribers, notified in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(RenderReason) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Copy of the current subscriber list, so callers can notify without
    /// holding whatever lock guards the registry.
    pub fn snapshot(&self) -> Vec<Listener> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }
}

/// Deliver `reason` to each listener. A failing listener is logged at warning
/// level and does not stop the ones after it.
pub fn notify_all(listeners: &[Listener], reason: RenderReason, log: &LogSink) {
    for listener in listeners {
        if let Err(err) = listener(reason) {
            let err: &(dyn std::error::Error + 'static) = err.as_ref();
            log.warn(&format!("Render listener failed on `{reason}`"), Some(err));
        }
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}
