use futures_core::future::BoxFuture;
use std::fmt;
use std::future::Future;

pub type Tag = String;

/// A deferred state mutation, applied by the controller while it holds the state.
pub type StateUpdate<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// What a stack item's action decided.
///
/// `Outcome` is "Control Flow as Data": the controller matches on it instead of
/// inspecting loosely typed return values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Fall through to the item's `goto` / `render` handling.
    Stay,

    /// Skip this item without rendering and move on to the next index.
    Continue,

    /// Resume the stack walk at the item carrying this tag.
    Goto(Tag),

    /// Terminate the flow.
    End,
}

impl Outcome {
    pub fn goto(tag: impl Into<Tag>) -> Self {
        Outcome::Goto(tag.into())
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Stay => "Stay",
            Outcome::Continue => "Continue",
            Outcome::Goto(_) => "Goto",
            Outcome::End => "End",
        }
    }
}

impl From<bool> for Outcome {
    /// `true` keeps the item, `false` skips it.
    fn from(keep: bool) -> Self {
        if keep { Outcome::Stay } else { Outcome::Continue }
    }
}

/// The value an asynchronous action settles with.
///
/// A pending action cannot borrow the flow state, so any mutation it wants to
/// make once its work is done travels back here and is applied before the
/// outcome is interpreted.
pub struct Settled<S> {
    pub outcome: Outcome,
    pub update: Option<StateUpdate<S>>,
}

impl<S> Settled<S> {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            update: None,
        }
    }

    pub fn with_update<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.update = Some(Box::new(update));
        self
    }
}

impl<S> From<Outcome> for Settled<S> {
    fn from(outcome: Outcome) -> Self {
        Settled::new(outcome)
    }
}

impl<S> fmt::Debug for Settled<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settled")
            .field("outcome", &self.outcome)
            .field("has_update", &self.update.is_some())
            .finish()
    }
}

/// The future type carried by [`Action::Pending`].
pub type PendingAction<S> = BoxFuture<'static, anyhow::Result<Settled<S>>>;

/// The return value of an action closure: either already decided, or still running.
pub enum Action<S> {
    Ready(Outcome),
    Pending(PendingAction<S>),
}

impl<S> Action<S> {
    /// Wrap a future as a pending action.
    ///
    /// The future may resolve to a bare [`Outcome`] or to a [`Settled`] carrying
    /// a state update.
    pub fn pending<F, O>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<O>> + Send + 'static,
        O: Into<Settled<S>>,
    {
        Action::Pending(Box::pin(async move { future.await.map(Into::into) }))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Action::Pending(_))
    }
}

impl<S> From<Outcome> for Action<S> {
    fn from(outcome: Outcome) -> Self {
        Action::Ready(outcome)
    }
}

impl<S> From<bool> for Action<S> {
    fn from(keep: bool) -> Self {
        Action::Ready(keep.into())
    }
}

impl<S> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Ready(outcome) => f.debug_tuple("Ready").field(outcome).finish(),
            Action::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_maps_to_stay_or_continue() {
        assert_eq!(Outcome::from(true), Outcome::Stay);
        assert_eq!(Outcome::from(false), Outcome::Continue);
    }

    #[test]
    fn test_settled_carries_update() {
        let settled: Settled<u32> = Settled::new(Outcome::goto("done")).with_update(|n| *n += 2);
        assert_eq!(settled.outcome, Outcome::Goto("done".to_string()));

        let mut state = 1;
        (settled.update.unwrap())(&mut state);
        assert_eq!(state, 3);
    }

    #[test]
    fn test_pending_action_is_pending() {
        let action: Action<()> = Action::pending(async { Ok(Outcome::End) });
        assert!(action.is_pending());
        assert!(!Action::<()>::from(Outcome::Stay).is_pending());
    }
}
