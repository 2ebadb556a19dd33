//! Reentrancy guard for flow operations.

use crate::controller::FlowInner;
use screenflow_core::event::RenderReason;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// The public operations that go through the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Start,
    Next,
    Back,
    Forward,
    Goto,
    UpdateState,
    End,
}

impl Op {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Op::Start => "start",
            Op::Next => "next",
            Op::Back => "back",
            Op::Forward => "forward",
            Op::Goto => "goto",
            Op::UpdateState => "updateState",
            Op::End => "end",
        }
    }

    pub(crate) fn requires_started(self) -> bool {
        !matches!(self, Op::Start | Op::UpdateState | Op::End)
    }

    /// Reason reported when this operation renders a screen.
    pub(crate) fn reason(self) -> RenderReason {
        match self {
            Op::Start => RenderReason::Start,
            Op::Next | Op::Forward | Op::Goto => RenderReason::Next,
            Op::Back => RenderReason::Back,
            Op::UpdateState => RenderReason::UpdateState,
            Op::End => RenderReason::End,
        }
    }
}

/// Holds the flow lock; released on drop.
///
/// The guard owns its flow so it can travel into the task that waits on a
/// pending action, keeping the flow locked until the action settles.
pub(crate) struct OpGuard<S, V> {
    inner: Arc<FlowInner<S, V>>,
}

impl<S, V> OpGuard<S, V> {
    /// Take the lock if nobody holds it.
    pub(crate) fn try_acquire(inner: &Arc<FlowInner<S, V>>) -> Option<Self> {
        inner
            .lock_count
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                inner: inner.clone(),
            })
    }
}

impl<S, V> Drop for OpGuard<S, V> {
    fn drop(&mut self) {
        self.inner.lock_count.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_reasons() {
        assert_eq!(Op::Goto.reason(), RenderReason::Next);
        assert_eq!(Op::Forward.reason(), RenderReason::Next);
        assert_eq!(Op::Back.reason(), RenderReason::Back);
    }

    #[test]
    fn test_start_and_end_do_not_require_started() {
        assert!(!Op::Start.requires_started());
        assert!(!Op::End.requires_started());
        assert!(Op::Next.requires_started());
        assert!(Op::Back.requires_started());
    }
}
