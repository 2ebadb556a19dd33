use screenflow_core::outcome::{Action, Outcome, Settled};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Error a [`with_timeout`] action settles with when its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Pending action timed out after {0:?}")]
pub struct TimedOut(pub Duration);

/// An action that waits for `duration` and then settles with `outcome`.
///
/// The item shows its busy view while the timer runs.
pub fn delay<S, C>(
    duration: Duration,
    outcome: Outcome,
) -> impl Fn(&mut S, &C) -> anyhow::Result<Action<S>> + Send + Sync + 'static
where
    S: 'static,
    C: 'static,
{
    move |_: &mut S, _: &C| {
        let outcome = outcome.clone();
        Ok(Action::pending(async move {
            tokio::time::sleep(duration).await;
            Ok::<_, anyhow::Error>(outcome)
        }))
    }
}

/// Bound a pending future by `duration`.
///
/// When the deadline passes the future is dropped and the action fails with
/// [`TimedOut`], so the flow's `end_on_error` policy applies.
pub fn with_timeout<S, F, O>(duration: Duration, future: F) -> Action<S>
where
    F: Future<Output = anyhow::Result<O>> + Send + 'static,
    O: Into<Settled<S>>,
{
    Action::pending(async move {
        match tokio::time::timeout(duration, future).await {
            Ok(settled) => settled,
            Err(_) => {
                tracing::debug!(?duration, "Pending action timed out");
                Err(TimedOut(duration).into())
            }
        }
    })
}
