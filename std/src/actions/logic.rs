//! Synchronous branching actions.
//!
//! Each helper reads the state and answers with an [`Outcome`]; none of them
//! mutates it.

use screenflow_core::outcome::{Outcome, Tag};

/// Jump to the tag `matcher` picks, or stay on the item when it picks none.
pub fn switch<S, C, F, T>(
    matcher: F,
) -> impl Fn(&mut S, &C) -> anyhow::Result<Outcome> + Send + Sync + 'static
where
    S: 'static,
    C: 'static,
    F: Fn(&S) -> Option<T> + Send + Sync + 'static,
    T: Into<Tag>,
{
    move |state: &mut S, _: &C| {
        Ok(match matcher(state) {
            Some(tag) => Outcome::goto(tag),
            None => Outcome::Stay,
        })
    }
}

/// Jump to `tag` when `predicate` holds.
pub fn when<S, C, P>(
    predicate: P,
    tag: impl Into<Tag>,
) -> impl Fn(&mut S, &C) -> anyhow::Result<Outcome> + Send + Sync + 'static
where
    S: 'static,
    C: 'static,
    P: Fn(&S) -> bool + Send + Sync + 'static,
{
    let tag = tag.into();
    move |state: &mut S, _: &C| {
        Ok(if predicate(state) {
            Outcome::Goto(tag.clone())
        } else {
            Outcome::Stay
        })
    }
}

/// Skip the item unless `predicate` holds.
pub fn skip_unless<S, C, P>(
    predicate: P,
) -> impl Fn(&mut S, &C) -> anyhow::Result<Outcome> + Send + Sync + 'static
where
    S: 'static,
    C: 'static,
    P: Fn(&S) -> bool + Send + Sync + 'static,
{
    move |state: &mut S, _: &C| Ok(Outcome::from(predicate(state)))
}

/// End the flow when `predicate` holds.
pub fn end_when<S, C, P>(
    predicate: P,
) -> impl Fn(&mut S, &C) -> anyhow::Result<Outcome> + Send + Sync + 'static
where
    S: 'static,
    C: 'static,
    P: Fn(&S) -> bool + Send + Sync + 'static,
{
    move |state: &mut S, _: &C| {
        Ok(if predicate(state) {
            Outcome::End
        } else {
            Outcome::Stay
        })
    }
}
