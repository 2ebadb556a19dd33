use crate::controller::{FlowController, WeakFlow};
use screenflow_core::outcome::Tag;
use std::fmt;
use std::sync::Arc;

pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// What a render function sees for one screen.
///
/// The bound callbacks hold a weak handle to the flow, so views may store them
/// without keeping the flow alive. Storing a clone of [`ScreenProps::flow`] in a
/// view does keep it alive and should be avoided.
pub struct ScreenProps<'a, S, V> {
    /// Position of this screen in the ledger.
    pub index: usize,
    pub active: bool,
    /// Ledger positions between this screen and the active one.
    pub distance: usize,
    pub busy: bool,
    pub state: &'a S,
    pub next: Callback,
    /// `None` on the first screen.
    pub back: Option<Callback>,
    /// `None` on the last screen.
    pub forward: Option<Callback>,
    pub end: Callback,
    flow: &'a FlowController<S, V>,
}

impl<'a, S, V> ScreenProps<'a, S, V>
where
    S: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub(crate) fn new(
        flow: &'a FlowController<S, V>,
        state: &'a S,
        index: usize,
        active: usize,
        len: usize,
        busy: bool,
    ) -> Self {
        let weak = flow.downgrade();
        Self {
            index,
            active: index == active,
            distance: index.abs_diff(active),
            busy,
            state,
            next: bind(&weak, |flow| flow.next()),
            back: (index > 0).then(|| bind(&weak, |flow| flow.back())),
            forward: (index + 1 < len).then(|| bind(&weak, |flow| flow.forward())),
            end: bind(&weak, |flow| flow.end()),
            flow,
        }
    }

    pub fn update_then_next<F>(&self, update: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.flow.update_then_next(update);
    }

    pub fn goto(&self, tag: impl Into<Tag>) {
        self.flow.goto(tag);
    }

    pub fn goto_with<F>(&self, tag: impl Into<Tag>, update: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.flow.goto_with(tag, update);
    }

    pub fn update_state<F>(&self, update: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.flow.update_state(update);
    }

    pub fn flow(&self) -> &FlowController<S, V> {
        self.flow
    }
}

fn bind<S, V, F>(weak: &WeakFlow<S, V>, call: F) -> Callback
where
    S: Send + Sync + 'static,
    V: Send + Sync + 'static,
    F: Fn(&FlowController<S, V>) + Send + Sync + 'static,
{
    let weak = weak.clone();
    Arc::new(move || {
        if let Some(flow) = weak.upgrade() {
            call(&flow);
        }
    })
}

impl<S, V> fmt::Debug for ScreenProps<'_, S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenProps")
            .field("index", &self.index)
            .field("active", &self.active)
            .field("distance", &self.distance)
            .field("busy", &self.busy)
            .field("back", &self.back.is_some())
            .field("forward", &self.forward.is_some())
            .finish()
    }
}
