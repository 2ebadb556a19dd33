//! # Stack Items
//!
//! A stack item is one declarative step of a flow. The controller evaluates an
//! item as `action` → `goto` → `render`; an item producing none of these is
//! skipped.

use crate::controller::FlowController;
use crate::props::ScreenProps;
use screenflow_core::outcome::{Action, Tag};
use std::fmt;

pub type ActionFn<S, V> =
    Box<dyn Fn(&mut S, &FlowController<S, V>) -> anyhow::Result<Action<S>> + Send + Sync>;

pub type RenderFn<S, V> = Box<dyn Fn(&ScreenProps<'_, S, V>) -> V + Send + Sync>;

/// One step in a flow's ordered step list.
///
/// ```rust,ignore
/// let items = vec![
///     StackItem::screen("welcome", |_| View::Welcome),
///     StackItem::new()
///         .with_action(|state: &mut Signup, _| Ok(Outcome::from(state.needs_profile).into())),
///     StackItem::screen("profile", |props| View::Profile(props.state.name.clone())),
/// ];
/// ```
pub struct StackItem<S, V> {
    tag: Option<Tag>,
    action: Option<ActionFn<S, V>>,
    goto: Option<Tag>,
    render: Option<RenderFn<S, V>>,
    render_busy: Option<RenderFn<S, V>>,
}

impl<S, V> Default for StackItem<S, V> {
    fn default() -> Self {
        Self {
            tag: None,
            action: None,
            goto: None,
            render: None,
            render_busy: None,
        }
    }
}

impl<S, V> StackItem<S, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tagged(tag: impl Into<Tag>) -> Self {
        Self::new().with_tag(tag)
    }

    /// A tagged item that only renders.
    pub fn screen<F>(tag: impl Into<Tag>, render: F) -> Self
    where
        F: Fn(&ScreenProps<'_, S, V>) -> V + Send + Sync + 'static,
    {
        Self::tagged(tag).with_render(render)
    }

    pub fn with_tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Run `action` when the walk reaches this item.
    ///
    /// The action receives the state exclusively; it must not call
    /// [`FlowController::with_state`] on the controller it is handed.
    pub fn with_action<F, A>(mut self, action: F) -> Self
    where
        F: Fn(&mut S, &FlowController<S, V>) -> anyhow::Result<A> + Send + Sync + 'static,
        A: Into<Action<S>>,
    {
        self.action = Some(Box::new(move |state, flow| action(state, flow).map(Into::into)));
        self
    }

    /// Jump to `tag` unconditionally (after the action, before any render).
    pub fn with_goto(mut self, tag: impl Into<Tag>) -> Self {
        self.goto = Some(tag.into());
        self
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&ScreenProps<'_, S, V>) -> V + Send + Sync + 'static,
    {
        self.render = Some(Box::new(render));
        self
    }

    /// View shown while this item's action is still pending.
    pub fn with_render_busy<F>(mut self, render: F) -> Self
    where
        F: Fn(&ScreenProps<'_, S, V>) -> V + Send + Sync + 'static,
    {
        self.render_busy = Some(Box::new(render));
        self
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn goto(&self) -> Option<&str> {
        self.goto.as_deref()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }

    pub fn has_render_busy(&self) -> bool {
        self.render_busy.is_some()
    }

    /// Whether a busy placeholder screen can be shown for this item.
    pub(crate) fn renders_busy(&self) -> bool {
        self.render_busy.is_some() || self.render.is_some()
    }

    pub(crate) fn action_fn(&self) -> Option<&ActionFn<S, V>> {
        self.action.as_ref()
    }

    /// Produce the item's view, preferring `render_busy` while busy.
    pub(crate) fn render_view(&self, props: &ScreenProps<'_, S, V>, busy: bool) -> Option<V> {
        let render = if busy {
            self.render_busy.as_ref().or(self.render.as_ref())
        } else {
            self.render.as_ref()
        };
        render.map(|f| f(props))
    }

    /// Label for diagnostics: the tag, or `#index` for untagged items.
    pub(crate) fn label(&self, index: usize) -> String {
        match &self.tag {
            Some(tag) => tag.clone(),
            None => format!("#{index}"),
        }
    }
}

impl<S, V> fmt::Debug for StackItem<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackItem")
            .field("tag", &self.tag)
            .field("action", &self.action.is_some())
            .field("goto", &self.goto)
            .field("render", &self.render.is_some())
            .field("render_busy", &self.render_busy.is_some())
            .finish()
    }
}
