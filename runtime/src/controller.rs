//! # Flow Controller: Stack-Walking State Machine
//!
//! The controller owns a flow's state, a cursor into the immutable stack-item
//! list and a cursor into the screen ledger. Every public operation runs under
//! a reentrancy lock; failures never escape the call and are reported through
//! the logger and the `ended` transition instead.
//!
//! ## Locking discipline
//!
//! * The `cursor` mutex is only held for short bookkeeping sections, never
//!   while user code (actions, renders, callbacks, listeners) runs.
//! * Actions run with the state write lock, renders with a recursive read lock.
//! * Reentrant calls from user code are rejected by the operation lock before
//!   any of the above is touched.

use crate::item::StackItem;
use crate::lock::{Op, OpGuard};
use crate::props::ScreenProps;
use parking_lot::{Mutex, RwLock};
use screenflow_core::config::FlowConfig;
use screenflow_core::error::{ConfigError, FlowError, FlowResult};
use screenflow_core::event::{ListenerId, ListenerRegistry, RenderReason, notify_all};
use screenflow_core::ledger::{Screen, ScreenLedger};
use screenflow_core::outcome::{Action, Outcome, PendingAction, Settled, StateUpdate, Tag};
use screenflow_core::telemetry::{FlowLogger, LogSink, TracingLogger};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::Notify;
use tracing::Instrument;
use uuid::Uuid;

/// External repaint hook, called after every render pass.
pub type RenderCallback = Box<dyn Fn(RenderReason) + Send + Sync>;

/// A screen as recorded in this flow's ledger.
pub type FlowScreen<S, V> = Screen<StackItem<S, V>, V>;

struct Cursor<S, V> {
    /// `-1` before the first item has been visited.
    stack_index: isize,
    screen_index: Option<usize>,
    ledger: ScreenLedger<StackItem<S, V>, V>,
    started: bool,
    ended: bool,
}

pub(crate) struct FlowInner<S, V> {
    id: Uuid,
    name: String,
    items: Vec<Arc<StackItem<S, V>>>,
    config: FlowConfig,
    log: LogSink,
    render: Option<RenderCallback>,
    state: RwLock<S>,
    cursor: Mutex<Cursor<S, V>>,
    pub(crate) lock_count: AtomicUsize,
    /// Suspensions whose driver task has not finished yet.
    suspended: AtomicUsize,
    idle: Notify,
    listeners: Mutex<ListenerRegistry>,
    queued: Mutex<Vec<RenderReason>>,
    /// A render requested while user code held the state for writing.
    deferred: Mutex<Option<RenderReason>>,
}

/// How a stack walk stopped.
enum Walk<S> {
    Idle,
    Rendered,
    Ended,
    Suspended(Suspension<S>),
}

/// An action whose result is still outstanding.
struct Suspension<S> {
    future: PendingAction<S>,
    item_index: usize,
    /// Id of the busy placeholder screen, if one was shown.
    placeholder: Option<u64>,
}

/// Whether the walk keeps going after an item was handled.
enum Step<S> {
    Proceed,
    Done(Walk<S>),
}

/// Handle to a running flow. Cloning is cheap; all clones drive the same flow.
pub struct FlowController<S, V> {
    inner: Arc<FlowInner<S, V>>,
}

impl<S, V> Clone for FlowController<S, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// A non-owning flow handle, used by screen callbacks.
pub struct WeakFlow<S, V> {
    inner: Weak<FlowInner<S, V>>,
}

impl<S, V> Clone for WeakFlow<S, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, V> WeakFlow<S, V> {
    pub fn upgrade(&self) -> Option<FlowController<S, V>> {
        self.inner.upgrade().map(|inner| FlowController { inner })
    }
}

/// Builder for [`FlowController`].
///
/// ```rust,ignore
/// let flow = FlowController::builder("checkout", Cart::default())
///     .config(FlowConfig::default().with_render_distance(2))
///     .on_render(|reason| repaint(reason))
///     .item(StackItem::screen("cart", render_cart))
///     .item(StackItem::screen("pay", render_payment))
///     .build()?;
/// flow.start();
/// ```
pub struct FlowBuilder<S, V> {
    name: String,
    state: S,
    config: FlowConfig,
    logger: Option<Arc<dyn FlowLogger>>,
    render: Option<RenderCallback>,
    items: Vec<StackItem<S, V>>,
}

impl<S, V> FlowBuilder<S, V>
where
    S: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn logger(mut self, logger: impl FlowLogger) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn on_render<F>(mut self, render: F) -> Self
    where
        F: Fn(RenderReason) + Send + Sync + 'static,
    {
        self.render = Some(Box::new(render));
        self
    }

    pub fn item(mut self, item: StackItem<S, V>) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = StackItem<S, V>>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn build(self) -> Result<FlowController<S, V>, ConfigError> {
        self.config.validate()?;
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger::new(self.name.clone())));

        Ok(FlowController {
            inner: Arc::new(FlowInner {
                id: Uuid::new_v4(),
                log: LogSink::new(self.config.log_level, logger),
                name: self.name,
                items: self.items.into_iter().map(Arc::new).collect(),
                config: self.config,
                render: self.render,
                state: RwLock::new(self.state),
                cursor: Mutex::new(Cursor {
                    stack_index: -1,
                    screen_index: None,
                    ledger: ScreenLedger::new(),
                    started: false,
                    ended: false,
                }),
                lock_count: AtomicUsize::new(0),
                suspended: AtomicUsize::new(0),
                idle: Notify::new(),
                listeners: Mutex::new(ListenerRegistry::new()),
                queued: Mutex::new(Vec::new()),
                deferred: Mutex::new(None),
            }),
        })
    }
}

impl<S, V> FlowController<S, V>
where
    S: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn builder(name: impl Into<String>, state: S) -> FlowBuilder<S, V> {
        FlowBuilder {
            name: name.into(),
            state,
            config: FlowConfig::default(),
            logger: None,
            render: None,
            items: Vec::new(),
        }
    }

    pub fn new<F>(
        name: impl Into<String>,
        render: F,
        state: S,
        config: FlowConfig,
        items: impl IntoIterator<Item = StackItem<S, V>>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(RenderReason) + Send + Sync + 'static,
    {
        Self::builder(name, state)
            .config(config)
            .on_render(render)
            .items(items)
            .build()
    }

    pub fn downgrade(&self) -> WeakFlow<S, V> {
        WeakFlow {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Begin walking the stack from the first item.
    pub fn start(&self) {
        self.run(Op::Start, |flow| {
            {
                let mut cursor = flow.inner.cursor.lock();
                if cursor.started {
                    return Err(FlowError::AlreadyStarted);
                }
                cursor.started = true;
            }
            flow.inner.log.info("Flow started");
            flow.walk(Op::Start)
        });
    }

    /// Resume the stack walk after the current item.
    pub fn next(&self) {
        self.advance(None);
    }

    /// Mutate the state, then resume the stack walk.
    pub fn update_then_next<F>(&self, update: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.advance(Some(Box::new(update)));
    }

    /// Show the previous screen. No-op on the first screen.
    pub fn back(&self) {
        self.run(Op::Back, |flow| {
            let moved = flow.move_screen(|index| index.checked_sub(1));
            if moved {
                flow.present(RenderReason::Back);
            }
            Ok(Walk::Idle)
        });
    }

    /// Show the following screen. No-op on the last screen.
    pub fn forward(&self) {
        self.run(Op::Forward, |flow| {
            let moved = flow.move_screen(|index| Some(index + 1));
            if moved {
                flow.present(Op::Forward.reason());
            }
            Ok(Walk::Idle)
        });
    }

    /// Resume the stack walk at the item tagged `tag`.
    pub fn goto(&self, tag: impl Into<Tag>) {
        self.jump_to(tag.into(), None);
    }

    /// Mutate the state, then resume the stack walk at the item tagged `tag`.
    pub fn goto_with<F>(&self, tag: impl Into<Tag>, update: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.jump_to(tag.into(), Some(Box::new(update)));
    }

    /// Mutate the state and re-render without moving either cursor.
    pub fn update_state<F>(&self, update: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.run(Op::UpdateState, move |flow| {
            flow.apply_update(Box::new(update));
            flow.present(RenderReason::UpdateState);
            Ok(Walk::Idle)
        });
    }

    /// Terminate the flow. Ending an ended flow does nothing.
    pub fn end(&self) {
        if self.is_ended() {
            return;
        }
        self.run(Op::End, |flow| {
            flow.finish();
            Ok(Walk::Ended)
        });
    }

    /// Subscribe to render reasons. Listeners run after the operation that
    /// rendered has released its lock, in registration order.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(RenderReason) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.inner.listeners.lock().subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.listeners.lock().unsubscribe(id)
    }

    /// Wait until no action is pending.
    pub async fn settled(&self) {
        loop {
            let mut notified = std::pin::pin!(self.inner.idle.notified());
            notified.as_mut().enable();
            if self.inner.suspended.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn config(&self) -> &FlowConfig {
        &self.inner.config
    }

    /// Position of the last visited stack item, `None` before start.
    pub fn stack_index(&self) -> Option<usize> {
        usize::try_from(self.inner.cursor.lock().stack_index).ok()
    }

    pub fn screen_index(&self) -> Option<usize> {
        self.inner.cursor.lock().screen_index
    }

    pub fn screen_count(&self) -> usize {
        self.inner.cursor.lock().ledger.len()
    }

    pub fn is_started(&self) -> bool {
        self.inner.cursor.lock().started
    }

    pub fn is_ended(&self) -> bool {
        self.inner.cursor.lock().ended
    }

    /// Whether an operation is running or waiting on a pending action.
    pub fn is_locked(&self) -> bool {
        self.inner.lock_count.load(Ordering::Acquire) > 0
    }

    pub fn items(&self) -> &[Arc<StackItem<S, V>>] {
        &self.inner.items
    }

    pub fn current_item(&self) -> Option<Arc<StackItem<S, V>>> {
        self.stack_index()
            .and_then(|index| self.inner.items.get(index).cloned())
    }

    /// Borrow the ledger. `f` must not call back into the controller.
    pub fn with_screens<R>(&self, f: impl FnOnce(&[FlowScreen<S, V>]) -> R) -> R {
        f(self.inner.cursor.lock().ledger.as_slice())
    }

    /// Read the state. Not to be called from inside an action.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.inner.state.read_recursive())
    }

    // ------------------------------------------------------------------
    // Operation plumbing
    // ------------------------------------------------------------------

    fn advance(&self, update: Option<StateUpdate<S>>) {
        self.run(Op::Next, move |flow| {
            if let Some(update) = update {
                flow.apply_update(update);
            }
            flow.walk(Op::Next)
        });
    }

    fn jump_to(&self, tag: Tag, update: Option<StateUpdate<S>>) {
        self.run(Op::Goto, move |flow| {
            if let Some(update) = update {
                flow.apply_update(update);
            }
            flow.reposition(&tag)?;
            flow.walk(Op::Goto)
        });
    }

    /// Run `body` under the operation lock and route any failure to the error policy.
    fn run<F>(&self, op: Op, body: F)
    where
        F: FnOnce(&Self) -> FlowResult<Walk<S>>,
    {
        let guard = match self.acquire(op) {
            Ok(guard) => guard,
            Err(err) => {
                self.fail(op, err);
                self.flush();
                return;
            }
        };

        match body(self) {
            Ok(Walk::Suspended(suspension)) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    self.inner.suspended.fetch_add(1, Ordering::AcqRel);
                    let span = tracing::info_span!(
                        "Flow",
                        screenflow.flow = %self.inner.name,
                        screenflow.id = %self.inner.id,
                        screenflow.op = op.name(),
                    );
                    handle.spawn(self.clone().drive(op, suspension, guard).instrument(span));
                    return;
                }
                Err(_) => {
                    self.drop_placeholder(suspension.placeholder);
                    self.fail(op, FlowError::NoRuntime { op: op.name() });
                }
            },
            Ok(_) => {}
            Err(err) => self.fail(op, err),
        }

        drop(guard);
        self.flush();
    }

    fn acquire(&self, op: Op) -> FlowResult<OpGuard<S, V>> {
        {
            let cursor = self.inner.cursor.lock();
            if cursor.ended {
                return Err(FlowError::AlreadyEnded);
            }
            if op.requires_started() && !cursor.started {
                return Err(FlowError::NotStarted);
            }
        }
        OpGuard::try_acquire(&self.inner).ok_or(FlowError::Locked { op: op.name() })
    }

    /// Wait for pending actions, continuing the walk each time one settles.
    async fn drive(self, op: Op, mut suspension: Suspension<S>, guard: OpGuard<S, V>) {
        loop {
            let Suspension {
                future,
                item_index,
                placeholder,
            } = suspension;
            let result = future.await;

            match self.settle(op, item_index, placeholder, result) {
                Ok(Walk::Suspended(next)) => {
                    suspension = next;
                    continue;
                }
                Ok(_) => {}
                Err(err) => self.fail(op, err),
            }
            break;
        }

        drop(guard);
        // A listener may start another suspension here; it is counted before
        // this one is released.
        self.flush();
        if self.inner.suspended.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }

    /// Log a failed operation and apply the `end_on_error` policy.
    fn fail(&self, op: Op, err: FlowError) {
        self.inner
            .log
            .error(&format!("Flow operation `{}` failed", op.name()), Some(&err));
        if self.inner.config.end_on_error {
            self.finish();
        }
    }

    /// Deliver queued render reasons once the lock is free.
    fn flush(&self) {
        if self.is_locked() {
            return;
        }
        let reasons = std::mem::take(&mut *self.inner.queued.lock());
        if reasons.is_empty() {
            return;
        }
        let listeners = self.inner.listeners.lock().snapshot();
        for reason in reasons {
            notify_all(&listeners, reason, &self.inner.log);
        }
    }

    // ------------------------------------------------------------------
    // Stack walk
    // ------------------------------------------------------------------

    /// Visit items from the one after `stack_index` until something renders,
    /// suspends or ends the flow.
    fn walk(&self, op: Op) -> FlowResult<Walk<S>> {
        let limit = self.inner.config.max_walk_steps;
        for _ in 0..limit {
            let index = {
                let mut cursor = self.inner.cursor.lock();
                cursor.stack_index += 1;
                let index = usize::try_from(cursor.stack_index)
                    .ok()
                    .filter(|index| *index < self.inner.items.len());
                if index.is_none() {
                    // stay on the last item
                    cursor.stack_index -= 1;
                }
                index
            };
            let Some(index) = index else {
                self.finish();
                return Ok(Walk::Ended);
            };

            let item = self.inner.items[index].clone();
            self.inner
                .log
                .debug(&format!("Visiting item {}", item.label(index)));

            let step = match item.action_fn() {
                Some(run) => {
                    let result = {
                        let mut state = self.inner.state.write();
                        run(&mut *state, self)
                    };
                    self.run_deferred();
                    if self.is_ended() {
                        return Ok(Walk::Ended);
                    }
                    let action = result.map_err(|source| FlowError::Action {
                        op: op.name(),
                        tag: item.label(index),
                        source,
                    })?;

                    match action {
                        Action::Ready(outcome) => self.apply_outcome(op, index, outcome, None)?,
                        Action::Pending(future) => {
                            let placeholder = self.show_busy(op, index);
                            return Ok(Walk::Suspended(Suspension {
                                future,
                                item_index: index,
                                placeholder,
                            }));
                        }
                    }
                }
                None => self.settle_item(op, index, None)?,
            };

            if let Step::Done(walk) = step {
                return Ok(walk);
            }
        }
        Err(FlowError::WalkLimit { limit })
    }

    /// Continue after a pending action settled.
    fn settle(
        &self,
        op: Op,
        index: usize,
        placeholder: Option<u64>,
        result: anyhow::Result<Settled<S>>,
    ) -> FlowResult<Walk<S>> {
        if self.is_ended() {
            self.inner
                .log
                .debug("Discarding action result, flow already ended");
            self.drop_placeholder(placeholder);
            return Ok(Walk::Ended);
        }

        let settled = match result {
            Ok(settled) => settled,
            Err(source) => {
                if placeholder.is_some() {
                    self.drop_placeholder(placeholder);
                    self.present(op.reason());
                }
                return Err(FlowError::Action {
                    op: op.name(),
                    tag: self.inner.items[index].label(index),
                    source,
                });
            }
        };

        self.clear_busy(placeholder);
        if let Some(update) = settled.update {
            self.apply_update(update);
        }

        match self.apply_outcome(op, index, settled.outcome, placeholder)? {
            Step::Proceed => self.walk(op),
            Step::Done(walk) => Ok(walk),
        }
    }

    fn apply_outcome(
        &self,
        op: Op,
        index: usize,
        outcome: Outcome,
        placeholder: Option<u64>,
    ) -> FlowResult<Step<S>> {
        self.inner.log.debug(&format!(
            "Item {} returned {}",
            self.inner.items[index].label(index),
            outcome.kind()
        ));
        match outcome {
            Outcome::Stay => self.settle_item(op, index, placeholder),
            Outcome::Continue => {
                self.drop_placeholder(placeholder);
                Ok(Step::Proceed)
            }
            Outcome::Goto(tag) => {
                self.drop_placeholder(placeholder);
                self.reposition(&tag)?;
                Ok(Step::Proceed)
            }
            Outcome::End => {
                self.drop_placeholder(placeholder);
                self.finish();
                Ok(Step::Done(Walk::Ended))
            }
        }
    }

    /// The `goto` and `render` stages of an item.
    fn settle_item(&self, op: Op, index: usize, placeholder: Option<u64>) -> FlowResult<Step<S>> {
        let item = &self.inner.items[index];

        if let Some(tag) = item.goto() {
            self.drop_placeholder(placeholder);
            self.reposition(tag)?;
            return Ok(Step::Proceed);
        }

        if item.has_render() {
            if placeholder.is_none() {
                self.push_screen(index, false);
            }
            self.present(op.reason());
            return Ok(Step::Done(Walk::Rendered));
        }

        self.drop_placeholder(placeholder);
        Ok(Step::Proceed)
    }

    /// Find `tag` forward of the current item, then backward. First match wins.
    fn resolve_tag(&self, tag: &str) -> FlowResult<usize> {
        let current = self.inner.cursor.lock().stack_index;
        let items = &self.inner.items;
        let matches = |index: &usize| items[*index].tag() == Some(tag);

        let after = usize::try_from(current + 1).unwrap_or(0);
        let before = usize::try_from(current).unwrap_or(0);
        (after..items.len())
            .find(matches)
            .or_else(|| (0..before).rev().find(matches))
            .ok_or_else(|| FlowError::TagNotFound {
                tag: tag.to_string(),
            })
    }

    /// Point `stack_index` just before `tag` so the walk lands on it next.
    fn reposition(&self, tag: &str) -> FlowResult<()> {
        let target = self.resolve_tag(tag)?;
        self.inner.cursor.lock().stack_index = target as isize - 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ledger bookkeeping
    // ------------------------------------------------------------------

    /// Append a screen for item `index` after the active one and make it active.
    fn push_screen(&self, index: usize, busy: bool) -> u64 {
        let mut screen = Screen::new(self.inner.items[index].clone(), index);
        if busy {
            screen = screen.busy();
        }
        let id = screen.id;

        let mut guard = self.inner.cursor.lock();
        let cursor = &mut *guard;
        let at = cursor.ledger.append(cursor.screen_index, screen);
        let dropped = cursor.ledger.prune(
            self.inner.config.max_screens,
            self.inner.config.screens_drop_ratio,
            at,
        );
        cursor.screen_index = Some(at - dropped);
        drop(guard);

        if dropped > 0 {
            self.inner
                .log
                .debug(&format!("Pruned {dropped} screens from the ledger"));
        }
        id
    }

    /// Append a busy placeholder (when the item can show one) and render.
    fn show_busy(&self, op: Op, index: usize) -> Option<u64> {
        let placeholder = self.inner.items[index]
            .renders_busy()
            .then(|| self.push_screen(index, true));
        self.present(op.reason());
        placeholder
    }

    fn clear_busy(&self, placeholder: Option<u64>) {
        let Some(id) = placeholder else { return };
        let mut cursor = self.inner.cursor.lock();
        if let Some(screen) = cursor.ledger.iter_mut().find(|s| s.id == id) {
            screen.busy = false;
        }
    }

    /// Remove a busy placeholder and fall back to the screen before it.
    fn drop_placeholder(&self, placeholder: Option<u64>) {
        let Some(id) = placeholder else { return };
        let mut guard = self.inner.cursor.lock();
        let cursor = &mut *guard;
        if let Some(position) = cursor.ledger.iter().position(|s| s.id == id) {
            cursor.ledger.truncate(position);
            cursor.screen_index = position.checked_sub(1);
        }
    }

    /// Move `screen_index` with `step`, syncing `stack_index` to the shown screen.
    fn move_screen(&self, step: impl FnOnce(usize) -> Option<usize>) -> bool {
        let mut guard = self.inner.cursor.lock();
        let cursor = &mut *guard;
        let Some(target) = cursor.screen_index.and_then(step) else {
            return false;
        };
        let Some(screen) = cursor.ledger.get(target) else {
            return false;
        };
        cursor.stack_index = screen.stack_index as isize;
        cursor.screen_index = Some(target);
        true
    }

    fn apply_update(&self, update: StateUpdate<S>) {
        update(&mut *self.inner.state.write());
        self.run_deferred();
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Recompute render results inside the render distance, clear the rest,
    /// then notify the host.
    fn present(&self, reason: RenderReason) {
        // The state is write-locked only by user code running inside this
        // flow's own operation; render once that code returns.
        let Some(state) = self.inner.state.try_read_recursive() else {
            *self.inner.deferred.lock() = Some(reason);
            return;
        };

        let (jobs, active) = {
            let cursor = self.inner.cursor.lock();
            let jobs: Vec<_> = cursor
                .ledger
                .iter()
                .map(|screen| (screen.id, screen.item.clone(), screen.busy))
                .collect();
            (jobs, cursor.screen_index.unwrap_or(0))
        };

        let len = jobs.len();
        let mut results = Vec::with_capacity(len);
        for (index, (id, item, busy)) in jobs.into_iter().enumerate() {
            if !self
                .inner
                .config
                .within_render_distance(index.abs_diff(active))
            {
                results.push((id, None));
                continue;
            }
            let props = ScreenProps::new(self, &state, index, active, len, busy);
            results.push((id, item.render_view(&props, busy)));
        }
        drop(state);

        {
            let mut cursor = self.inner.cursor.lock();
            for (screen, (id, result)) in cursor.ledger.iter_mut().zip(results) {
                if screen.id == id {
                    screen.result = result;
                }
            }
        }

        if let Some(render) = &self.inner.render {
            render(reason);
        }
        self.inner.queued.lock().push(reason);
    }

    fn run_deferred(&self) {
        let reason = self.inner.deferred.lock().take();
        if let Some(reason) = reason {
            self.present(reason);
        }
    }

    /// Mark the flow ended and run the final render pass.
    fn finish(&self) {
        {
            let mut cursor = self.inner.cursor.lock();
            if cursor.ended {
                return;
            }
            cursor.ended = true;
        }
        self.inner.log.info("Flow ended");
        self.present(RenderReason::End);
    }
}

impl<S, V> FlowController<S, V>
where
    S: Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// A copy of the current state.
    pub fn state(&self) -> S {
        self.with_state(S::clone)
    }
}

impl<S, V> FlowController<S, V>
where
    S: Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Snapshot of the ledger.
    pub fn screens(&self) -> Vec<FlowScreen<S, V>> {
        self.with_screens(<[FlowScreen<S, V>]>::to_vec)
    }

    pub fn current_screen(&self) -> Option<FlowScreen<S, V>> {
        let cursor = self.inner.cursor.lock();
        cursor
            .screen_index
            .and_then(|index| cursor.ledger.get(index).cloned())
    }
}

impl<S, V> fmt::Debug for FlowController<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cursor = self.inner.cursor.lock();
        f.debug_struct("FlowController")
            .field("name", &self.inner.name)
            .field("id", &self.inner.id)
            .field("stack_index", &cursor.stack_index)
            .field("screen_index", &cursor.screen_index)
            .field("screens", &cursor.ledger.len())
            .field("started", &cursor.started)
            .field("ended", &cursor.ended)
            .finish()
    }
}
