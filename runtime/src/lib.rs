//! Screenflow Runtime - the flow controller.
//!
//! A flow is an ordered list of [`StackItem`]s walked by a [`FlowController`].
//! The controller records every rendered step in a screen ledger, supports
//! back/forward navigation over it and shows busy screens while asynchronous
//! actions are pending.

pub mod controller;
pub mod item;
mod lock;
pub mod props;

pub use controller::{FlowBuilder, FlowController, FlowScreen, RenderCallback, WeakFlow};
pub use item::StackItem;
pub use props::{Callback, ScreenProps};

pub mod prelude {
    pub use crate::controller::{FlowController, FlowScreen};
    pub use crate::item::StackItem;
    pub use crate::props::ScreenProps;
    pub use screenflow_core::prelude::*;
}
