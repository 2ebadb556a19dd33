//! Screenflow Std - ready-made actions for common stack patterns.
//!
//! Every helper returns a closure that plugs straight into
//! `StackItem::with_action`. The closures are generic over the controller
//! argument, so this crate only depends on `screenflow-core`.

pub mod actions;
pub mod prelude;
