pub use crate::actions::flow::{TimedOut, delay, with_timeout};
pub use crate::actions::logic::{end_when, skip_unless, switch, when};
