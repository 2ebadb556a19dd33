//! Screenflow Core - data model for stack-based screen flows.
//!
//! This crate holds the protocol-agnostic pieces: action outcomes, the screen
//! ledger, configuration, errors and logging. Execution lives in
//! `screenflow-runtime`.

pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod outcome;
pub mod telemetry;

pub use config::FlowConfig;
pub use error::{ConfigError, FlowError, FlowResult};
pub use event::{Listener, ListenerId, ListenerRegistry, RenderReason};
pub use ledger::{Screen, ScreenLedger};
pub use outcome::{Action, Outcome, PendingAction, Settled, StateUpdate, Tag};
pub use telemetry::{FlowLogger, LogEntry, LogLevel, LogSink, MemoryLogger, TracingLogger};

pub mod prelude {
    pub use crate::config::FlowConfig;
    pub use crate::error::{FlowError, FlowResult};
    pub use crate::event::RenderReason;
    pub use crate::outcome::{Action, Outcome, Settled, Tag};
    pub use crate::telemetry::{FlowLogger, LogLevel, MemoryLogger};
}
