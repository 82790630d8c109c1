//! On-call escalation engine.
//!
//! Comments on issues and pull requests drive the on-call state:
//!
//! - `/ack`, `/escalate`, `/resolve` move the escalation of the issue or pull
//!   request being commented on
//! - `/oncall add user`, `/oncall add rotation`, `/oncall assign` manage who
//!   can be on call
//!
//! Every command replies with one comment. A background [`Sweeper`]
//! escalates pending escalations nobody acknowledged in time.
//!
//! [`OnCallModule`] packages the engine and the sweeper as a
//! [`module_core::Module`].

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod module;
mod notify;
pub mod sweeper;
pub mod target;

pub use command::Command;
pub use config::OnCallConfig;
pub use engine::OnCallEngine;
pub use error::OnCallError;
pub use module::{OnCallModule, MODULE_NAME};
pub use sweeper::{SweepReport, Sweeper, SweeperHandle};
pub use target::Target;
