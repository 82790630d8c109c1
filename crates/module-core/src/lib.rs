//! Feature modules for Pager.
//!
//! A [`Module`] is a named unit that reacts to webhook events. Modules are
//! collected in a [`ModuleRegistry`] and receive every delivery through the
//! [`Dispatcher`], which runs each module invocation as its own task and does
//! not wait for it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use github_client::WebhookEvent;
//! use module_core::{Dispatcher, Module, ModuleError, ModuleRegistry};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Module for Audit {
//!     fn name(&self) -> &str {
//!         "audit"
//!     }
//!
//!     async fn handle_event(&self, event: &WebhookEvent, _raw: &[u8]) -> Result<(), ModuleError> {
//!         println!("saw {}", event.event_type());
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() {
//! let registry = Arc::new(ModuleRegistry::new());
//! registry.register(Arc::new(Audit));
//!
//! let dispatcher = Dispatcher::new(registry);
//! let event = WebhookEvent::parse("ping", br#"{"zen": "Keep it simple."}"#).unwrap();
//! dispatcher.dispatch(event, b"{}".to_vec());
//! # }
//! ```

pub mod dispatcher;
pub mod error;
pub mod module;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use error::ModuleError;
pub use module::Module;
pub use registry::ModuleRegistry;
