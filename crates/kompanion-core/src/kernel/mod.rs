//! # Kompanion Kernel
//!
//! Assembles the application and drives its lifecycle.
//!
//! - [`Application`](bootstrap::Application) builds the storage backend,
//!   repositories and services from a [`Settings`](crate::config::Settings)
//!   value and runs the registered components through `initialize`, `start`
//!   and `stop`.
//! - [`KernelComponent`](component::KernelComponent) is the lifecycle trait
//!   those components implement.
//! - [`StateManager`](state::StateManager) persists the in-memory
//!   repositories to a JSON snapshot between runs.
//! - [`Error`](error::Error) is the crate-wide error type.
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;
pub mod state;

pub use bootstrap::Application;
pub use component::KernelComponent;
pub use error::{Error, KernelLifecyclePhase, Result};
pub use state::{StateManager, StateSnapshot};

#[cfg(test)]
mod tests;
