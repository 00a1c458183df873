//! Command dispatcher and session lifecycle for the walletkit worklet.
//!
//! This is the core of the worklet process: it reads framed commands from
//! the host channel, routes them to handlers, and writes exactly one reply
//! per request. All handler failures are recovered at the dispatch
//! boundary; nothing that happens inside a command can tear the channel
//! down or crash the process.
//!
//! # Crate Structure
//!
//! - [`registry`] — Immutable module-identifier registry
//! - [`session`] — Single-mutable-session state machine
//! - [`handlers`] — One orchestration per command code
//! - [`dispatch`] — The serve loop over a framed channel
//! - [`logging`] — `tracing` subscriber setup for the worklet process

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod registry;
pub mod session;

pub use dispatch::Dispatcher;
pub use error::{Result, WorkletError};
pub use registry::{ModuleRegistry, ModuleRegistryBuilder};
pub use session::{Session, SessionManager};
