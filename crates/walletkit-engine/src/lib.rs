//! Seed-bound session engine and module capability contracts.
//!
//! The dispatcher core treats this layer as an opaque collaborator: it
//! constructs an [`Engine`] from a seed phrase, registers wallet and
//! protocol modules against networks, and resolves account capabilities.
//! Key derivation, signing, and chain-specific computation live behind the
//! [`WalletDriver`]/[`ProtocolDriver`] traits and never in this crate.

pub mod engine;
pub mod error;
pub mod module;
pub mod seed;

pub use engine::{Engine, SessionAccount};
pub use error::{EngineError, Result};
pub use module::{Account, LendingProtocol, ModuleConfig, ModuleKind, ProtocolDriver, WalletDriver};
pub use seed::SeedContext;
