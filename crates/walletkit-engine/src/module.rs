//! Capability contracts for wallet and protocol modules.
//!
//! Modules are a closed set of variants behind small capability traits:
//! wallets derive accounts, protocols bind lending capabilities onto a
//! network. The engine never inspects a driver beyond these surfaces.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::seed::SeedContext;

/// Opaque module configuration, forwarded from the host unmodified.
pub type ModuleConfig = serde_json::Value;

/// Account capability for one network: address derivation.
#[async_trait::async_trait]
pub trait Account: Send + Sync {
    /// The receive address for this account.
    async fn address(&self) -> Result<String>;
}

/// Lending-protocol capability bound to an account's network.
#[async_trait::async_trait]
pub trait LendingProtocol: Send + Sync {
    /// Quote supplying `amount` of `token`. The amount is forwarded
    /// uninterpreted; the quote shape is protocol-defined JSON.
    async fn quote_supply(
        &self,
        token: &str,
        amount: &serde_json::Value,
    ) -> Result<serde_json::Value>;
}

impl fmt::Debug for dyn LendingProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn LendingProtocol")
    }
}

/// A wallet module implementation: derives accounts from the seed context.
#[async_trait::async_trait]
pub trait WalletDriver: Send + Sync {
    async fn derive_account(
        &self,
        seed: &SeedContext,
        network: &str,
        config: &ModuleConfig,
    ) -> Result<Arc<dyn Account>>;
}

/// A protocol module implementation: binds a lending capability.
#[async_trait::async_trait]
pub trait ProtocolDriver: Send + Sync {
    async fn bind(
        &self,
        seed: &SeedContext,
        network: &str,
        config: &ModuleConfig,
    ) -> Result<Arc<dyn LendingProtocol>>;
}

/// A registered module implementation reference.
#[derive(Clone)]
pub enum ModuleKind {
    Wallet(Arc<dyn WalletDriver>),
    Protocol(Arc<dyn ProtocolDriver>),
}

impl ModuleKind {
    /// Wire-form role name of this module kind.
    pub fn role_name(&self) -> &'static str {
        match self {
            ModuleKind::Wallet(_) => "wallet",
            ModuleKind::Protocol(_) => "protocol",
        }
    }
}

impl fmt::Debug for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::Wallet(_) => f.write_str("ModuleKind::Wallet(..)"),
            ModuleKind::Protocol(_) => f.write_str("ModuleKind::Protocol(..)"),
        }
    }
}
