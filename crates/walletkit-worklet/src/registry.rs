//! Immutable module registry: identifier → implementation reference.
//!
//! Supplied once at process start and read-only afterwards. Absence of a
//! key is a caller error surfaced during START, not a registry fault.

use std::collections::HashMap;

use walletkit_engine::ModuleKind;

/// EVM account-abstraction wallet (ERC-4337).
pub const EVM_ERC_4337: &str = "evm-erc-4337";
/// Spark wallet.
pub const SPARK: &str = "spark";
/// Plain EVM wallet.
pub const EVM: &str = "evm";
/// Bitcoin wallet.
pub const BTC: &str = "btc";
/// Solana wallet.
pub const SOLANA: &str = "solana";
/// Tron wallet.
pub const TRON: &str = "tron";
/// Tron gas-free wallet.
pub const TRON_GASFREE: &str = "tron-gasfree";
/// TON wallet.
pub const TON: &str = "ton";
/// TON gasless wallet.
pub const TON_GASLESS: &str = "ton-gasless";
/// Aave lending protocol on EVM networks.
pub const AAVE_EVM: &str = "aave-evm";

/// Static mapping from module identifier to implementation reference.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    entries: HashMap<String, ModuleKind>,
}

impl ModuleRegistry {
    /// Start building a registry.
    pub fn builder() -> ModuleRegistryBuilder {
        ModuleRegistryBuilder::default()
    }

    /// Look up a module implementation by identifier.
    pub fn get(&self, module_name: &str) -> Option<&ModuleKind> {
        self.entries.get(module_name)
    }

    /// True if the identifier is registered.
    pub fn contains(&self, module_name: &str) -> bool {
        self.entries.contains_key(module_name)
    }

    /// Number of registered module implementations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`ModuleRegistry`]. The registry exposes no mutation after
/// `build`.
#[derive(Debug, Default)]
pub struct ModuleRegistryBuilder {
    entries: HashMap<String, ModuleKind>,
}

impl ModuleRegistryBuilder {
    /// Register a wallet module implementation.
    pub fn wallet(
        mut self,
        module_name: impl Into<String>,
        driver: std::sync::Arc<dyn walletkit_engine::WalletDriver>,
    ) -> Self {
        self.entries
            .insert(module_name.into(), ModuleKind::Wallet(driver));
        self
    }

    /// Register a protocol module implementation.
    pub fn protocol(
        mut self,
        module_name: impl Into<String>,
        driver: std::sync::Arc<dyn walletkit_engine::ProtocolDriver>,
    ) -> Self {
        self.entries
            .insert(module_name.into(), ModuleKind::Protocol(driver));
        self
    }

    /// Freeze the registry.
    pub fn build(self) -> ModuleRegistry {
        ModuleRegistry {
            entries: self.entries,
        }
    }
}
