use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::module::{Account, LendingProtocol, ModuleConfig, ProtocolDriver, WalletDriver};
use crate::seed::SeedContext;

#[derive(Clone)]
struct WalletBinding {
    driver: Arc<dyn WalletDriver>,
    config: ModuleConfig,
}

#[derive(Clone)]
struct ProtocolBinding {
    name: String,
    driver: Arc<dyn ProtocolDriver>,
    config: ModuleConfig,
}

/// The session engine: binds a seed context to registered modules.
///
/// Registration happens exclusively during session construction (before
/// the engine is shared), so it takes `&mut self`; resolution is `&self`
/// and safe under concurrent handlers. `dispose` marks the engine dead;
/// in-flight holders observe [`EngineError::Disposed`] on the next
/// resolution rather than being cancelled.
pub struct Engine {
    seed: SeedContext,
    wallets: HashMap<String, WalletBinding>,
    protocols: HashMap<String, Vec<ProtocolBinding>>,
    disposed: AtomicBool,
}

impl Engine {
    /// Construct an engine from a raw seed phrase.
    pub fn new(seed_phrase: &str) -> Result<Self> {
        let seed = SeedContext::new(seed_phrase)?;
        tracing::debug!(words = seed.word_count(), "engine constructed");
        Ok(Self {
            seed,
            wallets: HashMap::new(),
            protocols: HashMap::new(),
            disposed: AtomicBool::new(false),
        })
    }

    /// Bind a wallet module to a network. At most one wallet per network;
    /// a later registration replaces the earlier one.
    pub fn register_wallet(
        &mut self,
        network: &str,
        driver: Arc<dyn WalletDriver>,
        config: ModuleConfig,
    ) {
        tracing::debug!(network, "wallet registered");
        self.wallets
            .insert(network.to_string(), WalletBinding { driver, config });
    }

    /// Bind a named lending protocol to a network.
    pub fn register_protocol(
        &mut self,
        network: &str,
        name: &str,
        driver: Arc<dyn ProtocolDriver>,
        config: ModuleConfig,
    ) {
        tracing::debug!(network, name, "protocol registered");
        self.protocols
            .entry(network.to_string())
            .or_default()
            .push(ProtocolBinding {
                name: name.to_string(),
                driver,
                config,
            });
    }

    /// Resolve the account capability for a network.
    ///
    /// Derivation is delegated to the registered wallet driver on every
    /// call; the returned handle also carries the network's protocol
    /// bindings for lazy lookup.
    pub async fn account(&self, network: &str) -> Result<SessionAccount> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(EngineError::Disposed);
        }

        let binding = self
            .wallets
            .get(network)
            .ok_or_else(|| EngineError::NoWallet {
                network: network.to_string(),
            })?;

        let account = binding
            .driver
            .derive_account(&self.seed, network, &binding.config)
            .await?;

        Ok(SessionAccount {
            network: network.to_string(),
            seed: self.seed.clone(),
            account,
            protocols: self.protocols.get(network).cloned().unwrap_or_default(),
        })
    }

    /// Mark the engine disposed. Idempotent; subsequent resolutions fail
    /// with [`EngineError::Disposed`]. Backing allocations are released
    /// when the last handle drops.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            tracing::debug!("engine disposed");
        }
    }

    /// True once `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

/// Account capability resolved for one network.
pub struct SessionAccount {
    network: String,
    seed: SeedContext,
    account: Arc<dyn Account>,
    protocols: Vec<ProtocolBinding>,
}

impl std::fmt::Debug for SessionAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAccount")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

impl SessionAccount {
    /// The receive address for this account.
    pub async fn address(&self) -> Result<String> {
        self.account.address().await
    }

    /// Resolve a named lending protocol on this account's network.
    pub async fn lending_protocol(&self, name: &str) -> Result<Arc<dyn LendingProtocol>> {
        let binding = self
            .protocols
            .iter()
            .find(|binding| binding.name == name)
            .ok_or_else(|| EngineError::NoProtocol {
                network: self.network.clone(),
                name: name.to_string(),
            })?;

        binding
            .driver
            .bind(&self.seed, &self.network, &binding.config)
            .await
    }

    /// Network this account was resolved for.
    pub fn network(&self) -> &str {
        &self.network
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FixedAccount(String);

    #[async_trait::async_trait]
    impl Account for FixedAccount {
        async fn address(&self) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct TestWallet;

    #[async_trait::async_trait]
    impl WalletDriver for TestWallet {
        async fn derive_account(
            &self,
            seed: &SeedContext,
            network: &str,
            _config: &ModuleConfig,
        ) -> Result<Arc<dyn Account>> {
            Ok(Arc::new(FixedAccount(format!(
                "{network}:{}",
                seed.word_count()
            ))))
        }
    }

    struct FixedQuote;

    #[async_trait::async_trait]
    impl LendingProtocol for FixedQuote {
        async fn quote_supply(
            &self,
            token: &str,
            amount: &serde_json::Value,
        ) -> Result<serde_json::Value> {
            Ok(json!({"token": token, "amount": amount, "apy": "3.1"}))
        }
    }

    struct TestProtocol;

    #[async_trait::async_trait]
    impl ProtocolDriver for TestProtocol {
        async fn bind(
            &self,
            _seed: &SeedContext,
            _network: &str,
            _config: &ModuleConfig,
        ) -> Result<Arc<dyn LendingProtocol>> {
            Ok(Arc::new(FixedQuote))
        }
    }

    fn engine_with_bindings() -> Engine {
        let mut engine = Engine::new("abandon abandon about").expect("seed should be valid");
        engine.register_wallet("bitcoin", Arc::new(TestWallet), json!({}));
        engine.register_protocol("ethereum", "aave", Arc::new(TestProtocol), json!({}));
        engine.register_wallet("ethereum", Arc::new(TestWallet), json!({}));
        engine
    }

    #[tokio::test]
    async fn resolves_account_for_registered_network() {
        let engine = engine_with_bindings();
        let account = engine.account("bitcoin").await.expect("account resolves");
        assert_eq!(account.network(), "bitcoin");
        assert_eq!(account.address().await.unwrap(), "bitcoin:3");
    }

    #[tokio::test]
    async fn unregistered_network_is_a_lookup_error() {
        let engine = engine_with_bindings();
        let err = engine.account("solana").await.unwrap_err();
        assert!(matches!(err, EngineError::NoWallet { network } if network == "solana"));
    }

    #[tokio::test]
    async fn resolves_named_protocol_on_account() {
        let engine = engine_with_bindings();
        let account = engine.account("ethereum").await.unwrap();
        let protocol = account
            .lending_protocol("aave")
            .await
            .expect("protocol resolves");
        let quote = protocol.quote_supply("usdt", &json!(1500)).await.unwrap();
        assert_eq!(quote["token"], "usdt");
        assert_eq!(quote["amount"], json!(1500));
    }

    #[tokio::test]
    async fn unknown_protocol_name_is_a_lookup_error() {
        let engine = engine_with_bindings();
        let account = engine.account("ethereum").await.unwrap();
        let err = account.lending_protocol("compound").await.unwrap_err();
        assert!(
            matches!(err, EngineError::NoProtocol { network, name }
                if network == "ethereum" && name == "compound")
        );
    }

    #[tokio::test]
    async fn disposed_engine_rejects_resolution() {
        let engine = engine_with_bindings();
        engine.dispose();
        assert!(engine.is_disposed());
        assert!(matches!(
            engine.account("bitcoin").await,
            Err(EngineError::Disposed)
        ));
    }

    #[test]
    fn dispose_is_idempotent() {
        let engine = engine_with_bindings();
        engine.dispose();
        engine.dispose();
        assert!(engine.is_disposed());
    }

    #[tokio::test]
    async fn later_wallet_registration_replaces_earlier() {
        struct OtherWallet;

        #[async_trait::async_trait]
        impl WalletDriver for OtherWallet {
            async fn derive_account(
                &self,
                _seed: &SeedContext,
                _network: &str,
                _config: &ModuleConfig,
            ) -> Result<Arc<dyn Account>> {
                Ok(Arc::new(FixedAccount("other".to_string())))
            }
        }

        let mut engine = Engine::new("abandon abandon about").unwrap();
        engine.register_wallet("bitcoin", Arc::new(TestWallet), json!({}));
        engine.register_wallet("bitcoin", Arc::new(OtherWallet), json!({}));

        let account = engine.account("bitcoin").await.unwrap();
        assert_eq!(account.address().await.unwrap(), "other");
    }
}
