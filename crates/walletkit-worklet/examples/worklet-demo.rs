//! Minimal worklet — serves the command protocol on a Unix socket with
//! deterministic stub modules.
//!
//! Run with:
//!   cargo run --example worklet-demo
//!
//! The socket path is printed on startup; a host can then frame commands
//! at it (PING, START, GET_ADDRESS, QUOTE_LENDING_SUPPLY).

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tokio::net::UnixListener;
use walletkit_engine::{
    Account, LendingProtocol, ModuleConfig, ProtocolDriver, SeedContext, WalletDriver,
};
use walletkit_worklet::logging::{init_logging, LogFormat, LogLevel};
use walletkit_worklet::registry::{AAVE_EVM, BTC, EVM};
use walletkit_worklet::{Dispatcher, ModuleRegistry};

/// Derives a printable placeholder address from the seed word count.
struct StubWallet;

struct StubAccount {
    address: String,
}

#[async_trait::async_trait]
impl Account for StubAccount {
    async fn address(&self) -> walletkit_engine::Result<String> {
        Ok(self.address.clone())
    }
}

#[async_trait::async_trait]
impl WalletDriver for StubWallet {
    async fn derive_account(
        &self,
        seed: &SeedContext,
        network: &str,
        _config: &ModuleConfig,
    ) -> walletkit_engine::Result<Arc<dyn Account>> {
        Ok(Arc::new(StubAccount {
            address: format!("{network}-demo-{}", seed.word_count()),
        }))
    }
}

struct StubLending;

#[async_trait::async_trait]
impl LendingProtocol for StubLending {
    async fn quote_supply(
        &self,
        token: &str,
        amount: &serde_json::Value,
    ) -> walletkit_engine::Result<serde_json::Value> {
        Ok(json!({"token": token, "amount": amount, "apy": "3.1"}))
    }
}

struct StubProtocol;

#[async_trait::async_trait]
impl ProtocolDriver for StubProtocol {
    async fn bind(
        &self,
        _seed: &SeedContext,
        _network: &str,
        _config: &ModuleConfig,
    ) -> walletkit_engine::Result<Arc<dyn LendingProtocol>> {
        Ok(Arc::new(StubLending))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::Text, LogLevel::Debug);

    let sock_dir = std::env::temp_dir().join(format!("walletkit-demo-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let sock_path = sock_dir.join("worklet.sock");

    // Ensure no stale socket
    let _ = fs::remove_file(&sock_path);

    let registry = ModuleRegistry::builder()
        .wallet(BTC, Arc::new(StubWallet))
        .wallet(EVM, Arc::new(StubWallet))
        .protocol(AAVE_EVM, Arc::new(StubProtocol))
        .build();
    let dispatcher = Dispatcher::new(registry);

    let listener = UnixListener::bind(&sock_path)?;
    eprintln!("Worklet listening on {}", sock_path.display());

    // Serve one host connection and exit when it closes.
    let (stream, _addr) = listener.accept().await?;
    dispatcher.serve(stream).await?;

    let _ = fs::remove_dir_all(&sock_dir);
    Ok(())
}
