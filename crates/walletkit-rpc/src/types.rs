//! JSON payload types carried inside command frames.
//!
//! Field names keep the host-visible camelCase contract (`seedPhrase`,
//! `moduleName`). Amounts pass through uninterpreted; validation belongs to
//! the downstream module, not this layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::envelope::ModuleRole;

/// START payload: seed phrase plus the modules to register against it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// Secret seed phrase. Redacted in debug output.
    pub seed_phrase: String,
    /// Modules to register; missing on the wire means none.
    #[serde(default)]
    pub items: Vec<ModuleMetadata>,
}

/// One module registration request inside a START payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetadata {
    #[serde(rename = "type")]
    pub role: ModuleRole,
    /// Display name; doubles as the protocol lookup key for protocol modules.
    pub name: String,
    /// Module registry identifier.
    pub module_name: String,
    pub network: String,
    /// Opaque module configuration, forwarded unmodified.
    #[serde(default)]
    pub config: serde_json::Value,
}

/// Addressing half of a QUOTE_LENDING_SUPPLY payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    pub chain: String,
    pub name: String,
}

/// Supply half of a QUOTE_LENDING_SUPPLY payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyOptions {
    pub token: String,
    /// Caller-supplied amount, passed through uninterpreted.
    pub amount: serde_json::Value,
}

impl fmt::Debug for StartRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartRequest")
            .field(
                "seed_phrase",
                &format_args!("<redacted:{} bytes>", self.seed_phrase.len()),
            )
            .field("items", &self.items)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn start_request_parses_host_payload() {
        let payload = json!({
            "seedPhrase": "abandon abandon about",
            "items": [{
                "type": "wallet",
                "name": "main",
                "moduleName": "btc",
                "network": "bitcoin",
                "config": {"indexer": "https://example.invalid"}
            }]
        });

        let request: StartRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(request.seed_phrase, "abandon abandon about");
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].role, ModuleRole::Wallet);
        assert_eq!(request.items[0].module_name, "btc");
    }

    #[test]
    fn start_request_defaults_missing_items() {
        let request: StartRequest =
            serde_json::from_value(json!({"seedPhrase": "abandon"})).unwrap();
        assert!(request.items.is_empty());
    }

    #[test]
    fn quote_payload_parses_two_element_array() {
        let payload = json!([
            {"chain": "ethereum", "name": "aave"},
            {"token": "usdt", "amount": 1500}
        ]);

        let (info, options): (ProtocolInfo, SupplyOptions) =
            serde_json::from_value(payload).unwrap();
        assert_eq!(info.chain, "ethereum");
        assert_eq!(info.name, "aave");
        assert_eq!(options.token, "usdt");
        assert_eq!(options.amount, json!(1500));
    }

    #[test]
    fn amount_passes_through_uninterpreted() {
        let options: SupplyOptions =
            serde_json::from_value(json!({"token": "usdt", "amount": "1500.25"})).unwrap();
        assert_eq!(options.amount, json!("1500.25"));
    }

    #[test]
    fn debug_output_redacts_seed_phrase() {
        let request = StartRequest {
            seed_phrase: "super secret words".to_string(),
            items: Vec::new(),
        };
        let debug = format!("{request:?}");
        assert!(debug.contains("<redacted:18 bytes>"));
        assert!(!debug.contains("super secret words"));
    }
}
