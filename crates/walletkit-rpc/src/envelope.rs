use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a registered module plays within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleRole {
    Wallet,
    Protocol,
}

impl fmt::Display for ModuleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleRole::Wallet => f.write_str("wallet"),
            ModuleRole::Protocol => f.write_str("protocol"),
        }
    }
}

/// One registered wallet or protocol module instance.
///
/// Immutable once created; the full set is collected into the START reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleBinding {
    #[serde(rename = "type")]
    pub role: ModuleRole,
    pub network: String,
    pub name: String,
    pub module_name: String,
}

/// The wire-visible outcome of a command, discriminated on `status`.
///
/// `ok`/`started` are success, `failed` is the recoverable no-session
/// condition, and `error` is the exceptional path produced at the dispatch
/// boundary. Exactly one envelope is written per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReplyEnvelope {
    Ok {
        data: serde_json::Value,
    },
    Started {
        modules: Vec<ModuleBinding>,
    },
    Failed {
        data: serde_json::Value,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<u16>,
    },
}

impl ReplyEnvelope {
    /// Success envelope carrying arbitrary JSON data.
    pub fn ok(data: serde_json::Value) -> Self {
        ReplyEnvelope::Ok { data }
    }

    /// START success envelope listing the registered modules.
    pub fn started(modules: Vec<ModuleBinding>) -> Self {
        ReplyEnvelope::Started { modules }
    }

    /// Recoverable no-session outcome. Distinct from an error.
    pub fn failed() -> Self {
        ReplyEnvelope::Failed {
            data: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Exceptional outcome produced at the dispatch boundary.
    pub fn error(message: impl Into<String>, command: Option<u16>) -> Self {
        ReplyEnvelope::Error {
            message: message.into(),
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ok_envelope_wire_shape() {
        let envelope = ReplyEnvelope::ok(json!({"btc": "bc1qexample"}));
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            wire,
            json!({"status": "ok", "data": {"btc": "bc1qexample"}})
        );
    }

    #[test]
    fn started_envelope_wire_shape() {
        let envelope = ReplyEnvelope::started(vec![ModuleBinding {
            role: ModuleRole::Wallet,
            network: "bitcoin".to_string(),
            name: "main".to_string(),
            module_name: "btc".to_string(),
        }]);
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            wire,
            json!({
                "status": "started",
                "modules": [{
                    "type": "wallet",
                    "network": "bitcoin",
                    "name": "main",
                    "moduleName": "btc"
                }]
            })
        );
    }

    #[test]
    fn failed_envelope_carries_empty_object() {
        let wire = serde_json::to_value(ReplyEnvelope::failed()).unwrap();
        assert_eq!(wire, json!({"status": "failed", "data": {}}));
    }

    #[test]
    fn error_envelope_omits_absent_command() {
        let wire = serde_json::to_value(ReplyEnvelope::error("boom", None)).unwrap();
        assert_eq!(wire, json!({"status": "error", "message": "boom"}));

        let wire = serde_json::to_value(ReplyEnvelope::error("boom", Some(3))).unwrap();
        assert_eq!(
            wire,
            json!({"status": "error", "message": "boom", "command": 3})
        );
    }

    #[test]
    fn envelope_roundtrips_through_json() {
        let envelope = ReplyEnvelope::ok(json!({"chain": "addr"}));
        let bytes = serde_json::to_vec(&envelope).unwrap();
        let back: ReplyEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn module_role_display_matches_wire_form() {
        assert_eq!(ModuleRole::Wallet.to_string(), "wallet");
        assert_eq!(ModuleRole::Protocol.to_string(), "protocol");
    }
}
