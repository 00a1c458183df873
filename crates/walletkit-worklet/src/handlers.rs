//! One handler per command code.
//!
//! Each handler is a pure orchestration over the session manager: it
//! snapshots the session at entry, works against that snapshot, and
//! returns a reply envelope. Failures it does not explicitly absorb
//! propagate to the dispatch boundary where they become error envelopes.

use std::sync::Arc;

use futures_util::future::join_all;
use walletkit_rpc::{ProtocolInfo, ReplyEnvelope, StartRequest, SupplyOptions};

use crate::error::Result;
use crate::session::SessionManager;

/// Fixed PING reply. Never changes, session or not.
pub const GREETING: &str = "hello from the other side";

/// PING: liveness probe with no session dependency.
pub fn ping() -> &'static str {
    GREETING
}

/// START: build a fresh session from the init payload.
pub async fn start(sessions: &SessionManager, init: StartRequest) -> Result<ReplyEnvelope> {
    let modules = sessions.start(init).await?;
    Ok(ReplyEnvelope::started(modules))
}

/// GET_ADDRESS: concurrent multi-chain address lookup.
///
/// All per-chain lookups launch before any is awaited and all settle
/// before the aggregate reply is produced, so latency is bounded by the
/// slowest chain and no single failure blocks or cancels siblings. Failed
/// chains are logged and omitted from the reply; partial data beats an
/// all-or-nothing failure.
pub async fn get_address(sessions: &SessionManager, chains: Vec<String>) -> Result<ReplyEnvelope> {
    let Some(session) = sessions.session().await else {
        return Ok(ReplyEnvelope::failed());
    };

    let lookups = chains.iter().map(|chain| {
        let session = Arc::clone(&session);
        let chain = chain.clone();
        async move {
            let account = session.account(&chain).await?;
            account.address().await
        }
    });

    let mut data = serde_json::Map::new();
    for (chain, outcome) in chains.iter().zip(join_all(lookups).await) {
        match outcome {
            Ok(address) => {
                data.insert(chain.clone(), serde_json::Value::String(address));
            }
            Err(err) => {
                tracing::warn!(chain = %chain, error = %err, "address lookup failed");
            }
        }
    }

    Ok(ReplyEnvelope::ok(serde_json::Value::Object(data)))
}

/// QUOTE_LENDING_SUPPLY: quote a supply against a named protocol.
///
/// A single operation, not a fan-out: any failure in the resolution chain
/// propagates to the dispatch boundary.
pub async fn quote_lending_supply(
    sessions: &SessionManager,
    info: ProtocolInfo,
    options: SupplyOptions,
) -> Result<ReplyEnvelope> {
    let Some(session) = sessions.session().await else {
        return Ok(ReplyEnvelope::failed());
    };

    let account = session.account(&info.chain).await?;
    let protocol = account.lending_protocol(&info.name).await?;
    let quote = protocol.quote_supply(&options.token, &options.amount).await?;

    Ok(ReplyEnvelope::ok(quote))
}
