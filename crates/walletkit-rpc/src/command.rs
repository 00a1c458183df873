//! Command codes understood by the worklet dispatcher.
//!
//! The code set is fixed; unknown codes are answered with an error
//! envelope rather than silently dropped.

/// Liveness probe. Replies with a bare greeting string, not JSON.
pub const PING: u16 = 0;

/// Initialize (or replace) the session from a seed phrase and module list.
pub const START: u16 = 1;

/// Concurrent multi-chain address lookup.
pub const GET_ADDRESS: u16 = 2;

/// Quote a lending-supply operation against a named protocol.
pub const QUOTE_LENDING_SUPPLY: u16 = 3;

/// Returns a human-readable name for a command code.
pub fn command_name(code: u16) -> &'static str {
    match code {
        PING => "PING",
        START => "START",
        GET_ADDRESS => "GET_ADDRESS",
        QUOTE_LENDING_SUPPLY => "QUOTE_LENDING_SUPPLY",
        _ => "UNKNOWN",
    }
}

/// Returns true if the code maps to a dispatchable command.
pub fn is_known(code: u16) -> bool {
    code <= QUOTE_LENDING_SUPPLY
}
