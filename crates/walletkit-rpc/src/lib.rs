//! Binary command framing and wire envelopes for the walletkit worklet.
//!
//! Every request and reply on the host channel is framed with:
//! - A 2-byte magic number ("WK") for stream synchronization
//! - A 4-byte little-endian payload length
//! - A 4-byte little-endian request id for request/reply correlation
//! - A 2-byte little-endian command code
//!
//! Replies may be written in any order; a reply echoes the request id and
//! command of the request it answers. Request/reply is strictly 1:1.

pub mod codec;
pub mod command;
pub mod envelope;
pub mod error;
pub mod types;

pub use codec::{decode_frame, encode_frame, Frame, RpcCodec, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use command::{command_name, is_known, GET_ADDRESS, PING, QUOTE_LENDING_SUPPLY, START};
pub use envelope::{ModuleBinding, ModuleRole, ReplyEnvelope};
pub use error::{Result, RpcError};
pub use types::{ModuleMetadata, ProtocolInfo, StartRequest, SupplyOptions};
