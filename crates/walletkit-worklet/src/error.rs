use walletkit_rpc::ModuleRole;

/// Errors that can occur while dispatching worklet commands.
#[derive(Debug, thiserror::Error)]
pub enum WorkletError {
    /// Frame-level error on the host channel.
    #[error("rpc error: {0}")]
    Rpc(#[from] walletkit_rpc::RpcError),

    /// Failure raised by the session engine or a module capability.
    #[error("engine error: {0}")]
    Engine(#[from] walletkit_engine::EngineError),

    /// A START item referenced a module identifier the registry does not
    /// hold. Fails the entire start operation.
    #[error("module not found: {module}")]
    ModuleNotFound { module: String },

    /// A START item's declared role does not match the registered module.
    #[error("module '{module}' is not registered as a {role} module")]
    RoleMismatch { module: String, role: ModuleRole },

    /// The command code maps to no handler.
    #[error("unknown command code {0}")]
    UnknownCommand(u16),

    /// The request payload could not be parsed.
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WorkletError>;
