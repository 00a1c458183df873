/// Errors that can occur in engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The seed phrase failed basic validation.
    #[error("invalid seed phrase: {0}")]
    InvalidSeed(String),

    /// No wallet module is registered for the network.
    #[error("no wallet registered for network '{network}'")]
    NoWallet { network: String },

    /// No protocol with that name is registered for the network.
    #[error("no protocol '{name}' registered for network '{network}'")]
    NoProtocol { network: String, name: String },

    /// The engine was disposed; its session is no longer usable.
    #[error("engine disposed")]
    Disposed,

    /// Failure raised by a module driver.
    #[error("module error: {0}")]
    Module(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
