//! Single-mutable-session state machine.
//!
//! At most one session exists process-wide. `start` replaces the session
//! wholesale (the prior instance is disposed before any validation, so a
//! failed start leaves no session at all, never a partially registered
//! one). Handlers snapshot the current session `Arc` at entry; a
//! concurrent replacement does not disturb requests already in flight —
//! they finish against the session they captured.

use std::sync::Arc;

use tokio::sync::RwLock;
use walletkit_engine::{Engine, ModuleKind, SessionAccount};
use walletkit_rpc::{ModuleBinding, ModuleRole, StartRequest};

use crate::error::{Result, WorkletError};
use crate::registry::ModuleRegistry;

/// A live binding between a seed-derived engine and its registered
/// modules. Exclusively owned by the [`SessionManager`]; handlers only
/// ever hold shared snapshots.
pub struct Session {
    engine: Engine,
    bindings: Vec<ModuleBinding>,
}

impl Session {
    /// Bindings registered when this session was started.
    pub fn bindings(&self) -> &[ModuleBinding] {
        &self.bindings
    }

    /// Resolve the account capability for a network.
    pub async fn account(&self, network: &str) -> walletkit_engine::Result<SessionAccount> {
        self.engine.account(network).await
    }

    /// Release the session's resources. Idempotent.
    pub fn dispose(&self) {
        self.engine.dispose();
    }
}

/// Owns the single active session and the static module registry.
pub struct SessionManager {
    registry: ModuleRegistry,
    current: RwLock<Option<Arc<Session>>>,
}

impl SessionManager {
    /// Create a manager in the `NoSession` state.
    pub fn new(registry: ModuleRegistry) -> Self {
        Self {
            registry,
            current: RwLock::new(None),
        }
    }

    /// Start a new session, replacing (and disposing) any existing one.
    ///
    /// Every item must resolve in the module registry with a matching
    /// role; the first miss aborts the whole operation and leaves the
    /// manager in `NoSession`. Returns one [`ModuleBinding`] per item.
    pub async fn start(&self, init: StartRequest) -> Result<Vec<ModuleBinding>> {
        let mut slot = self.current.write().await;

        if let Some(old) = slot.take() {
            tracing::info!("disposing existing session before replacement");
            old.dispose();
        }

        let mut engine = Engine::new(&init.seed_phrase)?;
        let mut bindings = Vec::with_capacity(init.items.len());

        for item in &init.items {
            let module =
                self.registry
                    .get(&item.module_name)
                    .ok_or_else(|| WorkletError::ModuleNotFound {
                        module: item.module_name.clone(),
                    })?;

            match (item.role, module) {
                (ModuleRole::Wallet, ModuleKind::Wallet(driver)) => {
                    engine.register_wallet(&item.network, Arc::clone(driver), item.config.clone());
                }
                (ModuleRole::Protocol, ModuleKind::Protocol(driver)) => {
                    engine.register_protocol(
                        &item.network,
                        &item.name,
                        Arc::clone(driver),
                        item.config.clone(),
                    );
                }
                _ => {
                    return Err(WorkletError::RoleMismatch {
                        module: item.module_name.clone(),
                        role: item.role,
                    });
                }
            }

            tracing::debug!(
                module = %item.module_name,
                network = %item.network,
                role = %item.role,
                "module registered"
            );
            bindings.push(ModuleBinding {
                role: item.role,
                network: item.network.clone(),
                name: item.name.clone(),
                module_name: item.module_name.clone(),
            });
        }

        *slot = Some(Arc::new(Session {
            engine,
            bindings: bindings.clone(),
        }));
        tracing::info!(modules = bindings.len(), "session started");

        Ok(bindings)
    }

    /// Snapshot the current session, if any. Callers keep the snapshot for
    /// the duration of one request; replacement does not cancel them.
    pub async fn session(&self) -> Option<Arc<Session>> {
        self.current.read().await.clone()
    }

    /// True while a session is active.
    pub async fn has_session(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Dispose the current session, if any. Idempotent no-op otherwise.
    pub async fn dispose(&self) {
        if let Some(old) = self.current.write().await.take() {
            old.dispose();
        }
    }

    /// The static module registry.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}
