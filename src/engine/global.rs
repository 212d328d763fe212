//! Process-wide engine instance.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::{AuthenticityEngine, EngineError};
use crate::config::Config;

static ENGINE: OnceCell<Arc<AuthenticityEngine>> = OnceCell::new();

/// Builds the engine on the first call; later calls return the same instance
/// and ignore `config`.
pub fn init(config: &Config) -> Result<Arc<AuthenticityEngine>, EngineError> {
    ENGINE
        .get_or_try_init(|| AuthenticityEngine::from_config(config).map(Arc::new))
        .cloned()
}

pub fn get() -> Option<Arc<AuthenticityEngine>> {
    ENGINE.get().cloned()
}
