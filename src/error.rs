use std::fmt;

/// Errors the engine surfaces to the host. Routine per-frame resource shortages
/// (`NodePoolExhausted`, `NoFreeSlot`) are never turned into an `EngineError`: they are absorbed
/// internally (logged, not propagated) by `split`/`recurs_render` themselves. Only startup
/// failures reach the host.
#[derive(Debug)]
pub enum EngineError {
    HeightmapLoadFailed(std::io::Error),
    InvalidConfiguration(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::HeightmapLoadFailed(e) => write!(f, "failed to load heightmap: {e}"),
            EngineError::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::HeightmapLoadFailed(e) => Some(e),
            EngineError::InvalidConfiguration(_) => None,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::HeightmapLoadFailed(e)
    }
}
