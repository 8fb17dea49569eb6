//! Client configuration: YAML, parsed strictly, validated before use.

pub mod schema;

use std::path::Path;

use subwire_core::error::{Result, SubwireError};

pub use schema::{ClientConfig, KeepaliveMode, SessionSection, TransportSection};

/// Read and validate the client config at `path`.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<ClientConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        SubwireError::Config(format!("client config {}: {e}", path.display()))
    })?;
    load_from_str(&text).map_err(|e| match e {
        SubwireError::Config(msg) => SubwireError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn load_from_str(text: &str) -> Result<ClientConfig> {
    let cfg: ClientConfig = serde_yaml::from_str(text)
        .map_err(|e| SubwireError::Config(format!("client config yaml: {e}")))?;
    cfg.validate()?;
    tracing::debug!(version = cfg.version, path = %cfg.transport.path, "client config loaded");
    Ok(cfg)
}
