use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::sources::{ConfigChain, BASE_PATH_PARAM, BIND_PARAM, STORE_ROOT_PARAM};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store_root: PathBuf,
    /// Mount prefix, `""` for the site root.
    pub base_path: String,
}

impl ServerConfig {
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: default_bind_addr(),
            store_root: store_root.into(),
            base_path: String::new(),
        }
    }

    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    /// Resolve the configuration from `chain`. The store root is required.
    pub fn from_sources(chain: &ConfigChain) -> ServerResult<Self> {
        let store_root = chain.require(STORE_ROOT_PARAM)?;
        let mut config = Self::new(store_root);
        if let Some(bind) = chain.lookup(BIND_PARAM)? {
            let addr = bind
                .parse()
                .map_err(|e| ServerError::Config(format!("{BIND_PARAM}={bind}: {e}")))?;
            config = config.with_bind_addr(addr);
        }
        if let Some(base_path) = chain.lookup(BASE_PATH_PARAM)? {
            config = config.with_base_path(&base_path);
        }
        Ok(config)
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// `store/` -> `/store`, `/` -> ``.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MapSource;

    #[test]
    fn new_config_defaults() {
        let c = ServerConfig::new("/data");
        assert_eq!(c.bind_addr, DEFAULT_BIND_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(c.store_root, PathBuf::from("/data"));
        assert_eq!(c.base_path, "");
    }

    #[test]
    fn base_path_normalization() {
        assert_eq!(normalize_base_path(""), "");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("store"), "/store");
        assert_eq!(normalize_base_path("/store/"), "/store");
        assert_eq!(normalize_base_path("/a/b"), "/a/b");
    }

    #[test]
    fn from_sources_reads_all_params() {
        let chain = ConfigChain::new().with(
            MapSource::new("cli")
                .set(STORE_ROOT_PARAM, "/data")
                .set(BIND_PARAM, "0.0.0.0:9000")
                .set(BASE_PATH_PARAM, "store/"),
        );
        let c = ServerConfig::from_sources(&chain).unwrap();
        assert_eq!(c.store_root, PathBuf::from("/data"));
        assert_eq!(c.bind_addr, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.base_path, "/store");
    }

    #[test]
    fn from_sources_requires_root() {
        let chain = ConfigChain::new().with(MapSource::new("cli").set(BIND_PARAM, "0.0.0.0:9000"));
        assert!(matches!(
            ServerConfig::from_sources(&chain),
            Err(ServerError::StartupConfigMissing { .. })
        ));
    }

    #[test]
    fn from_sources_rejects_bad_bind() {
        let chain = ConfigChain::new().with(
            MapSource::new("cli")
                .set(STORE_ROOT_PARAM, "/data")
                .set(BIND_PARAM, "not-an-address"),
        );
        assert!(matches!(ServerConfig::from_sources(&chain), Err(ServerError::Config(_))));
    }
}
