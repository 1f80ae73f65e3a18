//! Ordered configuration sources.
//!
//! A [`ConfigChain`] asks each [`ConfigSource`] in turn for a parameter and
//! takes the first value found. The launcher decides which sources exist and
//! in which order; the usual order is explicit values, then the process
//! environment, then a TOML file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ServerError, ServerResult};

/// Storage root directory. Required.
pub const STORE_ROOT_PARAM: &str = "simplestore.directory";
/// Listen address, `host:port`.
pub const BIND_PARAM: &str = "simplestore.bind";
/// Prefix the store is mounted under, e.g. `/store`.
pub const BASE_PATH_PARAM: &str = "simplestore.base_path";

/// A named place configuration values can come from.
pub trait ConfigSource: Send + Sync {
    fn name(&self) -> &str;

    /// Look up `param`. `Ok(None)` means this source has no value for it.
    fn lookup(&self, param: &str) -> ServerResult<Option<String>>;
}

/// Values supplied directly, e.g. from the command line.
pub struct MapSource {
    name: String,
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    pub fn set(mut self, param: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(param.into(), value.into());
        self
    }

    /// Set `param` only when `value` is present.
    pub fn set_opt(self, param: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.set(param, v),
            None => self,
        }
    }
}

impl ConfigSource for MapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, param: &str) -> ServerResult<Option<String>> {
        Ok(self.values.get(param).cloned())
    }
}

/// Process environment. `simplestore.directory` is read from
/// `SIMPLESTORE_DIRECTORY`.
pub struct EnvSource;

impl EnvSource {
    pub fn var_name(param: &str) -> String {
        param
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

impl ConfigSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn lookup(&self, param: &str) -> ServerResult<Option<String>> {
        Ok(std::env::var(Self::var_name(param)).ok())
    }
}

/// A TOML file. Dotted parameter names address nested tables, so
/// `simplestore.directory` is `directory` in the `[simplestore]` table.
///
/// A missing file is an empty source; an unreadable or malformed one is an
/// error.
pub struct TomlFileSource {
    name: String,
    table: Option<toml::Table>,
}

impl TomlFileSource {
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let name = format!("file:{}", path.display());
        if !path.exists() {
            debug!("Config file {} not present", path.display());
            return Ok(Self { name, table: None });
        }
        debug!("Searching {} for configuration", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::parse(name, &text)
    }

    pub fn parse(name: impl Into<String>, text: &str) -> ServerResult<Self> {
        let name = name.into();
        let table = text
            .parse::<toml::Table>()
            .map_err(|e| ServerError::Config(format!("{name}: {e}")))?;
        Ok(Self { name, table: Some(table) })
    }

    /// Default file location: `simplestore.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from("simplestore.toml")
    }
}

impl ConfigSource for TomlFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, param: &str) -> ServerResult<Option<String>> {
        let Some(table) = &self.table else {
            return Ok(None);
        };
        let mut parts = param.split('.').peekable();
        let mut current = table;
        while let Some(part) = parts.next() {
            let Some(value) = current.get(part) else {
                return Ok(None);
            };
            if parts.peek().is_none() {
                return match value {
                    toml::Value::String(s) => Ok(Some(s.clone())),
                    toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_) => {
                        Ok(Some(value.to_string()))
                    }
                    _ => Err(ServerError::Config(format!(
                        "{}: {param} must be a scalar value",
                        self.name
                    ))),
                };
            }
            match value {
                toml::Value::Table(t) => current = t,
                _ => return Ok(None),
            }
        }
        Ok(None)
    }
}

/// Ordered list of sources; the first one holding a value wins.
#[derive(Default)]
pub struct ConfigChain {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn lookup(&self, param: &str) -> ServerResult<Option<String>> {
        for source in &self.sources {
            if let Some(value) = source.lookup(param)? {
                debug!("Found {} in {}", param, source.name());
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Like [`lookup`](Self::lookup), but a missing value is fatal.
    pub fn require(&self, param: &str) -> ServerResult<String> {
        self.lookup(param)?.ok_or_else(|| ServerError::StartupConfigMissing {
            param: param.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_source_wins() {
        let chain = ConfigChain::new()
            .with(MapSource::new("cli").set(STORE_ROOT_PARAM, "/from/cli"))
            .with(MapSource::new("other").set(STORE_ROOT_PARAM, "/from/other"));
        assert_eq!(chain.require(STORE_ROOT_PARAM).unwrap(), "/from/cli");
    }

    #[test]
    fn falls_through_to_later_sources() {
        let chain = ConfigChain::new()
            .with(MapSource::new("cli"))
            .with(MapSource::new("file").set(STORE_ROOT_PARAM, "/from/file"));
        assert_eq!(chain.require(STORE_ROOT_PARAM).unwrap(), "/from/file");
        assert_eq!(chain.source_names(), vec!["cli", "file"]);
    }

    #[test]
    fn missing_required_value_is_fatal() {
        let chain = ConfigChain::new().with(MapSource::new("cli"));
        match chain.require(STORE_ROOT_PARAM) {
            Err(ServerError::StartupConfigMissing { param }) => assert_eq!(param, STORE_ROOT_PARAM),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn set_opt_skips_none() {
        let source = MapSource::new("cli").set_opt(BIND_PARAM, None::<String>);
        assert!(source.lookup(BIND_PARAM).unwrap().is_none());
    }

    #[test]
    fn env_var_names() {
        assert_eq!(EnvSource::var_name(STORE_ROOT_PARAM), "SIMPLESTORE_DIRECTORY");
        assert_eq!(EnvSource::var_name(BASE_PATH_PARAM), "SIMPLESTORE_BASE_PATH");
    }

    #[test]
    fn env_source_reads_process_environment() {
        std::env::set_var("SIMPLESTORE_TEST_ONLY_ENV_LOOKUP", "/from/env");
        let value = EnvSource.lookup("simplestore.test_only_env_lookup").unwrap();
        assert_eq!(value.as_deref(), Some("/from/env"));
        assert!(EnvSource.lookup("simplestore.test_only_unset").unwrap().is_none());
    }

    #[test]
    fn toml_nested_lookup() {
        let source = TomlFileSource::parse(
            "test",
            "[simplestore]\ndirectory = \"/var/lib/simplestore\"\nbind = \"0.0.0.0:9000\"\n",
        )
        .unwrap();
        assert_eq!(
            source.lookup(STORE_ROOT_PARAM).unwrap().as_deref(),
            Some("/var/lib/simplestore")
        );
        assert_eq!(source.lookup(BIND_PARAM).unwrap().as_deref(), Some("0.0.0.0:9000"));
        assert!(source.lookup(BASE_PATH_PARAM).unwrap().is_none());
        assert!(source.lookup("other.directory").unwrap().is_none());
    }

    #[test]
    fn toml_rejects_table_value() {
        let source = TomlFileSource::parse("test", "[simplestore.directory]\nx = 1\n").unwrap();
        assert!(matches!(source.lookup(STORE_ROOT_PARAM), Err(ServerError::Config(_))));
    }

    #[test]
    fn toml_malformed_is_error() {
        assert!(matches!(
            TomlFileSource::parse("test", "[simplestore\n"),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn toml_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = TomlFileSource::load(dir.path().join("absent.toml")).unwrap();
        assert!(source.lookup(STORE_ROOT_PARAM).unwrap().is_none());
    }

    #[test]
    fn toml_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simplestore.toml");
        std::fs::write(&path, "[simplestore]\ndirectory = \"/data\"\n").unwrap();
        let chain = ConfigChain::new()
            .with(MapSource::new("cli"))
            .with(TomlFileSource::load(&path).unwrap());
        assert_eq!(chain.require(STORE_ROOT_PARAM).unwrap(), "/data");
    }
}
