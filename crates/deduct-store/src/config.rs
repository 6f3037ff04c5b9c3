//! `deduct.toml`: server, reasoner and application settings.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, StoreError};

pub const CONFIG_FILE: &str = "deduct.toml";
pub const CONFIG_ENV: &str = "DEDUCT_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub reasoner: ReasonerConfig,
    #[serde(default)]
    pub app: AppConfig,
    /// Directory that relative application paths resolve against.
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: SocketAddr,
    /// Origin used to build request URLs. Falls back to the `Host` header.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonerKind {
    Process,
    Http,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReasonerConfig {
    #[serde(default = "default_kind")]
    pub kind: ReasonerKind,
    /// Executable for `kind = "process"`.
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments placed before the document paths.
    #[serde(default)]
    pub args: Vec<String>,
    /// Endpoint for `kind = "http"`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Ground fact files, merged in order.
    #[serde(default)]
    pub ground: Vec<PathBuf>,
    /// Rule files, handed to the reasoner verbatim in order.
    #[serde(default)]
    pub rules: Vec<PathBuf>,
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_kind() -> ReasonerKind {
    ReasonerKind::Process
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            base_url: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            command: Some("eye".to_string()),
            args: ["--nope", "--quiet", "--pass-all"]
                .into_iter()
                .map(String::from)
                .collect(),
            url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ReasonerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            reasoner: ReasonerConfig::default(),
            app: AppConfig::default(),
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Parse config text. `root` anchors relative application paths.
    pub fn parse(text: &str, root: &Path, origin: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text).map_err(|e| StoreError::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.root = root.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| StoreError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let root = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let config = Self::parse(&text, root, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Locate and load the config: `explicit`, then `$DEDUCT_CONFIG`, then
    /// `./deduct.toml`. With none of them present, built-in defaults apply.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::discover_in(explicit, env.as_deref(), Path::new("."))
    }

    pub fn discover_in(explicit: Option<&Path>, env: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit.or(env) {
            return Self::load(path);
        }
        let local = cwd.join(CONFIG_FILE);
        if local.is_file() {
            return Self::load(&local);
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self {
            root: cwd.to_path_buf(),
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        let reasoner = &self.reasoner;
        match reasoner.kind {
            ReasonerKind::Process => {
                if reasoner.command.as_deref().is_none_or(str::is_empty) {
                    return Err(StoreError::Invalid(
                        "reasoner kind \"process\" needs a command".into(),
                    ));
                }
                if reasoner.url.is_some() {
                    return Err(StoreError::Invalid(
                        "reasoner kind \"process\" does not take a url".into(),
                    ));
                }
            }
            ReasonerKind::Http => {
                if reasoner.url.as_deref().is_none_or(str::is_empty) {
                    return Err(StoreError::Invalid("reasoner kind \"http\" needs a url".into()));
                }
                if reasoner.command.is_some() || !reasoner.args.is_empty() {
                    return Err(StoreError::Invalid(
                        "reasoner kind \"http\" does not take a command or args".into(),
                    ));
                }
            }
        }
        if reasoner.timeout_ms == 0 {
            return Err(StoreError::Invalid("reasoner timeout_ms must be positive".into()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(StoreError::Invalid("server max_body_bytes must be positive".into()));
        }
        Ok(())
    }

    /// Ground fact paths, resolved against [`Config::root`].
    pub fn ground_paths(&self) -> Vec<PathBuf> {
        self.app.ground.iter().map(|p| self.root.join(p)).collect()
    }

    /// Rule paths, resolved against [`Config::root`].
    pub fn rule_paths(&self) -> Vec<PathBuf> {
        self.app.rules.iter().map(|p| self.root.join(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config> {
        Config::parse(text, Path::new("/srv/app"), "test.toml")
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.server.addr.to_string(), "127.0.0.1:8000");
        assert_eq!(config.server.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.reasoner.kind, ReasonerKind::Process);
        assert_eq!(config.reasoner.command.as_deref(), Some("eye"));
        assert_eq!(config.reasoner.timeout(), Duration::from_secs(10));
        assert!(config.app.ground.is_empty());
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
            [server]
            addr = "0.0.0.0:9000"
            base_url = "https://example.org"
            max_body_bytes = 1024

            [reasoner]
            kind = "process"
            command = "/usr/bin/eye"
            args = ["--nope"]
            timeout_ms = 500

            [app]
            ground = ["ground.n3", "/abs/more.n3"]
            rules = ["rules/site.n3"]
            "#,
        )
        .unwrap();
        assert_eq!(config.server.addr.port(), 9000);
        assert_eq!(config.server.base_url.as_deref(), Some("https://example.org"));
        assert_eq!(config.reasoner.args, vec!["--nope".to_string()]);
        assert_eq!(config.reasoner.timeout(), Duration::from_millis(500));
        assert_eq!(
            config.ground_paths(),
            vec![PathBuf::from("/srv/app/ground.n3"), PathBuf::from("/abs/more.n3")]
        );
        assert_eq!(config.rule_paths(), vec![PathBuf::from("/srv/app/rules/site.n3")]);
    }

    #[test]
    fn test_http_reasoner() {
        let config = parse(
            r#"
            [reasoner]
            kind = "http"
            url = "http://127.0.0.1:9999/reason"
            "#,
        );
        // The process defaults (command, args) only apply when the table is absent.
        let config = config.unwrap();
        assert_eq!(config.reasoner.kind, ReasonerKind::Http);
        assert!(config.reasoner.command.is_none());
    }

    #[test]
    fn test_http_reasoner_needs_url() {
        let err = parse("[reasoner]\nkind = \"http\"").unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn test_process_reasoner_needs_command() {
        let err = parse("[reasoner]\nkind = \"process\"").unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = parse("[server]\nport = 80").unwrap_err();
        assert!(matches!(err, StoreError::ConfigParse { .. }));
        let err = parse("[extra]\nx = 1").unwrap_err();
        assert!(matches!(err, StoreError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = parse("[reasoner]\nkind = \"telepathy\"\ncommand = \"x\"").unwrap_err();
        assert!(matches!(err, StoreError::ConfigParse { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse("[reasoner]\ncommand = \"eye\"\ntimeout_ms = 0").unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn test_load_anchors_paths_at_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, "[app]\nground = [\"g.n3\"]\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.ground_paths(), vec![dir.path().join("g.n3")]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn test_discover_order() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        let env = dir.path().join("env.toml");
        std::fs::write(&explicit, "[server]\naddr = \"127.0.0.1:1001\"").unwrap();
        std::fs::write(&env, "[server]\naddr = \"127.0.0.1:1002\"").unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[server]\naddr = \"127.0.0.1:1003\"").unwrap();

        let port = |c: Config| c.server.addr.port();
        assert_eq!(
            port(Config::discover_in(Some(&explicit), Some(&env), dir.path()).unwrap()),
            1001
        );
        assert_eq!(port(Config::discover_in(None, Some(&env), dir.path()).unwrap()), 1002);
        assert_eq!(port(Config::discover_in(None, None, dir.path()).unwrap()), 1003);
    }

    #[test]
    fn test_discover_without_any_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover_in(None, None, dir.path()).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.root, dir.path());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::discover_in(Some(&missing), None, dir.path()).is_err());
    }
}
