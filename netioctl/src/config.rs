//! Layered configuration resolution
//!
//! Every parameter is resolved through four ordered tiers: explicit CLI
//! argument, `NETIO_*` environment variable, config-file section (device
//! alias first, then `[default]`), and finally a built-in default. For
//! credential parameters an empty value at a higher tier falls through to
//! the next tier instead of masking a usable value below it; free-form
//! parameters take the higher tier verbatim, empty or not.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use netio_core::{NetioError, Result};

use crate::cli::Cli;

/// Request timeout applied when no tier supplies one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Shared config-file section consulted after the device-alias section.
const DEFAULT_SECTION: &str = "default";

/// Endpoint path appended when the device URL has none.
const DEFAULT_ENDPOINT_PATH: &str = "/netio.json";

/// TLS trust policy for the device endpoint.
///
/// A CA bundle and skipped verification are mutually exclusive; skipping
/// is an explicit opt-in, never a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TlsPolicy {
    /// Verify against the system root store
    #[default]
    System,
    /// Verify against the given PEM bundle
    CaBundle(PathBuf),
    /// Skip certificate verification entirely
    Insecure,
}

/// The merged runtime configuration. Built once per invocation and
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Device endpoint, path included
    pub url: Url,
    /// HTTP Basic username
    pub user: String,
    /// HTTP Basic password
    pub password: String,
    /// TLS trust policy
    pub tls: TlsPolicy,
    /// Suppress the warning emitted when verification is skipped
    pub suppress_cert_warning: bool,
    /// CLI verbosity (count of `-v`)
    pub verbosity: u8,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ResolvedConfig {
    /// Start a programmatic builder for library callers who do not go
    /// through the CLI tiers.
    pub fn builder(url: &str) -> Result<ConfigBuilder> {
        Ok(ConfigBuilder {
            url: parse_endpoint(url)?,
            user: None,
            password: None,
            tls: TlsPolicy::default(),
            suppress_cert_warning: false,
            verbosity: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Resolve the effective configuration for a CLI invocation.
    ///
    /// Performs no network I/O; a required parameter missing at every
    /// tier fails here, before any request is issued.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match config_file_path(cli) {
            Some(path) => Some(ConfigFile::load(&path)?),
            None => None,
        };

        let (url, alias) = resolve_device(&cli.device, file.as_ref())?;

        let resolver = Resolver {
            cli,
            file: file.as_ref(),
            alias: &alias,
        };

        let user = resolver
            .resolve(Param::User)
            .map(|(value, _)| value)
            .ok_or_else(|| missing_required("username", "--user", "NETIO_USER", "user"))?;
        let password = resolver
            .resolve(Param::Password)
            .map(|(value, _)| value)
            .ok_or_else(|| missing_required("password", "--password", "NETIO_PASSWORD", "password"))?;

        let cert = resolver.resolve(Param::Cert);
        let insecure = resolver
            .resolve(Param::Insecure)
            .map(|(value, _)| parse_bool(&value))
            .unwrap_or(false);

        if cert.is_some() && insecure {
            return Err(NetioError::Config(
                "a certificate bundle and skipped verification are mutually exclusive".to_string(),
            ));
        }

        let tls = match cert {
            Some((path, origin)) => {
                let path = PathBuf::from(path);
                // A relative bundle path from the config file is taken
                // relative to the file itself, not the working directory.
                let path = match (origin, file.as_ref()) {
                    (Origin::File, Some(file)) if path.is_relative() => file.base_dir.join(path),
                    _ => path,
                };
                TlsPolicy::CaBundle(path)
            }
            None if insecure => TlsPolicy::Insecure,
            None => TlsPolicy::System,
        };

        let suppress_cert_warning = resolver
            .resolve(Param::NoCertWarning)
            .map(|(value, _)| parse_bool(&value))
            .unwrap_or(false);

        let timeout_secs = match resolver.resolve(Param::Timeout) {
            Some((value, _)) => value.parse::<u64>().map_err(|_| {
                NetioError::Config(format!("invalid timeout '{value}' (expected seconds)"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            url,
            user,
            password,
            tls,
            suppress_cert_warning,
            verbosity: cli.verbose,
            timeout_secs,
        })
    }
}

/// Builder for constructing a [`ResolvedConfig`] without the CLI tiers.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    url: Url,
    user: Option<String>,
    password: Option<String>,
    tls: TlsPolicy,
    suppress_cert_warning: bool,
    verbosity: u8,
    timeout_secs: u64,
}

impl ConfigBuilder {
    /// Set the HTTP Basic credentials.
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Set the TLS trust policy.
    pub fn tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build the final configuration.
    ///
    /// Fails with a configuration error if credentials are missing or
    /// empty: the device rejects unauthenticated requests, so this is
    /// caught before any network call.
    pub fn build(self) -> Result<ResolvedConfig> {
        let user = self
            .user
            .filter(|u| !u.is_empty())
            .ok_or_else(|| NetioError::Config("no username provided".to_string()))?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| NetioError::Config("no password provided".to_string()))?;

        Ok(ResolvedConfig {
            url: self.url,
            user,
            password,
            tls: self.tls,
            suppress_cert_warning: self.suppress_cert_warning,
            verbosity: self.verbosity,
            timeout_secs: self.timeout_secs,
        })
    }
}

/// A resolvable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Param {
    User,
    Password,
    Cert,
    Insecure,
    NoCertWarning,
    Timeout,
}

impl Param {
    fn env_name(self) -> &'static str {
        match self {
            Param::User => "NETIO_USER",
            Param::Password => "NETIO_PASSWORD",
            Param::Cert => "NETIO_CERT",
            Param::Insecure => "NETIO_INSECURE",
            Param::NoCertWarning => "NETIO_NO_CERT_WARNING",
            Param::Timeout => "NETIO_TIMEOUT",
        }
    }

    /// Credentials treat an empty value as absent so an invoking script
    /// exporting an empty variable cannot mask a config-file value.
    fn is_credential(self) -> bool {
        matches!(self, Param::User | Param::Password)
    }

    fn default_value(self) -> Option<&'static str> {
        match self {
            Param::Insecure | Param::NoCertWarning => Some("false"),
            Param::Timeout => Some("10"),
            _ => None,
        }
    }
}

/// Which tier produced a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Argument,
    Environment,
    File,
    Default,
}

/// Ordered tier chain over the loaded sources. Each tier yields a
/// uniform found/not-found result; the first hit wins.
struct Resolver<'a> {
    cli: &'a Cli,
    file: Option<&'a ConfigFile>,
    alias: &'a str,
}

impl Resolver<'_> {
    fn resolve(&self, param: Param) -> Option<(String, Origin)> {
        let tiers = [
            (Origin::Argument, self.argument(param)),
            (Origin::Environment, env::var(param.env_name()).ok()),
            (
                Origin::File,
                self.file.and_then(|f| f.get(self.alias, param)),
            ),
            (Origin::Default, param.default_value().map(str::to_string)),
        ];

        tiers.into_iter().find_map(|(origin, value)| {
            let value = value?;
            if param.is_credential() && value.is_empty() {
                None
            } else {
                Some((value, origin))
            }
        })
    }

    fn argument(&self, param: Param) -> Option<String> {
        match param {
            Param::User => self.cli.user.clone(),
            Param::Password => self.cli.password.clone(),
            Param::Cert => self.cli.cert.clone(),
            // Flags have no explicit "absent" spelling on the command
            // line; false means not given and falls through.
            Param::Insecure => self.cli.insecure.then(|| "true".to_string()),
            Param::NoCertWarning => self.cli.no_cert_warning.then(|| "true".to_string()),
            Param::Timeout => self.cli.timeout.map(|t| t.to_string()),
        }
    }
}

/// One section of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
struct Section {
    url: Option<String>,
    user: Option<String>,
    password: Option<String>,
    cert: Option<String>,
    insecure: Option<bool>,
    no_cert_warning: Option<bool>,
    timeout: Option<u64>,
}

/// Parsed configuration file: a `[default]` section plus one section per
/// device alias or host.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    sections: HashMap<String, Section>,
    base_dir: PathBuf,
}

impl ConfigFile {
    /// Load and parse a configuration file. A supplied but unreadable or
    /// malformed file is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            NetioError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let sections: HashMap<String, Section> = toml::from_str(&content).map_err(|e| {
            NetioError::Config(format!("cannot parse config file {}: {e}", path.display()))
        })?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        Ok(Self { sections, base_dir })
    }

    /// Device URL stored under an alias section, if any.
    fn device_url(&self, alias: &str) -> Option<String> {
        self.sections.get(alias).and_then(|s| s.url.clone())
    }

    /// Look a parameter up in the alias section, falling back to
    /// `[default]`.
    fn get(&self, alias: &str, param: Param) -> Option<String> {
        self.section_value(alias, param)
            .or_else(|| self.section_value(DEFAULT_SECTION, param))
    }

    fn section_value(&self, name: &str, param: Param) -> Option<String> {
        let section = self.sections.get(name)?;
        match param {
            Param::User => section.user.clone(),
            Param::Password => section.password.clone(),
            Param::Cert => section.cert.clone(),
            Param::Insecure => section.insecure.map(|b| b.to_string()),
            Param::NoCertWarning => section.no_cert_warning.map(|b| b.to_string()),
            Param::Timeout => section.timeout.map(|t| t.to_string()),
        }
    }
}

/// Config-file path: `--config` first, `NETIO_CONFIG` second.
fn config_file_path(cli: &Cli) -> Option<PathBuf> {
    cli.config
        .clone()
        .or_else(|| env::var("NETIO_CONFIG").ok().map(PathBuf::from))
}

/// Turn the positional DEVICE argument into an endpoint URL and the
/// section name used for config-file lookups.
///
/// A literal URL uses its `host[:port]` as the section name; anything
/// else is treated as an alias naming a section that must carry a `url`
/// key.
fn resolve_device(device: &str, file: Option<&ConfigFile>) -> Result<(Url, String)> {
    if device.contains("://") {
        let url = parse_endpoint(device)?;
        let alias = netloc(&url);
        return Ok((url, alias));
    }

    let raw = file.and_then(|f| f.device_url(device)).ok_or_else(|| {
        NetioError::Config(format!(
            "unknown device alias '{device}' (no config section with a 'url' key)"
        ))
    })?;

    Ok((parse_endpoint(&raw)?, device.to_string()))
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| NetioError::Config(format!("invalid device URL '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(NetioError::Config(format!(
                "unsupported URL scheme '{other}' (expected http or https)"
            )))
        }
    }

    Ok(with_default_path(url))
}

fn with_default_path(mut url: Url) -> Url {
    if url.path().is_empty() || url.path() == "/" {
        url.set_path(DEFAULT_ENDPOINT_PATH);
    }
    url
}

fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn missing_required(what: &str, flag: &str, env_name: &str, key: &str) -> NetioError {
    NetioError::Config(format!(
        "no {what} resolved: pass {flag}, set {env_name}, or add '{key}' to the config file"
    ))
}
