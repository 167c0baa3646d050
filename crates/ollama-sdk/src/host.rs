//! Host normalization.
//!
//! Users configure the server loosely: `localhost`, `example.com:8080/ollama`,
//! `https://example.com`, `[::1]`. [`BaseUrl::parse`] turns any of these into
//! an explicit `scheme://host:port[/path]` prefix for every endpoint path.
//!
//! Port resolution follows the reference client:
//! - no scheme given: explicit port, else `11434`
//! - scheme given: explicit port, else `80` for `http`, `443` for `https`,
//!   `11434` for anything else
//!
//! Normalization never fails. Input that cannot be read as a host falls back
//! to `scheme://127.0.0.1:11434`.

use std::fmt;

/// Port the Ollama server listens on by default.
pub const DEFAULT_PORT: u16 = 11434;

/// Base URL used when no host is configured anywhere.
pub const DEFAULT_HOST: &str = "http://127.0.0.1:11434";

const FALLBACK_HOST: &str = "127.0.0.1";

/// A canonical base URL with an always-resolved port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl {
    scheme: String,
    host: String,
    port: u16,
    path: String,
}

impl BaseUrl {
    /// Normalize a raw host string. Returns `None` only for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (scheme, remainder, explicit_scheme) = match raw.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() => (scheme.to_ascii_lowercase(), rest, true),
            Some((_, rest)) => ("http".to_string(), rest, true),
            None => ("http".to_string(), raw, false),
        };

        let Some(authority) = Authority::parse(remainder) else {
            return Some(Self::fallback(scheme));
        };

        let port = match authority.port {
            Some(port) => port,
            None if !explicit_scheme => DEFAULT_PORT,
            None => match scheme.as_str() {
                "http" => 80,
                "https" => 443,
                _ => DEFAULT_PORT,
            },
        };

        Some(Self {
            scheme,
            host: authority.host,
            port,
            path: authority.path.trim_matches('/').to_string(),
        })
    }

    fn fallback(scheme: String) -> Self {
        Self {
            scheme,
            host: FALLBACK_HOST.to_string(),
            port: DEFAULT_PORT,
            path: String::new(),
        }
    }

    /// `http`, `https`, or whatever scheme the user supplied.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host name or address; IPv6 literals are bracketed.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Resolved port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path prefix without leading or trailing slashes; may be empty.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Join an endpoint path such as `/api/chat` onto this base.
    pub fn join(&self, endpoint: &str) -> String {
        format!("{self}{endpoint}")
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self::fallback("http".to_string())
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)?;
        if !self.path.is_empty() {
            write!(f, "/{}", self.path)?;
        }
        Ok(())
    }
}

/// Normalize a raw host string into `scheme://host:port[/path]`.
///
/// Blank input yields an empty string; the caller substitutes its default.
pub fn normalize_host(raw: &str) -> String {
    BaseUrl::parse(raw).map(|url| url.to_string()).unwrap_or_default()
}

/// `host[:port][/path]` split out of the part after the scheme.
struct Authority<'a> {
    host: String,
    port: Option<u16>,
    path: &'a str,
}

impl<'a> Authority<'a> {
    fn parse(remainder: &'a str) -> Option<Self> {
        let remainder = remainder.split(['?', '#']).next().unwrap_or_default();
        let (authority, path) = match remainder.find('/') {
            Some(idx) => remainder.split_at(idx),
            None => (remainder, ""),
        };
        let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (inner, after) = bracketed.split_once(']')?;
            if inner.is_empty() {
                return None;
            }
            let port = match after {
                "" => None,
                _ => parse_port(after.strip_prefix(':')?)?,
            };
            (format!("[{inner}]"), port)
        } else if authority.matches(':').count() > 1 {
            (format!("[{authority}]"), None)
        } else if let Some((host, port)) = authority.split_once(':') {
            (host.to_string(), parse_port(port)?)
        } else {
            (authority.to_string(), None)
        };

        let invalid = |c: char| c.is_whitespace() || c.is_control();
        if host.is_empty() || host.contains(invalid) {
            return None;
        }

        Some(Self { host, port, path })
    }
}

/// `Some(None)` for an empty port, `None` when the port is not a valid number.
fn parse_port(port: &str) -> Option<Option<u16>> {
    if port.is_empty() {
        return Some(None);
    }
    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse().ok().map(Some)
}
