//! Method + path resolution with numeric named parameters.
//!
//! Patterns use `:name` segments, each of which matches one or more ASCII
//! digits. Patterns are tried per method in registration order and the first
//! anchored match wins.

use std::collections::HashMap;

use axum::http::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PARAM_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r":(\w+)").expect("valid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route not found")]
    NotFound,

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<H> {
    pub handler: H,
    pub params: HashMap<String, String>,
}

impl<H> RouteMatch<H> {
    /// Numeric parameter by name. The router only ever captures digits, so this
    /// fails only on overflow or a name the pattern does not declare.
    pub fn id(&self, name: &str) -> Option<i64> {
        self.params.get(name).and_then(|v| v.parse().ok())
    }
}

#[derive(Debug)]
struct Entry<H> {
    pattern: String,
    regex: Regex,
    names: Vec<String>,
    handler: H,
}

#[derive(Debug)]
pub struct PathRouter<H> {
    base_path: String,
    routes: HashMap<Method, Vec<Entry<H>>>,
}

impl<H: Clone> PathRouter<H> {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            routes: HashMap::new(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn register(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), RouteError> {
        let names = PARAM_PATTERN
            .captures_iter(pattern)
            .map(|c| c[1].to_string())
            .collect();
        let source = format!(
            "^{}$",
            PARAM_PATTERN.replace_all(pattern, "(?P<$1>[0-9]+)")
        );
        let regex = Regex::new(&source).map_err(|e| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        self.routes.entry(method).or_default().push(Entry {
            pattern: pattern.to_string(),
            regex,
            names,
            handler,
        });
        Ok(())
    }

    /// Resolve a request target (path, optionally with a query string).
    pub fn resolve(&self, method: &Method, target: &str) -> Result<RouteMatch<H>, RouteError> {
        let path = self.normalize(target);

        let entries = self.routes.get(method).ok_or(RouteError::NotFound)?;
        for entry in entries {
            if let Some(caps) = entry.regex.captures(path) {
                let params = entry
                    .names
                    .iter()
                    .filter_map(|name| {
                        caps.name(name)
                            .map(|m| (name.clone(), m.as_str().to_string()))
                    })
                    .collect();

                tracing::trace!("{} {} matched {}", method, path, entry.pattern);
                return Ok(RouteMatch {
                    handler: entry.handler.clone(),
                    params,
                });
            }
        }

        Err(RouteError::NotFound)
    }

    fn normalize<'a>(&self, target: &'a str) -> &'a str {
        let path = target.split('?').next().unwrap_or(target);
        if self.base_path.is_empty() {
            return path;
        }
        match path.strip_prefix(self.base_path.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }
}
