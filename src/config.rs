//! Document-wide settings: API metadata, servers, and the security policy.
//!
//! Every field has a default, so an empty YAML or JSON file is a valid
//! configuration.

use crate::error::{Error, Result};
use crate::security::SecurityItem;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_TITLE: &str = "Swagger API";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_DESCRIPTION: &str = "Swagger API definition";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub version: String,
    /// Leading blank lines are dropped when the document is built
    pub description: String,
    pub contact: Option<Contact>,
    pub servers: Vec<Server>,
    pub external_docs: Option<ExternalDocs>,
    /// OR-alternatives of security schemes; empty means no security
    pub security: Vec<SecurityItem>,
    /// Whether operations require authentication unless they say otherwise
    pub auth_required_default: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            contact: None,
            servers: Vec::new(),
            external_docs: None,
            security: Vec::new(),
            auth_required_default: true,
        }
    }
}

/// OpenAPI Contact object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
        }
    }
}

/// OpenAPI External Documentation object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Config {
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a configuration file. `.yaml`/`.yml` files are read as YAML and
    /// `.json` files as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        let source = fs::read_to_string(path)?;

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&source),
            Some("json") => Self::from_json_str(&source),
            _ => Err(Error::configuration(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    pub fn with_security<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SecurityItem>,
    {
        self.security = items.into_iter().map(Into::into).collect();
        self
    }
}
