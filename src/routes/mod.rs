//! Route registration model and the walker that turns it into path items.
//!
//! Routes are registered as a tree of [`RouteNode`]s. Each direct route binds a
//! regex URL pattern to a [`Handler`], and each handler exposes the HTTP
//! methods it supports together with the formal parameter names of those
//! methods and an optional [`OperationDoc`].
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::operation::{OperationDoc, ResponseSpec};
//! use openapi_from_routes::routes::{Handler, HttpMethod, RouteNode};
//!
//! let handler = Handler::new("ItemHandler")
//!     .method(HttpMethod::Get, ["item_id"])
//!     .document(
//!         HttpMethod::Get,
//!         OperationDoc::new(["items"], "Fetch one item", vec![ResponseSpec::ok()]),
//!     )
//!     .unwrap();
//!
//! let routes = vec![RouteNode::pattern(r"/items/(\d+)$", handler)];
//! assert_eq!(routes.len(), 1);
//! ```

pub mod path;
pub mod signature;
pub mod walker;

use crate::error::{Error, Result};
use crate::operation::OperationDoc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use walker::{RouteTreeWalker, WalkResult};

/// HTTP methods a handler may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    /// Lowercase name, as used for path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            "patch" => Ok(HttpMethod::Patch),
            "options" => Ok(HttpMethod::Options),
            "head" => Ok(HttpMethod::Head),
            _ => Err(Error::configuration(format!("unknown HTTP method '{}'", s))),
        }
    }
}

/// One HTTP method of a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodHandler {
    pub method: HttpMethod,
    /// Formal parameter names, receiver excluded
    pub params: Vec<String>,
    pub doc: Option<OperationDoc>,
}

/// A request handler and the methods it supports, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Handler {
    pub name: String,
    pub methods: Vec<MethodHandler>,
}

impl Handler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Declare a supported method with its formal parameter names.
    pub fn method<I, S>(mut self, method: HttpMethod, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.push(MethodHandler {
            method,
            params: params.into_iter().map(Into::into).collect(),
            doc: None,
        });
        self
    }

    /// Attach documentation to a declared method.
    pub fn document(mut self, method: HttpMethod, doc: OperationDoc) -> Result<Self> {
        match self.methods.iter_mut().find(|m| m.method == method) {
            Some(handler) => {
                handler.doc = Some(doc);
                Ok(self)
            }
            None => Err(Error::configuration(format!(
                "{} does not support {}; cannot document it",
                self.name, method
            ))),
        }
    }

    pub fn supports(&self, method: HttpMethod) -> bool {
        self.methods.iter().any(|m| m.method == method)
    }

    /// Parameters of the first declared method that has any, with the method.
    pub fn naming_method(&self) -> Option<&MethodHandler> {
        self.methods.iter().find(|m| !m.params.is_empty())
    }
}

/// A compiled route: a URL pattern bound to a handler.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    regex: Regex,
    handler: Handler,
}

impl RouteEntry {
    /// Compile `pattern`, anchoring it with `$` when it is not already.
    pub fn new(pattern: &str, handler: Handler) -> Result<Self> {
        let anchored = if pattern.ends_with('$') {
            pattern.to_string()
        } else {
            format!("{}$", pattern)
        };
        let regex = Regex::new(&anchored).map_err(|e| {
            Error::configuration(format!("invalid route pattern '{}': {}", pattern, e))
        })?;
        Ok(Self { regex, handler })
    }

    /// The anchored pattern source
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Number of capturing groups in the pattern, nested ones included
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// A node of the route registration tree.
#[derive(Debug, Clone)]
pub enum RouteNode {
    /// A compiled route
    Route(RouteEntry),
    /// A route whose pattern is compiled when the tree is walked
    Pattern(String, Handler),
    /// A group of sub-routes
    Include(Vec<RouteNode>),
    /// An opaque mounted target that cannot be documented
    Mounted(String),
}

impl RouteNode {
    pub fn pattern(pattern: impl Into<String>, handler: Handler) -> Self {
        RouteNode::Pattern(pattern.into(), handler)
    }

    pub fn include(nodes: impl IntoIterator<Item = RouteNode>) -> Self {
        RouteNode::Include(nodes.into_iter().collect())
    }
}

impl From<RouteEntry> for RouteNode {
    fn from(entry: RouteEntry) -> Self {
        RouteNode::Route(entry)
    }
}

/// A path parameter name that could not be recovered from a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryWarning {
    pub handler: String,
    pub pattern: String,
    pub message: String,
}

impl fmt::Display for RecoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.handler, self.pattern, self.message)
    }
}
