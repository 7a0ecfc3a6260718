//! Security schemes and per-operation security requirements.
//!
//! A security policy is an ordered list of OR-alternatives. Each alternative is
//! either one scheme or a list of schemes that must all be satisfied together.
//! Declarations are validated once, when the policy is constructed.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Name every `http` scheme is registered under.
pub const HTTP_SCHEME_NAME: &str = "BearerAuthentication";

/// Challenge scheme of an `http` security scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpAuthScheme {
    Basic,
    Bearer,
}

/// Where an `apiKey` credential is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// A security scheme as declared, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeDecl {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl SchemeDecl {
    /// `http` scheme with the given challenge (`basic` or `bearer`)
    pub fn http(scheme: &str) -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: Some(scheme.to_string()),
            ..Self::default()
        }
    }

    /// `apiKey` scheme sent in a header
    pub fn api_key(name: &str) -> Self {
        Self {
            scheme_type: "apiKey".to_string(),
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn located(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// One OR-alternative of a security policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecurityItem {
    /// A single scheme
    One(SchemeDecl),
    /// Schemes that must all be satisfied
    All(Vec<SchemeDecl>),
}

impl From<SchemeDecl> for SecurityItem {
    fn from(decl: SchemeDecl) -> Self {
        SecurityItem::One(decl)
    }
}

impl From<Vec<SchemeDecl>> for SecurityItem {
    fn from(decls: Vec<SchemeDecl>) -> Self {
        SecurityItem::All(decls)
    }
}

/// Validated kind of a security scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    Http(HttpAuthScheme),
    ApiKey(ApiKeyLocation),
}

/// A validated security scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityScheme {
    pub name: String,
    pub description: String,
    pub kind: SchemeKind,
}

impl SecurityScheme {
    /// Validate and normalize a declaration.
    ///
    /// `apiKey` schemes default to the `header` location; `http` schemes are
    /// always renamed to [`HTTP_SCHEME_NAME`].
    pub fn validate(decl: &SchemeDecl) -> Result<Self> {
        let description = decl.description.clone().unwrap_or_default();
        match decl.scheme_type.as_str() {
            "apiKey" => {
                let name = decl
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| Error::validation("apiKey security scheme requires a name"))?;
                let location = match decl.location.as_deref() {
                    None => ApiKeyLocation::Header,
                    Some(raw) => parse_keyword(raw, "apiKey location")?,
                };
                Ok(Self {
                    name,
                    description,
                    kind: SchemeKind::ApiKey(location),
                })
            }
            "http" => {
                let raw = decl
                    .scheme
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| Error::validation("http security scheme requires a scheme"))?;
                let scheme: HttpAuthScheme = parse_keyword(raw, "http scheme")?;
                Ok(Self {
                    name: HTTP_SCHEME_NAME.to_string(),
                    description,
                    kind: SchemeKind::Http(scheme),
                })
            }
            other => Err(Error::validation(format!(
                "unsupported security scheme type '{}'",
                other
            ))),
        }
    }

    fn to_object(&self) -> SecuritySchemeObject {
        let (scheme_type, location, scheme) = match self.kind {
            SchemeKind::Http(s) => ("http", None, Some(s)),
            SchemeKind::ApiKey(l) => ("apiKey", Some(l), None),
        };
        SecuritySchemeObject {
            scheme_type: scheme_type.to_string(),
            description: self.description.clone(),
            name: self.name.clone(),
            location,
            scheme,
        }
    }
}

fn parse_keyword<T: for<'de> Deserialize<'de>>(raw: &str, what: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| Error::validation(format!("unsupported {} '{}'", what, raw)))
}

/// OpenAPI Security Scheme object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecuritySchemeObject {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<HttpAuthScheme>,
}

/// One requirement map per alternative: scheme name to (always empty) scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// A validated security policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPolicy {
    alternatives: Vec<Vec<SecurityScheme>>,
}

impl SecurityPolicy {
    /// Validate every declared scheme. The first malformed declaration fails
    /// the whole policy.
    pub fn new<I>(items: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<SecurityItem>,
    {
        let mut alternatives = Vec::new();
        for item in items {
            let group = match item.into() {
                SecurityItem::One(decl) => vec![SecurityScheme::validate(&decl)?],
                SecurityItem::All(decls) => decls
                    .iter()
                    .map(SecurityScheme::validate)
                    .collect::<Result<Vec<_>>>()?,
            };
            alternatives.push(group);
        }
        debug!("Validated security policy with {} alternatives", alternatives.len());
        Ok(Self { alternatives })
    }

    pub fn alternatives(&self) -> &[Vec<SecurityScheme>] {
        &self.alternatives
    }

    /// All schemes keyed by name. Later schemes with the same name replace
    /// earlier ones, keeping the first position.
    pub fn security_scheme_map(&self) -> IndexMap<String, SecuritySchemeObject> {
        let mut map = IndexMap::new();
        for scheme in self.alternatives.iter().flatten() {
            map.insert(scheme.name.clone(), scheme.to_object());
        }
        map
    }

    /// The operation-level `security` array.
    pub fn requirement(&self) -> Vec<SecurityRequirement> {
        self.alternatives
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|scheme| (scheme.name.clone(), Vec::new()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mixed_policy() -> SecurityPolicy {
        SecurityPolicy::new(vec![
            SecurityItem::from(SchemeDecl::http("bearer")),
            SecurityItem::from(vec![SchemeDecl::api_key("K1"), SchemeDecl::api_key("K2")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_requirement_alternatives() {
        let requirement = serde_json::to_value(mixed_policy().requirement()).unwrap();
        assert_eq!(
            requirement,
            json!([{"BearerAuthentication": []}, {"K1": [], "K2": []}])
        );
    }

    #[test]
    fn test_scheme_map() {
        let map = mixed_policy().security_scheme_map();
        assert_eq!(map.len(), 3);
        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            json!({
                "BearerAuthentication": {
                    "type": "http",
                    "name": "BearerAuthentication",
                    "scheme": "bearer"
                },
                "K1": {"type": "apiKey", "name": "K1", "in": "header"},
                "K2": {"type": "apiKey", "name": "K2", "in": "header"}
            })
        );
    }

    #[test]
    fn test_http_schemes_collapse() {
        let policy = SecurityPolicy::new(vec![
            SchemeDecl::http("basic").described("first"),
            SchemeDecl::http("bearer").described("second"),
        ])
        .unwrap();
        let map = policy.security_scheme_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map[HTTP_SCHEME_NAME].scheme, Some(HttpAuthScheme::Bearer));
        assert_eq!(map[HTTP_SCHEME_NAME].description, "second");
    }

    #[test]
    fn test_http_name_is_forced() {
        let mut decl = SchemeDecl::http("bearer");
        decl.name = Some("Custom".to_string());
        let scheme = SecurityScheme::validate(&decl).unwrap();
        assert_eq!(scheme.name, HTTP_SCHEME_NAME);
    }

    #[test]
    fn test_api_key_explicit_location() {
        let scheme = SecurityScheme::validate(&SchemeDecl::api_key("token").located("cookie")).unwrap();
        assert_eq!(scheme.kind, SchemeKind::ApiKey(ApiKeyLocation::Cookie));
    }

    #[test]
    fn test_api_key_without_name_fails() {
        let decl = SchemeDecl {
            scheme_type: "apiKey".to_string(),
            ..SchemeDecl::default()
        };
        let err = SecurityScheme::validate(&decl).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_http_without_scheme_fails() {
        let decl = SchemeDecl {
            scheme_type: "http".to_string(),
            ..SchemeDecl::default()
        };
        assert!(matches!(
            SecurityScheme::validate(&decl),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_type_fails() {
        let decl = SchemeDecl {
            scheme_type: "oauth2".to_string(),
            ..SchemeDecl::default()
        };
        let err = SecurityPolicy::new(vec![decl]).unwrap_err();
        assert!(err.to_string().contains("oauth2"));
    }

    #[test]
    fn test_unknown_http_scheme_fails() {
        let err = SecurityScheme::validate(&SchemeDecl::http("digest")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_items_deserialize_from_yaml() {
        let yaml = r#"
- type: http
  scheme: bearer
- - type: apiKey
    name: apiKey
  - type: apiKey
    name: apiNonce
    in: query
"#;
        let items: Vec<SecurityItem> = serde_yaml::from_str(yaml).unwrap();
        let policy = SecurityPolicy::new(items).unwrap();
        assert_eq!(policy.alternatives().len(), 2);
        assert_eq!(policy.alternatives()[1].len(), 2);
        assert_eq!(
            policy.alternatives()[1][1].kind,
            SchemeKind::ApiKey(ApiKeyLocation::Query)
        );
    }
}
