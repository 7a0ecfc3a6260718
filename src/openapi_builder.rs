use crate::config::{Config, Contact, ExternalDocs, Server};
use crate::error::Result;
use crate::operation::{Operation, OperationAssembler};
use crate::routes::{HttpMethod, RecoveryWarning, RouteNode, RouteTreeWalker};
use crate::security::{SecurityPolicy, SecuritySchemeObject};
use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;

pub const OPENAPI_VERSION: &str = "3.0.0";

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API description
    pub description: String,
    /// API version
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }

    /// Store the operation for `method`, replacing any earlier one.
    pub fn set(&mut self, method: HttpMethod, operation: Operation) {
        if self.slot(method).replace(operation).is_some() {
            debug!("Replaced existing {} operation", method);
        }
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }

    /// Documented operations in method order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |m| self.operation(m).map(|op| (m, op)))
    }
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    #[serde(rename = "securitySchemes", skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<IndexMap<String, SecuritySchemeObject>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// API paths, in discovery order
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
}

/// A built document and the path-parameter names that had to be guessed.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub document: Document,
    pub warnings: Vec<RecoveryWarning>,
}

/// OpenAPI document builder
pub struct DocumentBuilder {
    config: Config,
    security: Option<SecurityPolicy>,
}

impl DocumentBuilder {
    /// Validate the configured security policy.
    ///
    /// A malformed security declaration fails here, before any route is read.
    pub fn new(config: Config) -> Result<Self> {
        debug!("Initializing DocumentBuilder for '{}'", config.title);
        let security = if config.security.is_empty() {
            None
        } else {
            Some(SecurityPolicy::new(config.security.iter().cloned())?)
        };
        Ok(Self { config, security })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn security(&self) -> Option<&SecurityPolicy> {
        self.security.as_ref()
    }

    pub fn build(&self, routes: &[RouteNode]) -> Result<Document> {
        Ok(self.build_report(routes)?.document)
    }

    /// Walk `routes` once and assemble the document.
    ///
    /// Any error aborts the build; no partial document is returned.
    pub fn build_report(&self, routes: &[RouteNode]) -> Result<BuildReport> {
        let assembler = OperationAssembler::new(self.security.as_ref())
            .with_auth_required_default(self.config.auth_required_default);
        let walked = RouteTreeWalker::new(&assembler).walk(routes)?;

        let operations: usize = walked
            .paths
            .values()
            .map(|item| item.operations().count())
            .sum();
        info!(
            "Built OpenAPI document: {} paths, {} operations, {} recovery warnings",
            walked.paths.len(),
            operations,
            walked.warnings.len()
        );

        let document = Document {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: self.config.title.clone(),
                description: clean_description(&self.config.description),
                version: self.config.version.clone(),
                contact: self.config.contact.clone(),
            },
            servers: self.config.servers.clone(),
            external_docs: self.config.external_docs.clone(),
            paths: walked.paths,
            components: Components {
                security_schemes: self.security.as_ref().map(SecurityPolicy::security_scheme_map),
            },
        };

        Ok(BuildReport {
            document,
            warnings: walked.warnings,
        })
    }
}

/// Drops leading blank lines and folds the remaining lines onto one line,
/// joined by four spaces.
fn clean_description(description: &str) -> String {
    description
        .trim_start_matches('\n')
        .lines()
        .collect::<Vec<_>>()
        .join("    ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::operation::{OperationDoc, ResponseSpec};
    use crate::routes::Handler;
    use crate::security::SchemeDecl;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn routes() -> Vec<RouteNode> {
        let handler = Handler::new("ItemHandler")
            .method(HttpMethod::Get, ["item_id"])
            .method(HttpMethod::Delete, ["item_id"])
            .document(
                HttpMethod::Get,
                OperationDoc::new(["items"], "fetch", vec![ResponseSpec::ok()]),
            )
            .unwrap()
            .document(
                HttpMethod::Delete,
                OperationDoc::new(["items"], "remove", vec![ResponseSpec::no_content()])
                    .auth_required(false),
            )
            .unwrap();
        vec![RouteNode::pattern(r"/items/(\d+)$", handler)]
    }

    #[test]
    fn test_default_document_structure() {
        let document = DocumentBuilder::new(Config::default())
            .unwrap()
            .build(&[])
            .unwrap();
        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "openapi": "3.0.0",
                "info": {
                    "title": "Swagger API",
                    "description": "Swagger API definition",
                    "version": "1.0.0"
                },
                "paths": {},
                "components": {}
            })
        );
    }

    #[test]
    fn test_metadata_is_seeded_from_config() {
        let config = Config {
            description: "\n\nItem service\nsecond line".to_string(),
            contact: Some(Contact {
                name: Some("ops".to_string()),
                ..Contact::default()
            }),
            external_docs: Some(ExternalDocs {
                url: "https://docs.example.com".to_string(),
                description: None,
            }),
            ..Config::default()
        }
        .with_title("Items")
        .with_version("2.0.0")
        .with_server(Server::new("https://api.example.com"));

        let value = serde_json::to_value(DocumentBuilder::new(config).unwrap().build(&[]).unwrap()).unwrap();
        assert_eq!(value["info"]["title"], "Items");
        assert_eq!(value["info"]["version"], "2.0.0");
        assert_eq!(value["info"]["description"], "Item service    second line");
        assert_eq!(value["info"]["contact"], json!({"name": "ops"}));
        assert_eq!(value["servers"], json!([{"url": "https://api.example.com"}]));
        assert_eq!(value["externalDocs"], json!({"url": "https://docs.example.com"}));
    }

    #[test]
    fn test_security_schemes_and_requirements() {
        let config = Config::default().with_security(vec![SchemeDecl::http("bearer")]);
        let document = DocumentBuilder::new(config).unwrap().build(&routes()).unwrap();

        let schemes = document.components.security_schemes.as_ref().unwrap();
        assert!(schemes.contains_key("BearerAuthentication"));

        let item = &document.paths["/items/{item_id}"];
        assert!(item.get.as_ref().unwrap().security.is_some());
        assert!(item.delete.as_ref().unwrap().security.is_none());
    }

    #[test]
    fn test_invalid_security_fails_before_build() {
        let config = Config::default().with_security(vec![SchemeDecl {
            scheme_type: "apiKey".to_string(),
            ..SchemeDecl::default()
        }]);
        let err = DocumentBuilder::new(config).err().unwrap();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_path_item_operations_in_method_order() {
        let document = DocumentBuilder::new(Config::default())
            .unwrap()
            .build(&routes())
            .unwrap();
        let methods: Vec<_> = document.paths["/items/{item_id}"]
            .operations()
            .map(|(m, op)| (m, op.summary.as_str()))
            .collect();
        assert_eq!(
            methods,
            vec![(HttpMethod::Get, "fetch"), (HttpMethod::Delete, "remove")]
        );
    }

    #[test]
    fn test_build_report_collects_warnings() {
        let handler = Handler::new("Anonymous")
            .method(HttpMethod::Get, Vec::<String>::new())
            .document(
                HttpMethod::Get,
                OperationDoc::new(["a"], "anonymous", vec![ResponseSpec::ok()]),
            )
            .unwrap();
        let report = DocumentBuilder::new(Config::default())
            .unwrap()
            .build_report(&[RouteNode::pattern(r"/a/(\w+)$", handler)])
            .unwrap();
        assert!(report.document.paths.contains_key("/a/{?}"));
        assert_eq!(report.warnings.len(), 1);
    }
}
