use crate::body::{BodyBuilder, BodyGroup, ContentObject, MediaType};
use crate::error::Result;
use crate::params::{Parameter, ParameterBuilder, ParameterGroup};
use crate::routes::HttpMethod;
use crate::security::{SecurityPolicy, SecurityRequirement};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// Characters of a route path replaced by `_` in operation ids
const OPERATION_ID_REPLACED: [char; 6] = ['/', '$', '(', ')', '{', '}'];

/// One documented response of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    pub status_code: u16,
    pub description: String,
    pub body: Option<BodyGroup>,
}

impl ResponseSpec {
    pub fn new(status_code: u16, description: impl Into<String>) -> Self {
        Self {
            status_code,
            description: description.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: BodyGroup) -> Self {
        self.body = Some(body);
        self
    }

    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    pub fn no_content() -> Self {
        Self::new(204, "No Content")
    }

    pub fn bad_request() -> Self {
        Self::new(400, "Bad Request")
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::new(403, "Forbidden")
    }

    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }
}

/// Documentation declared for one (handler, HTTP method) pair.
///
/// Built once when the route is registered and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDoc {
    pub tags: Vec<String>,
    pub summary: String,
    pub description: Option<String>,
    /// `None` defers to the document-wide default
    pub auth_required: Option<bool>,
    pub path_params: Option<ParameterGroup>,
    pub query_params: Option<ParameterGroup>,
    pub header_params: Option<ParameterGroup>,
    pub request_body: Option<BodyGroup>,
    pub responses: Vec<ResponseSpec>,
}

impl OperationDoc {
    pub fn new<T, I>(tags: I, summary: impl Into<String>, responses: Vec<ResponseSpec>) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = T>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            summary: summary.into(),
            description: None,
            auth_required: None,
            path_params: None,
            query_params: None,
            header_params: None,
            request_body: None,
            responses,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn auth_required(mut self, required: bool) -> Self {
        self.auth_required = Some(required);
        self
    }

    pub fn path_params(mut self, group: ParameterGroup) -> Self {
        self.path_params = Some(group);
        self
    }

    pub fn query_params(mut self, group: ParameterGroup) -> Self {
        self.query_params = Some(group);
        self
    }

    pub fn header_params(mut self, group: ParameterGroup) -> Self {
        self.header_params = Some(group);
        self
    }

    pub fn request_body(mut self, body: BodyGroup) -> Self {
        self.request_body = Some(body);
        self
    }
}

/// OpenAPI Operation object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub tags: Vec<String>,
    pub summary: String,
    pub description: String,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<ContentObject>,
    pub responses: IndexMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// Composes rendered operations from their declarations.
pub struct OperationAssembler<'a> {
    security: Option<&'a SecurityPolicy>,
    auth_required_default: bool,
}

impl<'a> OperationAssembler<'a> {
    pub fn new(security: Option<&'a SecurityPolicy>) -> Self {
        Self {
            security,
            auth_required_default: true,
        }
    }

    /// Whether operations that do not say otherwise require authentication
    pub fn with_auth_required_default(mut self, required: bool) -> Self {
        self.auth_required_default = required;
        self
    }

    pub fn assemble(
        &self,
        op: &OperationDoc,
        route_path: &str,
        handler_id: &str,
        method: HttpMethod,
    ) -> Result<Operation> {
        let operation_id = operation_id(method, handler_id, route_path);
        debug!("Assembling operation {}", operation_id);

        let mut parameters = Vec::new();
        for group in [&op.header_params, &op.path_params, &op.query_params]
            .into_iter()
            .flatten()
        {
            parameters.extend(ParameterBuilder::build(group)?);
        }

        let request_body = op.request_body.as_ref().map(BodyBuilder::build).transpose()?;

        let keys = disambiguate_status_codes(op.responses.iter().map(|r| r.status_code));
        let mut responses = IndexMap::new();
        for (key, response) in keys.into_iter().zip(&op.responses) {
            let content = match response.body {
                Some(ref body) => Some(BodyBuilder::build(body)?.content),
                None => None,
            };
            responses.insert(
                key,
                Response {
                    description: response.description.clone(),
                    content,
                },
            );
        }

        let auth_required = op.auth_required.unwrap_or(self.auth_required_default);
        let security = match self.security {
            Some(policy) if auth_required => Some(policy.requirement()),
            _ => None,
        };

        Ok(Operation {
            tags: op.tags.clone(),
            summary: op.summary.clone(),
            description: op.description.clone().unwrap_or_else(|| op.summary.clone()),
            operation_id,
            parameters,
            request_body,
            responses,
            security,
        })
    }
}

/// `<method>_<handler>_<route path>` with path punctuation replaced by `_`.
pub fn operation_id(method: HttpMethod, handler_id: &str, route_path: &str) -> String {
    let sanitized: String = route_path
        .chars()
        .map(|c| if OPERATION_ID_REPLACED.contains(&c) { '_' } else { c })
        .collect();
    format!("{}_{}_{}", method.as_str(), handler_id, sanitized)
}

/// Response keys for a sequence of status codes.
///
/// The first occurrence of a code keeps its plain number; the k-th repeat
/// becomes `"<code>.<k>"`.
pub fn disambiguate_status_codes(codes: impl IntoIterator<Item = u16>) -> Vec<String> {
    let mut seen: HashMap<u16, usize> = HashMap::new();
    codes
        .into_iter()
        .map(|code| match seen.get_mut(&code) {
            Some(repeats) => {
                *repeats += 1;
                format!("{}.{}", code, repeats)
            }
            None => {
                seen.insert(code, 0);
                code.to_string()
            }
        })
        .collect()
}
