use crate::error::{Error, Result};
use crate::example::Example;
use crate::schema_normalizer::{SchemaNode, SchemaNormalizer};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_json::Value;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "multipart/form-data";

/// A declared request or response body: one raw object schema documented
/// under a single content type, with a mandatory literal example.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyGroup {
    content_type: String,
    schema: Value,
    example: Option<Example>,
}

impl BodyGroup {
    /// `application/json` body
    pub fn json(schema: Value) -> Self {
        Self {
            content_type: JSON_CONTENT_TYPE.to_string(),
            schema,
            example: None,
        }
    }

    /// `multipart/form-data` body
    pub fn form(schema: Value) -> Self {
        Self::json(schema).with_content_type(FORM_CONTENT_TYPE)
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_example(mut self, example: impl Into<Example>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn example(&self) -> Option<&Example> {
        self.example.as_ref()
    }
}

/// `{content: {<type>: {schema, example}}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentObject {
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    pub schema: BodySchema,
    pub example: Example,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub description: String,
    pub properties: IndexMap<String, SchemaNode>,
}

pub struct BodyBuilder;

impl BodyBuilder {
    /// Build the content object of a body group.
    ///
    /// Fails with a configuration error when the group has no example.
    pub fn build(group: &BodyGroup) -> Result<ContentObject> {
        let example = group.example.clone().ok_or_else(|| {
            Error::configuration(format!(
                "{} body group has no example; every documented body needs one",
                group.content_type
            ))
        })?;

        let properties = SchemaNormalizer::for_root(&group.schema).normalize_properties(&group.schema)?;
        debug!(
            "Built {} body with {} properties",
            group.content_type,
            properties.len()
        );

        let mut content = IndexMap::new();
        content.insert(
            group.content_type.clone(),
            MediaType {
                schema: BodySchema {
                    schema_type: "object".to_string(),
                    description: "request body".to_string(),
                    properties,
                },
                example,
            },
        );
        Ok(ContentObject { content })
    }
}
