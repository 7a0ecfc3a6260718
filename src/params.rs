//! Parameter groups (path, query, header) and their conversion into OpenAPI
//! parameter objects.
//!
//! A group is one raw object schema whose properties are the individual
//! parameters, plus the location they are read from and an optional example.
//!
//! ```
//! use openapi_from_routes::params::{ParameterBuilder, ParameterGroup};
//! use serde_json::json;
//!
//! let group = ParameterGroup::path(json!({
//!     "properties": {"id": {"type": "integer", "description": "request id"}},
//!     "required": ["id"]
//! }))
//! .with_example(json!({"id": 123}));
//!
//! let params = ParameterBuilder::build(&group).unwrap();
//! assert_eq!(params[0].name, "id");
//! ```

use crate::error::{Error, Result};
use crate::example::Example;
use crate::schema_normalizer::{required_names, SchemaNode, SchemaNormalizer};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a parameter value is read from in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Path parameter embedded in the URL (e.g., `/items/{item_id}`)
    Path,
    /// Query string parameter (e.g., `?limit=10`)
    Query,
    /// HTTP header parameter
    Header,
}

/// A declared group of parameters sharing one location.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroup {
    location: Option<ParamLocation>,
    schema: Value,
    example: Option<Example>,
}

impl ParameterGroup {
    /// Create a group with no location.
    ///
    /// Such a group cannot be documented until a location is set; building it
    /// fails with a configuration error.
    pub fn new(schema: Value) -> Self {
        Self {
            location: None,
            schema,
            example: None,
        }
    }

    pub fn path(schema: Value) -> Self {
        Self::new(schema).with_location(ParamLocation::Path)
    }

    pub fn query(schema: Value) -> Self {
        Self::new(schema).with_location(ParamLocation::Query)
    }

    pub fn header(schema: Value) -> Self {
        Self::new(schema).with_location(ParamLocation::Header)
    }

    pub fn with_location(mut self, location: ParamLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach an example. A map example is looked up per parameter name; any
    /// other example documents every parameter of the group.
    pub fn with_example(mut self, example: impl Into<Example>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn location(&self) -> Option<ParamLocation> {
        self.location
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn example(&self) -> Option<&Example> {
        self.example.as_ref()
    }
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Parameter description
    pub description: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Normalized parameter schema
    pub schema: SchemaNode,
    /// Example value for this parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Example>,
}

/// Converts parameter groups into ordered parameter objects
pub struct ParameterBuilder;

impl ParameterBuilder {
    /// Build one parameter object per declared field, in declaration order.
    ///
    /// The description is the raw field's own description, or the one derived
    /// from its normalized schema when the field has none.
    pub fn build(group: &ParameterGroup) -> Result<Vec<Parameter>> {
        let location = group.location.ok_or_else(|| {
            Error::configuration("parameter group has no location; use path, query or header")
        })?;

        let schema = &group.schema;
        let required = required_names(schema);
        let mut normalizer = SchemaNormalizer::for_root(schema);
        let mut parameters = Vec::new();

        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            debug!("Parameter group in {:?} declares no fields", location);
            return Ok(parameters);
        };

        for (name, raw) in properties {
            let node = normalizer.normalize(raw, name, &required)?;
            let description = raw
                .get("description")
                .and_then(Value::as_str)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| node.flat_description());
            let example = group
                .example
                .as_ref()
                .and_then(|e| e.for_field(name))
                .cloned();

            debug!("Built {:?} parameter '{}'", location, name);
            parameters.push(Parameter {
                name: name.clone(),
                location,
                description,
                required: required.iter().any(|r| r == name),
                schema: node,
                example,
            });
        }

        Ok(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn query_schema() -> Value {
        json!({
            "properties": {
                "Limit": {"description": "页限制", "type": "integer"},
                "Offset": {
                    "anyOf": [{"type": "integer"}, {"type": "null"}],
                    "default": null,
                    "description": "偏移量"
                }
            },
            "required": ["Limit"],
            "type": "object"
        })
    }

    #[test]
    fn test_group_without_location_fails() {
        let group = ParameterGroup::new(query_schema());
        let err = ParameterBuilder::build(&group).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_query_parameters_in_declaration_order() {
        let group = ParameterGroup::query(query_schema());
        let params = ParameterBuilder::build(&group).unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "Limit");
        assert!(params[0].required);
        assert_eq!(params[1].name, "Offset");
        assert!(!params[1].required);
        assert_eq!(params[1].description, "偏移量");
    }

    #[test]
    fn test_parameter_serializes_as_openapi() {
        let group = ParameterGroup::path(json!({
            "properties": {"id": {"description": "请求ID", "type": "integer"}},
            "required": ["id"]
        }))
        .with_example(json!({"id": 123}));

        let params = ParameterBuilder::build(&group).unwrap();
        assert_eq!(
            serde_json::to_value(&params[0]).unwrap(),
            json!({
                "name": "id",
                "in": "path",
                "description": "请求ID",
                "required": true,
                "schema": {"description": "请求ID", "type": "integer", "required": true},
                "example": 123
            })
        );
    }

    #[test]
    fn test_example_lookup_is_by_declared_name() {
        let group = ParameterGroup::query(query_schema())
            .with_example(json!({"limit": 10, "offset": 20}));
        let params = ParameterBuilder::build(&group).unwrap();
        assert!(params.iter().all(|p| p.example.is_none()));
    }

    #[test]
    fn test_scalar_example_applies_to_every_field() {
        let group = ParameterGroup::header(json!({
            "properties": {
                "X-Requested-By": {"type": "string"},
                "X-Trace": {"type": "string"}
            }
        }))
        .with_example("xxxxxxxxx");
        let params = ParameterBuilder::build(&group).unwrap();
        assert!(params
            .iter()
            .all(|p| p.example == Some(Example::from("xxxxxxxxx"))));
    }

    #[test]
    fn test_description_derived_from_union() {
        let group = ParameterGroup::query(json!({
            "properties": {
                "bstatus": {
                    "anyOf": [
                        {"$ref": "#/$defs/Status"},
                        {"type": "string"}
                    ]
                }
            },
            "required": ["bstatus"],
            "$defs": {
                "Status": {"description": "状态 1:online, 2:offline", "enum": [1, 2], "type": "integer"}
            }
        }));
        let params = ParameterBuilder::build(&group).unwrap();
        assert_eq!(params[0].description, "状态 1:online, 2:offline/");
    }

    #[test]
    fn test_group_without_properties_is_empty() {
        let group = ParameterGroup::query(json!({"type": "object"}));
        assert!(ParameterBuilder::build(&group).unwrap().is_empty());
    }
}
