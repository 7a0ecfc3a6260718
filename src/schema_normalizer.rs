use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

const DEFS_PREFIX: &str = "#/$defs/";
const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// A self-contained OpenAPI schema fragment produced from one raw field schema.
///
/// Field and variant order always equals declaration order in the raw schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A scalar value (optionally constrained by an enumeration)
    Leaf(Leaf),
    /// A nested object with ordered fields
    Object {
        description: Option<String>,
        fields: IndexMap<String, SchemaNode>,
    },
    /// An array of a single item schema
    Array {
        description: Option<String>,
        item: Box<SchemaNode>,
    },
    /// A composition of alternatives
    Union {
        description: Option<String>,
        kind: UnionKind,
        variants: Vec<SchemaNode>,
    },
}

/// Scalar schema fragment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaf {
    pub description: String,
    pub schema_type: Option<String>,
    pub format: Option<String>,
    /// `None` when no required set was known for the enclosing group
    pub required: Option<bool>,
    pub enum_values: Option<Vec<Value>>,
}

/// Composition keyword of a [`SchemaNode::Union`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionKind {
    AllOf,
    AnyOf,
}

impl UnionKind {
    fn keyword(self) -> &'static str {
        match self {
            UnionKind::AllOf => "allOf",
            UnionKind::AnyOf => "anyOf",
        }
    }

    fn separator(self) -> &'static str {
        match self {
            UnionKind::AllOf => ",",
            UnionKind::AnyOf => "/",
        }
    }
}

impl SchemaNode {
    /// The node's own description, if it carries one.
    pub fn description(&self) -> Option<&str> {
        match self {
            SchemaNode::Leaf(leaf) => Some(leaf.description.as_str()),
            SchemaNode::Object { description, .. }
            | SchemaNode::Array { description, .. }
            | SchemaNode::Union { description, .. } => description.as_deref(),
        }
    }

    /// A single human-readable description for the node.
    ///
    /// `allOf` variants are joined with `,` and `anyOf` variants with `/`;
    /// any other node yields its own description.
    pub fn flat_description(&self) -> String {
        match self {
            SchemaNode::Union { kind, variants, .. } => variants
                .iter()
                .map(|v| v.description().unwrap_or_default())
                .collect::<Vec<_>>()
                .join(kind.separator()),
            other => other.description().unwrap_or_default().to_string(),
        }
    }

    fn set_description(&mut self, text: String) {
        match self {
            SchemaNode::Leaf(leaf) => leaf.description = text,
            SchemaNode::Object { description, .. }
            | SchemaNode::Array { description, .. }
            | SchemaNode::Union { description, .. } => *description = Some(text),
        }
    }

    /// Binary payload fragment: `{type: string, format: binary}`
    fn binary(description: String, required: Option<bool>) -> Self {
        SchemaNode::Leaf(Leaf {
            description,
            schema_type: Some("string".to_string()),
            format: Some("binary".to_string()),
            required,
            enum_values: None,
        })
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            SchemaNode::Leaf(leaf) => {
                map.serialize_entry("description", &leaf.description)?;
                if let Some(ref t) = leaf.schema_type {
                    map.serialize_entry("type", t)?;
                }
                if let Some(ref f) = leaf.format {
                    map.serialize_entry("format", f)?;
                }
                if let Some(required) = leaf.required {
                    map.serialize_entry("required", &required)?;
                }
                if let Some(ref values) = leaf.enum_values {
                    map.serialize_entry("enum", values)?;
                }
            }
            SchemaNode::Object {
                description,
                fields,
            } => {
                map.serialize_entry("type", "object")?;
                if let Some(d) = description {
                    map.serialize_entry("description", d)?;
                }
                map.serialize_entry("properties", fields)?;
            }
            SchemaNode::Array { description, item } => {
                map.serialize_entry("type", "array")?;
                if let Some(d) = description {
                    map.serialize_entry("description", d)?;
                }
                map.serialize_entry("items", item)?;
            }
            SchemaNode::Union {
                description,
                kind,
                variants,
            } => {
                if let Some(d) = description {
                    map.serialize_entry("description", d)?;
                }
                map.serialize_entry(kind.keyword(), variants)?;
            }
        }
        map.end()
    }
}

/// Named definitions a raw schema may reference (`$defs` and legacy `definitions`)
#[derive(Debug, Clone, Copy, Default)]
pub struct Definitions<'a> {
    defs: Option<&'a Map<String, Value>>,
    legacy: Option<&'a Map<String, Value>>,
}

impl<'a> Definitions<'a> {
    /// Collect the definitions declared at the root of a raw schema.
    pub fn of(root: &'a Value) -> Self {
        Self {
            defs: root.get("$defs").and_then(Value::as_object),
            legacy: root.get("definitions").and_then(Value::as_object),
        }
    }

    /// Resolve a `$ref` string into `(definition name, definition schema)`.
    pub fn resolve(&self, reference: &str) -> Result<(&'a str, &'a Value)> {
        let (table, name) = if let Some(name) = reference.strip_prefix(DEFS_PREFIX) {
            (self.defs, name)
        } else if let Some(name) = reference.strip_prefix(DEFINITIONS_PREFIX) {
            (self.legacy, name)
        } else {
            return Err(Error::Schema {
                reference: reference.to_string(),
                reason: "only local definition references are supported".to_string(),
            });
        };

        table
            .and_then(|t| t.get_key_value(name))
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| Error::Schema {
                reference: reference.to_string(),
                reason: "definition not found".to_string(),
            })
    }
}

/// Names listed in a raw schema's `required` array, in declaration order.
pub fn required_names(schema: &Value) -> Vec<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Normalize one raw field schema against a set of definitions.
///
/// `required` is the required set of the enclosing group; an empty set means
/// none is known and leaves carry no `required` flag.
pub fn normalize(
    item: &Value,
    definitions: Definitions<'_>,
    field: &str,
    required: &[String],
) -> Result<SchemaNode> {
    SchemaNormalizer::new(definitions).normalize(item, field, required)
}

/// Recursive schema normalizer.
///
/// Tracks the definitions currently being resolved so that self-referential
/// schemas fail with [`Error::Schema`] instead of recursing forever.
pub struct SchemaNormalizer<'a> {
    definitions: Definitions<'a>,
    resolving_stack: Vec<&'a str>,
}

impl<'a> SchemaNormalizer<'a> {
    pub fn new(definitions: Definitions<'a>) -> Self {
        Self {
            definitions,
            resolving_stack: Vec::new(),
        }
    }

    /// Normalizer for the fields of a group's root schema.
    pub fn for_root(root: &'a Value) -> Self {
        Self::new(Definitions::of(root))
    }

    /// Normalize every property of an object schema, using that schema's own
    /// required set. A schema without `properties` yields no fields.
    pub fn normalize_properties(&mut self, schema: &Value) -> Result<IndexMap<String, SchemaNode>> {
        let required = required_names(schema);
        let mut fields = IndexMap::new();
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (name, attrs) in properties {
                fields.insert(name.clone(), self.normalize(attrs, name, &required)?);
            }
        }
        Ok(fields)
    }

    /// Normalize one raw schema. First matching shape wins.
    pub fn normalize(&mut self, item: &Value, field: &str, required: &[String]) -> Result<SchemaNode> {
        let description = item.get("description").and_then(Value::as_str);
        let required_flag = (!required.is_empty()).then(|| required.iter().any(|r| r == field));

        if is_binary(item) {
            debug!("Field '{}' is binary", field);
            return Ok(SchemaNode::binary(
                description.unwrap_or_default().to_string(),
                required_flag,
            ));
        }

        if let Some(properties) = item.get("properties").and_then(Value::as_object) {
            let mut fields = IndexMap::new();
            for (name, attrs) in properties {
                fields.insert(name.clone(), self.normalize(attrs, name, required)?);
            }
            return Ok(SchemaNode::Object {
                description: description.map(str::to_string),
                fields,
            });
        }

        if let Some(items) = item.get("items") {
            let item_node = self.normalize(items, field, required)?;
            return Ok(SchemaNode::Array {
                description: description.filter(|d| !d.is_empty()).map(str::to_string),
                item: Box::new(item_node),
            });
        }

        if let Some(reference) = item.get("$ref").and_then(Value::as_str) {
            return self.resolve_reference(reference, field, description);
        }

        if let Some(variants) = item.get("allOf").and_then(Value::as_array) {
            return self.normalize_union(UnionKind::AllOf, variants, description, field, required);
        }

        if let Some(variants) = item
            .get("anyOf")
            .or_else(|| item.get("oneOf"))
            .and_then(Value::as_array)
        {
            return self.normalize_union(UnionKind::AnyOf, variants, description, field, required);
        }

        if let Some(types) = item.get("type").and_then(Value::as_array) {
            if types.len() > 1 {
                return Ok(multi_type_union(item, types, description, required_flag));
            }
        }

        Ok(SchemaNode::Leaf(Leaf {
            description: description.unwrap_or_default().to_string(),
            schema_type: leaf_type(item),
            format: item.get("format").and_then(Value::as_str).map(str::to_string),
            required: required_flag,
            enum_values: item.get("enum").and_then(Value::as_array).cloned(),
        }))
    }

    fn normalize_union(
        &mut self,
        kind: UnionKind,
        variants: &[Value],
        description: Option<&str>,
        field: &str,
        required: &[String],
    ) -> Result<SchemaNode> {
        let mut normalized = Vec::with_capacity(variants.len());
        for variant in variants {
            let node = match variant.get("$ref").and_then(Value::as_str) {
                Some(reference) => self.resolve_reference(reference, field, description)?,
                None => self.normalize(variant, field, required)?,
            };
            normalized.push(node);
        }
        Ok(SchemaNode::Union {
            description: description.map(str::to_string),
            kind,
            variants: normalized,
        })
    }

    /// Inline the definition behind `reference`.
    ///
    /// Flat enumerations become an enum leaf; object definitions become an
    /// object whose description is the reference site's, falling back to the
    /// definition's own.
    fn resolve_reference(
        &mut self,
        reference: &str,
        field: &str,
        site_description: Option<&str>,
    ) -> Result<SchemaNode> {
        let (name, target) = self.definitions.resolve(reference)?;

        if self.resolving_stack.contains(&name) {
            return Err(Error::Schema {
                reference: reference.to_string(),
                reason: format!(
                    "cyclic reference (resolving {})",
                    self.resolving_stack.join(" -> ")
                ),
            });
        }

        debug!("Resolving reference {} for field '{}'", reference, field);
        self.resolving_stack.push(name);
        let result = self.inline_definition(target, field, site_description);
        self.resolving_stack.pop();
        result
    }

    fn inline_definition(
        &mut self,
        target: &Value,
        field: &str,
        site_description: Option<&str>,
    ) -> Result<SchemaNode> {
        let target_required = required_names(target);

        if target.get("enum").is_some() {
            return self.normalize(target, field, &target_required);
        }

        if target.get("properties").is_some() {
            let fields = self.normalize_properties(target)?;
            let description = site_description
                .or_else(|| target.get("description").and_then(Value::as_str))
                .map(str::to_string);
            return Ok(SchemaNode::Object { description, fields });
        }

        // Alias definitions (arrays, scalars, unions) inline as their own shape.
        let mut node = self.normalize(target, field, &target_required)?;
        if let Some(d) = site_description {
            node.set_description(d.to_string());
        }
        Ok(node)
    }
}

fn leaf_type(item: &Value) -> Option<String> {
    match item.get("type") {
        Some(Value::String(t)) => Some(t.clone()),
        Some(Value::Array(types)) => types.first().and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Raw bytes: an explicit `binary` format or an array of `uint8` integers.
fn is_binary(item: &Value) -> bool {
    if item.get("format").and_then(Value::as_str) == Some("binary") {
        return true;
    }
    let is_array = item.get("type").and_then(Value::as_str) == Some("array");
    is_array
        && item.get("items").is_some_and(|items| {
            items.get("type").and_then(Value::as_str) == Some("integer")
                && items.get("format").and_then(Value::as_str) == Some("uint8")
        })
}

/// `"type": ["integer", "null"]` becomes an `anyOf` of single-type leaves.
fn multi_type_union(
    item: &Value,
    types: &[Value],
    description: Option<&str>,
    required: Option<bool>,
) -> SchemaNode {
    let format = item.get("format").and_then(Value::as_str);
    let enum_values = item.get("enum").and_then(Value::as_array);
    let variants = types
        .iter()
        .filter_map(Value::as_str)
        .map(|t| {
            let is_null = t == "null";
            SchemaNode::Leaf(Leaf {
                description: String::new(),
                schema_type: Some(t.to_string()),
                format: format.filter(|_| !is_null).map(str::to_string),
                required,
                enum_values: enum_values.filter(|_| !is_null).cloned(),
            })
        })
        .collect();
    SchemaNode::Union {
        description: description.map(str::to_string),
        kind: UnionKind::AnyOf,
        variants,
    }
}
