//! OpenAPI from routes - static OpenAPI 3.0 documents from declared route metadata.
//!
//! Handlers declare, per HTTP method, which parameter groups, bodies and
//! responses they accept and return. Those declarations carry raw JSON Schema
//! fragments as produced by a schema-introspection library. This crate walks
//! the route registration tree, turns every declaration into an OpenAPI
//! operation, and assembles one immutable document.
//!
//! # Architecture
//!
//! 1. [`schema_normalizer`] - Turns raw JSON Schema fields into self-contained fragments
//! 2. [`params`] / [`body`] - Build parameter and body objects from declared groups
//! 3. [`security`] - Validates security schemes and composes requirements
//! 4. [`operation`] - Assembles one operation and disambiguates response codes
//! 5. [`routes`] - Route tree, handler signatures, and path parameter recovery
//! 6. [`openapi_builder`] - Builds the complete document from a [`config::Config`]
//! 7. [`serializer`] - Serializes the document to YAML, JSON, or an embeddable literal
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_routes::{
//!     body::BodyGroup,
//!     config::Config,
//!     openapi_builder::DocumentBuilder,
//!     operation::{OperationDoc, ResponseSpec},
//!     params::ParameterGroup,
//!     routes::{Handler, HttpMethod, RouteNode},
//!     security::SchemeDecl,
//!     serializer::serialize_json,
//! };
//! use serde_json::json;
//!
//! let doc = OperationDoc::new(["items"], "Fetch one item", vec![
//!     ResponseSpec::ok().with_body(
//!         BodyGroup::json(json!({"properties": {"name": {"type": "string"}}}))
//!             .with_example(json!({"name": "widget"})),
//!     ),
//!     ResponseSpec::not_found(),
//! ])
//! .path_params(ParameterGroup::path(json!({
//!     "properties": {"item_id": {"type": "integer", "description": "item id"}},
//!     "required": ["item_id"]
//! })));
//!
//! let handler = Handler::new("ItemHandler")
//!     .method(HttpMethod::Get, ["item_id"])
//!     .document(HttpMethod::Get, doc)
//!     .unwrap();
//!
//! let config = Config::default().with_security(vec![SchemeDecl::http("bearer")]);
//! let document = DocumentBuilder::new(config)
//!     .unwrap()
//!     .build(&[RouteNode::pattern(r"/items/(\d+)$", handler)])
//!     .unwrap();
//!
//! assert!(document.paths.contains_key("/items/{item_id}"));
//! println!("{}", serialize_json(&document).unwrap());
//! ```

pub mod body;
pub mod config;
pub mod error;
pub mod example;
pub mod openapi_builder;
pub mod operation;
pub mod params;
pub mod routes;
pub mod schema_normalizer;
pub mod security;
pub mod serializer;

pub use error::{Error, Result};
