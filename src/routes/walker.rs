use super::path::{is_placeholder, normalize_path, FALLBACK_NAME};
use super::{RecoveryWarning, RouteEntry, RouteNode};
use crate::error::{Error, Result};
use crate::openapi_builder::PathItem;
use crate::operation::OperationAssembler;
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::VecDeque;

/// Path items discovered in a route tree, plus the non-fatal problems met
/// on the way.
#[derive(Debug, Default)]
pub struct WalkResult {
    pub paths: IndexMap<String, PathItem>,
    pub warnings: Vec<RecoveryWarning>,
}

/// Walks a route tree breadth-first and documents every handler method that
/// carries an [`crate::operation::OperationDoc`].
///
/// Nested groups are processed with an explicit queue, so nesting depth does
/// not grow the call stack.
pub struct RouteTreeWalker<'a> {
    assembler: &'a OperationAssembler<'a>,
}

impl<'a> RouteTreeWalker<'a> {
    pub fn new(assembler: &'a OperationAssembler<'a>) -> Self {
        Self { assembler }
    }

    pub fn walk(&self, routes: &[RouteNode]) -> Result<WalkResult> {
        let mut result = WalkResult::default();
        let mut queue: VecDeque<&RouteNode> = routes.iter().collect();

        while let Some(node) = queue.pop_front() {
            let compiled;
            let entry = match node {
                RouteNode::Route(entry) => entry,
                RouteNode::Pattern(pattern, handler) => {
                    compiled = RouteEntry::new(pattern, handler.clone())?;
                    &compiled
                }
                RouteNode::Include(nodes) => {
                    debug!("Queueing route group of {} entries", nodes.len());
                    queue.extend(nodes);
                    continue;
                }
                RouteNode::Mounted(target) => {
                    return Err(Error::configuration(format!(
                        "unknown route: '{}' is neither a route entry nor a route group",
                        target
                    )));
                }
            };
            self.document_route(entry, &mut result)?;
        }

        debug!(
            "Walked route tree: {} paths, {} warnings",
            result.paths.len(),
            result.warnings.len()
        );
        Ok(result)
    }

    fn document_route(&self, entry: &RouteEntry, result: &mut WalkResult) -> Result<()> {
        let handler = entry.handler();
        let names = recover_names(entry, &mut result.warnings);
        let path = normalize_path(entry.pattern(), &names);
        debug!("Route {} -> {} ({})", entry.pattern(), path, handler.name);

        for method in &handler.methods {
            let Some(doc) = &method.doc else {
                debug!("{} {} is undocumented, skipping", method.method, path);
                continue;
            };
            let operation = self
                .assembler
                .assemble(doc, &path, &handler.name, method.method)?;
            result
                .paths
                .entry(path.clone())
                .or_default()
                .set(method.method, operation);
        }
        Ok(())
    }
}

/// Parameter names for every capture group of `entry`, taken positionally
/// from the first handler method that declares formal parameters.
fn recover_names(entry: &RouteEntry, warnings: &mut Vec<RecoveryWarning>) -> Vec<String> {
    let count = entry.group_count();
    if count == 0 {
        return Vec::new();
    }

    let handler = entry.handler();
    let mut report = |message: String| {
        let warning = RecoveryWarning {
            handler: handler.name.clone(),
            pattern: entry.pattern().to_string(),
            message,
        };
        warn!("Path parameter recovery: {}", warning);
        warnings.push(warning);
    };

    let mut names = vec![FALLBACK_NAME.to_string(); count];
    let Some(naming) = handler.naming_method() else {
        report(format!(
            "no method declares parameters for {} capture groups",
            count
        ));
        return names;
    };

    for (i, param) in naming.params.iter().enumerate() {
        if i >= count {
            report(format!(
                "{} declares {} parameters for {} capture groups",
                naming.method,
                naming.params.len(),
                count
            ));
            break;
        }
        if is_placeholder(param) {
            report(format!("parameter {} of {} is a placeholder", i, naming.method));
            continue;
        }
        names[i] = param.clone();
    }

    if naming.params.len() < count {
        report(format!(
            "{} declares {} parameters for {} capture groups",
            naming.method,
            naming.params.len(),
            count
        ));
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{OperationDoc, ResponseSpec};
    use crate::routes::{Handler, HttpMethod};
    use pretty_assertions::assert_eq;

    fn doc(summary: &str) -> OperationDoc {
        OperationDoc::new(["items"], summary, vec![ResponseSpec::ok()])
    }

    fn item_handler() -> Handler {
        Handler::new("ItemHandler")
            .method(HttpMethod::Get, ["item_id"])
            .method(HttpMethod::Delete, ["item_id"])
            .document(HttpMethod::Get, doc("fetch"))
            .unwrap()
    }

    fn walk(routes: &[RouteNode]) -> Result<WalkResult> {
        let assembler = OperationAssembler::new(None);
        RouteTreeWalker::new(&assembler).walk(routes)
    }

    #[test]
    fn test_path_reconstruction() {
        let result = walk(&[RouteNode::pattern(r"/items/(\d+)$", item_handler())]).unwrap();
        let item = &result.paths["/items/{item_id}"];
        assert_eq!(
            item.get.as_ref().unwrap().operation_id,
            "get_ItemHandler__items__item_id_"
        );
        assert!(item.delete.is_none());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_nested_groups_are_flattened() {
        let root = Handler::new("Root")
            .method(HttpMethod::Get, Vec::<String>::new())
            .document(HttpMethod::Get, doc("root"))
            .unwrap();
        let routes = vec![
            RouteNode::include(vec![
                RouteNode::include(vec![RouteNode::pattern(r"/items/(\d+)", item_handler())]),
                RouteNode::pattern("/", root),
            ]),
        ];
        let result = walk(&routes).unwrap();
        let paths: Vec<_> = result.paths.keys().cloned().collect();
        assert_eq!(paths, vec!["/", "/items/{item_id}"]);
    }

    #[test]
    fn test_deep_nesting() {
        let mut node = RouteNode::pattern("/deep", item_handler());
        for _ in 0..1_000 {
            node = RouteNode::include(vec![node]);
        }
        let result = walk(&[node]).unwrap();
        assert!(result.paths.contains_key("/deep"));
    }

    #[test]
    fn test_mounted_target_is_rejected() {
        let err = walk(&[RouteNode::Mounted("static_files".to_string())]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("static_files"));
    }

    #[test]
    fn test_placeholder_falls_back() {
        let handler = Handler::new("H")
            .method(HttpMethod::Put, ["_", "name"])
            .document(HttpMethod::Put, doc("put"))
            .unwrap();
        let result = walk(&[RouteNode::pattern(r"/a/(\d+)/(\w+)$", handler)]).unwrap();
        assert!(result.paths.contains_key("/a/{?}/{name}"));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("placeholder"));
    }

    #[test]
    fn test_nested_groups_keep_positional_names() {
        let handler = Handler::new("Version")
            .method(HttpMethod::Get, ["range", "lo", "hi", "slug"])
            .document(HttpMethod::Get, doc("version"))
            .unwrap();
        let result = walk(&[RouteNode::pattern(r"/v/((\d+)-(\d+))/(\w+)$", handler)]).unwrap();
        let paths: Vec<_> = result.paths.keys().cloned().collect();
        assert_eq!(paths, vec!["/v/{range}/{slug}"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_and_surplus_parameters_warn() {
        let short = Handler::new("Short")
            .method(HttpMethod::Get, ["a"])
            .document(HttpMethod::Get, doc("short"))
            .unwrap();
        let long = Handler::new("Long")
            .method(HttpMethod::Get, ["a", "b"])
            .document(HttpMethod::Get, doc("long"))
            .unwrap();
        let result = walk(&[
            RouteNode::pattern(r"/s/(\d+)/(\d+)$", short),
            RouteNode::pattern(r"/l/(\d+)$", long),
        ])
        .unwrap();

        assert!(result.paths.contains_key("/s/{a}/{?}"));
        assert!(result.paths.contains_key("/l/{a}"));
        let handlers: Vec<_> = result.warnings.iter().map(|w| w.handler.as_str()).collect();
        assert_eq!(handlers, vec!["Short", "Long"]);
    }

    #[test]
    fn test_undocumented_handlers_add_no_path() {
        let handler = Handler::new("Quiet").method(HttpMethod::Get, Vec::<String>::new());
        let result = walk(&[RouteNode::pattern("/quiet", handler)]).unwrap();
        assert!(result.paths.is_empty());
    }

    #[test]
    fn test_later_entries_overwrite_same_method() {
        let first = Handler::new("First")
            .method(HttpMethod::Get, Vec::<String>::new())
            .document(HttpMethod::Get, doc("first"))
            .unwrap();
        let second = Handler::new("Second")
            .method(HttpMethod::Get, Vec::<String>::new())
            .method(HttpMethod::Post, Vec::<String>::new())
            .document(HttpMethod::Post, doc("second post"))
            .unwrap()
            .document(HttpMethod::Get, doc("second"))
            .unwrap();
        let result = walk(&[
            RouteNode::pattern("/same", first),
            RouteNode::pattern("/same$", second),
        ])
        .unwrap();

        let item = &result.paths["/same"];
        assert_eq!(item.get.as_ref().unwrap().summary, "second");
        assert_eq!(item.post.as_ref().unwrap().summary, "second post");
    }

    #[test]
    fn test_precompiled_entries() {
        let entry = RouteEntry::new(r"/items/(\d+)", item_handler()).unwrap();
        let result = walk(&[RouteNode::from(entry)]).unwrap();
        assert!(result.paths.contains_key("/items/{item_id}"));
    }

    #[test]
    fn test_operation_failure_aborts_walk() {
        let handler = Handler::new("Broken")
            .method(HttpMethod::Post, Vec::<String>::new())
            .document(
                HttpMethod::Post,
                doc("broken").request_body(crate::body::BodyGroup::json(serde_json::json!({}))),
            )
            .unwrap();
        let err = walk(&[RouteNode::pattern("/broken", handler)]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
