//! Recovers [`Handler`]s and their formal parameter names from Rust source.
//!
//! Every inherent `impl` block whose methods are named after HTTP verbs
//! (`get`, `post`, ...) describes one handler. The receiver is not a formal
//! parameter; patterns without a single binding are recorded as `_`.

use super::{Handler, HttpMethod, MethodHandler};
use crate::error::Result;
use log::debug;
use syn::ext::IdentExt;
use syn::visit::{self, Visit};
use syn::{FnArg, ImplItem, ItemImpl, Pat, Signature, Type};

/// Parse `source` and collect one handler per type with HTTP verb methods.
///
/// Methods of the same type spread over several `impl` blocks are merged in
/// source order.
pub fn parse_handlers(source: &str) -> Result<Vec<Handler>> {
    let file = syn::parse_file(source)?;
    let mut visitor = HandlerVisitor::default();
    visitor.visit_file(&file);
    debug!("Recovered {} handlers from source", visitor.handlers.len());
    Ok(visitor.handlers)
}

/// Formal parameter names of a signature, receiver excluded.
pub fn formal_params(sig: &Signature) -> Vec<String> {
    sig.inputs
        .iter()
        .filter_map(|input| match input {
            FnArg::Receiver(_) => None,
            FnArg::Typed(pat_type) => Some(binding_name(&pat_type.pat)),
        })
        .collect()
}

fn binding_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(pat_ident) => pat_ident.ident.unraw().to_string(),
        Pat::Reference(reference) => binding_name(&reference.pat),
        Pat::Type(pat_type) => binding_name(&pat_type.pat),
        Pat::Paren(paren) => binding_name(&paren.pat),
        _ => "_".to_string(),
    }
}

fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.unraw().to_string()),
        _ => None,
    }
}

fn verb(ident: &syn::Ident) -> Option<HttpMethod> {
    let name = ident.unraw().to_string();
    HttpMethod::ALL.into_iter().find(|m| m.as_str() == name)
}

#[derive(Default)]
struct HandlerVisitor {
    handlers: Vec<Handler>,
}

impl HandlerVisitor {
    fn collect(&mut self, item: &ItemImpl) {
        if item.trait_.is_some() {
            return;
        }
        let Some(name) = type_name(&item.self_ty) else {
            return;
        };

        let methods: Vec<_> = item
            .items
            .iter()
            .filter_map(|impl_item| match impl_item {
                ImplItem::Fn(f) => verb(&f.sig.ident).map(|m| (m, formal_params(&f.sig))),
                _ => None,
            })
            .collect();
        if methods.is_empty() {
            return;
        }

        let index = match self.handlers.iter().position(|h| h.name == name) {
            Some(index) => index,
            None => {
                self.handlers.push(Handler::new(name));
                self.handlers.len() - 1
            }
        };
        let handler = &mut self.handlers[index];
        for (method, params) in methods {
            if handler.supports(method) {
                debug!("{} declares {} twice; keeping the first", handler.name, method);
                continue;
            }
            debug!("{}::{} takes {:?}", handler.name, method, params);
            handler.methods.push(MethodHandler {
                method,
                params,
                doc: None,
            });
        }
    }
}

impl<'ast> Visit<'ast> for HandlerVisitor {
    fn visit_item_impl(&mut self, item: &'ast ItemImpl) {
        self.collect(item);
        visit::visit_item_impl(self, item);
    }
}
