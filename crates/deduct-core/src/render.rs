//! Graph-encoded hypertext to markup.
//!
//! A node renders according to what it is: a literal is emitted verbatim,
//! an `html:Element` as a tag around its children, an `html:Text` as its
//! content, and a bare list as the concatenation of its items. Output is
//! trusted markup; nothing is escaped.

use std::collections::HashSet;

use crate::error::RenderError;
use crate::store::Store;
use crate::term::Term;
use crate::vocab::{html, rdf};

pub const MAX_DEPTH: usize = 256;

/// Tags rendered without a closing tag; their children are never visited.
const VOID_TAGS: &[&str] = &["meta", "link", "br", "hr", "img", "input"];

const DOCUMENT_TAG: &str = "html";
const DOCTYPE: &str = "<!DOCTYPE html>";

pub fn render<'a>(store: &'a Store, node: &'a Term) -> Result<String, RenderError> {
    let mut out = String::new();
    Renderer {
        store,
        path: Vec::new(),
    }
    .node(&mut out, node)?;
    Ok(out)
}

/// Whether `node` is something [`render`] knows how to start from.
pub fn is_hypertext(store: &Store, node: &Term) -> bool {
    store.has_type(node, html::ELEMENT) || store.has_type(node, html::TEXT) || is_list(store, node)
}

fn is_list(store: &Store, node: &Term) -> bool {
    node.is_nil() || !store.objects(node, rdf::FIRST).is_empty()
}

struct Renderer<'a> {
    store: &'a Store,
    /// Nodes currently being rendered, outermost first.
    path: Vec<&'a Term>,
}

impl<'a> Renderer<'a> {
    fn node(&mut self, out: &mut String, node: &'a Term) -> Result<(), RenderError> {
        if let Term::Literal(lit) = node {
            out.push_str(&lit.value);
            return Ok(());
        }
        if self.path.contains(&node) {
            return Err(RenderError::Cycle {
                node: node.to_string(),
            });
        }
        if self.path.len() >= MAX_DEPTH {
            return Err(RenderError::TooDeep {
                node: node.to_string(),
                limit: MAX_DEPTH,
            });
        }

        self.path.push(node);
        let result = if self.store.has_type(node, html::ELEMENT) {
            self.element(out, node)
        } else if self.store.has_type(node, html::TEXT) {
            self.text(out, node)
        } else if is_list(self.store, node) {
            self.items(out, node)
        } else {
            Err(unrenderable(
                node,
                "not an element, text node, list or literal",
            ))
        };
        self.path.pop();
        result
    }

    fn element(&mut self, out: &mut String, node: &'a Term) -> Result<(), RenderError> {
        let tag = single(self.store, node, html::TAG)?
            .as_literal()
            .map(|lit| lit.value.as_str())
            .ok_or_else(|| unrenderable(node, "tag name is not a literal"))?;
        let attribute = self.attribute(node)?;

        if tag == DOCUMENT_TAG {
            out.push_str(DOCTYPE);
        }
        out.push('<');
        out.push_str(tag);
        match attribute {
            Some(("viewport", value)) if tag == "meta" => {
                out.push_str(" name=\"viewport\" content=\"");
                out.push_str(value);
                out.push('"');
            }
            Some((name, value)) => {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(value);
                out.push('"');
            }
            None => {}
        }
        out.push('>');

        if VOID_TAGS.contains(&tag) {
            return Ok(());
        }

        if let Some(children) = optional(self.store, node, html::CHILDREN)? {
            if !is_list(self.store, children) {
                return Err(unrenderable(node, "children is not a list"));
            }
            self.items(out, children)?;
        }

        out.push_str("</");
        out.push_str(tag);
        out.push('>');
        Ok(())
    }

    fn text(&self, out: &mut String, node: &'a Term) -> Result<(), RenderError> {
        match single(self.store, node, html::CONTENT)?.as_literal() {
            Some(lit) => {
                out.push_str(&lit.value);
                Ok(())
            }
            None => Err(unrenderable(node, "text content is not a literal")),
        }
    }

    fn attribute(&self, node: &'a Term) -> Result<Option<(&'a str, &'a str)>, RenderError> {
        let name = optional(self.store, node, html::ATTRIBUTE_NAME)?;
        let value = optional(self.store, node, html::ATTRIBUTE_VALUE)?;
        match (name, value) {
            (None, None) => Ok(None),
            (Some(name), Some(value)) => match (name.as_literal(), value.as_literal()) {
                (Some(name), Some(value)) => Ok(Some((name.value.as_str(), value.value.as_str()))),
                _ => Err(unrenderable(node, "attribute name and value must be literals")),
            },
            _ => Err(unrenderable(
                node,
                "attribute needs both a name and a value",
            )),
        }
    }

    fn items(&mut self, out: &mut String, list: &'a Term) -> Result<(), RenderError> {
        for item in list_items(self.store, list)? {
            self.node(out, item)?;
        }
        Ok(())
    }
}

/// Decode a `rdf:first` / `rdf:rest` chain without recursion.
pub fn list_items<'a>(store: &'a Store, head: &'a Term) -> Result<Vec<&'a Term>, RenderError> {
    let mut items = Vec::new();
    let mut seen: HashSet<&Term> = HashSet::new();
    let mut cell = head;
    while !cell.is_nil() {
        if !seen.insert(cell) {
            return Err(RenderError::Cycle {
                node: cell.to_string(),
            });
        }
        items.push(single(store, cell, rdf::FIRST)?);
        cell = single(store, cell, rdf::REST)?;
    }
    Ok(items)
}

fn single<'a>(store: &'a Store, node: &Term, predicate: &str) -> Result<&'a Term, RenderError> {
    match optional(store, node, predicate)? {
        Some(term) => Ok(term),
        None => Err(unrenderable(node, &format!("missing <{predicate}>"))),
    }
}

fn optional<'a>(
    store: &'a Store,
    node: &Term,
    predicate: &str,
) -> Result<Option<&'a Term>, RenderError> {
    let objects = store.objects(node, predicate);
    match objects.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(*one)),
        many => Err(unrenderable(
            node,
            &format!("expected one <{predicate}>, found {}", many.len()),
        )),
    }
}

fn unrenderable(node: &Term, reason: &str) -> RenderError {
    RenderError::Unrenderable {
        node: node.to_string(),
        reason: reason.to_string(),
    }
}
