//! N3 text ⇄ [`Store`].
//!
//! Parsing is delegated to `oxttl`; quoted formulas come back as blank graph
//! labels. Every parse re-scopes blank node labels with a fresh prefix so
//! that stores parsed separately can be merged without accidental joins.
//!
//! Serialization writes one statement per line with absolute IRIs only, so
//! two serialized stores can be concatenated into one document. Formula
//! labels are written inline as `{ … }` wherever they occur as a term.

use std::collections::{HashMap, HashSet};

use oxrdf::GraphName;
use oxttl::n3::{N3Parser, N3Term};
use uuid::Uuid;

use crate::error::ParseError;
use crate::store::Store;
use crate::term::{Statement, Term};
use crate::vocab::log;

/// Parse N3 (or Turtle / N-Triples, which it subsumes) with no base IRI.
pub fn parse(text: &str) -> Result<Store, ParseError> {
    parse_with_base(text, None)
}

pub fn parse_with_base(text: &str, base: Option<&str>) -> Result<Store, ParseError> {
    let mut parser = N3Parser::new();
    if let Some(base) = base {
        parser = parser
            .with_base_iri(base)
            .map_err(|e| ParseError::InvalidBase {
                base: base.to_string(),
                reason: e.to_string(),
            })?;
    }

    let scope = format!("b{}_", Uuid::new_v4().simple());
    let mut store = Store::new();
    for quad in parser.for_reader(text.as_bytes()) {
        let quad = quad.map_err(|e| ParseError::Syntax(e.to_string()))?;
        let graph = match quad.graph_name {
            GraphName::DefaultGraph => None,
            GraphName::NamedNode(n) => Some(Term::Iri(n.into_string())),
            GraphName::BlankNode(b) => Some(Term::Blank(format!("{scope}{}", b.as_str()))),
        };
        store.insert(Statement {
            subject: convert(quad.subject, &scope)?,
            predicate: convert(quad.predicate, &scope)?,
            object: convert(quad.object, &scope)?,
            graph,
        });
    }
    Ok(store)
}

#[allow(unreachable_patterns)]
fn convert(term: N3Term, scope: &str) -> Result<Term, ParseError> {
    match term {
        N3Term::NamedNode(n) => Ok(Term::Iri(n.into_string())),
        N3Term::BlankNode(b) => Ok(Term::Blank(format!("{scope}{}", b.as_str()))),
        N3Term::Literal(l) => Ok(match l.language() {
            Some(lang) => Term::lang(l.value(), lang),
            None => Term::typed(l.value(), l.datatype().as_str()),
        }),
        N3Term::Variable(v) => Ok(Term::Variable(v.as_str().to_string())),
        _ => Err(ParseError::Syntax("quoted triples are not supported".into())),
    }
}

/// Serialize a store as N3.
pub fn serialize(store: &Store) -> String {
    let mut by_label: HashMap<&Term, Vec<&Statement>> = HashMap::new();
    let mut label_order: Vec<&Term> = Vec::new();
    for st in store {
        if let Some(label) = &st.graph {
            let entry = by_label.entry(label).or_default();
            if entry.is_empty() {
                label_order.push(label);
            }
            entry.push(st);
        }
    }

    let referenced: HashSet<&Term> = store
        .iter()
        .flat_map(|st| [&st.subject, &st.predicate, &st.object])
        .filter(|t| by_label.contains_key(t))
        .collect();

    let writer = Writer { by_label };
    let mut out = String::new();
    for st in store.iter().filter(|st| st.graph.is_none()) {
        writer.statement(&mut out, st, &mut Vec::new());
        out.push('\n');
    }
    for label in label_order {
        if referenced.contains(label) {
            continue;
        }
        out.push_str(&label.to_string());
        out.push_str(" <");
        out.push_str(log::EQUAL_TO);
        out.push_str("> ");
        writer.formula(&mut out, label, &mut Vec::new());
        out.push_str(" .\n");
    }
    out
}

struct Writer<'a> {
    by_label: HashMap<&'a Term, Vec<&'a Statement>>,
}

impl<'a> Writer<'a> {
    fn statement(&self, out: &mut String, st: &'a Statement, open: &mut Vec<&'a Term>) {
        self.term(out, &st.subject, open);
        out.push(' ');
        self.term(out, &st.predicate, open);
        out.push(' ');
        self.term(out, &st.object, open);
        out.push_str(" .");
    }

    fn term(&self, out: &mut String, term: &'a Term, open: &mut Vec<&'a Term>) {
        if self.by_label.contains_key(term) && !open.contains(&term) {
            self.formula(out, term, open);
        } else {
            out.push_str(&term.to_string());
        }
    }

    fn formula(&self, out: &mut String, label: &'a Term, open: &mut Vec<&'a Term>) {
        open.push(label);
        out.push('{');
        for &st in self.by_label.get(label).into_iter().flatten() {
            out.push(' ');
            self.statement(out, st, open);
        }
        out.push_str(" }");
        open.pop();
    }
}
