use std::collections::{HashMap, HashSet};

use crate::term::{Statement, Term};
use crate::vocab::rdf;

/// Graph position of a query pattern.
#[derive(Debug, Clone, Copy)]
pub enum GraphMatch<'a> {
    Any,
    Default,
    Named(&'a Term),
}

/// In-memory set of statements.
///
/// Iteration follows first-insertion order; re-inserting a statement is a
/// no-op. Subject lookups go through an index, everything else scans.
#[derive(Debug, Clone, Default)]
pub struct Store {
    statements: Vec<Statement>,
    seen: HashSet<Statement>,
    by_subject: HashMap<Term, Vec<usize>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.seen.contains(statement)
    }

    /// Insert a statement. Returns `false` if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        if self.seen.contains(&statement) {
            return false;
        }
        let idx = self.statements.len();
        self.by_subject
            .entry(statement.subject.clone())
            .or_default()
            .push(idx);
        self.seen.insert(statement.clone());
        self.statements.push(statement);
        true
    }

    /// Convenience for default-graph inserts.
    pub fn add(&mut self, subject: Term, predicate: Term, object: Term) -> bool {
        self.insert(Statement::new(subject, predicate, object))
    }

    /// All statements matching the pattern, in store order. `None` is a wildcard.
    pub fn query(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph: GraphMatch<'_>,
    ) -> Vec<&Statement> {
        let matches = |st: &Statement| {
            predicate.is_none_or(|p| &st.predicate == p)
                && object.is_none_or(|o| &st.object == o)
                && match graph {
                    GraphMatch::Any => true,
                    GraphMatch::Default => st.graph.is_none(),
                    GraphMatch::Named(label) => st.graph.as_ref() == Some(label),
                }
        };

        match subject {
            Some(s) => self
                .by_subject
                .get(s)
                .map(|idxs| {
                    idxs.iter()
                        .map(|&i| &self.statements[i])
                        .filter(|&st| matches(st))
                        .collect()
                })
                .unwrap_or_default(),
            None => self.statements.iter().filter(|&st| matches(st)).collect(),
        }
    }

    /// Objects of `subject predicate ?o` in the default graph.
    pub fn objects(&self, subject: &Term, predicate: &str) -> Vec<&Term> {
        let predicate = Term::iri(predicate);
        self.query(Some(subject), Some(&predicate), None, GraphMatch::Default)
            .into_iter()
            .map(|st| &st.object)
            .collect()
    }

    /// Subjects of `?s predicate object` in the default graph.
    pub fn subjects(&self, predicate: &str, object: &Term) -> Vec<&Term> {
        let predicate = Term::iri(predicate);
        self.query(None, Some(&predicate), Some(object), GraphMatch::Default)
            .into_iter()
            .map(|st| &st.subject)
            .collect()
    }

    pub fn has_type(&self, node: &Term, class: &str) -> bool {
        self.objects(node, rdf::TYPE)
            .into_iter()
            .any(|t| t.is_iri(class))
    }

    /// Whether any statement carries `term` as its graph label.
    pub fn is_graph_label(&self, term: &Term) -> bool {
        self.statements
            .iter()
            .any(|st| st.graph.as_ref() == Some(term))
    }

    /// Whether `term` occurs anywhere, as a term or as a graph label.
    pub fn mentions(&self, term: &Term) -> bool {
        self.by_subject.contains_key(term)
            || self.statements.iter().any(|st| {
                &st.predicate == term || &st.object == term || st.graph.as_ref() == Some(term)
            })
    }

    /// The statements labelled `label`, moved into the default graph.
    ///
    /// Formulas nested inside them (labels that occur as terms of the
    /// extracted statements) come along with their own labels intact.
    pub fn subgraph(&self, label: &Term) -> Store {
        let mut out = Store::new();
        for st in self.query(None, None, None, GraphMatch::Named(label)) {
            out.insert(st.clone().in_graph(None));
        }

        let mut visited: HashSet<Term> = HashSet::from([label.clone()]);
        let mut pending: Vec<Term> = nested_labels(self, &out, &visited);
        while let Some(inner) = pending.pop() {
            if !visited.insert(inner.clone()) {
                continue;
            }
            for st in self.query(None, None, None, GraphMatch::Named(&inner)) {
                out.insert(st.clone());
            }
            pending.extend(nested_labels(self, &out, &visited));
        }
        out
    }

    /// Whether any statement is inside a formula, or carries one as a term.
    pub fn has_formulas(&self) -> bool {
        self.statements.iter().any(|st| {
            st.graph.is_some()
                || [&st.subject, &st.object]
                    .into_iter()
                    .any(|t| matches!(t, Term::Graph(_)))
        })
    }
}

/// Blank nodes in `part` that label statements in `whole` and are not yet visited.
fn nested_labels(whole: &Store, part: &Store, visited: &HashSet<Term>) -> Vec<Term> {
    part.iter()
        .flat_map(|st| [&st.subject, &st.object])
        .filter(|t| t.is_blank() && !visited.contains(*t) && whole.is_graph_label(t))
        .cloned()
        .collect()
}

/// Set equality; insertion order is ignored.
impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.seen == other.seen
    }
}

impl Eq for Store {}

impl Extend<Statement> for Store {
    fn extend<I: IntoIterator<Item = Statement>>(&mut self, iter: I) {
        for st in iter {
            self.insert(st);
        }
    }
}

impl FromIterator<Statement> for Store {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        let mut store = Store::new();
        store.extend(iter);
        store
    }
}

impl IntoIterator for Store {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Store {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
