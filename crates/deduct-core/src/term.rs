use std::fmt;
use std::sync::Arc;

use crate::vocab::{rdf, xsd};

/// A node or value in a fact graph.
///
/// Blank node identity is only meaningful within the store (or parse) that
/// produced it. `Graph` is a quoted formula carried as a value; it is kept
/// sorted and deduplicated so equality is set equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(Literal),
    Graph(Arc<[Statement]>),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub value: String,
    pub kind: LiteralKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiteralKind {
    Datatype(String),
    Language(String),
}

/// One fact. `graph` is `None` for the default graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Option<Term>,
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Term::Blank(id.into())
    }

    /// Plain string literal (`xsd:string`).
    pub fn string(value: impl Into<String>) -> Self {
        Term::typed(value, xsd::STRING)
    }

    pub fn integer(value: i64) -> Self {
        Term::typed(value.to_string(), xsd::INTEGER)
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Literal {
            value: value.into(),
            kind: LiteralKind::Datatype(datatype.into()),
        })
    }

    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal(Literal {
            value: value.into(),
            kind: LiteralKind::Language(language.into()),
        })
    }

    /// Quoted formula. Graph labels of the inputs are dropped: nesting is the scope.
    pub fn graph(statements: impl IntoIterator<Item = Statement>) -> Self {
        let mut statements: Vec<Statement> = statements
            .into_iter()
            .map(|st| Statement { graph: None, ..st })
            .collect();
        statements.sort();
        statements.dedup();
        Term::Graph(statements.into())
    }

    pub fn nil() -> Self {
        Term::iri(rdf::NIL)
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_iri(&self, iri: &str) -> bool {
        self.as_iri() == Some(iri)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    pub fn is_nil(&self) -> bool {
        self.is_iri(rdf::NIL)
    }
}

impl Literal {
    pub fn datatype(&self) -> &str {
        match &self.kind {
            LiteralKind::Datatype(dt) => dt,
            LiteralKind::Language(_) => rdf::LANG_STRING,
        }
    }

    /// Integer value, if the literal is typed as `xsd:integer` or a derived type.
    pub fn as_integer(&self) -> Option<i64> {
        if !xsd::INTEGER_TYPES.contains(&self.datatype()) {
            return None;
        }
        let lexical = self.value.trim();
        lexical
            .strip_prefix('+')
            .unwrap_or(lexical)
            .parse()
            .ok()
    }
}

impl Statement {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph: None,
        }
    }

    pub fn in_graph(self, graph: Option<Term>) -> Self {
        Self { graph, ..self }
    }
}

/// Write `value` as the body of a double-quoted N3 string.
pub(crate) fn write_escaped(f: &mut impl fmt::Write, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Write `iri` between angle brackets. Characters N3 forbids inside `<...>`
/// are written as `\u` escapes, so the IRI can never end early.
pub(crate) fn write_iri(f: &mut impl fmt::Write, iri: &str) -> fmt::Result {
    f.write_char('<')?;
    for c in iri.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '\0'..=' ' => {
                write!(f, "\\u{:04X}", c as u32)?
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char('>')
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        write_escaped(f, &self.value)?;
        f.write_str("\"")?;
        match &self.kind {
            LiteralKind::Datatype(dt) if dt == xsd::STRING => Ok(()),
            LiteralKind::Datatype(dt) => {
                f.write_str("^^")?;
                write_iri(f, dt)
            }
            LiteralKind::Language(lang) => write!(f, "@{lang}"),
        }
    }
}

/// N-Triples style rendering; formulas are written inline.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write_iri(f, iri),
            Term::Blank(id) => write!(f, "_:{id}"),
            Term::Literal(lit) => write!(f, "{lit}"),
            Term::Variable(name) => write!(f, "?{name}"),
            Term::Graph(statements) => {
                f.write_str("{")?;
                for st in statements.iter() {
                    write!(f, " {st}")?;
                }
                f.write_str(" }")
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_display() {
        assert_eq!(Term::string("hi").to_string(), "\"hi\"");
        assert_eq!(
            Term::integer(200).to_string(),
            "\"200\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        assert_eq!(Term::lang("chat", "fr").to_string(), "\"chat\"@fr");
    }

    #[test]
    fn test_literal_escaping() {
        let t = Term::string("a \"quoted\"\nline\\");
        assert_eq!(t.to_string(), r#""a \"quoted\"\nline\\""#);
    }

    #[test]
    fn test_iri_cannot_close_early() {
        let t = Term::iri("http://a> . <urn:evil> <urn:p> <urn:o/hello");
        assert_eq!(
            t.to_string(),
            r"<http://a\u003E\u0020.\u0020\u003Curn:evil\u003E\u0020\u003Curn:p\u003E\u0020\u003Curn:o/hello>"
        );
        assert_eq!(
            Term::iri("urn:a{b}|c^`d\\e\"").to_string(),
            r"<urn:a\u007Bb\u007D\u007Cc\u005E\u0060d\u005Ce\u0022>"
        );
        assert_eq!(Term::iri("urn:tab\there").to_string(), r"<urn:tab\u0009here>");
    }

    #[test]
    fn test_datatype_iri_is_escaped() {
        let t = Term::typed("1", "urn:dt> . <urn:s> <urn:p> <urn:o");
        assert!(!t.to_string().contains("> ."), "{t}");
        assert!(t.to_string().starts_with(r#""1"^^<urn:dt\u003E"#), "{t}");
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(Term::integer(404).as_literal().unwrap().as_integer(), Some(404));
        let plus = Term::typed("+201", crate::vocab::xsd::INTEGER);
        assert_eq!(plus.as_literal().unwrap().as_integer(), Some(201));
        let short = Term::typed("7", "http://www.w3.org/2001/XMLSchema#short");
        assert_eq!(short.as_literal().unwrap().as_integer(), Some(7));
    }

    #[test]
    fn test_string_is_not_integer() {
        assert_eq!(Term::string("200").as_literal().unwrap().as_integer(), None);
        let bad = Term::typed("two hundred", crate::vocab::xsd::INTEGER);
        assert_eq!(bad.as_literal().unwrap().as_integer(), None);
    }

    #[test]
    fn test_graph_is_set_valued() {
        let a = Statement::new(Term::iri("urn:a"), Term::iri("urn:p"), Term::integer(1));
        let b = Statement::new(Term::iri("urn:b"), Term::iri("urn:p"), Term::integer(2));
        let g1 = Term::graph([a.clone(), b.clone(), a.clone()]);
        let g2 = Term::graph([b, a]);
        assert_eq!(g1, g2);
        if let Term::Graph(sts) = &g1 {
            assert_eq!(sts.len(), 2);
        } else {
            panic!("expected graph");
        }
    }

    #[test]
    fn test_graph_display_inline() {
        let st = Statement::new(Term::iri("urn:a"), Term::iri("urn:p"), Term::blank("x"));
        assert_eq!(Term::graph([st]).to_string(), "{ <urn:a> <urn:p> _:x . }");
    }

    #[test]
    fn test_nil() {
        assert!(Term::nil().is_nil());
        assert!(!Term::blank("nil").is_nil());
    }
}
