//! Fixed IRIs shared by the encoder, resolver and renderer.

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const LOG: &str = "http://www.w3.org/2000/10/swap/log#";
pub const HTTP: &str = "http://deduct.dev/ns/http#";
pub const HTML: &str = "http://deduct.dev/ns/html#";

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// `xsd:integer` and the datatypes derived from it.
    pub const INTEGER_TYPES: &[&str] = &[
        "http://www.w3.org/2001/XMLSchema#integer",
        "http://www.w3.org/2001/XMLSchema#int",
        "http://www.w3.org/2001/XMLSchema#long",
        "http://www.w3.org/2001/XMLSchema#short",
        "http://www.w3.org/2001/XMLSchema#byte",
        "http://www.w3.org/2001/XMLSchema#nonNegativeInteger",
        "http://www.w3.org/2001/XMLSchema#positiveInteger",
        "http://www.w3.org/2001/XMLSchema#unsignedInt",
        "http://www.w3.org/2001/XMLSchema#unsignedLong",
        "http://www.w3.org/2001/XMLSchema#unsignedShort",
        "http://www.w3.org/2001/XMLSchema#unsignedByte",
    ];
}

pub mod log {
    pub const EQUAL_TO: &str = "http://www.w3.org/2000/10/swap/log#equalTo";
}

/// Request and response descriptor vocabulary.
pub mod http {
    pub const REQUEST: &str = "http://deduct.dev/ns/http#Request";
    pub const PATH: &str = "http://deduct.dev/ns/http#path";
    pub const HREF: &str = "http://deduct.dev/ns/http#href";
    pub const METHOD: &str = "http://deduct.dev/ns/http#method";
    pub const CONTENT_TYPE: &str = "http://deduct.dev/ns/http#contentType";
    pub const BODY: &str = "http://deduct.dev/ns/http#body";
    pub const RESPONDS_TO: &str = "http://deduct.dev/ns/http#respondsTo";
    pub const RESPONSE_CODE: &str = "http://deduct.dev/ns/http#responseCode";
}

/// Graph-encoded hypertext vocabulary.
pub mod html {
    pub const ELEMENT: &str = "http://deduct.dev/ns/html#Element";
    pub const TEXT: &str = "http://deduct.dev/ns/html#Text";
    pub const TAG: &str = "http://deduct.dev/ns/html#tag";
    pub const CHILDREN: &str = "http://deduct.dev/ns/html#children";
    pub const CONTENT: &str = "http://deduct.dev/ns/html#content";
    pub const ATTRIBUTE_NAME: &str = "http://deduct.dev/ns/html#attributeName";
    pub const ATTRIBUTE_VALUE: &str = "http://deduct.dev/ns/html#attributeValue";
}
