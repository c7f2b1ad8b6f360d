//! IRI constants for the vocabularies the engine needs to recognize.

/// [RDF](https://www.w3.org/TR/rdf11-concepts/) vocabulary.
pub mod rdf {
    /// The datatype of RDF 1.1 language-tagged string literals.
    pub const LANG_STRING: &str =
        "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// [XML Schema](https://www.w3.org/TR/xmlschema11-2/) datatypes.
pub mod xsd {
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const BYTE: &str = "http://www.w3.org/2001/XMLSchema#byte";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
    pub const NEGATIVE_INTEGER: &str =
        "http://www.w3.org/2001/XMLSchema#negativeInteger";
    pub const NON_NEGATIVE_INTEGER: &str =
        "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";
    pub const NON_POSITIVE_INTEGER: &str =
        "http://www.w3.org/2001/XMLSchema#nonPositiveInteger";
    pub const POSITIVE_INTEGER: &str =
        "http://www.w3.org/2001/XMLSchema#positiveInteger";
    pub const SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const UNSIGNED_BYTE: &str = "http://www.w3.org/2001/XMLSchema#unsignedByte";
    pub const UNSIGNED_INT: &str = "http://www.w3.org/2001/XMLSchema#unsignedInt";
    pub const UNSIGNED_LONG: &str = "http://www.w3.org/2001/XMLSchema#unsignedLong";
    pub const UNSIGNED_SHORT: &str =
        "http://www.w3.org/2001/XMLSchema#unsignedShort";

    /// The datatypes whose value space is handled as `xsd:integer`.
    pub const INTEGER_FAMILY: &[&str] = &[
        INTEGER,
        LONG,
        INT,
        SHORT,
        BYTE,
        NON_NEGATIVE_INTEGER,
        NON_POSITIVE_INTEGER,
        NEGATIVE_INTEGER,
        POSITIVE_INTEGER,
        UNSIGNED_LONG,
        UNSIGNED_INT,
        UNSIGNED_SHORT,
        UNSIGNED_BYTE,
    ];
}
