//! Vocabulary IRIs used in queries and output

/// Prefixes declared in every SPARQL query and Turtle file
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", rdf::NS),
    ("xsd", xsd::NS),
    ("dcat", dcat::NS),
    ("dct", dct::NS),
    ("hydra", hydra::NS),
];

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

/// Data Catalog Vocabulary
pub mod dcat {
    pub const NS: &str = "http://www.w3.org/ns/dcat#";

    pub const CATALOG: &str = "http://www.w3.org/ns/dcat#Catalog";
    pub const DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
    /// Links a catalog to the datasets it aggregates
    pub const DATASET_PROP: &str = "http://www.w3.org/ns/dcat#dataset";
    pub const DISTRIBUTION: &str = "http://www.w3.org/ns/dcat#distribution";
}

/// Dublin Core terms
pub mod dct {
    pub const NS: &str = "http://purl.org/dc/terms/";

    pub const TITLE: &str = "http://purl.org/dc/terms/title";
}

/// Hydra core, used for collection paging metadata
pub mod hydra {
    pub const NS: &str = "http://www.w3.org/ns/hydra/core#";

    pub const PAGED_COLLECTION: &str = "http://www.w3.org/ns/hydra/core#PagedCollection";
    pub const FIRST_PAGE: &str = "http://www.w3.org/ns/hydra/core#firstPage";
    pub const NEXT_PAGE: &str = "http://www.w3.org/ns/hydra/core#nextPage";
    pub const LAST_PAGE: &str = "http://www.w3.org/ns/hydra/core#lastPage";
    pub const TOTAL_ITEMS: &str = "http://www.w3.org/ns/hydra/core#totalItems";
    pub const ITEMS_PER_PAGE: &str = "http://www.w3.org/ns/hydra/core#itemsPerPage";
}
