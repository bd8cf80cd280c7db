pub mod parser;
pub mod validation;

pub use parser::{parse_document, parse_graph, to_graph_json, DocumentFormat};
pub use validation::{validate_graph, validate_graph_document, ValidationReport};
