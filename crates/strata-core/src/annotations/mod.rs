//! The `strata:` annotation language embedded in field doc comments.
//!
//! An annotation line looks like
//!
//! ```text
//! // strata: writable:post,put; readable; required; maxLength:100
//! ```
//!
//! The body after the marker is a list of clauses separated by `;`. A body
//! that contains no `;` at all is separated by `,` instead, so
//! `// strata: required, unique` works as well. Each clause is either a
//! `key:value` pair or a bare flag.

mod clause;
mod scanner;

pub use clause::{Clause, IgnoreScope, RelationKind, ValidationRule};
pub use scanner::ClauseScanner;

/// Comment prefixes that start an annotation line.
pub const MARKERS: [&str; 2] = ["// strata:", "//strata:"];

/// Returns the annotation body if `comment` is an annotation line.
#[must_use]
pub fn annotation_body(comment: &str) -> Option<&str> {
    MARKERS
        .iter()
        .find_map(|marker| comment.strip_prefix(marker))
        .map(str::trim)
}

/// Parses a comment line into its clauses. Returns `None` when the line
/// is not an annotation.
#[must_use]
pub fn parse_annotation(comment: &str) -> Option<Vec<Clause>> {
    annotation_body(comment).map(|body| ClauseScanner::new(body).map(Clause::parse).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_forms() {
        assert_eq!(annotation_body("// strata: required"), Some("required"));
        assert_eq!(annotation_body("//strata:required "), Some("required"));
        assert_eq!(annotation_body("// Name of the product"), None);
        assert_eq!(annotation_body("/* strata: required */"), None);
    }

    #[test]
    fn test_parse_annotation() {
        let clauses = parse_annotation("// strata: writable:post,put; readable; min:0").unwrap();
        assert_eq!(
            clauses,
            vec![
                Clause::Writable(vec!["POST".into(), "PUT".into()]),
                Clause::Readable,
                Clause::Validation(ValidationRule::Min, "0".into()),
            ]
        );
    }

    #[test]
    fn test_comma_separated_body() {
        let clauses = parse_annotation("// strata: required, unique, email").unwrap();
        assert_eq!(
            clauses,
            vec![
                Clause::Required,
                Clause::Unique,
                Clause::Validation(ValidationRule::Email, "true".into()),
            ]
        );
    }

    #[test]
    fn test_comma_fallback_splits_method_list() {
        // Without a `;` the method list is cut at the first comma.
        let clauses = parse_annotation("// strata: writable:post,put").unwrap();
        assert_eq!(
            clauses,
            vec![
                Clause::Writable(vec!["POST".into()]),
                Clause::Unknown("put".into()),
            ]
        );
    }
}
