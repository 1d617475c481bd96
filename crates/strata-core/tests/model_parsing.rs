//! Tests for reading annotated model files.

mod common;
use common::*;

use strata_core::annotations::ValidationRule;
use strata_core::metadata::RelationMetadata;
use strata_core::ParseError;

#[test]
fn parses_product_fixture() {
    let entity = parse(PRODUCT);
    assert_eq!(entity.name, "Product");
    assert_eq!(entity.table_name, "products");

    let names: Vec<_> = entity.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["ID", "Name", "Age", "CreatedAt"]);

    let age = entity.field("Age").unwrap();
    assert_eq!(
        age.validations.get(&ValidationRule::Min).map(String::as_str),
        Some("0")
    );
    assert_eq!(age.writable, ["POST", "PUT", "PATCH"]);
}

#[test]
fn readable_defaults_to_true_without_annotation_or_tag() {
    let entity = parse("package models\n\ntype Note struct {\n\tBody string\n}\n");
    let body = entity.field("Body").unwrap();
    assert!(body.readable);
    assert!(body.is_readable());
    assert!(body.serialization_name.is_empty());
}

#[test]
fn post_only_field_is_not_writable_via_put() {
    let entity = parse(
        "package models\n\ntype User struct {\n\t// strata: writable:post; readable\n\tEmail string\n\tNick string\n}\n",
    );
    let email = entity.field("Email").unwrap();
    assert!(email.is_writable_in("POST"));
    assert!(!email.is_writable_in("PUT"));

    let nick = entity.field("Nick").unwrap();
    for method in ["POST", "PUT", "PATCH", "DELETE"] {
        assert!(nick.is_writable_in(method));
    }
}

#[test]
fn every_marker_line_is_applied() {
    let entity = parse(
        "package models\n\ntype User struct {\n\t// strata: required\n\t// Free text in between.\n\t//strata: unique; index\n\tEmail string\n}\n",
    );
    let email = entity.field("Email").unwrap();
    assert!(email.required);
    assert!(email.unique);
    assert!(email.indexed);
}

#[test]
fn comment_separated_by_blank_line_is_not_attached() {
    let entity = parse(
        "package models\n\ntype User struct {\n\t// strata: required\n\n\tEmail string\n}\n",
    );
    assert!(!entity.field("Email").unwrap().required);
}

#[test]
fn relation_clauses_build_relation_metadata() {
    let entity = parse(
        "package models\n\ntype Post struct {\n\t// strata: relation:manyToMany; through:post_tags; model:Tag\n\tTags []Tag\n}\n",
    );
    let tags = entity.field("Tags").unwrap();
    let relation: &RelationMetadata = tags.relation.as_ref().unwrap();
    assert_eq!(relation.kind.as_ref().map(|k| k.as_str()), Some("manyToMany"));
    assert_eq!(relation.through.as_deref(), Some("post_tags"));
    assert_eq!(relation.model.as_deref(), Some("Tag"));
    assert!(!tags.is_persisted());
}

#[test]
fn only_first_struct_is_used() {
    let entity = parse(
        "package models\n\ntype Status string\n\ntype Order struct {\n\tTotal float64\n}\n\ntype Line struct {\n\tQty int\n}\n",
    );
    assert_eq!(entity.name, "Order");
    assert_eq!(entity.table_name, "orders");
}

#[test]
fn functions_and_methods_are_skipped() {
    let entity = parse(
        r#"package models

type Invoice struct {
	Number string
}

func (Invoice) TableName() string {
	return "invoices"
}

func (i *Invoice) Validate() error {
	if i.Number == "" {
		return nil
	}
	return nil
}
"#,
    );
    assert_eq!(entity.fields.len(), 1);
}

#[test]
fn file_without_struct_fails() {
    let err = parse_err("package models\n\nfunc Helper() {}\n");
    assert!(matches!(err, ParseError::NoStruct { .. }));
}

#[test]
fn malformed_source_fails() {
    assert!(matches!(
        parse_err("package models\n\ntype Broken struct {\n\tName \"tag\n}\n"),
        ParseError::Syntax { .. }
    ));
    assert!(matches!(parse_err("type X struct{}"), ParseError::Syntax { .. }));
}

#[test]
fn parsing_is_idempotent() {
    assert_eq!(parse(PRODUCT), parse(PRODUCT));
}
