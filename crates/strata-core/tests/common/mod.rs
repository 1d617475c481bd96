#![allow(dead_code)]

use strata_core::{parse_model_source, EntityMetadata, ParseError};

pub const PRODUCT: &str = r#"package models

import "time"

// Product is a catalogue entry.
type Product struct {
	// strata: primaryKey; autoIncrement
	ID uint `json:"id" gorm:"primaryKey"`

	// strata: writable:post,put; readable; required; unique
	Name string `json:"name"`

	// strata: writable:post,put,patch; min:0
	Age int `json:"age"`

	// strata: ignore:write; readable
	CreatedAt time.Time `json:"created_at" gorm:"autoCreateTime"`
}
"#;

pub const PRODUCT_WITH_BIO: &str = r#"package models

import "time"

type Product struct {
	// strata: primaryKey; autoIncrement
	ID uint `json:"id" gorm:"primaryKey"`

	// strata: writable:post,put; readable; required; unique
	Name string `json:"name"`

	// strata: writable:post,put,patch; min:0
	Age int `json:"age"`

	// strata: ignore:write; readable
	CreatedAt time.Time `json:"created_at" gorm:"autoCreateTime"`

	Bio string
}
"#;

pub fn parse(source: &str) -> EntityMetadata {
    parse_model_source(source, "model.go")
        .unwrap_or_else(|e| panic!("Failed to parse model:\n{source}\nError: {e}"))
}

pub fn parse_err(source: &str) -> ParseError {
    parse_model_source(source, "model.go").expect_err("Expected model parse error")
}
