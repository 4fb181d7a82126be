//! Rust code generated from `schema/shapes.ccl`, regenerate with
//! `ccl-gen generate --source example/schema/shapes.ccl --language rust --output example/src/generated`.

pub mod generated;
