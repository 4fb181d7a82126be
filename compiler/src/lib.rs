//! ccl-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for `.ccl` model schemas,
//!  2) A verifier (duplicate names, unresolved types, duplicate model ids),
//!  3) The type catalog and the per-model codec planner,
//!  4) The `Backend` trait with Go and Rust emitters,
//!  5) The `generate` pipeline writing artifacts to disk, and `CclError`.

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod verifier;
pub mod catalog;
pub mod planner;
pub mod compiler;
pub mod backend;
pub mod gen_go;
pub mod gen_rust;
pub mod generator;

pub use backend::{backend_for, emit, Artifact, ArtifactKind, Backend, GenerateOptions, BACKENDS};
pub use compiler::{compile_runtime_schema, compile_schema};
pub use error::CclError;
pub use generator::{generate, load_definition, read_source, write_artifacts};
pub use planner::{plan_definition, plan_model, FieldPlan, ModelPlan, Strategy};
pub use types::{Definition, Field, Model};
