//! struct2msg-compiler
//!
//! This crate implements:
//!  1) Two front-ends producing a declaration tree: a tokenizer + parser for
//!     C/C++ headers, and an importer for clang's JSON AST dump,
//!  2) The translation of record declarations into message schemas (name
//!     resolution, field extraction, type normalization),
//!  3) Rendering with sequential field tags (`render_schema`),
//!  4) The declaration walker and its emission filter,
//!  5) Error types (`Struct2MsgError`) and the `Frontend` trait.

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod clang_json;
pub mod traits;
pub mod normalize;
pub mod fields;
pub mod resolver;
pub mod emitter;
pub mod config;
pub mod walker;
pub mod compiler;

pub use compiler::{compile, compile_clang_json, compile_header};
pub use config::{EmissionFilter, GeneratorConfig};
pub use emitter::render_schema;
pub use walker::{DeclarationWalker, WalkReport};
