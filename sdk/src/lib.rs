//! struct2msg
//!
//! Turns C/C++ struct declarations into numbered message schemas.
//!
//! - `generate_from_header` / `generate_from_clang_json` run a whole pass
//!   and hand back both the report and the rendered text
//! - `schemas_to_json` for tools that want structured output
//! - Re-exports of the compiler and declaration-tree types
//!
//! ```
//! use struct2msg::{generate_from_header, GeneratorConfig};
//!
//! let out = generate_from_header("struct Point { int x; int y; };", &GeneratorConfig::default()).unwrap();
//! assert_eq!(out.text, "Message Point {\noptional int x = 1;\noptional int y = 2;\n}\n");
//! ```

use tracing::info;

pub use struct2msg_compiler::{
    compile, compile_clang_json, compile_header, render_schema,
    DeclarationWalker, EmissionFilter, GeneratorConfig, WalkReport,
};
pub use struct2msg_compiler::error::{NameResolutionFailure, Struct2MsgError};
pub use struct2msg_compiler::types::{FieldDescriptor, SchemaDefinition};
pub use struct2msg_ast::{Decl, DeclCursor, DeclKind, TypeDesc};

use struct2msg_compiler::emitter::TaggedMessage;

/// Result of one generation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub report: WalkReport,
    /// Every emitted message, concatenated in traversal order.
    pub text:   String,
}

impl Generated {
    fn from_report(report: WalkReport) -> Generated {
        let text = report.render();
        info!(
            messages = report.schemas.len(),
            filtered = report.filtered,
            unresolved = report.failures.len(),
            "generated schemas"
        );
        Generated { report, text }
    }
}

/// Generate schemas from C/C++ header text.
pub fn generate_from_header(text: &str, config: &GeneratorConfig) -> Result<Generated, Struct2MsgError> {
    compile_header(text, config).map(Generated::from_report)
}

/// Generate schemas from a `clang -Xclang -ast-dump=json` dump.
pub fn generate_from_clang_json(json: &str, config: &GeneratorConfig) -> Result<Generated, Struct2MsgError> {
    compile_clang_json(json, config).map(Generated::from_report)
}

/// Pretty-printed JSON array of `{ name, fields: [{ tag, type, name }] }`.
pub fn schemas_to_json(schemas: &[SchemaDefinition]) -> Result<String, Struct2MsgError> {
    let messages: Vec<TaggedMessage> = schemas.iter().map(TaggedMessage::from).collect();
    Ok(serde_json::to_string_pretty(&messages)?)
}

pub mod error {
    pub use struct2msg_compiler::error::{NameResolutionFailure, Struct2MsgError};
}

pub mod traits {
    pub use struct2msg_compiler::traits::{ClangJsonFrontend, Frontend, HeaderFrontend};
}

pub mod ast {
    pub use struct2msg_ast::*;
}
