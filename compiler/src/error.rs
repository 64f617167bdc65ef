use struct2msg_ast::SourceLoc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Struct2MsgError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clang AST error: {0}")]
    ClangAst(String),

    #[error("Invalid filter pattern: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("{count} declaration(s) could not be named")]
    Unresolved { count: usize },
}

/// An anonymous record that is not immediately followed by an alias
/// declaration. Recorded by the walker, never propagated.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot name {record} in {scope}{at}: followed by {found}", at = loc_suffix(.loc))]
pub struct NameResolutionFailure {
    /// e.g. `anonymous struct`.
    pub record: String,
    /// Enclosing scope, `::`-joined, or `global scope`.
    pub scope:  String,
    pub loc:    Option<SourceLoc>,
    /// What came next instead of an alias (`field inner`, `end of scope`, ...).
    pub found:  String,
}

fn loc_suffix(loc: &Option<SourceLoc>) -> String {
    match loc {
        Some(loc) => format!(" at {}", loc),
        None => String::new(),
    }
}
