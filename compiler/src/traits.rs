use crate::{
    clang_json::parse_clang_json,
    error::Struct2MsgError,
    parser::parse_header,
    tokenizer::tokenize_header,
};
use struct2msg_ast::Decl;

/// Anything that can turn source text into a declaration tree.
pub trait Frontend {
    fn name(&self) -> &'static str;
    fn parse(&self, source: &str) -> Result<Decl, Struct2MsgError>;
}

/// The built-in C/C++ header parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderFrontend;

impl Frontend for HeaderFrontend {
    fn name(&self) -> &'static str {
        "header"
    }

    fn parse(&self, source: &str) -> Result<Decl, Struct2MsgError> {
        let tokens = tokenize_header(source)?;
        parse_header(&tokens)
    }
}

/// Reads `clang -Xclang -ast-dump=json` output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClangJsonFrontend;

impl Frontend for ClangJsonFrontend {
    fn name(&self) -> &'static str {
        "clang-json"
    }

    fn parse(&self, source: &str) -> Result<Decl, Struct2MsgError> {
        parse_clang_json(source)
    }
}
