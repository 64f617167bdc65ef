use tracing::debug;
use crate::{
    config::GeneratorConfig,
    error::Struct2MsgError,
    traits::{ClangJsonFrontend, Frontend, HeaderFrontend},
    walker::{DeclarationWalker, WalkReport},
};

/// Parse `source` with `frontend`, then walk the resulting tree.
/// Returns `Err` only if the front-end rejects the input.
pub fn compile<F: Frontend + ?Sized>(
    frontend: &F,
    source: &str,
    config: &GeneratorConfig,
) -> Result<WalkReport, Struct2MsgError> {
    let root = frontend.parse(source)?;
    debug!(frontend = frontend.name(), declarations = root.inner.len(), "parsed input");
    Ok(DeclarationWalker::new(config).walk(&root))
}

/// Compile C/C++ header text with the built-in parser.
pub fn compile_header(text: &str, config: &GeneratorConfig) -> Result<WalkReport, Struct2MsgError> {
    compile(&HeaderFrontend, text, config)
}

/// Compile a clang JSON AST dump.
pub fn compile_clang_json(json: &str, config: &GeneratorConfig) -> Result<WalkReport, Struct2MsgError> {
    compile(&ClangJsonFrontend, json, config)
}
