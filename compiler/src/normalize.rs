use struct2msg_ast::TypeDesc;
use tracing::warn;

/// Emitted in place of an alias whose target could not be resolved.
pub const UNRESOLVED_TYPE: &str = "<unresolved>";

/// Text to emit for a field's declared type.
///
/// Aliases that bottom out in a built-in are replaced by the built-in's
/// canonical spelling; aliases of anything else keep their own name. A
/// broken alias chain yields [`UNRESOLVED_TYPE`] instead of an error.
pub fn normalize_type(ty: &TypeDesc) -> String {
    match ty {
        TypeDesc::Builtin(name) | TypeDesc::Other(name) => name.clone(),
        TypeDesc::Alias { name, underlying } => {
            let mut target = underlying.as_deref();
            loop {
                match target {
                    Some(TypeDesc::Builtin(builtin)) => return builtin.clone(),
                    Some(TypeDesc::Other(_)) => return name.clone(),
                    Some(TypeDesc::Alias { underlying, .. }) => target = underlying.as_deref(),
                    None => {
                        warn!(alias = %name, "alias does not resolve to a known type");
                        return UNRESOLVED_TYPE.to_owned();
                    }
                }
            }
        }
    }
}
