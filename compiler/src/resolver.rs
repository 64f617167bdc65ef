use struct2msg_ast::{DeclCursor, DeclKind};
use crate::error::NameResolutionFailure;

/// Name to emit for a record.
///
/// Named records use their `::`-qualified name. An anonymous record takes
/// the name of the alias declared immediately after it in the same scope
/// (`typedef struct { ... } Name;`); anything else is a failure. Only the
/// very next sibling is consulted.
pub fn resolve_name(record: &DeclCursor) -> Result<String, NameResolutionFailure> {
    if let Some(name) = record.qualified_name() {
        return Ok(name);
    }

    let next = record.next_sibling();
    match next.as_ref().map(|n| n.kind()) {
        Some(DeclKind::Alias(alias)) => Ok(alias.name.clone()),
        _ => Err(NameResolutionFailure {
            record: record.node().describe(),
            scope:  if record.scope().is_empty() {
                "global scope".to_owned()
            } else {
                record.scope().join("::")
            },
            loc:    record.node().loc,
            found:  next.map_or_else(|| "end of scope".to_owned(), |n| n.node().describe()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use struct2msg_ast::{Decl, SourceLoc, TagKind, TypeDesc};

    fn anonymous() -> Decl {
        Decl::record(None, TagKind::Struct, vec![]).at(2, 9)
    }

    #[test]
    fn named_record_uses_qualified_name() {
        let unit = Decl::translation_unit(vec![Decl::namespace(Some("n"), vec![
            Decl::namespace(Some("m"), vec![Decl::record(Some("C"), TagKind::Class, vec![])]),
        ])]);
        let root = DeclCursor::root(&unit);
        let n = root.children().next().unwrap();
        let m = n.children().next().unwrap();
        let c = m.children().next().unwrap();
        assert_eq!(resolve_name(&c).unwrap(), "n::m::C");
    }

    #[test]
    fn anonymous_record_takes_following_alias() {
        let unit = Decl::translation_unit(vec![
            anonymous(),
            Decl::alias("GeoFit", TypeDesc::Other("struct GeoFit".into())),
        ]);
        let anon = DeclCursor::root(&unit).children().next().unwrap();
        assert_eq!(resolve_name(&anon).unwrap(), "GeoFit");
    }

    #[test]
    fn only_the_next_sibling_counts() {
        let unit = Decl::translation_unit(vec![
            Decl::alias("Before", TypeDesc::Builtin("int".into())),
            anonymous(),
            Decl::other("VarDecl"),
            Decl::alias("After", TypeDesc::Builtin("int".into())),
        ]);
        let anon = DeclCursor::root(&unit).children().nth(1).unwrap();
        let failure = resolve_name(&anon).unwrap_err();
        assert_eq!(failure.found, "VarDecl");
        assert_eq!(failure.scope, "global scope");
        assert_eq!(failure.loc, Some(SourceLoc { line: 2, column: 9 }));
        assert_eq!(
            failure.to_string(),
            "cannot name anonymous struct in global scope at 2:9: followed by VarDecl"
        );
    }

    #[test]
    fn anonymous_record_at_end_of_scope_fails() {
        let unit = Decl::translation_unit(vec![Decl::namespace(Some("geo"), vec![anonymous()])]);
        let ns = DeclCursor::root(&unit).children().next().unwrap();
        let anon = ns.children().next().unwrap();
        let failure = resolve_name(&anon).unwrap_err();
        assert_eq!(failure.scope, "geo");
        assert_eq!(failure.found, "end of scope");
    }
}
