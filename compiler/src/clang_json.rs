//! Import of the JSON AST printed by
//! `clang -Xclang -ast-dump=json -fsyntax-only <file>`.

use std::fmt;
use serde::{
    de::{IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer,
};
use struct2msg_ast::{AliasDecl, Decl, DeclKind, FieldDecl, RecordDecl, SourceLoc, TagKind, TypeDesc};
use crate::{error::Struct2MsgError, utils::quote};

#[derive(Debug, Default)]
struct RawNode {
    kind:                String,
    name:                Option<String>,
    is_implicit:         bool,
    complete_definition: bool,
    tag_used:            Option<String>,
    ty:                  Option<RawType>,
    loc:                 Option<RawLoc>,
    range:               Option<RawRange>,
    inner:               Vec<RawNode>,
}

/// Whether the children of a node of this kind can hold declarations we
/// import. Statements and expressions (function bodies, initializers) and
/// template patterns are skipped without building nodes, so their depth
/// never counts against the JSON recursion limit.
fn keeps_children(kind: &str) -> bool {
    kind.ends_with("Decl") && !kind.contains("Template")
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<RawNode, D::Error> {
        deserializer.deserialize_map(RawNodeVisitor)
    }
}

struct RawNodeVisitor;

impl<'de> Visitor<'de> for RawNodeVisitor {
    type Value = RawNode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a clang AST node")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawNode, A::Error> {
        let mut node = RawNode::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "kind" => node.kind = map.next_value()?,
                "name" => node.name = map.next_value()?,
                "isImplicit" => node.is_implicit = map.next_value()?,
                "completeDefinition" => node.complete_definition = map.next_value()?,
                "tagUsed" => node.tag_used = map.next_value()?,
                "type" => node.ty = map.next_value()?,
                "loc" => node.loc = map.next_value()?,
                "range" => node.range = map.next_value()?,
                // clang prints `kind` before `inner`; without it, keep everything.
                "inner" if node.kind.is_empty() || keeps_children(&node.kind) => {
                    node.inner = map.next_value()?;
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(node)
    }
}

#[derive(Debug, Deserialize)]
struct RawType {
    #[serde(default, rename = "qualType")]
    qual_type:     String,
    #[serde(rename = "desugaredQualType")]
    desugared:     Option<String>,
    #[serde(rename = "typeAliasDeclId")]
    alias_decl_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLoc {
    line:      Option<usize>,
    col:       Option<usize>,
    #[serde(rename = "spellingLoc")]
    spelling:  Option<Box<RawLoc>>,
    #[serde(rename = "expansionLoc")]
    expansion: Option<Box<RawLoc>>,
}

#[derive(Debug, Deserialize)]
struct RawRange {
    begin: Option<RawLoc>,
    end:   Option<RawLoc>,
}

/// Clang only prints `line` when it changes, so the current line has to be
/// carried across every location in document order.
#[derive(Debug, Default)]
struct LineTracker {
    line: usize,
}

impl LineTracker {
    fn visit(&mut self, loc: &RawLoc) -> Option<SourceLoc> {
        if loc.spelling.is_some() || loc.expansion.is_some() {
            if let Some(spelling) = &loc.spelling {
                self.visit(spelling);
            }
            return loc.expansion.as_ref().and_then(|expansion| self.visit(expansion));
        }
        if let Some(line) = loc.line {
            self.line = line;
        }
        loc.col.map(|column| SourceLoc { line: self.line, column })
    }
}

/// Builds a declaration tree from clang's JSON AST dump.
pub fn parse_clang_json(json: &str) -> Result<Decl, Struct2MsgError> {
    let root: RawNode = serde_json::from_str(json)?;
    if root.kind != "TranslationUnitDecl" {
        return Err(Struct2MsgError::ClangAst(format!(
            "expected a TranslationUnitDecl at the root, found {}",
            quote(&root.kind)
        )));
    }
    let mut lines = LineTracker::default();
    Ok(convert(&root, &mut lines))
}

fn convert(node: &RawNode, lines: &mut LineTracker) -> Decl {
    let loc = node.loc.as_ref().and_then(|loc| lines.visit(loc));
    if let Some(range) = &node.range {
        for bound in [&range.begin, &range.end].into_iter().flatten() {
            lines.visit(bound);
        }
    }

    let name = node.name.as_deref().filter(|name| !name.is_empty());
    let kind = match node.kind.as_str() {
        "TranslationUnitDecl" => DeclKind::TranslationUnit,
        "NamespaceDecl" => DeclKind::Namespace(name.map(str::to_owned)),
        "LinkageSpecDecl" => DeclKind::LinkageSpec,
        "RecordDecl" | "CXXRecordDecl" => DeclKind::Record(RecordDecl {
            name:          name.map(str::to_owned),
            tag:           node
                .tag_used
                .as_deref()
                .and_then(TagKind::from_keyword)
                .unwrap_or(TagKind::Struct),
            is_definition: node.complete_definition,
            is_implicit:   node.is_implicit,
        }),
        "TypedefDecl" | "TypeAliasDecl" if name.is_some() => DeclKind::Alias(AliasDecl {
            name:   name.unwrap_or_default().to_owned(),
            target: type_desc(node.ty.as_ref()),
        }),
        // Anonymous struct/union members get an unnamed implicit field.
        "FieldDecl" if !node.is_implicit => DeclKind::Field(FieldDecl {
            name: name.unwrap_or_default().to_owned(),
            ty:   type_desc(node.ty.as_ref()),
        }),
        other => DeclKind::Other(other.to_owned()),
    };

    // `inner` may have been read before `kind` was known.
    let inner = if keeps_children(&node.kind) {
        node.inner.iter().map(|child| convert(child, lines)).collect()
    } else {
        Vec::new()
    };
    Decl { kind, loc, inner }
}

fn type_desc(ty: Option<&RawType>) -> TypeDesc {
    let Some(ty) = ty else {
        return TypeDesc::Other(String::new());
    };
    if ty.alias_decl_id.is_some() {
        return TypeDesc::Alias {
            name:       ty.qual_type.clone(),
            underlying: ty
                .desugared
                .as_deref()
                .map(|desugared| Box::new(TypeDesc::from_spelling(desugared))),
        };
    }
    TypeDesc::from_spelling(&ty.qual_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_tracker_carries_lines_forward() {
        let json = r#"{
          "kind": "TranslationUnitDecl",
          "loc": {}, "range": {"begin": {}, "end": {}},
          "inner": [
            {"kind": "CXXRecordDecl", "name": "A", "tagUsed": "struct", "completeDefinition": true,
             "loc": {"offset": 7, "line": 3, "col": 8, "tokLen": 1},
             "range": {"begin": {"offset": 0, "col": 1, "tokLen": 6}, "end": {"offset": 30, "line": 5, "col": 1, "tokLen": 1}},
             "inner": [
               {"kind": "FieldDecl", "name": "x", "type": {"qualType": "int"},
                "loc": {"offset": 15, "col": 7, "tokLen": 1},
                "range": {"begin": {"offset": 11, "line": 4, "col": 3, "tokLen": 3}, "end": {"offset": 15, "col": 7, "tokLen": 1}}}
             ]}
          ]
        }"#;
        let unit = parse_clang_json(json).unwrap();
        let record = &unit.inner[0];
        assert_eq!(record.loc, Some(SourceLoc { line: 3, column: 8 }));
        // The field's loc has no line: it inherits the range end of its parent.
        assert_eq!(record.inner[0].loc, Some(SourceLoc { line: 5, column: 7 }));
    }

    #[test]
    fn alias_types_keep_their_desugared_form() {
        let ty = RawType {
            qual_type:     "uint32_t".into(),
            desugared:     Some("unsigned int".into()),
            alias_decl_id: Some("0x1".into()),
        };
        assert_eq!(
            type_desc(Some(&ty)),
            TypeDesc::alias("uint32_t", Some(TypeDesc::Builtin("unsigned int".into())))
        );
    }

    #[test]
    fn deep_expressions_do_not_hit_the_recursion_limit() {
        let mut expr = r#"{"kind": "IntegerLiteral", "value": "1"}"#.to_owned();
        for _ in 0..200 {
            expr = format!(r#"{{"kind": "ParenExpr", "inner": [{}]}}"#, expr);
        }
        let json = format!(
            r#"{{"kind": "TranslationUnitDecl", "inner": [
                {{"kind": "VarDecl", "name": "v", "type": {{"qualType": "int"}}, "inner": [{}]}},
                {{"kind": "CXXRecordDecl", "name": "P", "tagUsed": "struct", "completeDefinition": true,
                  "inner": [{{"kind": "FieldDecl", "name": "x", "type": {{"qualType": "int"}}}}]}}
            ]}}"#,
            expr
        );
        let unit = parse_clang_json(&json).unwrap();
        assert_eq!(unit.inner.len(), 2);
        assert_eq!(unit.inner[0].kind, DeclKind::Other("VarDecl".into()));
        assert!(unit.inner[0].inner.is_empty());
        assert_eq!(unit.inner[1].as_record().and_then(|r| r.name.as_deref()), Some("P"));
        assert_eq!(unit.inner[1].inner[0].as_field().map(|f| f.name.as_str()), Some("x"));
    }

    #[test]
    fn template_patterns_are_opaque() {
        let json = r#"{
          "kind": "TranslationUnitDecl",
          "inner": [
            {"kind": "ClassTemplateDecl", "name": "Box",
             "inner": [
               {"kind": "TemplateTypeParmDecl", "name": "T", "tagUsed": "typename"},
               {"kind": "CXXRecordDecl", "name": "Box", "tagUsed": "struct", "completeDefinition": true,
                "inner": [{"kind": "FieldDecl", "name": "value", "type": {"qualType": "T"}}]}
             ]}
          ]
        }"#;
        let unit = parse_clang_json(json).unwrap();
        assert_eq!(unit.inner[0].kind, DeclKind::Other("ClassTemplateDecl".into()));
        assert!(unit.inner[0].inner.is_empty());
    }

    #[test]
    fn inner_before_kind_is_still_read() {
        let json = r#"{
          "inner": [{"kind": "CXXRecordDecl", "name": "A", "tagUsed": "class", "completeDefinition": true}],
          "kind": "TranslationUnitDecl"
        }"#;
        let unit = parse_clang_json(json).unwrap();
        assert_eq!(unit.inner.len(), 1);
        assert_eq!(unit.inner[0].as_record().map(|r| r.tag), Some(TagKind::Class));
    }

    #[test]
    fn rejects_non_translation_unit_root() {
        let err = parse_clang_json(r#"{"kind": "CXXRecordDecl"}"#).unwrap_err();
        assert!(matches!(err, Struct2MsgError::ClangAst(_)), "got {:?}", err);
    }
}
