use std::io::{self, Write};
use struct2msg_ast::{Decl, DeclCursor};
use tracing::{debug, debug_span, warn};
use crate::{
    config::GeneratorConfig,
    emitter::write_schema,
    error::NameResolutionFailure,
    fields::extract_fields,
    resolver::resolve_name,
    types::SchemaDefinition,
};

/// Outcome of one walk, in traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkReport {
    /// Definitions that passed the filter.
    pub schemas:  Vec<SchemaDefinition>,
    /// Anonymous records that could not be named.
    pub failures: Vec<NameResolutionFailure>,
    /// Named definitions rejected by the filter.
    pub filtered: usize,
}

impl WalkReport {
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for schema in &self.schemas {
            write_schema(out, schema)?;
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        self.schemas.iter().map(ToString::to_string).collect()
    }

    /// Appends another report, keeping order.
    pub fn merge(&mut self, other: WalkReport) {
        self.schemas.extend(other.schemas);
        self.failures.extend(other.failures);
        self.filtered += other.filtered;
    }
}

/// Pre-order walk over every record definition in a declaration tree.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationWalker<'c> {
    config: &'c GeneratorConfig,
}

impl<'c> DeclarationWalker<'c> {
    pub fn new(config: &'c GeneratorConfig) -> DeclarationWalker<'c> {
        DeclarationWalker { config }
    }

    /// Walks the tree and collects what would be emitted. Never fails:
    /// records that cannot be named are reported and skipped.
    pub fn walk(&self, root: &Decl) -> WalkReport {
        let mut report = WalkReport::default();
        self.visit(DeclCursor::root(root), &mut report);
        debug!(
            emitted = report.schemas.len(),
            filtered = report.filtered,
            failed = report.failures.len(),
            "walk finished"
        );
        report
    }

    fn visit(&self, cursor: DeclCursor, report: &mut WalkReport) {
        if cursor.node().is_implicit() {
            return;
        }
        if cursor.as_record().is_some_and(|r| r.is_definition) {
            self.visit_record(&cursor, report);
        }
        for child in cursor.children() {
            self.visit(child, report);
        }
    }

    fn visit_record(&self, cursor: &DeclCursor, report: &mut WalkReport) {
        let name = match resolve_name(cursor) {
            Ok(name) => name,
            Err(failure) => {
                warn!(%failure, "skipping declaration");
                report.failures.push(failure);
                return;
            }
        };

        let _span = debug_span!("record", %name).entered();
        let definition = SchemaDefinition::new(name, extract_fields(cursor));
        if self.config.filter.accepts(&definition.name) {
            debug!(fields = definition.fields.len(), "emitting");
            report.schemas.push(definition);
        } else {
            debug!("filtered out");
            report.filtered += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::EmissionFilter, types::FieldDescriptor};
    use struct2msg_ast::{DeclKind, RecordDecl, TagKind, TypeDesc};

    fn int(name: &str) -> Decl {
        Decl::field(name, TypeDesc::Builtin("int".into()))
    }

    #[test]
    fn visits_parents_before_children() {
        let unit = Decl::translation_unit(vec![
            Decl::record(Some("Outer"), TagKind::Struct, vec![
                int("a"),
                Decl::record(Some("Inner"), TagKind::Struct, vec![int("b")]),
            ]),
            Decl::record(Some("Last"), TagKind::Struct, vec![]),
        ]);
        let config = GeneratorConfig::default();
        let report = DeclarationWalker::new(&config).walk(&unit);
        let names: Vec<_> = report.schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Outer::Inner", "Last"]);
        assert_eq!(report.schemas[0].fields, vec![FieldDescriptor::new("int", "a")]);
    }

    #[test]
    fn skips_implicit_and_forward_declarations() {
        let mut implicit = Decl::record(Some("Point"), TagKind::Struct, vec![]);
        if let DeclKind::Record(record) = &mut implicit.kind {
            record.is_implicit = true;
        }
        let forward = Decl::new(DeclKind::Record(RecordDecl {
            name:          Some("Later".into()),
            tag:           TagKind::Class,
            is_definition: false,
            is_implicit:   false,
        }));
        let unit = Decl::translation_unit(vec![
            forward,
            Decl::record(Some("Point"), TagKind::Struct, vec![implicit, int("x")]),
        ]);
        let config = GeneratorConfig::default();
        let report = DeclarationWalker::new(&config).walk(&unit);
        assert_eq!(report.schemas.len(), 1);
        assert_eq!(report.schemas[0].name, "Point");
    }

    #[test]
    fn failure_does_not_stop_the_walk() {
        let unit = Decl::translation_unit(vec![
            Decl::record(None, TagKind::Struct, vec![int("lost")]),
            Decl::other("VarDecl"),
            Decl::record(Some("Kept"), TagKind::Struct, vec![int("x")]),
        ]);
        let config = GeneratorConfig::default();
        let report = DeclarationWalker::new(&config).walk(&unit);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.render(), "Message Kept {\noptional int x = 1;\n}\n");
    }

    #[test]
    fn nested_records_of_unnamed_parent_are_still_visited() {
        let unit = Decl::translation_unit(vec![Decl::record(None, TagKind::Union, vec![
            Decl::record(Some("Inner"), TagKind::Struct, vec![int("v")]),
        ])]);
        let config = GeneratorConfig::default();
        let report = DeclarationWalker::new(&config).walk(&unit);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.schemas[0].name, "(anonymous union)::Inner");
    }

    #[test]
    fn filter_counts_rejections() {
        let unit = Decl::translation_unit(vec![
            Decl::record(Some("GeoFix"), TagKind::Struct, vec![int("a")]),
            Decl::record(Some("Other"), TagKind::Struct, vec![int("b")]),
        ]);
        let config = GeneratorConfig::with_filter(EmissionFilter::contains("Geo"));
        let report = DeclarationWalker::new(&config).walk(&unit);
        assert_eq!(report.schemas.len(), 1);
        assert_eq!(report.filtered, 1);
    }

    #[test]
    fn write_to_keeps_traversal_order() {
        let unit = Decl::translation_unit(vec![
            Decl::record(Some("A"), TagKind::Struct, vec![]),
            Decl::record(Some("B"), TagKind::Struct, vec![]),
        ]);
        let config = GeneratorConfig::default();
        let mut out = Vec::new();
        DeclarationWalker::new(&config).walk(&unit).write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Message A {\n}\nMessage B {\n}\n");
    }
}
