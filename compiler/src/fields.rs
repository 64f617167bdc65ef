use struct2msg_ast::DeclCursor;
use tracing::trace;
use crate::{normalize::normalize_type, types::FieldDescriptor};

/// One descriptor per immediate field member, in declaration order.
pub fn extract_fields(record: &DeclCursor) -> Vec<FieldDescriptor> {
    record
        .fields()
        .map(|field| {
            let type_ = normalize_type(&field.ty);
            trace!(field = %field.name, declared = field.ty.spelling(), emitted = %type_);
            FieldDescriptor::new(type_, field.name.as_str())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use struct2msg_ast::{Decl, TagKind, TypeDesc};

    #[test]
    fn keeps_declaration_order_and_normalizes() {
        let unit = Decl::translation_unit(vec![Decl::record(Some("Packet"), TagKind::Struct, vec![
            Decl::field("size", TypeDesc::alias("uint16_t", Some(TypeDesc::Builtin("unsigned short".into())))),
            Decl::record(Some("Header"), TagKind::Struct, vec![Decl::field("magic", TypeDesc::Builtin("int".into()))]),
            Decl::field("header", TypeDesc::Other("Header".into())),
            Decl::field("a", TypeDesc::Builtin("char".into())),
        ])]);
        let packet = DeclCursor::root(&unit).children().next().unwrap();

        assert_eq!(extract_fields(&packet), vec![
            FieldDescriptor::new("unsigned short", "size"),
            FieldDescriptor::new("Header", "header"),
            FieldDescriptor::new("char", "a"),
        ]);
    }

    #[test]
    fn record_without_fields_is_empty() {
        let unit = Decl::translation_unit(vec![Decl::record(Some("Empty"), TagKind::Class, vec![])]);
        let empty = DeclCursor::root(&unit).children().next().unwrap();
        assert!(extract_fields(&empty).is_empty());
    }
}
