use std::fmt;
use std::io::{self, Write};
use serde::Serialize;
use crate::types::SchemaDefinition;

/// Written before every field; the schemas carry no required/repeated
/// distinction.
pub const FIELD_MODIFIER: &str = "optional";

/// Renders
///
/// ```text
/// Message <name> {
/// optional <type> <field> = <tag>;
/// }
/// ```
///
/// with tags numbered from 1 in field order.
///
/// # Panics
///
/// If the definition has an empty name.
pub fn render_schema(definition: &SchemaDefinition) -> String {
    definition.to_string()
}

pub fn write_schema<W: Write>(out: &mut W, definition: &SchemaDefinition) -> io::Result<()> {
    write!(out, "{}", definition)
}

impl fmt::Display for SchemaDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        assert!(!self.name.is_empty(), "cannot render a schema definition without a name");
        writeln!(f, "Message {} {{", self.name)?;
        for (tag, field) in self.tagged_fields() {
            writeln!(f, "{} {} {} = {};", FIELD_MODIFIER, field.type_, field.name, tag)?;
        }
        writeln!(f, "}}")
    }
}

/// JSON shape of one rendered message.
#[derive(Debug, Serialize)]
pub struct TaggedMessage<'a> {
    pub name:   &'a str,
    pub fields: Vec<TaggedField<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TaggedField<'a> {
    pub tag:  u32,
    #[serde(rename = "type")]
    pub type_: &'a str,
    pub name: &'a str,
}

impl<'a> From<&'a SchemaDefinition> for TaggedMessage<'a> {
    fn from(definition: &'a SchemaDefinition) -> Self {
        TaggedMessage {
            name:   &definition.name,
            fields: definition
                .tagged_fields()
                .map(|(tag, field)| TaggedField { tag, type_: &field.type_, name: &field.name })
                .collect(),
        }
    }
}
