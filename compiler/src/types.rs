use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub type_: String,
    pub name:  String,
}

impl FieldDescriptor {
    pub fn new(type_: impl Into<String>, name: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor { type_: type_.into(), name: name.into() }
    }
}

/// A named message with ordered fields. Field order decides the tags.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SchemaDefinition {
    pub name:   String,
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> SchemaDefinition {
        SchemaDefinition { name: name.into(), fields }
    }

    /// Fields paired with their tags, starting at 1.
    pub fn tagged_fields(&self) -> impl Iterator<Item = (u32, &FieldDescriptor)> {
        (1u32..).zip(self.fields.iter())
    }
}
