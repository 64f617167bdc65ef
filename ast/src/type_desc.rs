/// Canonical spellings of the front-ends' built-in primitive types.
pub const BUILTIN_TYPES: [&str; 27] = [
    "void", "bool", "_Bool", "char", "signed char", "unsigned char",
    "wchar_t", "char8_t", "char16_t", "char32_t",
    "short", "unsigned short", "int", "unsigned int",
    "long", "unsigned long", "long long", "unsigned long long",
    "__int128", "unsigned __int128",
    "float", "double", "long double", "__fp16", "_Float16", "__bf16",
    "std::nullptr_t",
];

const CV_QUALIFIERS: [&str; 2] = ["const ", "volatile "];

/// Returns true if `spelling` names a built-in type, ignoring leading
/// cv-qualifiers (`const unsigned int` is built-in).
pub fn is_builtin(spelling: &str) -> bool {
    let mut rest = spelling.trim();
    while let Some(stripped) = CV_QUALIFIERS.iter().find_map(|q| rest.strip_prefix(q)) {
        rest = stripped.trim_start();
    }
    BUILTIN_TYPES.contains(&rest)
}

/// A field's declared type as the front-end understood it.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    /// A built-in primitive in its canonical spelling.
    Builtin(String),
    /// A typedef / `using` name. `underlying` is `None` when the front-end
    /// could not resolve what the alias stands for.
    Alias {
        name:       String,
        underlying: Option<Box<TypeDesc>>,
    },
    /// Anything else, as rendered by the front-end.
    Other(String),
}

impl TypeDesc {
    /// Classifies a spelling as `Builtin` or `Other`.
    pub fn from_spelling(spelling: &str) -> TypeDesc {
        if is_builtin(spelling) {
            TypeDesc::Builtin(spelling.to_owned())
        } else {
            TypeDesc::Other(spelling.to_owned())
        }
    }

    pub fn alias(name: &str, underlying: Option<TypeDesc>) -> TypeDesc {
        TypeDesc::Alias {
            name:       name.to_owned(),
            underlying: underlying.map(Box::new),
        }
    }

    /// The front-end's rendering of the declared type, alias names included.
    pub fn spelling(&self) -> &str {
        match self {
            TypeDesc::Builtin(name) | TypeDesc::Other(name) => name,
            TypeDesc::Alias { name, .. } => name,
        }
    }
}
