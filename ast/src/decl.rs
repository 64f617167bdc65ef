use crate::type_desc::TypeDesc;
use std::fmt;

/// Position of a declaration in its source file (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLoc {
    pub line:   usize,
    pub column: usize,
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The keyword a record was introduced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Struct,
    Class,
    Union,
}

impl TagKind {
    pub fn from_keyword(keyword: &str) -> Option<TagKind> {
        match keyword {
            "struct" => Some(TagKind::Struct),
            "class"  => Some(TagKind::Class),
            "union"  => Some(TagKind::Union),
            _        => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            TagKind::Struct => "struct",
            TagKind::Class  => "class",
            TagKind::Union  => "union",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecl {
    /// `None` for anonymous records.
    pub name:          Option<String>,
    pub tag:           TagKind,
    /// `false` for forward declarations.
    pub is_definition: bool,
    /// Compiler-generated (e.g. the injected class name).
    pub is_implicit:   bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDecl {
    pub name:   String,
    pub target: TypeDesc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty:   TypeDesc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    TranslationUnit,
    /// `None` for anonymous namespaces.
    Namespace(Option<String>),
    /// `extern "C" { ... }` and similar scopes that add no name.
    LinkageSpec,
    Record(RecordDecl),
    Alias(AliasDecl),
    Field(FieldDecl),
    /// Any declaration the compiler has no use for, keyed by the front-end's
    /// name for it (`FunctionDecl`, `EnumDecl`, ...). Still counts as a sibling.
    Other(String),
}

/// One node of a declaration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub kind:  DeclKind,
    pub loc:   Option<SourceLoc>,
    pub inner: Vec<Decl>,
}

impl Decl {
    pub fn new(kind: DeclKind) -> Decl {
        Decl { kind, loc: None, inner: Vec::new() }
    }

    pub fn translation_unit(inner: Vec<Decl>) -> Decl {
        Decl { inner, ..Decl::new(DeclKind::TranslationUnit) }
    }

    pub fn namespace(name: Option<&str>, inner: Vec<Decl>) -> Decl {
        Decl {
            inner,
            ..Decl::new(DeclKind::Namespace(name.map(str::to_owned)))
        }
    }

    /// A complete, explicit record definition.
    pub fn record(name: Option<&str>, tag: TagKind, inner: Vec<Decl>) -> Decl {
        let record = RecordDecl {
            name:          name.map(str::to_owned),
            tag,
            is_definition: true,
            is_implicit:   false,
        };
        Decl { inner, ..Decl::new(DeclKind::Record(record)) }
    }

    pub fn alias(name: &str, target: TypeDesc) -> Decl {
        Decl::new(DeclKind::Alias(AliasDecl { name: name.to_owned(), target }))
    }

    pub fn field(name: &str, ty: TypeDesc) -> Decl {
        Decl::new(DeclKind::Field(FieldDecl { name: name.to_owned(), ty }))
    }

    pub fn other(kind: &str) -> Decl {
        Decl::new(DeclKind::Other(kind.to_owned()))
    }

    pub fn at(mut self, line: usize, column: usize) -> Decl {
        self.loc = Some(SourceLoc { line, column });
        self
    }

    pub fn as_record(&self) -> Option<&RecordDecl> {
        match &self.kind {
            DeclKind::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&AliasDecl> {
        match &self.kind {
            DeclKind::Alias(alias) => Some(alias),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldDecl> {
        match &self.kind {
            DeclKind::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn is_implicit(&self) -> bool {
        matches!(&self.kind, DeclKind::Record(r) if r.is_implicit)
    }

    /// Short human-readable label used in diagnostics.
    pub fn describe(&self) -> String {
        match &self.kind {
            DeclKind::TranslationUnit => "translation unit".to_owned(),
            DeclKind::Namespace(Some(name)) => format!("namespace {}", name),
            DeclKind::Namespace(None) => "anonymous namespace".to_owned(),
            DeclKind::LinkageSpec => "linkage specification".to_owned(),
            DeclKind::Record(r) => match &r.name {
                Some(name) => format!("{} {}", r.tag.keyword(), name),
                None => format!("anonymous {}", r.tag.keyword()),
            },
            DeclKind::Alias(a) => format!("alias {}", a.name),
            DeclKind::Field(f) => format!("field {}", f.name),
            DeclKind::Other(kind) => kind.clone(),
        }
    }
}
