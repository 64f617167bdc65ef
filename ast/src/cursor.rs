use crate::decl::{Decl, DeclKind, FieldDecl, RecordDecl};

/// Read-only position in a declaration tree: a node, its siblings in the
/// same lexical scope, and the names of the scopes enclosing it.
#[derive(Debug, Clone)]
pub struct DeclCursor<'a> {
    siblings: &'a [Decl],
    index:    usize,
    scope:    Vec<&'a str>,
}

impl<'a> DeclCursor<'a> {
    pub fn root(node: &'a Decl) -> DeclCursor<'a> {
        DeclCursor {
            siblings: std::slice::from_ref(node),
            index:    0,
            scope:    Vec::new(),
        }
    }

    pub fn node(&self) -> &'a Decl {
        &self.siblings[self.index]
    }

    pub fn kind(&self) -> &'a DeclKind {
        &self.node().kind
    }

    pub fn as_record(&self) -> Option<&'a RecordDecl> {
        self.node().as_record()
    }

    /// Names of the enclosing scopes, outermost first.
    pub fn scope(&self) -> &[&'a str] {
        &self.scope
    }

    /// The declaration that follows this one in the same scope, if any.
    pub fn next_sibling(&self) -> Option<DeclCursor<'a>> {
        if self.index + 1 < self.siblings.len() {
            Some(DeclCursor {
                siblings: self.siblings,
                index:    self.index + 1,
                scope:    self.scope.clone(),
            })
        } else {
            None
        }
    }

    /// Cursors over this node's children, in declaration order.
    pub fn children(&self) -> impl Iterator<Item = DeclCursor<'a>> + '_ {
        let inner = &self.node().inner;
        let mut scope = self.scope.clone();
        if let Some(segment) = self.scope_segment() {
            scope.push(segment);
        }
        (0..inner.len()).map(move |index| DeclCursor {
            siblings: inner,
            index,
            scope: scope.clone(),
        })
    }

    /// Immediate field members, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &'a FieldDecl> {
        self.node().inner.iter().filter_map(Decl::as_field)
    }

    /// `a::b::Name` for named declarations, `None` for anonymous ones and for
    /// nodes that carry no name at all.
    pub fn qualified_name(&self) -> Option<String> {
        let name: &str = match self.kind() {
            DeclKind::Namespace(Some(name)) => name.as_str(),
            DeclKind::Record(RecordDecl { name: Some(name), .. }) => name.as_str(),
            DeclKind::Alias(alias) => alias.name.as_str(),
            DeclKind::Field(field) => field.name.as_str(),
            _ => return None,
        };
        let mut parts = self.scope.clone();
        parts.push(name);
        Some(parts.join("::"))
    }

    /// The segment this node adds to its children's scope.
    fn scope_segment(&self) -> Option<&'a str> {
        match self.kind() {
            DeclKind::Namespace(Some(name)) => Some(name.as_str()),
            DeclKind::Namespace(None) => Some("(anonymous namespace)"),
            DeclKind::Record(RecordDecl { name: Some(name), .. }) => Some(name.as_str()),
            DeclKind::Record(record) => Some(match record.tag.keyword() {
                "union" => "(anonymous union)",
                "class" => "(anonymous class)",
                _ => "(anonymous struct)",
            }),
            _ => None,
        }
    }
}
