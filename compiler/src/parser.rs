use std::collections::HashMap;
use crate::{
    tokenizer::Token,
    utils::{error, quote},
    error::Struct2MsgError,
};
use lazy_static::lazy_static;
use regex::Regex;
use struct2msg_ast::{Decl, DeclKind, RecordDecl, TagKind, TypeDesc};

lazy_static! {
    static ref IDENTIFIER:     Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref STRING_LITERAL: Regex = Regex::new(r#"^".*"$"#).unwrap();
}

/// Keywords that may make up a built-in type specifier.
const BUILTIN_KEYWORDS: [&str; 16] = [
    "void", "bool", "_Bool", "char", "wchar_t", "char8_t", "char16_t", "char32_t",
    "short", "int", "long", "float", "double", "signed", "unsigned", "__int128",
];

const CV_KEYWORDS: [&str; 2] = ["const", "volatile"];

/// Specifiers that never show up in a rendered type.
const IGNORED_SPECIFIERS: [&str; 9] = [
    "inline", "constexpr", "mutable", "register", "thread_local",
    "virtual", "explicit", "typename", "__extension__",
];

/// Fixed-width and size aliases every header sees through the C library.
const WELL_KNOWN_ALIASES: [(&str, &str); 13] = [
    ("int8_t",    "signed char"),
    ("int16_t",   "short"),
    ("int32_t",   "int"),
    ("int64_t",   "long"),
    ("uint8_t",   "unsigned char"),
    ("uint16_t",  "unsigned short"),
    ("uint32_t",  "unsigned int"),
    ("uint64_t",  "unsigned long"),
    ("size_t",    "unsigned long"),
    ("ssize_t",   "long"),
    ("intptr_t",  "long"),
    ("uintptr_t", "unsigned long"),
    ("ptrdiff_t", "long"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScopeKind {
    File,
    Namespace,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DeclMode {
    Plain,
    Typedef,
}

/// What the parser remembers about a name it has seen declared.
#[derive(Debug, Clone)]
enum Known {
    /// `None` when the alias target is a name the parser never saw.
    Alias(Option<TypeDesc>),
    Record,
}

/// Parses a tokenized C/C++ header into a declaration tree.
///
/// Only declarations are understood: function bodies, initializers, enum
/// bodies and templates are skipped with bracket matching.
pub fn parse_header(tokens: &[Token]) -> Result<Decl, Struct2MsgError> {
    let tokens = strip_attributes(tokens);
    let mut parser = HeaderParser::new(&tokens);
    let inner = parser.parse_scope(ScopeKind::File)?;
    Ok(Decl::translation_unit(inner))
}

/// Drops `__attribute__((...))`, `__declspec(...)`, `alignas(...)` and
/// `[[...]]` so the parser never has to look at them.
fn strip_attributes(tokens: &[Token]) -> Vec<&Token> {
    fn skip_group(tokens: &[Token], open_index: usize, open: &str, close: &str) -> usize {
        let mut depth = 0usize;
        let mut i = open_index;
        while i + 1 < tokens.len() {
            if tokens[i].text == open {
                depth += 1;
            } else if tokens[i].text == close {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            i += 1;
        }
        i
    }

    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let text = tokens[i].text.as_str();
        let next = tokens.get(i + 1).map(|t| t.text.as_str());
        match (text, next) {
            ("__attribute__" | "__declspec" | "alignas" | "__asm__", Some("(")) => {
                i = skip_group(tokens, i + 1, "(", ")");
            }
            ("[", Some("[")) => {
                i = skip_group(tokens, i, "[", "]");
            }
            _ => {
                out.push(&tokens[i]);
                i += 1;
            }
        }
    }
    out
}

struct HeaderParser<'t> {
    tokens: &'t [&'t Token],
    index:  usize,
    known:  Vec<HashMap<String, Known>>,
    path:   Vec<String>,
}

impl<'t> HeaderParser<'t> {
    fn new(tokens: &'t [&'t Token]) -> HeaderParser<'t> {
        let mut globals = HashMap::new();
        for (alias, builtin) in WELL_KNOWN_ALIASES {
            let target = Known::Alias(Some(TypeDesc::Builtin(builtin.to_owned())));
            globals.insert(alias.to_owned(), target.clone());
            globals.insert(format!("std::{}", alias), target);
        }
        HeaderParser {
            tokens,
            index: 0,
            known: vec![globals],
            path:  Vec::new(),
        }
    }

    // ---- token helpers -------------------------------------------------

    fn current(&self) -> &'t Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &'t Token {
        let last = self.tokens.len() - 1;
        self.tokens[(self.index + offset).min(last)]
    }

    fn at(&self, text: &str) -> bool {
        self.current().text == text
    }

    fn at_eof(&self) -> bool {
        self.current().text.is_empty()
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> Result<(), Struct2MsgError> {
        if !self.eat(text) {
            let tok = self.current();
            let found = if tok.text.is_empty() { "end of input".to_owned() } else { quote(&tok.text) };
            return Err(error(
                &format!("Expected {} but found {}", quote(text), found),
                tok.line,
                tok.column,
            ));
        }
        Ok(())
    }

    fn unexpected_token(&self) -> Struct2MsgError {
        let tok = self.current();
        error(&format!("Unexpected token {}", quote(&tok.text)), tok.line, tok.column)
    }

    /// Consumes a bracketed group starting at the current `open` token.
    fn skip_balanced(&mut self, open: &str, close: &str) -> Result<(), Struct2MsgError> {
        let start = self.current();
        let mut depth = 0usize;
        loop {
            if self.at_eof() {
                return Err(error(
                    &format!("Unbalanced {}", quote(open)),
                    start.line,
                    start.column,
                ));
            }
            if self.at(open) {
                depth += 1;
            } else if self.at(close) {
                depth -= 1;
                if depth == 0 {
                    self.index += 1;
                    return Ok(());
                }
            }
            self.index += 1;
        }
    }

    /// Skips a declaration we have no model for. Stops after a `;` at depth
    /// zero, or after a function body.
    fn skip_declaration(&mut self) -> Result<(), Struct2MsgError> {
        let mut saw_parens = false;
        loop {
            if self.at_eof() {
                return self.expect(";");
            }
            match self.current().text.as_str() {
                ";" => {
                    self.index += 1;
                    return Ok(());
                }
                "(" => {
                    saw_parens = true;
                    self.skip_balanced("(", ")")?;
                }
                "[" => self.skip_balanced("[", "]")?,
                "{" => {
                    self.skip_balanced("{", "}")?;
                    if saw_parens {
                        self.eat(";");
                        return Ok(());
                    }
                }
                _ => self.index += 1,
            }
        }
    }

    /// Length of an `operator...` name at the current token, up to its
    /// parameter list. `None` if no parameter list follows, as for a C field
    /// that happens to be called `operator`.
    fn operator_name_len(&self) -> Option<usize> {
        let mut len = 1;
        if self.peek(1).text == "(" && self.peek(2).text == ")" {
            len = 3;
        }
        loop {
            match self.peek(len).text.as_str() {
                "(" if len > 1 => return Some(len),
                "" | ";" | "{" | "}" | "," | "(" => return None,
                _ => len += 1,
            }
        }
    }

    fn declare(&mut self, name: &str, known: Known) {
        if !self.path.is_empty() {
            let qualified = format!("{}::{}", self.path.join("::"), name);
            self.known[0].insert(qualified, known.clone());
        }
        if let Some(scope) = self.known.last_mut() {
            scope.insert(name.to_owned(), known);
        }
    }

    fn lookup(&self, name: &str) -> Option<&Known> {
        self.known.iter().rev().find_map(|scope| scope.get(name))
    }

    fn enter_scope(&mut self, name: &str) {
        self.known.push(HashMap::new());
        self.path.push(name.to_owned());
    }

    fn leave_scope(&mut self) {
        self.known.pop();
        self.path.pop();
    }

    // ---- declarations --------------------------------------------------

    fn parse_scope(&mut self, kind: ScopeKind) -> Result<Vec<Decl>, Struct2MsgError> {
        let mut decls = Vec::new();
        loop {
            if self.at_eof() {
                if kind == ScopeKind::File {
                    break;
                }
                self.expect("}")?;
            }
            if self.at("}") {
                if kind == ScopeKind::File {
                    return Err(self.unexpected_token());
                }
                break;
            }
            self.parse_member(kind, &mut decls)?;
        }
        Ok(decls)
    }

    fn parse_member(&mut self, kind: ScopeKind, out: &mut Vec<Decl>) -> Result<(), Struct2MsgError> {
        let tok = self.current();
        match tok.text.as_str() {
            ";" => {
                self.index += 1;
            }
            "namespace" => self.parse_namespace(out)?,
            "inline" if self.peek(1).text == "namespace" => {
                self.index += 1;
                self.parse_namespace(out)?;
            }
            "extern" if STRING_LITERAL.is_match(&self.peek(1).text) => {
                self.index += 2;
                if self.eat("{") {
                    let inner = self.parse_scope(ScopeKind::Namespace)?;
                    self.expect("}")?;
                    let mut linkage = Decl::new(DeclKind::LinkageSpec).at(tok.line, tok.column);
                    linkage.inner = inner;
                    out.push(linkage);
                } else {
                    self.parse_member(kind, out)?;
                }
            }
            "template" => {
                self.index += 1;
                if self.at("<") {
                    self.skip_balanced("<", ">")?;
                }
                self.skip_declaration()?;
                out.push(Decl::other("TemplateDecl").at(tok.line, tok.column));
            }
            "static_assert" | "_Static_assert" => {
                self.skip_declaration()?;
                out.push(Decl::other("StaticAssertDecl").at(tok.line, tok.column));
            }
            "friend" => {
                self.skip_declaration()?;
                out.push(Decl::other("FriendDecl").at(tok.line, tok.column));
            }
            "public" | "private" | "protected" if kind == ScopeKind::Record && self.peek(1).text == ":" => {
                self.index += 2;
                out.push(Decl::other("AccessSpecDecl").at(tok.line, tok.column));
            }
            "using" => self.parse_using(out)?,
            "typedef" => {
                self.index += 1;
                self.parse_declaration(kind, DeclMode::Typedef, out)?;
            }
            _ => self.parse_declaration(kind, DeclMode::Plain, out)?,
        }
        Ok(())
    }

    fn parse_namespace(&mut self, out: &mut Vec<Decl>) -> Result<(), Struct2MsgError> {
        let keyword = self.current();
        self.index += 1;

        let mut names: Vec<&'t Token> = Vec::new();
        while IDENTIFIER.is_match(&self.current().text) {
            names.push(self.current());
            self.index += 1;
            if !self.eat("::") {
                break;
            }
        }

        if self.eat("=") {
            self.skip_declaration()?;
            out.push(Decl::other("NamespaceAliasDecl").at(keyword.line, keyword.column));
            return Ok(());
        }

        self.expect("{")?;
        if names.is_empty() {
            self.enter_scope("(anonymous namespace)");
        } else {
            for name in &names {
                self.enter_scope(&name.text);
            }
        }
        let inner = self.parse_scope(ScopeKind::Namespace);
        for _ in 0..names.len().max(1) {
            self.leave_scope();
        }
        let inner = inner?;
        self.expect("}")?;

        // `namespace a::b { }` nests `b` inside `a`.
        let decl = if names.is_empty() {
            Decl::namespace(None, inner).at(keyword.line, keyword.column)
        } else {
            names.iter().rev().fold(inner, |inner, name| {
                vec![Decl::namespace(Some(name.text.as_str()), inner).at(name.line, name.column)]
            })
            .remove(0)
        };
        out.push(decl);
        Ok(())
    }

    fn parse_using(&mut self, out: &mut Vec<Decl>) -> Result<(), Struct2MsgError> {
        let keyword = self.current();
        self.index += 1;

        if self.at("namespace") {
            self.skip_declaration()?;
            out.push(Decl::other("UsingDirectiveDecl").at(keyword.line, keyword.column));
            return Ok(());
        }

        let name_tok = self.current();
        if !IDENTIFIER.is_match(&name_tok.text) || self.peek(1).text != "=" {
            self.skip_declaration()?;
            out.push(Decl::other("UsingDecl").at(keyword.line, keyword.column));
            return Ok(());
        }
        self.index += 2;

        let mut type_tokens = Vec::new();
        while !self.at(";") {
            if self.at_eof() {
                return self.expect(";");
            }
            type_tokens.push(self.current());
            self.index += 1;
        }
        self.index += 1;

        let declarator = match split_declarator(&type_tokens, true) {
            Some(declarator) => declarator,
            None => return Err(error("Expected type after \"=\"", name_tok.line, name_tok.column)),
        };
        let (target, resolved) = self.alias_target(&declarator, None);
        self.declare(&name_tok.text, Known::Alias(resolved));
        out.push(Decl::alias(&name_tok.text, target).at(name_tok.line, name_tok.column));
        Ok(())
    }

    /// Parses `[specifiers] type declarator, declarator ...;` including
    /// inline record/enum definitions. In typedef mode every declarator
    /// becomes an alias.
    fn parse_declaration(
        &mut self,
        kind: ScopeKind,
        mode: DeclMode,
        out: &mut Vec<Decl>,
    ) -> Result<(), Struct2MsgError> {
        let start = self.current();
        let mut is_storage = false;
        loop {
            match self.current().text.as_str() {
                "static" | "extern" => {
                    is_storage = true;
                    self.index += 1;
                }
                text if IGNORED_SPECIFIERS.contains(&text) => self.index += 1,
                _ => break,
            }
        }

        // `struct X {...}` / `enum E {...}` / `struct X` used as a type.
        let mut elaborated: Option<String> = None;
        if let Some(tag) = TagKind::from_keyword(&self.current().text) {
            match self.parse_record_specifier(tag, mode, out)? {
                Some(spelling) => elaborated = Some(spelling),
                None => return Ok(()),
            }
        } else if self.at("enum") {
            match self.parse_enum_specifier(mode, out)? {
                Some(spelling) => elaborated = Some(spelling),
                None => return Ok(()),
            }
        }

        if elaborated.is_some() && self.eat(";") {
            return Ok(());
        }

        // Collect the rest of the declaration up to `;`.
        let mut rest: Vec<&'t Token> = Vec::new();
        let mut depth = 0usize;
        let mut angle = 0usize;
        let mut saw_parens = false;
        let mut saw_operator = false;
        loop {
            let tok = self.current();
            match tok.text.as_str() {
                "" => return self.expect(";"),
                ";" if depth == 0 => {
                    self.index += 1;
                    break;
                }
                // `operator=`, `operator<<`, `operator()`, `operator bool`:
                // the tokens up to the parameter list are part of the name.
                "operator" if depth == 0 => {
                    if let Some(len) = self.operator_name_len() {
                        saw_operator = true;
                        self.index += len;
                        continue;
                    }
                }
                "<" if depth == 0 => angle += 1,
                ">" if depth == 0 => angle = angle.saturating_sub(1),
                "(" | "[" => {
                    if tok.text == "(" && depth == 0 && angle == 0 {
                        saw_parens = true;
                    }
                    depth += 1;
                }
                ")" | "]" => depth = depth.saturating_sub(1),
                "{" if depth == 0 => {
                    self.skip_balanced("{", "}")?;
                    if saw_parens {
                        self.eat(";");
                        out.push(Decl::other("FunctionDecl").at(start.line, start.column));
                        return Ok(());
                    }
                    rest.push(tok);
                    continue;
                }
                _ => {}
            }
            rest.push(tok);
            self.index += 1;
        }

        if saw_operator {
            out.push(Decl::other("FunctionDecl").at(start.line, start.column));
            return Ok(());
        }

        let segments = split_top_level(&rest, ",");
        let first = match segments.first() {
            Some(first) if !first.is_empty() => *first,
            _ => return Err(error("Expected declaration", start.line, start.column)),
        };

        if is_function(first) {
            out.push(Decl::other("FunctionDecl").at(start.line, start.column));
            return Ok(());
        }

        // The first declarator carries the type specifiers unless an
        // elaborated specifier already consumed them.
        let Some(head) = split_declarator(first, elaborated.is_none()) else {
            return Err(error("Expected declarator", start.line, start.column));
        };
        let base: Vec<&'t Token> = head.base.clone();
        let mut declarators = vec![head];
        for segment in &segments[1..] {
            if let Some(mut declarator) = split_declarator(segment, false) {
                declarator.base = base.clone();
                declarators.push(declarator);
            }
        }

        for declarator in declarators {
            let Some(name) = declarator.name else {
                continue;
            };
            match mode {
                DeclMode::Typedef => {
                    let (target, resolved) = self.alias_target(&declarator, elaborated.as_deref());
                    self.declare(&name.text, Known::Alias(resolved));
                    out.push(Decl::alias(&name.text, target).at(name.line, name.column));
                }
                DeclMode::Plain if kind == ScopeKind::Record && !is_storage => {
                    let ty = self.field_type(&declarator, elaborated.as_deref());
                    out.push(Decl::field(&name.text, ty).at(name.line, name.column));
                }
                DeclMode::Plain => {
                    out.push(Decl::other("VarDecl").at(name.line, name.column));
                }
            }
        }
        Ok(())
    }

    /// Handles `struct|class|union [Name] [: bases] [{ ... }]`. Returns the
    /// spelling to use for declarators, or `None` when the declaration was
    /// fully consumed (forward declaration).
    fn parse_record_specifier(
        &mut self,
        tag: TagKind,
        mode: DeclMode,
        out: &mut Vec<Decl>,
    ) -> Result<Option<String>, Struct2MsgError> {
        let keyword = self.current();
        self.index += 1;

        let mut name_tok: Option<&'t Token> = None;
        if IDENTIFIER.is_match(&self.current().text) && !self.at("final") {
            name_tok = Some(self.current());
            self.index += 1;
            while self.at("::") && IDENTIFIER.is_match(&self.peek(1).text) {
                self.index += 1;
                name_tok = Some(self.current());
                self.index += 1;
            }
        }
        let name = name_tok.map(|t| t.text.as_str());
        let (line, column) = name_tok.map(|t| (t.line, t.column)).unwrap_or((keyword.line, keyword.column));

        if mode == DeclMode::Plain && self.at(";") {
            if let Some(name) = name {
                self.index += 1;
                self.declare(name, Known::Record);
                let record = RecordDecl {
                    name:          Some(name.to_owned()),
                    tag,
                    is_definition: false,
                    is_implicit:   false,
                };
                out.push(Decl::new(DeclKind::Record(record)).at(line, column));
                return Ok(None);
            }
        }

        self.eat("final");
        if self.at(":") {
            while !self.at("{") && !self.at(";") && !self.at_eof() {
                self.index += 1;
            }
        }

        if self.eat("{") {
            if let Some(name) = name {
                self.declare(name, Known::Record);
            }
            self.enter_scope(name.unwrap_or("(anonymous)"));
            let inner = self.parse_scope(ScopeKind::Record);
            self.leave_scope();
            let inner = inner?;
            self.expect("}")?;
            out.push(Decl::record(name, tag, inner).at(line, column));
        }

        Ok(Some(match name {
            Some(name) => format!("{} {}", tag.keyword(), name),
            None => format!("{} (anonymous)", tag.keyword()),
        }))
    }

    fn parse_enum_specifier(
        &mut self,
        mode: DeclMode,
        out: &mut Vec<Decl>,
    ) -> Result<Option<String>, Struct2MsgError> {
        let keyword = self.current();
        self.index += 1;
        if !self.eat("class") {
            self.eat("struct");
        }

        let mut name: Option<&'t Token> = None;
        if IDENTIFIER.is_match(&self.current().text) {
            name = Some(self.current());
            self.index += 1;
        }
        if self.eat(":") {
            while !self.at("{") && !self.at(";") && !self.at_eof() {
                self.index += 1;
            }
        }

        let (line, column) = name.map(|t| (t.line, t.column)).unwrap_or((keyword.line, keyword.column));
        if self.at("{") {
            self.skip_balanced("{", "}")?;
            out.push(Decl::other("EnumDecl").at(line, column));
        } else if mode == DeclMode::Plain && self.at(";") {
            self.index += 1;
            out.push(Decl::other("EnumDecl").at(line, column));
            return Ok(None);
        }

        Ok(Some(match name {
            Some(name) => format!("enum {}", name.text),
            None => "enum (anonymous)".to_owned(),
        }))
    }

    // ---- types ---------------------------------------------------------

    /// Type descriptor of a field declarator.
    fn field_type(&self, declarator: &Declarator<'t>, elaborated: Option<&str>) -> TypeDesc {
        let base = match elaborated {
            Some(spelling) => TypeDesc::Other(spelling.to_owned()),
            None => self.classify(&declarator.base),
        };
        if declarator.is_plain() {
            base
        } else {
            TypeDesc::Other(declarator.render(base.spelling()))
        }
    }

    /// Alias target as recorded on the declaration, plus what the alias
    /// resolves to for later uses (`None` if the target name is unknown).
    fn alias_target(
        &self,
        declarator: &Declarator<'t>,
        elaborated: Option<&str>,
    ) -> (TypeDesc, Option<TypeDesc>) {
        let target = self.field_type(declarator, elaborated);
        let unknown = match &target {
            TypeDesc::Other(spelling) if elaborated.is_none() && declarator.is_plain() => {
                IDENTIFIER.is_match(spelling) && self.lookup(spelling).is_none()
            }
            _ => false,
        };
        if unknown {
            (target, None)
        } else {
            (target.clone(), Some(target))
        }
    }

    fn classify(&self, base: &[&'t Token]) -> TypeDesc {
        let words: Vec<&str> = base
            .iter()
            .map(|t| t.text.as_str())
            .filter(|w| !IGNORED_SPECIFIERS.contains(w))
            .collect();
        if let Some(builtin) = canonical_builtin(&words) {
            return TypeDesc::Builtin(builtin);
        }

        let cv: Vec<&str> = words.iter().copied().filter(|w| CV_KEYWORDS.contains(w)).collect();
        let bare: Vec<&str> = words.iter().copied().filter(|w| !CV_KEYWORDS.contains(w)).collect();
        let spelling = join_tokens(&words);
        match self.lookup(&join_tokens(&bare)) {
            Some(Known::Alias(target)) => TypeDesc::Alias {
                name:       spelling,
                underlying: target.as_ref().map(|t| Box::new(with_cv(t, &cv))),
            },
            _ => TypeDesc::Other(spelling),
        }
    }
}

/// One declarator split into its parts: `const char *names[4]` has base
/// `const char`, pointer `*`, name `names` and suffix `[4]`.
#[derive(Debug, Clone)]
struct Declarator<'t> {
    base:     Vec<&'t Token>,
    pointer:  String,
    name:     Option<&'t Token>,
    suffix:   String,
    /// `ret (*name)(params)` rendered without the name.
    function: Option<String>,
}

impl<'t> Declarator<'t> {
    fn is_plain(&self) -> bool {
        self.pointer.is_empty() && self.suffix.is_empty() && self.function.is_none()
    }

    fn render(&self, base: &str) -> String {
        if let Some(function) = &self.function {
            return function.clone();
        }
        let mut out = base.to_owned();
        if !self.pointer.is_empty() {
            out.push(' ');
            out.push_str(&self.pointer);
        }
        out.push_str(&self.suffix);
        out
    }
}

/// Splits one comma-separated declarator. With `has_type` the leading
/// tokens are the type specifiers; otherwise the whole segment is declarator.
fn split_declarator<'t>(segment: &[&'t Token], has_type: bool) -> Option<Declarator<'t>> {
    // Drop initializers and bit-field widths.
    let end = segment
        .iter()
        .enumerate()
        .scan(0i32, |depth, (i, t)| {
            let at_top = *depth == 0;
            match t.text.as_str() {
                "(" | "[" | "<" => *depth += 1,
                ")" | "]" | ">" => *depth -= 1,
                _ => {}
            }
            Some((i, at_top, t.text.as_str()))
        })
        .find(|&(_, at_top, text)| at_top && matches!(text, "=" | ":" | "{"))
        .map(|(i, _, _)| i)
        .unwrap_or(segment.len());
    let tokens = &segment[..end];
    if tokens.is_empty() {
        return None;
    }

    if let Some(open) = function_pointer_start(tokens) {
        let close = open + tokens[open..].iter().position(|t| t.text == ")")?;
        let name = tokens[open + 1..close].iter().rev().find(|t| IDENTIFIER.is_match(&t.text)).copied();
        let params: Vec<&str> = tokens.get(close + 2..tokens.len().saturating_sub(1))
            .unwrap_or(&[])
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        let ret: Vec<&str> = tokens[..open].iter().map(|t| t.text.as_str()).collect();
        return Some(Declarator {
            base:     tokens[..open].to_vec(),
            pointer:  String::new(),
            name,
            suffix:   String::new(),
            function: Some(format!("{} (*)({})", join_tokens(&ret), join_tokens(&params))),
        });
    }

    // Trailing array dimensions.
    let mut name_end = tokens.len();
    while name_end > 0 && tokens[name_end - 1].text == "]" {
        let open = tokens[..name_end].iter().rposition(|t| t.text == "[")?;
        name_end = open;
    }
    let suffix: Vec<&str> = tokens[name_end..].iter().map(|t| t.text.as_str()).collect();

    let name = match name_end.checked_sub(1).map(|i| tokens[i]) {
        Some(tok) if is_declarator_name(&tok.text) && (name_end > 1 || !has_type) => Some(tok),
        _ => None,
    };
    let before_name = &tokens[..name_end - name.map_or(0, |_| 1)];

    // Pointer operators start at the first top-level `*`/`&`.
    let mut angle = 0i32;
    let pointer_start = before_name.iter().position(|t| {
        match t.text.as_str() {
            "<" => angle += 1,
            ">" => angle -= 1,
            "*" | "&" | "&&" if angle == 0 => return true,
            _ => {}
        }
        false
    });
    let (base, pointer) = match pointer_start {
        Some(p) => (&before_name[..p], &before_name[p..]),
        None => (before_name, &before_name[before_name.len()..]),
    };
    if has_type && base.is_empty() {
        return None;
    }

    Some(Declarator {
        base:     if has_type { base.to_vec() } else { Vec::new() },
        pointer:  pointer.iter().map(|t| t.text.as_str()).collect(),
        name,
        suffix:   join_tokens(&suffix),
        function: None,
    })
}

fn is_declarator_name(text: &str) -> bool {
    IDENTIFIER.is_match(text)
        && !BUILTIN_KEYWORDS.contains(&text)
        && !CV_KEYWORDS.contains(&text)
}

/// Index of the `(` in `ret (*name)(params)`.
fn function_pointer_start(tokens: &[&Token]) -> Option<usize> {
    tokens.windows(2).position(|w| w[0].text == "(" && matches!(w[1].text.as_str(), "*" | "&" | "^"))
}

/// A top-level `(` that does not open a function-pointer declarator means
/// we are looking at a function (or a constructor-style initializer).
fn is_function(tokens: &[&Token]) -> bool {
    let mut angle = 0i32;
    let mut parens_at_top = false;
    for tok in tokens {
        match tok.text.as_str() {
            "<" => angle += 1,
            ">" => angle -= 1,
            "=" if angle == 0 => break,
            "(" if angle == 0 => parens_at_top = true,
            _ => {}
        }
    }
    parens_at_top && function_pointer_start(tokens).is_none()
}

fn split_top_level<'a, 't>(tokens: &'a [&'t Token], separator: &str) -> Vec<&'a [&'t Token]> {
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.text.as_str() {
            "(" | "[" | "<" => depth += 1,
            ")" | "]" | ">" => depth -= 1,
            text if text == separator && depth == 0 => {
                segments.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&tokens[start..]);
    segments
}

/// Joins type tokens the way compilers print them:
/// `std::map<int, unsigned int>`, `int *`, `char[16]`.
fn join_tokens(tokens: &[&str]) -> String {
    let mut out = String::new();
    let mut prev: Option<&str> = None;
    for &tok in tokens {
        let glue = match prev {
            None => false,
            Some("::" | "<" | "(" | "[") => false,
            Some(_) => !matches!(tok, "::" | "<" | ">" | "," | ")" | "[" | "]"),
        };
        if glue {
            out.push(' ');
        }
        out.push_str(tok);
        prev = Some(tok);
    }
    out
}

/// Canonical spelling of a built-in type specifier sequence, e.g.
/// `long unsigned int` → `unsigned long`. `None` if any word is not part of
/// a built-in type.
fn canonical_builtin(words: &[&str]) -> Option<String> {
    let mut cv = String::new();
    for q in CV_KEYWORDS {
        if words.contains(&q) {
            cv.push_str(q);
            cv.push(' ');
        }
    }
    let rest: Vec<&str> = words.iter().copied().filter(|w| !CV_KEYWORDS.contains(w)).collect();
    if rest.is_empty() || !rest.iter().all(|w| BUILTIN_KEYWORDS.contains(w)) {
        return None;
    }

    let longs = rest.iter().filter(|w| **w == "long").count();
    let unsigned = rest.contains(&"unsigned");
    let signed = rest.contains(&"signed");
    let short = rest.contains(&"short");
    let cores: Vec<&str> = rest
        .iter()
        .copied()
        .filter(|w| !matches!(*w, "long" | "unsigned" | "signed" | "short"))
        .collect();
    if cores.len() > 1 {
        return None;
    }
    let sign = if unsigned { "unsigned " } else { "" };

    let base = match (cores.first().copied(), short, longs) {
        (Some("char"), false, 0) if unsigned => "unsigned char".to_owned(),
        (Some("char"), false, 0) if signed => "signed char".to_owned(),
        (Some("char"), false, 0) => "char".to_owned(),
        (Some("double"), false, 1) if !unsigned && !signed => "long double".to_owned(),
        (Some("__int128"), false, 0) => format!("{}__int128", sign),
        (None | Some("int"), true, 0) => format!("{}short", sign),
        (None | Some("int"), false, 0) => format!("{}int", sign),
        (None | Some("int"), false, 1) => format!("{}long", sign),
        (None | Some("int"), false, 2) => format!("{}long long", sign),
        (Some(other), false, 0) if !unsigned && !signed => other.to_owned(),
        _ => return None,
    };
    Some(format!("{}{}", cv, base))
}

/// Applies cv-qualifiers of a use site to the built-in at the end of an
/// alias chain.
fn with_cv(target: &TypeDesc, cv: &[&str]) -> TypeDesc {
    match target {
        TypeDesc::Builtin(name) if !cv.is_empty() => {
            TypeDesc::Builtin(format!("{} {}", cv.join(" "), name))
        }
        TypeDesc::Alias { name, underlying } => TypeDesc::Alias {
            name:       name.clone(),
            underlying: underlying.as_ref().map(|u| Box::new(with_cv(u, cv))),
        },
        other => other.clone(),
    }
}
