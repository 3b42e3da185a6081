//! Recursive-descent parser for the declaration subset of C++.
//!
//! Only declarations are modelled. Function bodies, initializers and
//! anything else with no bearing on records are skipped by bracket matching.
//! Recoverable problems become warnings; unbalanced brackets and premature
//! end of input are errors.

use crate::domain::ast::{
    Access, Attribute, BuiltinType, CvQualifiers, DeclKind, Declaration, RecordKeyword,
    ReferenceKind, SourceLocation, TypeRef,
};
use crate::domain::diagnostic::ProviderSeverity;

use super::lexer::{render, Spanned, Token};

/// A problem found while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub severity: ProviderSeverity,
    pub message: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Namespace,
    Record,
}

#[derive(Debug, Clone, Copy, Default)]
struct Specifiers {
    is_static: bool,
    is_typedef: bool,
}

/// Where a declaration is being parsed.
#[derive(Debug, Clone, Copy)]
struct Context {
    scope: Scope,
    access: Access,
    is_template: bool,
    is_typedef: bool,
}

impl Context {
    fn namespace() -> Self {
        Self {
            scope: Scope::Namespace,
            access: Access::Public,
            is_template: false,
            is_typedef: false,
        }
    }
}

pub struct Parser<'t> {
    tokens: &'t [Spanned],
    pos: usize,
    attributes_supported: bool,
    issues: Vec<Issue>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Spanned], attributes_supported: bool) -> Self {
        Self {
            tokens,
            pos: 0,
            attributes_supported,
            issues: Vec::new(),
        }
    }

    /// Parse the whole token stream as a translation unit.
    pub fn parse(mut self) -> (Vec<Declaration>, Vec<Issue>) {
        let declarations = self.parse_scope(None, false);
        (declarations, self.issues)
    }

    // ---- token helpers ----

    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn previous(&self) -> Option<&Token> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| &t.token)
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn at_ident(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_ident(word))
    }

    fn eat(&mut self, token: &Token) -> bool {
        let matched = self.at(token);
        if matched {
            self.bump();
        }
        matched
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        let matched = self.at_ident(word);
        if matched {
            self.bump();
        }
        matched
    }

    fn ident(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.bump();
                Some(name)
            }
            _ => None,
        }
    }

    fn location(&self) -> SourceLocation {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.location)
            .unwrap_or_default()
    }

    fn text(&self, from: usize, to: usize) -> String {
        render(self.tokens[from..to].iter().map(|t| &t.token))
    }

    fn error(&mut self, message: impl Into<String>, location: SourceLocation) {
        self.issue(ProviderSeverity::Error, message, location);
    }

    fn warning(&mut self, message: impl Into<String>, location: SourceLocation) {
        self.issue(ProviderSeverity::Warning, message, location);
    }

    fn issue(&mut self, severity: ProviderSeverity, message: impl Into<String>, location: SourceLocation) {
        self.issues.push(Issue {
            severity,
            message: message.into(),
            location,
        });
    }

    // ---- skipping ----

    /// Skip from an opening bracket past its matching closer.
    fn skip_balanced(&mut self) -> bool {
        let location = self.location();
        let opener = self.peek().map(Token::spelling).unwrap_or_default();
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return true;
                    }
                }
                _ => {}
            }
            self.bump();
        }
        self.error(format!("unbalanced `{}`", opener), location);
        false
    }

    /// Skip a template parameter or argument list starting at `<`.
    fn skip_angles(&mut self) -> bool {
        let location = self.location();
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::Lt => depth += 1,
                Token::Gt => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return true;
                    }
                }
                Token::LParen | Token::LBracket | Token::LBrace => {
                    if !self.skip_balanced() {
                        return false;
                    }
                    continue;
                }
                Token::Semi | Token::RBrace => break,
                _ => {}
            }
            self.bump();
        }
        self.error("unterminated template argument list", location);
        false
    }

    /// Skip to the end of the current statement. Stops before a `}` that
    /// closes the enclosing scope.
    fn skip_statement(&mut self) {
        loop {
            match self.peek() {
                None | Some(Token::RBrace) => return,
                Some(Token::Semi) => {
                    self.bump();
                    return;
                }
                Some(Token::LBrace) => {
                    if self.skip_balanced() {
                        self.eat(&Token::Semi);
                    }
                    return;
                }
                Some(Token::LParen | Token::LBracket) => {
                    if !self.skip_balanced() {
                        return;
                    }
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Skip an initializer or bit-field width up to the next `,` or `;`.
    fn skip_expression(&mut self) {
        loop {
            match self.peek() {
                None | Some(Token::Comma | Token::Semi | Token::RBrace) => return,
                Some(Token::LParen | Token::LBracket | Token::LBrace) => {
                    if !self.skip_balanced() {
                        return;
                    }
                }
                Some(Token::Lt)
                    if matches!(self.previous(), Some(Token::Ident(_) | Token::ColonColon)) =>
                {
                    if !self.skip_template_arguments() {
                        self.bump();
                    }
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Skip `<...>` inside an expression when it closes before the end of the
    /// statement. Otherwise the `<` is a comparison and nothing is consumed.
    fn skip_template_arguments(&mut self) -> bool {
        let start = self.pos;
        let mut angles = 0usize;
        let mut nested = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => nested += 1,
                Token::RParen | Token::RBracket | Token::RBrace if nested > 0 => nested -= 1,
                Token::RParen | Token::RBracket | Token::RBrace => break,
                Token::Semi if nested == 0 => break,
                Token::Lt if nested == 0 => angles += 1,
                Token::Gt if nested == 0 => {
                    angles = angles.saturating_sub(1);
                    if angles == 0 {
                        self.bump();
                        return true;
                    }
                }
                _ => {}
            }
            self.bump();
        }
        self.pos = start;
        false
    }

    /// Skip a function declarator from its parameter list to the end of the
    /// declaration or body.
    fn skip_function_rest(&mut self) {
        let location = self.location();
        if self.at(&Token::LParen) && !self.skip_balanced() {
            return;
        }
        loop {
            match self.peek() {
                None => {
                    self.error("unexpected end of file in function declaration", location);
                    return;
                }
                Some(Token::Semi) => {
                    self.bump();
                    return;
                }
                Some(Token::RBrace) => return,
                Some(Token::LBrace) => {
                    self.skip_balanced();
                    return;
                }
                Some(Token::Eq) => {
                    self.skip_statement();
                    return;
                }
                Some(Token::Colon) => {
                    self.bump();
                    self.skip_initializer_list();
                    return;
                }
                Some(Token::LParen | Token::LBracket) => {
                    if !self.skip_balanced() {
                        return;
                    }
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Constructor member initializers, then the body.
    fn skip_initializer_list(&mut self) {
        let location = self.location();
        loop {
            match self.peek() {
                None => {
                    self.error("unexpected end of file in constructor", location);
                    return;
                }
                Some(Token::Semi) => {
                    self.bump();
                    return;
                }
                Some(Token::RBrace) => return,
                Some(Token::LParen) => {
                    if !self.skip_balanced() {
                        return;
                    }
                }
                Some(Token::LBrace) => {
                    // `member{value}` is an initializer; any other brace opens the body.
                    let initializer = matches!(self.previous(), Some(Token::Ident(_) | Token::Gt));
                    if !self.skip_balanced() || !initializer {
                        return;
                    }
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn skip_requires_clause(&mut self) {
        loop {
            while matches!(self.peek(), Some(Token::Punct(p)) if p == "!") {
                self.bump();
            }
            match self.peek() {
                Some(Token::LParen) => {
                    if !self.skip_balanced() {
                        return;
                    }
                }
                Some(Token::Ident(_)) => {
                    self.bump();
                    while self.at(&Token::ColonColon) {
                        self.bump();
                        self.bump();
                    }
                    if self.at(&Token::Lt) && !self.skip_angles() {
                        return;
                    }
                }
                _ => return,
            }
            match (self.peek(), self.peek_at(1)) {
                (Some(Token::AmpAmp), _) => self.bump(),
                (Some(Token::Punct(a)), Some(Token::Punct(b))) if a == "|" && b == "|" => {
                    self.bump();
                    self.bump();
                }
                _ => return,
            }
        }
    }

    // ---- attributes ----

    /// Attribute specifiers in any of the accepted spellings. Only `[[...]]`
    /// attributes are kept.
    fn parse_attributes(&mut self) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(Token::LBracket), Some(Token::LBracket)) => {
                    self.parse_attribute_list(&mut attributes)
                }
                (Some(Token::Ident(word)), Some(Token::LParen))
                    if matches!(word.as_str(), "alignas" | "__attribute__" | "__declspec") =>
                {
                    self.bump();
                    if !self.skip_balanced() {
                        return attributes;
                    }
                }
                _ => return attributes,
            }
        }
    }

    fn parse_attribute_list(&mut self, attributes: &mut Vec<Attribute>) {
        let location = self.location();
        self.bump();
        self.bump();
        if !self.attributes_supported {
            self.warning(
                "attribute specifiers require C++11 or later",
                location,
            );
        }

        let mut default_scope = None;
        if self.eat_ident("using") {
            default_scope = self.ident();
            self.eat(&Token::Colon);
        }

        loop {
            match self.peek() {
                Some(Token::RBracket) => break,
                Some(Token::Comma | Token::Ellipsis) => self.bump(),
                Some(Token::Ident(_)) => {
                    let Some(first) = self.ident() else { break };
                    let (scope, name) = if self.eat(&Token::ColonColon) {
                        match self.ident() {
                            Some(name) => (Some(first), name),
                            None => {
                                self.error("expected attribute name", self.location());
                                break;
                            }
                        }
                    } else {
                        (default_scope.clone(), first)
                    };
                    let argument = if self.at(&Token::LParen) {
                        let from = self.pos + 1;
                        if !self.skip_balanced() {
                            return;
                        }
                        match &self.tokens[from..self.pos - 1] {
                            [Spanned {
                                token: Token::Str(value),
                                ..
                            }] => Some(value.clone()),
                            _ => None,
                        }
                    } else {
                        None
                    };
                    attributes.push(Attribute::resolve(scope.as_deref(), &name, argument));
                }
                _ => {
                    self.error("malformed attribute", self.location());
                    break;
                }
            }
        }

        if self.at(&Token::RBracket) && self.peek_at(1) == Some(&Token::RBracket) {
            self.bump();
            self.bump();
            return;
        }
        self.error("expected `]]`", location);
        while let Some(token) = self.peek() {
            if *token == Token::Semi || *token == Token::RBrace {
                return;
            }
            let closing = *token == Token::RBracket && self.peek_at(1) == Some(&Token::RBracket);
            self.bump();
            if closing {
                self.bump();
                return;
            }
        }
    }

    // ---- declarations ----

    fn parse_scope(&mut self, record: Option<RecordKeyword>, braced: bool) -> Vec<Declaration> {
        let mut ctx = match record {
            Some(keyword) => Context {
                scope: Scope::Record,
                access: keyword.default_access(),
                ..Context::namespace()
            },
            None => Context::namespace(),
        };

        // The `{` that opened this scope, already consumed.
        let open = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.location)
            .unwrap_or_default();
        let mut out = Vec::new();
        loop {
            match self.peek() {
                None => {
                    if braced {
                        self.error("unexpected end of file, expected `}`", open);
                    }
                    return out;
                }
                Some(Token::RBrace) => {
                    if braced {
                        self.bump();
                        return out;
                    }
                    self.error("unmatched `}`", self.location());
                    self.bump();
                    continue;
                }
                _ => {}
            }
            let before = self.pos;
            self.parse_declaration(&mut ctx, &mut out);
            if self.pos == before {
                self.bump();
            }
        }
    }

    fn parse_declaration(&mut self, ctx: &mut Context, out: &mut Vec<Declaration>) {
        match (self.peek(), self.peek_at(1)) {
            (Some(Token::Semi), _) => {
                self.bump();
                return;
            }
            (Some(Token::Ident(word)), Some(Token::Colon)) => {
                if let Some(access) = Access::from_keyword(word) {
                    if ctx.scope == Scope::Record {
                        ctx.access = access;
                    }
                    self.bump();
                    self.bump();
                    return;
                }
            }
            _ => {}
        }

        let mut attributes = self.parse_attributes();
        let mut local = Context {
            is_template: false,
            is_typedef: false,
            ..*ctx
        };
        if self.eat_ident("template") {
            if !self.at(&Token::Lt) {
                // Explicit instantiation.
                self.skip_statement();
                return;
            }
            if !self.skip_angles() {
                return;
            }
            if self.eat_ident("requires") {
                self.skip_requires_clause();
            }
            local.is_template = true;
            attributes.extend(self.parse_attributes());
        }
        self.eat_ident("export");

        let word = match self.peek() {
            Some(Token::Ident(word)) => word.clone(),
            _ => {
                self.parse_simple_declaration(attributes, local, out);
                return;
            }
        };
        let next = self.peek_at(1);
        match word.as_str() {
            "namespace" => self.parse_namespace(attributes, out),
            "inline" if next.is_some_and(|t| t.is_ident("namespace")) => {
                self.bump();
                self.parse_namespace(attributes, out);
            }
            "extern" if matches!(next, Some(Token::Str(_))) => {
                self.bump();
                self.bump();
                if self.eat(&Token::LBrace) {
                    out.extend(self.parse_scope(None, true));
                } else {
                    self.parse_declaration(ctx, out);
                }
            }
            "extern" if next.is_some_and(|t| t.is_ident("template")) => self.skip_statement(),
            "struct" | "class" | "union" => self.parse_record(attributes, local, out),
            "enum" => self.parse_enum(attributes, local, out),
            "using" => self.parse_using(attributes, out),
            "typedef" => {
                self.bump();
                local.is_typedef = true;
                match self.peek() {
                    Some(Token::Ident(w)) if RecordKeyword::from_keyword(w).is_some() => {
                        self.parse_record(attributes, local, out)
                    }
                    Some(Token::Ident(w)) if w == "enum" => self.parse_enum(attributes, local, out),
                    _ => self.parse_simple_declaration(attributes, local, out),
                }
            }
            "friend" | "static_assert" | "concept" | "module" | "import" => self.skip_statement(),
            _ => self.parse_simple_declaration(attributes, local, out),
        }
    }

    fn parse_namespace(&mut self, attributes: Vec<Attribute>, out: &mut Vec<Declaration>) {
        let location = self.location();
        self.bump();
        let mut attributes = attributes;
        attributes.extend(self.parse_attributes());

        let mut names = Vec::new();
        while let Some(name) = self.ident() {
            names.push(name);
            if !self.eat(&Token::ColonColon) {
                break;
            }
            self.eat_ident("inline");
        }

        if self.at(&Token::Eq) {
            // Namespace alias.
            self.skip_statement();
            return;
        }
        if !self.eat(&Token::LBrace) {
            self.warning("expected `{` after namespace name", self.location());
            self.skip_statement();
            return;
        }

        let children = self.parse_scope(None, true);
        let mut names = names.into_iter().rev();
        let innermost = names.next().unwrap_or_default();
        let mut decl = Declaration::new(DeclKind::Namespace, innermost, location)
            .with_attributes(attributes)
            .with_children(children);
        for name in names {
            decl = Declaration::new(DeclKind::Namespace, name, location).with_children(vec![decl]);
        }
        out.push(decl);
    }

    fn parse_record(&mut self, attributes: Vec<Attribute>, ctx: Context, out: &mut Vec<Declaration>) {
        let start = self.pos;
        let keyword_location = self.location();
        let keyword = match self.ident().as_deref().and_then(RecordKeyword::from_keyword) {
            Some(keyword) => keyword,
            None => return,
        };
        let mut record_attributes = attributes.clone();
        record_attributes.extend(self.parse_attributes());

        let mut is_template = ctx.is_template;
        let mut name = String::new();
        let mut location = keyword_location;
        if matches!(self.peek(), Some(Token::Ident(w)) if w != "final") {
            location = self.location();
            while let Some(segment) = self.ident() {
                name.push_str(&segment);
                if self.at(&Token::Lt) {
                    if !self.skip_angles() {
                        return;
                    }
                    is_template = true;
                }
                if self.at(&Token::ColonColon) && matches!(self.peek_at(1), Some(Token::Ident(_))) {
                    self.bump();
                    name.push_str("::");
                } else {
                    break;
                }
            }
        }
        self.eat_ident("final");

        match self.peek() {
            Some(Token::Semi) => {
                self.bump();
                let kind = DeclKind::Record {
                    keyword,
                    is_definition: false,
                    is_template,
                };
                out.push(Declaration::new(kind, name, location).with_attributes(record_attributes));
                return;
            }
            Some(Token::Colon) => {
                while !matches!(self.peek(), None | Some(Token::LBrace | Token::Semi | Token::RBrace)) {
                    if matches!(self.peek(), Some(Token::LParen)) {
                        if !self.skip_balanced() {
                            return;
                        }
                    } else if self.at(&Token::Lt) {
                        if !self.skip_angles() {
                            return;
                        }
                    } else {
                        self.bump();
                    }
                }
                if !self.at(&Token::LBrace) {
                    self.error("expected `{` after base clause", self.location());
                    self.skip_statement();
                    return;
                }
            }
            Some(Token::LBrace) => {}
            _ => {
                // Elaborated type specifier: `struct foo* p;`.
                self.pos = start;
                self.parse_simple_declaration(attributes, ctx, out);
                return;
            }
        }

        self.bump();
        let children = self.parse_scope(Some(keyword), true);
        let kind = DeclKind::Record {
            keyword,
            is_definition: true,
            is_template,
        };
        let declared_type = if name.is_empty() {
            TypeRef::Unexposed(format!("(anonymous {})", keyword.as_str()))
        } else {
            TypeRef::Named(name.clone())
        };
        out.push(
            Declaration::new(kind, name, location)
                .with_attributes(record_attributes)
                .with_children(children),
        );

        if !self.eat(&Token::Semi) {
            let mut specs = Specifiers {
                is_typedef: ctx.is_typedef,
                ..Specifiers::default()
            };
            self.parse_specifiers(&mut specs);
            self.parse_declarators(declared_type, Vec::new(), specs, ctx, out);
        }
    }

    fn parse_enum(&mut self, attributes: Vec<Attribute>, ctx: Context, out: &mut Vec<Declaration>) {
        let start = self.pos;
        let location = self.location();
        self.bump();
        if !self.eat_ident("class") {
            self.eat_ident("struct");
        }
        let mut enum_attributes = attributes.clone();
        enum_attributes.extend(self.parse_attributes());
        let name = self.ident().unwrap_or_default();
        if self.eat(&Token::Colon) {
            while !matches!(self.peek(), None | Some(Token::LBrace | Token::Semi | Token::RBrace)) {
                self.bump();
            }
        }

        match self.peek() {
            Some(Token::LBrace) => {
                if !self.skip_balanced() {
                    return;
                }
                let declared_type = TypeRef::Named(name.clone());
                out.push(
                    Declaration::new(DeclKind::Enum { is_definition: true }, name, location)
                        .with_attributes(enum_attributes),
                );
                if !self.eat(&Token::Semi) {
                    let specs = Specifiers {
                        is_typedef: ctx.is_typedef,
                        ..Specifiers::default()
                    };
                    self.parse_declarators(declared_type, Vec::new(), specs, ctx, out);
                }
            }
            Some(Token::Semi) => {
                self.bump();
                out.push(
                    Declaration::new(DeclKind::Enum { is_definition: false }, name, location)
                        .with_attributes(enum_attributes),
                );
            }
            _ => {
                self.pos = start;
                self.parse_simple_declaration(attributes, ctx, out);
            }
        }
    }

    fn parse_using(&mut self, attributes: Vec<Attribute>, out: &mut Vec<Declaration>) {
        self.bump();
        let is_alias = matches!(
            (self.peek(), self.peek_at(1)),
            (Some(Token::Ident(_)), Some(Token::Eq | Token::LBracket))
        );
        if !is_alias {
            // using-directive or using-declaration
            self.skip_statement();
            return;
        }

        let location = self.location();
        let name = self.ident().unwrap_or_default();
        let mut attributes = attributes;
        attributes.extend(self.parse_attributes());
        if !self.eat(&Token::Eq) {
            self.warning("expected `=` in alias declaration", self.location());
            self.skip_statement();
            return;
        }
        match self.parse_type_id() {
            Some(target) => {
                out.push(
                    Declaration::new(DeclKind::Alias { target }, name, location)
                        .with_attributes(attributes),
                );
                if !self.eat(&Token::Semi) {
                    self.warning("expected `;` after alias declaration", self.location());
                    self.skip_statement();
                }
            }
            None => {
                self.warning("unrecognised alias target", self.location());
                self.skip_statement();
            }
        }
    }

    fn parse_simple_declaration(
        &mut self,
        attributes: Vec<Attribute>,
        ctx: Context,
        out: &mut Vec<Declaration>,
    ) {
        let location = self.location();
        let mut specs = Specifiers {
            is_typedef: ctx.is_typedef,
            ..Specifiers::default()
        };
        self.parse_specifiers(&mut specs);

        if self.at(&Token::Tilde) {
            self.bump();
            let name = format!("~{}", self.ident().unwrap_or_default());
            self.skip_function_rest();
            out.push(function(name, location, ctx, attributes));
            return;
        }
        if self.at_ident("operator") {
            self.parse_operator(attributes, location, ctx, out);
            return;
        }

        let Some(base) = self.parse_type(&mut specs) else {
            self.warning("skipping unrecognised declaration", location);
            self.skip_statement();
            return;
        };

        // Constructors, and destructors defined out of line.
        let names_a_type = matches!(base, TypeRef::Named(_) | TypeRef::TemplateInstance { .. });
        match (self.peek(), self.peek_at(1)) {
            (Some(Token::LParen), next)
                if names_a_type
                    && !specs.is_typedef
                    && !matches!(next, Some(Token::Star | Token::Amp | Token::AmpAmp)) =>
            {
                self.skip_function_rest();
                out.push(function(base.to_string(), location, ctx, attributes));
                return;
            }
            (Some(Token::ColonColon), Some(Token::Tilde)) => {
                self.bump();
                self.bump();
                let name = format!("{}::~{}", base, self.ident().unwrap_or_default());
                self.skip_function_rest();
                out.push(function(name, location, ctx, attributes));
                return;
            }
            _ => {}
        }

        self.parse_declarators(base, attributes, specs, ctx, out);
    }

    fn parse_operator(
        &mut self,
        attributes: Vec<Attribute>,
        location: SourceLocation,
        ctx: Context,
        out: &mut Vec<Declaration>,
    ) {
        let start = self.pos;
        self.bump();
        if self.at(&Token::LParen) && self.peek_at(1) == Some(&Token::RParen) {
            self.bump();
            self.bump();
        }
        while !matches!(self.peek(), None | Some(Token::LParen | Token::Semi | Token::LBrace)) {
            self.bump();
        }
        let name = self.text(start, self.pos);
        self.skip_function_rest();
        out.push(function(name, location, ctx, attributes));
    }

    /// One or more comma-separated declarators sharing `base`.
    fn parse_declarators(
        &mut self,
        base: TypeRef,
        attributes: Vec<Attribute>,
        specs: Specifiers,
        ctx: Context,
        out: &mut Vec<Declaration>,
    ) {
        let mut first = true;
        loop {
            let ty = self.parse_pointer_ops(base.clone());
            let mut declarator_attributes = attributes.clone();
            let location = self.location();

            let (name, mut ty) = match self.peek() {
                Some(Token::LParen)
                    if matches!(self.peek_at(1), Some(Token::Star | Token::Amp | Token::AmpAmp))
                        || matches!(
                            (self.peek_at(1), self.peek_at(2)),
                            (Some(Token::Ident(_)), Some(Token::ColonColon))
                        ) =>
                {
                    match self.parse_function_pointer(&ty) {
                        Some(parsed) => parsed,
                        None => return,
                    }
                }
                Some(Token::Ident(word)) if word == "operator" => {
                    self.parse_operator(declarator_attributes, location, ctx, out);
                    return;
                }
                Some(Token::Ident(_)) => {
                    let mut name = self.ident().unwrap_or_default();
                    while self.at(&Token::ColonColon) && matches!(self.peek_at(1), Some(Token::Ident(_))) {
                        self.bump();
                        name.push_str("::");
                        name.push_str(&self.ident().unwrap_or_default());
                    }
                    (name, ty)
                }
                // Unnamed bit-field.
                Some(Token::Colon) => (String::new(), ty),
                _ => {
                    self.warning("expected a declarator", location);
                    self.skip_statement();
                    return;
                }
            };

            if !first
                && !matches!(
                    self.peek(),
                    Some(
                        Token::Comma
                            | Token::Semi
                            | Token::Eq
                            | Token::LBrace
                            | Token::LBracket
                            | Token::Colon
                    )
                )
            {
                self.warning("expected a declarator after `,`", location);
                self.skip_statement();
                return;
            }
            first = false;

            if self.at(&Token::LParen) {
                if specs.is_typedef {
                    let from = self.pos;
                    if !self.skip_balanced() {
                        return;
                    }
                    ty = TypeRef::Unexposed(format!("{}{}", ty, self.text(from, self.pos)));
                } else {
                    self.skip_function_rest();
                    out.push(function(name, location, ctx, declarator_attributes));
                    return;
                }
            }

            declarator_attributes.extend(self.parse_attributes());
            let mut extents = Vec::new();
            while self.at(&Token::LBracket) {
                let from = self.pos + 1;
                if !self.skip_balanced() {
                    return;
                }
                let size = self.text(from, self.pos - 1);
                extents.push((!size.is_empty()).then_some(size));
            }
            for size in extents.into_iter().rev() {
                ty = TypeRef::Array {
                    element: Box::new(ty),
                    size,
                };
            }
            declarator_attributes.extend(self.parse_attributes());

            if self.eat(&Token::Colon) {
                self.skip_expression();
            }
            if self.eat(&Token::Eq) {
                self.skip_expression();
            } else if self.at(&Token::LBrace) && !self.skip_balanced() {
                return;
            }

            if !name.is_empty() {
                let kind = if specs.is_typedef {
                    DeclKind::Alias { target: ty }
                } else if ctx.scope == Scope::Record && !specs.is_static {
                    DeclKind::Field {
                        ty,
                        access: ctx.access,
                    }
                } else {
                    DeclKind::Variable { ty }
                };
                out.push(Declaration::new(kind, name, location).with_attributes(declarator_attributes));
            }

            match self.peek() {
                Some(Token::Comma) => self.bump(),
                Some(Token::Semi) => {
                    self.bump();
                    return;
                }
                _ => {
                    self.warning("expected `;` after declaration", self.location());
                    self.skip_statement();
                    return;
                }
            }
        }
    }

    /// `(*name)(params)` and friends. The declared type is kept as spelled.
    fn parse_function_pointer(&mut self, base: &TypeRef) -> Option<(String, TypeRef)> {
        let from = self.pos;
        self.bump();
        let mut name = String::new();
        loop {
            match self.peek() {
                None => {
                    self.error("unexpected end of file in declarator", self.location());
                    return None;
                }
                Some(Token::RParen) => {
                    self.bump();
                    break;
                }
                Some(Token::Ident(word)) => {
                    name = word.clone();
                    self.bump();
                }
                Some(Token::LParen | Token::LBracket) => {
                    if !self.skip_balanced() {
                        return None;
                    }
                }
                Some(_) => self.bump(),
            }
        }
        while matches!(self.peek(), Some(Token::LParen | Token::LBracket)) {
            if !self.skip_balanced() {
                return None;
            }
        }
        let spelling = self.text(from, self.pos).replacen(&name, "", 1);
        Some((name, TypeRef::Unexposed(format!("{}{}", base, spelling))))
    }

    fn parse_specifiers(&mut self, specs: &mut Specifiers) {
        loop {
            match self.peek() {
                Some(Token::Ident(word)) => match word.as_str() {
                    "static" => specs.is_static = true,
                    "typedef" => specs.is_typedef = true,
                    "explicit" => {
                        self.bump();
                        if self.at(&Token::LParen) && !self.skip_balanced() {
                            return;
                        }
                        continue;
                    }
                    "mutable" | "constexpr" | "consteval" | "constinit" | "inline" | "virtual"
                    | "extern" | "thread_local" | "register" | "friend" | "__forceinline" => {}
                    _ => return,
                },
                _ => return,
            }
            self.bump();
        }
    }

    /// The type named by a decl-specifier sequence, without declarator parts.
    fn parse_type(&mut self, specs: &mut Specifiers) -> Option<TypeRef> {
        let mut cv = CvQualifiers::default();
        let mut builtin = BuiltinWords::default();
        let mut named: Option<TypeRef> = None;

        loop {
            let word = match self.peek() {
                Some(Token::Ident(word)) => word.clone(),
                Some(Token::ColonColon) if named.is_none() && !builtin.seen() => {
                    named = Some(self.parse_type_name()?);
                    continue;
                }
                _ => break,
            };
            match word.as_str() {
                "const" => cv.is_const = true,
                "volatile" => cv.is_volatile = true,
                "static" => specs.is_static = true,
                "mutable" | "constexpr" | "constinit" | "inline" | "extern" | "thread_local"
                | "register" | "typename" => {}
                "struct" | "class" | "union" | "enum" if named.is_none() => {
                    self.bump();
                    if word == "enum" && !self.eat_ident("class") {
                        self.eat_ident("struct");
                    }
                    named = Some(self.parse_type_name()?);
                    continue;
                }
                "decltype" | "typeof" | "__typeof__" if named.is_none() => {
                    let from = self.pos;
                    self.bump();
                    if self.at(&Token::LParen) && !self.skip_balanced() {
                        return None;
                    }
                    named = Some(TypeRef::Unexposed(self.text(from, self.pos)));
                    continue;
                }
                "auto" if named.is_none() && !builtin.seen() => {
                    named = Some(TypeRef::Unexposed("auto".to_string()));
                }
                w if named.is_none() && BuiltinWords::accepts(w) => builtin.add(w),
                _ if named.is_none() && !builtin.seen() => {
                    named = Some(self.parse_type_name()?);
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let base = match named {
            Some(named) => named,
            None if builtin.seen() => TypeRef::Builtin(builtin.resolve()),
            None => return None,
        };
        Some(TypeRef::qualified(base, cv))
    }

    /// A possibly qualified name with optional template arguments.
    fn parse_type_name(&mut self) -> Option<TypeRef> {
        let mut spelling = String::new();
        if self.eat(&Token::ColonColon) {
            spelling.push_str("::");
        }
        let mut arguments: Option<String> = None;
        loop {
            let segment = self.ident()?;
            spelling.push_str(&segment);
            if self.at(&Token::Lt) {
                let from = self.pos + 1;
                if !self.skip_angles() {
                    return None;
                }
                arguments = Some(self.text(from, self.pos - 1));
            }
            if self.at(&Token::ColonColon) && matches!(self.peek_at(1), Some(Token::Ident(_))) {
                if let Some(args) = arguments.take() {
                    spelling.push('<');
                    spelling.push_str(&args);
                    spelling.push('>');
                }
                self.bump();
                spelling.push_str("::");
                self.eat_ident("template");
                continue;
            }
            break;
        }
        Some(match arguments {
            Some(arguments) => TypeRef::TemplateInstance {
                template: spelling,
                arguments,
            },
            None => TypeRef::Named(spelling),
        })
    }

    /// A type followed by an abstract declarator, as in alias targets.
    fn parse_type_id(&mut self) -> Option<TypeRef> {
        let start = self.pos;
        let mut specs = Specifiers::default();
        let ty = self.parse_type(&mut specs)?;
        let mut ty = self.parse_pointer_ops(ty);
        if matches!(self.peek(), Some(Token::LParen | Token::LBracket)) {
            while !matches!(self.peek(), None | Some(Token::Semi | Token::Comma | Token::RBrace)) {
                if matches!(self.peek(), Some(Token::LParen | Token::LBracket)) {
                    if !self.skip_balanced() {
                        return None;
                    }
                } else {
                    self.bump();
                }
            }
            ty = TypeRef::Unexposed(self.text(start, self.pos));
        }
        Some(ty)
    }

    fn parse_pointer_ops(&mut self, mut ty: TypeRef) -> TypeRef {
        loop {
            match self.peek() {
                Some(Token::Star) => ty = TypeRef::pointer_to(ty),
                Some(Token::Amp) => {
                    ty = TypeRef::Reference {
                        inner: Box::new(ty),
                        kind: ReferenceKind::Lvalue,
                    }
                }
                Some(Token::AmpAmp) => {
                    ty = TypeRef::Reference {
                        inner: Box::new(ty),
                        kind: ReferenceKind::Rvalue,
                    }
                }
                Some(Token::Ident(word)) => match word.as_str() {
                    "const" => ty = TypeRef::constant(ty),
                    "volatile" => {
                        ty = TypeRef::qualified(
                            ty,
                            CvQualifiers {
                                is_const: false,
                                is_volatile: true,
                            },
                        )
                    }
                    "restrict" | "__restrict" | "__restrict__" => {}
                    _ => return ty,
                },
                _ => return ty,
            }
            self.bump();
        }
    }
}

fn function(
    name: String,
    location: SourceLocation,
    ctx: Context,
    attributes: Vec<Attribute>,
) -> Declaration {
    let kind = DeclKind::Function {
        is_template: ctx.is_template,
    };
    Declaration::new(kind, name, location).with_attributes(attributes)
}

/// Builtin type keywords seen so far in a decl-specifier sequence.
#[derive(Debug, Default)]
struct BuiltinWords {
    signed: bool,
    unsigned: bool,
    short: bool,
    longs: u8,
    base: Option<&'static str>,
}

impl BuiltinWords {
    fn accepts(word: &str) -> bool {
        matches!(
            word,
            "signed"
                | "unsigned"
                | "short"
                | "long"
                | "int"
                | "char"
                | "bool"
                | "float"
                | "double"
                | "void"
                | "wchar_t"
                | "char8_t"
                | "char16_t"
                | "char32_t"
                | "__int64"
        )
    }

    fn add(&mut self, word: &str) {
        match word {
            "signed" => self.signed = true,
            "unsigned" => self.unsigned = true,
            "short" => self.short = true,
            "long" => self.longs += 1,
            "__int64" => self.longs = 2,
            "int" => self.base = Some("int"),
            "char" => self.base = Some("char"),
            "bool" => self.base = Some("bool"),
            "float" => self.base = Some("float"),
            "double" => self.base = Some("double"),
            "void" => self.base = Some("void"),
            "wchar_t" => self.base = Some("wchar_t"),
            "char8_t" => self.base = Some("char8_t"),
            "char16_t" => self.base = Some("char16_t"),
            "char32_t" => self.base = Some("char32_t"),
            _ => {}
        }
    }

    fn seen(&self) -> bool {
        self.signed || self.unsigned || self.short || self.longs > 0 || self.base.is_some()
    }

    fn resolve(&self) -> BuiltinType {
        match self.base {
            Some("void") => BuiltinType::Void,
            Some("bool") => BuiltinType::Bool,
            Some("float") => BuiltinType::Float,
            Some("double") if self.longs > 0 => BuiltinType::LongDouble,
            Some("double") => BuiltinType::Double,
            Some("char") if self.signed => BuiltinType::SignedChar,
            Some("char") if self.unsigned => BuiltinType::UnsignedChar,
            Some("char") => BuiltinType::Char,
            Some("wchar_t") => BuiltinType::WChar,
            Some("char8_t") => BuiltinType::Char8,
            Some("char16_t") => BuiltinType::Char16,
            Some("char32_t") => BuiltinType::Char32,
            _ => match (self.short, self.longs, self.unsigned) {
                (true, _, true) => BuiltinType::UnsignedShort,
                (true, _, false) => BuiltinType::Short,
                (false, 0, true) => BuiltinType::UnsignedInt,
                (false, 0, false) => BuiltinType::Int,
                (false, 1, true) => BuiltinType::UnsignedLong,
                (false, 1, false) => BuiltinType::Long,
                (false, _, true) => BuiltinType::UnsignedLongLong,
                (false, _, false) => BuiltinType::LongLong,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::AttributeKind;
    use crate::infrastructure::cpp::lexer::tokenize;

    fn parse_with(source: &str, attributes_supported: bool) -> (Vec<Declaration>, Vec<Issue>) {
        let (tokens, errors) = tokenize(source);
        assert!(errors.is_empty(), "lex errors: {:?}", errors);
        Parser::new(&tokens, attributes_supported).parse()
    }

    fn parse(source: &str) -> Vec<Declaration> {
        let (decls, issues) = parse_with(source, true);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        decls
    }

    fn field_type<'a>(record: &'a Declaration, name: &str) -> &'a TypeRef {
        let field = record
            .children
            .iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("no member {}", name));
        match &field.kind {
            DeclKind::Field { ty, .. } | DeclKind::Variable { ty } => ty,
            other => panic!("{} is a {}", name, other.label()),
        }
    }

    #[test]
    fn test_marked_struct_with_fields() {
        let decls = parse(
            "struct [[legion::reflectable]] position\n{\n    float x;\n    float y, z;\n};",
        );
        assert_eq!(decls.len(), 1);
        let record = &decls[0];
        assert_eq!(record.name, "position");
        assert_eq!(record.location, SourceLocation::new(1, 32));
        assert!(record.reflect_marker().is_some());
        assert!(matches!(
            record.kind,
            DeclKind::Record {
                keyword: RecordKeyword::Struct,
                is_definition: true,
                is_template: false
            }
        ));
        let names: Vec<&str> = record.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert_eq!(field_type(record, "z"), &TypeRef::Builtin(BuiltinType::Float));
    }

    #[test]
    fn test_access_follows_keyword_and_specifiers() {
        let decls = parse("class c { int a; public: int b; protected: int d; };");
        let access: Vec<Access> = decls[0]
            .fields()
            .map(|f| match f.kind {
                DeclKind::Field { access, .. } => access,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(access, vec![Access::Private, Access::Public, Access::Protected]);
    }

    #[test]
    fn test_member_attributes_before_and_after_declarator() {
        let decls = parse(
            r#"struct s {
                [[legion::reflectable("write(obj.a)")]] int a;
                int b [[rythe::reflectable("write(obj.b)")]];
                [[maybe_unused]] int c;
            };"#,
        );
        let record = &decls[0];
        let argument = |name: &str| {
            record
                .children
                .iter()
                .find(|d| d.name == name)
                .and_then(|d| d.reflect_marker())
                .and_then(|a| a.argument.clone())
        };
        assert_eq!(argument("a").as_deref(), Some("write(obj.a)"));
        assert_eq!(argument("b").as_deref(), Some("write(obj.b)"));
        assert_eq!(argument("c"), None);
        let c = record.children.iter().find(|d| d.name == "c").unwrap();
        assert!(matches!(
            &c.attributes[0].kind,
            AttributeKind::Other { scope: None, name } if name == "maybe_unused"
        ));
    }

    #[test]
    fn test_namespaces() {
        let decls = parse("namespace a::b { struct c {}; } namespace { struct d; } inline namespace v1 {}");
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].name, "a");
        assert_eq!(decls[0].children[0].name, "b");
        assert_eq!(decls[0].children[0].children[0].name, "c");
        assert_eq!(decls[1].name, "");
        assert!(matches!(
            decls[1].children[0].kind,
            DeclKind::Record {
                is_definition: false,
                ..
            }
        ));
        assert_eq!(decls[2].name, "v1");
    }

    #[test]
    fn test_member_types() {
        let decls = parse(
            "struct t {
                const char* name;
                unsigned long long count;
                std::vector<int> values;
                float matrix[4][4];
                void (*callback)(int);
                int& ref;
                char* const fixed;
                static int instances;
                int a, *b;
                unsigned flags : 3;
                std::string label = \"x\";
            };",
        );
        let record = &decls[0];
        assert_eq!(
            field_type(record, "name"),
            &TypeRef::pointer_to(TypeRef::constant(TypeRef::Builtin(BuiltinType::Char)))
        );
        assert_eq!(
            field_type(record, "count"),
            &TypeRef::Builtin(BuiltinType::UnsignedLongLong)
        );
        assert_eq!(
            field_type(record, "values"),
            &TypeRef::TemplateInstance {
                template: "std::vector".into(),
                arguments: "int".into()
            }
        );
        assert_eq!(field_type(record, "matrix").to_string(), "float[4][4]");
        assert!(matches!(field_type(record, "callback"), TypeRef::Unexposed(_)));
        assert!(matches!(
            field_type(record, "ref"),
            TypeRef::Reference {
                kind: ReferenceKind::Lvalue,
                ..
            }
        ));
        assert_eq!(
            field_type(record, "fixed").strip_cv(),
            &TypeRef::pointer_to(TypeRef::Builtin(BuiltinType::Char))
        );
        assert_eq!(
            field_type(record, "b"),
            &TypeRef::pointer_to(TypeRef::Builtin(BuiltinType::Int))
        );
        assert_eq!(field_type(record, "flags"), &TypeRef::Builtin(BuiltinType::UnsignedInt));
        assert_eq!(field_type(record, "label"), &TypeRef::Named("std::string".into()));

        let instances = record.children.iter().find(|d| d.name == "instances").unwrap();
        assert!(matches!(instances.kind, DeclKind::Variable { .. }));
        assert_eq!(record.fields().count(), 11);
    }

    #[test]
    fn test_functions_are_skipped_without_losing_fields() {
        let decls = parse(
            "class widget : public base<widget>, private other {
            public:
                widget() : m_a(1), m_b{2} { do_things(); }
                explicit widget(int a) noexcept;
                virtual ~widget() = default;
                int size() const { return m_a; }
                widget& operator=(const widget&) = delete;
                bool operator()(int) const;
                operator bool() const;
                template<typename T> T get() const { return T{}; }
                friend bool operator==(const widget&, const widget&) { return true; }
                static_assert(sizeof(int) == 4, \"int\");
            private:
                int m_a;
                int m_b;
            };",
        );
        let record = &decls[0];
        let fields: Vec<&str> = record.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["m_a", "m_b"]);
        let functions = record
            .children
            .iter()
            .filter(|d| matches!(d.kind, DeclKind::Function { .. }))
            .count();
        assert_eq!(functions, 8);
    }

    #[test]
    fn test_templates_and_forward_declarations() {
        let decls = parse(
            "template<typename T, int N = (3 > 2)> struct box { T value; };
             template<> struct box<int, 1> { int value; };
             struct fwd;
             class [[legion::reflectable]] later;",
        );
        assert!(matches!(decls[0].kind, DeclKind::Record { is_template: true, .. }));
        assert!(matches!(decls[1].kind, DeclKind::Record { is_template: true, .. }));
        assert!(matches!(decls[2].kind, DeclKind::Record { is_definition: false, .. }));
        assert!(decls[3].reflect_marker().is_some());
        assert!(matches!(decls[3].kind, DeclKind::Record { is_definition: false, .. }));
    }

    #[test]
    fn test_enums_aliases_and_typedefs() {
        let decls = parse(
            "enum class color : unsigned char { red, green };
             enum opaque : int;
             using id = unsigned int;
             using handler = void(*)(int);
             typedef struct { int x; } point;
             typedef const char* cstr;
             extern \"C\" { int c_function(void); }
             struct holder { color tint; enum color other; };",
        );
        assert!(matches!(decls[0].kind, DeclKind::Enum { is_definition: true }));
        assert!(matches!(decls[1].kind, DeclKind::Enum { is_definition: false }));
        assert!(matches!(
            &decls[2].kind,
            DeclKind::Alias { target: TypeRef::Builtin(BuiltinType::UnsignedInt) }
        ));
        assert!(matches!(&decls[3].kind, DeclKind::Alias { target: TypeRef::Unexposed(_) }));
        assert_eq!(decls[4].name, "");
        assert!(decls[4].is_record());
        assert_eq!(decls[5].name, "point");
        assert!(matches!(decls[5].kind, DeclKind::Alias { .. }));
        assert_eq!(decls[6].name, "cstr");
        assert_eq!(decls[7].name, "c_function");
        let holder = &decls[8];
        assert_eq!(field_type(holder, "tint"), &TypeRef::Named("color".into()));
        assert_eq!(field_type(holder, "other"), &TypeRef::Named("color".into()));
    }

    #[test]
    fn test_nested_records_and_instances() {
        let decls = parse("struct outer { struct inner { int v; } first, second; inner third; };");
        let outer = &decls[0];
        assert!(outer.children[0].is_record());
        let fields: Vec<&str> = outer.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["first", "second", "third"]);
        assert_eq!(field_type(outer, "first"), &TypeRef::Named("inner".into()));
    }

    #[test]
    fn test_unbalanced_braces_are_errors() {
        let (_, issues) = parse_with("struct open { int a;", true);
        assert!(issues.iter().any(|i| i.severity == ProviderSeverity::Error));

        let (_, issues) = parse_with("struct s { void f() { }; }; }", true);
        assert!(issues
            .iter()
            .any(|i| i.severity == ProviderSeverity::Error && i.message.contains("unmatched")));
    }

    #[test]
    fn test_unknown_declarations_warn_and_recover() {
        let (decls, issues) = parse_with("struct s { int a; = oops; int b; };", true);
        assert!(issues.iter().all(|i| i.severity == ProviderSeverity::Warning));
        assert!(!issues.is_empty());
        let fields: Vec<&str> = decls[0].fields().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_template_arguments_in_initializers() {
        let decls = parse(
            "struct [[legion::reflectable]] s\n{\n    int a;\n    bool same = std::is_same_v<int, float>;\n    \
             std::size_t n = sizeof(std::pair<int, int>), m = std::tuple_size_v<std::tuple<int, std::pair<int, int>>>;\n    \
             bool less = a < 2;\n    int last;\n};",
        );
        let fields: Vec<&str> = decls[0].fields().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["a", "same", "n", "m", "less", "last"]);
    }

    #[test]
    fn test_malformed_later_declarator_is_dropped() {
        let (decls, issues) = parse_with("struct s { int a, b c; int d; };", true);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ProviderSeverity::Warning);
        let fields: Vec<&str> = decls[0].fields().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["a", "d"]);
    }

    #[test]
    fn test_attributes_before_cpp11_warn() {
        let (decls, issues) = parse_with("struct [[legion::reflectable]] s {};", false);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ProviderSeverity::Warning);
        assert!(decls[0].reflect_marker().is_some());
    }
}
