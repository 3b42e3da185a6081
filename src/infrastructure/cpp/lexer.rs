//! Lexer for C++ declarations.
//!
//! Built on logos. Comments, whitespace and preprocessor directives are
//! skipped; everything the declaration parser does not need to tell apart
//! collapses into [`Token::Punct`].

use std::collections::BTreeMap;

use logos::Logos;

use crate::domain::ast::SourceLocation;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[regex(r"/\*", skip_block_comment)]
    BlockComment,

    #[regex(r"#[^\n]*", skip_directive)]
    Directive,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9][0-9A-Za-z_.']*", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r#"(u8|u|U|L)?"([^"\\\n]|\\.)*""#, parse_string)]
    Str(String),

    #[regex(r"(u8|u|U|L)?'([^'\\\n]|\\.)*'", |lex| lex.slice().to_string())]
    Char(String),

    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("*")]
    Star,
    #[token("&")]
    Amp,
    #[token("&&")]
    AmpAmp,
    #[token("=")]
    Eq,
    #[token("~")]
    Tilde,
    #[token("...")]
    Ellipsis,
    #[token("->")]
    Arrow,

    #[regex(r"[-+/%^!|?.]", |lex| lex.slice().to_string())]
    Punct(String),
}

impl Token {
    pub fn is_ident(&self, word: &str) -> bool {
        matches!(self, Token::Ident(s) if s == word)
    }

    /// Source-like spelling, used to rebuild type and argument text.
    pub fn spelling(&self) -> String {
        match self {
            Token::Ident(s) | Token::Number(s) | Token::Char(s) | Token::Punct(s) => s.clone(),
            Token::Str(s) => format!("{:?}", s),
            Token::ColonColon => "::".into(),
            Token::Colon => ":".into(),
            Token::Semi => ";".into(),
            Token::Comma => ",".into(),
            Token::LBrace => "{".into(),
            Token::RBrace => "}".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::LBracket => "[".into(),
            Token::RBracket => "]".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Star => "*".into(),
            Token::Amp => "&".into(),
            Token::AmpAmp => "&&".into(),
            Token::Eq => "=".into(),
            Token::Tilde => "~".into(),
            Token::Ellipsis => "...".into(),
            Token::Arrow => "->".into(),
            Token::BlockComment | Token::Directive => String::new(),
        }
    }

    fn is_word(&self) -> bool {
        matches!(self, Token::Ident(_) | Token::Number(_) | Token::Str(_) | Token::Char(_))
    }
}

/// Join tokens back into readable source text.
pub fn render<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if let Some(p) = prev {
            if (p.is_word() && token.is_word()) || *p == Token::Comma {
                out.push(' ');
            }
        }
        out.push_str(&token.spelling());
        prev = Some(token);
    }
    out
}

fn skip_block_comment(lex: &mut logos::Lexer<Token>) -> logos::Skip {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => lex.bump(end + 2),
        None => lex.bump(remainder.len()),
    }
    logos::Skip
}

/// Directives run to the end of the line, including `\` continuations.
fn skip_directive(lex: &mut logos::Lexer<Token>) -> logos::Skip {
    let mut continued = lex.slice().trim_end().ends_with('\\');
    while continued {
        let remainder = lex.remainder();
        if remainder.is_empty() {
            break;
        }
        // The remainder starts at the newline closing the previous line.
        let body = remainder.strip_prefix('\n').unwrap_or(remainder);
        let offset = remainder.len() - body.len();
        let line_len = body.find('\n').unwrap_or(body.len());
        continued = body[..line_len].trim_end().ends_with('\\');
        lex.bump(offset + line_len);
    }
    logos::Skip
}

fn parse_string(lex: &mut logos::Lexer<Token>) -> String {
    let s = lex.slice();
    let start = s.find('"').map(|i| i + 1).unwrap_or(0);
    unescape(&s[start..s.len() - 1])
}

fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some(other) => result.push(other),
            None => break,
        }
    }
    result
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub text: String,
    pub location: SourceLocation,
}

/// Tokenize `source`, collecting every unrecognised character.
pub fn tokenize(source: &str) -> (Vec<Spanned>, Vec<LexError>) {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut line = 1u32;
    let mut column = 1u32;
    let mut last_end = 0;

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        for c in source[last_end..range.start].chars() {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        let location = SourceLocation::new(line, column);
        match result {
            Ok(token) => tokens.push(Spanned { token, location }),
            Err(()) => errors.push(LexError {
                text: lexer.slice().to_string(),
                location,
            }),
        }
        last_end = range.start;
    }

    (tokens, errors)
}

/// Replace object-like macros with their replacement tokens. One level only:
/// replacements are not expanded again.
pub fn expand_defines(tokens: Vec<Spanned>, defines: &BTreeMap<String, String>) -> Vec<Spanned> {
    if defines.is_empty() {
        return tokens;
    }
    let replacements: BTreeMap<&str, Vec<Token>> = defines
        .iter()
        .map(|(name, value)| {
            let (spanned, _) = tokenize(value);
            (name.as_str(), spanned.into_iter().map(|s| s.token).collect())
        })
        .collect();

    let mut out = Vec::with_capacity(tokens.len());
    for spanned in tokens {
        let replacement = match &spanned.token {
            Token::Ident(name) => replacements.get(name.as_str()),
            _ => None,
        };
        match replacement {
            Some(replacement) => out.extend(replacement.iter().map(|token| Spanned {
                token: token.clone(),
                location: spanned.location,
            })),
            None => out.push(spanned),
        }
    }
    out
}

/// Blank out `#if 0` regions (keeping their `#else` branches) so line
/// numbers stay intact.
pub fn strip_disabled_blocks(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    // Nesting depth inside a disabled region; 0 means enabled.
    let mut disabled_depth = 0usize;

    for line in source.split_inclusive('\n') {
        let directive = line.trim_start().strip_prefix('#').map(|d| d.trim_start());
        let mut keep = disabled_depth == 0;

        if let Some(d) = directive {
            let word = d.split(|c: char| !c.is_ascii_alphanumeric()).next().unwrap_or("");
            let rest = d[word.len()..].trim();
            match word {
                "if" | "ifdef" | "ifndef" if disabled_depth > 0 => disabled_depth += 1,
                "if" if rest == "0" => {
                    disabled_depth = 1;
                    keep = false;
                }
                "else" | "elif" if disabled_depth == 1 => {
                    disabled_depth = 0;
                    keep = false;
                }
                "endif" if disabled_depth > 0 => {
                    disabled_depth -= 1;
                    keep = false;
                }
                _ => {}
            }
        }

        if keep {
            out.push_str(line);
        } else if line.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        let (tokens, errors) = tokenize(source);
        assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);
        tokens.into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_attribute_tokens() {
        assert_eq!(
            kinds(r#"[[legion::reflectable("f(obj.x)")]]"#),
            vec![
                Token::LBracket,
                Token::LBracket,
                Token::Ident("legion".into()),
                Token::ColonColon,
                Token::Ident("reflectable".into()),
                Token::LParen,
                Token::Str("f(obj.x)".into()),
                Token::RParen,
                Token::RBracket,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_comments_and_directives_are_skipped() {
        let source = "#pragma once\n#define X \\\n  1\n/* block\n comment */ int // tail\nx;";
        assert_eq!(
            kinds(source),
            vec![Token::Ident("int".into()), Token::Ident("x".into()), Token::Semi]
        );
    }

    #[test]
    fn test_locations_are_one_based() {
        let (tokens, _) = tokenize("struct a\n{\n  int v;\n};");
        let v = tokens.iter().find(|t| t.token.is_ident("v")).unwrap();
        assert_eq!(v.location, SourceLocation::new(3, 7));
    }

    #[test]
    fn test_invalid_characters_are_reported() {
        let (_, errors) = tokenize("int @x;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].text, "@");
        assert_eq!(errors[0].location, SourceLocation::new(1, 5));
    }

    #[test]
    fn test_string_prefixes_and_escapes() {
        assert_eq!(kinds(r#"L"a\"b""#), vec![Token::Str("a\"b".into())]);
    }

    #[test]
    fn test_expand_defines() {
        let mut defines = BTreeMap::new();
        defines.insert("L_NODISCARD".to_string(), String::new());
        defines.insert("COUNT".to_string(), "4".to_string());
        let (tokens, _) = tokenize("L_NODISCARD int a[COUNT];");
        let expanded: Vec<Token> = expand_defines(tokens, &defines)
            .into_iter()
            .map(|t| t.token)
            .collect();
        assert_eq!(
            expanded,
            vec![
                Token::Ident("int".into()),
                Token::Ident("a".into()),
                Token::LBracket,
                Token::Number("4".into()),
                Token::RBracket,
                Token::Semi,
            ]
        );
    }

    #[test]
    fn test_strip_disabled_blocks() {
        let source = "a\n#if 0\nb\n#if X\nc\n#endif\n#else\nd\n#endif\ne\n";
        // The closing `#endif` of the enabled `#else` branch is left for the
        // lexer to skip.
        assert_eq!(
            strip_disabled_blocks(source),
            "a\n\n\n\n\n\n\nd\n#endif\ne\n"
        );
    }

    #[test]
    fn test_render_spacing() {
        let tokens = kinds("std::map<unsigned int, float>");
        assert_eq!(render(&tokens[4..tokens.len() - 1]), "unsigned int, float");
    }
}
