//! Token definitions for the rule script language
//!
//! The script language is postfix with PostScript-flavored syntax: literal
//! names are written `/name`, blocks are brace-delimited, `?c` pushes a
//! character code and `\N` references a capture group of the current match.
//! The tokens are defined using the logos derive macro; string literals need
//! a small callback because parentheses nest.

use logos::{Lexer, Logos};

/// All possible tokens in a rule script.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"%[^\n]*")]
pub enum Token {
    // Block and collection delimiters
    #[token("{")]
    BlockOpen,
    #[token("}")]
    BlockClose,
    #[token("[")]
    ArrayOpen,
    #[token("]")]
    ArrayClose,
    #[token("<<")]
    DictOpen,
    #[token(">>")]
    DictClose,

    // Literals
    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Real(f64),
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),
    // ?c pushes the character's code as an integer
    #[regex(r"\?\S", |lex| lex.slice().chars().nth(1).map(|c| c as i64))]
    CharCode(i64),
    // (text) with balanced nesting and backslash escapes
    #[token("(", lex_string)]
    Str(String),

    // Names
    #[regex(r"/[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice()[1..].to_string())]
    LiteralName(String),
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),

    // \N pushes capture group N's text
    #[regex(r"\\[0-9]", |lex| lex.slice()[1..].parse::<usize>().ok())]
    CaptureRef(usize),
}

/// Consume a parenthesized string body, handling nesting and escapes.
///
/// Called with the lexer positioned just after the opening `(`.
fn lex_string(lex: &mut Lexer<Token>) -> Option<String> {
    let remainder = lex.remainder();
    let mut text = String::new();
    let mut depth = 1usize;
    let mut chars = remainder.char_indices();

    while let Some((at, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, escaped)) => text.push(escaped),
                None => return None,
            },
            '(' => {
                depth += 1;
                text.push(c);
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    lex.bump(at + 1);
                    return Some(text);
                }
                text.push(c);
            }
            _ => text.push(c),
        }
    }

    // Unterminated string
    None
}

/// Tokenize a script, keeping byte spans for error reporting.
///
/// A lexing failure surfaces as an `Err` entry at the offending span.
pub fn tokenize(source: &str) -> Vec<(Result<Token, ()>, logos::Span)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        tokens.push((result, lexer.span()));
    }

    tokens
}
