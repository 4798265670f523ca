/*!
* 文件名: lexer.rs
* 作者: JQQ
* 创建日期: 2026/10/14
* 最后修改日期: 2026/10/15
* 版权: 2023 JQQ. All rights reserved.
* 依赖: None
* 描述: 词法分析 / Tokenizer
*/

use crate::errors::ParseError;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Assign,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Number(n) => return write!(f, "{}", n),
            Token::Str(s) => return write!(f, "{:?}", s),
            Token::Ident(name) => return f.write_str(name),
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Semicolon => ";",
            Token::Dot => ".",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Bang => "!",
            Token::Assign => "=",
            Token::Eq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::And => "&&",
            Token::Or => "||",
        };
        f.write_str(text)
    }
}

/// 把源码切分为记号 / Split source text into tokens
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut chars = source.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match c {
            '0'..='9' => lex_number(&mut chars)?,
            '"' | '\'' => lex_string(&mut chars)?,
            c if c.is_alphabetic() || c == '_' || c == '$' => lex_ident(&mut chars),
            _ => {
                chars.next();
                match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    ',' => Token::Comma,
                    ':' => Token::Colon,
                    ';' => Token::Semicolon,
                    '.' => Token::Dot,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '%' => Token::Percent,
                    '/' if chars.peek() == Some(&'/') => {
                        // 行注释 / line comment
                        for c in chars.by_ref() {
                            if c == '\n' {
                                break;
                            }
                        }
                        continue;
                    }
                    '/' => Token::Slash,
                    '!' => paired(&mut chars, '=', Token::NotEq, Token::Bang),
                    '=' => paired(&mut chars, '=', Token::Eq, Token::Assign),
                    '<' => paired(&mut chars, '=', Token::Le, Token::Lt),
                    '>' => paired(&mut chars, '=', Token::Ge, Token::Gt),
                    '&' if chars.next_if_eq(&'&').is_some() => Token::And,
                    '|' if chars.next_if_eq(&'|').is_some() => Token::Or,
                    _ => return Err(ParseError::Invalid("Invalid or unexpected token".into())),
                }
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn paired(chars: &mut Peekable<Chars<'_>>, next: char, double: Token, single: Token) -> Token {
    if chars.next_if_eq(&next).is_some() {
        double
    } else {
        single
    }
}

fn lex_number(chars: &mut Peekable<Chars<'_>>) -> Result<Token, ParseError> {
    let mut text = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        text.push(c);
    }
    if chars.next_if_eq(&'.').is_some() {
        text.push('.');
        while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
            text.push(c);
        }
    }
    if let Some(e) = chars.next_if(|c| *c == 'e' || *c == 'E') {
        text.push(e);
        if let Some(sign) = chars.next_if(|c| *c == '+' || *c == '-') {
            text.push(sign);
        }
        while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
            text.push(c);
        }
    }
    if chars.peek().is_some_and(|c| c.is_alphabetic() || *c == '_') {
        return Err(ParseError::Invalid("Invalid or unexpected token".into()));
    }

    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| ParseError::Invalid(format!("Invalid number '{}'", text)))
}

fn lex_string(chars: &mut Peekable<Chars<'_>>) -> Result<Token, ParseError> {
    let quote = chars.next().unwrap_or('"');
    let mut text = String::new();

    loop {
        let Some(c) = chars.next() else {
            return Err(ParseError::Invalid("Invalid or unexpected token".into()));
        };
        match c {
            c if c == quote => return Ok(Token::Str(text)),
            '\n' => return Err(ParseError::Invalid("Invalid or unexpected token".into())),
            '\\' => {
                let Some(escaped) = chars.next() else {
                    return Err(ParseError::Invalid("Invalid or unexpected token".into()));
                };
                match escaped {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    '0' => text.push('\0'),
                    'u' => text.push(lex_unicode_escape(chars)?),
                    other => text.push(other),
                }
            }
            c => text.push(c),
        }
    }
}

fn lex_unicode_escape(chars: &mut Peekable<Chars<'_>>) -> Result<char, ParseError> {
    let digits: String = chars.by_ref().take(4).collect();
    u32::from_str_radix(&digits, 16)
        .ok()
        .filter(|_| digits.len() == 4)
        .and_then(char::from_u32)
        .ok_or_else(|| ParseError::Invalid("Invalid Unicode escape sequence".into()))
}

fn lex_ident(chars: &mut Peekable<Chars<'_>>) -> Token {
    let mut name = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_' || *c == '$') {
        name.push(c);
    }
    Token::Ident(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_operators() {
        let tokens = tokenize("a<=1 && !b || c != 2.5e1 // trailing").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("a".into()),
                Token::Le,
                Token::Number(1.0),
                Token::And,
                Token::Bang,
                Token::Ident("b".into()),
                Token::Or,
                Token::Ident("c".into()),
                Token::NotEq,
                Token::Number(25.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_strings() {
        let cases = vec![
            (r#""hi""#, "hi"),
            (r#"'it\'s'"#, "it's"),
            (r#""a\nb""#, "a\nb"),
            (r#""é""#, "é"),
            ("\"中文\"", "中文"),
        ];

        for (source, expected) in cases {
            assert_eq!(
                tokenize(source).unwrap(),
                vec![Token::Str(expected.into())],
                "tokenize failed for {}",
                source
            );
        }
    }

    #[test]
    fn test_tokenize_rejects_garbage() {
        for source in ["\"open", "'a\nb'", "a # b", "1a", "a & b"] {
            assert!(
                matches!(tokenize(source), Err(ParseError::Invalid(_))),
                "expected invalid for {:?}",
                source
            );
        }
    }
}
