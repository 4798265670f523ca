/*!
* 文件名: parser.rs
* 作者: JQQ
* 创建日期: 2026/10/14
* 最后修改日期: 2026/10/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: serde_json
* 描述: 递归下降解析器 / Recursive descent parser
*/

//! Running out of tokens anywhere inside a construct yields
//! [`ParseError::UnexpectedEnd`]; any other mismatch is [`ParseError::Invalid`].
//! The driver relies on this split to tell incomplete input from bad input.
//!
//! Nesting is bounded by [`MAX_DEPTH`]: every nested expression, unary operand
//! and chained operator counts one level, so the resulting tree is never deeper
//! than the limit. Exceeding it is [`ParseError::Invalid`], even when the input
//! is also unfinished, so unbounded `[[[[` cannot keep accumulating.

use crate::ast::{BinaryOp, Expr, Statement, UnaryOp, MAX_DEPTH};
use crate::errors::ParseError;
use crate::interpreter::number;
use crate::lexer::{tokenize, Token};
use serde_json::Value;

type ParseResult<T> = Result<T, ParseError>;

/// 解析一个完整单元 / Parse a single statement with an optional trailing `;`
pub fn parse(source: &str) -> ParseResult<Statement> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };

    let statement = parser.statement()?;
    parser.eat(&Token::Semicolon);
    match parser.peek() {
        None => Ok(statement),
        Some(token) => Err(ParseError::unexpected(token)),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// 当前嵌套深度 / Current nesting depth
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> ParseResult<Token> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> ParseResult<()> {
        let token = self.next()?;
        if &token == expected {
            Ok(())
        } else {
            Err(ParseError::unexpected(token))
        }
    }

    /// 进入一层嵌套 / Enter one nesting level
    fn enter(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::too_deep());
        }
        self.depth += 1;
        Ok(())
    }

    fn ident(&mut self) -> ParseResult<String> {
        match self.next()? {
            Token::Ident(name) if !is_keyword(&name) => Ok(name),
            token => Err(ParseError::unexpected(token)),
        }
    }

    fn statement(&mut self) -> ParseResult<Statement> {
        let first = self.peek().cloned();
        let assigns = self.peek_at(1) == Some(&Token::Assign);

        match first {
            None | Some(Token::Semicolon) => Ok(Statement::Empty),
            Some(Token::Ident(word)) if word == "let" => {
                self.pos += 1;
                let name = self.ident()?;
                self.expect(&Token::Assign)?;
                let value = self.expression()?;
                Ok(Statement::Assign {
                    name,
                    value,
                    declare: true,
                })
            }
            Some(Token::Ident(name)) if assigns => {
                if is_keyword(&name) {
                    return Err(ParseError::Invalid(
                        "Invalid left-hand side in assignment".into(),
                    ));
                }
                self.pos += 2;
                let value = self.expression()?;
                Ok(Statement::Assign {
                    name,
                    value,
                    declare: false,
                })
            }
            _ => Ok(Statement::Expr(self.expression()?)),
        }
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let expr = self.or()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::and, |token| match token {
            Token::Or => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn and(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::equality, |token| match token {
            Token::And => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::comparison, |token| match token {
            Token::Eq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::NotEq),
            _ => None,
        })
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::additive, |token| match token {
            Token::Lt => Some(BinaryOp::Lt),
            Token::Le => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Ge => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    fn additive(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::multiplicative, |token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::unary, |token| match token {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    /// 左结合的二元层级 / One left-associative precedence level
    fn binary_level<F, M>(&mut self, operand: F, matcher: M) -> ParseResult<Expr>
    where
        F: Fn(&mut Self) -> ParseResult<Expr>,
        M: Fn(&Token) -> Option<BinaryOp>,
    {
        let base = self.depth;
        let mut left = operand(self)?;
        while let Some(op) = self.peek().and_then(&matcher) {
            self.pos += 1;
            // 左结合链每多一个运算符树就深一层 / each chained operator deepens the tree
            self.enter()?;
            let right = operand(self)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = if self.eat(&Token::Minus) {
            UnaryOp::Neg
        } else if self.eat(&Token::Bang) {
            UnaryOp::Not
        } else {
            return self.postfix();
        };
        self.enter()?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn postfix(&mut self) -> ParseResult<Expr> {
        let base = self.depth;
        let mut expr = self.primary()?;
        loop {
            if self.eat(&Token::Dot) {
                self.enter()?;
                let name = match self.next()? {
                    Token::Ident(name) => name,
                    token => return Err(ParseError::unexpected(token)),
                };
                expr = Expr::Member(Box::new(expr), name);
            } else if self.eat(&Token::LBracket) {
                self.enter()?;
                let index = self.expression()?;
                self.expect(&Token::RBracket)?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                self.depth = base;
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        match self.next()? {
            Token::Number(n) => Ok(Expr::Literal(number(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Ident(word) => self.word(word),
            Token::LParen => {
                let expr = self.expression()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Token::LBracket => Ok(Expr::Array(self.list(&Token::RBracket)?)),
            Token::LBrace => self.object(),
            token => Err(ParseError::unexpected(token)),
        }
    }

    /// 关键字字面量、调用或标识符 / Keyword literal, call or identifier
    fn word(&mut self, word: String) -> ParseResult<Expr> {
        let literal = match word.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            "null" => Some(Value::Null),
            _ => None,
        };
        if let Some(value) = literal {
            return Ok(Expr::Literal(value));
        }
        if word == "let" {
            return Err(ParseError::unexpected(word));
        }
        if self.eat(&Token::LParen) {
            let args = self.list(&Token::RParen)?;
            return Ok(Expr::Call(word, args));
        }
        Ok(Expr::Ident(word))
    }

    /// 逗号分隔列表，允许尾逗号 / Comma separated list, trailing comma allowed
    fn list(&mut self, close: &Token) -> ParseResult<Vec<Expr>> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.expression()?);
            if !self.eat(&Token::Comma) {
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn object(&mut self) -> ParseResult<Expr> {
        let mut entries = Vec::new();
        loop {
            if self.eat(&Token::RBrace) {
                return Ok(Expr::Object(entries));
            }
            let key = match self.next()? {
                Token::Ident(name) => name,
                Token::Str(s) => s,
                Token::Number(n) => number(n).to_string(),
                token => return Err(ParseError::unexpected(token)),
            };
            self.expect(&Token::Colon)?;
            entries.push((key, self.expression()?));
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RBrace)?;
                return Ok(Expr::Object(entries));
            }
        }
    }
}

fn is_keyword(word: &str) -> bool {
    matches!(word, "let" | "true" | "false" | "null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lit(value: Value) -> Box<Expr> {
        Box::new(Expr::Literal(value))
    }

    #[test]
    fn test_precedence() {
        let parsed = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            parsed,
            Statement::Expr(Expr::Binary(
                BinaryOp::Add,
                lit(json!(1)),
                Box::new(Expr::Binary(BinaryOp::Mul, lit(json!(2)), lit(json!(3))))
            ))
        );
    }

    #[test]
    fn test_assignments() {
        let cases = vec![
            ("x = 5", "x", false),
            ("let y = 1;", "y", true),
            ("  total = a + b\n", "total", false),
        ];

        for (source, expected_name, expected_declare) in cases {
            match parse(source).unwrap() {
                Statement::Assign { name, declare, .. } => {
                    assert_eq!(name, expected_name, "name for {:?}", source);
                    assert_eq!(declare, expected_declare, "declare for {:?}", source);
                }
                other => panic!("expected assignment for {:?}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_empty_statements() {
        for source in ["", "\n", "   ", ";", "// note\n"] {
            assert_eq!(parse(source).unwrap(), Statement::Empty, "source {:?}", source);
        }
    }

    #[test]
    fn test_postfix_chain() {
        let parsed = parse("a.b[0].c").unwrap();
        let expected = Expr::Member(
            Box::new(Expr::Index(
                Box::new(Expr::Member(Box::new(Expr::Ident("a".into())), "b".into())),
                lit(json!(0)),
            )),
            "c".into(),
        );
        assert_eq!(parsed, Statement::Expr(expected));
    }

    #[test]
    fn test_incomplete_inputs() {
        // 缺少后续输入 / more input would complete these
        let cases = vec![
            "1 +\n",
            "x =",
            "let",
            "let y",
            "[1, 2",
            "{a: 1,\n",
            "{a:",
            "delay(100,",
            "(1 + 2",
            "a.",
            "a[",
            "!",
        ];

        for source in cases {
            assert_eq!(
                parse(source),
                Err(ParseError::UnexpectedEnd),
                "expected incomplete for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_fatal_inputs() {
        let cases = vec![
            "1 2",
            ")",
            "1 +* 2",
            "[1 2]",
            "{a 1}",
            "true = 1",
            "let 5 = 1",
            "x = 1; 2",
            "\"unterminated",
        ];

        for source in cases {
            assert!(
                matches!(parse(source), Err(ParseError::Invalid(_))),
                "expected fatal for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        // 未闭合的深层嵌套也是致命错误 / unfinished deep nesting is fatal, not incomplete
        let cases = vec![
            "[".repeat(50_000),
            "(".repeat(MAX_DEPTH + 1),
            format!("{}1", "-".repeat(MAX_DEPTH + 1)),
            format!("{}1", "1 + ".repeat(MAX_DEPTH + 1)),
            format!("a{}", ".b".repeat(MAX_DEPTH + 1)),
        ];

        for source in cases {
            assert_eq!(
                parse(&source),
                Err(ParseError::too_deep()),
                "expected depth error for {:.20}...",
                source
            );
        }
    }

    #[test]
    fn test_nesting_within_limit() {
        let depth = MAX_DEPTH / 4;
        let source = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        assert!(parse(&source).is_ok());
        assert!(parse(&"1 + ".repeat(depth)).is_err());
        assert_eq!(
            parse(&format!("{}1", "1 + ".repeat(depth))).map(|_| ()),
            Ok(())
        );
        // 未闭合但未超限的嵌套仍是未完成 / shallow unfinished nesting is still incomplete
        assert_eq!(parse(&"[".repeat(depth)), Err(ParseError::UnexpectedEnd));
    }
}
