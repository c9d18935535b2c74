//! Precedence-climbing parser over the lexer's token stream.

use shoal_types::eval::ParseError;

use crate::ast::{BinaryOp, Expr, ExprKind, Stmt, UnaryOp};
use crate::lexer::{Spanned, Token, tokenize};

/// Deepest expression tree the parser will build.
const MAX_NESTING: usize = 200;

/// Parse one input line into a statement.
pub fn parse_line(source: &str) -> Result<Stmt, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let stmt = parser.statement()?;
    parser.expect_end()?;
    Ok(stmt)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .map_or(&Token::Eof, |s| &s.token)
    }

    /// Position of the current token.
    fn here(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |s| s.pos)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, want: &Token) -> Result<(), ParseError> {
        if self.peek() == want {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{want}'")))
        }
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            Token::Eof => Ok(()),
            _ => Err(self.unexpected("'EOF'")),
        }
    }

    /// Step one level deeper into the tree being built.
    fn nest(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::new(
                self.here(),
                format!("exceeded max nesting depth of {MAX_NESTING}"),
            ));
        }
        Ok(())
    }

    fn unexpected(&self, wanted: &str) -> ParseError {
        ParseError::new(
            self.here(),
            format!("expected {wanted}, found '{}'", self.peek()),
        )
    }

    // ---------------------------------------------------------------
    // Grammar
    // ---------------------------------------------------------------

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if let Token::Ident(name) = self.peek()
            && *self.peek_at(1) == Token::Define
        {
            let name = name.clone();
            self.pos += 2;
            let value = self.expression(0)?;
            return Ok(Stmt::Define { name, value });
        }
        Ok(Stmt::Expr(self.expression(0)?))
    }

    /// Binary expressions whose operators bind tighter than `min`.
    fn expression(&mut self, min: u8) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut lhs = self.unary()?;
        while let Some(op) = binary_op(self.peek())
            && op.precedence() > min
        {
            self.advance();
            // Each link of a chain deepens the left spine.
            self.nest()?;
            let rhs = self.expression(op.precedence())?;
            let pos = lhs.pos;
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                pos,
            );
        }
        self.depth = base;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        self.nest()?;
        let expr = self.prefixed();
        self.depth -= 1;
        expr
    }

    fn prefixed(&mut self) -> Result<Expr, ParseError> {
        let pos = self.here();
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Not => UnaryOp::Not,
            Token::Plus => {
                self.advance();
                return self.unary();
            },
            _ => return self.postfix(),
        };
        self.advance();
        let operand = self.unary()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            pos,
        ))
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut expr = self.operand()?;
        loop {
            let pos = expr.pos;
            expr = match self.peek() {
                Token::Dot => {
                    self.advance();
                    self.nest()?;
                    let Token::Ident(name) = self.peek().clone() else {
                        return Err(self.unexpected("selector"));
                    };
                    self.advance();
                    Expr::new(
                        ExprKind::Selector {
                            target: Box::new(expr),
                            name,
                        },
                        pos,
                    )
                },
                Token::LParen => {
                    self.advance();
                    self.nest()?;
                    let args = self.arguments()?;
                    Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        pos,
                    )
                },
                Token::LBracket => {
                    self.advance();
                    self.nest()?;
                    let index = self.expression(0)?;
                    self.expect(&Token::RBracket)?;
                    Expr::new(
                        ExprKind::Index {
                            target: Box::new(expr),
                            index: Box::new(index),
                        },
                        pos,
                    )
                },
                _ => {
                    self.depth = base;
                    return Ok(expr);
                },
            };
        }
    }

    /// Call arguments after the opening parenthesis.
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if *self.peek() == Token::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.expression(0)?);
            match self.peek() {
                Token::Comma => {
                    self.advance();
                    // Trailing comma before `)`.
                    if *self.peek() == Token::RParen {
                        self.advance();
                        return Ok(args);
                    }
                },
                Token::RParen => {
                    self.advance();
                    return Ok(args);
                },
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }

    fn operand(&mut self) -> Result<Expr, ParseError> {
        let pos = self.here();
        let kind = match self.peek().clone() {
            Token::Int(n) => ExprKind::Int(n),
            Token::Float(x) => ExprKind::Float(x),
            Token::Str(s) => ExprKind::Str(s),
            Token::Ident(name) => ExprKind::Ident(name),
            Token::LParen => {
                self.advance();
                let inner = self.expression(0)?;
                self.expect(&Token::RParen)?;
                return Ok(Expr::new(ExprKind::Paren(Box::new(inner)), pos));
            },
            _ => return Err(self.unexpected("operand")),
        };
        self.advance();
        Ok(Expr::new(kind, pos))
    }
}

fn binary_op(token: &Token) -> Option<BinaryOp> {
    Some(match token {
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::Percent => BinaryOp::Rem,
        Token::Eq => BinaryOp::Eq,
        Token::NotEq => BinaryOp::NotEq,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::LtEq,
        Token::Gt => BinaryOp::Gt,
        Token::GtEq => BinaryOp::GtEq,
        Token::AndAnd => BinaryOp::And,
        Token::OrOr => BinaryOp::Or,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expr {
        match parse_line(source).unwrap() {
            Stmt::Expr(e) => e,
            other => panic!("expected expression, got {other:?}"),
        }
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(expr("1 + 2 * 3").to_string(), "1 + 2 * 3");
        match expr("1 + 2 * 3").kind {
            ExprKind::Binary { op, rhs, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(rhs.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
            },
            other => panic!("expected binary, got {other:?}"),
        }
        match expr("10 - 4 - 3").kind {
            ExprKind::Binary { op, lhs, rhs } => {
                assert_eq!(op, BinaryOp::Sub);
                assert!(matches!(lhs.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
                assert_eq!(rhs.kind, ExprKind::Int(3));
            },
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn logical_binds_loosest() {
        match expr("a < b && c || d").kind {
            ExprKind::Binary { op, lhs, .. } => {
                assert_eq!(op, BinaryOp::Or);
                assert!(matches!(lhs.kind, ExprKind::Binary { op: BinaryOp::And, .. }));
            },
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn postfix_chains() {
        let e = expr("strings.Fields(s)[0]");
        assert_eq!(e.to_string(), "strings.Fields(s)[0]");
        match e.kind {
            ExprKind::Index { target, .. } => match target.kind {
                ExprKind::Call { callee, args } => {
                    assert!(matches!(callee.kind, ExprKind::Selector { .. }));
                    assert_eq!(args.len(), 1);
                },
                other => panic!("expected call, got {other:?}"),
            },
            other => panic!("expected index, got {other:?}"),
        }
    }

    #[test]
    fn unary_and_parens() {
        assert_eq!(expr("-(1 + 2)").to_string(), "-(1 + 2)");
        assert_eq!(expr("!!ok").to_string(), "!!ok");
        assert_eq!(expr("+5").kind, ExprKind::Int(5));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let n = 100_000;
        let parens = format!("{}1{}", "(".repeat(n), ")".repeat(n));
        let negations = format!("{}1", "-".repeat(n));
        let chain = format!("1{}", " + 1".repeat(n));
        let call = format!("{}1{}", "f(".repeat(n), ")".repeat(n));
        let selectors = format!("x{}", ".y".repeat(n));
        let indexes = format!("x{}", "[0]".repeat(n));
        for source in [parens, negations, chain, call, selectors, indexes] {
            let err = parse_line(&source).unwrap_err();
            assert_eq!(err.message, "exceeded max nesting depth of 200");
        }
    }

    #[test]
    fn moderate_nesting_parses() {
        let source = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(expr(&source).to_string(), source);
        let chain = format!("1{}", " + 1".repeat(100));
        assert_eq!(expr(&chain).to_string(), chain);
    }

    #[test]
    fn call_arguments() {
        assert_eq!(expr("f()").to_string(), "f()");
        assert_eq!(expr("f(1, \"a\",)").to_string(), "f(1, \"a\")");
    }

    #[test]
    fn define_statement() {
        match parse_line("x := 1 + 2").unwrap() {
            Stmt::Define { name, value } => {
                assert_eq!(name, "x");
                assert_eq!(value.to_string(), "1 + 2");
            },
            other => panic!("expected define, got {other:?}"),
        }
    }

    #[test]
    fn positions_recorded() {
        let e = expr("  foo + bar");
        assert_eq!(e.pos, 2);
        match e.kind {
            ExprKind::Binary { rhs, .. } => assert_eq!(rhs.pos, 8),
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn missing_operand() {
        let err = parse_line("1 +").unwrap_err();
        assert_eq!(err.position, 3);
        assert_eq!(err.message, "expected operand, found 'EOF'");
    }

    #[test]
    fn empty_line_needs_operand() {
        let err = parse_line("").unwrap_err();
        assert_eq!(err.position, 0);
        assert_eq!(err.message, "expected operand, found 'EOF'");
    }

    #[test]
    fn unclosed_paren() {
        let err = parse_line("(1 + 2").unwrap_err();
        assert_eq!(err.position, 6);
        assert_eq!(err.message, "expected ')', found 'EOF'");
    }

    #[test]
    fn trailing_tokens() {
        let err = parse_line("1 2").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.message, "expected 'EOF', found '2'");
    }

    #[test]
    fn selector_needs_name() {
        let err = parse_line("math.(").unwrap_err();
        assert_eq!(err.position, 5);
        assert!(err.message.starts_with("expected selector"));
    }

    #[test]
    fn lexer_errors_pass_through() {
        let err = parse_line("1 @ 2").unwrap_err();
        assert_eq!(err.position, 2);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn sums_print_back(terms in proptest::collection::vec(0i64..1000, 1..8)) {
                let source = terms
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(" + ");
                prop_assert_eq!(expr(&source).to_string(), source);
            }
        }
    }
}
