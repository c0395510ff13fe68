use tracing::debug;

use crate::analyzer::Ty;
use crate::error::{CompileError, Result};
use crate::lexer::{Lexer, Position, Token, TokenKind};

use super::{
    Assign, BinOpKind, Declaration, Expr, ForLoop, Identifier, Literal, Program, Stmt, UnaryOpKind,
};

/// Recursive-descent parser with a single token of lookahead.
#[derive(Debug)]
pub struct Parser {
    lexer: Lexer,
    current: Token,
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::TextLiteral => format!("'\"{}\"'", token.lexeme),
        _ => format!("'{}'", token.lexeme),
    }
}

impl Parser {
    pub fn new(source: &str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    pub fn parse(&mut self) -> Result<Program> {
        let program = self.parse_program()?;
        debug!(
            declarations = program.declarations.len(),
            statements = program.stmts.len(),
            "parsed program"
        );
        Ok(program)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current.kind
    }

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn consume(&mut self, kind: TokenKind) -> Result<bool> {
        if self.current.kind != kind {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind != kind {
            return Err(CompileError::syntax(
                format!("expected {}, found {}", kind, describe(&self.current)),
                self.current.position(),
            ));
        }
        self.advance()
    }

    fn expect_ident(&mut self) -> Result<Identifier> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Identifier {
            pos: token.position(),
            name: token.lexeme,
        })
    }

    /// program = declaration* "begin" stmt* "end" EOF
    fn parse_program(&mut self) -> Result<Program> {
        let mut declarations = vec![];
        while self.peek_kind().is_type() {
            declarations.extend(self.parse_declaration()?);
        }

        self.expect(TokenKind::Begin)?;
        let stmts = self.parse_block(&[TokenKind::End])?;
        self.expect(TokenKind::End)?;
        self.expect(TokenKind::Eof)?;

        Ok(Program {
            declarations,
            stmts,
        })
    }

    /// declaration = type ident ("," ident)* ";"
    fn parse_declaration(&mut self) -> Result<Vec<Declaration>> {
        let ty = match self.advance()?.kind {
            TokenKind::Integer => Ty::Integer,
            TokenKind::Real => Ty::Real,
            TokenKind::Text => Ty::Text,
            TokenKind::Boolean => Ty::Boolean,
            kind => unreachable!("{:?} is not a type keyword", kind),
        };

        let mut names = vec![self.expect_ident()?];
        while self.consume(TokenKind::Comma)? {
            names.push(self.expect_ident()?);
        }
        self.expect(TokenKind::SemiColon)?;

        Ok(names
            .into_iter()
            .map(|ident| Declaration {
                ty,
                name: ident.name,
                pos: ident.pos,
            })
            .collect())
    }

    /// Statements up to (not including) the first terminator.
    fn parse_block(&mut self, terminators: &[TokenKind]) -> Result<Vec<Stmt>> {
        let mut stmts = vec![];
        while !terminators.contains(&self.peek_kind()) {
            if self.peek_kind() == TokenKind::Eof {
                return Err(CompileError::syntax(
                    format!("expected {}, found end of input", terminators[0]),
                    self.current.position(),
                ));
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    /// stmt = ident "<-" expr
    ///      | "if" expr "then" stmt* ("else" stmt*)? "endif"
    ///      | "while" expr "do" stmt* "endwhile"
    ///      | "for" ident "from" expr "to" expr ("step" expr)? "do" stmt* "endfor"
    ///      | "read" "(" ident ("," ident)* ")"
    ///      | "write" "(" expr ("," expr)* ")"
    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek_kind() {
            TokenKind::Ident => self.parse_assign(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Read => self.parse_read(),
            TokenKind::Write => self.parse_write(),
            _ => Err(CompileError::syntax(
                format!("unexpected statement {}", describe(&self.current)),
                self.current.position(),
            )),
        }
    }

    fn parse_assign(&mut self) -> Result<Stmt> {
        let target = self.expect_ident()?;
        self.expect(TokenKind::Assign)?;
        let expr = self.parse_expr()?;
        Ok(Stmt::Assign(Assign { target, expr }))
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::If)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Then)?;
        let then_stmts = self.parse_block(&[TokenKind::EndIf, TokenKind::Else])?;
        let else_stmts = if self.consume(TokenKind::Else)? {
            self.parse_block(&[TokenKind::EndIf])?
        } else {
            vec![]
        };
        self.expect(TokenKind::EndIf)?;
        Ok(Stmt::If(cond, then_stmts, else_stmts))
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::While)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Do)?;
        let body = self.parse_block(&[TokenKind::EndWhile])?;
        self.expect(TokenKind::EndWhile)?;
        Ok(Stmt::While(cond, body))
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::For)?;
        let var = self.expect_ident()?;
        self.expect(TokenKind::From)?;
        let from = self.parse_expr()?;
        self.expect(TokenKind::To)?;
        let to = self.parse_expr()?;
        let step = if self.consume(TokenKind::Step)? {
            self.parse_expr()?
        } else {
            Expr::Literal(Literal::new("1", None))
        };
        self.expect(TokenKind::Do)?;
        let body = self.parse_block(&[TokenKind::EndFor])?;
        self.expect(TokenKind::EndFor)?;
        Ok(Stmt::For(ForLoop {
            var,
            from,
            to,
            step,
            body,
        }))
    }

    fn parse_read(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::Read)?;
        self.expect(TokenKind::OpenParen)?;
        let mut targets = vec![self.expect_ident()?];
        while self.consume(TokenKind::Comma)? {
            targets.push(self.expect_ident()?);
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(Stmt::Read(targets))
    }

    fn parse_write(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::Write)?;
        self.expect(TokenKind::OpenParen)?;
        let mut exprs = vec![self.parse_expr()?];
        while self.consume(TokenKind::Comma)? {
            exprs.push(self.parse_expr()?);
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(Stmt::Write(exprs))
    }

    /// expr = logical
    pub(crate) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_logical()
    }

    /// logical = comparison (("and" | "or") comparison)*
    fn parse_logical(&mut self) -> Result<Expr> {
        let mut expr = self.parse_comparison()?;
        loop {
            let kind = match self.peek_kind() {
                TokenKind::And => BinOpKind::And,
                TokenKind::Or => BinOpKind::Or,
                _ => return Ok(expr),
            };
            let pos = self.advance()?.position();
            let right = self.parse_comparison()?;
            expr = Expr::Binary(kind, Box::new(expr), Box::new(right), pos);
        }
    }

    /// comparison = additive (("==" | "!=" | "<" | "<=" | ">" | ">=") additive)?
    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_additive()?;
        let kind = match self.peek_kind() {
            TokenKind::DoubleEqual => BinOpKind::Equal,
            TokenKind::NotEqual => BinOpKind::NotEqual,
            TokenKind::LessThan => BinOpKind::LessThan,
            TokenKind::LessEqual => BinOpKind::LessEqual,
            TokenKind::GreaterThan => BinOpKind::GreaterThan,
            TokenKind::GreaterEqual => BinOpKind::GreaterEqual,
            _ => return Ok(left),
        };
        let pos = self.advance()?.position();
        let right = self.parse_additive()?;
        Ok(Expr::Binary(kind, Box::new(left), Box::new(right), pos))
    }

    /// additive = multiplicative (("+" | "-") multiplicative)*
    fn parse_additive(&mut self) -> Result<Expr> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let kind = match self.peek_kind() {
                TokenKind::Plus => BinOpKind::Add,
                TokenKind::Minus => BinOpKind::Sub,
                _ => return Ok(expr),
            };
            let pos = self.advance()?.position();
            let right = self.parse_multiplicative()?;
            expr = Expr::Binary(kind, Box::new(expr), Box::new(right), pos);
        }
    }

    /// multiplicative = power (("*" | "/" | "%") power)*
    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut expr = self.parse_power()?;
        loop {
            let kind = match self.peek_kind() {
                TokenKind::Star => BinOpKind::Mul,
                TokenKind::Slash => BinOpKind::Div,
                TokenKind::Percent => BinOpKind::Mod,
                _ => return Ok(expr),
            };
            let pos = self.advance()?.position();
            let right = self.parse_power()?;
            expr = Expr::Binary(kind, Box::new(expr), Box::new(right), pos);
        }
    }

    /// power = unary ("^" power)?
    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_unary()?;
        if self.peek_kind() != TokenKind::Caret {
            return Ok(base);
        }
        let pos = self.advance()?.position();
        let exponent = self.parse_power()?;
        Ok(Expr::Binary(
            BinOpKind::Pow,
            Box::new(base),
            Box::new(exponent),
            pos,
        ))
    }

    /// unary = "-" unary
    ///       | primary
    fn parse_unary(&mut self) -> Result<Expr> {
        if self.peek_kind() == TokenKind::Minus {
            let pos = self.advance()?.position();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryOpKind::Neg, Box::new(operand), pos));
        }
        self.parse_primary()
    }

    /// primary = number | text | "true" | "false" | ident | "(" expr ")"
    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek_kind() {
            TokenKind::IntegerLiteral
            | TokenKind::RealLiteral
            | TokenKind::True
            | TokenKind::False => {
                let token = self.advance()?;
                Ok(Expr::Literal(Literal::new(
                    token.lexeme.clone(),
                    Some(token.position()),
                )))
            }
            TokenKind::TextLiteral => {
                let token = self.advance()?;
                Ok(Expr::Literal(Literal::new(
                    format!("\"{}\"", token.lexeme),
                    Some(token.position()),
                )))
            }
            TokenKind::Ident => Ok(Expr::Var(self.expect_ident()?)),
            TokenKind::OpenParen => {
                self.advance()?;
                let expr = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(expr)
            }
            _ => Err(CompileError::syntax(
                format!("unexpected expression {}", describe(&self.current)),
                self.current.position(),
            )),
        }
    }
}
