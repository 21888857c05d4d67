//! Recursive-descent parser.
//!
//! Statements are semicolon-terminated; blocks are delimited by
//! `lets_go`/`yeet`. An identifier statement is an assignment when the next
//! token is `=`, otherwise an expression statement.

use super::ast::{BinOp, DeclType, Expr, Stmt, UnaryOp};
use super::scan::{Token, TokenKind};
use super::EngineError;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>, EngineError> {
        let mut program = Vec::new();
        while !self.check(&TokenKind::Eof) {
            program.push(self.statement()?);
        }
        Ok(program)
    }

    fn statement(&mut self) -> Result<Stmt, EngineError> {
        match self.peek().kind.clone() {
            TokenKind::SpillTheTea => self.print_statement(),
            TokenKind::VibeCheck => self.input_statement(),
            TokenKind::Lit => self.declaration(DeclType::Lit),
            TokenKind::Tea => self.declaration(DeclType::Tea),
            TokenKind::Mood => self.declaration(DeclType::Mood),
            TokenKind::Stan => self.declaration(DeclType::Stan),
            TokenKind::NoCap => self.if_statement(),
            TokenKind::Lowkey => self.while_statement(),
            TokenKind::Highkey => self.for_statement(),
            TokenKind::RizzUp => self.function_declaration(),
            TokenKind::Slay => self.return_statement(),
            TokenKind::AndIOop => {
                self.advance();
                self.eat(&TokenKind::Semicolon)?;
                Ok(Stmt::Break)
            }
            TokenKind::AsIf => {
                self.advance();
                self.eat(&TokenKind::Semicolon)?;
                Ok(Stmt::Continue)
            }
            TokenKind::LetsGo => self.block(),
            TokenKind::Ident(_) if self.next_is(&TokenKind::Assign) => self.assignment(),
            _ => self.expression_statement(),
        }
    }

    fn print_statement(&mut self) -> Result<Stmt, EngineError> {
        self.advance();
        let value = self.expression()?;
        self.eat(&TokenKind::Semicolon)?;
        Ok(Stmt::Print(value))
    }

    fn input_statement(&mut self) -> Result<Stmt, EngineError> {
        self.advance();
        let name = self.ident()?;
        self.eat(&TokenKind::Semicolon)?;
        Ok(Stmt::Input(name))
    }

    fn declaration(&mut self, ty: DeclType) -> Result<Stmt, EngineError> {
        self.advance();
        let name = self.ident()?;
        let init = if self.eat_if(&TokenKind::Assign) {
            Some(self.expression()?)
        } else {
            None
        };
        self.eat(&TokenKind::Semicolon)?;
        Ok(Stmt::Declare { ty, name, init })
    }

    fn assignment(&mut self) -> Result<Stmt, EngineError> {
        let name = self.ident()?;
        self.eat(&TokenKind::Assign)?;
        let value = self.expression()?;
        self.eat(&TokenKind::Semicolon)?;
        Ok(Stmt::Assign { name, value })
    }

    fn if_statement(&mut self) -> Result<Stmt, EngineError> {
        self.advance();
        self.eat(&TokenKind::LParen)?;
        let condition = self.expression()?;
        self.eat(&TokenKind::RParen)?;
        let then_branch = Box::new(self.statement()?);
        // `cap` binds to the nearest `no_cap`
        let else_branch = if self.eat_if(&TokenKind::Cap) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, EngineError> {
        self.advance();
        self.eat(&TokenKind::LParen)?;
        let condition = self.expression()?;
        self.eat(&TokenKind::RParen)?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn for_statement(&mut self) -> Result<Stmt, EngineError> {
        self.advance();
        self.eat(&TokenKind::LParen)?;
        // the initializer is a full statement and consumes its own semicolon
        let init = Box::new(self.statement()?);
        let condition = self.expression()?;
        self.eat(&TokenKind::Semicolon)?;
        let update = Box::new(self.for_update()?);
        self.eat(&TokenKind::RParen)?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
        })
    }

    /// The update slot takes an assignment without its trailing semicolon, or
    /// a bare expression.
    fn for_update(&mut self) -> Result<Stmt, EngineError> {
        if matches!(self.peek().kind, TokenKind::Ident(_)) && self.next_is(&TokenKind::Assign) {
            let name = self.ident()?;
            self.eat(&TokenKind::Assign)?;
            let value = self.expression()?;
            Ok(Stmt::Assign { name, value })
        } else {
            Ok(Stmt::Expression(self.expression()?))
        }
    }

    fn function_declaration(&mut self) -> Result<Stmt, EngineError> {
        self.advance();
        let name = self.ident()?;
        self.eat(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.ident()?);
                if !self.eat_if(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.eat(&TokenKind::RParen)?;
        self.eat(&TokenKind::LetsGo)?;
        let body = self.statements_until_yeet()?;
        Ok(Stmt::Function { name, params, body })
    }

    fn return_statement(&mut self) -> Result<Stmt, EngineError> {
        self.advance();
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.eat(&TokenKind::Semicolon)?;
        Ok(Stmt::Return(value))
    }

    fn block(&mut self) -> Result<Stmt, EngineError> {
        self.advance();
        Ok(Stmt::Block(self.statements_until_yeet()?))
    }

    fn statements_until_yeet(&mut self) -> Result<Vec<Stmt>, EngineError> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::Yeet) && !self.check(&TokenKind::Eof) {
            stmts.push(self.statement()?);
        }
        self.eat(&TokenKind::Yeet)?;
        Ok(stmts)
    }

    fn expression_statement(&mut self) -> Result<Stmt, EngineError> {
        let expr = self.expression()?;
        self.eat(&TokenKind::Semicolon)?;
        Ok(Stmt::Expression(expr))
    }

    fn expression(&mut self) -> Result<Expr, EngineError> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr, EngineError> {
        let mut expr = self.comparison()?;
        loop {
            let op = if self.eat_if(&TokenKind::EqEq) {
                BinOp::Eq
            } else if self.eat_if(&TokenKind::NotEq) {
                BinOp::Ne
            } else {
                return Ok(expr);
            };
            let right = self.comparison()?;
            expr = binary(expr, op, right);
        }
    }

    fn comparison(&mut self) -> Result<Expr, EngineError> {
        let mut expr = self.addition()?;
        loop {
            let op = if self.eat_if(&TokenKind::Less) {
                BinOp::Lt
            } else if self.eat_if(&TokenKind::Greater) {
                BinOp::Gt
            } else if self.eat_if(&TokenKind::LessEq) {
                BinOp::Le
            } else if self.eat_if(&TokenKind::GreaterEq) {
                BinOp::Ge
            } else {
                return Ok(expr);
            };
            let right = self.addition()?;
            expr = binary(expr, op, right);
        }
    }

    fn addition(&mut self) -> Result<Expr, EngineError> {
        let mut expr = self.multiplication()?;
        loop {
            let op = if self.eat_if(&TokenKind::Plus) {
                BinOp::Add
            } else if self.eat_if(&TokenKind::Minus) {
                BinOp::Sub
            } else {
                return Ok(expr);
            };
            let right = self.multiplication()?;
            expr = binary(expr, op, right);
        }
    }

    fn multiplication(&mut self) -> Result<Expr, EngineError> {
        let mut expr = self.unary()?;
        loop {
            let op = if self.eat_if(&TokenKind::Star) {
                BinOp::Mul
            } else if self.eat_if(&TokenKind::Slash) {
                BinOp::Div
            } else if self.eat_if(&TokenKind::Percent) {
                BinOp::Mod
            } else {
                return Ok(expr);
            };
            let right = self.unary()?;
            expr = binary(expr, op, right);
        }
    }

    fn unary(&mut self) -> Result<Expr, EngineError> {
        let op = if self.eat_if(&TokenKind::Minus) {
            UnaryOp::Neg
        } else if self.eat_if(&TokenKind::Plus) {
            UnaryOp::Pos
        } else {
            return self.primary();
        };
        Ok(Expr::Unary {
            op,
            operand: Box::new(self.unary()?),
        })
    }

    fn primary(&mut self) -> Result<Expr, EngineError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Int(n) => Ok(Expr::Int(n)),
            TokenKind::Str(s) => Ok(Expr::Str(s)),
            TokenKind::ThisSlaps => Ok(Expr::Bool(true)),
            TokenKind::ImDead => Ok(Expr::Bool(false)),
            TokenKind::Ghost => Ok(Expr::Null),
            TokenKind::Ident(name) => {
                if self.eat_if(&TokenKind::LParen) {
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.expression()?);
                            if !self.eat_if(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.eat(&TokenKind::RParen)?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            TokenKind::LParen => {
                let expr = self.expression()?;
                self.eat(&TokenKind::RParen)?;
                Ok(expr)
            }
            kind => Err(EngineError::Syntax {
                message: format!("Unexpected {} in expression", kind),
                line: token.line,
                column: token.column,
            }),
        }
    }

    fn peek(&self) -> &Token {
        // the scanner always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn next_is(&self, kind: &TokenKind) -> bool {
        self.tokens.get(self.pos + 1).is_some_and(|t| &t.kind == kind)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat_if(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, expected: &TokenKind) -> Result<Token, EngineError> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            let found = self.peek();
            Err(EngineError::Syntax {
                message: format!("Expected {}, got {}", expected, found.kind),
                line: found.line,
                column: found.column,
            })
        }
    }

    fn ident(&mut self) -> Result<String, EngineError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            kind => Err(EngineError::Syntax {
                message: format!("Expected identifier, got {}", kind),
                line: token.line,
                column: token.column,
            }),
        }
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::super::scan::Scanner;
    use super::*;

    fn parse(source: &str) -> Vec<Stmt> {
        Parser::new(Scanner::new(source).tokenize().unwrap())
            .parse()
            .unwrap()
    }

    fn parse_err(source: &str) -> EngineError {
        match Scanner::new(source)
            .tokenize()
            .and_then(|tokens| Parser::new(tokens).parse())
        {
            Err(e) => e,
            Ok(ast) => panic!("expected a parse error, got {:?}", ast),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse("spill_the_tea 1 + 2 * 3;");
        let Stmt::Print(Expr::Binary { op, right, .. }) = &program[0] else {
            panic!("expected a print of a binary expression");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(
            **right,
            Expr::Binary { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn comparison_binds_tighter_than_equality() {
        let program = parse("spill_the_tea 1 < 2 == this_slaps;");
        let Stmt::Print(Expr::Binary { op, left, .. }) = &program[0] else {
            panic!("expected a print of a binary expression");
        };
        assert_eq!(*op, BinOp::Eq);
        assert!(matches!(**left, Expr::Binary { op: BinOp::Lt, .. }));
    }

    #[test]
    fn cap_attaches_to_the_nearest_no_cap() {
        let program = parse("no_cap (1) no_cap (2) spill_the_tea 1; cap spill_the_tea 2;");
        let Stmt::If {
            then_branch,
            else_branch,
            ..
        } = &program[0]
        else {
            panic!("expected an if statement");
        };
        assert!(else_branch.is_none());
        assert!(matches!(
            **then_branch,
            Stmt::If {
                else_branch: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn for_update_accepts_an_assignment() {
        let program = parse("highkey (lit i = 0; i < 3; i = i + 1) spill_the_tea i;");
        let Stmt::For { init, update, .. } = &program[0] else {
            panic!("expected a for statement");
        };
        assert!(matches!(**init, Stmt::Declare { .. }));
        assert!(matches!(**update, Stmt::Assign { .. }));
    }

    #[test]
    fn function_with_params_and_body() {
        let program = parse("rizz_up add(a, b) lets_go slay a + b; yeet");
        let Stmt::Function { name, params, body } = &program[0] else {
            panic!("expected a function declaration");
        };
        assert_eq!(name, "add");
        assert_eq!(params, &["a", "b"]);
        assert!(matches!(body[0], Stmt::Return(Some(_))));
    }

    #[test]
    fn bare_return_and_call_statement() {
        let program = parse("rizz_up f() lets_go slay; yeet f();");
        assert!(matches!(
            program[0],
            Stmt::Function { .. }
        ));
        assert!(matches!(
            program[1],
            Stmt::Expression(Expr::Call { .. })
        ));
    }

    #[test]
    fn missing_semicolon_reports_position() {
        assert_eq!(
            parse_err("lit x = 1"),
            EngineError::Syntax {
                message: "Expected ';', got end of input".into(),
                line: 1,
                column: 10,
            }
        );
    }

    #[test]
    fn unclosed_block_reports_missing_yeet() {
        let err = parse_err("lets_go spill_the_tea 1;");
        assert!(matches!(err, EngineError::Syntax { ref message, .. }
            if message == "Expected 'yeet', got end of input"));
    }

    #[test]
    fn reserved_words_have_no_expression_meaning() {
        let err = parse_err("spill_the_tea rent_free;");
        assert!(matches!(err, EngineError::Syntax { ref message, .. }
            if message == "Unexpected 'rent_free' in expression"));
        let err = parse_err("main_character;");
        assert!(matches!(err, EngineError::Syntax { ref message, .. }
            if message == "Unexpected 'main_character' in expression"));
    }

    #[test]
    fn input_requires_an_identifier() {
        let err = parse_err("vibe_check 5;");
        assert!(matches!(err, EngineError::Syntax { ref message, .. }
            if message == "Expected identifier, got integer literal"));
    }

    #[test]
    fn assignment_needs_a_declared_style_target() {
        // `x == 1;` is an expression statement, not an assignment
        let program = parse("x == 1;");
        assert!(matches!(
            program[0],
            Stmt::Expression(Expr::Binary { op: BinOp::Eq, .. })
        ));
    }

    #[test]
    fn brackets_scan_but_have_no_production() {
        let err = parse_err("stan xs = [1];");
        assert!(matches!(err, EngineError::Syntax { ref message, .. }
            if message == "Unexpected '[' in expression"));
    }
}
