/*!
Parser for Lox: recursive descent for statements, Pratt (precedence climbing)
for expressions.

Grammar (EBNF, condensed)
--------------------------

```text
program        → declaration* EOF ;
declaration    → classDecl | funDecl | varDecl | statement ;
classDecl      → "class" IDENT "{" member* "}" ;
member         → IDENT function | "var"? IDENT ( "=" expression )? ";" ;
funDecl        → "fun" IDENT function ;
function       → "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | printStmt | whileStmt | forStmt | switchStmt
               | ifStmt | block | returnStmt ;
switchStmt     → "switch" "(" expression ")" "{" ( expression "=>" statement )* "}" ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" ) expression? ";" expression? ")" statement ;
block          → "{" declaration* "}" ;
```

Expressions are parsed by [`Parser::expression_at`]: a prefix form followed by
a loop over infix/postfix operators whose [`Precedence`] is above the
caller's minimum.  Right‑associative operators (`=`, `?:`, `**`) parse their
right operand one level lower, so the same operator to the right binds first.
Calls and property access are postfix operators at [`Precedence::Call`].

Desugaring
----------

* `for` becomes `{ init; while (cond) { body; increment; } }`.
* `switch` becomes a block that caches the subject in a hidden variable and an
  `if`/`else if` chain comparing it against each arm; `_` is the default arm.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `declaration`, `statement`   | `debug`| High‑level descent into grammar branches. |
*/

use std::rc::Rc;

use crate::ast::{Expr, FieldDecl, FunctionDecl, FunctionKind, LiteralValue, NodeId, Param, Stmt};
use crate::diagnostic::Reporter;
use crate::error::{LoxError, LoxExit, Result};
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Upper bound on parameters and call arguments.
pub const MAX_ARITY: usize = 255;

/// Binding power of infix and postfix operators, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None,
    Assignment,
    Ternary,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Exponent,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    /// Precedence of `token_type` when it appears after an operand.
    pub fn of(token_type: &TokenType) -> Option<Self> {
        let prec = match token_type {
            TokenType::EQUAL => Precedence::Assignment,
            TokenType::QUESTION => Precedence::Ternary,
            TokenType::OR => Precedence::Or,
            TokenType::AND => Precedence::And,
            TokenType::BANG_EQUAL | TokenType::EQUAL_EQUAL => Precedence::Equality,
            TokenType::LESS
            | TokenType::LESS_EQUAL
            | TokenType::GREATER
            | TokenType::GREATER_EQUAL => Precedence::Comparison,
            TokenType::MINUS | TokenType::PLUS => Precedence::Term,
            TokenType::SLASH | TokenType::STAR => Precedence::Factor,
            TokenType::STAR_STAR => Precedence::Exponent,
            TokenType::LEFT_PAREN | TokenType::DOT => Precedence::Call,
            _ => return None,
        };

        Some(prec)
    }

    /// The next weaker level.
    fn lower(self) -> Self {
        match self {
            Precedence::None | Precedence::Assignment => Precedence::None,
            Precedence::Ternary => Precedence::Assignment,
            Precedence::Or => Precedence::Ternary,
            Precedence::And => Precedence::Or,
            Precedence::Equality => Precedence::And,
            Precedence::Comparison => Precedence::Equality,
            Precedence::Term => Precedence::Comparison,
            Precedence::Factor => Precedence::Term,
            Precedence::Exponent => Precedence::Factor,
            Precedence::Unary => Precedence::Exponent,
            Precedence::Call => Precedence::Unary,
            Precedence::Primary => Precedence::Call,
        }
    }

    /// Minimum precedence for the right operand of `operator`.
    fn for_right_operand(self, operator: &TokenType) -> Self {
        match operator {
            TokenType::EQUAL | TokenType::QUESTION | TokenType::STAR_STAR => self.lower(),
            _ => self,
        }
    }
}

/// Top‑level parser over an owned token sequence.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: u32,
    errors: Vec<LoxError>,
}

impl Parser {
    /// Construct a new parser.  The token list is expected to end in `EOF`;
    /// one is appended if missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        if tokens.last().map_or(true, |t| t.token_type != TokenType::EOF) {
            let offset = tokens.last().map_or(0, |t| t.offset);
            tokens.push(Token::new(TokenType::EOF, "", offset));
        }

        Self {
            tokens,
            current: 0,
            next_id: 0,
            errors: Vec::new(),
        }
    }

    /// Number node ids from `first_id` instead of zero.
    pub fn starting_at(mut self, first_id: u32) -> Self {
        self.next_id = first_id;
        self
    }

    /// The first node id this parser has not handed out.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program.
    ///
    /// Recoverable syntax errors are reported and skipped, so the returned
    /// list may be partial; the caller checks [`Reporter::checkpoint`].  A
    /// fatal syntax error stops the parse and is returned as the exit signal.
    pub fn parse(&mut self, reporter: &mut Reporter) -> std::result::Result<Vec<Stmt>, LoxExit> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        let outcome: Result<()> = loop {
            if self.is_at_end() {
                break Ok(());
            }

            match self.declaration() {
                Ok(Some(stmt)) => statements.push(stmt),
                Ok(None) => {}
                Err(e) => break Err(e),
            }
        };

        for error in self.errors.drain(..) {
            reporter.report(error)?;
        }

        if let Err(fatal) = outcome {
            reporter.report(fatal)?;
        }

        info!("Parsed {} top-level statements", statements.len());

        Ok(statements)
    }

    // ──────────────────────── declaration rules ───────────────────

    /// Parse one declaration.  Recoverable errors are recorded and the parser
    /// synchronizes, yielding `None`; fatal errors propagate.
    fn declaration(&mut self) -> Result<Option<Stmt>> {
        debug!("Entering declaration at {:?}", self.peek().token_type);

        let result = if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else if self.matches(TokenType::CLASS) {
            self.class_declaration()
        } else if self.check(TokenType::FUN) && self.check_next(TokenType::IDENTIFIER) {
            self.advance();
            self.function_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Ok(Some(stmt)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                debug!("Recovering from parse error: {}", e);
                self.errors.push(e);
                self.synchronize();
                Ok(None)
            }
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expect class name.")?;
        let id = self.fresh_id();
        let this_id = self.fresh_id();

        self.consume(TokenType::LEFT_BRACE, "Expect '{' before class body.")?;

        let mut fields: Vec<FieldDecl> = Vec::new();
        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            let explicit_var = self.matches(TokenType::VAR);

            if !explicit_var
                && self.check(TokenType::IDENTIFIER)
                && self.check_next(TokenType::LEFT_PAREN)
            {
                let method_name: Token = self.advance().clone();
                let kind = if method_name.lexeme == "init" {
                    FunctionKind::Initializer
                } else {
                    FunctionKind::Method
                };

                methods.push(Rc::new(self.function_body(Some(method_name), kind)?));
                continue;
            }

            let field_name: Token = if explicit_var {
                self.consume(TokenType::IDENTIFIER, "Expect field name.")?
            } else {
                self.consume(TokenType::IDENTIFIER, "Expect method or field declaration.")?
            };

            let initializer: Option<Expr> = if self.matches(TokenType::EQUAL) {
                Some(self.expression()?)
            } else {
                None
            };

            self.consume(TokenType::SEMICOLON, "Expect ';' after field declaration.")?;

            fields.push(FieldDecl {
                name: field_name,
                initializer,
            });
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after class body.")?;

        Ok(Stmt::Class {
            id,
            name,
            this_id,
            fields,
            methods,
        })
    }

    fn function_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expect function name.")?;
        let id = self.fresh_id();
        let function = self.function_body(Some(name.clone()), FunctionKind::Function)?;

        Ok(Stmt::Function {
            id,
            name,
            function: Rc::new(function),
        })
    }

    /// `"(" parameters? ")" block`, shared by declarations, methods and
    /// anonymous functions.
    fn function_body(&mut self, name: Option<Token>, kind: FunctionKind) -> Result<FunctionDecl> {
        let label = match kind {
            FunctionKind::Function => "function",
            FunctionKind::Method | FunctionKind::Initializer => "method",
        };

        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expect '(' before {} parameters.", label),
        )?;

        let mut params: Vec<Param> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    return Err(LoxError::parse(
                        self.peek(),
                        "Can't have more than 255 parameters.",
                    ));
                }

                let param_name = self.consume(TokenType::IDENTIFIER, "Expect parameter name.")?;
                params.push(Param {
                    id: self.fresh_id(),
                    name: param_name,
                });

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;
        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expect '{{' before {} body.", label),
        )?;

        let body: Vec<Stmt> = self.block()?;

        Ok(FunctionDecl {
            name,
            kind,
            params,
            body,
        })
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expect variable name.")?;
        let id = self.fresh_id();

        let initializer: Option<Expr> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expect ';' after variable declaration.",
        )?;

        Ok(Stmt::Var {
            id,
            name,
            initializer,
        })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        debug!("Entering statement at {:?}", self.peek().token_type);

        if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(TokenType::SWITCH) {
            self.switch_statement()
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else {
            self.expression_statement()
        }
    }

    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer: Option<Stmt> = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition: Expr = if !self.check(TokenType::SEMICOLON) {
            self.expression()?
        } else {
            Expr::Literal(LiteralValue::True)
        };
        self.consume(TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

        let increment: Option<Expr> = if !self.check(TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let body: Stmt = self.statement()?;

        let body: Stmt = match increment {
            Some(inc) => Stmt::Block(vec![body, Stmt::Expression(inc)]),
            None => scoped(body),
        };

        let looped = Stmt::While {
            condition,
            body: Box::new(body),
        };

        Ok(match initializer {
            Some(init) => Stmt::Block(vec![init, looped]),
            None => looped,
        })
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'if'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after if condition.")?;

        let then_branch: Box<Stmt> = Box::new(scoped(self.statement()?));
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(scoped(self.statement()?)))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn switch_statement(&mut self) -> Result<Stmt> {
        let keyword: Token = self.previous().clone();

        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'switch'.")?;
        let subject: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after switch condition.")?;

        // '#' never scans as part of an identifier, so user code cannot name this.
        let cache_id = self.fresh_id();
        let cache = Token::synthetic(
            TokenType::IDENTIFIER,
            format!("switch#{}", cache_id.0),
            &keyword,
        );

        self.consume(TokenType::LEFT_BRACE, "Expect '{' before switch arms.")?;

        let mut arms: Vec<(Expr, Stmt)> = Vec::new();
        let mut default_action: Option<Stmt> = None;

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            let arm_start: Token = self.peek().clone();
            let arm_condition: Expr = self.expression()?;
            self.consume(TokenType::EQUAL_GREATER, "Expect '=>' after switch arm.")?;
            let arm_action: Stmt = self.statement()?;

            match arm_condition {
                Expr::Variable { ref name, .. } if name.lexeme == "_" => {
                    if default_action.is_some() {
                        return Err(LoxError::fatal_parse(
                            &arm_start,
                            "Cannot have more than one default case.",
                        ));
                    }

                    default_action = Some(arm_action);
                }
                _ => arms.push((arm_condition, arm_action)),
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after switch arms.")?;

        // Build the if/else chain from the innermost (last) arm outwards.
        let mut chain: Option<Stmt> = default_action;

        for (arm_condition, arm_action) in arms.into_iter().rev() {
            let test = Expr::Binary {
                left: Box::new(Expr::Variable {
                    id: self.fresh_id(),
                    name: cache.clone(),
                }),
                operator: Token::synthetic(TokenType::EQUAL_EQUAL, "==", &keyword),
                right: Box::new(arm_condition),
            };

            chain = Some(Stmt::If {
                condition: test,
                then_branch: Box::new(arm_action),
                else_branch: chain.map(Box::new),
            });
        }

        let mut block: Vec<Stmt> = vec![Stmt::Var {
            id: cache_id,
            name: cache,
            initializer: Some(subject),
        }];
        block.extend(chain);

        Ok(Stmt::Block(block))
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value: Expr = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expect ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr: Expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after while condition.")?;
        let body: Box<Stmt> = Box::new(scoped(self.statement()?));

        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword: Token = self.previous().clone();
        let value: Option<Expr> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration()? {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after block.")?;
        Ok(statements)
    }

    // ─────────────────────── expression rules (Pratt) ─────────────

    fn expression(&mut self) -> Result<Expr> {
        self.expression_at(Precedence::None)
    }

    /// Parse an expression whose operators all bind tighter than `min`.
    pub fn expression_at(&mut self, min: Precedence) -> Result<Expr> {
        ensure_sufficient_stack(|| {
            let mut left: Expr = self.prefix()?;

            loop {
                let Some(prec) = Precedence::of(&self.peek().token_type) else {
                    break;
                };

                if prec <= min {
                    break;
                }

                let operator: Token = self.advance().clone();
                let right_min = prec.for_right_operand(&operator.token_type);

                left = match operator.token_type {
                    TokenType::LEFT_PAREN => self.finish_call(left, operator)?,

                    TokenType::DOT => {
                        let name: Token = self
                            .consume(TokenType::IDENTIFIER, "Expect property name after '.'.")?;

                        Expr::Get {
                            object: Box::new(left),
                            name,
                        }
                    }

                    TokenType::QUESTION => {
                        // The middle is delimited by '?' and ':', so it takes
                        // any expression.
                        let then_branch: Expr = self.expression()?;
                        self.consume(TokenType::COLON, "Expect ':' in ternary if operator.")?;
                        let else_branch: Expr = self.expression_at(right_min)?;

                        Expr::Ternary {
                            condition: Box::new(left),
                            then_branch: Box::new(then_branch),
                            else_branch: Box::new(else_branch),
                        }
                    }

                    TokenType::EQUAL => {
                        let value: Expr = self.expression_at(right_min)?;
                        self.assignment(&operator, left, value)?
                    }

                    TokenType::AND | TokenType::OR => {
                        let right: Expr = self.expression_at(right_min)?;

                        Expr::Logical {
                            left: Box::new(left),
                            operator,
                            right: Box::new(right),
                        }
                    }

                    _ => {
                        let right: Expr = self.expression_at(right_min)?;

                        Expr::Binary {
                            left: Box::new(left),
                            operator,
                            right: Box::new(right),
                        }
                    }
                };
            }

            Ok(left)
        })
    }

    /// Prefix operators and primary expressions.  The offending token is not
    /// consumed on error, so synchronization starts from it.
    fn prefix(&mut self) -> Result<Expr> {
        let token: Token = self.peek().clone();

        let expr = match token.token_type {
            TokenType::LEFT_PAREN => {
                self.advance();
                let enclosed: Expr = self.expression()?;
                self.consume(TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;
                Expr::Grouping(Box::new(enclosed))
            }

            TokenType::BANG | TokenType::MINUS => {
                self.advance();
                let right: Expr = self.expression_at(Precedence::Unary)?;
                Expr::Unary {
                    operator: token,
                    right: Box::new(right),
                }
            }

            TokenType::FALSE => {
                self.advance();
                Expr::Literal(LiteralValue::False)
            }

            TokenType::TRUE => {
                self.advance();
                Expr::Literal(LiteralValue::True)
            }

            TokenType::NIL => {
                self.advance();
                Expr::Literal(LiteralValue::Nil)
            }

            TokenType::NUMBER(n) => {
                self.advance();
                Expr::Literal(LiteralValue::Number(n))
            }

            TokenType::STRING(s) => {
                self.advance();
                Expr::Literal(LiteralValue::Str(s))
            }

            TokenType::FUN => {
                self.advance();
                let function = self.function_body(None, FunctionKind::Function)?;
                Expr::Function(Rc::new(function))
            }

            TokenType::IDENTIFIER => {
                self.advance();
                Expr::Variable {
                    id: self.fresh_id(),
                    name: token,
                }
            }

            TokenType::THIS => {
                self.advance();
                Expr::This {
                    id: self.fresh_id(),
                    keyword: token,
                }
            }

            _ => return Err(LoxError::parse(&token, "Expect expression.")),
        };

        Ok(expr)
    }

    fn assignment(&mut self, equals: &Token, target: Expr, value: Expr) -> Result<Expr> {
        match target {
            Expr::Variable { id, name } => Ok(Expr::Assign {
                id,
                name,
                value: Box::new(value),
            }),

            Expr::Get { object, name } => Ok(Expr::Set {
                object,
                name,
                value: Box::new(value),
            }),

            _ => Err(LoxError::parse(equals, "Invalid assignment target.")),
        }
    }

    fn finish_call(&mut self, callee: Expr, paren: Token) -> Result<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    return Err(LoxError::parse(
                        self.peek(),
                        "Can't have more than 255 arguments.",
                    ));
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    // ────────────────────── utility helpers ───────────────────────

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<Token> {
        if self.check(ttype) {
            return Ok(self.advance().clone());
        }

        Err(LoxError::parse(self.peek(), message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn check_next(&self, ttype: TokenType) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|t| t.token_type == ttype)
    }

    #[inline(always)]
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Discards tokens until it thinks it is at a statement boundary.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::SWITCH
                | TokenType::PRINT
                | TokenType::RETURN => return,
                _ => {}
            }

            self.advance();
        }
    }
}

/// Wrap `stmt` in its own block unless it already is one.
fn scoped(stmt: Stmt) -> Stmt {
    match stmt {
        Stmt::Block(_) => stmt,
        other => Stmt::Block(vec![other]),
    }
}
