//! Tree‑walking evaluator.
//!
//! Locals are addressed through the slots the resolver recorded in the
//! interpreter's [`Bindings`]; any declaration or reference without a slot
//! goes to the global table by name.  `return` travels up as
//! [`Flow::Return`] until the enclosing call consumes it.

use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, LiteralValue, NodeId, Stmt};
use crate::config::Config;
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::resolver::Bindings;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};
use crate::value::{LoxClass, LoxFunction, LoxInstance, Value};

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    environment: Environment,
    bindings: Bindings,
    out: Box<dyn Write>,
    depth: usize,
    max_depth: usize,
}

impl Interpreter {
    /// Creates a new Interpreter writing `print` output to `out`.
    pub fn new(config: &Config, out: Box<dyn Write>) -> Self {
        info!(
            "Initializing Interpreter (max call depth {})",
            config.max_call_depth
        );

        Self {
            environment: Environment::new(),
            bindings: Bindings::new(),
            out,
            depth: 0,
            max_depth: config.max_call_depth,
        }
    }

    /// The table the resolver fills before [`interpret`](Interpreter::interpret).
    pub fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    /// Where `print` writes.
    pub fn output(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Interprets a list of statements (a "program").  Stops at the first
    /// runtime error; output printed before it is kept.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        let outcome = statements
            .iter()
            .try_for_each(|stmt| self.execute(stmt).map(|_| ()));

        self.out.flush()?;

        if outcome.is_ok() {
            info!("Interpretation completed successfully");
        }

        outcome
    }

    /// Forget all local frames, e.g. after a run was abandoned half way.
    pub fn reset_scopes(&mut self) {
        self.environment.reset_scopes();
        self.depth = 0;
    }

    // ───────────────────────── statements ─────────────────────────

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        ensure_sufficient_stack(|| self.visit_stmt(stmt))
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
            }

            Stmt::Var {
                id,
                name,
                initializer,
            } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}'", name.lexeme);
                self.declare(*id, name, value);
            }

            Stmt::Block(statements) => return self.execute_block(statements),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                }

                if let Some(other) = else_branch {
                    return self.execute(other);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            Stmt::Function { id, name, function } => {
                debug!("Defining function '{}'", name.lexeme);

                let closure = self.environment.capture();
                let value = Value::Function(Rc::new(LoxFunction::new(Rc::clone(function), closure)));
                self.declare(*id, name, value);
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                return Ok(Flow::Return(value));
            }

            Stmt::Class {
                id,
                name,
                this_id,
                fields,
                methods,
            } => {
                debug!("Defining class '{}'", name.lexeme);

                // Visible (as nil) while the members are evaluated.
                self.declare(*id, name, Value::Nil);

                let mut members: HashMap<String, Value> = HashMap::new();

                for field in fields {
                    let value = match &field.initializer {
                        Some(expr) => self.evaluate(expr)?,
                        None => Value::Nil,
                    };
                    members.insert(field.name.lexeme.clone(), value);
                }

                let closure = self.environment.capture();
                for method in methods {
                    let Some(method_name) = &method.name else {
                        continue;
                    };

                    let function = LoxFunction::new(Rc::clone(method), closure.clone());
                    members.insert(method_name.lexeme.clone(), Value::Function(Rc::new(function)));
                }

                let class = LoxClass::new(
                    name.lexeme.clone(),
                    members,
                    self.bindings.slot(*this_id),
                );
                self.store(*id, name, Value::Class(Rc::new(class)))?;
            }
        }

        Ok(Flow::Normal)
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<Flow> {
        let previous = self.environment.enter_scope();
        let outcome = self.execute_sequence(statements);
        self.environment.restore(previous);

        outcome
    }

    fn execute_sequence(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    // ───────────────────────── expressions ────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        ensure_sufficient_stack(|| self.visit_expr(expr))
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                evaluate_unary(operator, right)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                evaluate_binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuits = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Variable { id, name } => self.look_up(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                self.store(*id, name, value.clone())?;
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.invoke_callable(callee, args, paren)
            }

            Expr::Function(function) => {
                let closure = self.environment.capture();
                Ok(Value::Function(Rc::new(LoxFunction::new(
                    Rc::clone(function),
                    closure,
                ))))
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(&name.lexeme).ok_or_else(|| {
                    LoxError::runtime(name, format!("Undefined property '{}'.", name.lexeme))
                }),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;
                instance.set(&name.lexeme, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up(*id, keyword),
        }
    }

    // ───────────────────────── calls ──────────────────────────────

    fn invoke_callable(&mut self, callee: Value, args: Vec<Value>, paren: &Token) -> Result<Value> {
        match callee {
            Value::Function(function) => {
                check_arity(function.arity(), args.len(), paren)?;
                self.call_function(&function, args, paren)
            }

            Value::Class(class) => {
                check_arity(class.arity(), args.len(), paren)?;

                let instance = Rc::new(LoxInstance::new(Rc::clone(&class)));

                if let (Some(init), Some(slot)) = (class.initializer(), class.this_slot) {
                    let bound = init.bind(Rc::clone(&instance), slot);
                    self.call_function(&bound, args, paren)?;
                }

                Ok(Value::Instance(instance))
            }

            other => {
                debug!("Attempted to call a {}", other.type_name());
                Err(LoxError::runtime(paren, "Can only call functions and classes."))
            }
        }
    }

    fn call_function(&mut self, function: &LoxFunction, args: Vec<Value>, paren: &Token) -> Result<Value> {
        if self.depth >= self.max_depth {
            return Err(LoxError::runtime(paren, "Maximum recursion depth exceeded."));
        }

        debug!("Calling {} with {} argument(s)", function, args.len());

        self.depth += 1;
        let previous = self.environment.graft(&function.closure);

        for (param, arg) in function.declaration.params.iter().zip(args) {
            if let Some(slot) = self.bindings.slot(param.id) {
                self.environment.define(slot, arg);
            }
        }

        let outcome = self.execute_sequence(&function.declaration.body);

        self.environment.restore(previous);
        self.depth -= 1;

        let returned = match outcome? {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        };

        // Initializers always hand back their instance.
        if function.is_initializer() {
            if let Some(receiver) = &function.receiver {
                return Ok(Value::Instance(Rc::clone(receiver)));
            }
        }

        Ok(returned)
    }

    // ───────────────────────── storage ────────────────────────────

    fn declare(&mut self, id: NodeId, name: &Token, value: Value) {
        match self.bindings.slot(id) {
            Some(slot) => self.environment.define(slot, value),
            None => self.environment.define_global(&name.lexeme, value),
        }
    }

    fn store(&mut self, id: NodeId, name: &Token, value: Value) -> Result<()> {
        match self.bindings.slot(id) {
            Some(slot) => self.environment.assign(slot, value, name),
            None => self.environment.assign_global(name, value),
        }
    }

    fn look_up(&self, id: NodeId, name: &Token) -> Result<Value> {
        match self.bindings.slot(id) {
            Some(slot) => self.environment.get(slot, name),
            None => self.environment.get_global(name),
        }
    }
}

fn check_arity(expected: usize, found: usize, paren: &Token) -> Result<()> {
    if expected != found {
        return Err(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", expected, found),
        ));
    }

    Ok(())
}

fn evaluate_unary(operator: &Token, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::MINUS => match right {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
        },

        TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),

        _ => Err(LoxError::runtime(operator, "Unknown unary operator.")),
    }
}

fn evaluate_binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::PLUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            _ => Err(LoxError::runtime(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        },

        TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),
        TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

        _ => {
            let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
                return Err(LoxError::runtime(operator, "Operands must be numbers."));
            };
            let (a, b) = (*a, *b);

            let value = match operator.token_type {
                TokenType::MINUS => Value::Number(a - b),
                TokenType::STAR => Value::Number(a * b),
                TokenType::SLASH => Value::Number(if b == 0.0 { f64::NAN } else { a / b }),
                TokenType::STAR_STAR => Value::Number(a.powf(b)),
                TokenType::GREATER => Value::Bool(a > b),
                TokenType::GREATER_EQUAL => Value::Bool(a >= b),
                TokenType::LESS => Value::Bool(a < b),
                TokenType::LESS_EQUAL => Value::Bool(a <= b),
                _ => return Err(LoxError::runtime(operator, "Unknown binary operator.")),
            };

            Ok(value)
        }
    }
}
