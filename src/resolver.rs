//! Name resolution, run between parsing and execution.
//!
//! A single walk over the AST maintains a stack of block scopes
//! (`name → (slot, state)`) and:
//! 1. Reports static errors (redeclaration, read in own initializer, misplaced
//!    `return` / `this`, duplicate class members).
//! 2. Records, for every local declaration and every reference to it, the
//!    [`SlotId`] it binds to.  The result is a [`Bindings`] side table keyed by
//!    [`NodeId`]; references with no entry are globals and are looked up by
//!    name at runtime.

use std::collections::{HashMap, HashSet};

use log::{debug, info};
use serde::Serialize;

use crate::ast::{Expr, FunctionDecl, FunctionKind, NodeId, Stmt};
use crate::error::{LoxError, Result};
use crate::stack::ensure_sufficient_stack;
use crate::token::Token;

/// Storage location of one local declaration.  Unique per declaration for the
/// lifetime of a [`Bindings`] table, so shadowed names never share a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SlotId(pub u32);

/// Resolver output: which slot each declaration or reference node binds to.
#[derive(Debug, Default)]
pub struct Bindings {
    slots: HashMap<NodeId, SlotId>,
    next_slot: u32,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a slot no earlier declaration has used.
    pub fn allocate(&mut self) -> SlotId {
        let slot = SlotId(self.next_slot);
        self.next_slot += 1;
        slot
    }

    pub fn bind(&mut self, node: NodeId, slot: SlotId) {
        self.slots.insert(node, slot);
    }

    /// `None` means the node is global.
    pub fn slot(&self, node: NodeId) -> Option<SlotId> {
        self.slots.get(&node).copied()
    }

    /// Drop the entries of every node numbered `first` or later.  Used when a
    /// run is rejected before executing, since its nodes can never be reached.
    pub fn forget_from(&mut self, first: NodeId) {
        self.slots.retain(|node, _| *node < first);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum VarState {
    Initializing,
    Defined,
}

/// Kind of function body being walked, for `return` checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// Whether `this` is legal here.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
}

/// Resolver: tracks scopes, enforces static rules, and records slot bindings.
pub struct Resolver<'b> {
    bindings: &'b mut Bindings,
    scopes: Vec<HashMap<String, (SlotId, VarState)>>,
    current_function: FunctionType,
    current_class: ClassType,
    in_field_initializer: bool,
}

impl<'b> Resolver<'b> {
    /// Create a new resolver writing into `bindings`.
    pub fn new(bindings: &'b mut Bindings) -> Self {
        info!("Resolver instantiated");

        Resolver {
            bindings,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            in_field_initializer: false,
        }
    }

    /// Walk all top‑level statements.  Stops at the first error.
    pub fn resolve(&mut self, statements: &[Stmt]) -> Result<()> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt)?;
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        ensure_sufficient_stack(|| self.visit_stmt(stmt))
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s)?;
                }
                self.end_scope();
            }

            Stmt::Var {
                id,
                name,
                initializer,
            } => {
                self.declare(*id, name)?;
                if let Some(expr) = initializer {
                    self.resolve_expr(expr)?;
                }
                self.define(name);
            }

            Stmt::Function { id, name, function } => {
                // The name is visible inside its own body, so recursion works.
                self.declare(*id, name)?;
                self.define(name);
                self.resolve_function(function, FunctionType::Function)?;
            }

            Stmt::Class {
                id,
                name,
                this_id,
                fields,
                methods,
            } => {
                let enclosing_class = std::mem::replace(&mut self.current_class, ClassType::Class);
                // Methods of a class nested in a field initializer have their own `this`.
                let enclosing_field = std::mem::replace(&mut self.in_field_initializer, false);

                self.declare(*id, name)?;
                self.define(name);

                let mut seen: HashSet<&str> = HashSet::new();
                let member_names = fields
                    .iter()
                    .map(|f| &f.name)
                    .chain(methods.iter().filter_map(|m| m.name.as_ref()));

                for member in member_names {
                    if !seen.insert(member.lexeme.as_str()) {
                        return Err(LoxError::resolve(
                            member,
                            "A member with this name is already declared in this class.",
                        ));
                    }
                }

                self.begin_scope();

                let this_slot = self.bindings.allocate();
                self.bindings.bind(*this_id, this_slot);
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert("this".to_string(), (this_slot, VarState::Defined));
                }

                for field in fields {
                    if let Some(init) = &field.initializer {
                        let outer = std::mem::replace(&mut self.in_field_initializer, true);
                        let resolved = self.resolve_expr(init);
                        self.in_field_initializer = outer;
                        resolved?;
                    }
                }

                for method in methods {
                    let ftype = match method.kind {
                        FunctionKind::Initializer => FunctionType::Initializer,
                        _ => FunctionType::Method,
                    };
                    self.resolve_function(method, ftype)?;
                }

                self.end_scope();
                self.current_class = enclosing_class;
                self.in_field_initializer = enclosing_field;
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(then_branch)?;
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb)?;
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition)?;
                self.resolve_stmt(body)?;
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    return Err(LoxError::resolve(
                        keyword,
                        "Can't return from top-level code.",
                    ));
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        return Err(LoxError::resolve(
                            keyword,
                            "Can't return a value from an initializer.",
                        ));
                    }

                    self.resolve_expr(expr)?;
                }
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) -> Result<()> {
        ensure_sufficient_stack(|| self.visit_expr(expr))
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner)?;
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right)?;
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)?;
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition)?;
                self.resolve_expr(then_branch)?;
                self.resolve_expr(else_branch)?;
            }

            Expr::Variable { id, name } => {
                self.resolve_local(*id, name)?;
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value)?;
                self.resolve_local(*id, name)?;
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee)?;
                for arg in arguments {
                    self.resolve_expr(arg)?;
                }
            }

            Expr::Function(function) => {
                self.resolve_function(function, FunctionType::Function)?;
            }

            Expr::Get { object, .. } => {
                self.resolve_expr(object)?;
            }

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value)?;
                self.resolve_expr(object)?;
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    return Err(LoxError::resolve(
                        keyword,
                        "Can't use 'this' outside of a class.",
                    ));
                }

                if self.in_field_initializer {
                    return Err(LoxError::resolve(
                        keyword,
                        "Can't use 'this' in a field initializer.",
                    ));
                }

                self.resolve_local(*id, keyword)?;
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
        debug!("Begin scope (depth={})", self.scopes.len());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
        debug!("End scope (depth={})", self.scopes.len());
    }

    /// Declare `name` in the innermost scope under a fresh slot.  Globals are
    /// not tracked.
    fn declare(&mut self, id: NodeId, name: &Token) -> Result<()> {
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };

        if scope.contains_key(&name.lexeme) {
            return Err(LoxError::resolve(
                name,
                "Variable with this name already declared in this scope.",
            ));
        }

        let slot = self.bindings.allocate();
        self.bindings.bind(id, slot);
        scope.insert(name.lexeme.clone(), (slot, VarState::Initializing));

        debug!("Declared '{}' as {:?}", name.lexeme, slot);
        Ok(())
    }

    fn define(&mut self, name: &Token) {
        if let Some(entry) = self
            .scopes
            .last_mut()
            .and_then(|scope| scope.get_mut(&name.lexeme))
        {
            entry.1 = VarState::Defined;
        }
    }

    /// Bind a reference to the nearest enclosing declaration of its name.
    /// Nothing found means the reference is global.  Reads and assignments
    /// alike are rejected while the declaration is still initializing.
    fn resolve_local(&mut self, id: NodeId, name: &Token) -> Result<()> {
        for scope in self.scopes.iter().rev() {
            if let Some(&(slot, state)) = scope.get(&name.lexeme) {
                if state == VarState::Initializing {
                    return Err(LoxError::resolve(
                        name,
                        "Cannot read local variable in its own initializer.",
                    ));
                }

                self.bindings.bind(id, slot);
                return Ok(());
            }
        }

        debug!("'{}' left global", name.lexeme);
        Ok(())
    }

    fn resolve_function(&mut self, function: &FunctionDecl, ftype: FunctionType) -> Result<()> {
        let enclosing = std::mem::replace(&mut self.current_function, ftype);

        self.begin_scope();
        for param in &function.params {
            self.declare(param.id, &param.name)?;
            self.define(&param.name);
        }
        for stmt in &function.body {
            self.resolve_stmt(stmt)?;
        }
        self.end_scope();

        self.current_function = enclosing;
        Ok(())
    }
}
