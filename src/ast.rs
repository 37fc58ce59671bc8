//! Abstract syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Nodes own their children outright.  Declarations and name references carry
//! a [`NodeId`]; the resolver records what each id binds to in a side table,
//! so the tree itself is never mutated after parsing.

use std::rc::Rc;

use serde::Serialize;

use crate::token::Token;

/// Identity of a resolvable node, unique within one parser run (and across a
/// session when the driver threads the counter through).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,
    False,
    Nil,
}

/// What sort of callable a function body belongs to.  The resolver uses it to
/// police `return`, the interpreter to make constructors yield their instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FunctionKind {
    Function,
    Method,
    Initializer,
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub id: NodeId,
    pub name: Token,
}

/// Parameter list and body shared by function declarations, anonymous
/// function expressions and methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    /// Source name, `None` for anonymous functions.
    pub name: Option<Token>,

    pub kind: FunctionKind,

    pub params: Vec<Param>,

    /// Statements of the body; they share the parameters' scope.
    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Prefix unary operator expression: `!ready`, `-42`.
    Unary { operator: Token, right: Box<Expr> },

    /// Infix binary operator expression: `a + b`, `x <= y`, `b ** e`.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// `condition ? then_branch : else_branch`
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr>),

    /// Variable access.
    Variable { id: NodeId, name: Token },

    /// `identifier "=" expression`
    Assign {
        id: NodeId,
        name: Token,
        value: Box<Expr>,
    },

    /// Call expression: `add(1, 2)`.
    Call {
        callee: Box<Expr>,
        /// The opening `(` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// Anonymous function literal: `fun (a) { return a; }`.
    Function(Rc<FunctionDecl>),

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This { id: NodeId, keyword: Token },
}

/// A class body field with its default value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name: Token,
    pub initializer: Option<Expr>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        id: NodeId,
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope.  `for`, `switch`, `if` branches and loop bodies are
    /// wrapped in one by the parser as well.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While { condition: Expr, body: Box<Stmt> },

    /// Named function declaration.
    Function {
        id: NodeId,
        name: Token,
        function: Rc<FunctionDecl>,
    },

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    Class {
        id: NodeId,
        name: Token,

        /// Scope holding `this` for the methods.
        this_id: NodeId,

        fields: Vec<FieldDecl>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
