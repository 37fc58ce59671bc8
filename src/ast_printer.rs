use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};

/// Renders the AST as S‑expressions for the `dump-ast` debug output.
pub struct Ast;

impl Ast {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print(left),
                self.print(right)
            ),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print(right))
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "(?: {} {} {})",
                self.print(condition),
                self.print(then_branch),
                self.print(else_branch)
            ),

            Expr::Literal(value) => match value {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                LiteralValue::Str(s) => format!("\"{}\"", s),

                LiteralValue::True => "true".to_string(),

                LiteralValue::False => "false".to_string(),

                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Grouping(expr) => format!("(group {})", self.print(expr)),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", self.print(callee));
                for arg in arguments {
                    out.push(' ');
                    out.push_str(&self.print(arg));
                }
                out.push(')');
                out
            }

            Expr::Function(function) => format!("(fun {})", self.function(function)),

            Expr::Get { object, name } => format!("(. {} {})", self.print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(.= {} {} {})",
                self.print(object),
                name.lexeme,
                self.print(value)
            ),

            Expr::This { .. } => "this".to_string(),
        }
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(expr {})", self.print(expr)),

            Stmt::Print(expr) => format!("(print {})", self.print(expr)),

            Stmt::Var {
                name, initializer, ..
            } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, self.print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => format!("(block{})", self.sequence(statements)),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(other) => format!(
                    "(if {} {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch),
                    self.print_stmt(other)
                ),
                None => format!(
                    "(if {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                self.print(condition),
                self.print_stmt(body)
            ),

            Stmt::Function { name, function, .. } => {
                format!("(fun {} {})", name.lexeme, self.function(function))
            }

            Stmt::Return { value, .. } => match value {
                Some(v) => format!("(return {})", self.print(v)),
                None => "(return)".to_string(),
            },

            Stmt::Class {
                name,
                fields,
                methods,
                ..
            } => {
                let mut out = format!("(class {}", name.lexeme);
                for field in fields {
                    match &field.initializer {
                        Some(init) => out.push_str(&format!(
                            " (field {} {})",
                            field.name.lexeme,
                            self.print(init)
                        )),
                        None => out.push_str(&format!(" (field {})", field.name.lexeme)),
                    }
                }
                for method in methods {
                    let method_name = method.name.as_ref().map_or("", |t| t.lexeme.as_str());
                    out.push_str(&format!(" (method {} {})", method_name, self.function(method)));
                }
                out.push(')');
                out
            }
        }
    }

    /// `(param ...) body...` without the surrounding parentheses.
    fn function(&self, function: &FunctionDecl) -> String {
        let params: Vec<&str> = function
            .params
            .iter()
            .map(|p| p.name.lexeme.as_str())
            .collect();

        format!("({}){}", params.join(" "), self.sequence(&function.body))
    }

    fn sequence(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|s| format!(" {}", self.print_stmt(s)))
            .collect()
    }
}
