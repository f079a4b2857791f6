//! Syntax tree for the declaration language
//!
//! Declaration files are Python source. They are parsed with ast-grep's
//! Python grammar and lowered into a small [`Expr`] tree. Only the node
//! kinds below are lowered; any other node, and any tree-sitter error or
//! missing node, is a syntax error at that node's position.
//!
//! ```text
//! module      expression_statement(assignment) separated by newlines or ';'
//! assignment  identifier '=' expr
//! expr        string | concatenated_string | integer | true | false | none
//!             | identifier | call(identifier, argument_list)
//!             | dictionary(pair*) | list | parenthesized_expression
//!             | binary_operator('+' | '%')
//! ```

use ast_grep_core::source::StrDoc;
use ast_grep_core::{AstGrep, Node};
use ast_grep_language::Python;

use crate::errors::EvalError;

type PyNode<'r> = Node<'r, StrDoc<Python>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Format,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    Name(String),
    Call { name: String, args: Vec<Expr> },
    Dict(Vec<(Expr, Expr)>),
    List(Vec<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Expression node, tagged with the line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

/// Top-level `name = expr` binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: Expr,
    pub line: usize,
}

/// Parse declaration text into its sequence of top-level bindings
pub fn parse_module(source: &str) -> Result<Vec<Assignment>, EvalError> {
    let sg = AstGrep::new(source, Python);
    let root = sg.root();

    let lowering = Lowering { source };
    lowering.check_well_formed(&root)?;
    lowering.module(&root)
}

/// Tokens that carry no meaning once the tree is built
fn is_trivia(kind: &str) -> bool {
    matches!(kind, "comment" | "line_continuation")
}

struct Lowering<'s> {
    source: &'s str,
}

impl Lowering<'_> {
    /// 1-based line and column of a byte offset
    fn position(&self, offset: usize) -> (usize, usize) {
        let before = self.source.get(..offset).unwrap_or(self.source);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }

    fn line_of(&self, node: &PyNode<'_>) -> usize {
        self.position(node.range().start).0
    }

    fn error_at(&self, node: &PyNode<'_>, message: impl Into<String>) -> EvalError {
        let (line, column) = self.position(node.range().start);
        EvalError::syntax(line, column, message)
    }

    fn unsupported(&self, node: &PyNode<'_>) -> EvalError {
        let text = node.text();
        let snippet = text.lines().next().unwrap_or_default();
        self.error_at(
            node,
            format!("unsupported {} '{}'", node.kind().replace('_', " "), snippet),
        )
    }

    /// Reject parse errors and tokens the parser had to invent
    fn check_well_formed(&self, node: &PyNode<'_>) -> Result<(), EvalError> {
        if node.kind() == "ERROR" {
            let text = node.text();
            let snippet = text.lines().next().unwrap_or_default();
            return Err(self.error_at(node, format!("invalid syntax near '{}'", snippet)));
        }
        for child in node.children() {
            if child.range().is_empty() {
                return Err(self.error_at(&child, format!("expected '{}'", child.kind())));
            }
            self.check_well_formed(&child)?;
        }
        Ok(())
    }

    fn module(&self, root: &PyNode<'_>) -> Result<Vec<Assignment>, EvalError> {
        let mut statements = Vec::new();
        for child in root.children() {
            let kind = child.kind();
            match &*kind {
                ";" => {}
                k if is_trivia(k) => {}
                "expression_statement" => statements.push(self.statement(&child)?),
                _ => return Err(self.unsupported(&child)),
            }
        }
        Ok(statements)
    }

    fn statement(&self, node: &PyNode<'_>) -> Result<Assignment, EvalError> {
        let mut parts = node.children().filter(|c| !is_trivia(&c.kind()));
        let (Some(assignment), None) = (parts.next(), parts.next()) else {
            return Err(self.unsupported(node));
        };
        if assignment.kind() != "assignment" || assignment.field("type").is_some() {
            return Err(self.unsupported(&assignment));
        }

        let target = assignment
            .field("left")
            .ok_or_else(|| self.unsupported(&assignment))?;
        if target.kind() != "identifier" {
            return Err(self.error_at(&target, "only plain names can be assigned"));
        }
        let value = assignment
            .field("right")
            .ok_or_else(|| self.unsupported(&assignment))?;

        Ok(Assignment {
            name: target.text().to_string(),
            value: self.expr(&value)?,
            line: self.line_of(node),
        })
    }

    fn expr(&self, node: &PyNode<'_>) -> Result<Expr, EvalError> {
        let line = self.line_of(node);
        let node_kind = node.kind();
        let kind = match &*node_kind {
            "string" => ExprKind::Str(self.string(node)?),
            "concatenated_string" => {
                let mut joined = String::new();
                for part in node.children().filter(|c| c.kind() == "string") {
                    joined.push_str(&self.string(&part)?);
                }
                ExprKind::Str(joined)
            }
            "integer" => ExprKind::Int(self.integer(node)?),
            "true" => ExprKind::Bool(true),
            "false" => ExprKind::Bool(false),
            "none" => ExprKind::None,
            "identifier" => ExprKind::Name(node.text().to_string()),
            "parenthesized_expression" => {
                let mut inner = node.children().filter(|c| {
                    let k = c.kind();
                    !matches!(&*k, "(" | ")") && !is_trivia(&k)
                });
                let (Some(inner), None) = (inner.next(), inner.next()) else {
                    return Err(self.unsupported(node));
                };
                return self.expr(&inner);
            }
            "binary_operator" => self.binary(node)?,
            "call" => self.call(node)?,
            "dictionary" => ExprKind::Dict(self.dictionary(node)?),
            "list" => ExprKind::List(self.items(node, &["[", "]", ","])?),
            _ => return Err(self.unsupported(node)),
        };
        Ok(Expr { kind, line })
    }

    /// Lower every child except the listed punctuation
    fn items(&self, node: &PyNode<'_>, punctuation: &[&str]) -> Result<Vec<Expr>, EvalError> {
        node.children()
            .filter(|c| {
                let k = c.kind();
                !punctuation.contains(&&*k) && !is_trivia(&k)
            })
            .map(|c| self.expr(&c))
            .collect()
    }

    fn dictionary(&self, node: &PyNode<'_>) -> Result<Vec<(Expr, Expr)>, EvalError> {
        let mut entries = Vec::new();
        for child in node.children() {
            let kind = child.kind();
            match &*kind {
                "{" | "}" | "," => {}
                k if is_trivia(k) => {}
                "pair" => {
                    let key = child.field("key").ok_or_else(|| self.unsupported(&child))?;
                    let value = child
                        .field("value")
                        .ok_or_else(|| self.unsupported(&child))?;
                    entries.push((self.expr(&key)?, self.expr(&value)?));
                }
                _ => return Err(self.unsupported(&child)),
            }
        }
        Ok(entries)
    }

    fn binary(&self, node: &PyNode<'_>) -> Result<ExprKind, EvalError> {
        let (Some(lhs), Some(operator), Some(rhs)) = (
            node.field("left"),
            node.field("operator"),
            node.field("right"),
        ) else {
            return Err(self.unsupported(node));
        };

        let op = match &*operator.text() {
            "+" => BinOp::Add,
            "%" => BinOp::Format,
            other => {
                return Err(self.error_at(&operator, format!("unsupported operator '{}'", other)))
            }
        };

        Ok(ExprKind::Binary {
            op,
            lhs: Box::new(self.expr(&lhs)?),
            rhs: Box::new(self.expr(&rhs)?),
        })
    }

    fn call(&self, node: &PyNode<'_>) -> Result<ExprKind, EvalError> {
        let function = node.field("function").ok_or_else(|| self.unsupported(node))?;
        if function.kind() != "identifier" {
            return Err(self.error_at(&function, "only calls by plain name are allowed"));
        }
        let arguments = node
            .field("arguments")
            .ok_or_else(|| self.unsupported(node))?;
        if arguments.kind() != "argument_list" {
            return Err(self.unsupported(&arguments));
        }

        let args = self.items(&arguments, &["(", ")", ","])?;
        Ok(ExprKind::Call {
            name: function.text().to_string(),
            args,
        })
    }

    fn integer(&self, node: &PyNode<'_>) -> Result<i64, EvalError> {
        let digits = node.text().replace('_', "");
        let lower = digits.to_ascii_lowercase();
        let parsed = if let Some(hex) = lower.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else if let Some(oct) = lower.strip_prefix("0o") {
            i64::from_str_radix(oct, 8)
        } else if let Some(bin) = lower.strip_prefix("0b") {
            i64::from_str_radix(bin, 2)
        } else {
            lower.parse()
        };
        parsed.map_err(|_| self.error_at(node, format!("invalid integer literal '{}'", digits)))
    }

    fn string(&self, node: &PyNode<'_>) -> Result<String, EvalError> {
        let text = node.text();
        let Some(quote_at) = text.find(|c: char| c == '\'' || c == '"') else {
            return Err(self.unsupported(node));
        };
        let (prefix, body) = text.split_at(quote_at);

        let raw = match prefix.to_ascii_lowercase().as_str() {
            "" | "u" => false,
            "r" => true,
            _ => {
                return Err(self.error_at(
                    node,
                    format!("unsupported string prefix '{}'", prefix),
                ))
            }
        };

        let quote = if body.starts_with("\"\"\"") || body.starts_with("'''") {
            &body[..3]
        } else {
            &body[..1]
        };
        let inner = body
            .strip_prefix(quote)
            .and_then(|b| b.strip_suffix(quote))
            .ok_or_else(|| self.error_at(node, "unterminated string"))?;

        if raw {
            return Ok(inner.to_string());
        }
        unescape(inner).map_err(|message| self.error_at(node, message))
    }
}

/// Resolve backslash escapes the way Python does for `str` literals
fn unescape(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            return Err("string ends with a lone backslash".to_string());
        };
        match escaped {
            '\n' => {}
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            '\\' | '\'' | '"' => out.push(escaped),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0'..='7' => {
                let mut digits = String::from(escaped);
                while digits.len() < 3 {
                    match chars.next_if(|d| ('0'..='7').contains(d)) {
                        Some(d) => digits.push(d),
                        None => break,
                    }
                }
                out.push(code_point(&digits, 8)?);
            }
            'x' | 'u' | 'U' => {
                let width = match escaped {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).filter_map(|_| chars.next()).collect();
                if digits.len() != width {
                    return Err(format!("truncated \\{} escape", escaped));
                }
                out.push(code_point(&digits, 16)?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn code_point(digits: &str, radix: u32) -> Result<char, String> {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid escape value '{}'", digits))
}
