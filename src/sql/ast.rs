//! AST node types produced by the [`super::parser`] and consumed by the
//! query engine.

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    CreateTable(CreateTableStatement),
    CreateIndex(CreateIndexStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub columns: Vec<Expr>,
    pub table: String,
    pub where_clause: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),
    Str(String),
    Star,
    /// A lowercased function name applied to a single argument expression,
    /// e.g. `count(*)`.
    Call(String, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Lower-cased type/constraint words following the column name, e.g.
    /// `["integer", "primary", "key"]`.
    pub modifiers: Vec<String>,
}

impl ColumnDef {
    pub fn is_integer_primary_key(&self) -> bool {
        self.modifiers.iter().any(|m| m == "integer")
            && self
                .modifiers
                .windows(2)
                .any(|w| w[0] == "primary" && w[1] == "key")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    pub name: String,
    pub table: String,
    pub column: String,
}
