//! Hand-rolled SQL front end: scanner -> parser -> AST.

pub mod ast;
pub mod parser;
pub mod scanner;

pub use ast::{
    ColumnDef, Condition, CreateIndexStatement, CreateTableStatement, Expr, SelectStatement,
    Statement,
};
pub use parser::parse_statement;
