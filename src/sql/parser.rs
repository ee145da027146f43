//! Recursive-descent parser producing the AST in [`super::ast`].
//!
//! Drives the grammar with a token cursor over the [`Scanner`] plus
//! `peek`/`expect` helpers, covering `SELECT` (with an optional `WHERE`
//! clause and function-call columns), `CREATE TABLE`, and `CREATE INDEX`.

use super::ast::*;
use super::scanner::{Scanner, Token};
use crate::error::{AntdbError, Result};

pub struct Parser {
    scanner: Scanner,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Parser {
            scanner: Scanner::new(input),
        }
    }

    pub fn parse_statement(&mut self) -> Result<Statement> {
        let stmt = match self.scanner.peek()? {
            Token::Select => Statement::Select(self.parse_select()?),
            Token::Create => self.parse_create()?,
            other => {
                return Err(AntdbError::sql(format!(
                    "expected a statement, found {other:?}"
                )))
            }
        };
        self.expect(Token::Eof)?;
        Ok(stmt)
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let found = self.scanner.next()?;
        if found == expected {
            Ok(())
        } else {
            Err(AntdbError::sql(format!(
                "expected {expected:?}, found {found:?}"
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.scanner.next()? {
            Token::Ident(name) => Ok(name),
            other => Err(AntdbError::sql(format!(
                "expected an identifier, found {other:?}"
            ))),
        }
    }

    // Select := SELECT exprs FROM IDENT (WHERE cond)? EOF
    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(Token::Select)?;
        let columns = self.parse_expr_list()?;
        self.expect(Token::From)?;
        let table = self.expect_ident()?;

        let where_clause = if self.scanner.peek()? == Token::Where {
            self.scanner.next()?;
            Some(self.parse_condition()?)
        } else {
            None
        };

        Ok(SelectStatement {
            columns,
            table,
            where_clause,
        })
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.scanner.peek()? == Token::Comma {
            self.scanner.next()?;
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    // Expr := STR | STAR | IDENT ( "(" Expr ")" )?
    fn parse_expr(&mut self) -> Result<Expr> {
        match self.scanner.next()? {
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Star => Ok(Expr::Star),
            Token::Ident(name) => {
                if self.scanner.peek()? == Token::LParen {
                    self.scanner.next()?;
                    let arg = self.parse_expr()?;
                    self.expect(Token::RParen)?;
                    Ok(Expr::Call(name.to_ascii_lowercase(), Box::new(arg)))
                } else {
                    Ok(Expr::Column(name))
                }
            }
            other => Err(AntdbError::sql(format!(
                "expected an expression, found {other:?}"
            ))),
        }
    }

    // Cond := col = literal
    fn parse_condition(&mut self) -> Result<Condition> {
        let column = self.expect_ident()?;
        self.expect(Token::Eq)?;
        let value = match self.scanner.next()? {
            Token::Str(s) => s,
            other => {
                return Err(AntdbError::sql(format!(
                    "expected a string literal, found {other:?}"
                )))
            }
        };
        Ok(Condition { column, value })
    }

    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(Token::Create)?;
        match self.scanner.peek()? {
            Token::Table => {
                self.scanner.next()?;
                Ok(Statement::CreateTable(self.parse_create_table()?))
            }
            Token::Index => {
                self.scanner.next()?;
                Ok(Statement::CreateIndex(self.parse_create_index()?))
            }
            other => Err(AntdbError::sql(format!(
                "expected TABLE or INDEX, found {other:?}"
            ))),
        }
    }

    // CreateTable := CREATE TABLE IDENT ( ColumnDef (, ColumnDef)* ) EOF
    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        let name = self.expect_ident()?;
        self.expect(Token::LParen)?;
        let mut columns = vec![self.parse_column_def()?];
        while self.scanner.peek()? == Token::Comma {
            self.scanner.next()?;
            columns.push(self.parse_column_def()?);
        }
        self.expect(Token::RParen)?;
        Ok(CreateTableStatement { name, columns })
    }

    // ColumnDef := IDENT (IDENT)*
    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_ident()?;
        let mut modifiers = Vec::new();
        while let Token::Ident(word) = self.scanner.peek()? {
            self.scanner.next()?;
            modifiers.push(word.to_ascii_lowercase());
        }
        Ok(ColumnDef { name, modifiers })
    }

    // CreateIndex := CREATE INDEX IDENT ON IDENT ( IDENT ) EOF
    fn parse_create_index(&mut self) -> Result<CreateIndexStatement> {
        let name = self.expect_ident()?;
        self.expect(Token::On)?;
        let table = self.expect_ident()?;
        self.expect(Token::LParen)?;
        let column = self.expect_ident()?;
        self.expect(Token::RParen)?;
        Ok(CreateIndexStatement {
            name,
            table,
            column,
        })
    }
}

/// Convenience entry point: parses a single statement from `sql`.
pub fn parse_statement(sql: &str) -> Result<Statement> {
    Parser::new(sql).parse_statement()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_star() {
        let stmt = parse_statement("SELECT * FROM apples").unwrap();
        assert_eq!(
            stmt,
            Statement::Select(SelectStatement {
                columns: vec![Expr::Star],
                table: "apples".to_string(),
                where_clause: None,
            })
        );
    }

    #[test]
    fn parses_select_with_where() {
        let stmt = parse_statement("select name, color from apples where color = 'Yellow'").unwrap();
        assert_eq!(
            stmt,
            Statement::Select(SelectStatement {
                columns: vec![Expr::Column("name".to_string()), Expr::Column("color".to_string())],
                table: "apples".to_string(),
                where_clause: Some(Condition {
                    column: "color".to_string(),
                    value: "Yellow".to_string(),
                }),
            })
        );
    }

    #[test]
    fn parses_count_star() {
        let stmt = parse_statement("SELECT COUNT(*) FROM oranges").unwrap();
        assert_eq!(
            stmt,
            Statement::Select(SelectStatement {
                columns: vec![Expr::Call("count".to_string(), Box::new(Expr::Star))],
                table: "oranges".to_string(),
                where_clause: None,
            })
        );
    }

    #[test]
    fn parses_create_table() {
        let stmt = parse_statement(
            "CREATE TABLE companies (id integer primary key, name text, locality text)",
        )
        .unwrap();
        let Statement::CreateTable(ct) = stmt else {
            panic!("expected CreateTable");
        };
        assert_eq!(ct.name, "companies");
        assert_eq!(ct.columns.len(), 3);
        assert!(ct.columns[0].is_integer_primary_key());
        assert!(!ct.columns[1].is_integer_primary_key());
    }

    #[test]
    fn parses_create_index() {
        let stmt = parse_statement("CREATE INDEX idx_locality ON companies (locality)").unwrap();
        assert_eq!(
            stmt,
            Statement::CreateIndex(CreateIndexStatement {
                name: "idx_locality".to_string(),
                table: "companies".to_string(),
                column: "locality".to_string(),
            })
        );
    }

    #[test]
    fn quoted_identifier_column_roundtrips() {
        let stmt = parse_statement("SELECT \"size range\" FROM apples").unwrap();
        assert_eq!(
            stmt,
            Statement::Select(SelectStatement {
                columns: vec![Expr::Column("size range".to_string())],
                table: "apples".to_string(),
                where_clause: None,
            })
        );
    }

    #[test]
    fn trailing_garbage_is_an_error() {
        assert!(parse_statement("SELECT * FROM apples extra").is_err());
    }

    #[test]
    fn missing_from_is_an_error() {
        assert!(parse_statement("SELECT *").is_err());
    }
}
