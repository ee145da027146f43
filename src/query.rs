//! Binds parsed SQL to the storage layer: resolves tables, chooses an index
//! lookup over a full scan when possible, and evaluates projections.

use tracing::debug;

use crate::backing_file::BackingFile;
use crate::error::{AntdbError, Result};
use crate::sql::ast::{Expr, SelectStatement, Statement};
use crate::storage::StorageEngine;
use crate::table::Row;
use crate::value::Value;

pub struct QueryEngine<'a, F: BackingFile> {
    storage: &'a mut StorageEngine<F>,
}

impl<'a, F: BackingFile> QueryEngine<'a, F> {
    pub fn new(storage: &'a mut StorageEngine<F>) -> Self {
        QueryEngine { storage }
    }

    /// Parses and evaluates a single SQL statement, returning projected rows.
    pub fn evaluate(&mut self, sql: &str) -> Result<Vec<Vec<Value>>> {
        match crate::sql::parse_statement(sql)? {
            Statement::Select(select) => self.evaluate_select(select),
            Statement::CreateTable(_) => {
                Err(AntdbError::sql("table creation not supported"))
            }
            Statement::CreateIndex(_) => {
                Err(AntdbError::sql("index creation not supported"))
            }
        }
    }

    fn evaluate_select(&mut self, select: SelectStatement) -> Result<Vec<Vec<Value>>> {
        let table = self.storage.table(&select.table)?;

        let rows = match &select.where_clause {
            None => table.rows(self.storage)?,
            Some(cond) => {
                let index = self
                    .storage
                    .indices()?
                    .into_iter()
                    .find(|i| i.table_name == select.table)
                    .and_then(|object| {
                        index_covers_column(&object.sql, &cond.column).then_some(object)
                    });

                match index {
                    Some(object) => {
                        debug!(table = %select.table, column = %cond.column, "using index-accelerated lookup");
                        let index = build_index(&object.name, &select.table, &cond.column, object.root_page);
                        let ids = index.find_matching_record_ids(
                            self.storage,
                            &cond.column,
                            &Value::Str(cond.value.clone()),
                        )?;
                        let mut matched = Vec::with_capacity(ids.len());
                        for id in ids {
                            let row = table.get(self.storage, id)?.ok_or_else(|| {
                                AntdbError::invariant(format!(
                                    "indexed row id {id} missing from table {}",
                                    select.table
                                ))
                            })?;
                            matched.push(row);
                        }
                        matched
                    }
                    None => {
                        debug!(table = %select.table, column = %cond.column, "falling back to full scan");
                        table
                            .rows(self.storage)?
                            .into_iter()
                            .filter(|row| {
                                row.get(&table.columns, &cond.column)
                                    .map(|v| v == &Value::Str(cond.value.clone()))
                                    .unwrap_or(false)
                            })
                            .collect()
                    }
                }
            }
        };

        project(&select.columns, &table.columns, &rows)
    }
}

/// Heuristically checks whether an index's own `CREATE INDEX` SQL text names
/// `column`. `StorageEngine::table`-style bootstrap through the parser is
/// used instead of a substring match whenever a parse succeeds.
fn index_covers_column(sql: &str, column: &str) -> bool {
    match crate::sql::parse_statement(sql) {
        Ok(Statement::CreateIndex(create)) => create.column == column,
        _ => false,
    }
}

fn build_index(name: &str, table: &str, column: &str, root_page: u32) -> crate::index::Index {
    crate::index::Index {
        name: name.to_string(),
        table: table.to_string(),
        column: column.to_string(),
        root_page,
    }
}

/// Evaluates the SELECT's column expressions over the matched row set.
fn project(
    columns: &[Expr],
    column_defs: &[crate::sql::ast::ColumnDef],
    rows: &[Row],
) -> Result<Vec<Vec<Value>>> {
    if columns.iter().any(is_aggregate_call) {
        let mut out = Vec::with_capacity(columns.len());
        for expr in columns {
            out.push(evaluate_aggregate(expr, rows)?);
        }
        return Ok(vec![out]);
    }

    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|expr| evaluate_scalar(expr, column_defs, row))
                .collect::<Result<Vec<Value>>>()
        })
        .collect()
}

fn is_aggregate_call(expr: &Expr) -> bool {
    matches!(expr, Expr::Call(name, _) if name == "count")
}

fn evaluate_aggregate(expr: &Expr, rows: &[Row]) -> Result<Value> {
    match expr {
        Expr::Call(name, _) if name == "count" => Ok(Value::Int(rows.len() as i64)),
        _ if rows.is_empty() => Ok(Value::Null),
        other => Err(AntdbError::sql(format!(
            "{other:?} cannot be combined with an aggregate in the same projection"
        ))),
    }
}

fn evaluate_scalar(
    expr: &Expr,
    column_defs: &[crate::sql::ast::ColumnDef],
    row: &Row,
) -> Result<Value> {
    match expr {
        Expr::Column(name) => row
            .get(column_defs, name)
            .cloned()
            .ok_or_else(|| AntdbError::sql(format!("no such column: {name}"))),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Star => Err(AntdbError::sql("'*' is only supported in COUNT(*)")),
        Expr::Call(name, _) => Err(AntdbError::sql(format!("unsupported function: {name}"))),
    }
}
