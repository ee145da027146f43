//! Schema-aware table B-tree walker.
//!
//! `rows` does a full depth-first scan; `get` instead uses
//! `Pointer::contains` at each interior page to pick the single child range
//! holding the target row id, so a point lookup need not visit the whole
//! tree.

use tracing::trace;

use crate::backing_file::BackingFile;
use crate::error::{AntdbError, Result};
use crate::page::Page;
use crate::sql::ast::ColumnDef;
use crate::storage::StorageEngine;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub row_id: i64,
    pub values: Vec<Value>,
}

impl Row {
    /// Looks up a column by name (case-sensitive, matching declared casing).
    pub fn get(&self, columns: &[ColumnDef], name: &str) -> Option<&Value> {
        columns
            .iter()
            .position(|c| c.name == name)
            .map(|i| &self.values[i])
    }
}

pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub root_page: u32,
}

impl Table {
    /// Decodes a leaf cell's record into a `Row`, aliasing the `INTEGER
    /// PRIMARY KEY` column (if any) to the cell's row id.
    fn decode_row(&self, row_id: i64, record_values: Vec<Value>) -> Row {
        let values = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                if col.is_integer_primary_key() {
                    Value::Int(row_id)
                } else {
                    record_values.get(i).cloned().unwrap_or(Value::Null)
                }
            })
            .collect();
        Row { row_id, values }
    }

    /// Depth-first, left-to-right traversal yielding every row.
    pub fn rows<F: BackingFile>(&self, engine: &mut StorageEngine<F>) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        self.collect_rows(engine, self.root_page, &mut rows)?;
        Ok(rows)
    }

    fn collect_rows<F: BackingFile>(
        &self,
        engine: &mut StorageEngine<F>,
        page_number: u32,
        rows: &mut Vec<Row>,
    ) -> Result<()> {
        match engine.get_page(page_number)? {
            Page::TableLeaf(leaf) => {
                for cell in leaf.cells()? {
                    rows.push(self.decode_row(cell.row_id, cell.record.values));
                }
                Ok(())
            }
            Page::TableInterior(interior) => {
                for pointer in interior.pointers()? {
                    self.collect_rows(engine, pointer.child, rows)?;
                }
                Ok(())
            }
            _ => Err(AntdbError::storage(format!(
                "table {} root page {page_number} is not a table page",
                self.name
            ))),
        }
    }

    /// Point lookup by row id: descend via the unique matching pointer at
    /// each interior page.
    pub fn get<F: BackingFile>(
        &self,
        engine: &mut StorageEngine<F>,
        row_id: i64,
    ) -> Result<Option<Row>> {
        self.get_from(engine, self.root_page, row_id)
    }

    fn get_from<F: BackingFile>(
        &self,
        engine: &mut StorageEngine<F>,
        page_number: u32,
        row_id: i64,
    ) -> Result<Option<Row>> {
        match engine.get_page(page_number)? {
            Page::TableLeaf(leaf) => {
                for cell in leaf.cells()? {
                    if cell.row_id == row_id {
                        return Ok(Some(self.decode_row(cell.row_id, cell.record.values)));
                    }
                }
                Ok(None)
            }
            Page::TableInterior(interior) => {
                let pointer = interior
                    .pointers()?
                    .into_iter()
                    .find(|p| p.contains(&row_id));
                match pointer {
                    Some(p) => {
                        trace!(child = p.child, row_id, "descending table interior");
                        self.get_from(engine, p.child, row_id)
                    }
                    None => Ok(None),
                }
            }
            _ => Err(AntdbError::storage(format!(
                "table {} root page {page_number} is not a table page",
                self.name
            ))),
        }
    }
}
