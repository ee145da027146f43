//! Schema-aware index B-tree walker.
//!
//! Descends the index's B-tree pruning subtrees whose key range cannot
//! contain the sought value, collecting row ids from matching cells at
//! every level (index interior cells store keys too, not just child
//! pointers).

use std::cmp::Ordering;

use tracing::trace;

use crate::backing_file::BackingFile;
use crate::error::{AntdbError, Result};
use crate::page::{index_key_row_id, Page};
use crate::record::Record;
use crate::storage::StorageEngine;
use crate::value::Value;

pub struct Index {
    pub name: String,
    pub table: String,
    pub column: String,
    pub root_page: u32,
}

impl Index {
    /// Returns the row ids of every indexed record whose first key
    /// component equals `value`. Precondition: `column == self.column`.
    pub fn find_matching_record_ids<F: BackingFile>(
        &self,
        engine: &mut StorageEngine<F>,
        column: &str,
        value: &Value,
    ) -> Result<Vec<i64>> {
        if column != self.column {
            return Err(AntdbError::sql(format!(
                "index {} does not cover column {column}",
                self.name
            )));
        }

        let mut matches = Vec::new();
        self.search(engine, self.root_page, value, &mut matches)?;

        matches.sort_unstable();
        matches.dedup();
        Ok(matches)
    }

    fn search<F: BackingFile>(
        &self,
        engine: &mut StorageEngine<F>,
        page_number: u32,
        value: &Value,
        matches: &mut Vec<i64>,
    ) -> Result<()> {
        match engine.get_page(page_number)? {
            Page::IndexLeaf(leaf) => {
                for cell in leaf.cells()? {
                    if key_matches(&cell.key.values, value)? {
                        matches.push(index_key_row_id(&cell.key)?);
                    }
                }
                Ok(())
            }
            Page::IndexInterior(interior) => {
                let cells = interior.cells()?;
                let mut left: Option<Value> = None;
                for cell in &cells {
                    if key_matches(&cell.key.values, value)? {
                        matches.push(index_key_row_id(&cell.key)?);
                    }
                    let right = first_component(&cell.key)?;
                    if range_could_contain(left.as_ref(), Some(&right), value)? {
                        trace!(child = cell.child, "descending index interior");
                        self.search(engine, cell.child, value, matches)?;
                    }
                    left = Some(right);
                }
                if range_could_contain(left.as_ref(), None, value)? {
                    self.search(engine, interior.right_child(), value, matches)?;
                }
                Ok(())
            }
            _ => Err(AntdbError::storage(format!(
                "index {} root page {page_number} is not an index page",
                self.name
            ))),
        }
    }
}

/// Tests whether an index key's first component equals `value`.
fn key_matches(key_values: &[Value], value: &Value) -> Result<bool> {
    let first = key_values
        .first()
        .ok_or_else(|| AntdbError::storage("index key has no components"))?;
    Ok(first.compare(value)? == Ordering::Equal)
}

/// The first indexed component of a key record, used as a pointer endpoint.
fn first_component(key: &Record) -> Result<Value> {
    key.values
        .first()
        .cloned()
        .ok_or_else(|| AntdbError::storage("index key has no components"))
}

/// Whether `value` could fall within `left ..= right`, treating `None` as
/// unbounded on that side.
fn range_could_contain(left: Option<&Value>, right: Option<&Value>, value: &Value) -> Result<bool> {
    let left_ok = match left {
        None => true,
        Some(l) => l.compare(value)? != Ordering::Greater,
    };
    let right_ok = match right {
        None => true,
        Some(r) => value.compare(r)? != Ordering::Greater,
    };
    Ok(left_ok && right_ok)
}
