//! Owns the backing file and file header; resolves page numbers to [`Page`]s
//! and exposes the schema table.
//!
//! The schema table itself is just an ordinary [`Table`] over the synthetic
//! `antdb_schema` definition, walked with the same row-decoding path a user
//! query would use, and its `CREATE TABLE` text for user tables is parsed
//! through the same SQL parser a user query goes through.

use tracing::{debug, trace};

use crate::backing_file::BackingFile;
use crate::error::{AntdbError, Result};
use crate::page::Page;
use crate::record::TextEncoding;
use crate::sql::ast::{ColumnDef, CreateTableStatement};
use crate::sql::parser;
use crate::table::Table;
use crate::value::Value;

const HEADER_SIZE: usize = 100;
const SCHEMA_ROOT_PAGE: u32 = 1;
const MAGIC: &[u8] = b"SQLite format 3\0";

/// One row of `antdb_schema`: a table, index, view, or trigger definition.
#[derive(Debug, Clone)]
pub struct SchemaObject {
    pub kind: String,
    pub name: String,
    pub table_name: String,
    pub root_page: u32,
    pub sql: String,
}

/// Header-derived facts reported by `.dbinfo`.
#[derive(Debug, Clone)]
pub struct DbInfo {
    pub page_size: u16,
    pub page_count: u32,
    pub table_count: usize,
    pub index_count: usize,
}

pub struct StorageEngine<F: BackingFile> {
    file: F,
    page_size: u16,
    page_count: u32,
    encoding: TextEncoding,
}

impl<F: BackingFile> StorageEngine<F> {
    pub fn new(mut file: F) -> Result<Self> {
        let mut header = [0u8; HEADER_SIZE];
        file.read_at(0, &mut header)?;

        if &header[0..16] != &MAGIC[..] {
            return Err(AntdbError::storage("missing SQLite file magic"));
        }

        let page_size = u16::from_be_bytes([header[16], header[17]]);
        let page_count = u32::from_be_bytes([header[28], header[29], header[30], header[31]]);
        let encoding_byte = u32::from_be_bytes([header[56], header[57], header[58], header[59]]);
        let encoding = TextEncoding::from_header_value(encoding_byte)?;

        debug!(page_size, page_count, "opened database file");

        Ok(StorageEngine {
            file,
            page_size,
            page_count,
            encoding,
        })
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Reads page `n` (1-based) and parses it.
    pub fn get_page(&mut self, n: u32) -> Result<Page> {
        if n == 0 || n > self.page_count {
            return Err(AntdbError::storage(format!("page number out of range: {n}")));
        }
        trace!(page = n, "fetching page");
        let start = (n as u64 - 1) * self.page_size as u64;
        let mut buf = vec![0u8; self.page_size as usize];
        self.file.read_at(start, &mut buf)?;
        Page::parse(buf, n, self.encoding)
    }

    /// The virtual table backing `antdb_schema`, rooted at page 1.
    pub fn schema_table(&self) -> Table {
        Table {
            name: "antdb_schema".to_string(),
            columns: vec![
                ColumnDef {
                    name: "type".to_string(),
                    modifiers: vec!["text".to_string()],
                },
                ColumnDef {
                    name: "name".to_string(),
                    modifiers: vec!["text".to_string()],
                },
                ColumnDef {
                    name: "tbl_name".to_string(),
                    modifiers: vec!["text".to_string()],
                },
                ColumnDef {
                    name: "rootpage".to_string(),
                    modifiers: vec!["integer".to_string()],
                },
                ColumnDef {
                    name: "sql".to_string(),
                    modifiers: vec!["text".to_string()],
                },
            ],
            root_page: SCHEMA_ROOT_PAGE,
        }
    }

    /// Every row of `antdb_schema`, projected into a [`SchemaObject`].
    pub fn objects(&mut self) -> Result<Vec<SchemaObject>> {
        let schema_table = self.schema_table();
        let rows = schema_table.rows(self)?;
        rows.into_iter()
            .map(|row| {
                let kind = expect_str(&row.values[0])?;
                let name = expect_str(&row.values[1])?;
                let table_name = expect_str(&row.values[2])?;
                let root_page = match &row.values[3] {
                    Value::Int(i) => *i as u32,
                    other => {
                        return Err(AntdbError::storage(format!(
                            "antdb_schema.rootpage is not an integer: {other:?}"
                        )))
                    }
                };
                let sql = match &row.values[4] {
                    Value::Str(s) => s.clone(),
                    Value::Null => String::new(),
                    other => {
                        return Err(AntdbError::storage(format!(
                            "antdb_schema.sql is not text: {other:?}"
                        )))
                    }
                };
                Ok(SchemaObject {
                    kind,
                    name,
                    table_name,
                    root_page,
                    sql,
                })
            })
            .collect()
    }

    pub fn tables(&mut self) -> Result<Vec<SchemaObject>> {
        Ok(self
            .objects()?
            .into_iter()
            .filter(|o| o.kind == "table")
            .collect())
    }

    pub fn indices(&mut self) -> Result<Vec<SchemaObject>> {
        Ok(self
            .objects()?
            .into_iter()
            .filter(|o| o.kind == "index")
            .collect())
    }

    /// Resolves a user table by name, parsing its `CREATE TABLE` statement
    /// through the same parser the query engine uses (schema self-bootstrap).
    pub fn table(&mut self, name: &str) -> Result<Table> {
        let object = self
            .objects()?
            .into_iter()
            .find(|o| o.kind == "table" && o.name == name)
            .ok_or_else(|| AntdbError::sql(format!("no such table: {name}")))?;

        let stmt = parser::parse_statement(&object.sql)?;
        let create: CreateTableStatement = match stmt {
            crate::sql::ast::Statement::CreateTable(c) => c,
            _ => {
                return Err(AntdbError::storage(format!(
                    "antdb_schema.sql for table {name} is not a CREATE TABLE statement"
                )))
            }
        };

        Ok(Table {
            name: create.name,
            columns: create.columns,
            root_page: object.root_page,
        })
    }

    pub fn info(&mut self) -> Result<DbInfo> {
        let table_count = self.tables()?.len();
        let index_count = self.indices()?.len();
        Ok(DbInfo {
            page_size: self.page_size,
            page_count: self.page_count,
            table_count,
            index_count,
        })
    }
}

fn expect_str(value: &Value) -> Result<String> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(AntdbError::storage(format!(
            "expected antdb_schema text column, found {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn varint_bytes(mut value: i64) -> Vec<u8> {
        if value < 0x80 {
            return vec![value as u8];
        }
        let mut chunks = Vec::new();
        while value > 0 {
            chunks.push((value & 0x7f) as u8);
            value >>= 7;
        }
        chunks.reverse();
        let mut bytes = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i + 1 == chunks.len() {
                bytes.push(*chunk);
            } else {
                bytes.push(*chunk | 0x80);
            }
        }
        bytes
    }

    fn record_payload(values: &[(u8, Vec<u8>)]) -> Vec<u8> {
        let mut header: Vec<u8> = values.iter().map(|(t, _)| *t).collect();
        let header_len = (header.len() + 1) as u8;
        let mut payload = vec![header_len];
        payload.append(&mut header);
        for (_, body) in values {
            payload.extend(body);
        }
        payload
    }

    fn text_serial(s: &str) -> (u8, Vec<u8>) {
        ((13 + 2 * s.len()) as u8, s.as_bytes().to_vec())
    }

    fn int_serial(v: i64) -> (u8, Vec<u8>) {
        (1, vec![v as u8])
    }

    /// Builds a single-page database whose page 1 schema table describes one
    /// table `apples(id integer primary key, name text)` rooted at page 2,
    /// which is empty (no rows needed for this test).
    fn build_single_table_db() -> Vec<u8> {
        const PAGE_SIZE: usize = 512;
        let mut buf = vec![0u8; PAGE_SIZE * 2];
        buf[0..16].copy_from_slice(MAGIC);
        buf[16..18].copy_from_slice(&(PAGE_SIZE as u16).to_be_bytes());
        buf[28..32].copy_from_slice(&2u32.to_be_bytes());
        buf[56..60].copy_from_slice(&1u32.to_be_bytes());

        buf[100] = 0x0d;

        let sql = "CREATE TABLE apples (id integer primary key, name text)";
        let payload = record_payload(&[
            text_serial("table"),
            text_serial("apples"),
            text_serial("apples"),
            int_serial(2),
            text_serial(sql),
        ]);
        let mut cell = varint_bytes(payload.len() as i64);
        cell.extend(varint_bytes(1));
        cell.extend(payload);

        let content_start = PAGE_SIZE - cell.len();
        buf[103..105].copy_from_slice(&1u16.to_be_bytes());
        buf[108..110].copy_from_slice(&(content_start as u16).to_be_bytes());
        buf[content_start..content_start + cell.len()].copy_from_slice(&cell);

        buf[PAGE_SIZE] = 0x0d;
        buf[PAGE_SIZE + 3..PAGE_SIZE + 5].copy_from_slice(&0u16.to_be_bytes());

        buf
    }

    #[test]
    fn parses_header_fields() {
        let buf = build_single_table_db();
        let engine = StorageEngine::new(Cursor::new(buf)).unwrap();
        assert_eq!(engine.page_size, 512);
        assert_eq!(engine.page_count, 2);
    }

    #[test]
    fn resolves_table_via_schema_bootstrap() {
        let buf = build_single_table_db();
        let mut engine = StorageEngine::new(Cursor::new(buf)).unwrap();
        let table = engine.table("apples").unwrap();
        assert_eq!(table.root_page, 2);
        assert_eq!(table.columns.len(), 2);
        assert!(table.columns[0].is_integer_primary_key());
    }

    #[test]
    fn missing_table_is_sql_error() {
        let buf = build_single_table_db();
        let mut engine = StorageEngine::new(Cursor::new(buf)).unwrap();
        assert!(engine.table("oranges").is_err());
    }

    #[test]
    fn info_reports_page_size_and_table_count() {
        let buf = build_single_table_db();
        let mut engine = StorageEngine::new(Cursor::new(buf)).unwrap();
        let info = engine.info().unwrap();
        assert_eq!(info.page_size, 512);
        assert_eq!(info.table_count, 1);
    }
}
