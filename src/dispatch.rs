//! Maps a parsed command to the storage/query layers and formats output.
//!
//! Dot-commands (`.dbinfo`, `.tables`, `.schema`, `.indices`) are handled
//! directly against the storage engine; anything else is treated as a SQL
//! statement and falls through to [`QueryEngine`].

use std::fs::File;

use tracing::info;

use crate::backing_file;
use crate::cli::Cli;
use crate::error::Result;
use crate::query::QueryEngine;
use crate::storage::StorageEngine;
use crate::value::Value;

pub fn run(cli: &Cli) -> Result<()> {
    let file: File = backing_file::open(&cli.db_path)?;
    let mut engine = StorageEngine::new(file)?;

    match cli.command.as_str() {
        ".dbinfo" => dbinfo(&mut engine),
        ".tables" => tables(&mut engine),
        ".schema" => schema(&mut engine),
        ".indices" => indices(&mut engine),
        sql => select(&mut engine, sql),
    }
}

fn dbinfo<F: backing_file::BackingFile>(engine: &mut StorageEngine<F>) -> Result<()> {
    let info = engine.info()?;
    println!("database page size: {}", info.page_size);
    println!("number of tables: {}", info.table_count);
    println!("number of indexes: {}", info.index_count);
    info!(page_size = info.page_size, tables = info.table_count, "dbinfo");
    Ok(())
}

fn tables<F: backing_file::BackingFile>(engine: &mut StorageEngine<F>) -> Result<()> {
    let names: Vec<String> = engine
        .tables()?
        .into_iter()
        .map(|t| t.name)
        .filter(|name| !name.starts_with("sqlite_"))
        .collect();
    println!("{}", names.join(" "));
    Ok(())
}

fn schema<F: backing_file::BackingFile>(engine: &mut StorageEngine<F>) -> Result<()> {
    let objects = engine.objects()?;
    for (i, object) in objects.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("type: '{}'", object.kind);
        println!("name: '{}'", object.name);
        println!("tbl_name: '{}'", object.table_name);
        println!("rootpage: '{}'", object.root_page);
        println!("sql: '{}'", object.sql);
    }
    Ok(())
}

fn indices<F: backing_file::BackingFile>(engine: &mut StorageEngine<F>) -> Result<()> {
    for object in engine.indices()? {
        println!("index: {}", object.name);
        println!("table: {}", object.table_name);
        let fields = match crate::sql::parse_statement(&object.sql) {
            Ok(crate::sql::Statement::CreateIndex(create)) => create.column,
            _ => object.sql.clone(),
        };
        println!("fields: {fields}");
    }
    Ok(())
}

fn select<F: backing_file::BackingFile>(engine: &mut StorageEngine<F>, sql: &str) -> Result<()> {
    let mut query = QueryEngine::new(engine);
    let rows = query.evaluate(sql)?;
    for row in rows {
        let formatted: Vec<String> = row.iter().map(format_value).collect();
        println!("{}", formatted.join("|"));
    }
    Ok(())
}

fn format_value(value: &Value) -> String {
    value.to_string()
}
