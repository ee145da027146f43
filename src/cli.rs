//! Command-line argument parsing.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "antdb", about = "A read-only query engine over the SQLite file format")]
pub struct Cli {
    /// Path to the SQLite database file.
    pub db_path: String,

    /// A dot-command (`.dbinfo`, `.tables`, `.schema`, `.indices`) or a SQL statement.
    pub command: String,
}
