//! sqlstore-dialect CLI
//!
//! Prints the SQL a dialect generates for schema definitions, and runs the
//! administrative operations against a SQLite database.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sqlstore_dialect::prelude::*;

/// SQL dialects for a multi-engine schema migrator.
#[derive(Parser)]
#[command(name = "sqlstore-dialect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database engine (mysql, oceanbase, postgres, sqlite3, dm).
    #[arg(short, long, env = "SQLSTORE_ENGINE")]
    engine: Option<String>,

    /// Default schema of the connection.
    #[arg(short, long, env = "SQLSTORE_SCHEMA")]
    schema: Option<String>,

    /// JSON dialect configuration; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print CREATE TABLE for a JSON table definition.
    CreateTable {
        /// Table definition file.
        table: PathBuf,
    },

    /// Print the bulk column modification for a JSON table definition.
    UpdateTable {
        /// Table definition file.
        table: PathBuf,
    },

    /// Print CREATE INDEX for a JSON index definition.
    CreateIndex {
        /// Table the index belongs to.
        table: String,
        /// Index definition file.
        index: PathBuf,
    },

    /// Print DROP INDEX for a JSON index definition.
    DropIndex {
        /// Table the index belongs to.
        table: String,
        /// Index definition file.
        index: PathBuf,
    },

    /// Print an insert-or-update statement.
    Upsert {
        /// Target table.
        table: String,

        /// Key columns.
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Inserted and updated columns.
        #[arg(short, long, value_delimiter = ',', required = true)]
        update: Vec<String>,
    },

    /// Print the catalog query checking that an index exists.
    CheckIndex {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
    },

    /// Print the catalog query checking that a column exists.
    CheckColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Drop every table of a SQLite database.
    CleanDb {
        /// Database URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },

    /// Empty every table of a SQLite database.
    Truncate {
        /// Database URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },
}

fn load_config(cli: &Cli) -> Result<DialectConfig> {
    let mut config = match (&cli.config, &cli.engine) {
        (Some(path), _) => DialectConfig::from_json_file(path)?,
        (None, Some(engine)) => DialectConfig::new(engine.parse()?),
        (None, None) => {
            return Err(DialectError::Config(
                "no engine configured, pass --engine or --config".to_string(),
            ));
        }
    };
    if let Some(engine) = &cli.engine {
        config.engine = engine.parse()?;
    }
    if cli.schema.is_some() {
        config.schema.clone_from(&cli.schema);
    }
    Ok(config)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn read_table(path: &Path) -> Result<Table> {
    let mut table: Table = read_json(path)?;
    table.sync_primary_keys();
    Ok(table)
}

fn print_query(query: Option<Query>, engine: EngineKind) {
    match query {
        Some((sql, args)) => {
            println!("{sql};");
            for (i, arg) in args.iter().enumerate() {
                match arg {
                    SqlArg::Text(value) => println!("-- ${}: {value:?}", i + 1),
                    SqlArg::Int(value) => println!("-- ${}: {value}", i + 1),
                }
            }
        }
        None => println!("-- no catalog check for {engine}"),
    }
}

fn require_sqlite(config: &DialectConfig, operation: &str) -> Result<()> {
    if config.engine == EngineKind::Sqlite {
        return Ok(());
    }
    Err(DialectError::UnsupportedEngine {
        engine: config.engine.to_string(),
        operation: operation.to_string(),
    })
}

async fn connect(database: &str) -> anyhow::Result<SqliteSession> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(database)
        .await?;
    Ok(SqliteSession::new(pool))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli)?;
    let dialect = new_dialect(&config);

    match cli.command {
        Commands::CreateTable { table } => {
            let table = read_table(&table)?;
            println!("{}", dialect.create_table_sql(&table));
        }

        Commands::UpdateTable { table } => {
            let table = read_table(&table)?;
            println!("{}", dialect.update_table_sql(&table.name, &table.columns));
        }

        Commands::CreateIndex { table, index } => {
            let index: Index = read_json(&index)?;
            println!("{}", dialect.create_index_sql(&table, &index));
        }

        Commands::DropIndex { table, index } => {
            let index: Index = read_json(&index)?;
            println!("{};", dialect.drop_index_sql(&table, &index));
        }

        Commands::Upsert {
            table,
            keys,
            update,
        } => {
            println!("{};", dialect.upsert_sql(&table, &keys, &update));
        }

        Commands::CheckIndex { table, index } => {
            print_query(dialect.index_check_sql(&table, &index), config.engine);
        }

        Commands::CheckColumn { table, column } => {
            print_query(dialect.column_check_sql(&table, &column), config.engine);
        }

        Commands::CleanDb { database } => {
            require_sqlite(&config, "clean-db")?;
            let session = connect(&database).await?;
            let dropped = clean_db(dialect.as_ref(), &session).await?;
            info!("Dropped {} tables.", dropped);
        }

        Commands::Truncate { database } => {
            require_sqlite(&config, "truncate")?;
            let session = connect(&database).await?;
            let truncated = truncate_db_tables(dialect.as_ref(), &session).await?;
            info!("Truncated {} tables.", truncated);
        }
    }

    Ok(())
}
