//! FileTable CLI
//!
//! Command-line interface over a file-backed FileTable store.

use clap::{Parser, Subcommand};
use filetable::{Config, Engine, Record, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// FileTable CLI
#[derive(Parser, Debug)]
#[command(name = "filetable")]
#[command(about = "Paged table store with bitmap indexes and page recovery")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./filetable_data")]
    data_dir: String,

    /// Records per page (used when creating tables)
    #[arg(short, long, default_value = "200")]
    page_capacity: usize,

    /// fsync every stored blob
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create (or replace) a table
    Create {
        table: String,
        /// Column names, comma separated
        #[arg(value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },

    /// Insert a record
    Insert {
        table: String,
        /// Field values, comma separated
        #[arg(value_delimiter = ',', required = true)]
        fields: Vec<String>,
    },

    /// Print every record
    Select { table: String },

    /// Print the record at (page, offset)
    SelectAt {
        table: String,
        page: usize,
        offset: usize,
    },

    /// Linear scan with column=value conditions
    SelectWhere {
        table: String,
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
        #[arg(short, long, value_delimiter = ',', required = true)]
        values: Vec<String>,
    },

    /// Build a bitmap index on a column
    Index { table: String, column: String },

    /// Select with column=value conditions through available indexes
    SelectIndex {
        table: String,
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
        #[arg(short, long, value_delimiter = ',', required = true)]
        values: Vec<String>,
    },

    /// Print the bit vector of a value
    Bits {
        table: String,
        column: String,
        value: String,
    },

    /// List records whose page snapshot is missing
    Validate { table: String },

    /// Validate, then recover the missing records
    Recover { table: String },

    /// Rewrite one page snapshot from the table
    RecoverPage { table: String, page: usize },

    /// Print the table trace
    Trace {
        table: String,
        /// Only the most recent entry
        #[arg(long)]
        last: bool,
    },

    /// Summarize persisted keys
    StoreTrace,

    /// Delete all persisted state
    Reset,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,filetable=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .page_capacity(args.page_capacity)
        .sync_strategy(if args.sync {
            SyncStrategy::EveryWrite
        } else {
            SyncStrategy::OnDemand
        })
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&engine, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(engine: &Engine, command: Commands) -> filetable::Result<()> {
    match command {
        Commands::Create { table, columns } => engine.create_table(&table, columns.as_slice())?,
        Commands::Insert { table, fields } => engine.insert(&table, fields.as_slice())?,
        Commands::Select { table } => print_records(&engine.select_all(&table)?),
        Commands::SelectAt { table, page, offset } => {
            print_records(&engine.select_at(&table, page, offset)?)
        }
        Commands::SelectWhere { table, columns, values } => {
            print_records(&engine.select_where(&table, columns.as_slice(), values.as_slice())?)
        }
        Commands::Index { table, column } => engine.create_bitmap_index(&table, &column)?,
        Commands::SelectIndex { table, columns, values } => {
            let selection = engine.select_indexed(&table, columns.as_slice(), values.as_slice())?;
            println!("strategy: {}", selection.strategy);
            print_records(&selection.records);
        }
        Commands::Bits { table, column, value } => {
            println!("{}", engine.value_bits(&table, &column, &value)?)
        }
        Commands::Validate { table } => print_records(&engine.validate_records(&table)?),
        Commands::Recover { table } => {
            let missing = engine.validate_records(&table)?;
            engine.recover_records(&table, &missing)?;
            println!("{}", engine.last_trace(&table)?);
        }
        Commands::RecoverPage { table, page } => engine.recover_page(&table, page)?,
        Commands::Trace { table, last } => {
            if last {
                println!("{}", engine.last_trace(&table)?);
            } else {
                println!("{}", engine.full_trace(&table)?);
            }
        }
        Commands::StoreTrace => println!("{}", engine.store_trace()?),
        Commands::Reset => engine.reset()?,
    }
    Ok(())
}

fn print_records(records: &[Record]) {
    for record in records {
        println!("{}", record.join(" "));
    }
}
