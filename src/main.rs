//! csvtable - load, prune and rewrite CSV tables
//!
//! Loads a CSV file, reports its shape and optionally dumps or rewrites it.

use clap::Parser;
use csvtable::error::to_exit_code;
use csvtable::{LoadFlags, StaticTable};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "csvtable")]
#[command(about = "Load, prune and rewrite CSV tables", long_about = None)]
struct Args {
    /// CSV file to load
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write the loaded table to this path
    #[arg(short, long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    force: bool,

    /// Drop columns with an empty header name
    #[arg(long)]
    prune_columns: bool,

    /// Keep rows whose fields are all empty
    #[arg(long)]
    keep_empty: bool,

    /// Keep rows starting with '#'
    #[arg(long)]
    keep_comments: bool,

    /// The file has no header; name its single column "name"
    #[arg(long)]
    headerless: bool,

    /// Dump the table with row indexes
    #[arg(short, long)]
    dump: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_flags(&self) -> LoadFlags {
        let mut flags = LoadFlags::DEFAULT;
        if self.keep_empty {
            flags.remove(LoadFlags::PRUNE_EMPTY_ROWS);
        }
        if self.keep_comments {
            flags.remove(LoadFlags::PRUNE_COMMENT_ROWS);
        }
        if self.prune_columns {
            flags |= LoadFlags::PRUNE_EMPTY_COLUMNS;
        }
        if self.headerless {
            flags |= LoadFlags::HEADERLESS_SINGLE_FIELD;
        }
        flags
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let flags = args.load_flags();
    tracing::debug!(?flags, file = %args.file.display(), "loading");

    let start = Instant::now();
    let table = match StaticTable::open(&args.file, flags) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Could not load the file {}: {}", args.file.display(), e);
            std::process::exit(to_exit_code(e.kind()));
        }
    };
    let elapsed = start.elapsed();

    println!("fields : {}", table.field_count());
    println!("rows   : {}", table.row_count());
    if args.verbose {
        println!("loaded in {:.6}s", elapsed.as_secs_f64());
    }

    if args.dump {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        if let Err(e) = table.print_table(&mut lock, true).and_then(|()| lock.flush()) {
            eprintln!("Could not dump the table: {}", e);
            std::process::exit(1);
        }
    }

    if let Some(out) = &args.out {
        if let Err(e) = table.write_file(out, args.force) {
            eprintln!("Could not write {}: {}", out.display(), e);
            std::process::exit(to_exit_code(e.kind()));
        }
        if args.verbose {
            println!("wrote {}", out.display());
        }
    }
}
