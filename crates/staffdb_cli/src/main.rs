//! staffdb entry point.
//!
//! # Responsibility
//! - Open storage, reset the schema, seed, run the fixed query sequence.
//! - Print each step's report as soon as it runs, then serve HTTP on the
//!   configured port.
//!
//! # Invariants
//! - Any failure before the listener starts aborts the remaining stages
//!   and exits non-zero; the listener never starts after a failure.
//! - Storage work finishes before the async runtime is created.

mod args;
mod report;
mod server;

use anyhow::Context;
use args::Args;
use clap::Parser;
use log::{error, info};
use report::OutputFormat;
use staffdb_core::{
    default_log_level, init_logging, initialize_schema, open_db, open_db_in_memory, seed,
    QueryRunner, QueryStep, Relations,
};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging(&level, args.log_dir.as_deref()) {
        eprintln!("staffdb: {err}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=run module=cli status=error error={err:#}");
            eprintln!("staffdb: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    seed_and_query(args, format)?;

    if args.no_serve {
        info!("event=run module=cli status=ok serve=false");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(server::serve(args.port))
}

fn seed_and_query(args: &Args, format: OutputFormat) -> anyhow::Result<()> {
    let conn = match &args.db {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .context("database is unreachable")?;

    initialize_schema(&conn).context("schema initialization failed")?;
    let relations = Relations::try_new(&conn)?;
    let summary = seed(&relations).context("seeding failed")?;

    let mut stdout = io::stdout().lock();
    report::write_seed_summary(&mut stdout, &summary, format)?;
    run_steps(&QueryRunner::new(&relations), &mut stdout, format)
}

/// Runs the sequence, writing each report before the next step starts.
fn run_steps<W: Write>(
    runner: &QueryRunner<'_, '_>,
    out: &mut W,
    format: OutputFormat,
) -> anyhow::Result<()> {
    for step in QueryStep::ALL {
        let report = runner.run(step).context("query sequence failed")?;
        report::write_report(out, &report, format)?;
    }
    Ok(())
}
