use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use xer_schedule::{FlagDecoding, LoadSummary, LoaderConfig, load_schedule_from_path, logging};

/// Load a Primavera XER export and report what was decoded from it.
#[derive(Debug, Parser)]
#[command(name = "xer-check", version)]
struct Cli {
    /// XER file to load.
    file: PathBuf,

    /// JSON loader configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decode flag columns as Y/N instead of "any non-empty value".
    #[arg(long)]
    strict_flags: bool,

    /// Fail on calendar or WBS ids that are not in the file.
    #[arg(long)]
    strict_references: bool,

    /// Build tasks on the current thread only.
    #[arg(long)]
    sequential: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    logging::init("warn");
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => LoaderConfig::from_json_file(path)?,
        None => LoaderConfig::default(),
    };
    if cli.strict_flags {
        config.decode.flags = FlagDecoding::Strict;
    }
    if cli.strict_references {
        config.decode.strict_references = true;
    }
    if cli.sequential {
        config.parallel_tasks = false;
    }

    let schedule = load_schedule_from_path(&cli.file, &config)?;
    let summary = schedule.summary();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &LoadSummary) {
    println!(
        "XER version: {}",
        summary.xer_version.as_deref().unwrap_or("unknown")
    );
    println!("calendars: {}", summary.calendars);
    println!("WBS nodes: {}", summary.wbs_nodes);
    println!("tasks: {}", summary.tasks);
    println!("unresolved calendar references: {}", summary.unresolved_calendars);
    println!("unresolved WBS references: {}", summary.unresolved_wbs);
    if !summary.other_tables.is_empty() {
        println!("other tables: {}", summary.other_tables.join(", "));
    }
}
