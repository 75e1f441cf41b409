use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use mnu_ebooks::config::Config;
use mnu_ebooks::logging;
use mnu_ebooks::pipeline::{self, RunRequest};
use mnu_ebooks::{ReportError, Result};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init_tracing(cli.verbose) {
        eprintln!("warning: {error}");
    }
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let mut config = Config::discover(cli.config.as_deref(), &cwd)?;
    if let Some(concordance) = cli.concordance {
        config.concordance = concordance;
    }
    if let Some(export_dir) = cli.export_dir {
        config.export_dir = Some(export_dir);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let analytics = answer_or_prompt(cli.analytics, "Alma Analytics csv filename: ", &mut input)?;
    let url_export = answer_or_prompt(cli.urls, "Alma Export URL csv filename: ", &mut input)?;
    let bookstore = answer_or_prompt(cli.bookstore, "Bookstore .xlsx filename: ", &mut input)?;
    let sheet = match cli.sheet {
        Some(sheet) => sheet,
        None => prompt("Bookstore sheet name: ", &mut input)?,
    };

    let request = RunRequest {
        analytics,
        url_export,
        bookstore,
        sheet,
        date: cli.date.unwrap_or_else(|| Local::now().date_naive()),
    };
    let summary = pipeline::run(&request, &config)?;

    println!(
        "Wrote {} (full list: {}, already owned: {}, not owned: {})",
        summary.output.display(),
        summary.full_list_rows,
        summary.already_owned_rows,
        summary.not_owned_rows
    );
    Ok(())
}

fn answer_or_prompt(answer: Option<PathBuf>, question: &str, input: &mut impl BufRead) -> Result<PathBuf> {
    match answer {
        Some(path) => Ok(path),
        None => Ok(PathBuf::from(prompt(question, input)?)),
    }
}

fn prompt(question: &str, input: &mut impl BufRead) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{question}")?;
    stdout.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ReportError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("no answer given for '{}'", question.trim_end_matches([':', ' '])),
        )));
    }
    Ok(line.trim().to_string())
}

/// Merge Alma e-book data with a bookstore course-book list.
///
/// Any input not given as a flag is asked for interactively.
#[derive(Parser)]
#[command(author, version, about = "Build the bookstore e-book availability workbook.")]
struct Cli {
    /// Alma Analytics CSV export.
    #[arg(long)]
    analytics: Option<PathBuf>,

    /// Alma Export URLs CSV.
    #[arg(long)]
    urls: Option<PathBuf>,

    /// Bookstore course-book workbook (.xlsx).
    #[arg(long)]
    bookstore: Option<PathBuf>,

    /// Sheet of the bookstore workbook to merge.
    #[arg(long)]
    sheet: Option<String>,

    /// MMS ID to ISBN concordance, overriding the configured path.
    #[arg(long)]
    concordance: Option<PathBuf>,

    /// Configuration file. Defaults to mnu-ebooks.toml in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the intermediate Alma and merged data as CSV into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Date stamped into the output name (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}
