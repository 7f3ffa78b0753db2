//! csv-loom CLI - inspect and summarize delimited text files

use clap::Parser;
use csv_loom::{Charset, Facet, Reader, Table, quote_field};
use std::path::PathBuf;
use std::process::ExitCode;

/// Delimited-text table inspector.
///
/// Reads one or more delimited files into typed in-memory tables and
/// prints a column summary, filtered/sorted rows, or a value frequency
/// count for one column.
#[derive(Parser, Debug)]
#[command(name = "csv-loom")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) to read
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Force a specific separator (single character)
    #[arg(short = 'd', long)]
    separator: Option<char>,

    /// Force a specific quote character (default: '"')
    #[arg(short = 'q', long)]
    quote: Option<char>,

    /// Character set label (e.g. utf-8, windows-1251; 'auto' sniffs)
    #[arg(short = 'c', long)]
    charset: Option<String>,

    /// Treat the first record as data instead of headers
    #[arg(long)]
    no_headers: bool,

    /// Keep every column as text instead of inferring kinds
    #[arg(long)]
    no_infer: bool,

    /// Print the first N rows as delimited output instead of a summary
    #[arg(short = 'n', long)]
    head: Option<usize>,

    /// Keep only rows whose column equals the value (COLUMN=VALUE)
    #[arg(long)]
    filter: Option<String>,

    /// Sort rows by a column before printing (COLUMN or COLUMN:desc)
    #[arg(short = 's', long)]
    sort: Option<String>,

    /// Print a value frequency count for one column instead of a summary
    #[arg(short = 'f', long)]
    frequency: Option<String>,

    /// Facet applied by --frequency
    #[arg(long, default_value = "identity")]
    facet: FacetArg,

    /// Show per-column detail in the summary
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum FacetArg {
    Identity,
    Year,
    Month,
    Weekday,
    Host,
    Scheme,
    FirstLetter,
    Length,
}

impl From<FacetArg> for Facet {
    fn from(facet: FacetArg) -> Self {
        match facet {
            FacetArg::Identity => Facet::Identity,
            FacetArg::Year => Facet::Year,
            FacetArg::Month => Facet::Month,
            FacetArg::Weekday => Facet::Weekday,
            FacetArg::Host => Facet::Host,
            FacetArg::Scheme => Facet::Scheme,
            FacetArg::FirstLetter => Facet::FirstLetter,
            FacetArg::Length => Facet::Length,
        }
    }
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();

    let mut exit_code = ExitCode::SUCCESS;

    for file in &args.files {
        if let Err(e) = inspect_file(file, &args) {
            eprintln!("Error processing {}: {}", file.display(), e);
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}

fn inspect_file(path: &PathBuf, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = Reader::new();

    if let Some(separator) = args.separator {
        reader.separator(separator);
    }
    if let Some(quote) = args.quote {
        reader.quote(quote);
    }
    if let Some(ref label) = args.charset {
        // "auto" leaves detection on, which is also the default
        if !label.eq_ignore_ascii_case("auto") {
            match Charset::for_label(label) {
                Some(charset) => {
                    reader.charset(charset);
                }
                None => return Err(format!("unknown charset label: {label}").into()),
            }
        }
    }
    if args.no_headers {
        reader.headers(false);
    }
    if args.no_infer {
        reader.infer_types(false);
    }

    let table = reader.read_path(path)?;

    if let Some(ref column) = args.frequency {
        print_frequency(&table, column, args.facet.into())?;
        return Ok(());
    }

    if args.head.is_some() || args.filter.is_some() || args.sort.is_some() {
        print_rows(&table, args)?;
        return Ok(());
    }

    print_summary(path, &table, args.verbose);
    Ok(())
}

fn print_summary(path: &PathBuf, table: &Table, verbose: bool) {
    let metadata = table.metadata();

    println!("File: {}", path.display());
    println!("  Separator: {:?}", metadata.separator);
    println!("  Quote: {:?}", metadata.quote);
    println!("  Charset: {}", metadata.charset);
    println!("  Columns: {}", metadata.len());
    println!("  Rows: {}", table.row_count());

    if verbose {
        println!("  Column details:");
        for (i, column) in metadata.columns().iter().enumerate() {
            println!("    {}: {} ({})", i + 1, column.name(), column.kind());
        }
    }

    println!();
}

fn print_rows(table: &Table, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut query = table.query();

    if let Some(ref filter) = args.filter {
        let (column, text) = filter
            .split_once('=')
            .ok_or("filter must look like COLUMN=VALUE")?;
        let index = table.metadata().column_index(column)?;
        let value = table.metadata().column(index)?.parse(text)?;
        query = query.column(column)?.eq(value)?;
    }

    if let Some(ref sort) = args.sort {
        query = match sort.split_once(':') {
            Some((column, "desc")) => query.desc(column)?,
            Some((column, _)) => query.asc(column)?,
            None => query.asc(sort)?,
        };
    }

    let result = query.rows();
    let separator = table.metadata().separator.to_string();

    let header: Vec<String> = result
        .columns()
        .iter()
        .map(|column| quote_field(column.name()))
        .collect();
    println!("{}", header.join(&separator));

    let limit = args.head.unwrap_or(usize::MAX);
    for record in result.records().iter().take(limit) {
        println!("{}", record.join(&separator));
    }

    Ok(())
}

fn print_frequency(
    table: &Table,
    column: &str,
    facet: Facet,
) -> Result<(), Box<dyn std::error::Error>> {
    let freq = table.frequency(column, facet)?;

    println!("Column: {}", freq.column());
    for (value, count) in freq.iter() {
        println!("  {value}: {count}");
    }
    if freq.null_count() > 0 {
        println!("  (null): {}", freq.null_count());
    }
    println!("  total: {}", freq.total());

    Ok(())
}
