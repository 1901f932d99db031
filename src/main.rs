//! # Pageflow CLI
//!
//! Usage:
//!   pageflow input.json -o paged.json
//!   echo '{ ... }' | pageflow > paged.json
//!   pageflow input.json --config letter.json --report
//!   pageflow --example > sample.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use pageflow::{Error, LayoutConfig, Paginated};

#[derive(Parser)]
#[command(name = "pageflow")]
#[command(version)]
#[command(about = "Paginate a structured document into fixed-size pages", long_about = None)]
struct Cli {
    /// Input document (JSON). Reads stdin if omitted.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file for the paged document (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Layout configuration (JSON); defaults to US Letter with 1in padding
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the reflow report as JSON to stderr
    #[arg(long)]
    report: bool,

    /// Print an example input document and exit
    #[arg(long)]
    example: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_document_json());
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let config = match &cli.config {
        Some(path) => LayoutConfig::from_json(&fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };

    let Paginated { document, report } = pageflow::paginate_json(&input, config)?;
    let json = serde_json::to_string_pretty(&document)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!(
                "✓ Written {} pages ({} bytes) to {}",
                report.page_count,
                json.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    if report.cap_hit {
        eprintln!("! Reflow stopped at the mutation cap; some pages may still overflow");
    }
    if cli.report {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn example_document_json() -> &'static str {
    r##"{
  "blocks": [
    { "type": "Heading", "level": 1, "text": "Quarterly Report" },
    {
      "type": "Paragraph",
      "text": "This document starts out in the legacy flat shape. Pageflow wraps it into a single page and then spreads it across as many pages as the content needs, splitting paragraphs between lines and lists between items."
    },
    { "type": "Heading", "level": 2, "text": "Highlights" },
    {
      "type": "List",
      "ordered": true,
      "start": 1,
      "items": [
        { "blocks": [{ "type": "Paragraph", "text": "Revenue grew for the fourth quarter in a row." }] },
        { "blocks": [{ "type": "Paragraph", "text": "Two new regional offices opened." }] },
        { "blocks": [{ "type": "Paragraph", "text": "Support response times dropped below four hours." }] }
      ]
    },
    {
      "type": "Table",
      "rows": [
        ["Region", "Q1", "Q2", "Q3", "Q4"],
        ["North", "1.2M", "1.4M", "1.5M", "1.7M"],
        ["South", "0.8M", "0.9M", "1.1M", "1.2M"]
      ]
    },
    {
      "type": "Blockquote",
      "blocks": [
        { "type": "Paragraph", "text": "The best quarter in the company's history." }
      ]
    }
  ]
}
"##
}
