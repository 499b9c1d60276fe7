//! remold: Deserialize JSON or JSON-API payloads with declared schemas
//!
//! Usage:
//!   # Parse a plain JSON payload from a file
//!   remold --schemas schemas.json --schema form payload.json
//!
//!   # Parse a JSON-API document from stdin
//!   cat document.json | remold --schemas schemas.json --schema form --jsonapi
//!
//!   # Process NDJSON, one result per line
//!   remold --schemas schemas.json --schema form --ndjson events.jsonl
//!
//! Set RUST_LOG=debug to see relationship resolution.

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use remold::{deserialize_stream, parse, FunctionTable, Mode, ParseOptions, SchemaRegistry};
use serde_json::Value;
use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, Read};

#[derive(Parser, Debug)]
#[command(name = "remold")]
#[command(about = "Deserialize JSON and JSON-API payloads with declared schemas", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Schema definitions document
    #[arg(long, value_name = "FILE")]
    schemas: String,

    /// Name of the schema to parse with
    #[arg(long)]
    schema: String,

    /// Treat input as JSON-API documents
    #[arg(long)]
    jsonapi: bool,

    /// Process newline-delimited JSON (one document per line)
    #[arg(long)]
    ndjson: bool,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,

    /// Maximum nesting of related resources (default: 32)
    #[arg(long)]
    max_depth: Option<usize>,

    /// JSON array of resources used to resolve relationship stubs
    #[arg(long, value_name = "FILE")]
    included: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let definitions = std::fs::read_to_string(&args.schemas)
        .with_context(|| format!("Failed to read {}", args.schemas))?;
    let registry = SchemaRegistry::from_json_str(&definitions, &FunctionTable::new())
        .context("Failed to load schema definitions")?;
    let schema = registry.get(&args.schema)?;

    // Build options
    let mut options = ParseOptions::default();
    if let Some(depth) = args.max_depth {
        options.max_depth = depth;
    }
    if let Some(path) = &args.included {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
        let resources: Vec<Value> = serde_json::from_reader(BufReader::new(file))
            .context("Included resources must be a JSON array")?;
        options.included = Some(resources);
    }

    let mode = if args.jsonapi { Mode::JsonApi } else { Mode::Json };

    let reader: Box<dyn BufRead> = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(File::open(file_path)?))
    } else {
        Box::new(BufReader::new(stdin()))
    };

    if args.ndjson {
        let count = deserialize_stream(reader, &mut stdout().lock(), &schema, mode, &options)?;
        if count == 0 {
            eprintln!("Warning: No JSON documents found in input");
        }
        return Ok(());
    }

    let document = read_document(reader)?;
    let parsed = parse(&document, schema, mode, options)?;

    let output = if args.compact {
        serde_json::to_string(&parsed)?
    } else {
        serde_json::to_string_pretty(&parsed)?
    };

    println!("{}", output);

    Ok(())
}

/// Read a single document using SIMD-accelerated parsing
fn read_document(mut reader: Box<dyn BufRead>) -> Result<Value> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;

    let value: Value = simd_json::serde::from_slice(&mut content).context("Failed to parse JSON")?;
    Ok(value)
}
