pub mod cli;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

use anyhow::Context;
use clap::Parser;

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // 1. ── Parse ──────────────────────────────────────────────────────
    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Reading {}", args.input.display()))?;
    let scenes = parser::load_from_json(&json).with_context(|| "Parsing scene document")?;

    // 2. ── Process ────────────────────────────────────────────────────
    let processed =
        processor::run(&scenes, &args.lang).with_context(|| "Compiling scenes")?;

    // 3. ── Write outputs ──────────────────────────────────────────────
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Creating {}", args.output.display()))?;

    writer::kubejs::emit(&processed, &args.output).with_context(|| "Writing scene scripts")?;
    if args.trace {
        writer::trace::emit(&processed, &args.output).with_context(|| "Writing call traces")?;
    }

    Ok(())
}
