//! Tern Compiler - checks Tern sources
//!
//! Usage: ternc [OPTIONS] <inputs>...

use anyhow::Context;
use clap::Parser as ClapParser;
use codespan_reporting::term::termcolor::ColorChoice;
use log::LevelFilter;
use std::path::PathBuf;
use std::process;
use tern_compiler::{DiagnosticReporter, DriverConfig, FrontendConfig, Pipeline};

#[derive(ClapParser, Debug)]
#[command(name = "ternc")]
#[command(author = "Tern Team")]
#[command(version)]
#[command(about = "Front-end and semantic analyzer for the Tern language", long_about = None)]
struct Args {
    /// Input files or directories (.tn)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Check as a library: no entry point required
    #[arg(long)]
    lib: bool,

    /// Do not load the embedded standard library
    #[arg(long)]
    no_stdlib: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump resolved symbols (for debugging)
    #[arg(long)]
    dump_symbols: bool,
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

/// `-v` enables info, `-vv` debug, `-vvv` trace; `RUST_LOG` overrides
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = DriverConfig {
        frontend: FrontendConfig {
            dump_tokens: args.dump_tokens,
            dump_ast: args.dump_ast,
        },
        dump_symbols: args.dump_symbols,
        no_stdlib: args.no_stdlib,
        library: args.lib,
    };
    let color = if args.no_color { ColorChoice::Never } else { ColorChoice::Auto };
    let mut pipeline = Pipeline::new(config).with_reporter(DiagnosticReporter::new().with_color(color));

    let program = pipeline
        .check(&args.inputs)
        .with_context(|| format!("could not check {} input(s)", args.inputs.len()))?;

    let classes = program.user_units().iter().map(|u| u.tree.decls.len()).sum::<usize>();
    log::info!(
        "checked {} file(s), {} class(es), {} warning(s)",
        program.user_units().len(),
        classes,
        program.warnings.len()
    );
    Ok(())
}
