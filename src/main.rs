use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use log::LevelFilter;

use quill::bytecode::Lump;
use quill::bytecode::disasm::{print_lump, print_lump_stats};
use quill::error::{compile_source, eval_source, load_lump, load_source, save_lump};
use quill::frontend::lexer::Lexer;
use quill::frontend::token_dumper::TokenDumper;
use quill::runtime::vm::{Vm, VmConfig};

/// Quill expression compiler and bytecode VM.
#[derive(Parser)]
#[command(name = "quill", version)]
struct Cli {
    /// Source file (or a compiled lump with --load)
    script: PathBuf,

    /// Print the token stream and stop
    #[arg(long)]
    tokens: bool,

    /// Evaluate directly instead of compiling to bytecode
    #[arg(long, conflicts_with_all = ["disasm", "emit", "load"])]
    eval: bool,

    /// Print the disassembled lump before running it
    #[arg(long)]
    disasm: bool,

    /// Write the compiled lump to this path instead of running it
    #[arg(long, value_name = "PATH")]
    emit: Option<PathBuf>,

    /// Treat the input as a compiled lump
    #[arg(long, conflicts_with = "tokens")]
    load: bool,

    /// Skip unknown opcodes instead of failing
    #[arg(long)]
    lenient: bool,

    /// Operand stack capacity
    #[arg(long, value_name = "N", default_value_t = 256)]
    stack: usize,

    /// Verify the lump before running it
    #[arg(long)]
    verify: bool,

    /// Trace every instruction to stderr
    #[arg(long)]
    trace: bool,

    /// Disable ANSI colours in the token listing
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .context("failed to initialise logging")?;

    if cli.load {
        let lump = load_lump(&cli.script)?;
        log::debug!("loaded {} bytes from {}", lump.len(), cli.script.display());
        return run_lump(&cli, &lump);
    }

    let source = load_source(&cli.script)?;

    if cli.tokens {
        return dump_tokens(&cli, source.text());
    }

    if cli.eval {
        let value = eval_source(source.text())?;
        println!("{}", value);
        return Ok(());
    }

    let lump = compile_source(source.text())?;

    if let Some(out) = &cli.emit {
        save_lump(out, &lump)?;
        log::info!("wrote {} bytes of code to {}", lump.len(), out.display());
        return Ok(());
    }

    run_lump(&cli, &lump)
}

fn dump_tokens(cli: &Cli, source: &str) -> anyhow::Result<()> {
    let (tokens, diagnostics) = Lexer::new(source).scan();

    let mut dumper = TokenDumper::new();
    if cli.no_color {
        dumper = dumper.no_color();
    }
    dumper.dump(source, &tokens);

    if !diagnostics.is_empty() {
        eprintln!("{}", diagnostics);
        bail!("{} invalid token(s)", diagnostics.len());
    }
    Ok(())
}

fn run_lump(cli: &Cli, lump: &Lump) -> anyhow::Result<()> {
    if cli.disasm {
        print_lump(&cli.script.display().to_string(), lump);
        println!();
        print_lump_stats(lump);
        println!();
    }

    let config = VmConfig {
        stack_capacity: cli.stack,
        strict_opcodes: !cli.lenient,
        trace: cli.trace,
        verify: cli.verify,
    };
    let value = Vm::with_config(config).interpret(lump)?;
    println!("{}", value);
    Ok(())
}
