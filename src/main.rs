use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use rvgen::backend::{self, CodegenOptions};
use rvgen::ir;

#[derive(Parser, Debug)]
#[command(name = "rvgen", version, about = "Lower three-address IR to RISC-V assembly")]
struct Config {
    /// Textual IR listing, one `(KIND, result, operands...)` tuple per instruction
    source: PathBuf,

    /// Output assembly file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail when the program never reaches a RET
    #[arg(long)]
    require_return: bool,

    /// Print the parsed IR to stderr before lowering
    #[arg(long)]
    print_ir: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let config = Config::parse();

    let default_level = if config.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let source = fs::read_to_string(&config.source)
        .with_context(|| format!("reading {}", config.source.display()))?;

    let instructions = ir::parser::parse(&source).map_err(rvgen::Error::from)?;
    info!("parsed {} IR instructions", instructions.len());

    if config.print_ir {
        for instr in &instructions {
            eprintln!("{}", instr);
        }
    }

    let options = CodegenOptions { require_return: config.require_return };
    let program = backend::generate(instructions, options).map_err(rvgen::Error::from)?;
    let assembly = backend::emit(&program);

    match &config.output {
        Some(path) => fs::write(path, assembly)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", assembly),
    }

    Ok(())
}
