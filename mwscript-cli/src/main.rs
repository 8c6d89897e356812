//! mwscript CLI - Command line interface
//!
//! Compiles a script (or loads a compiled container), then optionally
//! disassembles it, writes it out, and runs it against an in-memory host.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

use mwscript_api::{
    load, standard_extensions, CompilerConfig, LimitConfig, RunConfig, ScriptError, Toolchain,
    WarningsMode,
};
use mwscript_core::{binary, CompiledScript, Disassembler, MemoryContext, VarType};

mod config;
mod env;
mod error;
mod host;
mod logging;
mod platform;

use crate::config::{parse_level, LogConfig};
use crate::env::Environment;
use crate::error::CliError;
use crate::logging::LogFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EmitFormat {
    /// Binary container (.mwsb)
    Bin,
    /// JSON form of the compiled script
    Json,
}

#[derive(Parser)]
#[command(name = "mwscript", about = "mwscript compiler and interpreter", version)]
struct Cli {
    /// Script source or compiled container (.mwsb)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Environment file declaring globals, ids and member variables
    #[arg(long, value_name = "FILE")]
    env: Option<PathBuf>,

    /// Print the disassembly listing
    #[arg(long)]
    disasm: bool,

    /// Write the compiled script
    #[arg(long, value_enum, value_name = "FORMAT")]
    emit: Option<EmitFormat>,

    /// Output path for --emit (default: FILE.mwsb for bin, stdout for json)
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Run the script once and print the final state
    #[arg(long)]
    run: bool,

    /// Warning handling: ignore, report or strict
    #[arg(long, value_parser = parse_warnings, default_value = "report")]
    warnings: WarningsMode,

    /// Maximum VM stack size
    #[arg(long, value_name = "N")]
    max_stack: Option<usize>,

    /// Global log level (silent, error, warn, info, debug, trace)
    #[arg(long, value_parser = parse_level, default_value = "warn")]
    log_level: LevelFilter,

    /// Per-phase log level, e.g. `vm=trace` (repeatable)
    #[arg(long, value_name = "PHASE=LEVEL")]
    log_phase: Vec<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Also append logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn parse_warnings(s: &str) -> Result<WarningsMode, String> {
    match s.to_lowercase().as_str() {
        "ignore" => Ok(WarningsMode::Ignore),
        "report" => Ok(WarningsMode::Report),
        "strict" => Ok(WarningsMode::Strict),
        _ => Err(format!("unknown warnings mode '{s}'")),
    }
}

/// 输入文件：源码或已编译容器
enum Input {
    Source(String),
    Compiled(CompiledScript),
}

impl Input {
    fn read(path: &Path) -> Result<Self, CliError> {
        let bytes = fs::read(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if binary::is_container(&bytes) {
            return Ok(Input::Compiled(load(&bytes)?));
        }
        String::from_utf8(bytes)
            .map(Input::Source)
            .map_err(|_| CliError::NotSource(path.to_path_buf()))
    }

    fn source(&self) -> Option<&str> {
        match self {
            Input::Source(source) => Some(source),
            Input::Compiled(_) => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let input = match Input::read(&cli.file) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match process(&cli, &input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Script(e)) => {
            platform::print_error_with_source(&e, input.source());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), CliError> {
    let mut log_config = LogConfig {
        global: cli.log_level,
        ..LogConfig::default()
    };
    for spec in &cli.log_phase {
        log_config
            .set_phase(spec)
            .map_err(CliError::InvalidArgument)?;
    }
    logging::init_with_file(&log_config, cli.log_format, cli.log_file.as_deref())
}

fn build_run_config(cli: &Cli) -> RunConfig {
    let mut limits = LimitConfig::default();
    if let Some(max_stack) = cli.max_stack {
        limits.max_stack_size = max_stack;
    }
    RunConfig {
        dump_bytecode: cli.disasm,
        compiler: CompilerConfig {
            warnings: cli.warnings,
        },
        limits,
    }
}

fn process(cli: &Cli, input: &Input) -> Result<(), CliError> {
    let environment = match &cli.env {
        Some(path) => Environment::load(path)?,
        None => Environment::default(),
    };

    let mut extensions = standard_extensions()?;
    host::install(&mut extensions, &environment.owner).map_err(ScriptError::from)?;
    extensions.seal();
    let extensions = Arc::new(extensions);

    let toolchain = Toolchain::new(
        environment.compiler_context(),
        Arc::clone(&extensions),
        build_run_config(cli),
    );

    let script = match input {
        Input::Source(source) => {
            let output = toolchain.compile(source)?;
            platform::print_diagnostics(&output.warnings, source);
            if let Some(listing) = &output.listing {
                print!("{listing}");
            }
            output.script
        }
        Input::Compiled(script) => {
            if cli.disasm {
                print!(
                    "{}",
                    Disassembler::new(script).with_extensions(&extensions).render()
                );
            }
            script.clone()
        }
    };
    info!(target: "mwscript::cli", name = script.name(), "Script ready");

    if let Some(format) = cli.emit {
        emit(cli, &script, format)?;
    }

    if cli.run {
        let mut context = MemoryContext::new(&script);
        environment.prepare(&mut context);
        let output = toolchain.execute(&script, &mut context)?;
        debug!(target: "mwscript::cli", outcome = ?output.outcome, "Run finished");
        print_state(&script, &context);
    }

    if !cli.disasm && cli.emit.is_none() && !cli.run {
        println!("{}: ok ({} instructions)", script.name(), script.code().len());
    }
    Ok(())
}

fn emit(cli: &Cli, script: &CompiledScript, format: EmitFormat) -> Result<(), CliError> {
    let write = |path: &Path, bytes: &[u8]| {
        fs::write(path, bytes).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    };
    match format {
        EmitFormat::Bin => {
            let path = cli
                .output
                .clone()
                .unwrap_or_else(|| cli.file.with_extension(binary::EXTENSION));
            write(&path, &binary::encode(script))?;
            info!(target: "mwscript::cli", path = %path.display(), "Wrote container");
        }
        EmitFormat::Json => {
            let json = script.to_json()?;
            match &cli.output {
                Some(path) => write(path, json.as_bytes())?,
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}

/// 打印运行后的局部变量与全局变量
fn print_state(script: &CompiledScript, context: &MemoryContext) {
    for ty in VarType::ALL {
        for name in script.locals().names(ty) {
            if let Some(value) = context.locals.get_by_name(script.locals(), name) {
                println!("{ty:<5} {name} = {value}");
            }
        }
    }
    let mut globals: Vec<_> = context.globals().collect();
    globals.sort_by(|a, b| a.0.cmp(b.0));
    for (name, ty, value) in globals {
        println!("{ty:<5} {name} = {value} (global)");
    }
    for name in context.running_scripts() {
        println!("running {name}");
    }
}
