use clap::Parser;
use std::path::PathBuf;

use rwc::assemble;
use rwc::diag::DiagnosticBag;
use rwc::dot;
use rwc::model::{Model, Reactor};
use rwc::width::ParameterMap;
use rwc::wiring::{verify_wiring, StageCert, WiringProgram};

#[derive(Debug, Clone, clap::ValueEnum)]
enum EmitFormat {
    Text,
    Json,
    Dot,
}

#[derive(Parser, Debug)]
#[command(
    name = "rwc",
    version,
    about = "Reactor Wiring Compiler — turns reactor definitions into runtime wiring programs"
)]
struct Cli {
    /// Input reactor model (JSON)
    model: PathBuf,

    /// Assemble only the named reactor (default: every reactor in the model)
    #[arg(short, long)]
    reactor: Option<String>,

    /// Width parameter binding, NAME=VALUE (repeatable)
    #[arg(short, long = "param")]
    param: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = EmitFormat::Text)]
    emit: EmitFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print assembly progress, fingerprints, and verification results
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // ── Width parameters ──
    let mut params = ParameterMap::new();
    for binding in &cli.param {
        match parse_param(binding) {
            Some((name, value)) => params.set(name, value),
            None => {
                eprintln!(
                    "rwc: error: invalid --param '{}', expected NAME=VALUE",
                    binding
                );
                std::process::exit(2);
            }
        }
    }

    // ── Load model ──
    let source = match std::fs::read_to_string(&cli.model) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("rwc: error: {}: {}", cli.model.display(), e);
            std::process::exit(2);
        }
    };
    let model: Model = match serde_json::from_str(&source) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("rwc: error: {}: {}", cli.model.display(), e);
            std::process::exit(2);
        }
    };

    if cli.verbose {
        eprintln!("rwc: {} reactors loaded", model.reactors.len());
    }

    let selected: Vec<&Reactor> = match &cli.reactor {
        Some(name) => match model.reactor(name) {
            Some(r) => vec![r],
            None => {
                eprintln!("rwc: error: no reactor named '{}' in the model", name);
                std::process::exit(2);
            }
        },
        None => model.reactors.iter().collect(),
    };

    // ── Assemble ──
    let bag = DiagnosticBag::new();
    let mut programs: Vec<WiringProgram> = Vec::new();
    for reactor in selected {
        match assemble::assemble(&model, reactor, &params, &bag) {
            Some(program) => {
                if cli.verbose {
                    let cert = verify_wiring(&program);
                    eprintln!(
                        "rwc: '{}': {} ops, fingerprint {}, cert {}",
                        program.reactor,
                        program.ops.len(),
                        program.fingerprint_hex(),
                        if cert.all_pass() { "ok" } else { "FAILED" }
                    );
                }
                programs.push(program);
            }
            None => {
                if cli.verbose {
                    eprintln!("rwc: '{}' had errors; no wiring emitted", reactor.name);
                }
            }
        }
    }

    for diag in bag.snapshot() {
        eprintln!("rwc: {}", diag);
    }
    if bag.has_errors() {
        std::process::exit(1);
    }

    // ── Emit ──
    let mut out = String::new();
    for program in &programs {
        match cli.emit {
            EmitFormat::Text => out.push_str(&program.to_string()),
            EmitFormat::Json => match program.to_json() {
                Ok(json) => {
                    out.push_str(&json);
                    out.push('\n');
                }
                Err(e) => {
                    eprintln!("rwc: error: serializing '{}': {}", program.reactor, e);
                    std::process::exit(2);
                }
            },
            EmitFormat::Dot => out.push_str(&dot::emit_dot(program)),
        }
    }

    match &cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, out) {
                eprintln!("rwc: error: {}: {}", path.display(), e);
                std::process::exit(2);
            }
        }
        None => print!("{}", out),
    }
}

fn parse_param(binding: &str) -> Option<(&str, i64)> {
    let (name, value) = binding.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value: i64 = value.trim().parse().ok()?;
    Some((name, value))
}
