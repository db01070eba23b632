//! `interop-template`: specialize a class template from a guest source file
//! and print what the pipeline produced.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use interop::{DEFAULT_MAX_DEPTH, FrontendError, Session, SessionConfig, TargetInfo, init_tracing};

/// Target platform model.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum TargetArg {
    /// x86-64 Linux (LP64)
    #[default]
    #[value(name = "x86_64")]
    X86_64,
    /// 32-bit x86 Linux (ILP32)
    #[value(name = "i686")]
    I686,
}

impl TargetArg {
    fn info(self) -> TargetInfo {
        match self {
            TargetArg::X86_64 => TargetInfo::x86_64_linux(),
            TargetArg::I686 => TargetInfo::i686_linux(),
        }
    }
}

/// Specialize a guest class template and emit the resulting module
#[derive(Parser, Debug)]
#[command(name = "interop-template")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Guest source file to open
    #[arg(value_name = "SOURCE_FILE")]
    source: PathBuf,

    /// Class template to specialize
    #[arg(long, default_value = "Foo")]
    symbol: String,

    /// Template argument: a type name or a decimal integer (repeatable)
    #[arg(long = "arg", value_name = "ARG", default_values_t = [String::from("int"), String::from("4")])]
    args: Vec<String>,

    /// Platform model for layout and emission
    #[arg(long, value_enum, default_value_t = TargetArg::X86_64)]
    target: TargetArg,

    /// Maximum nesting of instantiations
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version are not failures.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<FrontendError>() {
                Some(FrontendError::Io { .. }) | None => eprintln!("error: {err:#}"),
                Some(frontend) => {
                    for diagnostic in frontend.diagnostics() {
                        eprintln!("{diagnostic}");
                    }
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = SessionConfig {
        target: cli.target.info(),
        max_instantiation_depth: cli.max_depth,
        ..SessionConfig::default()
    };
    let mut session = Session::open(&cli.source, config)?;

    let target = session.resolve(&cli.symbol);
    if target.is_valid() {
        println!("Found: {}", target);
    } else {
        println!("Not found: {}", cli.symbol);
    }

    let tokens: Vec<&str> = cli.args.iter().map(String::as_str).collect();
    let arguments = session.build_arguments(&target, &tokens)?;

    let canonical = session.canonicalize(&target, &arguments)?;
    println!("Canonical template specialization:");
    println!("{}", canonical.dump());

    let instance = session.instantiate(&target, &arguments)?;
    println!("Size of `{}` is `{}` bytes", instance.handle.name(), instance.size);

    let module = session.emit()?;
    print!("{}", module);
    Ok(())
}
