use std::path::PathBuf;
use std::process::{Command, ExitCode};

use clap::Parser;
use clap_stdin::FileOrStdin;
use tracing::{debug, error, info};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use minipas::{compile, tokens, CompileOptions};

/// Compiles a minipas program into a Python 3 script
#[derive(Parser, Debug)]
#[command(name = "minipas", version, about, long_about = None)]
struct Args {
    /// Source file, or `-` for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: FileOrStdin,

    /// Print the token stream and stop
    #[arg(long)]
    tokens: bool,

    /// Print the unoptimized intermediate code
    #[arg(long)]
    show_intermediate: bool,

    /// Optimize the intermediate code and print the reduction report
    #[arg(long)]
    optimize: bool,

    /// Log every compilation phase
    #[arg(short, long)]
    verbose: bool,

    /// Write the Python program here instead of stdout
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Run the compiled program with python3 instead of printing it
    #[arg(short, long)]
    run: bool,
}

/// `[LEVEL] message` lines on stderr, no timestamps or module paths.
fn init_logger(verbose: bool) {
    let filter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter);
    tracing_subscriber::registry().with(layer).init();
}

/// Runs `target` under python3 with the terminal's stdin and stdout, and
/// passes its exit status on.
fn run_target(target: &str) -> ExitCode {
    let status = match Command::new("python3").arg("-c").arg(target).status() {
        Ok(status) => status,
        Err(e) => {
            error!("cannot start python3: {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(%status, "program finished");
    match status.code().map(u8::try_from) {
        Some(Ok(code)) => ExitCode::from(code),
        _ => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    let source = match args.input.contents() {
        Ok(source) => source,
        Err(e) => {
            error!("cannot read input: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.tokens {
        return match tokens(&source) {
            Ok(tokens) => {
                for t in tokens {
                    println!("{}:{}\t{:?}\t{:?}", t.line, t.column, t.kind, t.lexeme);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let options = CompileOptions {
        show_intermediate: args.show_intermediate,
        optimize: args.optimize,
        verbose_trace: args.verbose,
    };
    let compilation = match compile(&source, &options) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // warnings were already logged while analyzing
    if let Some(listing) = &compilation.intermediate {
        eprint!("{}", listing);
    }
    if let Some(listing) = compilation.optimized_listing() {
        eprint!("{}", listing);
    }
    if let Some(report) = &compilation.report {
        eprint!("{}", report);
    }

    match args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &compilation.target) {
                error!("cannot write {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
            info!("wrote {}", path.display());
        }
        None if args.run => (),
        None => print!("{}", compilation.target),
    }

    if args.run {
        return run_target(&compilation.target);
    }
    ExitCode::SUCCESS
}
