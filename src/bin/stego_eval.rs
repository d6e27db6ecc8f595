//! The dataset evaluation CLI (§4.10): walks a dataset tree and writes a
//! per-file CSV of robustness metrics across every method, payload, and
//! parameter grid point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use audiosteg::error::StegoError;
use audiosteg::eval::{run, EvalConfig};
use audiosteg::method::MethodTag;

#[derive(Parser)]
#[command(name = "stego-eval", about = "Evaluate steganography methods' robustness across a dataset tree")]
struct Cli {
    /// Path to a directory containing datasets: `<root>/<dataset>/<category>/<file>.wav`.
    #[arg(short = 'd', long = "datasets")]
    datasets: PathBuf,

    /// Output directory; `<output>/<dataset>/<category>/<file>.csv` is created.
    #[arg(short = 'o', long = "output", default_value = "output")]
    output: PathBuf,

    /// Enables extended testing (basin-hopping/bruteforce delay search, extra noise/MP3 cases).
    #[arg(short = 'e', long = "extended", default_value_t = false)]
    extended: bool,

    /// Number of concurrent worker threads; default: available CPU count.
    #[arg(short = 'p', long = "processes")]
    processes: Option<usize>,

    /// Method(s) to evaluate; default: all nine.
    methods: Vec<String>,
}

fn run_cli() -> Result<(), StegoError> {
    let cli = Cli::parse();

    let methods = if cli.methods.is_empty() || cli.methods.iter().any(|m| m == "ALL") {
        MethodTag::ALL.to_vec()
    } else {
        cli.methods.iter().map(|m| m.parse()).collect::<Result<Vec<MethodTag>, _>>()?
    };

    let worker_count = cli.processes.unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));

    let config = EvalConfig {
        dataset_root: cli.datasets,
        output_root: cli.output,
        methods,
        extended: cli.extended,
        worker_count,
    };

    run(&config)
}

fn main() -> ExitCode {
    env_logger::init();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("stego-eval: error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
