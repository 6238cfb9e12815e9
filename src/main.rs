use std::fs;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use eir::interp::Vm;
use eir::linker::link;
use eir::parser::parse_module;

#[derive(Parser)]
#[command(
    name = "eir-run",
    version,
    about = "Loads, links, and runs an EIR program"
)]
struct Cli {
    /// Path to the EIR source file to run.
    program: String,

    /// Print the resolved module (text and data) to stderr before running it.
    #[arg(long)]
    dump: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("eir-run: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), eir::error::EirError> {
    info!("reading {}", cli.program);
    let source = fs::read_to_string(&cli.program)?;

    let program = parse_module(&source)?;
    let module = link(program)?;

    if cli.dump {
        eprintln!("{:#?}", module);
    }

    let mut vm = Vm::new(&module);
    vm.run(&module, &mut io::stdin(), &mut io::stdout())
}
