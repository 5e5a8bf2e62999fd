use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use wavebin::{convert_files, Error};


#[derive(Parser, Debug)]
struct Args {
    /// binary field files to convert. Each is written next to the input with a .mat extension
    files: Vec<PathBuf>,
}

fn run(args: &Args) -> Result<Vec<PathBuf>, Error> {
    convert_files(args.files.as_slice())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
