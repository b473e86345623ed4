use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use lzac::{compress_ac, decompress_ac, AcMode, CodecError};

/// Arithmetic-coding file compressor
#[derive(Parser)]
#[command(name = "ac", version)]
struct Args {
    /// Use the static data model instead of the adaptive one
    #[arg(short = 's')]
    static_model: bool,

    /// Decompress; the data model is detected from the header
    #[arg(short = 'd', conflicts_with = "static_model")]
    decompress: bool,

    input: PathBuf,
    output: PathBuf,
}

fn run(args: &Args) -> Result<(), CodecError> {
    let mut input = BufReader::new(File::open(&args.input)?);
    let mut output = BufWriter::new(File::create(&args.output)?);

    if args.decompress {
        decompress_ac(&mut input, &mut output)?;
    } else if args.static_model {
        compress_ac(&mut input, &mut output, AcMode::Static)?;
    } else {
        compress_ac(&mut input, &mut output, AcMode::Adaptive)?;
    }
    output.flush()?;
    Ok(())
}

fn main() {
    pretty_env_logger::init();
    let args = Args::parse();
    if let Err(error) = run(&args) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}
