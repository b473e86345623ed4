use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use lzac::{compress_lzw, decompress_lzw, CodecError, LzwMode};

/// LZW file compressor
#[derive(Parser)]
#[command(name = "lzw", version)]
struct Args {
    /// Arithmetic-code the dictionary codes instead of writing them as
    /// variable-width bit fields
    #[arg(short = 'a')]
    arithmetic: bool,

    /// Decompress; the code strategy is detected from the header
    #[arg(short = 'd', conflicts_with = "arithmetic")]
    decompress: bool,

    input: PathBuf,
    output: PathBuf,
}

fn run(args: &Args) -> Result<(), CodecError> {
    let mut input = BufReader::new(File::open(&args.input)?);
    let mut output = BufWriter::new(File::create(&args.output)?);

    if args.decompress {
        decompress_lzw(&mut input, &mut output)?;
    } else if args.arithmetic {
        compress_lzw(&mut input, &mut output, LzwMode::Arithmetic)?;
    } else {
        compress_lzw(&mut input, &mut output, LzwMode::Variable)?;
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
