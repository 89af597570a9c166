//! Entry point for dcmb64's CLI tool.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use dcmb64::conversion::{self, ConversionConfig};
use dcmb64::core::Dcmb64Error;

#[derive(Parser)]
#[command(
  name = "dcmb64",
  bin_name = "dcmb64",
  version = env!("CARGO_PKG_VERSION"),
  about = "Prints the image in a DICOM file as a base64-encoded JPEG",
  max_term_width = 80
)]
struct Cli {
  #[arg(
    value_name = "INPUT_FILENAME",
    allow_hyphen_values = true,
    help = "The name of the DICOM P10 file to convert"
  )]
  input_filename: Option<PathBuf>,

  #[arg(
    hide = true,
    trailing_var_arg = true,
    allow_hyphen_values = true
  )]
  ignored_args: Vec<String>,

  #[arg(
    long = "jpg-quality",
    value_parser = clap::value_parser!(u8).range(1..=100),
    default_value_t = 75,
    help = "The quality level of the encoded JPEG, in the range 1-100"
  )]
  jpg_quality: u8,

  #[arg(
    long,
    default_value_t = 0,
    help = "The index of the frame to convert when the DICOM file contains \
      multiple frames"
  )]
  frame: usize,
}

fn main() -> Result<(), ()> {
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("warn"),
  )
  .init();

  let cli = Cli::parse();

  let Some(input_filename) = cli.input_filename else {
    println!("No arguments provided.");
    return Ok(());
  };

  if !cli.ignored_args.is_empty() {
    log::debug!("Ignoring {} extra argument(s)", cli.ignored_args.len());
  }

  if let Err(e) = print_pathname(&input_filename) {
    log::error!("Failed writing to stdout: {e}");
    return Err(());
  }

  let config = ConversionConfig::default()
    .jpeg_quality(cli.jpg_quality)
    .frame_index(cli.frame);

  match conversion::convert_file(&input_filename, &config) {
    Ok(base64) => {
      println!("{base64}");
      Ok(())
    }

    Err(e) => {
      e.print(&format!("converting \"{}\"", input_filename.display()));
      Err(())
    }
  }
}

/// Prints the input filename exactly as it was passed, including any bytes
/// that aren't valid UTF-8.
///
fn print_pathname(path: &Path) -> std::io::Result<()> {
  let mut stdout = std::io::stdout().lock();

  stdout.write_all(b"pathname: ")?;
  stdout.write_all(path.as_os_str().as_encoded_bytes())?;
  stdout.write_all(b"\n")?;
  stdout.flush()
}
