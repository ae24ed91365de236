use clap::Parser;
use std::path::PathBuf;

// Build version with UI stack info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "UI:     egui/eframe 0.33\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Barcode scanner viewfinder overlay demo
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Backdrop image standing in for the camera feed (default: synthetic code)
    #[arg(value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    /// Seconds of scanning before the simulated decoder reports a hit
    #[arg(short = 'd', long = "decode-after", value_name = "SECS", default_value = "6.0")]
    pub decode_after: f32,

    /// Seconds to hold the result still before returning to the live view
    #[arg(long = "hold", value_name = "SECS", default_value = "2.5")]
    pub hold: f32,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
