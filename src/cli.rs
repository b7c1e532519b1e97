use clap::Parser;
use std::path::PathBuf;

use crate::model::FALLBACK_LANG;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Input .json scene document
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Language code for localized titles
    #[arg(long, default_value = FALLBACK_LANG)]
    pub lang: String,
    /// Also write an interpreter call trace per scene
    #[arg(long)]
    pub trace: bool,
}
