//! Polycoco: LabelMe polygon annotations to COCO datasets.
//!
//! Polycoco aggregates a directory of per-image LabelMe JSON documents into
//! a single COCO-style dataset file. The geometric annotation fields are
//! derived from the polygons themselves: area via the shoelace formula and
//! bounding boxes from a rasterized pixel mask.
//!
//! # Modules
//!
//! - [`labelme`]: input document schema and discovery
//! - [`geometry`]: polygon area and mask-derived bounding boxes
//! - [`convert`]: the two-pass conversion pipeline
//! - [`coco`]: output dataset schema and JSON writer
//! - [`error`]: error types for polycoco operations

pub mod coco;
pub mod convert;
pub mod error;
pub mod geometry;
pub mod labelme;

use std::path::PathBuf;

use clap::Parser;

pub use error::PolycocoError;

/// The polycoco CLI application.
#[derive(Parser)]
#[command(name = "polycoco")]
#[command(version, author, about)]
struct Cli {
    /// Directory containing LabelMe annotation JSON files.
    labelme_dir: PathBuf,

    /// Output JSON file path.
    #[arg(long, default_value = "trainval.json")]
    output: PathBuf,
}

/// Run the polycoco CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PolycocoError> {
    let cli = Cli::parse();
    convert::convert_directory(&cli.labelme_dir, &cli.output)
}
