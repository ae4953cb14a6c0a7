//! COCO dataset schema and JSON writer.
//!
//! # COCO Format Reference
//!
//! COCO bounding boxes use `[x, y, width, height]` format where `(x, y)` is
//! the top-left corner in absolute pixel coordinates. Segmentations are
//! flat `[x0, y0, x1, y1, ...]` coordinate runs, one run per polygon.
//!
//! The license enumeration is the fixed table used by the public COCO
//! releases; it is a constant, never derived from the input corpus.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PolycocoError;

/// Top-level COCO dataset structure.
///
/// Field order is the serialization order of the output document.
#[derive(Debug, Serialize, Deserialize)]
pub struct CocoDataset {
    pub info: CocoInfo,
    pub images: Vec<CocoImage>,
    pub licenses: Vec<CocoLicense>,
    pub categories: Vec<CocoCategory>,
    pub annotations: Vec<CocoAnnotation>,
}

/// COCO dataset info block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoInfo {
    pub year: u32,
    pub version: String,
    pub description: String,
    pub contributor: String,
    pub url: String,
    pub date_created: String,
}

impl Default for CocoInfo {
    fn default() -> Self {
        Self {
            year: 2024,
            version: "1.0".to_string(),
            description: "Exported from LabelMe polygon annotations".to_string(),
            contributor: "polycoco".to_string(),
            url: String::new(),
            date_created: chrono::Utc::now().date_naive().to_string(),
        }
    }
}

/// COCO license entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoLicense {
    pub url: String,
    pub id: u32,
    pub name: String,
}

/// COCO image entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub license: u32,
    pub date_captured: String,
}

/// COCO category entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: u32,
    pub name: String,
    pub supercategory: String,
}

/// COCO annotation entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: u32,

    /// One flat `[x0, y0, x1, y1, ...]` coordinate run per polygon. This
    /// converter emits single-polygon annotations only.
    pub segmentation: Vec<Vec<f64>>,

    pub area: f64,

    /// COCO bbox format: [x, y, width, height] with (x,y) as top-left corner.
    pub bbox: [f64; 4],

    pub iscrowd: u8,
}

/// The fixed license table carried verbatim into every output dataset.
pub fn standard_licenses() -> Vec<CocoLicense> {
    let entries = [
        (
            1,
            "Attribution-NonCommercial-ShareAlike License",
            "http://creativecommons.org/licenses/by-nc-sa/2.0/",
        ),
        (
            2,
            "Attribution-NonCommercial License",
            "http://creativecommons.org/licenses/by-nc/2.0/",
        ),
        (
            3,
            "Attribution-NonCommercial-NoDerivs License",
            "http://creativecommons.org/licenses/by-nc-nd/2.0/",
        ),
        (
            4,
            "Attribution License",
            "http://creativecommons.org/licenses/by/2.0/",
        ),
        (
            5,
            "Attribution-ShareAlike License",
            "http://creativecommons.org/licenses/by-sa/2.0/",
        ),
        (
            6,
            "Attribution-NoDerivs License",
            "http://creativecommons.org/licenses/by-nd/2.0/",
        ),
        (
            7,
            "No known copyright restrictions",
            "http://flickr.com/commons/usage/",
        ),
        (
            8,
            "United States Government Work",
            "http://www.usa.gov/copyright.shtml",
        ),
        (0, "Unknown", "Unknown"),
    ];

    entries
        .into_iter()
        .map(|(id, name, url)| CocoLicense {
            url: url.to_string(),
            id,
            name: name.to_string(),
        })
        .collect()
}

/// Writes a dataset to a COCO JSON file, creating parent directories as
/// needed. Any existing file at `path` is overwritten.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_coco_json(path: &Path, dataset: &CocoDataset) -> Result<(), PolycocoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(PolycocoError::Io)?;
        }
    }

    let file = File::create(path).map_err(PolycocoError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, dataset).map_err(|source| {
        PolycocoError::DatasetWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Reads a dataset from a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<CocoDataset, serde_json::Error> {
    serde_json::from_str(json)
}

/// Writes a dataset to a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn to_coco_string(dataset: &CocoDataset) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(dataset)
}
