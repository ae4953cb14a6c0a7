//! LabelMe annotation documents: schema, discovery, and image probing.
//!
//! A LabelMe document is one JSON file per image, carrying the image itself
//! as a base64 payload (`imageData`), the original image path (`imagePath`),
//! and a list of labeled polygon shapes. Only the fields the conversion
//! needs are modeled; unknown fields are ignored.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::PolycocoError;

const DOCUMENT_EXTENSION: &str = "json";

/// One per-image LabelMe annotation document.
#[derive(Debug, Deserialize)]
pub struct LabelmeDocument {
    /// Base64-encoded image payload.
    #[serde(rename = "imageData")]
    pub image_data: String,

    /// Path of the annotated image as recorded by the annotation tool.
    /// Only the basename is meaningful here.
    #[serde(rename = "imagePath")]
    pub image_path: String,

    /// Labeled polygons, in authoring order.
    pub shapes: Vec<LabelmeShape>,
}

/// A labeled polygon.
#[derive(Debug, Deserialize)]
pub struct LabelmeShape {
    pub label: String,

    /// Polygon vertices as `[x, y]` pairs.
    pub points: Vec<[f64; 2]>,
}

impl LabelmeDocument {
    /// Basename of the recorded image path.
    ///
    /// LabelMe files authored on Windows carry backslash separators, so
    /// both separator styles are handled.
    pub fn file_name(&self) -> &str {
        self.image_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.image_path)
    }

    /// `(width, height)` of the embedded image.
    ///
    /// Decodes the base64 payload and probes the image header; the pixel
    /// data itself is dropped as soon as the dimensions are known.
    pub fn image_dimensions(&self, path: &Path) -> Result<(u32, u32), PolycocoError> {
        let bytes =
            STANDARD
                .decode(self.image_data.as_bytes())
                .map_err(|err| PolycocoError::ImageDecode {
                    path: path.to_path_buf(),
                    message: format!("invalid base64 payload: {err}"),
                })?;

        let size = imagesize::blob_size(&bytes).map_err(|err| PolycocoError::ImageDecode {
            path: path.to_path_buf(),
            message: format!("unreadable image header: {err}"),
        })?;

        let width = u32::try_from(size.width).map_err(|_| PolycocoError::ImageDecode {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;
        let height = u32::try_from(size.height).map_err(|_| PolycocoError::ImageDecode {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

        Ok((width, height))
    }
}

impl LabelmeShape {
    /// The category key: everything before the first underscore.
    ///
    /// LabelMe labels follow a `category_instance` convention where the
    /// trailing segments qualify the instance (`cat_1`, `cat_2`) and only
    /// the leading segment names the class.
    pub fn category_key(&self) -> &str {
        self.label.split('_').next().unwrap_or(&self.label)
    }
}

/// Reads and parses one LabelMe document.
pub fn read_labelme_document(path: &Path) -> Result<LabelmeDocument, PolycocoError> {
    let file = File::open(path).map_err(PolycocoError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| PolycocoError::DocumentParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Collects the `*.json` documents directly inside `dir`, sorted by file
/// name so every run processes the corpus in the same order.
pub fn collect_labelme_files(dir: &Path) -> Result<Vec<PathBuf>, PolycocoError> {
    if !dir.is_dir() {
        return Err(PolycocoError::InvalidInput {
            path: dir.to_path_buf(),
            message: "input must be a directory of LabelMe JSON files".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = entry.map_err(|source| PolycocoError::InvalidInput {
            path: dir.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), DOCUMENT_EXTENSION) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, allowed: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(allowed))
}
