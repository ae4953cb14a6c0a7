//! Conversion pipeline: LabelMe documents in, one COCO dataset out.
//!
//! The conversion runs in two passes. Pass 1 walks the documents in input
//! order, building one image record per document and one pending annotation
//! per shape while accumulating the universe of category keys. Pass 2
//! freezes the category table (name-sorted, so ids are stable across runs
//! and across data splits) and resolves every pending annotation's raw
//! label into its category id.
//!
//! Identifier discipline:
//! - image ids are the zero-based input order index of the source document;
//! - annotation ids are `1..=A`, global across the corpus, in discovery
//!   order (by document, then by shape order within a document);
//! - category ids are `0..C-1` in sorted-name order.
//!
//! Every record depends only on `(path, index)`, never on state mutated by
//! other documents, so pass 1 could be parallelized without changing any
//! assigned id.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::coco::{
    self, CocoAnnotation, CocoCategory, CocoDataset, CocoImage, CocoInfo,
};
use crate::error::PolycocoError;
use crate::geometry;
use crate::labelme::{self, LabelmeDocument};

/// License id stamped on every image record.
const IMAGE_LICENSE_ID: u32 = 1;

/// Placeholder capture date stamped on every image record. The source
/// corpus does not carry per-image capture dates.
const DATE_CAPTURED: &str = "2019-12-16";

/// An annotation whose geometry is final but whose category is still the
/// raw label key, pending resolution against the finalized category table.
#[derive(Debug)]
struct PendingAnnotation {
    image_id: u64,
    category_key: String,
    segmentation: Vec<f64>,
    area: f64,
    bbox: [f64; 4],
}

/// Accumulates distinct category keys in first-seen order.
#[derive(Debug, Default)]
pub struct CategoryRegistry {
    keys: Vec<String>,
    seen: HashSet<String>,
}

impl CategoryRegistry {
    /// Records a category key, ignoring keys already seen.
    pub fn record(&mut self, key: &str) {
        if self.seen.insert(key.to_string()) {
            self.keys.push(key.to_string());
        }
    }

    /// Freezes the registry into a category table with dense ids
    /// `0..C-1` assigned in sorted-name order.
    ///
    /// Sorting by name, not first-seen order, keeps category ids identical
    /// across repeated runs and across splits of the same corpus processed
    /// independently.
    pub fn finalize(mut self) -> CategoryTable {
        self.keys.sort();
        let ids = self
            .keys
            .into_iter()
            .enumerate()
            .map(|(id, name)| (name, id as u32))
            .collect();
        CategoryTable { ids }
    }
}

/// The frozen name-to-id mapping produced by [`CategoryRegistry::finalize`].
#[derive(Debug)]
pub struct CategoryTable {
    ids: BTreeMap<String, u32>,
}

impl CategoryTable {
    /// Resolves a category key to its id.
    ///
    /// Unreachable for keys that went through [`CategoryRegistry::record`],
    /// but checked anyway: a miss means an internal invariant was broken
    /// and the diagnostic names the label and the known category set.
    pub fn resolve(&self, key: &str) -> Result<u32, PolycocoError> {
        self.ids
            .get(key)
            .copied()
            .ok_or_else(|| PolycocoError::UnknownCategory {
                label: key.to_string(),
                known: self
                    .ids
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// The category records, in id order.
    pub fn categories(&self) -> Vec<CocoCategory> {
        let mut categories: Vec<CocoCategory> = self
            .ids
            .iter()
            .map(|(name, &id)| CocoCategory {
                id,
                name: name.clone(),
                supercategory: name.clone(),
            })
            .collect();
        categories.sort_by_key(|c| c.id);
        categories
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Builds the image record and pending annotations for one document.
///
/// `index` is the document's zero-based position in the input order and
/// becomes the image id. The document's own dimensions are threaded into
/// every geometry call; nothing dimensional survives between documents, so
/// corpora with mixed image sizes are handled correctly.
fn build_image_record(
    path: &Path,
    doc: &LabelmeDocument,
    index: u64,
    registry: &mut CategoryRegistry,
) -> Result<(CocoImage, Vec<PendingAnnotation>), PolycocoError> {
    let (width, height) = doc.image_dimensions(path)?;

    let image = CocoImage {
        id: index,
        width,
        height,
        file_name: doc.file_name().to_string(),
        license: IMAGE_LICENSE_ID,
        date_captured: DATE_CAPTURED.to_string(),
    };

    let mut pending = Vec::with_capacity(doc.shapes.len());
    for shape in &doc.shapes {
        registry.record(shape.category_key());

        let area = geometry::polygon_area(&shape.points);
        let bbox = geometry::polygon_bbox(&shape.points, width, height).map_err(|source| {
            PolycocoError::EmptyMask {
                path: path.to_path_buf(),
                label: shape.label.clone(),
                source,
            }
        })?;

        pending.push(PendingAnnotation {
            image_id: index,
            category_key: shape.category_key().to_string(),
            segmentation: shape.points.iter().flatten().copied().collect(),
            area,
            bbox,
        });
    }

    Ok((image, pending))
}

/// Converts an ordered list of LabelMe documents into one COCO dataset.
pub fn convert_documents(paths: &[PathBuf]) -> Result<CocoDataset, PolycocoError> {
    let mut registry = CategoryRegistry::default();
    let mut images = Vec::with_capacity(paths.len());
    let mut pending = Vec::new();

    for (index, path) in paths.iter().enumerate() {
        debug!("processing {}", path.display());
        let doc = labelme::read_labelme_document(path)?;
        let (image, anns) = build_image_record(path, &doc, index as u64, &mut registry)?;
        images.push(image);
        pending.extend(anns);
    }

    let table = registry.finalize();

    let mut annotations = Vec::with_capacity(pending.len());
    for (idx, ann) in pending.into_iter().enumerate() {
        let category_id = table.resolve(&ann.category_key)?;
        annotations.push(CocoAnnotation {
            id: idx as u64 + 1,
            image_id: ann.image_id,
            category_id,
            segmentation: vec![ann.segmentation],
            area: ann.area,
            bbox: ann.bbox,
            iscrowd: 0,
        });
    }

    Ok(CocoDataset {
        info: CocoInfo::default(),
        images,
        licenses: coco::standard_licenses(),
        categories: table.categories(),
        annotations,
    })
}

/// Converts every `*.json` document directly inside `input` and writes the
/// aggregated dataset to `output`.
pub fn convert_directory(input: &Path, output: &Path) -> Result<(), PolycocoError> {
    let files = labelme::collect_labelme_files(input)?;
    info!(
        "converting {} LabelMe document(s) from {}",
        files.len(),
        input.display()
    );

    // The dataset is built fully in memory before the output file is
    // created, so a failed run never leaves a partial document behind.
    let dataset = convert_documents(&files)?;
    coco::write_coco_json(output, &dataset)?;

    info!("wrote {}", output.display());
    Ok(())
}
