#![allow(dead_code)]

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Minimal 24-bit BMP byte stream with the given dimensions. Enough for
/// header-based dimension probing without an image codec.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

/// Base64-encoded BMP payload, as LabelMe embeds it.
pub fn bmp_payload(width: u32, height: u32) -> String {
    STANDARD.encode(bmp_bytes(width, height))
}

/// One labeled polygon for [`labelme_json`].
pub struct ShapeFixture {
    pub label: &'static str,
    pub points: Vec<[f64; 2]>,
}

pub fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Vec<[f64; 2]> {
    vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h]]
}

pub fn triangle(x: f64, y: f64, size: f64) -> Vec<[f64; 2]> {
    vec![[x, y], [x + size, y], [x, y + size]]
}

/// Renders a LabelMe document with an embedded BMP of the given size.
pub fn labelme_json(image_path: &str, width: u32, height: u32, shapes: &[ShapeFixture]) -> String {
    let shapes_json: Vec<serde_json::Value> = shapes
        .iter()
        .map(|shape| {
            serde_json::json!({
                "label": shape.label,
                "points": shape.points,
                "shape_type": "polygon",
            })
        })
        .collect();

    serde_json::to_string_pretty(&serde_json::json!({
        "version": "5.0.1",
        "flags": {},
        "imagePath": image_path,
        "imageData": bmp_payload(width, height),
        "shapes": shapes_json,
    }))
    .expect("render labelme fixture")
}

/// Writes a LabelMe document fixture to disk.
pub fn write_labelme(
    path: &Path,
    image_path: &str,
    width: u32,
    height: u32,
    shapes: &[ShapeFixture],
) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, labelme_json(image_path, width, height, shapes)).expect("write labelme file");
}
