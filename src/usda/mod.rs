//! `.usda` text encoding of layers.
//!
//! ## Layout
//!
//! ```text
//! #usda 1.0
//! (
//!     startTimeCode = 1
//!     endTimeCode = 31
//! )
//!
//! def Scope "lights"
//! {
//!     def RectLight "rect_light"
//!     {
//!         float inputs:intensity.timeSamples = {
//!             1: 1,
//!             11: 1000,
//!         }
//!     }
//! }
//! ```
//!
//! [`parse`] and [`serialize`] round-trip each other:
//! `parse(&serialize(&layer)) == layer`, and serializing a reparsed layer
//! reproduces the same text.

mod lexer;
mod parser;
mod writer;
mod format;

pub use parser::parse;
pub use writer::serialize;
pub use format::{fmt_f32, fmt_f64, fmt_value, quote};

use crate::layer::Layer;
use crate::util::{Error, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File extension of text layers.
pub const USDA_EXTENSION: &str = "usda";

/// Read and parse a layer file. Errors carry the file path.
pub fn read_layer(path: impl AsRef<Path>) -> Result<Layer> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading layer");
    let text = std::fs::read_to_string(path).map_err(|e| Error::from(e).in_file(path))?;
    parse(&text).map_err(|e| e.in_file(path))
}

/// Serialize a layer and write it to `path`.
pub fn write_layer(path: impl AsRef<Path>, layer: &Layer) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), "writing layer");
    std::fs::write(path, serialize(layer)).map_err(|e| Error::from(e).in_file(path))
}

/// Read many layers in parallel, one task per file.
///
/// Results come back in input order.
pub fn read_layers<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<Result<Layer>> {
    info!(count = paths.len(), "reading layers");
    paths.par_iter().map(read_layer).collect()
}

/// Collect `.usda` files at `path`.
///
/// A file is returned as-is; a directory is scanned (recursively when
/// `recurse` is set). Results are sorted.
pub fn find_layers(path: impl AsRef<Path>, recurse: bool) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(Error::other(format!("not a file or directory: {}", path.display())));
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(path).map_err(|e| Error::from(e).in_file(path))? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            if recurse {
                found.extend(find_layers(&entry_path, true)?);
            }
        } else if entry_path.extension().is_some_and(|ext| ext == USDA_EXTENSION) {
            found.push(entry_path);
        }
    }
    found.sort();
    Ok(found)
}
