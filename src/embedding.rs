//! Precomputed 3D embedding matrices
//!
//! Matrices come from the offline PCA / kernel-PCA step either as NumPy `.npy`
//! files or as delimited text (`.csv`, `.tsv`, optionally gzipped). Only the
//! first three columns are kept.

use crate::error::DataLoadError;
use flate2::read::GzDecoder;
use ndarray::{s, Array2};
use ndarray_npy::ReadNpyExt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// One dense (samples x 3) coordinate table
#[derive(Debug, Clone)]
pub struct Embedding {
    /// Source file, kept for error messages
    pub path: PathBuf,
    coords: Array2<f64>,
}

impl Embedding {
    /// Load an embedding, picking the reader from the file extension
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let name = path.to_string_lossy().to_ascii_lowercase();
        let matrix = if name.ends_with(".npy") {
            read_npy_matrix(path)?
        } else {
            let delimiter = if name.ends_with(".tsv") || name.ends_with(".tsv.gz") {
                b'\t'
            } else {
                b','
            };
            read_text_matrix(path, delimiter)?
        };

        let embedding = Self::from_matrix(path, matrix)?;
        log::info!(
            "Loaded embedding {} ({} samples)",
            path.display(),
            embedding.len()
        );
        Ok(embedding)
    }

    /// Wrap an in-memory matrix; needs at least 3 finite columns
    pub fn from_matrix(path: impl Into<PathBuf>, matrix: Array2<f64>) -> Result<Self, DataLoadError> {
        let path = path.into();
        if matrix.ncols() < 3 {
            return Err(DataLoadError::TooFewColumns {
                path,
                cols: matrix.ncols(),
            });
        }
        let coords = matrix.slice(s![.., 0..3]).to_owned();
        if let Some(((row, col), v)) = coords.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(DataLoadError::malformed(
                path,
                format!("non-finite value {} at row {}, column {}", v, row, col),
            ));
        }
        Ok(Self { path, coords })
    }

    /// Build from explicit points
    #[cfg(test)]
    pub fn from_points(path: impl Into<PathBuf>, points: &[[f64; 3]]) -> Result<Self, DataLoadError> {
        let path = path.into();
        let flat: Vec<f64> = points.iter().flatten().copied().collect();
        let matrix = Array2::from_shape_vec((points.len(), 3), flat)
            .map_err(|e| DataLoadError::malformed(&path, e.to_string()))?;
        Self::from_matrix(path, matrix)
    }

    /// Number of rows (samples)
    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    /// Coordinates of the sample at row `i`
    pub fn point(&self, i: usize) -> [f64; 3] {
        let row = self.coords.row(i);
        [row[0], row[1], row[2]]
    }
}

/// Open a file for reading, transparently decompressing `.gz`
pub(crate) fn open_input(path: &Path) -> Result<Box<dyn Read>, DataLoadError> {
    let file = File::open(path).map_err(|e| DataLoadError::io(path, e))?;
    let is_gzip = path.extension().map(|e| e == "gz").unwrap_or(false);
    if is_gzip {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn read_npy_matrix(path: &Path) -> Result<Array2<f64>, DataLoadError> {
    let file = File::open(path).map_err(|e| DataLoadError::io(path, e))?;
    match Array2::<f64>::read_npy(BufReader::new(file)) {
        Ok(m) => Ok(m),
        Err(f64_err) => {
            // Older pipeline runs saved single precision
            let file = File::open(path).map_err(|e| DataLoadError::io(path, e))?;
            Array2::<f32>::read_npy(BufReader::new(file))
                .map(|m| m.mapv(f64::from))
                .map_err(|_| DataLoadError::malformed(path, f64_err.to_string()))
        }
    }
}

fn read_text_matrix(path: &Path, delimiter: u8) -> Result<Array2<f64>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(open_input(path)?);

    let mut data = Vec::new();
    let mut rows = 0usize;
    let mut cols = 0usize;

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DataLoadError::malformed(path, e.to_string()))?;
        if i == 0 {
            cols = record.len();
        }
        for field in record.iter() {
            let v: f64 = field.parse().map_err(|_| {
                DataLoadError::malformed(path, format!("row {}: '{}' is not a number", i + 1, field))
            })?;
            data.push(v);
        }
        rows += 1;
    }

    Array2::from_shape_vec((rows, cols), data).map_err(|e| DataLoadError::malformed(path, e.to_string()))
}
