//! Sample metadata table

use crate::config::SampleTableConfig;
use crate::embedding::open_input;
use crate::error::DataLoadError;
use crate::selection::GroupingScheme;

/// One genomic sample. Its row index is its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: String,
    pub super_population: String,
    pub population: String,
    pub gender: String,
}

impl Sample {
    /// Category code of this sample under a grouping scheme
    pub fn category(&self, scheme: GroupingScheme) -> &str {
        match scheme {
            GroupingScheme::SuperPopulation => &self.super_population,
            GroupingScheme::Population => &self.population,
            GroupingScheme::Gender => &self.gender,
        }
    }
}

/// All samples, in file order
#[derive(Debug, Clone)]
pub struct SampleTable {
    pub samples: Vec<Sample>,
}

impl SampleTable {
    /// Load the CSV; the first column is the sample index, grouping columns are found by header
    pub fn load(cfg: &SampleTableConfig) -> Result<Self, DataLoadError> {
        let path = cfg.path.as_path();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(open_input(path)?);

        let headers = reader
            .headers()
            .map_err(|e| DataLoadError::malformed(path, e.to_string()))?
            .clone();

        let find = |name: &str| -> Result<usize, DataLoadError> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataLoadError::malformed(path, format!("missing column '{}'", name)))
        };
        let spop_col = find(cfg.super_population_column.as_str())?;
        let pop_col = find(cfg.population_column.as_str())?;
        let gender_col = find(cfg.gender_column.as_str())?;

        let mut samples = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| DataLoadError::malformed(path, e.to_string()))?;
            let field = |col: usize| record.get(col).unwrap_or("").to_string();
            let id = match record.get(0) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => i.to_string(),
            };
            samples.push(Sample {
                id,
                super_population: field(spop_col),
                population: field(pop_col),
                gender: field(gender_col),
            });
        }

        log::info!("Loaded sample table {} ({} samples)", path.display(), samples.len());

        Ok(SampleTable { samples })
    }

    #[cfg(test)]
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        SampleTable { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Category column for a scheme, positionally aligned with the embeddings
    pub fn column(&self, scheme: GroupingScheme) -> impl Iterator<Item = &str> + '_ {
        self.samples.iter().map(move |s| s.category(scheme))
    }
}
