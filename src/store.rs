//! Read-only dataset store
//!
//! Holds the four embeddings, the sample table and the three grouping
//! schemes. Everything is checked once at construction:
//! - every embedding has exactly one row per sample
//! - every category value in the sample table is declared by its scheme
//!   and has a label and a color
//!
//! After that the store is never mutated and can be shared freely.

use crate::config::DatasetConfig;
use crate::embedding::Embedding;
use crate::error::DataLoadError;
use crate::samples::SampleTable;
use crate::scheme::Scheme;
use crate::selection::{FeatureSet, GroupingScheme, ProjectionMethod};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct DatasetStore {
    dual_all: Embedding,
    dual_num: Embedding,
    kernel_all: Embedding,
    kernel_num: Embedding,
    samples: SampleTable,
    super_population: Scheme,
    population: Scheme,
    gender: Scheme,
}

/// Parts of a store before validation
pub struct StoreParts {
    pub dual_all: Embedding,
    pub dual_num: Embedding,
    pub kernel_all: Embedding,
    pub kernel_num: Embedding,
    pub samples: SampleTable,
    pub super_population: Scheme,
    pub population: Scheme,
    pub gender: Scheme,
}

impl DatasetStore {
    /// Load every input named by the config and validate alignment and coverage
    pub fn load(config: &DatasetConfig) -> Result<Self, DataLoadError> {
        let samples = SampleTable::load(&config.samples)?;

        let embedding = |m: ProjectionMethod, f: FeatureSet| Embedding::load(config.embedding_path(m, f));
        let scheme = |s: GroupingScheme| Scheme::load(s, config.scheme(s));

        Self::from_parts(StoreParts {
            dual_all: embedding(ProjectionMethod::Dual, FeatureSet::WholeGenome)?,
            dual_num: embedding(ProjectionMethod::Dual, FeatureSet::ExcludeXy)?,
            kernel_all: embedding(ProjectionMethod::Kernel, FeatureSet::WholeGenome)?,
            kernel_num: embedding(ProjectionMethod::Kernel, FeatureSet::ExcludeXy)?,
            samples,
            super_population: scheme(GroupingScheme::SuperPopulation)?,
            population: scheme(GroupingScheme::Population)?,
            gender: scheme(GroupingScheme::Gender)?,
        })
    }

    /// Assemble a store from already-loaded parts, applying the same checks as `load`
    pub fn from_parts(parts: StoreParts) -> Result<Self, DataLoadError> {
        let store = DatasetStore {
            dual_all: parts.dual_all,
            dual_num: parts.dual_num,
            kernel_all: parts.kernel_all,
            kernel_num: parts.kernel_num,
            samples: parts.samples,
            super_population: parts.super_population,
            population: parts.population,
            gender: parts.gender,
        };
        store.check_alignment()?;
        store.check_coverage()?;
        Ok(store)
    }

    fn check_alignment(&self) -> Result<(), DataLoadError> {
        let expected = self.samples.len();
        for e in [&self.dual_all, &self.dual_num, &self.kernel_all, &self.kernel_num] {
            if e.len() != expected {
                return Err(DataLoadError::RowCountMismatch {
                    path: e.path.clone(),
                    rows: e.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    fn check_coverage(&self) -> Result<(), DataLoadError> {
        for kind in GroupingScheme::ALL {
            let scheme = self.scheme(kind);
            for sample in &self.samples.samples {
                let value = sample.category(kind);
                if !scheme.contains(value) {
                    return Err(DataLoadError::UnknownCategory {
                        scheme: kind.as_str().to_string(),
                        sample: sample.id.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn embedding(&self, method: ProjectionMethod, features: FeatureSet) -> &Embedding {
        match (method, features) {
            (ProjectionMethod::Dual, FeatureSet::WholeGenome) => &self.dual_all,
            (ProjectionMethod::Dual, FeatureSet::ExcludeXy) => &self.dual_num,
            (ProjectionMethod::Kernel, FeatureSet::WholeGenome) => &self.kernel_all,
            (ProjectionMethod::Kernel, FeatureSet::ExcludeXy) => &self.kernel_num,
        }
    }

    pub fn scheme(&self, kind: GroupingScheme) -> &Scheme {
        match kind {
            GroupingScheme::SuperPopulation => &self.super_population,
            GroupingScheme::Population => &self.population,
            GroupingScheme::Gender => &self.gender,
        }
    }

    pub fn samples(&self) -> &SampleTable {
        &self.samples
    }

    /// Sample counts per category for every scheme
    pub fn summary(&self) -> StoreSummary {
        let schemes = GroupingScheme::ALL
            .iter()
            .map(|&kind| {
                let scheme = self.scheme(kind);
                let groups = scheme
                    .categories
                    .iter()
                    .map(|c| GroupCount {
                        category: c.code.clone(),
                        label: c.label.clone(),
                        count: self.samples.column(kind).filter(|v| *v == c.code).count(),
                    })
                    .collect();
                SchemeSummary {
                    scheme: kind.as_str(),
                    groups,
                }
            })
            .collect();

        StoreSummary {
            total_samples: self.samples.len(),
            schemes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub total_samples: usize,
    pub schemes: Vec<SchemeSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemeSummary {
    pub scheme: &'static str,
    pub groups: Vec<GroupCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupCount {
    pub category: String,
    pub label: String,
    pub count: usize,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::samples::Sample;
    use crate::scheme::Color;
    use std::collections::HashMap;

    fn sample(id: &str, spop: &str, pop: &str, gender: &str) -> Sample {
        Sample {
            id: id.into(),
            super_population: spop.into(),
            population: pop.into(),
            gender: gender.into(),
        }
    }

    fn scheme(kind: GroupingScheme, entries: &[(&str, &str, Color)]) -> Scheme {
        Scheme::new(
            kind,
            "mem",
            entries.iter().map(|(c, _, _)| c.to_string()).collect(),
            &entries.iter().map(|(c, l, _)| (c.to_string(), l.to_string())).collect(),
            &entries.iter().map(|(c, _, col)| (c.to_string(), *col)).collect(),
        )
        .unwrap()
    }

    pub(crate) const AFR_COLOR: Color = Color::rgb(220, 20, 60);
    pub(crate) const EUR_COLOR: Color = Color::rgb(255, 69, 0);

    /// Three samples: 0 and 1 are EUR, 2 is AFR
    pub(crate) fn fixture_parts() -> StoreParts {
        let pts = |k: f64| -> Embedding {
            Embedding::from_points("mem", &[[0.0, 0.0, 0.0], [k, k, k], [2.0 * k, 2.0 * k, 2.0 * k]]).unwrap()
        };
        StoreParts {
            dual_all: pts(1.0),
            dual_num: pts(10.0),
            kernel_all: pts(100.0),
            kernel_num: pts(1000.0),
            samples: SampleTable::from_samples(vec![
                    sample("HG00096", "EUR", "GBR", "male"),
                    sample("HG00097", "EUR", "GBR", "female"),
                    sample("NA18486", "AFR", "YRI", "male"),
                ],
            ),
            super_population: scheme(
                GroupingScheme::SuperPopulation,
                &[
                    ("AFR", "Africa", AFR_COLOR),
                    ("AMR", "America", Color::rgb(30, 144, 255)),
                    ("EAS", "East Asia", Color::rgb(50, 205, 50)),
                    ("EUR", "Europe", EUR_COLOR),
                    ("SAS", "South Asia", Color::rgb(139, 0, 139)),
                ],
            ),
            population: scheme(
                GroupingScheme::Population,
                &[
                    ("YRI", "Yoruba in Ibadan, Nigeria", Color::rgb(1, 1, 1)),
                    ("GBR", "British in England and Scotland", Color::rgb(2, 2, 2)),
                ],
            ),
            gender: scheme(
                GroupingScheme::Gender,
                &[
                    ("male", "Male", Color::rgb(0, 191, 255)),
                    ("female", "Female", Color::rgb(255, 99, 71)),
                ],
            ),
        }
    }

    pub(crate) fn fixture_store() -> DatasetStore {
        DatasetStore::from_parts(fixture_parts()).unwrap()
    }

    #[test]
    fn test_row_alignment_holds() {
        let store = fixture_store();
        for m in ProjectionMethod::ALL {
            for f in FeatureSet::ALL {
                assert_eq!(store.embedding(m, f).len(), store.samples().len());
            }
        }
    }

    #[test]
    fn test_row_mismatch_rejected() {
        let mut parts = fixture_parts();
        parts.kernel_num = Embedding::from_points("kernelNum", &[[0.0, 0.0, 0.0]]).unwrap();
        let err = DatasetStore::from_parts(parts).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::RowCountMismatch { rows: 1, expected: 3, .. }
        ));
    }

    #[test]
    fn test_undeclared_category_rejected() {
        let mut parts = fixture_parts();
        parts.samples.samples[1].population = "CEU".into();
        match DatasetStore::from_parts(parts).unwrap_err() {
            DataLoadError::UnknownCategory { scheme, sample, value } => {
                assert_eq!(scheme, "pop");
                assert_eq!(sample, "HG00097");
                assert_eq!(value, "CEU");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_coverage_invariant() {
        let store = fixture_store();
        for kind in GroupingScheme::ALL {
            let scheme = store.scheme(kind);
            for value in store.samples().column(kind) {
                let category = scheme.get(value).expect("declared category");
                assert!(!category.label.is_empty());
            }
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = fixture_store().summary();
        assert_eq!(summary.total_samples, 3);
        let spop = &summary.schemes[0];
        assert_eq!(spop.scheme, "spop");
        let counts: HashMap<&str, usize> =
            spop.groups.iter().map(|g| (g.category.as_str(), g.count)).collect();
        assert_eq!(counts["EUR"], 2);
        assert_eq!(counts["AFR"], 1);
        assert_eq!(counts["SAS"], 0);
    }

    /// Write a two-sample dataset in the standard directory layout
    fn write_default_layout(root: &std::path::Path) -> DatasetConfig {
        let config = DatasetConfig::default_layout(root);

        for m in ProjectionMethod::ALL {
            for f in FeatureSet::ALL {
                let path = config.embedding_path(m, f);
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                let arr = ndarray::array![[0.0, 0.0, 0.0, 4.0], [1.0, 1.0, 1.0, 4.0]];
                ndarray_npy::write_npy(path, &arr).unwrap();
            }
        }
        let cleaned = root.join("cleaned");
        std::fs::create_dir_all(&cleaned).unwrap();
        std::fs::write(
            cleaned.join("sampleData.csv"),
            ",Population,Gender,Super Population\nHG00096,GBR,male,EUR\nNA18486,YRI,female,AFR\n",
        )
        .unwrap();
        std::fs::write(
            cleaned.join("spop2descrip.json"),
            r#"{"AFR": "Africa", "AMR": "America", "EAS": "East Asia", "EUR": "Europe", "SAS": "South Asia"}"#,
        )
        .unwrap();
        std::fs::write(cleaned.join("pops.json"), r#"["GBR", "YRI"]"#).unwrap();
        std::fs::write(
            cleaned.join("pop2descrip.json"),
            r#"{"GBR": "British", "YRI": "Yoruba"}"#,
        )
        .unwrap();
        std::fs::write(
            cleaned.join("pop2rgb.json"),
            r#"{"GBR": "rgb(0,0,255)", "YRI": "rgb(255,0,0)"}"#,
        )
        .unwrap();
        config
    }

    #[test]
    fn test_load_from_default_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_default_layout(dir.path());
        let cleaned = dir.path().join("cleaned");

        let store = DatasetStore::load(&config).unwrap();
        assert_eq!(store.samples().len(), 2);
        assert_eq!(
            store.embedding(ProjectionMethod::Kernel, FeatureSet::ExcludeXy).point(1),
            [1.0, 1.0, 1.0]
        );
        assert_eq!(
            store.scheme(GroupingScheme::SuperPopulation).get("EUR").unwrap().label,
            "Europe"
        );

        // Drop one input: the store must refuse to load
        std::fs::remove_file(cleaned.join("pop2rgb.json")).unwrap();
        assert!(matches!(DatasetStore::load(&config), Err(DataLoadError::Missing(_))));
    }

    #[test]
    fn test_missing_label_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_default_layout(dir.path());
        std::fs::write(
            dir.path().join("cleaned").join("pop2descrip.json"),
            r#"{"GBR": "British"}"#,
        )
        .unwrap();

        match DatasetStore::load(&config).unwrap_err() {
            DataLoadError::MissingLabel { scheme, category } => {
                assert_eq!(scheme, "pop");
                assert_eq!(category, "YRI");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_duplicate_category_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_default_layout(dir.path());
        std::fs::write(dir.path().join("cleaned").join("pops.json"), r#"["GBR", "YRI", "GBR"]"#).unwrap();

        assert!(matches!(DatasetStore::load(&config), Err(DataLoadError::Malformed { .. })));
    }
}
