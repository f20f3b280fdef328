//! Dataset layout configuration for popscatter
//!
//! Parses YAML files naming the embedding matrices, the sample table and the
//! grouping-scheme lookups. Without a config file the fixed directory layout
//! produced by the offline pipeline is used (see [`DatasetConfig::default_layout`]).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scheme::ColorSpec;
use crate::selection::{FeatureSet, GroupingScheme, ProjectionMethod};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Embedding matrices, one per projection method and feature set
    pub embeddings: EmbeddingsConfig,

    /// Sample metadata table
    pub samples: SampleTableConfig,

    /// Category order, labels and colors per grouping scheme
    pub schemes: SchemesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub dual: FeatureSetPaths,
    pub kernel: FeatureSetPaths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSetPaths {
    /// Embedding computed with sex chromosomes included
    pub whole_genome: PathBuf,
    /// Embedding computed from autosomes only
    pub exclude_xy: PathBuf,
}

/// Sample table location and column names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleTableConfig {
    /// CSV file (optionally .gz); first column is the sample ID
    pub path: PathBuf,

    #[serde(default = "default_super_population_column")]
    pub super_population_column: String,

    #[serde(default = "default_population_column")]
    pub population_column: String,

    #[serde(default = "default_gender_column")]
    pub gender_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemesConfig {
    pub super_population: SchemeConfig,
    pub population: SchemeConfig,
    pub gender: SchemeConfig,
}

/// One grouping scheme. Each lookup is given inline or as a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchemeConfig {
    /// Canonical category order (JSON array when given as a file)
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub categories_file: Option<PathBuf>,

    /// Category -> display label
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
    #[serde(default)]
    pub labels_file: Option<PathBuf>,

    /// Category -> color, as "rgb(r,g,b)", "#rrggbb" or [r, g, b]
    #[serde(default)]
    pub colors: Option<HashMap<String, ColorSpec>>,
    #[serde(default)]
    pub colors_file: Option<PathBuf>,
}

fn default_super_population_column() -> String {
    "Super Population".to_string()
}

fn default_population_column() -> String {
    "Population".to_string()
}

fn default_gender_column() -> String {
    "Gender".to_string()
}

const SUPER_POPULATIONS: [&str; 5] = ["AFR", "AMR", "EAS", "EUR", "SAS"];
const SUPER_POPULATION_COLORS: [&str; 5] = [
    "rgb(220,20,60)",
    "rgb(30,144,255)",
    "rgb(50,205,50)",
    "rgb(255,69,0)",
    "rgb(139,0,139)",
];
const GENDERS: [&str; 2] = ["male", "female"];
const GENDER_LABELS: [&str; 2] = ["Male", "Female"];
const GENDER_COLORS: [&str; 2] = ["rgb(0,191,255)", "rgb(255,99,71)"];

fn zip_map(keys: &[&str], values: &[&str]) -> HashMap<String, String> {
    keys.iter()
        .zip(values)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn zip_colors(keys: &[&str], values: &[&str]) -> HashMap<String, ColorSpec> {
    keys.iter()
        .zip(values)
        .map(|(k, v)| (k.to_string(), ColorSpec::Css(v.to_string())))
        .collect()
}

impl DatasetConfig {
    /// Fixed layout written by the embedding pipeline under `data_dir`
    pub fn default_layout<P: AsRef<Path>>(data_dir: P) -> Self {
        let root = data_dir.as_ref();
        let reduc = root.join("dimReduc");
        let cleaned = root.join("cleaned");

        DatasetConfig {
            embeddings: EmbeddingsConfig {
                dual: FeatureSetPaths {
                    whole_genome: reduc.join("dualPCA").join("embeddedAll.npy"),
                    exclude_xy: reduc.join("dualPCA").join("embeddedNum.npy"),
                },
                kernel: FeatureSetPaths {
                    whole_genome: reduc.join("kernelPCA").join("embeddedAll.npy"),
                    exclude_xy: reduc.join("kernelPCA").join("embeddedNum.npy"),
                },
            },
            samples: SampleTableConfig {
                path: cleaned.join("sampleData.csv"),
                super_population_column: default_super_population_column(),
                population_column: default_population_column(),
                gender_column: default_gender_column(),
            },
            schemes: SchemesConfig {
                super_population: SchemeConfig {
                    categories: Some(SUPER_POPULATIONS.iter().map(|s| s.to_string()).collect()),
                    labels_file: Some(cleaned.join("spop2descrip.json")),
                    colors: Some(zip_colors(&SUPER_POPULATIONS, &SUPER_POPULATION_COLORS)),
                    ..Default::default()
                },
                population: SchemeConfig {
                    categories_file: Some(cleaned.join("pops.json")),
                    labels_file: Some(cleaned.join("pop2descrip.json")),
                    colors_file: Some(cleaned.join("pop2rgb.json")),
                    ..Default::default()
                },
                gender: SchemeConfig {
                    categories: Some(GENDERS.iter().map(|s| s.to_string()).collect()),
                    labels: Some(zip_map(&GENDERS, &GENDER_LABELS)),
                    colors: Some(zip_colors(&GENDERS, &GENDER_COLORS)),
                    ..Default::default()
                },
            },
        }
    }

    /// Load configuration from YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: DatasetConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_relative_to(base);
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for scheme in GroupingScheme::ALL {
            let cfg = self.scheme(scheme);
            let name = scheme.as_str();
            check_one_of(name, "categories", cfg.categories.is_some(), cfg.categories_file.is_some())?;
            check_one_of(name, "labels", cfg.labels.is_some(), cfg.labels_file.is_some())?;
            check_one_of(name, "colors", cfg.colors.is_some(), cfg.colors_file.is_some())?;
        }
        Ok(())
    }

    /// Make every relative path relative to `base` instead of the working directory
    fn resolve_relative_to(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        fix(&mut self.embeddings.dual.whole_genome);
        fix(&mut self.embeddings.dual.exclude_xy);
        fix(&mut self.embeddings.kernel.whole_genome);
        fix(&mut self.embeddings.kernel.exclude_xy);
        fix(&mut self.samples.path);
        for scheme in [
            &mut self.schemes.super_population,
            &mut self.schemes.population,
            &mut self.schemes.gender,
        ] {
            for p in [&mut scheme.categories_file, &mut scheme.labels_file, &mut scheme.colors_file]
                .into_iter()
                .flatten()
            {
                fix(p);
            }
        }
    }

    /// Path of the embedding matrix for a projection method and feature set
    pub fn embedding_path(&self, method: ProjectionMethod, features: FeatureSet) -> &Path {
        let paths = match method {
            ProjectionMethod::Dual => &self.embeddings.dual,
            ProjectionMethod::Kernel => &self.embeddings.kernel,
        };
        match features {
            FeatureSet::WholeGenome => &paths.whole_genome,
            FeatureSet::ExcludeXy => &paths.exclude_xy,
        }
    }

    pub fn scheme(&self, scheme: GroupingScheme) -> &SchemeConfig {
        match scheme {
            GroupingScheme::SuperPopulation => &self.schemes.super_population,
            GroupingScheme::Population => &self.schemes.population,
            GroupingScheme::Gender => &self.schemes.gender,
        }
    }

    /// Sample-table column holding the scheme's category codes
    pub fn column(&self, scheme: GroupingScheme) -> &str {
        match scheme {
            GroupingScheme::SuperPopulation => &self.samples.super_population_column,
            GroupingScheme::Population => &self.samples.population_column,
            GroupingScheme::Gender => &self.samples.gender_column,
        }
    }
}

fn check_one_of(scheme: &str, what: &str, inline: bool, file: bool) -> Result<()> {
    match (inline, file) {
        (true, true) => anyhow::bail!(
            "Scheme '{}': give either '{}' or '{}_file', not both",
            scheme,
            what,
            what
        ),
        (false, false) => anyhow::bail!(
            "Scheme '{}': missing '{}' (inline or '{}_file')",
            scheme,
            what,
            what
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r##"
embeddings:
  dual:
    whole_genome: dual_all.csv
    exclude_xy: /abs/dual_num.csv
  kernel:
    whole_genome: kernel_all.csv
    exclude_xy: kernel_num.csv
samples:
  path: samples.csv
schemes:
  super_population:
    categories: [AFR, EUR]
    labels: {AFR: Africa, EUR: Europe}
    colors: {AFR: "rgb(220,20,60)", EUR: "#ff4500"}
  population:
    categories_file: pops.json
    labels_file: pop2descrip.json
    colors_file: pop2rgb.json
  gender:
    categories: [male, female]
    labels: {male: Male, female: Female}
    colors: {male: [0, 191, 255], female: "rgb(255,99,71)"}
"##;

    #[test]
    fn test_parse_yaml() {
        let config: DatasetConfig = serde_yaml::from_str(YAML).unwrap();
        assert_eq!(config.samples.super_population_column, "Super Population");
        assert_eq!(config.column(GroupingScheme::Gender), "Gender");
        assert_eq!(
            config.embedding_path(ProjectionMethod::Kernel, FeatureSet::ExcludeXy),
            Path::new("kernel_num.csv")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_relative_paths_follow_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.yaml");
        std::fs::File::create(&path).unwrap().write_all(YAML.as_bytes()).unwrap();

        let config = DatasetConfig::from_yaml(&path).unwrap();
        assert_eq!(config.samples.path, dir.path().join("samples.csv"));
        assert_eq!(config.embeddings.dual.exclude_xy, PathBuf::from("/abs/dual_num.csv"));
        assert_eq!(
            config.schemes.population.colors_file.as_deref(),
            Some(dir.path().join("pop2rgb.json").as_path())
        );
    }

    #[test]
    fn test_both_inline_and_file_rejected() {
        let mut config: DatasetConfig = serde_yaml::from_str(YAML).unwrap();
        config.schemes.gender.labels_file = Some(PathBuf::from("g.json"));
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("not both"), "{}", err);
    }

    #[test]
    fn test_default_layout() {
        let config = DatasetConfig::default_layout("data");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.embedding_path(ProjectionMethod::Dual, FeatureSet::ExcludeXy),
            Path::new("data/dimReduc/dualPCA/embeddedNum.npy")
        );
        assert_eq!(
            config.schemes.super_population.categories.as_deref().unwrap(),
            ["AFR", "AMR", "EAS", "EUR", "SAS"]
        );
    }
}
