//! Selector vocabulary: projection method, chromosome inclusion, grouping attribute.
//!
//! Strings from the UI or the CLI are parsed into these closed enums at the
//! boundary. Nothing downstream ever sees a raw selector string.

use crate::error::InvalidSelectionError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Dimensionality-reduction method that produced an embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectionMethod {
    #[default]
    Dual,
    Kernel,
}

/// Whether sex-chromosome features were part of the embedding input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeatureSet {
    #[default]
    WholeGenome,
    ExcludeXy,
}

/// Sample attribute used to partition and color points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupingScheme {
    #[default]
    SuperPopulation,
    Population,
    Gender,
}

impl ProjectionMethod {
    pub const ALL: [ProjectionMethod; 2] = [ProjectionMethod::Dual, ProjectionMethod::Kernel];

    /// Wire value used by the viewer
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectionMethod::Dual => "dual",
            ProjectionMethod::Kernel => "kernel",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectionMethod::Dual => "Dual",
            ProjectionMethod::Kernel => "Kernel",
        }
    }
}

impl FeatureSet {
    pub const ALL: [FeatureSet; 2] = [FeatureSet::WholeGenome, FeatureSet::ExcludeXy];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureSet::WholeGenome => "whole-genome",
            FeatureSet::ExcludeXy => "exclude-xy",
        }
    }

    /// Answer to "Include Sex Chromosomes?"
    pub fn label(self) -> &'static str {
        match self {
            FeatureSet::WholeGenome => "Yes",
            FeatureSet::ExcludeXy => "No",
        }
    }
}

impl GroupingScheme {
    pub const ALL: [GroupingScheme; 3] = [
        GroupingScheme::SuperPopulation,
        GroupingScheme::Population,
        GroupingScheme::Gender,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupingScheme::SuperPopulation => "spop",
            GroupingScheme::Population => "pop",
            GroupingScheme::Gender => "gender",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupingScheme::SuperPopulation => "Super Population",
            GroupingScheme::Population => "Population",
            GroupingScheme::Gender => "Gender",
        }
    }
}

impl FromStr for ProjectionMethod {
    type Err = InvalidSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dual" => Ok(ProjectionMethod::Dual),
            "kernel" => Ok(ProjectionMethod::Kernel),
            _ => Err(InvalidSelectionError {
                field: "pca-type",
                value: s.to_string(),
                expected: "dual, kernel",
            }),
        }
    }
}

impl FromStr for FeatureSet {
    type Err = InvalidSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whole-genome" | "all" => Ok(FeatureSet::WholeGenome),
            "exclude-xy" | "autosomes-only" => Ok(FeatureSet::ExcludeXy),
            _ => Err(InvalidSelectionError {
                field: "include-xy",
                value: s.to_string(),
                expected: "whole-genome, all, exclude-xy, autosomes-only",
            }),
        }
    }
}

impl FromStr for GroupingScheme {
    type Err = InvalidSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spop" | "superPopulation" => Ok(GroupingScheme::SuperPopulation),
            "pop" | "population" => Ok(GroupingScheme::Population),
            "gender" => Ok(GroupingScheme::Gender),
            _ => Err(InvalidSelectionError {
                field: "group-by",
                value: s.to_string(),
                expected: "spop, superPopulation, pop, population, gender",
            }),
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(ProjectionMethod, FeatureSet, GroupingScheme);

/// The full selector state: the sole input of the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub method: ProjectionMethod,
    pub features: FeatureSet,
    pub scheme: GroupingScheme,
}

impl Selection {
    pub fn new(method: ProjectionMethod, features: FeatureSet, scheme: GroupingScheme) -> Self {
        Self {
            method,
            features,
            scheme,
        }
    }

    /// Parse raw selector values; `None` falls back to the selector's default
    pub fn parse(
        method: Option<&str>,
        features: Option<&str>,
        scheme: Option<&str>,
    ) -> Result<Self, InvalidSelectionError> {
        Ok(Self::new(
            method.map(str::parse).transpose()?.unwrap_or_default(),
            features.map(str::parse).transpose()?.unwrap_or_default(),
            scheme.map(str::parse).transpose()?.unwrap_or_default(),
        ))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.method, self.features, self.scheme)
    }
}

/// One dropdown as described to the viewer page
#[derive(Debug, Clone, Serialize)]
pub struct SelectorDescription {
    pub id: &'static str,
    pub label: &'static str,
    pub value: &'static str,
    pub options: Vec<SelectorOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectorOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// Describe the three selectors with their options and defaults
pub fn selector_descriptions() -> Vec<SelectorDescription> {
    vec![
        SelectorDescription {
            id: "pca-type",
            label: "PCA Type",
            value: ProjectionMethod::default().as_str(),
            options: ProjectionMethod::ALL
                .iter()
                .map(|m| SelectorOption { label: m.label(), value: m.as_str() })
                .collect(),
        },
        SelectorDescription {
            id: "include-xy",
            label: "Include Sex Chromosomes?",
            value: FeatureSet::default().as_str(),
            options: FeatureSet::ALL
                .iter()
                .map(|f| SelectorOption { label: f.label(), value: f.as_str() })
                .collect(),
        },
        SelectorDescription {
            id: "group-by",
            label: "Group By",
            value: GroupingScheme::default().as_str(),
            options: GroupingScheme::ALL
                .iter()
                .map(|g| SelectorOption { label: g.label(), value: g.as_str() })
                .collect(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_values() {
        let sel = Selection::parse(Some("kernel"), Some("exclude-xy"), Some("pop")).unwrap();
        assert_eq!(
            sel,
            Selection::new(ProjectionMethod::Kernel, FeatureSet::ExcludeXy, GroupingScheme::Population)
        );
    }

    #[test]
    fn test_parse_long_names() {
        let sel = Selection::parse(Some("dual"), Some("autosomes-only"), Some("superPopulation")).unwrap();
        assert_eq!(sel.features, FeatureSet::ExcludeXy);
        assert_eq!(sel.scheme, GroupingScheme::SuperPopulation);
        assert_eq!("all".parse::<FeatureSet>().unwrap(), FeatureSet::WholeGenome);
    }

    #[test]
    fn test_defaults() {
        let sel = Selection::parse(None, None, None).unwrap();
        assert_eq!(sel.to_string(), "dual/whole-genome/spop");
    }

    #[test]
    fn test_unknown_group_rejected() {
        let err = Selection::parse(Some("dual"), Some("all"), Some("country")).unwrap_err();
        assert_eq!(err.field, "group-by");
        assert_eq!(err.value, "country");
    }

    #[test]
    fn test_case_sensitive() {
        assert!("Dual".parse::<ProjectionMethod>().is_err());
        assert!("".parse::<FeatureSet>().is_err());
    }

    #[test]
    fn test_descriptions_roundtrip_through_parser() {
        for desc in selector_descriptions() {
            for opt in &desc.options {
                let ok = match desc.id {
                    "pca-type" => opt.value.parse::<ProjectionMethod>().is_ok(),
                    "include-xy" => opt.value.parse::<FeatureSet>().is_ok(),
                    _ => opt.value.parse::<GroupingScheme>().is_ok(),
                };
                assert!(ok, "{} option {} not parseable", desc.id, opt.value);
            }
        }
    }
}
