//! Selection resolver: partition one embedding by one grouping attribute

use crate::scheme::Color;
use crate::selection::Selection;
use crate::store::DatasetStore;
use serde::Serialize;

/// One labeled, colored set of points: a single legend entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGroup {
    pub category: String,
    pub label: String,
    pub color: Color,
    pub points: Vec<[f64; 3]>,
}

/// Partition the selected embedding by the selected scheme.
///
/// Groups follow the scheme's canonical category order. Categories with no
/// samples still produce an (empty) group so the legend is stable across
/// selections. Within a group points keep their sample-table order.
pub fn resolve(store: &DatasetStore, selection: Selection) -> Vec<PointGroup> {
    let embedding = store.embedding(selection.method, selection.features);
    let scheme = store.scheme(selection.scheme);
    let values: Vec<&str> = store.samples().column(selection.scheme).collect();

    scheme
        .categories
        .iter()
        .map(|category| {
            let points = values
                .iter()
                .enumerate()
                .filter(|(_, v)| **v == category.code)
                .map(|(i, _)| embedding.point(i))
                .collect();
            PointGroup {
                category: category.code.clone(),
                label: category.label.clone(),
                color: category.color,
                points,
            }
        })
        .collect()
}
