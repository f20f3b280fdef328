//! Plotly figure payload for the 3D scatter surface

use crate::resolve::PointGroup;
use crate::scheme::Color;
use crate::selection::Selection;
use serde::Serialize;

const MARKER_SIZE: f64 = 5.0;
const MARKER_OPACITY: f64 = 0.5;

/// `{data, layout}` as consumed by `Plotly.react`
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub marker: Marker,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub size: f64,
    pub opacity: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub margin: Margin,
    pub legend: Legend,
    /// Keeps camera and legend toggles when the selection changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uirevision: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub b: u32,
    pub t: u32,
    pub r: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            margin: Margin { l: 0, b: 0, t: 0, r: 0 },
            legend: Legend { x: 0.0, y: 1.0 },
            uirevision: None,
        }
    }
}

impl From<&PointGroup> for Trace {
    fn from(group: &PointGroup) -> Self {
        let axis = |k: usize| group.points.iter().map(|p| p[k]).collect::<Vec<f64>>();
        Trace {
            kind: "scatter3d",
            mode: "markers",
            name: group.label.clone(),
            x: axis(0),
            y: axis(1),
            z: axis(2),
            marker: Marker {
                size: MARKER_SIZE,
                opacity: MARKER_OPACITY,
                color: group.color,
            },
        }
    }
}

impl Figure {
    /// One trace per group, in group order
    pub fn from_groups(groups: &[PointGroup]) -> Self {
        Figure {
            data: groups.iter().map(Trace::from).collect(),
            layout: Layout::default(),
        }
    }

    /// Figure for a selection; the camera is kept while only the grouping changes
    pub fn for_selection(selection: Selection, groups: &[PointGroup]) -> Self {
        let mut figure = Self::from_groups(groups);
        figure.layout.uirevision = Some(format!("{}/{}", selection.method, selection.features));
        figure
    }
}
