//! # Configuration document model
//!
//! The input representation for the report builder. A configuration document
//! describes sections, their declared pages, and the layout tree of data-bound
//! widgets each page carries. It is designed to be produced by an upload form,
//! a visual editor, or direct JSON construction.
//!
//! The model mirrors the wire format: attribute blocks live under
//! `"@attributes"`, and the layout tree is the closed recursive union
//! `{row} | {col} | {components}`. Shape errors surface at decode time; the
//! data-pipeline instruction lists (`filters`/`inserts`/`transforms`) stay raw
//! JSON values here and are checked when a [`crate::data::DataSlice`] is
//! built, so a missing key is reported as a malformed spec rather than a
//! parse failure of the whole document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One flat record of the raw tabular data.
pub type Record = Map<String, Value>;

/// A complete configuration document ready for building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDoc {
    /// Top-level report attributes.
    #[serde(rename = "@attributes", default)]
    pub attributes: ReportAttributes,

    /// Pipeline specs for the raw data slice. Only the first entry is
    /// consulted; the raw slice is always index 0.
    #[serde(default)]
    pub data: Vec<DataSliceSpec>,

    /// Declared sections, in display order.
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

/// Report attributes: identity, authorship, and the optional date field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAttributes {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Record field holding a date value. When set, every record's value at
    /// this field is canonicalized and the report period is derived from it.
    #[serde(default)]
    pub date_field: Option<String>,
}

/// A declared section: a titled group of pages sharing one data scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    #[serde(rename = "@attributes")]
    pub attributes: SectionAttributes,

    /// Pipeline specs deriving this section's data slices from the raw slice.
    /// Empty means the raw data passes through unchanged.
    #[serde(default)]
    pub data: Vec<DataSliceSpec>,

    /// Declared page templates. One declared page may expand into several
    /// physical pages when a widget on it requires chunking.
    #[serde(default)]
    pub pages: Vec<PageSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionAttributes {
    pub id: String,
    pub title: String,
}

/// A declared page template: size, layout, and a content tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(rename = "@attributes", default)]
    pub attributes: PageAttributes,

    /// Root layout nodes of the page content.
    #[serde(default)]
    pub content: Vec<LayoutNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageAttributes {
    #[serde(default)]
    pub size: Option<PageSize>,
    #[serde(default)]
    pub layout: Option<Orientation>,
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PageSize {
    /// Returns (width, height) in points, portrait orientation.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// One node of the recursive page content tree.
///
/// Externally tagged, so the wire form is exactly `{"row": [...]}`,
/// `{"col": [...]}` or `{"components": [...]}`. Any other shape is rejected
/// at decode time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LayoutNode {
    #[serde(rename = "row")]
    Row(Vec<LayoutNode>),
    #[serde(rename = "col")]
    Col(Vec<LayoutNode>),
    #[serde(rename = "components")]
    Components(Vec<ComponentSpec>),
}

/// A configured widget instance inside a `components` leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(rename = "@attributes")]
    pub attributes: ComponentAttributes,

    #[serde(default)]
    pub props: ComponentProps,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentAttributes {
    /// Declared widget kind name; must resolve in the widget registry.
    pub name: String,
}

/// Component properties: the data binding plus opaque renderer props.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentProps {
    /// Pipeline specs deriving this component's data slices from the section
    /// data.
    #[serde(rename = "dataSource", default)]
    pub data_source: Vec<DataSliceSpec>,

    /// Everything else (column definitions, captions, thresholds, ...) is
    /// carried through untouched for the rendering layer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The declarative description of one data slice: presentation attributes
/// plus the transformation pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSliceSpec {
    #[serde(rename = "@attributes", default)]
    pub attributes: SliceAttributes,

    /// Filter instructions `{field, operator, value}`. Checked at slice
    /// construction.
    #[serde(default)]
    pub filters: Vec<Value>,

    /// Insert instructions `{name, field, operator, value}`.
    #[serde(default)]
    pub inserts: Vec<Value>,

    /// Transform instructions `{field, operator, value, conditions?}`.
    #[serde(default)]
    pub transforms: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceAttributes {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Index of the parent slice this one derives from. Defaults to 0, the
    /// raw slice.
    #[serde(default)]
    pub data_index: Option<usize>,
    #[serde(default)]
    pub chunk_number: Option<usize>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
}
