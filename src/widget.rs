//! # Widget registry and live components
//!
//! The rendering layer supplies the registry: a mapping from declared widget
//! names to a closed [`WidgetKind`] plus an optional fixed chunk size. The
//! core consumes it read-only — resolving a component's `name` attribute, and
//! using the chunk size to decide when a declared page must split into
//! several physical pages.
//!
//! A [`Component`] is a live widget instance, created when a page's content
//! tree is realized. On a chunked page, a component whose kind chunks
//! re-targets its data slices to the page's chunk window.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::data::DataSlice;
use crate::error::ReportError;
use crate::page::ChunkInfo;

/// The closed set of widget kinds the report renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetKind {
    /// The synthetic first page: main title, table of contents.
    Cover,
    Table,
    Chart,
    Progress,
    ProgressList,
}

/// Registry entry: the resolved kind and its fixed chunk size, if the widget
/// paginates its data.
#[derive(Debug, Clone, Copy)]
pub struct WidgetOptions {
    pub kind: WidgetKind,
    pub chunk_size: Option<usize>,
}

/// Declared widget name → options. Supplied by the rendering layer; the
/// default mirrors the stock renderer set.
#[derive(Debug, Clone)]
pub struct WidgetRegistry {
    entries: HashMap<String, WidgetOptions>,
}

impl WidgetRegistry {
    /// An empty registry, for renderers that declare everything themselves.
    pub fn empty() -> Self {
        WidgetRegistry { entries: HashMap::new() }
    }

    pub fn register(&mut self, name: &str, kind: WidgetKind, chunk_size: Option<usize>) {
        self.entries.insert(name.to_string(), WidgetOptions { kind, chunk_size });
    }

    /// Resolve a declared name. Fails with [`ReportError::UnknownWidget`]
    /// for unmapped names.
    pub fn resolve(&self, name: &str) -> Result<WidgetOptions, ReportError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| ReportError::UnknownWidget(name.to_string()))
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        let mut registry = WidgetRegistry::empty();
        registry.register("FirstPage", WidgetKind::Cover, None);
        registry.register("Table", WidgetKind::Table, Some(20));
        registry.register("Chart", WidgetKind::Chart, None);
        registry.register("Progress", WidgetKind::Progress, None);
        registry.register("ProgressList", WidgetKind::ProgressList, None);
        registry
    }
}

/// A component with its widget resolved and data slices bound, as stored on
/// page templates. Realized into [`Component`] instances per physical page.
#[derive(Debug, Clone)]
pub struct BoundComponent {
    pub(crate) name: String,
    pub(crate) kind: WidgetKind,
    pub(crate) chunk_size: Option<usize>,
    pub(crate) props: Map<String, Value>,
    pub(crate) data: Vec<DataSlice>,
}

/// A live widget instance on one physical page.
#[derive(Debug, Clone)]
pub struct Component {
    id: String,
    name: String,
    kind: WidgetKind,
    number_in_page: usize,
    chunk_size: Option<usize>,
    props: Map<String, Value>,
    data: Vec<DataSlice>,
}

impl Component {
    pub(crate) fn realize(
        bound: &BoundComponent,
        page_id: &str,
        number_in_page: usize,
        page_chunk: Option<&ChunkInfo>,
    ) -> Self {
        let data = match (bound.chunk_size, page_chunk) {
            (Some(chunk_size), Some(chunk)) => bound
                .data
                .iter()
                .cloned()
                .map(|mut slice| {
                    slice.set_chunk(chunk.number, chunk_size);
                    slice
                })
                .collect(),
            _ => bound.data.clone(),
        };

        Component {
            id: format!("{page_id}-c{number_in_page}"),
            name: bound.name.clone(),
            kind: bound.kind,
            number_in_page,
            chunk_size: bound.chunk_size,
            props: bound.props.clone(),
            data,
        }
    }

    /// `"<pageId>-c<numberInPage>"`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The declared widget name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// 1-based position within the page, in document order.
    pub fn number_in_page(&self) -> usize {
        self.number_in_page
    }

    pub fn chunk_size(&self) -> Option<usize> {
        self.chunk_size
    }

    /// Renderer props, minus the data binding.
    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    /// The bound data slices, chunk-windowed on chunked pages.
    pub fn data(&self) -> &[DataSlice] {
        &self.data
    }
}
