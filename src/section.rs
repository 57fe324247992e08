//! # Sections
//!
//! A section owns one data scope (slices derived from the report's raw data)
//! and expands its declared pages into physical page templates. Expansion
//! walks each declared page's layout once: every component gets its widget
//! kind resolved and its data slices bound, and any component whose kind
//! carries a fixed chunk size can force the declared page to split into one
//! physical page per chunk, all sharing the same bound content tree.

use std::rc::Rc;

use log::debug;

use crate::data::DataSlice;
use crate::error::ReportError;
use crate::layout::{self, ContentNode};
use crate::model::{Orientation, PageSize, SectionSpec};
use crate::page::{ChunkInfo, Page};
use crate::widget::{BoundComponent, WidgetRegistry};

/// One physical-page template emitted by section expansion. Chunk-split
/// templates share the bound content tree.
#[derive(Debug, Clone)]
pub(crate) struct PageTemplate {
    pub(crate) size: PageSize,
    pub(crate) layout: Orientation,
    pub(crate) chunk: Option<ChunkInfo>,
    pub(crate) content: Rc<Vec<ContentNode<BoundComponent>>>,
}

/// A titled, numbered group of physical pages sharing one data scope.
#[derive(Debug)]
pub struct Section {
    id: String,
    title: String,
    index: usize,
    first_page: usize,
    data: Vec<DataSlice>,
    templates: Vec<PageTemplate>,
    pages: Vec<Page>,
}

impl Section {
    /// Derive the section's data and expand its declared pages into physical
    /// page templates. Page numbers are assigned later, by the report's
    /// numbering pass.
    pub(crate) fn build(
        spec: &SectionSpec,
        raw: &[DataSlice],
        registry: &WidgetRegistry,
        index: usize,
    ) -> Result<Self, ReportError> {
        let id = spec.attributes.id.clone();
        let title = spec.attributes.title.clone();
        let data = DataSlice::derive(raw, &spec.data)?;

        let mut templates = Vec::new();
        for (page_index, page) in spec.pages.iter().enumerate() {
            if page.content.is_empty() {
                return Err(ReportError::MalformedLayout(format!(
                    "page {page_index} of section `{id}` has no content"
                )));
            }

            // One walk binds every component and detects the chunking need.
            let mut max_chunks = 0usize;
            let content = layout::format_all::<BoundComponent, ReportError>(&page.content, &mut |component| {
                let options = registry.resolve(&component.attributes.name)?;
                let slices = DataSlice::derive(&data, &component.props.data_source)?;
                if let Some(chunk_size) = options.chunk_size {
                    let amount = slices
                        .iter()
                        .map(|slice| slice.chunk_amount(chunk_size))
                        .max()
                        .unwrap_or(0);
                    max_chunks = max_chunks.max(amount);
                }
                Ok(BoundComponent {
                    name: component.attributes.name.clone(),
                    kind: options.kind,
                    chunk_size: options.chunk_size,
                    props: component.props.extra.clone(),
                    data: slices,
                })
            })?;
            let content = Rc::new(content);

            let size = page.attributes.size.unwrap_or_default();
            let orientation = page.attributes.layout.unwrap_or_default();
            if max_chunks == 0 {
                templates.push(PageTemplate {
                    size,
                    layout: orientation,
                    chunk: None,
                    content,
                });
            } else {
                debug!("section `{id}`: declared page {page_index} splits into {max_chunks} physical pages");
                for number in 0..max_chunks {
                    templates.push(PageTemplate {
                        size,
                        layout: orientation,
                        chunk: Some(ChunkInfo { number, total: max_chunks }),
                        content: Rc::clone(&content),
                    });
                }
            }
        }

        debug!(
            "section `{id}`: {} declared pages expanded into {} physical pages",
            spec.pages.len(),
            templates.len()
        );
        Ok(Section {
            id,
            title,
            index,
            first_page: 0,
            data,
            templates,
            pages: Vec::new(),
        })
    }

    /// Numbering pass: record the global first-page offset and materialize
    /// the physical pages with final numbers and the report total.
    pub(crate) fn assign_pages(&mut self, first_page: usize, report_page_count: usize) {
        self.first_page = first_page;
        self.pages = self
            .templates
            .iter()
            .enumerate()
            .map(|(i, template)| {
                Page::new(template, &self.id, i, first_page + i + 1, report_page_count)
            })
            .collect();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display position: 0 for the cover, 1-based for declared sections.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Global 0-based number of this section's first page.
    pub fn first_page(&self) -> usize {
        self.first_page
    }

    /// Number of physical pages this section emits.
    pub fn page_count(&self) -> usize {
        self.templates.len()
    }

    /// The section's derived data slices.
    pub fn data(&self) -> &[DataSlice] {
        &self.data
    }

    /// The physical pages, in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use serde_json::json;

    fn raw_slice(count: usize) -> DataSlice {
        let records: Vec<Record> = (0..count)
            .map(|i| serde_json::from_value(json!({ "i": i })).unwrap())
            .collect();
        DataSlice::raw(records)
    }

    fn section_spec(v: serde_json::Value) -> SectionSpec {
        serde_json::from_value(v).unwrap()
    }

    fn table_section() -> SectionSpec {
        section_spec(json!({
            "@attributes": { "id": "detail", "title": "Detail" },
            "pages": [ {
                "content": [ { "components": [ {
                    "@attributes": { "name": "Table" },
                    "props": { "dataSource": [ { "@attributes": { "label": "Rows" } } ] }
                } ] } ]
            } ]
        }))
    }

    #[test]
    fn test_chunking_splits_declared_page() {
        let raw = [raw_slice(45)];
        let registry = WidgetRegistry::default();
        let section = Section::build(&table_section(), &raw, &registry, 1).unwrap();

        assert_eq!(section.page_count(), 3, "ceil(45/20) physical pages");
        let chunks: Vec<_> = section
            .templates
            .iter()
            .map(|t| t.chunk.expect("every split page is tagged"))
            .collect();
        assert_eq!(chunks[0], ChunkInfo { number: 0, total: 3 });
        assert_eq!(chunks[2], ChunkInfo { number: 2, total: 3 });
        assert!(
            Rc::ptr_eq(&section.templates[0].content, &section.templates[2].content),
            "split pages share one bound content tree"
        );
    }

    #[test]
    fn test_unchunked_page_is_emitted_once_untagged() {
        let raw = [raw_slice(45)];
        let registry = WidgetRegistry::default();
        let spec = section_spec(json!({
            "@attributes": { "id": "overview", "title": "Overview" },
            "pages": [ {
                "content": [ { "components": [ {
                    "@attributes": { "name": "Chart" },
                    "props": { "dataSource": [ {} ] }
                } ] } ]
            } ]
        }));
        let section = Section::build(&spec, &raw, &registry, 1).unwrap();
        assert_eq!(section.page_count(), 1);
        assert!(section.templates[0].chunk.is_none());
    }

    #[test]
    fn test_chunking_widget_with_empty_data_falls_back_to_one_page() {
        let raw = [raw_slice(0)];
        let registry = WidgetRegistry::default();
        let section = Section::build(&table_section(), &raw, &registry, 1).unwrap();
        assert_eq!(section.page_count(), 1);
        assert!(section.templates[0].chunk.is_none());
    }

    #[test]
    fn test_unknown_widget_aborts_build() {
        let raw = [raw_slice(3)];
        let registry = WidgetRegistry::default();
        let spec = section_spec(json!({
            "@attributes": { "id": "x", "title": "X" },
            "pages": [ {
                "content": [ { "components": [ {
                    "@attributes": { "name": "Sparkline" }, "props": {}
                } ] } ]
            } ]
        }));
        assert!(matches!(
            Section::build(&spec, &raw, &registry, 1),
            Err(ReportError::UnknownWidget(name)) if name == "Sparkline"
        ));
    }

    #[test]
    fn test_empty_page_content_is_malformed_layout() {
        let raw = [raw_slice(3)];
        let registry = WidgetRegistry::default();
        let spec = section_spec(json!({
            "@attributes": { "id": "x", "title": "X" },
            "pages": [ { "content": [] } ]
        }));
        assert!(matches!(
            Section::build(&spec, &raw, &registry, 1),
            Err(ReportError::MalformedLayout(_))
        ));
    }

    #[test]
    fn test_assign_pages_numbers_globally() {
        let raw = [raw_slice(45)];
        let registry = WidgetRegistry::default();
        let mut section = Section::build(&table_section(), &raw, &registry, 1).unwrap();
        section.assign_pages(1, 4);

        assert_eq!(section.first_page(), 1);
        let numbers: Vec<_> = section.pages().iter().map(Page::number).collect();
        assert_eq!(numbers, [2, 3, 4], "1-based numbers offset by the first page");
        assert_eq!(section.pages()[0].id(), "detail-p0");
        assert_eq!(section.pages()[0].numbering().page_count, 4);
    }
}
