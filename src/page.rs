//! # Physical pages
//!
//! One [`Page`] is one rendered page instance. A declared page template may
//! expand into several physical pages when a widget on it chunks its data;
//! each carries its chunk tag and shares the section's bound content tree.
//!
//! Content is realized lazily and exactly once: the first `content()` call
//! instantiates live components (numbered sequentially within the page) and
//! the result is memoized, so repeated calls observe identical component
//! ids and numbering.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::layout::ContentNode;
use crate::model::{Orientation, PageSize};
use crate::section::PageTemplate;
use crate::widget::{BoundComponent, Component};

/// Chunk tag for a physical page split from one declared page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    /// 0-based index of this page's chunk window.
    pub number: usize,
    /// Number of physical pages the declared page expanded into.
    pub total: usize,
}

/// Global numbering of one page: its 1-based number and the report total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumbering {
    pub page_number: usize,
    pub page_count: usize,
}

/// One physical page of a built report.
#[derive(Debug)]
pub struct Page {
    id: String,
    size: PageSize,
    layout: Orientation,
    number: usize,
    index_in_section: usize,
    chunk: Option<ChunkInfo>,
    page_count: usize,
    template: Rc<Vec<ContentNode<BoundComponent>>>,
    content: OnceCell<Vec<ContentNode<Component>>>,
}

impl Page {
    pub(crate) fn new(
        template: &PageTemplate,
        section_id: &str,
        index_in_section: usize,
        number: usize,
        page_count: usize,
    ) -> Self {
        Page {
            id: format!("{section_id}-p{index_in_section}"),
            size: template.size,
            layout: template.layout,
            number,
            index_in_section,
            chunk: template.chunk,
            page_count,
            template: Rc::clone(&template.content),
            content: OnceCell::new(),
        }
    }

    /// `"<sectionId>-p<indexInSection>"`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Global page number, 1-based.
    pub fn number(&self) -> usize {
        self.number
    }

    /// 0-based position within the owning section.
    pub fn index_in_section(&self) -> usize {
        self.index_in_section
    }

    /// Physical page specs: `(size, layout)`.
    pub fn specs(&self) -> (PageSize, Orientation) {
        (self.size, self.layout)
    }

    /// True when this page is one of several split from a declared page.
    pub fn is_chunked(&self) -> bool {
        self.chunk.is_some()
    }

    pub fn chunk_info(&self) -> Option<&ChunkInfo> {
        self.chunk.as_ref()
    }

    pub fn numbering(&self) -> PageNumbering {
        PageNumbering { page_number: self.number, page_count: self.page_count }
    }

    /// The realized content tree, with live component instances.
    ///
    /// Computed on first call and memoized; component numbering starts at 1
    /// and is stable across calls.
    pub fn content(&self) -> &[ContentNode<Component>] {
        self.content.get_or_init(|| {
            let mut number_in_page = 0;
            self.template
                .iter()
                .map(|node| {
                    node.map(&mut |bound| {
                        number_in_page += 1;
                        Component::realize(bound, &self.id, number_in_page, self.chunk.as_ref())
                    })
                })
                .collect()
        })
    }

    /// All realized components, in document order.
    pub fn components(&self) -> Vec<&Component> {
        self.content().iter().flat_map(|node| node.items()).collect()
    }
}
