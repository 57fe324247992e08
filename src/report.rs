//! # Report orchestration
//!
//! [`Report`] is the root of a built report: it validates the inputs, wraps
//! the raw records as the primary data slice, synthesizes the cover section,
//! builds every declared section in display order, and assigns global page
//! numbers in one explicit pass over the finished sections. After
//! construction the report is read-only, except for the user-triggered
//! [`Report::set_period`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, warn};
use serde_json::Value;

use crate::data::DataSlice;
use crate::error::ReportError;
use crate::model::{
    ComponentAttributes, ComponentProps, ComponentSpec, ConfigDoc, LayoutNode, Orientation,
    PageAttributes, PageSize, PageSpec, Record, SectionAttributes, SectionSpec,
};
use crate::section::Section;
use crate::widget::WidgetRegistry;

/// Canonical form date-field values are rewritten to.
const CANONICAL_DATE: &str = "%Y-%m-%d %H:%M:%S";

/// Synthetic cover section id; always display position 0, global page 0.
const COVER_ID: &str = "firstsec";

const DEFAULT_TITLE: &str = "My Report";

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: String,
    pub text: String,
    /// Global 0-based number of the section's first page.
    pub page: usize,
}

/// A fully built report: the cover plus all declared sections, numbered.
#[derive(Debug)]
pub struct Report {
    id: String,
    title: String,
    author: Option<String>,
    version: Option<String>,
    generated_at: NaiveDateTime,
    period: (NaiveDateTime, NaiveDateTime),
    raw: Vec<DataSlice>,
    cover: Section,
    sections: Vec<Section>,
    page_count: usize,
}

impl Report {
    /// Build from raw JSON text. Decode failures carry a schema hint.
    pub fn from_json(config: &str, data: &str) -> Result<Self, ReportError> {
        let config: Value = serde_json::from_str(config)?;
        let data: Value = serde_json::from_str(data)?;
        Self::from_values(config, data)
    }

    /// Build from decoded JSON values, validating argument shapes first.
    pub fn from_values(config: Value, data: Value) -> Result<Self, ReportError> {
        if !config.is_object() {
            return Err(ReportError::InvalidConfig(
                "the configuration must be a JSON object".to_string(),
            ));
        }
        let records = match data {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(ReportError::InvalidData(format!(
                        "every record must be a JSON object, got {other}"
                    ))),
                })
                .collect::<Result<Vec<Record>, _>>()?,
            _ => {
                return Err(ReportError::InvalidData(
                    "the data must be a JSON array of records".to_string(),
                ))
            }
        };
        let doc: ConfigDoc = serde_json::from_value(config)?;
        Self::new(doc, records)
    }

    /// Build with the stock widget registry.
    pub fn new(doc: ConfigDoc, records: Vec<Record>) -> Result<Self, ReportError> {
        Self::with_registry(doc, records, WidgetRegistry::default())
    }

    /// Build with a renderer-supplied widget registry.
    pub fn with_registry(
        doc: ConfigDoc,
        mut records: Vec<Record>,
        registry: WidgetRegistry,
    ) -> Result<Self, ReportError> {
        let generated_at = Utc::now().naive_utc();
        let title = doc
            .attributes
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let id = doc
            .attributes
            .id
            .clone()
            .unwrap_or_else(|| format!("report_{}", generated_at.format("%Y-%m-%d")));

        let mut period = (generated_at, generated_at);
        if let Some(field) = &doc.attributes.date_field {
            if let Some(span) = canonicalize_dates(&mut records, field) {
                period = span;
            }
        }

        let raw_spec = doc.data.first().cloned().unwrap_or_default();
        let raw = vec![DataSlice::new(&records, &raw_spec, 0)?];
        debug!("report `{id}`: wrapped {} records as the raw slice", records.len());

        // The cover owns no data scope at all: built against an empty slice
        // list so its widget binds to nothing.
        let mut cover = Section::build(&cover_spec(&title), &[], &registry, 0)?;
        let mut sections = doc
            .sections
            .iter()
            .enumerate()
            .map(|(i, spec)| Section::build(spec, &raw, &registry, i + 1))
            .collect::<Result<Vec<Section>, _>>()?;

        // Numbering pass: thread one explicit counter over the sections in
        // display order, then hand every page the final total.
        let page_count =
            cover.page_count() + sections.iter().map(Section::page_count).sum::<usize>();
        let mut next_page = 0;
        cover.assign_pages(next_page, page_count);
        next_page += cover.page_count();
        for section in &mut sections {
            section.assign_pages(next_page, page_count);
            next_page += section.page_count();
        }
        debug!("report `{id}`: {} sections, {page_count} pages", sections.len() + 1);

        Ok(Report {
            id,
            title,
            author: doc.attributes.author.clone(),
            version: doc.attributes.version.clone(),
            generated_at,
            period,
            raw,
            cover,
            sections,
            page_count,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Build timestamp, UTC.
    pub fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    /// The report period `[start, end]`.
    pub fn period(&self) -> (NaiveDateTime, NaiveDateTime) {
        self.period
    }

    /// Replace the period. Exactly two dates are required.
    pub fn set_period(&mut self, dates: &[NaiveDateTime]) -> Result<(), ReportError> {
        match dates {
            [start, end] => {
                self.period = (*start, *end);
                Ok(())
            }
            other => Err(ReportError::InvalidPeriod(other.len())),
        }
    }

    /// The raw data slices (the primary slice is index 0).
    pub fn raw_data(&self) -> &[DataSlice] {
        &self.raw
    }

    /// All sections in display order, cover first.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        std::iter::once(&self.cover).chain(self.sections.iter())
    }

    /// Look a section up by id (the cover answers to `"firstsec"`).
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections().find(|section| section.id() == id)
    }

    /// Table-of-contents entries for the declared sections (cover excluded).
    pub fn menu(&self) -> Vec<MenuEntry> {
        self.sections
            .iter()
            .map(|section| MenuEntry {
                id: section.id().to_string(),
                text: section.title().to_string(),
                page: section.first_page(),
            })
            .collect()
    }

    /// Total physical pages across all sections.
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

/// The synthetic first section: one landscape A4 page holding a single cover
/// widget bound to no data.
fn cover_spec(title: &str) -> SectionSpec {
    SectionSpec {
        attributes: SectionAttributes {
            id: COVER_ID.to_string(),
            title: title.to_string(),
        },
        data: Vec::new(),
        pages: vec![PageSpec {
            attributes: PageAttributes {
                size: Some(PageSize::A4),
                layout: Some(Orientation::Landscape),
            },
            content: vec![LayoutNode::Components(vec![ComponentSpec {
                attributes: ComponentAttributes {
                    name: "FirstPage".to_string(),
                },
                props: ComponentProps::default(),
            }])],
        }],
    }
}

/// Rewrite every record's value at `field` into the canonical date-time form
/// and return the overall `[min, max]` span. Unparseable values are logged
/// and left untouched; they do not contribute to the span.
fn canonicalize_dates(
    records: &mut [Record],
    field: &str,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut dates = Vec::with_capacity(records.len());
    for record in records.iter_mut() {
        let Some(value) = record.get(field) else {
            warn!("record has no `{field}` value; skipped for the period");
            continue;
        };
        match parse_date(value) {
            Some(date) => {
                record.insert(
                    field.to_string(),
                    Value::String(date.format(CANONICAL_DATE).to_string()),
                );
                dates.push(date);
            }
            None => warn!("unparseable `{field}` value {value}; skipped for the period"),
        }
    }
    let start = dates.iter().min()?;
    let end = dates.iter().max()?;
    Some((*start, *end))
}

/// Best-effort date parsing: RFC 3339, common date-time forms, bare dates,
/// and epoch seconds or milliseconds.
fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.naive_utc())
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(s, CANONICAL_DATE).ok())
                .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
        }
        Value::Number(n) => {
            let raw = n.as_f64()?;
            // Heuristic: epoch milliseconds past ~5138 AD can't be seconds.
            let seconds = if raw.abs() >= 1e11 { raw / 1000.0 } else { raw };
            DateTime::from_timestamp(seconds as i64, 0).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}
