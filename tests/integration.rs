//! Integration tests for the report building pipeline.
//!
//! These tests exercise the full path from JSON configuration + records to
//! the derived document model. They verify:
//! - Configuration decoding and argument validation
//! - Slice pipelines applied through sections and components
//! - Chunking: declared pages splitting into tagged physical pages
//! - Global page numbering and the table of contents
//! - Content realization: component ids, numbering, chunk windows

use serde_json::{json, Value};

use rapport::model::{Orientation, PageSize};
use rapport::page::Page;
use rapport::widget::{WidgetKind, WidgetRegistry};
use rapport::{Report, ReportError};

// ─── Helpers ────────────────────────────────────────────────────

fn make_records(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| json!({ "name": format!("row-{i}"), "score": i }))
            .collect(),
    )
}

fn table_page(label: &str) -> Value {
    json!({
        "content": [ { "components": [ {
            "@attributes": { "name": "Table" },
            "props": { "dataSource": [ { "@attributes": { "label": label } } ] }
        } ] } ]
    })
}

fn chart_page() -> Value {
    json!({
        "content": [ { "components": [ {
            "@attributes": { "name": "Chart" },
            "props": { "dataSource": [ {} ] }
        } ] } ]
    })
}

fn single_section_config(pages: Vec<Value>) -> Value {
    json!({
        "@attributes": { "title": "Pipeline Report" },
        "sections": [ {
            "@attributes": { "id": "main", "title": "Main" },
            "pages": pages
        } ]
    })
}

fn build(config: Value, data: Value) -> Report {
    Report::from_values(config, data).expect("report should build")
}

fn table_rows(page: &Page) -> usize {
    let components = page.components();
    assert_eq!(components.len(), 1, "one table per page in these fixtures");
    components[0].data()[0].records().len()
}

// ─── Basic pipeline ─────────────────────────────────────────────

#[test]
fn test_minimal_config_builds_cover_only() {
    let report = build(json!({}), json!([]));
    assert_eq!(report.page_count(), 1);
    assert_eq!(report.sections().count(), 1);
    assert!(report.menu().is_empty(), "the cover never appears in the menu");
}

#[test]
fn test_build_json_entry_point() {
    let report = rapport::build_json(r#"{ "@attributes": { "title": "T" } }"#, "[]").unwrap();
    assert_eq!(report.title(), "T");

    let err = rapport::build_json("{ not json", "[]").unwrap_err();
    assert!(matches!(err, ReportError::Parse { .. }));
}

#[test]
fn test_empty_pipeline_passes_data_through() {
    let report = build(single_section_config(vec![chart_page()]), make_records(7));
    let section = report.section("main").unwrap();
    let chart = &section.pages()[0].components()[0];
    assert_eq!(chart.kind(), WidgetKind::Chart);
    assert_eq!(chart.data()[0].records().len(), 7, "identity law");
}

#[test]
fn test_section_filters_scope_component_data() {
    let config = json!({
        "sections": [ {
            "@attributes": { "id": "high", "title": "High Scores" },
            "data": [ {
                "@attributes": { "label": "High" },
                "filters": [ { "field": "score", "operator": ">=", "value": 30 } ]
            } ],
            "pages": [ chart_page() ]
        } ]
    });
    let report = build(config, make_records(40));
    let section = report.section("high").unwrap();
    assert_eq!(section.data()[0].records().len(), 10);
    let chart = &section.pages()[0].components()[0];
    assert_eq!(chart.data()[0].records().len(), 10, "components see section data");
}

// ─── Chunking ───────────────────────────────────────────────────

#[test]
fn test_table_of_fifty_records_spans_three_pages() {
    let report = build(single_section_config(vec![table_page("Rows")]), make_records(50));
    let section = report.section("main").unwrap();
    let pages = section.pages();

    assert_eq!(pages.len(), 3);
    assert_eq!(table_rows(&pages[0]), 20);
    assert_eq!(table_rows(&pages[1]), 20);
    assert_eq!(table_rows(&pages[2]), 10);

    // Every page carries its chunk tag
    for (i, page) in pages.iter().enumerate() {
        let chunk = page.chunk_info().expect("split pages are tagged");
        assert_eq!(chunk.number, i);
        assert_eq!(chunk.total, 3);
        assert!(page.is_chunked());
    }
}

#[test]
fn test_chunked_pages_partition_the_records() {
    let report = build(single_section_config(vec![table_page("Rows")]), make_records(45));
    let section = report.section("main").unwrap();
    assert_eq!(section.pages().len(), 3, "ceil(45/20)");

    let mut seen = Vec::new();
    for page in section.pages() {
        for record in page.components()[0].data()[0].records() {
            seen.push(record["score"].as_i64().unwrap());
        }
    }
    let expected: Vec<i64> = (0..45).collect();
    assert_eq!(seen, expected, "every record appears exactly once, in order");
}

#[test]
fn test_exact_multiple_does_not_emit_an_empty_page() {
    let report = build(single_section_config(vec![table_page("Rows")]), make_records(40));
    let section = report.section("main").unwrap();
    assert_eq!(section.pages().len(), 2);
    assert_eq!(table_rows(&section.pages()[1]), 20);
}

#[test]
fn test_small_table_stays_on_one_untagged_page() {
    let report = build(single_section_config(vec![table_page("Rows")]), make_records(5));
    let section = report.section("main").unwrap();
    assert_eq!(section.pages().len(), 1);
    assert!(!section.pages()[0].is_chunked());
    assert!(section.pages()[0].chunk_info().is_none());
}

#[test]
fn test_custom_registry_chunk_size() {
    let mut registry = WidgetRegistry::default();
    registry.register("Table", WidgetKind::Table, Some(4));

    let config: rapport::model::ConfigDoc =
        serde_json::from_value(single_section_config(vec![table_page("Rows")])).unwrap();
    let records = serde_json::from_value(make_records(10)).unwrap();
    let report = Report::with_registry(config, records, registry).unwrap();

    assert_eq!(report.section("main").unwrap().pages().len(), 3, "ceil(10/4)");
}

// ─── Numbering and the menu ─────────────────────────────────────

#[test]
fn test_menu_accounts_for_chunk_expansion() {
    let config = json!({
        "sections": [
            {
                "@attributes": { "id": "overview-id", "title": "Overview" },
                "pages": [ table_page("Rows") ]
            },
            {
                "@attributes": { "id": "detail-id", "title": "Detail" },
                "pages": [ chart_page() ]
            }
        ]
    });
    // 45 records: Overview's table spans 3 physical pages
    let report = build(config, make_records(45));

    let menu = report.menu();
    assert_eq!(menu.len(), 2);
    assert_eq!(menu[0].id, "overview-id");
    assert_eq!(menu[0].text, "Overview");
    assert_eq!(menu[0].page, 1, "cover occupies global page 0");
    assert_eq!(menu[1].id, "detail-id");
    assert_eq!(menu[1].page, 4, "1 + the three pages Overview expanded into");
}

#[test]
fn test_global_numbering_is_contiguous() {
    let config = json!({
        "sections": [
            { "@attributes": { "id": "a", "title": "A" }, "pages": [ table_page("Rows") ] },
            { "@attributes": { "id": "b", "title": "B" }, "pages": [ chart_page(), chart_page() ] }
        ]
    });
    let report = build(config, make_records(50));
    assert_eq!(report.page_count(), 6, "cover + 3 chunked + 2 plain");

    let numbers: Vec<usize> = report
        .sections()
        .flat_map(|s| s.pages().iter().map(Page::number))
        .collect();
    assert_eq!(numbers, [1, 2, 3, 4, 5, 6]);

    for section in report.sections() {
        for page in section.pages() {
            assert_eq!(page.numbering().page_count, 6);
        }
    }
}

#[test]
fn test_section_order_follows_declaration_order() {
    let config = json!({
        "sections": [
            { "@attributes": { "id": "z", "title": "Last Letter" }, "pages": [ chart_page() ] },
            { "@attributes": { "id": "a", "title": "First Letter" }, "pages": [ chart_page() ] }
        ]
    });
    let report = build(config, make_records(3));
    let ids: Vec<&str> = report.sections().map(|s| s.id()).collect();
    assert_eq!(ids, ["firstsec", "z", "a"]);
    let indices: Vec<usize> = report.sections().map(|s| s.index()).collect();
    assert_eq!(indices, [0, 1, 2]);
}

// ─── Content realization ────────────────────────────────────────

#[test]
fn test_component_ids_and_numbering() {
    let config = single_section_config(vec![json!({
        "content": [ { "row": [
            { "components": [
                { "@attributes": { "name": "Progress" }, "props": { "dataSource": [ {} ] } },
                { "@attributes": { "name": "Chart" }, "props": { "dataSource": [ {} ] } }
            ] },
            { "col": [ { "components": [
                { "@attributes": { "name": "ProgressList" }, "props": { "dataSource": [ {} ] } }
            ] } ] }
        ] } ]
    })]);
    let report = build(config, make_records(3));
    let page = &report.section("main").unwrap().pages()[0];

    assert_eq!(page.id(), "main-p0");
    let components = page.components();
    let ids: Vec<&str> = components.iter().map(|c| c.id()).collect();
    assert_eq!(ids, ["main-p0-c1", "main-p0-c2", "main-p0-c3"]);
    let numbers: Vec<usize> = components.iter().map(|c| c.number_in_page()).collect();
    assert_eq!(numbers, [1, 2, 3]);
}

#[test]
fn test_content_is_memoized_and_stable() {
    let report = build(single_section_config(vec![table_page("Rows")]), make_records(50));
    let page = &report.section("main").unwrap().pages()[0];

    let first: Vec<String> = page.components().iter().map(|c| c.id().to_string()).collect();
    let second: Vec<String> = page.components().iter().map(|c| c.id().to_string()).collect();
    assert_eq!(first, second, "repeated realization never renumbers");
    assert!(std::ptr::eq(page.content(), page.content()), "content is computed once");
}

#[test]
fn test_page_specs_and_defaults() {
    let config = single_section_config(vec![json!({
        "@attributes": { "size": "Letter", "layout": "landscape" },
        "content": [ { "components": [
            { "@attributes": { "name": "Chart" }, "props": { "dataSource": [ {} ] } }
        ] } ]
    })]);
    let report = build(config, make_records(2));
    let page = &report.section("main").unwrap().pages()[0];
    assert_eq!(page.specs(), (PageSize::Letter, Orientation::Landscape));

    let defaulted = build(single_section_config(vec![chart_page()]), make_records(2));
    let page = &defaulted.section("main").unwrap().pages()[0];
    assert_eq!(page.specs(), (PageSize::A4, Orientation::Portrait));
}

#[test]
fn test_props_are_carried_without_the_data_binding() {
    let config = single_section_config(vec![json!({
        "content": [ { "components": [ {
            "@attributes": { "name": "Table" },
            "props": {
                "dataSource": [ {} ],
                "columns": [ { "key": "name" } ],
                "caption": "All rows"
            }
        } ] } ]
    })]);
    let report = build(config, make_records(3));
    let page = &report.section("main").unwrap().pages()[0];
    let table = &page.components()[0];
    assert_eq!(table.props()["caption"], json!("All rows"));
    assert!(table.props().contains_key("columns"));
    assert!(!table.props().contains_key("dataSource"));
}

// ─── Failure propagation ────────────────────────────────────────

#[test]
fn test_unknown_widget_fails_the_build() {
    let config = single_section_config(vec![json!({
        "content": [ { "components": [
            { "@attributes": { "name": "Gauge" }, "props": {} }
        ] } ]
    })]);
    let err = Report::from_values(config, make_records(2)).unwrap_err();
    assert!(matches!(err, ReportError::UnknownWidget(name) if name == "Gauge"));
}

#[test]
fn test_unknown_operator_fails_the_build() {
    let config = json!({
        "data": [ {
            "transforms": [ { "field": "score", "operator": "+=", "value": 1 } ]
        } ]
    });
    let err = Report::from_values(config, make_records(2)).unwrap_err();
    assert!(matches!(err, ReportError::UnknownOperator(tok) if tok == "+="));
}

#[test]
fn test_malformed_filter_spec_fails_the_build() {
    let config = single_section_config(vec![json!({
        "content": [ { "components": [ {
            "@attributes": { "name": "Chart" },
            "props": { "dataSource": [ {
                "filters": [ { "operator": ">", "value": 1 } ]
            } ] }
        } ] } ]
    })]);
    let err = Report::from_values(config, make_records(2)).unwrap_err();
    assert!(matches!(err, ReportError::MalformedSpec(msg) if msg.contains("field")));
}
