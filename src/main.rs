//! # Rapport CLI
//!
//! Usage:
//!   rapport config.json data.json -o outline.json
//!   rapport --example > config.json
//!   rapport --example-data > data.json
//!
//! Builds the report and emits an outline document: sections, physical pages
//! with numbering and chunk tags, and per-component data binding summaries.

use std::env;
use std::fs;

use serde_json::{json, Value};

use rapport::Report;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_config_json());
        return;
    }
    if args.iter().any(|a| a == "--example-data") {
        print!("{}", example_data_json());
        return;
    }

    let inputs: Vec<&String> = args[1..].iter().filter(|a| !a.starts_with('-')).collect();
    if inputs.len() < 2 {
        eprintln!("Usage: rapport <config.json> <data.json> [-o outline.json]");
        std::process::exit(2);
    }
    let config = fs::read_to_string(inputs[0]).expect("Failed to read configuration file");
    let data = fs::read_to_string(inputs[1]).expect("Failed to read data file");

    let output_path = args.windows(2).find(|w| w[0] == "-o").map(|w| w[1].clone());

    match rapport::build_json(&config, &data) {
        Ok(report) => {
            let outline = serde_json::to_string_pretty(&outline(&report))
                .expect("Failed to serialize outline");
            match output_path {
                Some(path) => {
                    fs::write(&path, &outline).expect("Failed to write outline");
                    eprintln!("✓ {} pages written to {}", report.page_count(), path);
                }
                None => println!("{outline}"),
            }
        }
        Err(e) => {
            eprintln!("✗ Failed to build report: {e}");
            std::process::exit(1);
        }
    }
}

/// The report reduced to a renderer-independent outline document.
fn outline(report: &Report) -> Value {
    let sections: Vec<Value> = report
        .sections()
        .map(|section| {
            let pages: Vec<Value> = section
                .pages()
                .iter()
                .map(|page| {
                    let (size, layout) = page.specs();
                    let components: Vec<Value> = page
                        .components()
                        .iter()
                        .map(|component| {
                            let data: Vec<Value> = component
                                .data()
                                .iter()
                                .map(|slice| {
                                    json!({
                                        "label": slice.label(),
                                        "color": slice.color(),
                                        "records": slice.records().len(),
                                    })
                                })
                                .collect();
                            json!({
                                "id": component.id(),
                                "name": component.name(),
                                "numberInPage": component.number_in_page(),
                                "data": data,
                            })
                        })
                        .collect();
                    json!({
                        "id": page.id(),
                        "number": page.number(),
                        "size": size,
                        "layout": layout,
                        "chunk": page.chunk_info().map(|c| json!({
                            "number": c.number,
                            "total": c.total,
                        })),
                        "components": components,
                    })
                })
                .collect();
            json!({
                "id": section.id(),
                "title": section.title(),
                "firstPage": section.first_page(),
                "pageCount": section.page_count(),
                "pages": pages,
            })
        })
        .collect();

    let (start, end) = report.period();
    json!({
        "id": report.id(),
        "title": report.title(),
        "author": report.author(),
        "version": report.version(),
        "period": [start.to_string(), end.to_string()],
        "pageCount": report.page_count(),
        "menu": report.menu().iter().map(|entry| json!({
            "id": entry.id,
            "text": entry.text,
            "page": entry.page,
        })).collect::<Vec<Value>>(),
        "sections": sections,
    })
}

fn example_config_json() -> &'static str {
    r##"{
  "@attributes": {
    "id": "incident_review",
    "title": "Incident Review",
    "author": "Ops",
    "version": "1.0",
    "dateField": "opened"
  },
  "data": [
    {
      "@attributes": { "label": "Incidents" },
      "inserts": [
        { "name": "impact", "field": "severity", "operator": "*", "value": 10 }
      ]
    }
  ],
  "sections": [
    {
      "@attributes": { "id": "overview", "title": "Overview" },
      "pages": [
        {
          "@attributes": { "size": "A4", "layout": "portrait" },
          "content": [
            {
              "row": [
                {
                  "components": [
                    {
                      "@attributes": { "name": "Chart" },
                      "props": {
                        "dataSource": [
                          {
                            "@attributes": { "label": "Critical", "color": "#e15759" },
                            "filters": [
                              { "field": "severity", "operator": ">=", "value": 3 }
                            ]
                          },
                          {
                            "@attributes": { "label": "Routine" },
                            "filters": [
                              { "field": "severity", "operator": "<", "value": 3 }
                            ]
                          }
                        ]
                      }
                    }
                  ]
                }
              ]
            }
          ]
        }
      ]
    },
    {
      "@attributes": { "id": "detail", "title": "All Incidents" },
      "pages": [
        {
          "content": [
            {
              "components": [
                {
                  "@attributes": { "name": "Table" },
                  "props": {
                    "dataSource": [ { "@attributes": { "label": "Incidents" } } ],
                    "columns": [
                      { "key": "opened", "title": "Opened" },
                      { "key": "service", "title": "Service" },
                      { "key": "severity", "title": "Severity" }
                    ]
                  }
                }
              ]
            }
          ]
        }
      ]
    }
  ]
}"##
}

fn example_data_json() -> &'static str {
    r##"[
  { "opened": "2026-01-04T08:12:00Z", "service": "billing", "severity": 4 },
  { "opened": "2026-01-09T22:40:00Z", "service": "search", "severity": 2 },
  { "opened": "2026-01-17T03:05:00Z", "service": "billing", "severity": 1 },
  { "opened": "2026-02-02T14:30:00Z", "service": "auth", "severity": 5 },
  { "opened": "2026-02-11T11:00:00Z", "service": "search", "severity": 3 }
]"##
}
