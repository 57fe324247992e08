//! # Data slices
//!
//! A [`DataSlice`] is the unit of data in a report: a named, colored,
//! optionally chunked view over a collection of records, produced by running
//! a declarative transformation pipeline over an input collection.
//!
//! The pipeline runs exactly once, at construction, in the fixed order
//! **insert → transform → filter**. The result is immutable afterwards; the
//! only later mutation is re-targeting the chunk window, which never re-runs
//! the pipeline. A slice owns its transformed output and never the input
//! collection it was derived from.

use log::debug;
use serde_json::{Map, Value};

use crate::error::ReportError;
use crate::model::{DataSliceSpec, Record};
use crate::operator::{is_truthy, Operator};

/// Fallback colors assigned to slices that don't declare one, keyed by slice
/// index so repeated builds derive the same report.
const PALETTE: [&str; 8] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#b07aa1", "#9c755f",
];

const DEFAULT_LABEL: &str = "Raw data";

/// A named, transformed, optionally-chunked view over a data collection.
#[derive(Debug, Clone)]
pub struct DataSlice {
    label: String,
    color: String,
    index: usize,
    data_index: usize,
    chunk_number: Option<usize>,
    chunk_size: Option<usize>,
    data: Vec<Record>,
}

impl DataSlice {
    /// Build a slice by applying `spec`'s pipeline to `input`.
    ///
    /// `index` is the slice's position inside its declaring list; it seeds
    /// the fallback color and is exposed for cross-referencing.
    pub fn new(input: &[Record], spec: &DataSliceSpec, index: usize) -> Result<Self, ReportError> {
        let inserts: Vec<InsertInstr> = spec
            .inserts
            .iter()
            .map(InsertInstr::from_value)
            .collect::<Result<_, _>>()?;
        let transforms: Vec<TransformInstr> = spec
            .transforms
            .iter()
            .map(TransformInstr::from_value)
            .collect::<Result<_, _>>()?;
        let filters: Vec<Predicate> = spec
            .filters
            .iter()
            .map(|v| Predicate::from_value(v, "filter"))
            .collect::<Result<_, _>>()?;

        let mut data: Vec<Record> = input.to_vec();
        for instr in &inserts {
            instr.apply(&mut data)?;
        }
        for instr in &transforms {
            instr.apply(&mut data)?;
        }
        if !filters.is_empty() {
            data = apply_filters(data, &filters)?;
        }

        let attrs = &spec.attributes;
        Ok(DataSlice {
            label: attrs.label.clone().unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            color: attrs
                .color
                .clone()
                .unwrap_or_else(|| PALETTE[index % PALETTE.len()].to_string()),
            index,
            data_index: attrs.data_index.unwrap_or(0),
            chunk_number: attrs.chunk_number,
            chunk_size: attrs.chunk_size,
            data,
        })
    }

    /// Wrap records as-is, without any pipeline.
    pub fn raw(input: Vec<Record>) -> Self {
        DataSlice {
            label: DEFAULT_LABEL.to_string(),
            color: PALETTE[0].to_string(),
            index: 0,
            data_index: 0,
            chunk_number: None,
            chunk_size: None,
            data: input,
        }
    }

    /// Map slice specs to new slices, each sourced from the input slice its
    /// `dataIndex` names (default 0). An empty spec list passes the inputs
    /// through unchanged.
    pub fn derive(
        inputs: &[DataSlice],
        specs: &[DataSliceSpec],
    ) -> Result<Vec<DataSlice>, ReportError> {
        if specs.is_empty() {
            return Ok(inputs.to_vec());
        }
        specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let idx = spec.attributes.data_index.unwrap_or(0);
                let parent = inputs.get(idx).ok_or_else(|| {
                    ReportError::MalformedSpec(format!(
                        "dataIndex {idx} is out of range ({} input slices)",
                        inputs.len()
                    ))
                })?;
                let slice = DataSlice::new(parent.records(), spec, i)?;
                debug!(
                    "derived slice `{}` ({} of {} records)",
                    slice.label,
                    slice.len(),
                    parent.len()
                );
                Ok(slice)
            })
            .collect()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data_index(&self) -> usize {
        self.data_index
    }

    /// The chunk window, when one is set: `(chunk_number, chunk_size)`.
    pub fn chunk_info(&self) -> Option<(usize, usize)> {
        self.chunk_number.zip(self.chunk_size)
    }

    /// Total records after the pipeline, ignoring any chunk window.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The visible records: the chunk window when one is set, else the whole
    /// transformed collection.
    pub fn records(&self) -> &[Record] {
        match self.chunk_info() {
            Some((number, size)) => self.chunk(size, number),
            None => &self.data,
        }
    }

    /// The half-open window `[i*k, (i+1)*k)`, clamped to the data.
    pub fn chunk(&self, chunk_size: usize, i: usize) -> &[Record] {
        if chunk_size == 0 {
            return &[];
        }
        let start = (i * chunk_size).min(self.data.len());
        let end = ((i + 1) * chunk_size).min(self.data.len());
        &self.data[start..end]
    }

    /// Number of chunks of `chunk_size` the transformed data spans.
    pub fn chunk_amount(&self, chunk_size: usize) -> usize {
        if chunk_size == 0 {
            return 0;
        }
        self.data.len().div_ceil(chunk_size)
    }

    /// Re-target the chunk window. The pipeline is not re-run.
    pub fn set_chunk(&mut self, chunk_number: usize, chunk_size: usize) {
        self.chunk_number = Some(chunk_number);
        self.chunk_size = Some(chunk_size);
    }
}

// ─── Pipeline instructions ──────────────────────────────────────────

/// One compiled filter predicate. `field` and `value` may each be declared
/// scalar or as an array; the predicate passes when any field/value pairing
/// satisfies the operator.
struct Predicate {
    fields: Vec<String>,
    op: Operator,
    values: Vec<Value>,
}

impl Predicate {
    fn from_value(v: &Value, what: &str) -> Result<Self, ReportError> {
        let obj = spec_object(v, what)?;
        let fields = match require(obj, "field", what)? {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ReportError::MalformedSpec(format!(
                            "{what} `field` array must contain strings"
                        ))
                    })
                })
                .collect::<Result<_, _>>()?,
            other => {
                return Err(ReportError::MalformedSpec(format!(
                    "{what} `field` must be a string or array of strings, got {other}"
                )))
            }
        };
        let op = parse_operator(obj, what)?;
        let values = match require(obj, "value", what)? {
            Value::Array(items) => items.clone(),
            scalar => vec![scalar.clone()],
        };
        Ok(Predicate { fields, op, values })
    }

    /// ∃ f ∈ fields, v ∈ values with `op(record[f], v)` truthy.
    fn matches(&self, record: &Record) -> Result<bool, ReportError> {
        for field in &self.fields {
            let current = record.get(field).unwrap_or(&Value::Null);
            for value in &self.values {
                if is_truthy(&self.op.apply(current, value)?) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// `{name, field, operator, value}` — sets `record[name]` from
/// `op(record[field], value)` unless the target is already set.
struct InsertInstr {
    name: String,
    field: String,
    op: Operator,
    value: Value,
}

impl InsertInstr {
    fn from_value(v: &Value) -> Result<Self, ReportError> {
        let obj = spec_object(v, "insert")?;
        Ok(InsertInstr {
            name: require_str(obj, "name", "insert")?,
            field: require_str(obj, "field", "insert")?,
            op: parse_operator(obj, "insert")?,
            value: require(obj, "value", "insert")?.clone(),
        })
    }

    fn apply(&self, records: &mut [Record]) -> Result<(), ReportError> {
        for record in records.iter_mut() {
            // Never overwrite: a present, non-null target is left alone.
            if record.get(&self.name).is_some_and(|v| !v.is_null()) {
                continue;
            }
            let current = record.get(&self.field).cloned().unwrap_or(Value::Null);
            let derived = self.op.apply(&current, &self.value)?;
            record.insert(self.name.clone(), derived);
        }
        Ok(())
    }
}

/// `{field, operator, value, conditions?}` — rewrites `record[field]` when
/// every condition passes; unconditioned transforms always apply.
struct TransformInstr {
    field: String,
    op: Operator,
    value: Value,
    conditions: Vec<Predicate>,
}

impl TransformInstr {
    fn from_value(v: &Value) -> Result<Self, ReportError> {
        let obj = spec_object(v, "transform")?;
        let conditions = match obj.get("conditions") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|c| Predicate::from_value(c, "condition"))
                .collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(ReportError::MalformedSpec(format!(
                    "transform `conditions` must be an array, got {other}"
                )))
            }
            None => Vec::new(),
        };
        Ok(TransformInstr {
            field: require_str(obj, "field", "transform")?,
            op: parse_operator(obj, "transform")?,
            value: require(obj, "value", "transform")?.clone(),
            conditions,
        })
    }

    fn apply(&self, records: &mut [Record]) -> Result<(), ReportError> {
        for record in records.iter_mut() {
            let mut passes = true;
            for condition in &self.conditions {
                if !condition.matches(record)? {
                    passes = false;
                    break;
                }
            }
            if !passes {
                continue;
            }
            let current = record.get(&self.field).cloned().unwrap_or(Value::Null);
            let rewritten = self.op.apply(&current, &self.value)?;
            record.insert(self.field.clone(), rewritten);
        }
        Ok(())
    }
}

/// Keep only records passing every predicate.
fn apply_filters(records: Vec<Record>, filters: &[Predicate]) -> Result<Vec<Record>, ReportError> {
    let mut kept = Vec::with_capacity(records.len());
    'records: for record in records {
        for filter in filters {
            if !filter.matches(&record)? {
                continue 'records;
            }
        }
        kept.push(record);
    }
    Ok(kept)
}

// ─── Spec decoding helpers ──────────────────────────────────────────

fn spec_object<'a>(v: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ReportError> {
    v.as_object().ok_or_else(|| {
        ReportError::MalformedSpec(format!("{what} instruction must be an object, got {v}"))
    })
}

fn require<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    what: &str,
) -> Result<&'a Value, ReportError> {
    obj.get(key)
        .ok_or_else(|| ReportError::MalformedSpec(format!("{what} is missing `{key}`")))
}

fn require_str(obj: &Map<String, Value>, key: &str, what: &str) -> Result<String, ReportError> {
    require(obj, key, what)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ReportError::MalformedSpec(format!("{what} `{key}` must be a string")))
}

fn parse_operator(obj: &Map<String, Value>, what: &str) -> Result<Operator, ReportError> {
    Operator::parse(&require_str(obj, "operator", what)?)
}
