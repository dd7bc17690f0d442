use crate::domain::{EngineError, EngineResult, NamelistValue, ParsedDocument};
use serde::Serialize;

const ELAB: &str = "elab";
const NLAB: &str = "nlab";

/// Laboratory energies of a run: one energy, or boundaries
/// `elab(1:n)` with `nlab(i)` steps between boundary `i` and `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergySchedule {
    pub boundaries: Vec<f64>,
    pub intervals: Vec<u32>,
}

impl EnergySchedule {
    pub fn single(energy: f64) -> Self {
        Self {
            boundaries: vec![energy],
            intervals: Vec::new(),
        }
    }

    /// Builds a schedule, padding missing intervals with 1 and dropping
    /// surplus ones.
    pub fn new(boundaries: Vec<f64>, mut intervals: Vec<u32>) -> EngineResult<Self> {
        if boundaries.is_empty() {
            return Err(EngineError::invalid_value(
                ELAB,
                "at least one energy is required",
            ));
        }
        if let Some(bad) = boundaries.iter().find(|energy| !energy.is_finite()) {
            return Err(EngineError::invalid_value(
                ELAB,
                format!("energy {bad} is not finite"),
            ));
        }
        if intervals.contains(&0) {
            return Err(EngineError::invalid_value(
                NLAB,
                "interval counts must be at least 1",
            ));
        }
        intervals.resize(boundaries.len() - 1, 1);
        Ok(Self {
            boundaries,
            intervals,
        })
    }

    /// Reads `elab`/`nlab` from a document. Returns `None` when `elab` is
    /// not set.
    pub fn from_document(document: &ParsedDocument) -> EngineResult<Option<Self>> {
        let Some(elab) = document.parameter(ELAB) else {
            return Ok(None);
        };

        let boundaries = match elab {
            NamelistValue::Array(values) => values
                .iter()
                .map(|value| numeric(ELAB, value))
                .collect::<EngineResult<Vec<_>>>()?,
            scalar => vec![numeric(ELAB, scalar)?],
        };
        if boundaries.len() == 1 {
            return Self::new(boundaries, Vec::new()).map(Some);
        }

        let intervals = match document.parameter(NLAB) {
            Some(NamelistValue::Array(values)) => values.iter().map(interval).collect(),
            Some(scalar) => vec![interval(scalar)],
            None => Vec::new(),
        };
        Self::new(boundaries, intervals).map(Some)
    }

    pub fn is_single(&self) -> bool {
        self.boundaries.len() == 1
    }

    /// Writes the schedule into the document's `&FRESCO` parameters.
    pub fn apply_to(&self, document: &mut ParsedDocument) {
        let parameters = &mut document.parameters;
        if self.is_single() {
            parameters.insert(ELAB.to_string(), NamelistValue::Real(self.boundaries[0]));
            if matches!(parameters.get(NLAB), Some(NamelistValue::Array(_))) {
                parameters.remove(NLAB);
            }
            return;
        }

        parameters.insert(
            ELAB.to_string(),
            NamelistValue::Array(
                self.boundaries
                    .iter()
                    .map(|energy| NamelistValue::Real(*energy))
                    .collect(),
            ),
        );
        parameters.insert(
            NLAB.to_string(),
            NamelistValue::Array(
                self.intervals
                    .iter()
                    .map(|count| NamelistValue::Integer(i64::from(*count)))
                    .collect(),
            ),
        );
    }
}

fn numeric(name: &str, value: &NamelistValue) -> EngineResult<f64> {
    match value {
        NamelistValue::Text(text) => text.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    }
    .filter(|number| number.is_finite())
    .ok_or_else(|| {
        EngineError::invalid_value(name, format!("expected an energy, found {value}"))
    })
}

/// Zero, negative or non-numeric counts fall back to one step.
fn interval(value: &NamelistValue) -> u32 {
    value
        .as_i64()
        .and_then(|count| u32::try_from(count).ok())
        .filter(|count| *count >= 1)
        .unwrap_or(1)
}
