mod data;

use crate::domain::{CalculationType, EngineError, EngineResult, NamelistValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ParameterCategory {
    #[serde(rename = "radial")]
    Radial,
    #[serde(rename = "partialWaves")]
    PartialWaves,
    #[serde(rename = "angular")]
    Angular,
    #[serde(rename = "coupled")]
    Coupled,
    #[serde(rename = "iterations")]
    Iterations,
    #[serde(rename = "output")]
    Output,
    #[serde(rename = "advanced")]
    Advanced,
}

impl ParameterCategory {
    pub const ALL: [Self; 7] = [
        Self::Radial,
        Self::PartialWaves,
        Self::Angular,
        Self::Coupled,
        Self::Iterations,
        Self::Output,
        Self::Advanced,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Radial => "radial",
            Self::PartialWaves => "partialWaves",
            Self::Angular => "angular",
            Self::Coupled => "coupled",
            Self::Iterations => "iterations",
            Self::Output => "output",
            Self::Advanced => "advanced",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Radial => "Radial Coordinates",
            Self::PartialWaves => "Partial Waves",
            Self::Angular => "Angular Distributions",
            Self::Coupled => "Coupled Equations",
            Self::Iterations => "Iterations & Convergence",
            Self::Output => "Output Control",
            Self::Advanced => "Advanced Options",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Radial => "Wave function calculation and radial grid parameters",
            Self::PartialWaves => "Angular momentum and J-value control",
            Self::Angular => "Scattering angle and analyzing power parameters",
            Self::Coupled => "Coupling definition and accuracy parameters",
            Self::Iterations => "Iteration control and convergence criteria",
            Self::Output => "File output and printing options",
            Self::Advanced => "Specialized and advanced parameters",
        }
    }
}

impl Display for ParameterCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for ParameterCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown parameter category '{}'", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericRange {
    pub minimum: f64,
    pub maximum: f64,
    pub step: f64,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: i64,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ValueKind {
    Number(NumericRange),
    Text,
    Choice { options: &'static [ChoiceOption] },
    Boolean,
}

impl ValueKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text => "text",
            Self::Choice { .. } => "choice",
            Self::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterDefault {
    Integer(i64),
    Real(f64),
    Text(&'static str),
}

impl ParameterDefault {
    pub fn to_value(self) -> NamelistValue {
        match self {
            Self::Integer(value) => NamelistValue::Integer(value),
            Self::Real(value) => NamelistValue::Real(value),
            Self::Text(value) => NamelistValue::Text(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub tooltip: &'static str,
    #[serde(flatten)]
    pub kind: ValueKind,
    pub default: Option<ParameterDefault>,
    pub category: ParameterCategory,
}

impl ParameterSpec {
    /// Checks a candidate value against the declared kind and range.
    /// Parsed documents are never validated; only setters call this.
    pub fn validate(&self, value: &NamelistValue) -> EngineResult<()> {
        match (&self.kind, value) {
            (ValueKind::Number(range), NamelistValue::Integer(_) | NamelistValue::Real(_)) => {
                let number = value.as_f64().unwrap_or_default();
                if range.contains(number) {
                    Ok(())
                } else {
                    Err(EngineError::OutOfRangeValue {
                        name: self.name.to_string(),
                        value: number,
                        minimum: Some(range.minimum),
                        maximum: Some(range.maximum),
                    })
                }
            }
            (ValueKind::Choice { options }, _) => match value.as_i64() {
                Some(number) if options.iter().any(|option| option.value == number) => Ok(()),
                _ => Err(EngineError::invalid_value(
                    self.name,
                    format!(
                        "expected one of {}",
                        options
                            .iter()
                            .map(|option| option.value.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )),
            },
            (ValueKind::Text, _) => Ok(()),
            (ValueKind::Boolean, NamelistValue::Logical(_)) => Ok(()),
            (ValueKind::Number(_), _) => Err(EngineError::invalid_value(
                self.name,
                format!("expected a number, found {}", value.kind_name()),
            )),
            (ValueKind::Boolean, _) => Err(EngineError::invalid_value(
                self.name,
                format!("expected a logical, found {}", value.kind_name()),
            )),
        }
    }
}

/// Immutable registry of every known `&FRESCO` parameter.
#[derive(Debug, Clone)]
pub struct ParameterCatalog {
    specs: &'static [ParameterSpec],
    index: BTreeMap<&'static str, usize>,
}

impl ParameterCatalog {
    pub fn fresco() -> Self {
        Self::from_specs(data::FRESCO_PARAMETERS)
    }

    fn from_specs(specs: &'static [ParameterSpec]) -> Self {
        let index = specs
            .iter()
            .enumerate()
            .map(|(position, spec)| (spec.name, position))
            .collect();
        Self { specs, index }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&'static ParameterSpec> {
        let specs = self.specs;
        self.index
            .get(name.to_ascii_lowercase().as_str())
            .map(|position| &specs[*position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declaration order, which is also the generator's emission order.
    pub fn iter(&self) -> impl Iterator<Item = &'static ParameterSpec> {
        self.specs.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.specs.iter().map(|spec| spec.name)
    }

    pub fn by_category(&self, category: ParameterCategory) -> Vec<&'static ParameterSpec> {
        self.iter().filter(|spec| spec.category == category).collect()
    }

    pub fn default_general(calculation_type: CalculationType) -> &'static [&'static str] {
        match calculation_type {
            CalculationType::Elastic => data::ELASTIC_GENERAL,
            CalculationType::Inelastic => data::INELASTIC_GENERAL,
            CalculationType::Transfer => data::TRANSFER_GENERAL,
        }
    }
}

impl Default for ParameterCatalog {
    fn default() -> Self {
        Self::fresco()
    }
}
