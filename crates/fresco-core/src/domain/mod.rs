pub mod document;
pub mod errors;

pub use document::{
    NamelistBlock, OpaqueBlock, ParsedDocument, PartitionInfo, PotentialInstance, PotentialSet,
    PotentialSetRole, ResolvedField, StructuralCounts,
};
pub use errors::{EngineError, EngineErrorCategory, EngineResult, ParserResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CalculationType {
    #[default]
    Elastic,
    Inelastic,
    Transfer,
}

impl CalculationType {
    pub const ALL: [Self; 3] = [Self::Elastic, Self::Inelastic, Self::Transfer];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elastic => "elastic",
            Self::Inelastic => "inelastic",
            Self::Transfer => "transfer",
        }
    }

    /// Number of potential sets (distinct `kp` values) a complete input of this
    /// kind carries. Transfer inputs use entrance, exit, both binding
    /// potentials and the remnant (core-core) potential.
    pub const fn expected_potential_sets(self) -> usize {
        match self {
            Self::Elastic | Self::Inelastic => 1,
            Self::Transfer => 5,
        }
    }
}

impl Display for CalculationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for CalculationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| {
                format!(
                    "unknown calculation type '{}' (expected elastic, inelastic or transfer)",
                    value
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Fresco,
    Partition,
    States,
    Pot,
    Coupling,
    Overlap,
    Unknown(String),
}

impl BlockKind {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_uppercase().as_str() {
            "FRESCO" => Self::Fresco,
            "PARTITION" => Self::Partition,
            "STATES" => Self::States,
            "POT" => Self::Pot,
            "COUPLING" => Self::Coupling,
            "OVERLAP" => Self::Overlap,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn keyword(&self) -> &str {
        match self {
            Self::Fresco => "FRESCO",
            Self::Partition => "PARTITION",
            Self::States => "STATES",
            Self::Pot => "POT",
            Self::Coupling => "COUPLING",
            Self::Overlap => "OVERLAP",
            Self::Unknown(keyword) => keyword,
        }
    }

    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "&{}", self.keyword())
    }
}

/// One raw value as written in a namelist. Arrays hold expanded 1-based slots
/// (`values[0]` is slot 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NamelistValue {
    Integer(i64),
    Real(f64),
    Logical(bool),
    Text(String),
    Array(Vec<NamelistValue>),
}

impl NamelistValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Real(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                Some(*value as i64)
            }
            _ => None,
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Logical(_) => "logical",
            Self::Text(_) => "text",
            Self::Array(_) => "array",
        }
    }
}

impl Display for NamelistValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => f.write_str(&crate::serialization::format_real(*value)),
            Self::Logical(value) => f.write_str(if *value { "T" } else { "F" }),
            Self::Text(value) => f.write_str(&crate::serialization::quote_text(value)),
            Self::Array(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockKind, CalculationType, NamelistValue};

    #[test]
    fn calculation_type_parses_case_insensitively() {
        assert_eq!("Transfer".parse::<CalculationType>(), Ok(CalculationType::Transfer));
        assert_eq!(" elastic ".parse::<CalculationType>(), Ok(CalculationType::Elastic));
        assert!("breakup".parse::<CalculationType>().is_err());
        assert_eq!(CalculationType::Inelastic.to_string(), "inelastic");
    }

    #[test]
    fn transfer_expects_five_potential_sets() {
        assert_eq!(CalculationType::Elastic.expected_potential_sets(), 1);
        assert_eq!(CalculationType::Inelastic.expected_potential_sets(), 1);
        assert_eq!(CalculationType::Transfer.expected_potential_sets(), 5);
    }

    #[test]
    fn block_keywords_are_case_insensitive_and_unknown_names_survive() {
        assert_eq!(BlockKind::from_keyword("partition"), BlockKind::Partition);
        assert_eq!(BlockKind::from_keyword("Pot"), BlockKind::Pot);
        let unknown = BlockKind::from_keyword("cdcc");
        assert_eq!(unknown, BlockKind::Unknown("CDCC".to_string()));
        assert!(!unknown.is_recognized());
        assert_eq!(unknown.to_string(), "&CDCC");
    }

    #[test]
    fn numeric_views_accept_integral_reals() {
        assert_eq!(NamelistValue::Real(3.0).as_i64(), Some(3));
        assert_eq!(NamelistValue::Real(3.5).as_i64(), None);
        assert_eq!(NamelistValue::Integer(7).as_f64(), Some(7.0));
        assert_eq!(NamelistValue::Text("7".to_string()).as_f64(), None);
    }

    #[test]
    fn display_uses_namelist_spelling() {
        let value = NamelistValue::Array(vec![
            NamelistValue::Real(6.9),
            NamelistValue::Integer(2),
            NamelistValue::Logical(true),
            NamelistValue::Text("it's".to_string()),
        ]);
        assert_eq!(value.to_string(), "6.9 2 T 'it''s'");
    }
}
