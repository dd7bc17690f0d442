use crate::domain::{EngineError, EngineResult, ResolvedField};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PotentialField {
    pub name: &'static str,
    pub label: &'static str,
    pub default: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl PotentialField {
    pub fn contains(&self, value: f64) -> bool {
        self.minimum.is_none_or(|minimum| value >= minimum)
            && self.maximum.is_none_or(|maximum| value <= maximum)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PotentialTypeSpec {
    pub code: i32,
    pub name: &'static str,
    pub fields: &'static [PotentialField],
}

impl PotentialTypeSpec {
    /// 1-based slot holding the named field.
    pub fn slot_of(&self, field: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|candidate| candidate.name.eq_ignore_ascii_case(field))
            .map(|index| index + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PotentialMapping {
    pub fields: Vec<ResolvedField>,
    pub extra: Vec<f64>,
}

const fn field(
    name: &'static str,
    label: &'static str,
    default: Option<f64>,
    minimum: Option<f64>,
    maximum: Option<f64>,
) -> PotentialField {
    PotentialField {
        name,
        label,
        default,
        minimum,
        maximum,
    }
}

const COULOMB: &[PotentialField] = &[
    field("ap", "Projectile mass number", Some(4.0), Some(0.0), Some(300.0)),
    field("at", "Target mass number", Some(12.0), Some(0.0), Some(300.0)),
    field("rc", "Coulomb radius", Some(1.3), Some(0.0), Some(5.0)),
    field("ac", "Coulomb diffuseness", Some(0.0), Some(0.0), Some(2.0)),
];

const CENTRAL: &[PotentialField] = &[
    field("V", "Real depth", Some(50.0), Some(-500.0), Some(500.0)),
    field("r0", "Real radius", Some(1.2), Some(0.1), Some(5.0)),
    field("a", "Real diffuseness", Some(0.65), Some(0.1), Some(2.0)),
    field("W", "Imaginary depth", Some(0.0), Some(-500.0), Some(500.0)),
    field("r0W", "Imaginary radius", Some(1.2), Some(0.1), Some(5.0)),
    field("aW", "Imaginary diffuseness", Some(0.65), Some(0.1), Some(2.0)),
];

const SPIN_ORBIT: &[PotentialField] = &[
    field("Vso", "Spin-orbit strength", Some(0.0), Some(-100.0), Some(100.0)),
    field("rso", "Spin-orbit radius", Some(1.2), Some(0.1), Some(5.0)),
    field("aso", "Spin-orbit diffuseness", Some(0.65), Some(0.1), Some(2.0)),
];

const TENSOR: &[PotentialField] = &[
    field("Vt", "Tensor strength", Some(0.0), Some(-100.0), Some(100.0)),
    field("rt", "Tensor radius", Some(1.2), Some(0.1), Some(5.0)),
    field("at", "Tensor diffuseness", Some(0.65), Some(0.1), Some(2.0)),
];

const SPIN_SPIN: &[PotentialField] = &[
    field("Vss", "Spin-spin strength", Some(0.0), Some(-100.0), Some(100.0)),
    field("rss", "Spin-spin radius", Some(1.2), Some(0.1), Some(5.0)),
    field("ass", "Spin-spin diffuseness", Some(0.65), Some(0.1), Some(2.0)),
];

const DEFORMATION: &[PotentialField] = &[
    field("def1", "Deformation length k=1", None, None, None),
    field("def2", "Deformation length k=2", None, None, None),
    field("def3", "Deformation length k=3", None, None, None),
    field("def4", "Deformation length k=4", None, None, None),
    field("def5", "Deformation length k=5", None, None, None),
    field("def6", "Deformation length k=6", None, None, None),
];

const STANDARD_TYPES: [PotentialTypeSpec; 13] = [
    PotentialTypeSpec {
        code: 0,
        name: "Coulomb",
        fields: COULOMB,
    },
    PotentialTypeSpec {
        code: 1,
        name: "Volume",
        fields: CENTRAL,
    },
    PotentialTypeSpec {
        code: 2,
        name: "Surface",
        fields: CENTRAL,
    },
    PotentialTypeSpec {
        code: 3,
        name: "Projectile spin-orbit",
        fields: SPIN_ORBIT,
    },
    PotentialTypeSpec {
        code: 4,
        name: "Target spin-orbit",
        fields: SPIN_ORBIT,
    },
    PotentialTypeSpec {
        code: 5,
        name: "Projectile Tr tensor",
        fields: TENSOR,
    },
    PotentialTypeSpec {
        code: 6,
        name: "Target Tr tensor",
        fields: TENSOR,
    },
    PotentialTypeSpec {
        code: 7,
        name: "L.S tensor",
        fields: TENSOR,
    },
    PotentialTypeSpec {
        code: 8,
        name: "Spin-spin",
        fields: SPIN_SPIN,
    },
    PotentialTypeSpec {
        code: 10,
        name: "Deformed (Coulomb and nuclear)",
        fields: DEFORMATION,
    },
    PotentialTypeSpec {
        code: 11,
        name: "Deformed (nuclear)",
        fields: DEFORMATION,
    },
    PotentialTypeSpec {
        code: 12,
        name: "Deformed (projectile, Coulomb and nuclear)",
        fields: DEFORMATION,
    },
    PotentialTypeSpec {
        code: 13,
        name: "Deformed (projectile, nuclear)",
        fields: DEFORMATION,
    },
];

/// Named keys that address Coulomb (type 0) slots directly.
pub const COULOMB_ALIASES: [(&str, usize); 4] = [("ap", 1), ("at", 2), ("rc", 3), ("ac", 4)];

/// Immutable table from potential type code to its ordered field list.
#[derive(Debug, Clone, Copy)]
pub struct PotentialTypeRegistry {
    types: &'static [PotentialTypeSpec],
}

impl PotentialTypeRegistry {
    pub fn standard() -> Self {
        Self {
            types: &STANDARD_TYPES,
        }
    }

    pub fn get(&self, code: i32) -> Option<&'static PotentialTypeSpec> {
        let types = self.types;
        types.iter().find(|spec| spec.code == code)
    }

    /// Resolves raw slots to named fields. Missing trailing fields take the
    /// field default, or are omitted when none is declared; surplus slots
    /// come back in `extra`. `None` means the type code is unmapped.
    pub fn map_slots(&self, code: i32, slots: &[f64]) -> Option<PotentialMapping> {
        let spec = self.get(code)?;
        let fields = spec
            .fields
            .iter()
            .enumerate()
            .filter_map(|(index, field)| match slots.get(index) {
                Some(value) => Some(ResolvedField {
                    name: field.name,
                    slot: index + 1,
                    value: *value,
                    defaulted: false,
                }),
                None => field.default.map(|value| ResolvedField {
                    name: field.name,
                    slot: index + 1,
                    value,
                    defaulted: true,
                }),
            })
            .collect();
        let extra = slots.get(spec.fields.len()..).unwrap_or_default().to_vec();
        Some(PotentialMapping { fields, extra })
    }

    /// Finds the slot for `field` and checks `value` against its range.
    pub fn validate_field(&self, code: i32, field: &str, value: f64) -> EngineResult<usize> {
        let unknown = || EngineError::UnknownPotentialField {
            type_code: code,
            field: field.to_string(),
        };
        let spec = self.get(code).ok_or_else(unknown)?;
        let slot = spec.slot_of(field).ok_or_else(unknown)?;
        let definition = &spec.fields[slot - 1];
        if !value.is_finite() {
            return Err(EngineError::invalid_value(field, "value must be finite"));
        }
        if !definition.contains(value) {
            return Err(EngineError::OutOfRangeValue {
                name: definition.name.to_string(),
                value,
                minimum: definition.minimum,
                maximum: definition.maximum,
            });
        }
        Ok(slot)
    }

    /// Value a slot should take when the field list is padded up to it.
    pub fn padding_value(&self, code: i32, slot: usize) -> f64 {
        self.get(code)
            .and_then(|spec| slot.checked_sub(1).and_then(|index| spec.fields.get(index)))
            .and_then(|field| field.default)
            .unwrap_or(0.0)
    }
}

impl Default for PotentialTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn coulomb_alias_slot(key: &str) -> Option<usize> {
    COULOMB_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(key))
        .map(|(_, slot)| *slot)
}

#[cfg(test)]
mod tests {
    use super::{PotentialTypeRegistry, coulomb_alias_slot};
    use crate::domain::EngineError;

    #[test]
    fn volume_potential_fills_missing_fields_from_defaults() {
        let registry = PotentialTypeRegistry::standard();
        let mapping = registry
            .map_slots(1, &[50.0, 1.2, 0.7])
            .expect("type 1 should be mapped");

        let resolved: Vec<_> = mapping
            .fields
            .iter()
            .map(|field| (field.name, field.value, field.defaulted))
            .collect();
        assert_eq!(
            resolved,
            vec![
                ("V", 50.0, false),
                ("r0", 1.2, false),
                ("a", 0.7, false),
                ("W", 0.0, true),
                ("r0W", 1.2, true),
                ("aW", 0.65, true),
            ]
        );
        assert!(mapping.extra.is_empty());
    }

    #[test]
    fn surplus_slots_are_kept_as_extra() {
        let registry = PotentialTypeRegistry::standard();
        let mapping = registry
            .map_slots(3, &[5.0, 1.1, 0.6, 0.0, 9.0])
            .expect("type 3 should be mapped");
        assert_eq!(mapping.fields.len(), 3);
        assert_eq!(mapping.extra, vec![0.0, 9.0]);
    }

    #[test]
    fn fields_without_defaults_are_omitted() {
        let registry = PotentialTypeRegistry::standard();
        let mapping = registry
            .map_slots(11, &[0.0, 1.3])
            .expect("type 11 should be mapped");
        let names: Vec<_> = mapping.fields.iter().map(|field| field.name).collect();
        assert_eq!(names, vec!["def1", "def2"]);
    }

    #[test]
    fn unknown_codes_are_unmapped() {
        let registry = PotentialTypeRegistry::standard();
        assert!(registry.map_slots(9, &[1.0]).is_none());
        assert!(registry.map_slots(42, &[]).is_none());
        assert!(registry.get(9).is_none());
    }

    #[test]
    fn field_validation_reports_range_and_unknown_names() {
        let registry = PotentialTypeRegistry::standard();
        assert_eq!(registry.validate_field(1, "r0w", 1.1), Ok(5));
        assert!(matches!(
            registry.validate_field(1, "a", 7.0),
            Err(EngineError::OutOfRangeValue { .. })
        ));
        assert!(matches!(
            registry.validate_field(0, "V", 1.0),
            Err(EngineError::UnknownPotentialField { type_code: 0, .. })
        ));
    }

    #[test]
    fn coulomb_aliases_address_the_first_four_slots() {
        assert_eq!(coulomb_alias_slot("AP"), Some(1));
        assert_eq!(coulomb_alias_slot("rc"), Some(3));
        assert_eq!(coulomb_alias_slot("r0"), None);
        let registry = PotentialTypeRegistry::standard();
        assert_eq!(registry.padding_value(0, 3), 1.3);
        assert_eq!(registry.padding_value(11, 1), 0.0);
    }
}
