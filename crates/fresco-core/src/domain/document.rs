use super::errors::EngineError;
use super::{CalculationType, NamelistValue};
use serde::Serialize;
use std::collections::BTreeMap;

/// A recognized block whose contents are kept as a key/value map
/// (`&STATES`, `&COUPLING`, `&OVERLAP`).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NamelistBlock {
    pub values: BTreeMap<String, NamelistValue>,
}

impl NamelistBlock {
    pub fn get(&self, key: &str) -> Option<&NamelistValue> {
        self.values.get(&key.to_ascii_lowercase())
    }
}

/// An unrecognized block, carried through verbatim (comments stripped).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpaqueBlock {
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedField {
    pub name: &'static str,
    pub slot: usize,
    pub value: f64,
    pub defaulted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialInstance {
    /// 1-based ordinal of the originating `&POT` block.
    pub block_index: usize,
    pub kp: Option<i64>,
    pub type_code: i32,
    /// Raw slots; `slots[0]` is `p1`.
    pub slots: Vec<f64>,
    pub fields: Vec<ResolvedField>,
    pub extra: Vec<f64>,
    pub unmapped: bool,
    pub attributes: BTreeMap<String, NamelistValue>,
}

impl PotentialInstance {
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
            .map(|field| field.value)
    }

    pub fn slot(&self, slot: usize) -> Option<f64> {
        slot.checked_sub(1)
            .and_then(|index| self.slots.get(index))
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PotentialSetRole {
    Entrance,
    Exit,
    ProjectileBinding,
    ResidualBinding,
    Remnant,
}

impl PotentialSetRole {
    const TRANSFER_ORDER: [Self; 5] = [
        Self::Entrance,
        Self::Exit,
        Self::ProjectileBinding,
        Self::ResidualBinding,
        Self::Remnant,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entrance => "entrance",
            Self::Exit => "exit",
            Self::ProjectileBinding => "projectile-binding",
            Self::ResidualBinding => "residual-binding",
            Self::Remnant => "remnant",
        }
    }
}

/// Potentials sharing one `kp`, in first-appearance order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialSet {
    pub kp: Option<i64>,
    pub role: Option<PotentialSetRole>,
    /// Indices into `ParsedDocument::potentials`.
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PartitionInfo {
    pub projectile: String,
    pub target: String,
    pub projectile_mass: Option<f64>,
    pub target_mass: Option<f64>,
    pub projectile_charge: Option<f64>,
    pub target_charge: Option<f64>,
    pub q_value: Option<f64>,
    pub nex: Option<i64>,
    pub attributes: BTreeMap<String, NamelistValue>,
    pub states: Vec<NamelistBlock>,
}

/// Block tallies. Empty list terminators (`&pot /`) are counted only in
/// `terminators`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StructuralCounts {
    pub fresco: usize,
    pub partition: usize,
    pub states: usize,
    pub pot: usize,
    pub coupling: usize,
    pub overlap: usize,
    pub unknown: usize,
    pub terminators: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParsedDocument {
    pub header: Vec<String>,
    pub parameters: BTreeMap<String, NamelistValue>,
    pub orphan_states: Vec<NamelistBlock>,
    pub partitions: Vec<PartitionInfo>,
    pub potentials: Vec<PotentialInstance>,
    pub couplings: Vec<NamelistBlock>,
    pub overlaps: Vec<NamelistBlock>,
    pub passthrough: Vec<OpaqueBlock>,
    pub trailer: Vec<String>,
    pub counts: StructuralCounts,
    #[serde(skip)]
    pub warnings: Vec<EngineError>,
}

impl ParsedDocument {
    pub fn parameter(&self, name: &str) -> Option<&NamelistValue> {
        self.parameters.get(&name.to_ascii_lowercase())
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    /// Groups potentials by `kp`. For transfer inputs the sets receive the
    /// conventional roles in order of first appearance; otherwise only the
    /// first set is labelled as the entrance channel.
    pub fn potential_sets(&self, calculation_type: CalculationType) -> Vec<PotentialSet> {
        let mut sets: Vec<PotentialSet> = Vec::new();
        for (index, potential) in self.potentials.iter().enumerate() {
            match sets.iter_mut().find(|set| set.kp == potential.kp) {
                Some(set) => set.members.push(index),
                None => sets.push(PotentialSet {
                    kp: potential.kp,
                    role: None,
                    members: vec![index],
                }),
            }
        }

        for (ordinal, set) in sets.iter_mut().enumerate() {
            set.role = match calculation_type {
                CalculationType::Transfer => PotentialSetRole::TRANSFER_ORDER.get(ordinal).copied(),
                _ if ordinal == 0 => Some(PotentialSetRole::Entrance),
                _ => None,
            };
        }
        sets
    }

    /// Equality over everything the generator reproduces. Structural counts,
    /// terminators, warnings and the derived field views are ignored.
    pub fn semantically_equals(&self, other: &Self) -> bool {
        self.header == other.header
            && self.parameters == other.parameters
            && self.orphan_states == other.orphan_states
            && self.partitions == other.partitions
            && self.potentials.len() == other.potentials.len()
            && self
                .potentials
                .iter()
                .zip(&other.potentials)
                .all(|(left, right)| {
                    left.kp == right.kp
                        && left.type_code == right.type_code
                        && left.slots == right.slots
                        && left.attributes == right.attributes
                })
            && self.couplings == other.couplings
            && self.overlaps == other.overlaps
            && self.passthrough == other.passthrough
            && self.trailer == other.trailer
    }
}

#[cfg(test)]
mod tests {
    use super::{ParsedDocument, PotentialInstance, PotentialSetRole};
    use crate::domain::CalculationType;
    use std::collections::BTreeMap;

    fn potential(block_index: usize, kp: Option<i64>, type_code: i32) -> PotentialInstance {
        PotentialInstance {
            block_index,
            kp,
            type_code,
            slots: vec![1.0],
            fields: Vec::new(),
            extra: Vec::new(),
            unmapped: false,
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn transfer_sets_take_roles_in_appearance_order() {
        let document = ParsedDocument {
            potentials: vec![
                potential(1, Some(1), 0),
                potential(2, Some(1), 1),
                potential(3, Some(2), 0),
                potential(4, Some(3), 1),
                potential(5, Some(4), 1),
                potential(6, Some(5), 1),
            ],
            ..ParsedDocument::default()
        };

        let sets = document.potential_sets(CalculationType::Transfer);
        assert_eq!(sets.len(), 5);
        assert_eq!(sets[0].members, vec![0, 1]);
        assert_eq!(sets[0].role, Some(PotentialSetRole::Entrance));
        assert_eq!(sets[1].role, Some(PotentialSetRole::Exit));
        assert_eq!(sets[4].role, Some(PotentialSetRole::Remnant));
        assert_eq!(sets[4].kp, Some(5));
    }

    #[test]
    fn elastic_documents_label_only_the_first_set() {
        let document = ParsedDocument {
            potentials: vec![potential(1, Some(1), 0), potential(2, Some(2), 1)],
            ..ParsedDocument::default()
        };

        let sets = document.potential_sets(CalculationType::Elastic);
        assert_eq!(sets[0].role, Some(PotentialSetRole::Entrance));
        assert_eq!(sets[1].role, None);
    }

    #[test]
    fn semantic_equality_ignores_counts_and_derived_fields() {
        let mut left = ParsedDocument {
            potentials: vec![potential(1, Some(1), 1)],
            ..ParsedDocument::default()
        };
        let mut right = left.clone();
        right.counts.terminators = 4;
        right.potentials[0].unmapped = true;
        assert!(left.semantically_equals(&right));

        left.potentials[0].slots.push(2.0);
        assert!(!left.semantically_equals(&right));
    }
}
