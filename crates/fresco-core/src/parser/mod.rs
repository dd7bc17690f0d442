mod lexer;

use crate::catalog::ParameterCatalog;
use crate::domain::{
    BlockKind, EngineError, NamelistBlock, NamelistValue, OpaqueBlock, ParsedDocument,
    ParserResult, PartitionInfo, PotentialInstance,
};
use crate::potentials::{PotentialTypeRegistry, coulomb_alias_slot};
use crate::serialization::normalize_line_endings;
use lexer::{Assignment, RawBlock, Segment};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Highest array slot accepted in a subscript or expansion.
pub const MAX_SLOT: usize = 512;

/// Slot addressed by the `p0` key.
const P0_SLOT: usize = 7;

/// Parses namelist text into a document. Fails with `MalformedNamelist`
/// without producing a partial document.
pub fn parse_namelist(
    text: &str,
    catalog: &ParameterCatalog,
    registry: &PotentialTypeRegistry,
) -> ParserResult<ParsedDocument> {
    let normalized = normalize_line_endings(text);
    let segments = lexer::segment(&normalized)?;

    let mut builder = DocumentBuilder {
        catalog,
        registry,
        document: ParsedDocument::default(),
        seen_block: false,
    };
    for segment in segments {
        builder.push(segment)?;
    }
    Ok(builder.document)
}

/// Parses the right-hand side of one assignment, as written after `key=`.
/// Several values produce an array.
pub fn parse_value(text: &str) -> ParserResult<NamelistValue> {
    let assignments = lexer::parse_assignments(&format!("value={text}"), 1)?;
    if assignments.len() != 1 {
        return Err(EngineError::malformed(1, format!("'{text}' is not a single value")));
    }
    let mut values: Vec<NamelistValue> = assignments
        .into_iter()
        .flat_map(|assignment| assignment.values)
        .flatten()
        .collect();
    match values.len() {
        0 => Err(EngineError::malformed(1, "missing value")),
        1 => Ok(values.remove(0)),
        _ => Ok(NamelistValue::Array(values)),
    }
}

struct DocumentBuilder<'a> {
    catalog: &'a ParameterCatalog,
    registry: &'a PotentialTypeRegistry,
    document: ParsedDocument,
    seen_block: bool,
}

impl DocumentBuilder<'_> {
    fn push(&mut self, segment: Segment) -> ParserResult<()> {
        match segment {
            Segment::Text(text) if self.seen_block => self.document.trailer.push(text),
            Segment::Text(text) => self.document.header.push(text),
            Segment::Block(block) => {
                self.seen_block = true;
                self.push_block(block)?;
            }
        }
        Ok(())
    }

    fn push_block(&mut self, block: RawBlock) -> ParserResult<()> {
        let kind = BlockKind::from_keyword(&block.name);
        if !kind.is_recognized() {
            debug!(block = %kind, line = block.line, "keeping unrecognized block verbatim");
            self.document.counts.unknown += 1;
            self.document.passthrough.push(OpaqueBlock {
                name: block.name,
                body: normalize_opaque_body(&block.body),
            });
            return Ok(());
        }

        let assignments = lexer::parse_assignments(&block.body, block.line)?;
        if !carries_values(&assignments) {
            debug!(block = %kind, line = block.line, "list terminator");
            self.document.counts.terminators += 1;
            return Ok(());
        }
        debug!(
            block = %kind,
            line = block.line,
            assignments = assignments.len(),
            "parsed namelist block"
        );

        let counts = &mut self.document.counts;
        match kind {
            BlockKind::Fresco => {
                counts.fresco += 1;
                for assignment in assignments {
                    if !self.catalog.contains(&assignment.key) {
                        debug!(key = %assignment.key, "retaining uncataloged &FRESCO key");
                    }
                    assign_value(&mut self.document.parameters, assignment)?;
                }
            }
            BlockKind::Partition => {
                counts.partition += 1;
                let values = collect_values(assignments)?;
                self.document.partitions.push(partition_from_values(values));
            }
            BlockKind::States => {
                counts.states += 1;
                let states = NamelistBlock {
                    values: collect_values(assignments)?,
                };
                match self.document.partitions.last_mut() {
                    Some(partition) => partition.states.push(states),
                    None => self.document.orphan_states.push(states),
                }
            }
            BlockKind::Pot => {
                counts.pot += 1;
                let block_index = counts.pot;
                let potential = self.build_potential(block_index, assignments)?;
                self.document.potentials.push(potential);
            }
            BlockKind::Coupling => {
                counts.coupling += 1;
                let values = collect_values(assignments)?;
                self.document.couplings.push(NamelistBlock { values });
            }
            BlockKind::Overlap => {
                counts.overlap += 1;
                let values = collect_values(assignments)?;
                self.document.overlaps.push(NamelistBlock { values });
            }
            BlockKind::Unknown(_) => {}
        }
        Ok(())
    }

    fn build_potential(
        &mut self,
        block_index: usize,
        assignments: Vec<Assignment>,
    ) -> ParserResult<PotentialInstance> {
        let mut type_code = 0;
        let mut kp = None;
        for assignment in assignments.iter().filter(|a| a.subscript.is_none()) {
            match assignment.key.as_str() {
                "type" => {
                    if let Some(value) = last_integer(assignment)? {
                        type_code = i32::try_from(value).map_err(|_| {
                            EngineError::malformed(
                                assignment.line,
                                format!("potential type {value} is out of range"),
                            )
                        })?;
                    }
                }
                "kp" => {
                    if let Some(value) = last_integer(assignment)? {
                        kp = Some(value);
                    }
                }
                _ => {}
            }
        }

        let mut slots = Vec::new();
        let mut attributes = BTreeMap::new();
        for assignment in assignments {
            if let Some(start) = slot_start(&assignment, type_code) {
                fill_slots(&mut slots, start, &assignment)?;
            } else if assignment.subscript.is_some()
                || !matches!(assignment.key.as_str(), "type" | "kp")
            {
                assign_value(&mut attributes, assignment)?;
            }
        }

        let mut potential = PotentialInstance {
            block_index,
            kp,
            type_code,
            slots,
            fields: Vec::new(),
            extra: Vec::new(),
            unmapped: false,
            attributes,
        };
        if !resolve_fields(self.registry, &mut potential) {
            warn!(
                block = block_index,
                type_code, "potential type has no field mapping; keeping raw slots"
            );
            self.document
                .warnings
                .push(EngineError::UnmappedPotentialType {
                    type_code,
                    block: block_index,
                });
        }
        Ok(potential)
    }
}

/// Recomputes the named-field view of a potential from its slots. Returns
/// `false` when the type code is unmapped.
pub fn resolve_fields(registry: &PotentialTypeRegistry, potential: &mut PotentialInstance) -> bool {
    match registry.map_slots(potential.type_code, &potential.slots) {
        Some(mapping) => {
            potential.fields = mapping.fields;
            potential.extra = mapping.extra;
            potential.unmapped = false;
            true
        }
        None => {
            potential.fields.clear();
            potential.extra.clear();
            potential.unmapped = true;
            false
        }
    }
}

fn last_integer(assignment: &Assignment) -> ParserResult<Option<i64>> {
    let Some(value) = assignment.values.iter().rev().flatten().next() else {
        return Ok(None);
    };
    value.as_i64().map(Some).ok_or_else(|| {
        EngineError::malformed(
            assignment.line,
            format!("'{}' must be an integer", assignment.key),
        )
    })
}

fn slot_start(assignment: &Assignment, type_code: i32) -> Option<usize> {
    let key = assignment.key.as_str();
    if key == "p" {
        return Some(assignment.subscript.map_or(1, |subscript| subscript.start()));
    }
    if assignment.subscript.is_some() {
        return None;
    }
    if let Some(digits) = key.strip_prefix('p')
        && !digits.is_empty()
        && digits.chars().all(|ch| ch.is_ascii_digit())
    {
        return match digits.parse::<usize>() {
            Ok(0) => Some(P0_SLOT),
            Ok(slot) => Some(slot),
            Err(_) => Some(usize::MAX),
        };
    }
    if type_code == 0 {
        return coulomb_alias_slot(key);
    }
    None
}

fn fill_slots(slots: &mut Vec<f64>, start: usize, assignment: &Assignment) -> ParserResult<()> {
    for (offset, value) in assignment.values.iter().enumerate() {
        let slot = start.saturating_add(offset);
        if slot > MAX_SLOT {
            return Err(EngineError::malformed(
                assignment.line,
                format!("potential slot {slot} exceeds {MAX_SLOT}"),
            ));
        }
        if slots.len() < slot {
            slots.resize(slot, 0.0);
        }
        if let Some(value) = value {
            slots[slot - 1] = value.as_f64().ok_or_else(|| {
                EngineError::malformed(
                    assignment.line,
                    format!(
                        "potential slot '{}' needs a number, found {}",
                        assignment.key,
                        value.kind_name()
                    ),
                )
            })?;
        }
    }
    Ok(())
}

/// A block whose assignments are all null (`&COUPLING kind= /`) reads the
/// same as an empty one, so it is a list terminator too.
fn carries_values(assignments: &[Assignment]) -> bool {
    assignments
        .iter()
        .any(|assignment| assignment.values.iter().any(Option::is_some))
}

fn collect_values(assignments: Vec<Assignment>) -> ParserResult<BTreeMap<String, NamelistValue>> {
    let mut values = BTreeMap::new();
    for assignment in assignments {
        assign_value(&mut values, assignment)?;
    }
    Ok(values)
}

fn zero_like(value: Option<&NamelistValue>) -> NamelistValue {
    match value {
        Some(NamelistValue::Real(_)) => NamelistValue::Real(0.0),
        _ => NamelistValue::Integer(0),
    }
}

/// Applies one assignment the way Fortran list-directed input does: a lone
/// value replaces a scalar, anything else writes consecutive array slots
/// from the subscript start, zero-filling gaps.
fn assign_value(
    map: &mut BTreeMap<String, NamelistValue>,
    assignment: Assignment,
) -> ParserResult<()> {
    let Assignment {
        key,
        subscript,
        values,
        line,
    } = assignment;
    if values.is_empty() {
        return Ok(());
    }

    let existing_array = matches!(map.get(&key), Some(NamelistValue::Array(_)));
    if subscript.is_none() && values.len() == 1 && !existing_array {
        if let Some(value) = values.into_iter().flatten().next() {
            map.insert(key, value);
        }
        return Ok(());
    }

    let start = subscript.map_or(1, |subscript| subscript.start());
    let mut slots = match map.remove(&key) {
        Some(NamelistValue::Array(slots)) => slots,
        Some(scalar) => vec![scalar],
        None => Vec::new(),
    };
    for (offset, value) in values.into_iter().enumerate() {
        let slot = start + offset;
        if slot > MAX_SLOT {
            return Err(EngineError::malformed(
                line,
                format!("'{key}' slot {slot} exceeds {MAX_SLOT}"),
            ));
        }
        if slots.len() < slot {
            slots.resize(slot, zero_like(value.as_ref()));
        }
        if let Some(value) = value {
            slots[slot - 1] = value;
        }
    }
    map.insert(key, NamelistValue::Array(slots));
    Ok(())
}

fn text_of(value: &NamelistValue) -> Option<String> {
    match value {
        NamelistValue::Array(_) => None,
        NamelistValue::Text(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn take_with<T>(
    values: &mut BTreeMap<String, NamelistValue>,
    key: &str,
    convert: impl Fn(&NamelistValue) -> Option<T>,
) -> Option<T> {
    let converted = values.get(key).and_then(&convert)?;
    values.remove(key);
    Some(converted)
}

fn partition_from_values(mut values: BTreeMap<String, NamelistValue>) -> PartitionInfo {
    let number = |value: &NamelistValue| value.as_f64();
    PartitionInfo {
        projectile: take_with(&mut values, "namep", text_of).unwrap_or_default(),
        target: take_with(&mut values, "namet", text_of).unwrap_or_default(),
        projectile_mass: take_with(&mut values, "massp", number),
        target_mass: take_with(&mut values, "masst", number),
        projectile_charge: take_with(&mut values, "zp", number),
        target_charge: take_with(&mut values, "zt", number),
        q_value: take_with(&mut values, "qval", number),
        nex: take_with(&mut values, "nex", NamelistValue::as_i64),
        attributes: values,
        states: Vec::new(),
    }
}

fn normalize_opaque_body(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
