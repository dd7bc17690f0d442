use crate::catalog::ParameterCatalog;
use crate::domain::{NamelistValue, ParsedDocument, PartitionInfo, PotentialInstance};
use crate::potentials::{COULOMB_ALIASES, PotentialTypeRegistry};
use crate::serialization::{format_real, quote_text};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_PARAMS_PER_LINE: usize = 5;
pub const DEFAULT_INDENT: &str = "     ";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratorOptions {
    pub params_per_line: usize,
    pub indent: String,
    /// Emit the empty `&partition /`, `&pot /`, `&overlap /` and
    /// `&coupling /` list terminators.
    pub emit_terminators: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            params_per_line: DEFAULT_PARAMS_PER_LINE,
            indent: DEFAULT_INDENT.to_string(),
            emit_terminators: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Inline,
    Wrapped,
}

/// Renders a document back to namelist text in canonical block order.
pub fn generate(
    document: &ParsedDocument,
    catalog: &ParameterCatalog,
    registry: &PotentialTypeRegistry,
    options: &GeneratorOptions,
) -> String {
    let mut writer = BlockWriter {
        out: String::new(),
        options,
    };

    for line in &document.header {
        writer.line(line);
    }

    writer.block("FRESCO", &fresco_items(&document.parameters, catalog), Layout::Wrapped);

    for states in &document.orphan_states {
        writer.block("STATES", &value_items(&states.values), Layout::Inline);
    }
    for partition in &document.partitions {
        writer.block("PARTITION", &partition_items(partition), Layout::Inline);
        for states in &partition.states {
            writer.block("STATES", &value_items(&states.values), Layout::Inline);
        }
    }
    writer.terminator("partition");

    for potential in &document.potentials {
        writer.block("POT", &potential_items(potential, registry), Layout::Inline);
    }
    writer.terminator("pot");

    for overlap in &document.overlaps {
        writer.block("OVERLAP", &value_items(&overlap.values), Layout::Inline);
    }
    writer.terminator("overlap");

    for coupling in &document.couplings {
        writer.block("COUPLING", &value_items(&coupling.values), Layout::Inline);
    }
    writer.terminator("coupling");

    for opaque in &document.passthrough {
        let lines: Vec<String> = opaque.body.lines().map(str::to_string).collect();
        let layout = if lines.len() > 1 {
            Layout::Wrapped
        } else {
            Layout::Inline
        };
        writer.block(&opaque.name, &lines, layout);
    }

    for line in &document.trailer {
        writer.line(line);
    }

    writer.out
}

struct BlockWriter<'a> {
    out: String,
    options: &'a GeneratorOptions,
}

impl BlockWriter<'_> {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn terminator(&mut self, name: &str) {
        if self.options.emit_terminators {
            self.line(&format!(" &{name} /"));
        }
    }

    fn block(&mut self, name: &str, items: &[String], layout: Layout) {
        let per_line = self.options.params_per_line.max(1);
        if items.is_empty() {
            self.line(&format!(" &{name} /"));
            return;
        }
        if layout == Layout::Inline && items.len() <= per_line {
            self.line(&format!(" &{name} {} /", items.join(" ")));
            return;
        }

        self.line(&format!(" &{name}"));
        for chunk in items.chunks(per_line) {
            let text = format!("{}{}", self.options.indent, chunk.join(" "));
            self.line(&text);
        }
        self.line(" /");
    }
}

pub fn format_assignment(key: &str, value: &NamelistValue) -> String {
    match value {
        NamelistValue::Array(values) => format!("{key}(1:{})={value}", values.len()),
        scalar => format!("{key}={scalar}"),
    }
}

fn fresco_items(
    parameters: &BTreeMap<String, NamelistValue>,
    catalog: &ParameterCatalog,
) -> Vec<String> {
    let cataloged = catalog
        .names()
        .filter_map(|name| parameters.get(name).map(|value| format_assignment(name, value)));
    let uncataloged = parameters
        .iter()
        .filter(|(key, _)| !catalog.contains(key))
        .map(|(key, value)| format_assignment(key, value));
    cataloged.chain(uncataloged).collect()
}

fn value_items(values: &BTreeMap<String, NamelistValue>) -> Vec<String> {
    values
        .iter()
        .map(|(key, value)| format_assignment(key, value))
        .collect()
}

fn partition_items(partition: &PartitionInfo) -> Vec<String> {
    let mut items = Vec::new();
    let mut number = |key: &str, value: Option<f64>| {
        if let Some(value) = value {
            items.push(format!("{key}={}", format_real(value)));
        }
    };
    number("massp", partition.projectile_mass);
    number("zp", partition.projectile_charge);
    number("masst", partition.target_mass);
    number("zt", partition.target_charge);
    number("qval", partition.q_value);

    let mut names = Vec::new();
    if !partition.projectile.is_empty() {
        names.push(format!("namep={}", quote_text(&partition.projectile)));
    }
    if !partition.target.is_empty() {
        names.push(format!("namet={}", quote_text(&partition.target)));
    }
    names.append(&mut items);
    if let Some(nex) = partition.nex {
        names.push(format!("nex={nex}"));
    }
    names.extend(value_items(&partition.attributes));
    if names.is_empty() {
        // `&PARTITION /` would read back as the list terminator.
        names.push(format!("namep={}", quote_text("")));
    }
    names
}

fn potential_items(potential: &PotentialInstance, registry: &PotentialTypeRegistry) -> Vec<String> {
    let mut items = Vec::new();
    if let Some(kp) = potential.kp {
        items.push(format!("kp={kp}"));
    }
    items.push(format!("type={}", potential.type_code));

    let named = if potential.unmapped {
        0
    } else {
        registry
            .get(potential.type_code)
            .map_or(0, |spec| spec.fields.len())
            .min(potential.slots.len())
    };
    for (index, value) in potential.slots[..named].iter().enumerate() {
        let slot = index + 1;
        let key = match potential.type_code {
            0 => COULOMB_ALIASES[index].0.to_string(),
            _ => format!("p{slot}"),
        };
        items.push(format!("{key}={}", format_real(*value)));
    }
    if potential.slots.len() > named {
        let rest: Vec<String> = potential.slots[named..]
            .iter()
            .map(|value| format_real(*value))
            .collect();
        items.push(format!(
            "p({}:{})={}",
            named + 1,
            potential.slots.len(),
            rest.join(" ")
        ));
    }

    items.extend(value_items(&potential.attributes));
    items
}

#[cfg(test)]
mod tests {
    use super::{GeneratorOptions, format_assignment, generate};
    use crate::catalog::ParameterCatalog;
    use crate::domain::{NamelistValue, ParsedDocument};
    use crate::parser::parse_namelist;
    use crate::potentials::PotentialTypeRegistry;

    fn round_trip(text: &str) -> (ParsedDocument, String, ParsedDocument) {
        let catalog = ParameterCatalog::fresco();
        let registry = PotentialTypeRegistry::standard();
        let first = parse_namelist(text, &catalog, &registry).expect("input should parse");
        let generated = generate(&first, &catalog, &registry, &GeneratorOptions::default());
        let second =
            parse_namelist(&generated, &catalog, &registry).expect("generated text should parse");
        (first, generated, second)
    }

    #[test]
    fn assignments_use_namelist_spelling() {
        assert_eq!(
            format_assignment("hcm", &NamelistValue::Real(0.1)),
            "hcm=0.1"
        );
        assert_eq!(
            format_assignment(
                "elab",
                &NamelistValue::Array(vec![NamelistValue::Real(10.0), NamelistValue::Real(20.5)])
            ),
            "elab(1:2)=10.0 20.5"
        );
        assert_eq!(
            format_assignment("rela", &NamelistValue::Text("a".to_string())),
            "rela='a'"
        );
    }

    #[test]
    fn fresco_block_is_wrapped_in_catalog_order() {
        let (_, generated, _) = round_trip(
            "title\n&FRESCO zzz=1 thmax=180 hcm=0.1 elab=30 iter=1 rmatch=20 smats=2 /",
        );
        let expected = "title\n &FRESCO\n     hcm=0.1 rmatch=20 thmax=180 elab=30 iter=1\n     smats=2 zzz=1\n /\n";
        assert!(
            generated.starts_with(expected),
            "unexpected output:\n{generated}"
        );
    }

    #[test]
    fn potentials_use_named_slots_and_array_syntax_for_the_rest() {
        let (first, generated, second) = round_trip(
            "&POT kp=1 ap=1 at=58 rc=1.2 /\n\
             &POT kp=1 type=1 p(1:8)=47.9 1.2 0.66 2.8 1.2 0.66 0.5 0.25 shape=0 /\n\
             &POT kp=2 type=9 p(1:2)=0.5 0.1 /",
        );
        assert!(generated.contains(" &POT kp=1 type=0 ap=1.0 at=58.0 rc=1.2 /\n"));
        assert!(generated.contains("p6=0.66 p(7:8)=0.5 0.25 shape=0"));
        assert!(generated.contains(" &POT kp=2 type=9 p(1:2)=0.5 0.1 /\n"));
        assert!(first.semantically_equals(&second));
        assert_eq!(second.warnings.len(), 1);
    }

    #[test]
    fn canonical_order_places_terminators_after_each_list() {
        let (first, generated, second) = round_trip(
            "&FRESCO hcm=0.1 /\n\
             &COUPLING icto=2 icfrom=1 kind=7 /\n\
             &PARTITION namep='d' massp=2.014 zp=1 namet='208Pb' masst=208 zt=82 nex=1 /\n\
             &STATES jp=1 bandp=1 /\n\
             &PARTITION namep='p' massp=1.0078 zp=1 namet='209Pb' masst=209 zt=82 qval=1.7 nex=1 /\n\
             &STATES jp=0.5 /\n\
             &OVERLAP kn1=1 ic1=1 ic2=2 /\n\
             &EXTRA a=1 /\n",
        );
        let order: Vec<&str> = generated
            .lines()
            .filter_map(|line| line.trim_start().split_whitespace().next())
            .filter(|word| word.starts_with('&'))
            .collect();
        assert_eq!(
            order,
            vec![
                "&FRESCO",
                "&PARTITION",
                "&STATES",
                "&PARTITION",
                "&STATES",
                "&partition",
                "&pot",
                "&OVERLAP",
                "&overlap",
                "&COUPLING",
                "&coupling",
                "&EXTRA",
            ]
        );
        assert!(first.semantically_equals(&second));
        assert_eq!(second.counts.partition, 2);
        assert_eq!(second.counts.terminators, 4);
    }

    #[test]
    fn terminators_can_be_suppressed() {
        let catalog = ParameterCatalog::fresco();
        let registry = PotentialTypeRegistry::standard();
        let options = GeneratorOptions {
            emit_terminators: false,
            ..GeneratorOptions::default()
        };
        let generated = generate(&ParsedDocument::default(), &catalog, &registry, &options);
        assert_eq!(generated, " &FRESCO /\n");
    }

    #[test]
    fn partition_text_survives_quotes_and_attributes() {
        let (first, generated, second) = round_trip(
            "&PARTITION namep='it''s' namet=\"a/b\" massp=1 zp=1 masst=12 zt=6 pwf=T /",
        );
        assert!(generated.contains("namep='it''s' namet='a/b'"));
        assert!(generated.contains("pwf=T"));
        assert!(first.semantically_equals(&second));
        assert_eq!(second.partitions[0].projectile, "it's");
    }

    #[test]
    fn null_only_blocks_read_as_terminators_in_both_directions() {
        let (first, generated, second) = round_trip("&PARTITION namep='p' /\n&COUPLING kind= /\n");
        assert!(first.couplings.is_empty());
        assert_eq!(first.counts.terminators, 1);
        assert!(!generated.contains("&COUPLING kind"));
        assert!(first.semantically_equals(&second));
        assert_eq!(second.counts.coupling, 0);
    }

    #[test]
    fn unnamed_partition_keeps_a_placeholder_name() {
        let (first, generated, second) = round_trip("&PARTITION namep='' namet='' /\n");
        assert_eq!(first.partitions.len(), 1);
        assert!(generated.contains(" &PARTITION namep='' /"), "{generated}");
        assert_eq!(second.partitions.len(), 1);
        assert!(first.semantically_equals(&second));
    }
}
