use super::CliError;
use super::helpers::*;
use fresco_core::domain::{
    CalculationType, NamelistValue, PartitionInfo, PotentialSet, ResolvedField, StructuralCounts,
};
use fresco_core::manager::{CategorizationSummary, ParameterDetail};
use fresco_core::serialization::{format_real, normalize_line_endings};
use fresco_core::{EditingSession, EnergySchedule, EngineConfig, ParameterCategory};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub(super) struct InspectArgs {
    /// Namelist input file
    file: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct DetectArgs {
    /// Namelist input files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct FormatArgs {
    /// Namelist input file
    file: PathBuf,

    /// Write the regenerated text here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Only verify that regeneration preserves the document
    #[arg(long, conflicts_with = "output")]
    check: bool,
}

#[derive(clap::Args)]
pub(super) struct ParamsArgs {
    /// Namelist file whose parameters are promoted to general
    file: Option<PathBuf>,

    /// Calculation type (elastic, inelastic, transfer); overrides detection
    #[arg(long = "type", value_name = "TYPE")]
    calculation_type: Option<CalculationType>,

    /// Only show one category
    #[arg(long)]
    category: Option<ParameterCategory>,

    /// Print the categorization as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct SetArgs {
    /// Namelist input file
    file: PathBuf,

    /// `&FRESCO` assignments such as `hcm=0.05` or `elab='30.0'`
    #[arg(value_name = "NAME=VALUE")]
    assignments: Vec<String>,

    /// Potential field edits such as `2:V=45.5` (1-based &POT index)
    #[arg(long = "pot", value_name = "INDEX:FIELD=VALUE")]
    potentials: Vec<String>,

    /// Laboratory energies, comma separated
    #[arg(long, value_delimiter = ',', value_name = "E1,E2,...")]
    energies: Vec<f64>,

    /// Steps between consecutive energies, comma separated
    #[arg(long, value_delimiter = ',', requires = "energies", value_name = "N1,N2,...")]
    steps: Vec<u32>,

    /// Write the result here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(long, conflicts_with = "output")]
    in_place: bool,
}

#[derive(clap::Args)]
pub(super) struct ScanArgs {
    /// Directory searched recursively
    dir: PathBuf,

    /// File name pattern
    #[arg(long, default_value = "*.in")]
    pattern: String,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct InspectReport<'a> {
    file: String,
    calculation_type: CalculationType,
    counts: &'a StructuralCounts,
    header: &'a [String],
    parameters: &'a BTreeMap<String, NamelistValue>,
    partitions: &'a [PartitionInfo],
    potentials: Vec<PotentialSummary<'a>>,
    potential_sets: Vec<PotentialSet>,
    energies: Option<EnergySchedule>,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct PotentialSummary<'a> {
    index: usize,
    kp: Option<i64>,
    type_code: i32,
    type_name: Option<&'static str>,
    slots: &'a [f64],
    fields: &'a [ResolvedField],
    extra: &'a [f64],
    unmapped: bool,
}

pub(super) fn run_inspect_command(args: InspectArgs, config: &EngineConfig) -> Result<i32, CliError> {
    let context = EngineContext::new(config);
    let (session, outcome) = context.open(&args.file)?;
    let document = session.document();

    let mut warnings: Vec<String> = outcome
        .warnings
        .iter()
        .map(|warning| warning.diagnostic_line())
        .collect();
    let energies = match session.energy_schedule() {
        Ok(schedule) => schedule,
        Err(error) => {
            warnings.push(format!("WARNING: [{}] {}", error.placeholder(), error));
            None
        }
    };

    let report = InspectReport {
        file: args.file.display().to_string(),
        calculation_type: outcome.calculation_type,
        counts: &document.counts,
        header: &document.header,
        parameters: &document.parameters,
        partitions: &document.partitions,
        potentials: document
            .potentials
            .iter()
            .map(|potential| PotentialSummary {
                index: potential.block_index,
                kp: potential.kp,
                type_code: potential.type_code,
                type_name: context
                    .registry
                    .get(potential.type_code)
                    .map(|spec| spec.name),
                slots: &potential.slots,
                fields: &potential.fields,
                extra: &potential.extra,
                unmapped: potential.unmapped,
            })
            .collect(),
        potential_sets: document.potential_sets(outcome.calculation_type),
        energies,
        warnings,
    };

    if args.json {
        print_json(&report)?;
    } else {
        for warning in &report.warnings {
            eprintln!("{warning}");
        }
        println!("{}", render_inspect_report(&report));
    }
    Ok(0)
}

fn render_inspect_report(report: &InspectReport<'_>) -> String {
    let counts = report.counts;
    let mut lines = vec![
        format!("file: {}", report.file),
        format!("calculation type: {}", report.calculation_type),
        format!(
            "blocks: fresco={} partition={} states={} pot={} coupling={} overlap={} unknown={} terminators={}",
            counts.fresco,
            counts.partition,
            counts.states,
            counts.pot,
            counts.coupling,
            counts.overlap,
            counts.unknown,
            counts.terminators
        ),
        format!("parameters: {}", report.parameters.len()),
    ];

    for (ordinal, partition) in report.partitions.iter().enumerate() {
        lines.push(format!(
            "partition {}: {} + {} ({} states)",
            ordinal + 1,
            partition.projectile,
            partition.target,
            partition.states.len()
        ));
    }

    for potential in &report.potentials {
        let name = match (potential.unmapped, potential.type_name) {
            (false, Some(name)) => name,
            _ => "unmapped",
        };
        let values: Vec<String> = if potential.unmapped {
            potential.slots.iter().map(|value| format_real(*value)).collect()
        } else {
            potential
                .fields
                .iter()
                .map(|field| format!("{}={}", field.name, format_real(field.value)))
                .chain(potential.extra.iter().map(|value| format_real(*value)))
                .collect()
        };
        lines.push(format!(
            "pot {}: kp={} type={} {}: {}",
            potential.index,
            potential
                .kp
                .map_or_else(|| "-".to_string(), |kp| kp.to_string()),
            potential.type_code,
            name,
            values.join(" ")
        ));
    }

    for set in &report.potential_sets {
        let role = set.role.map_or("unassigned", |role| role.as_str());
        let members: Vec<String> = set
            .members
            .iter()
            .map(|member| report.potentials[*member].index.to_string())
            .collect();
        lines.push(format!(
            "potential set kp={}: {} [{}]",
            set.kp.map_or_else(|| "-".to_string(), |kp| kp.to_string()),
            role,
            members.join(", ")
        ));
    }

    if let Some(schedule) = &report.energies {
        lines.push(format!("energies: {}", render_energies(schedule)));
    }
    lines.join("\n")
}

fn render_energies(schedule: &EnergySchedule) -> String {
    let mut text = String::new();
    for (position, energy) in schedule.boundaries.iter().enumerate() {
        if let Some(steps) = position.checked_sub(1).and_then(|i| schedule.intervals.get(i)) {
            text.push_str(&format!(" -{steps}- "));
        }
        text.push_str(&format_real(*energy));
    }
    text
}

#[derive(Serialize)]
struct DetectEntry<'a> {
    file: String,
    calculation_type: CalculationType,
    counts: &'a StructuralCounts,
}

pub(super) fn run_detect_command(args: DetectArgs, config: &EngineConfig) -> Result<i32, CliError> {
    let context = EngineContext::new(config);
    let mut sessions = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let (session, outcome) = context.open(file)?;
        sessions.push((file, session, outcome.calculation_type));
    }

    let entries: Vec<DetectEntry<'_>> = sessions
        .iter()
        .map(|(file, session, calculation_type)| DetectEntry {
            file: file.display().to_string(),
            calculation_type: *calculation_type,
            counts: &session.document().counts,
        })
        .collect();

    if args.json {
        print_json(&entries)?;
    } else {
        for entry in &entries {
            println!("{}: {}", entry.file, entry.calculation_type);
        }
    }
    Ok(0)
}

pub(super) fn run_format_command(args: FormatArgs, config: &EngineConfig) -> Result<i32, CliError> {
    let context = EngineContext::new(config);
    let original = read_namelist(&args.file)?;
    let mut session = context.session();
    session.load(&original).map_err(CliError::Engine)?;
    let generated = session.export();

    if args.check {
        return check_round_trip(&context, &args.file, &session, &original, &generated);
    }
    match &args.output {
        Some(path) => write_output(path, &generated)?,
        None => print!("{generated}"),
    }
    Ok(0)
}

fn check_round_trip(
    context: &EngineContext,
    file: &Path,
    session: &EditingSession<'_>,
    original: &str,
    generated: &str,
) -> Result<i32, CliError> {
    let mut reparsed = context.session();
    reparsed.load(generated).map_err(CliError::Engine)?;

    if !reparsed.document().semantically_equals(session.document()) {
        eprintln!(
            "{}: regenerated text does not reproduce the document",
            file.display()
        );
        return Ok(1);
    }
    let status = if normalize_line_endings(original) == generated {
        "canonical"
    } else {
        "round trip ok"
    };
    println!("{}: {status}", file.display());
    Ok(0)
}

#[derive(Serialize)]
struct ParamsReport<'a> {
    summary: CategorizationSummary,
    general: Vec<ParameterDetail>,
    advanced_by_category: BTreeMap<ParameterCategory, Vec<&'a str>>,
}

pub(super) fn run_params_command(args: ParamsArgs, config: &EngineConfig) -> Result<i32, CliError> {
    let context = EngineContext::new(config);
    let mut session = context.session();
    if let Some(file) = &args.file {
        let text = read_namelist(file)?;
        session.load(&text).map_err(CliError::Engine)?;
    }
    if let Some(calculation_type) = args.calculation_type {
        session.set_calculation_type(calculation_type);
    }

    let manager = session.manager();
    let in_scope =
        |category: ParameterCategory| args.category.is_none_or(|wanted| wanted == category);
    let report = ParamsReport {
        summary: manager.summary(),
        general: manager
            .general_parameter_details()
            .into_iter()
            .filter(|detail| in_scope(detail.spec.category))
            .collect(),
        advanced_by_category: manager
            .advanced_by_category()
            .into_iter()
            .filter(|(category, _)| in_scope(*category))
            .collect(),
    };

    if args.json {
        print_json(&report)?;
        return Ok(0);
    }

    println!(
        "calculation type: {} ({} general, {} advanced)",
        report.summary.calculation_type,
        report.summary.general_count,
        report.summary.advanced_count
    );
    println!("general:");
    for detail in &report.general {
        let marker = if detail.is_from_file { " *" } else { "" };
        println!("  {:<8} {}{marker}", detail.spec.name, detail.spec.label);
    }
    println!("advanced:");
    for (category, names) in &report.advanced_by_category {
        println!("  {} ({})", category.title(), category.description());
        println!("    {}", names.join(" "));
    }
    Ok(0)
}

pub(super) fn run_set_command(args: SetArgs, config: &EngineConfig) -> Result<i32, CliError> {
    let context = EngineContext::new(config);
    let (mut session, _) = context.open(&args.file)?;

    for assignment in &args.assignments {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            CliError::Usage(format!("expected NAME=VALUE, found '{assignment}'"))
        })?;
        session
            .set_parameter_text(name.trim(), value.trim())
            .map_err(CliError::Engine)?;
    }

    for edit in &args.potentials {
        let (index, field, value) = parse_potential_edit(edit)?;
        session
            .set_potential_field(index, field, value)
            .map_err(CliError::Engine)?;
    }

    if !args.energies.is_empty() {
        let schedule = EnergySchedule::new(args.energies.clone(), args.steps.clone())
            .map_err(CliError::Engine)?;
        session.set_energy_schedule(&schedule);
    }

    let generated = session.export();
    let target = if args.in_place {
        Some(args.file.as_path())
    } else {
        args.output.as_deref()
    };
    match target {
        Some(path) => write_output(path, &generated)?,
        None => print!("{generated}"),
    }
    Ok(0)
}

fn parse_potential_edit(edit: &str) -> Result<(usize, &str, f64), CliError> {
    let usage = || CliError::Usage(format!("expected INDEX:FIELD=VALUE, found '{edit}'"));
    let (index, assignment) = edit.split_once(':').ok_or_else(usage)?;
    let (field, value) = assignment.split_once('=').ok_or_else(usage)?;
    let index: usize = index.trim().parse().map_err(|_| usage())?;
    let value: f64 = value.trim().parse().map_err(|_| usage())?;
    Ok((index, field.trim(), value))
}

#[derive(Serialize)]
struct ScanEntry {
    file: String,
    calculation_type: Option<CalculationType>,
    warnings: usize,
    error: Option<String>,
}

#[derive(Serialize)]
struct ScanReport {
    root: String,
    pattern: String,
    failed: usize,
    files: Vec<ScanEntry>,
}

pub(super) fn run_scan_command(args: ScanArgs, config: &EngineConfig) -> Result<i32, CliError> {
    let context = EngineContext::new(config);
    let matcher = compile_pattern(&args.pattern)?;
    let files = collect_matching_files(&args.dir, &matcher)?;

    let entries: Vec<ScanEntry> = files
        .iter()
        .map(|path| {
            let file = path
                .strip_prefix(&args.dir)
                .unwrap_or(path)
                .display()
                .to_string();
            let loaded = read_namelist(path).and_then(|text| {
                let mut session = context.session();
                session.load(&text).map_err(CliError::Engine)
            });
            match loaded {
                Ok(outcome) => ScanEntry {
                    file,
                    calculation_type: Some(outcome.calculation_type),
                    warnings: outcome.warnings.len(),
                    error: None,
                },
                Err(error) => ScanEntry {
                    file,
                    calculation_type: None,
                    warnings: 0,
                    error: Some(error.diagnostic_line()),
                },
            }
        })
        .collect();

    let report = ScanReport {
        root: args.dir.display().to_string(),
        pattern: args.pattern.clone(),
        failed: entries.iter().filter(|entry| entry.error.is_some()).count(),
        files: entries,
    };

    if args.json {
        print_json(&report)?;
    } else {
        for entry in &report.files {
            match (&entry.calculation_type, &entry.error) {
                (Some(calculation_type), _) => {
                    println!("ok    {}  {calculation_type}", entry.file);
                }
                (None, Some(error)) => println!("FAIL  {}  {error}", entry.file),
                (None, None) => {}
            }
        }
        println!(
            "scanned {} files, {} failed",
            report.files.len(),
            report.failed
        );
    }

    Ok(if report.failed == 0 { 0 } else { 1 })
}
