use crate::catalog::ParameterCatalog;
use crate::detect::detect_document_type;
use crate::domain::{CalculationType, EngineError, EngineResult, NamelistValue, ParsedDocument};
use crate::energy::EnergySchedule;
use crate::generator::{GeneratorOptions, generate};
use crate::manager::ParameterManager;
use crate::parser::{parse_namelist, parse_value, resolve_fields};
use crate::potentials::PotentialTypeRegistry;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Result of a successful [`EditingSession::load`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub calculation_type: CalculationType,
    pub promoted: BTreeSet<String>,
    pub warnings: Vec<EngineError>,
}

/// One open input file: the parsed document plus its categorization.
///
/// Every setter validates before it writes, so a rejected edit leaves the
/// document exactly as it was.
#[derive(Debug)]
pub struct EditingSession<'a> {
    catalog: &'a ParameterCatalog,
    registry: &'a PotentialTypeRegistry,
    options: GeneratorOptions,
    document: ParsedDocument,
    manager: ParameterManager<'a>,
}

impl<'a> EditingSession<'a> {
    pub fn new(
        catalog: &'a ParameterCatalog,
        registry: &'a PotentialTypeRegistry,
        calculation_type: CalculationType,
    ) -> Self {
        Self {
            catalog,
            registry,
            options: GeneratorOptions::default(),
            document: ParsedDocument::default(),
            manager: ParameterManager::new(catalog, calculation_type),
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the document with `text`. The categorization is re-seeded
    /// for the detected type and then promoted from the file's parameters.
    /// On a parse failure nothing changes.
    pub fn load(&mut self, text: &str) -> EngineResult<LoadOutcome> {
        let document = parse_namelist(text, self.catalog, self.registry)?;
        let calculation_type = detect_document_type(&document);

        self.manager.seed(calculation_type);
        let promoted = self.manager.promote(&document);
        let warnings = document.warnings.clone();
        self.document = document;

        info!(
            calculation_type = %calculation_type,
            parameters = self.document.parameters.len(),
            potentials = self.document.potentials.len(),
            warnings = warnings.len(),
            "loaded namelist"
        );
        Ok(LoadOutcome {
            calculation_type,
            promoted,
            warnings,
        })
    }

    pub fn document(&self) -> &ParsedDocument {
        &self.document
    }

    pub fn manager(&self) -> &ParameterManager<'a> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ParameterManager<'a> {
        &mut self.manager
    }

    pub fn calculation_type(&self) -> CalculationType {
        self.manager.calculation_type()
    }

    pub fn set_calculation_type(&mut self, calculation_type: CalculationType) {
        self.manager.set_calculation_type(calculation_type);
    }

    pub fn set_parameter(&mut self, name: &str, value: NamelistValue) -> EngineResult<()> {
        let spec = self
            .catalog
            .get(name)
            .ok_or_else(|| EngineError::UnknownParameter(name.to_string()))?;
        spec.validate(&value)?;
        debug!(parameter = spec.name, value = %value, "parameter set");
        self.document.parameters.insert(spec.name.to_string(), value);
        Ok(())
    }

    /// Like [`set_parameter`](Self::set_parameter), with the value written
    /// in namelist syntax (`0.1`, `'58Ni'`, `T`, `10 20 30`).
    pub fn set_parameter_text(&mut self, name: &str, text: &str) -> EngineResult<()> {
        let value = parse_value(text)?;
        self.set_parameter(name, value)
    }

    /// Removes a parameter. Returns whether it was set.
    pub fn clear_parameter(&mut self, name: &str) -> bool {
        self.document
            .parameters
            .remove(&name.to_ascii_lowercase())
            .is_some()
    }

    /// Sets a named field of the 1-based `index`-th `&POT` block. Slots
    /// below the field that are not yet present are filled with the
    /// fields' defaults.
    pub fn set_potential_field(&mut self, index: usize, field: &str, value: f64) -> EngineResult<()> {
        let count = self.document.potentials.len();
        let potential = index
            .checked_sub(1)
            .and_then(|position| self.document.potentials.get_mut(position))
            .ok_or(EngineError::PotentialIndex { index, count })?;

        let slot = self
            .registry
            .validate_field(potential.type_code, field, value)?;
        while potential.slots.len() < slot {
            let next = potential.slots.len() + 1;
            potential
                .slots
                .push(self.registry.padding_value(potential.type_code, next));
        }
        potential.slots[slot - 1] = value;
        resolve_fields(self.registry, potential);

        debug!(potential = index, field, slot, value, "potential field set");
        Ok(())
    }

    pub fn energy_schedule(&self) -> EngineResult<Option<EnergySchedule>> {
        EnergySchedule::from_document(&self.document)
    }

    pub fn set_energy_schedule(&mut self, schedule: &EnergySchedule) {
        schedule.apply_to(&mut self.document);
    }

    /// Renders the current document as namelist text.
    pub fn export(&self) -> String {
        generate(&self.document, self.catalog, self.registry, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::EditingSession;
    use crate::catalog::ParameterCatalog;
    use crate::domain::{CalculationType, EngineError, NamelistValue};
    use crate::energy::EnergySchedule;
    use crate::potentials::PotentialTypeRegistry;

    const INELASTIC: &str = "\
12C + alpha inelastic
NAMELIST
 &FRESCO hcm=0.05 rmatch=20 elab=100 iter=0 kqmax=2 /
 &PARTITION namep='alpha' massp=4 zp=2 namet='12C' masst=12 zt=6 nex=2 /
 &STATES jp=0 bandp=1 jt=0 bandt=1 cpot=1 /
 &STATES copyp=1 jt=2 bandt=1 et=4.44 /
 &partition /
 &POT kp=1 ap=4 at=12 rc=1.2 /
 &POT kp=1 type=1 p1=40 p2=1.2 p3=0.7 /
 &pot /
 &overlap /
 &COUPLING icto=1 icfrom=1 kind=2 /
 &coupling /
";

    fn fixtures() -> (ParameterCatalog, PotentialTypeRegistry) {
        (ParameterCatalog::fresco(), PotentialTypeRegistry::standard())
    }

    #[test]
    fn load_detects_seeds_and_promotes() {
        let (catalog, registry) = fixtures();
        let mut session = EditingSession::new(&catalog, &registry, CalculationType::Elastic);
        let outcome = session.load(INELASTIC).expect("input should load");

        assert_eq!(outcome.calculation_type, CalculationType::Inelastic);
        assert_eq!(session.calculation_type(), CalculationType::Inelastic);
        assert!(outcome.promoted.contains("kqmax"));
        assert!(outcome.warnings.is_empty());
        assert!(session.manager().is_general("kqmax"));
        let summary = session.manager().summary();
        assert_eq!(summary.general_count + summary.advanced_count, catalog.len());
    }

    #[test]
    fn failed_load_leaves_the_session_untouched() {
        let (catalog, registry) = fixtures();
        let mut session = EditingSession::new(&catalog, &registry, CalculationType::Elastic);
        session.load(INELASTIC).expect("input should load");
        let before = session.document().clone();
        let summary = session.manager().summary();

        let error = session
            .load("&FRESCO hcm=0.1\n&PARTITION /")
            .expect_err("unterminated input should fail");
        assert!(matches!(error, EngineError::MalformedNamelist { .. }));
        assert_eq!(session.document(), &before);
        assert_eq!(session.manager().summary(), summary);
    }

    #[test]
    fn setters_validate_before_mutating() {
        let (catalog, registry) = fixtures();
        let mut session = EditingSession::new(&catalog, &registry, CalculationType::Elastic);
        session.load(INELASTIC).expect("input should load");

        session
            .set_parameter("HCM", NamelistValue::Real(0.1))
            .expect("hcm in range");
        assert_eq!(
            session.document().parameter("hcm"),
            Some(&NamelistValue::Real(0.1))
        );

        let error = session
            .set_parameter("hcm", NamelistValue::Real(-1.0))
            .expect_err("negative step is out of range");
        assert!(matches!(error, EngineError::OutOfRangeValue { .. }));
        assert_eq!(
            session.document().parameter("hcm"),
            Some(&NamelistValue::Real(0.1))
        );

        let error = session
            .set_parameter("warp", NamelistValue::Integer(9))
            .expect_err("not a FRESCO parameter");
        assert_eq!(error, EngineError::UnknownParameter("warp".to_string()));

        session
            .set_parameter_text("elab", "'7.5'")
            .expect("text parameters accept any value");
        assert!(session.clear_parameter("elab"));
        assert!(!session.clear_parameter("elab"));
    }

    #[test]
    fn potential_fields_are_range_checked_and_padded() {
        let (catalog, registry) = fixtures();
        let mut session = EditingSession::new(&catalog, &registry, CalculationType::Elastic);
        session.load(INELASTIC).expect("input should load");

        session
            .set_potential_field(2, "aW", 0.5)
            .expect("aW in range");
        let potential = &session.document().potentials[1];
        assert_eq!(potential.slots, vec![40.0, 1.2, 0.7, 0.0, 1.2, 0.5]);
        assert_eq!(potential.field("aW"), Some(0.5));

        let before = session.document().clone();
        let error = session
            .set_potential_field(2, "r0", 9.0)
            .expect_err("radius too large");
        assert!(matches!(error, EngineError::OutOfRangeValue { .. }));
        assert!(matches!(
            session.set_potential_field(1, "V", 10.0),
            Err(EngineError::UnknownPotentialField { type_code: 0, .. })
        ));
        assert_eq!(
            session.set_potential_field(3, "V", 10.0),
            Err(EngineError::PotentialIndex { index: 3, count: 2 })
        );
        assert_eq!(session.document(), &before);
    }

    #[test]
    fn export_reflects_edits_and_reparses() {
        let (catalog, registry) = fixtures();
        let mut session = EditingSession::new(&catalog, &registry, CalculationType::Elastic);
        session.load(INELASTIC).expect("input should load");
        session.set_energy_schedule(
            &EnergySchedule::new(vec![100.0, 140.0], vec![4]).expect("valid schedule"),
        );

        let text = session.export();
        assert!(text.contains("elab(1:2)=100.0 140.0"));
        assert!(text.contains("nlab(1:1)=4"));

        let mut reloaded = EditingSession::new(&catalog, &registry, CalculationType::Elastic);
        reloaded.load(&text).expect("exported text should load");
        assert!(reloaded.document().semantically_equals(session.document()));
        assert_eq!(
            reloaded.energy_schedule().expect("schedule should read"),
            session.energy_schedule().expect("schedule should read")
        );
    }
}
