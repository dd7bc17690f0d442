use crate::catalog::{ParameterCatalog, ParameterCategory, ParameterSpec};
use crate::domain::{CalculationType, ParsedDocument};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Seeded,
    Promoted,
}

/// Notification sent to observers after every categorization mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizationChange {
    pub kind: ChangeKind,
    pub calculation_type: CalculationType,
    pub general: Vec<&'static str>,
    pub advanced: Vec<&'static str>,
    /// Names moved to `general` by this mutation.
    pub promoted: Vec<&'static str>,
}

pub trait CategorizationObserver {
    fn categorization_changed(&mut self, change: &CategorizationChange);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorizationSummary {
    pub calculation_type: CalculationType,
    pub total_parameters: usize,
    pub general_count: usize,
    pub advanced_count: usize,
    pub general: Vec<&'static str>,
    pub advanced: Vec<&'static str>,
    pub parameters_from_file: usize,
    pub promoted: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterDetail {
    #[serde(flatten)]
    pub spec: &'static ParameterSpec,
    pub is_from_file: bool,
}

/// Owns the general/advanced split for one editing session.
///
/// The two sets always partition the catalog. `seed` resets them to the
/// curated defaults of a calculation type; `promote` only ever moves names
/// from `advanced` to `general`.
pub struct ParameterManager<'a> {
    catalog: &'a ParameterCatalog,
    calculation_type: CalculationType,
    general: BTreeSet<&'static str>,
    advanced: BTreeSet<&'static str>,
    promoted: BTreeSet<&'static str>,
    file_parameters: BTreeSet<&'static str>,
    observers: Vec<Box<dyn CategorizationObserver + 'a>>,
}

impl<'a> ParameterManager<'a> {
    pub fn new(catalog: &'a ParameterCatalog, calculation_type: CalculationType) -> Self {
        let mut manager = Self {
            catalog,
            calculation_type,
            general: BTreeSet::new(),
            advanced: BTreeSet::new(),
            promoted: BTreeSet::new(),
            file_parameters: BTreeSet::new(),
            observers: Vec::new(),
        };
        manager.reset(calculation_type);
        manager
    }

    pub fn subscribe(&mut self, observer: Box<dyn CategorizationObserver + 'a>) {
        self.observers.push(observer);
    }

    pub fn calculation_type(&self) -> CalculationType {
        self.calculation_type
    }

    pub fn seed(&mut self, calculation_type: CalculationType) {
        self.reset(calculation_type);
        self.notify(ChangeKind::Seeded, Vec::new());
    }

    fn reset(&mut self, calculation_type: CalculationType) {
        let defaults: BTreeSet<&str> = ParameterCatalog::default_general(calculation_type)
            .iter()
            .copied()
            .collect();

        self.calculation_type = calculation_type;
        self.general.clear();
        self.advanced.clear();
        self.promoted.clear();
        self.file_parameters.clear();
        for name in self.catalog.names() {
            if defaults.contains(name) {
                self.general.insert(name);
            } else {
                self.advanced.insert(name);
            }
        }

        info!(
            calculation_type = %calculation_type,
            general = self.general.len(),
            advanced = self.advanced.len(),
            "categorization reset to defaults"
        );
    }

    /// Moves every cataloged parameter the document sets from `advanced` to
    /// `general`. Returns the newly promoted names.
    pub fn promote(&mut self, document: &ParsedDocument) -> BTreeSet<String> {
        let names: Vec<&'static str> = document
            .parameter_names()
            .filter_map(|name| self.catalog.get(name))
            .map(|spec| spec.name)
            .collect();
        let newly = self.promote_names(&names);
        newly.iter().map(|name| name.to_string()).collect()
    }

    fn promote_names(&mut self, names: &[&'static str]) -> Vec<&'static str> {
        let mut newly = Vec::new();
        for &name in names {
            self.file_parameters.insert(name);
            if self.advanced.remove(name) {
                self.general.insert(name);
                self.promoted.insert(name);
                newly.push(name);
                debug!(parameter = name, "promoted to general");
            }
        }

        info!(
            general = self.general.len(),
            advanced = self.advanced.len(),
            promoted = ?newly,
            "categorization updated from input file"
        );
        if !newly.is_empty() {
            self.notify(ChangeKind::Promoted, newly.clone());
        }
        newly
    }

    /// Re-seeds for a new calculation type, then re-applies the parameters
    /// remembered from the loaded file.
    pub fn set_calculation_type(&mut self, calculation_type: CalculationType) {
        if calculation_type == self.calculation_type {
            return;
        }
        let remembered: Vec<&'static str> = self.file_parameters.iter().copied().collect();
        self.seed(calculation_type);
        if !remembered.is_empty() {
            self.promote_names(&remembered);
        }
    }

    pub fn summary(&self) -> CategorizationSummary {
        CategorizationSummary {
            calculation_type: self.calculation_type,
            total_parameters: self.catalog.len(),
            general_count: self.general.len(),
            advanced_count: self.advanced.len(),
            general: self.general_parameters(),
            advanced: self.advanced_parameters(),
            parameters_from_file: self.file_parameters.len(),
            promoted: self.promoted.iter().copied().collect(),
        }
    }

    pub fn is_general(&self, name: &str) -> bool {
        self.general.contains(name.to_ascii_lowercase().as_str())
    }

    pub fn is_advanced(&self, name: &str) -> bool {
        self.advanced.contains(name.to_ascii_lowercase().as_str())
    }

    pub fn is_from_input_file(&self, name: &str) -> bool {
        self.file_parameters
            .contains(name.to_ascii_lowercase().as_str())
    }

    /// General parameters in catalog order.
    pub fn general_parameters(&self) -> Vec<&'static str> {
        self.catalog
            .names()
            .filter(|name| self.general.contains(name))
            .collect()
    }

    pub fn advanced_parameters(&self) -> Vec<&'static str> {
        self.catalog
            .names()
            .filter(|name| self.advanced.contains(name))
            .collect()
    }

    pub fn general_parameter_details(&self) -> Vec<ParameterDetail> {
        self.catalog
            .iter()
            .filter(|spec| self.general.contains(spec.name))
            .map(|spec| ParameterDetail {
                spec,
                is_from_file: self.file_parameters.contains(spec.name),
            })
            .collect()
    }

    pub fn advanced_by_category(&self) -> BTreeMap<ParameterCategory, Vec<&'static str>> {
        let mut grouped: BTreeMap<ParameterCategory, Vec<&'static str>> = BTreeMap::new();
        for spec in self
            .catalog
            .iter()
            .filter(|spec| self.advanced.contains(spec.name))
        {
            grouped.entry(spec.category).or_default().push(spec.name);
        }
        grouped
    }

    fn notify(&mut self, kind: ChangeKind, promoted: Vec<&'static str>) {
        if self.observers.is_empty() {
            return;
        }
        let change = CategorizationChange {
            kind,
            calculation_type: self.calculation_type,
            general: self.general_parameters(),
            advanced: self.advanced_parameters(),
            promoted,
        };
        for observer in &mut self.observers {
            observer.categorization_changed(&change);
        }
    }
}

impl std::fmt::Debug for ParameterManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterManager")
            .field("calculation_type", &self.calculation_type)
            .field("general", &self.general)
            .field("advanced", &self.advanced)
            .field("promoted", &self.promoted)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{CategorizationChange, CategorizationObserver, ChangeKind, ParameterManager};
    use crate::catalog::{ParameterCatalog, ParameterCategory};
    use crate::domain::{CalculationType, NamelistValue, ParsedDocument};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn document_with(names: &[&str]) -> ParsedDocument {
        let mut document = ParsedDocument::default();
        for name in names {
            document
                .parameters
                .insert(name.to_string(), NamelistValue::Integer(1));
        }
        document
    }

    struct Recorder(Rc<RefCell<Vec<CategorizationChange>>>);

    impl CategorizationObserver for Recorder {
        fn categorization_changed(&mut self, change: &CategorizationChange) {
            self.0.borrow_mut().push(change.clone());
        }
    }

    #[test]
    fn seed_partitions_the_catalog() {
        let catalog = ParameterCatalog::fresco();
        for calculation_type in CalculationType::ALL {
            let manager = ParameterManager::new(&catalog, calculation_type);
            let summary = manager.summary();
            assert_eq!(
                summary.general_count,
                ParameterCatalog::default_general(calculation_type).len()
            );
            assert_eq!(
                summary.general_count + summary.advanced_count,
                catalog.len()
            );
            assert!(summary.promoted.is_empty());
        }
    }

    #[test]
    fn promotion_moves_only_cataloged_advanced_names() {
        let catalog = ParameterCatalog::fresco();
        let mut manager = ParameterManager::new(&catalog, CalculationType::Elastic);

        let promoted = manager.promote(&document_with(&["hcm", "pel", "nnu", "mystery"]));
        assert_eq!(
            promoted.into_iter().collect::<Vec<_>>(),
            vec!["nnu".to_string(), "pel".to_string()]
        );
        assert!(manager.is_general("PEL"));
        assert!(!manager.is_advanced("pel"));
        assert!(manager.is_from_input_file("hcm"));
        assert!(!manager.is_from_input_file("mystery"));

        let summary = manager.summary();
        assert_eq!(summary.general_count, 14);
        assert_eq!(summary.general_count + summary.advanced_count, 43);
        assert_eq!(summary.promoted, vec!["nnu", "pel"]);
        assert_eq!(summary.parameters_from_file, 3);
    }

    #[test]
    fn promotion_is_monotonic_until_reseeded() {
        let catalog = ParameterCatalog::fresco();
        let mut manager = ParameterManager::new(&catalog, CalculationType::Elastic);
        manager.promote(&document_with(&["rela"]));
        let second = manager.promote(&document_with(&["hnl"]));

        assert!(second.contains("hnl"));
        assert!(manager.is_general("rela"));
        assert!(manager.is_general("hnl"));

        manager.seed(CalculationType::Elastic);
        assert!(manager.is_advanced("rela"));
        assert!(manager.summary().promoted.is_empty());
    }

    #[test]
    fn changing_calculation_type_reapplies_file_parameters() {
        let catalog = ParameterCatalog::fresco();
        let mut manager = ParameterManager::new(&catalog, CalculationType::Elastic);
        manager.promote(&document_with(&["nnu", "finec"]));

        manager.set_calculation_type(CalculationType::Transfer);
        let summary = manager.summary();
        assert_eq!(summary.calculation_type, CalculationType::Transfer);
        assert!(manager.is_general("finec"));
        assert!(manager.is_general("iblock"));
        assert_eq!(summary.promoted, vec!["finec"]);
        assert_eq!(summary.general_count, 16);
        assert_eq!(summary.general_count + summary.advanced_count, catalog.len());
    }

    #[test]
    fn details_and_grouping_follow_catalog_order() {
        let catalog = ParameterCatalog::fresco();
        let mut manager = ParameterManager::new(&catalog, CalculationType::Elastic);
        manager.promote(&document_with(&["hcm"]));

        let details = manager.general_parameter_details();
        assert_eq!(details[0].spec.name, "hcm");
        assert!(details[0].is_from_file);
        assert!(!details[1].is_from_file);

        let grouped = manager.advanced_by_category();
        assert_eq!(
            grouped.get(&ParameterCategory::Output),
            Some(&vec!["nlab"])
        );
        assert_eq!(
            grouped.get(&ParameterCategory::Iterations),
            Some(&vec!["iblock", "pcon"])
        );
    }

    #[test]
    fn observers_see_seed_and_promotion_events() {
        let catalog = ParameterCatalog::fresco();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ParameterManager::new(&catalog, CalculationType::Elastic);
        manager.subscribe(Box::new(Recorder(Rc::clone(&log))));

        manager.seed(CalculationType::Inelastic);
        manager.promote(&document_with(&["hcm"]));
        manager.promote(&document_with(&["kqmax"]));

        let events = log.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ChangeKind::Seeded);
        assert_eq!(events[0].general.len(), 16);
        assert_eq!(events[1].kind, ChangeKind::Promoted);
        assert_eq!(events[1].promoted, vec!["kqmax"]);
        assert_eq!(
            events[1].general.len() + events[1].advanced.len(),
            catalog.len()
        );
    }
}
