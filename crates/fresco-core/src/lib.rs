pub mod catalog;
pub mod config;
pub mod detect;
pub mod domain;
pub mod energy;
pub mod generator;
pub mod manager;
pub mod parser;
pub mod potentials;
pub mod serialization;
pub mod session;

pub use catalog::{ParameterCatalog, ParameterCategory, ParameterSpec};
pub use config::{EngineConfig, EngineConfigError, load_engine_config};
pub use detect::{detect_calculation_type, detect_document_type};
pub use domain::{CalculationType, EngineError, EngineResult, ParsedDocument};
pub use energy::EnergySchedule;
pub use generator::{GeneratorOptions, generate};
pub use manager::{CategorizationObserver, CategorizationSummary, ParameterManager};
pub use parser::{parse_namelist, parse_value};
pub use potentials::PotentialTypeRegistry;
pub use session::{EditingSession, LoadOutcome};
