pub type EngineResult<T> = Result<T, EngineError>;
pub type ParserResult<T> = EngineResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineErrorCategory {
    Warning,
    InputValidationError,
    IoSystemError,
    InternalError,
}

impl EngineErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Warning => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Warning)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("malformed namelist at line {line}: {message}")]
    MalformedNamelist { line: usize, message: String },

    #[error("&POT block {block} uses unmapped potential type {type_code}; raw slots kept")]
    UnmappedPotentialType { type_code: i32, block: usize },

    #[error("value {value} for '{name}' is outside [{}, {}]", bound(.minimum), bound(.maximum))]
    OutOfRangeValue {
        name: String,
        value: f64,
        minimum: Option<f64>,
        maximum: Option<f64>,
    },

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("potential type {type_code} has no field named '{field}'")]
    UnknownPotentialField { type_code: i32, field: String },

    #[error("no potential at index {index} (document has {count})")]
    PotentialIndex { index: usize, count: usize },

    #[error("{context}: {message}")]
    Io { context: String, message: String },
}

fn bound(value: &Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

impl EngineError {
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedNamelist {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: &std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: source.to_string(),
        }
    }

    pub const fn category(&self) -> EngineErrorCategory {
        match self {
            Self::UnmappedPotentialType { .. } => EngineErrorCategory::Warning,
            Self::Io { .. } => EngineErrorCategory::IoSystemError,
            Self::PotentialIndex { .. } => EngineErrorCategory::InternalError,
            Self::MalformedNamelist { .. }
            | Self::OutOfRangeValue { .. }
            | Self::UnknownParameter(_)
            | Self::InvalidValue { .. }
            | Self::UnknownPotentialField { .. } => EngineErrorCategory::InputValidationError,
        }
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::MalformedNamelist { .. } => "INPUT.MALFORMED_NAMELIST",
            Self::UnmappedPotentialType { .. } => "INPUT.UNMAPPED_POTENTIAL_TYPE",
            Self::OutOfRangeValue { .. } => "INPUT.OUT_OF_RANGE_VALUE",
            Self::UnknownParameter(_) => "INPUT.UNKNOWN_PARAMETER",
            Self::InvalidValue { .. } => "INPUT.INVALID_VALUE",
            Self::UnknownPotentialField { .. } => "INPUT.UNKNOWN_POTENTIAL_FIELD",
            Self::PotentialIndex { .. } => "SYS.POTENTIAL_INDEX",
            Self::Io { .. } => "IO.FILESYSTEM",
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub const fn is_fatal(&self) -> bool {
        self.category().is_fatal()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.is_fatal() { "ERROR" } else { "WARNING" };
        format!("{}: [{}] {}", severity, self.placeholder(), self)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}
