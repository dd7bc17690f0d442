use super::{
    ChoiceOption, NumericRange, ParameterCategory as Category, ParameterDefault,
    ParameterSpec, ValueKind,
};

const fn number(minimum: f64, maximum: f64, step: f64) -> ValueKind {
    ValueKind::Number(NumericRange {
        minimum,
        maximum,
        step,
    })
}

const fn choice(options: &'static [ChoiceOption]) -> ValueKind {
    ValueKind::Choice { options }
}

const NO_YES: &[ChoiceOption] = &[
    ChoiceOption { value: 0, label: "0 - No" },
    ChoiceOption { value: 1, label: "1 - Yes" },
];

pub(super) const ELASTIC_GENERAL: &[&str] = &[
    "hcm", "rmatch", "jtmax", "absend", "thmin", "thmax", "thinc", "elab", "iter", "chans",
    "smats", "xstabl",
];

pub(super) const INELASTIC_GENERAL: &[&str] = &[
    "hcm", "rmatch", "jtmax", "absend", "thmin", "thmax", "thinc", "elab", "iter", "chans",
    "smats", "xstabl", "rasym", "accrcy", "jtmin", "jbord",
];

pub(super) const TRANSFER_GENERAL: &[&str] = &[
    "hcm", "rmatch", "jtmax", "absend", "thmin", "thmax", "thinc", "elab", "iter", "chans",
    "smats", "xstabl", "nnu", "rintp", "iblock",
];

pub(super) const FRESCO_PARAMETERS: &[ParameterSpec] = &[
    // radial
    ParameterSpec {
        name: "hcm",
        label: "Integration step size (hcm)",
        tooltip: "Step size for integration in the centre-of-mass frame (typical: 0.05-0.1)",
        kind: number(0.001, 1.0, 0.01),
        default: Some(ParameterDefault::Real(0.1)),
        category: Category::Radial,
    },
    ParameterSpec {
        name: "rmatch",
        label: "Matching radius (rmatch)",
        tooltip: "Radius where internal and asymptotic solutions are matched; negative selects coupled Coulomb wave functions",
        kind: number(-200.0, 200.0, 0.1),
        default: Some(ParameterDefault::Real(60.0)),
        category: Category::Radial,
    },
    ParameterSpec {
        name: "rintp",
        label: "Non-local radius step (rintp)",
        tooltip: "Non-local kernels are calculated at Rf intervals of RINTP, rounded to multiples of HCM",
        kind: number(0.0, 10.0, 0.1),
        default: None,
        category: Category::Radial,
    },
    ParameterSpec {
        name: "hnl",
        label: "Non-local step size (hnl)",
        tooltip: "Step size for the non-local range, rounded to a multiple or sub-multiple of HCM",
        kind: number(0.001, 1.0, 0.01),
        default: None,
        category: Category::Radial,
    },
    ParameterSpec {
        name: "rnl",
        label: "Non-local range (rnl)",
        tooltip: "Non-local range for the transfer kernels",
        kind: number(0.0, 50.0, 0.1),
        default: None,
        category: Category::Radial,
    },
    ParameterSpec {
        name: "centre",
        label: "Non-local centre (centre)",
        tooltip: "Centre position of the non-local range RNL",
        kind: number(-10.0, 10.0, 0.1),
        default: None,
        category: Category::Radial,
    },
    ParameterSpec {
        name: "accrcy",
        label: "Accuracy parameter (accrcy)",
        tooltip: "Accuracy of the piecewise step length; smaller is more accurate",
        kind: number(0.0001, 0.1, 0.001),
        default: Some(ParameterDefault::Real(0.01)),
        category: Category::Radial,
    },
    ParameterSpec {
        name: "rasym",
        label: "Asymptotic radius (rasym)",
        tooltip: "Asymptotic radius for coupled Coulomb wave functions; negative derives it from the classical angle",
        kind: number(-100.0, 200.0, 0.1),
        default: None,
        category: Category::Radial,
    },
    ParameterSpec {
        name: "switch",
        label: "Switch radius (switch)",
        tooltip: "Radius at which the piecewise method switches from Airy functions to sines and cosines",
        kind: number(10.0, 10000.0, 10.0),
        default: Some(ParameterDefault::Real(1000.0)),
        category: Category::Radial,
    },
    ParameterSpec {
        name: "ajswtch",
        label: "Angular momentum switch (ajswtch)",
        tooltip: "Coupled Coulomb matching is only allowed when J <= AJSWTCH",
        kind: number(0.0, 100.0, 0.5),
        default: Some(ParameterDefault::Real(0.0)),
        category: Category::Radial,
    },
    // partial waves
    ParameterSpec {
        name: "jtmin",
        label: "Minimum J (jtmin)",
        tooltip: "Minimum total angular momentum; if negative, J < |JTMIN| keeps only the incoming channel",
        kind: number(-50.0, 50.0, 0.5),
        default: Some(ParameterDefault::Real(0.0)),
        category: Category::PartialWaves,
    },
    ParameterSpec {
        name: "jtmax",
        label: "Maximum J (jtmax)",
        tooltip: "Maximum total angular momentum included in the calculation",
        kind: number(0.0, 200.0, 0.5),
        default: Some(ParameterDefault::Real(50.0)),
        category: Category::PartialWaves,
    },
    ParameterSpec {
        name: "absend",
        label: "Convergence criterion (absend)",
        tooltip: "Stop once absorption < ABSEND mb for three successive J/parity sets; negative takes the full J interval",
        kind: number(-1.0, 1.0, 0.001),
        default: Some(ParameterDefault::Real(0.001)),
        category: Category::PartialWaves,
    },
    ParameterSpec {
        name: "jump",
        label: "J-value intervals (jump)",
        tooltip: "Calculate at intervals of JUMP(i) for J >= JBORD(i)",
        kind: ValueKind::Text,
        default: None,
        category: Category::PartialWaves,
    },
    ParameterSpec {
        name: "jbord",
        label: "J-value borders (jbord)",
        tooltip: "J borders for the JUMP intervals",
        kind: ValueKind::Text,
        default: None,
        category: Category::PartialWaves,
    },
    ParameterSpec {
        name: "pset",
        label: "Parity restriction (pset)",
        tooltip: "Restrict the parity of the calculated sets",
        kind: choice(&[
            ChoiceOption { value: -1, label: "-1 (Negative parity only)" },
            ChoiceOption { value: 0, label: "0 (No restriction)" },
            ChoiceOption { value: 1, label: "+1 (Positive parity only)" },
        ]),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::PartialWaves,
    },
    ParameterSpec {
        name: "jset",
        label: "Number of sets (jset)",
        tooltip: "Number of CRC sets to calculate before stopping; 0 calculates all sets",
        kind: number(0.0, 1000.0, 1.0),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::PartialWaves,
    },
    ParameterSpec {
        name: "llmax",
        label: "Maximum L (llmax)",
        tooltip: "Maximum partial wave L in any CRC set",
        kind: number(0.0, 500.0, 1.0),
        default: None,
        category: Category::PartialWaves,
    },
    // angular
    ParameterSpec {
        name: "thmin",
        label: "Minimum angle (thmin)",
        tooltip: "Minimum centre-of-mass scattering angle in degrees",
        kind: number(0.0, 180.0, 0.1),
        default: Some(ParameterDefault::Real(0.0)),
        category: Category::Angular,
    },
    ParameterSpec {
        name: "thmax",
        label: "Maximum angle (thmax)",
        tooltip: "Maximum scattering angle; negative prints absolute cross sections instead of ratio to Rutherford",
        kind: number(-180.0, 180.0, 0.1),
        default: Some(ParameterDefault::Real(180.0)),
        category: Category::Angular,
    },
    ParameterSpec {
        name: "thinc",
        label: "Angle increment (thinc)",
        tooltip: "Increment between calculated scattering angles in degrees",
        kind: number(0.01, 10.0, 0.1),
        default: Some(ParameterDefault::Real(1.0)),
        category: Category::Angular,
    },
    ParameterSpec {
        name: "kqmax",
        label: "Max tensor rank (kqmax)",
        tooltip: "Maximum tensor analysing power rank K",
        kind: number(0.0, 10.0, 1.0),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::Angular,
    },
    ParameterSpec {
        name: "pp",
        label: "Polarization type (pp)",
        tooltip: "Particle whose analysing powers are calculated",
        kind: choice(&[
            ChoiceOption { value: 0, label: "0 - Projectile" },
            ChoiceOption { value: 1, label: "1 - Target" },
            ChoiceOption { value: 2, label: "2 - Ejectile" },
            ChoiceOption { value: 3, label: "3 - Residual nucleus" },
            ChoiceOption { value: 4, label: "4 - Projectile + Kyy" },
        ]),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::Angular,
    },
    ParameterSpec {
        name: "koords",
        label: "Coordinate system (koords)",
        tooltip: "Coordinate systems for analysing powers",
        kind: choice(&[
            ChoiceOption { value: 0, label: "0 - Madison coordinates" },
            ChoiceOption { value: 1, label: "1 - Madison + Transverse" },
            ChoiceOption { value: 2, label: "2 - Madison + Transverse + Recoil" },
            ChoiceOption { value: 3, label: "3 - Madison + Transverse + Recoil + Hooton-Johnson" },
        ]),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::Angular,
    },
    // coupled equations
    ParameterSpec {
        name: "nnu",
        label: "Angular integration points (nnu)",
        tooltip: "Gaussian integration points for non-local transfer kernels; a multiple of 6, at least 18",
        kind: number(18.0, 120.0, 6.0),
        default: Some(ParameterDefault::Integer(24)),
        category: Category::Coupled,
    },
    ParameterSpec {
        name: "maxl",
        label: "Max L for kernels (maxl)",
        tooltip: "Maximum L for non-local kernels; zero means JTMAX+6",
        kind: number(0.0, 500.0, 1.0),
        default: None,
        category: Category::Coupled,
    },
    ParameterSpec {
        name: "minl",
        label: "Min L for kernels (minl)",
        tooltip: "Minimum L for non-local kernels; negative means |JTMIN|-6",
        kind: number(-50.0, 500.0, 1.0),
        default: None,
        category: Category::Coupled,
    },
    ParameterSpec {
        name: "epc",
        label: "Angular integration accuracy (epc)",
        tooltip: "Percentage cutoff accuracy of the NNU angular integration",
        kind: number(0.0, 100.0, 0.1),
        default: None,
        category: Category::Coupled,
    },
    ParameterSpec {
        name: "plane",
        label: "Coulomb zeroing (plane)",
        tooltip: "Zero the Coulomb potential for selected channels; unset keeps all Coulomb",
        kind: choice(&[
            ChoiceOption { value: 1, label: "1 - Zero elastic Coulomb" },
            ChoiceOption { value: 2, label: "2 - Zero nonelastic Coulomb" },
            ChoiceOption { value: 3, label: "3 - Zero all Coulomb" },
        ]),
        default: None,
        category: Category::Coupled,
    },
    // iterations
    ParameterSpec {
        name: "elab",
        label: "Laboratory energy (elab)",
        tooltip: "Laboratory energy of the projectile in MeV; several energies use the elab(1:n) form",
        kind: ValueKind::Text,
        default: Some(ParameterDefault::Text("30.0")),
        category: Category::Iterations,
    },
    ParameterSpec {
        name: "iter",
        label: "Number of iterations (iter)",
        tooltip: "Iterations for solving the coupled equations; 1 is enough for elastic scattering",
        kind: number(0.0, 100.0, 1.0),
        default: Some(ParameterDefault::Integer(1)),
        category: Category::Iterations,
    },
    ParameterSpec {
        name: "iblock",
        label: "Block structure (iblock)",
        tooltip: "0 solves the full coupling, 1 is block diagonal in the partition index",
        kind: choice(&[
            ChoiceOption { value: 0, label: "0 - General (full coupling)" },
            ChoiceOption { value: 1, label: "1 - Block diagonal in partition" },
        ]),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::Iterations,
    },
    ParameterSpec {
        name: "pcon",
        label: "Print convergence (pcon)",
        tooltip: "Print convergence of the coupled equations",
        kind: choice(NO_YES),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::Iterations,
    },
    // output
    ParameterSpec {
        name: "chans",
        label: "Print channels (chans)",
        tooltip: "Print coupling matrix elements and channel information",
        kind: choice(&[
            ChoiceOption { value: 0, label: "0 - Minimal output" },
            ChoiceOption { value: 1, label: "1 - Full channel info" },
        ]),
        default: Some(ParameterDefault::Integer(1)),
        category: Category::Output,
    },
    ParameterSpec {
        name: "smats",
        label: "Print S-matrix (smats)",
        tooltip: "Print S-matrix elements: 0 none, 1 diagonal, 2 all",
        kind: choice(&[
            ChoiceOption { value: 0, label: "0 - No S-matrix" },
            ChoiceOption { value: 1, label: "1 - Diagonal only" },
            ChoiceOption { value: 2, label: "2 - All S-matrix elements" },
        ]),
        default: Some(ParameterDefault::Integer(2)),
        category: Category::Output,
    },
    ParameterSpec {
        name: "xstabl",
        label: "Print cross sections (xstabl)",
        tooltip: "Print integrated cross sections",
        kind: choice(NO_YES),
        default: Some(ParameterDefault::Integer(1)),
        category: Category::Output,
    },
    ParameterSpec {
        name: "nlab",
        label: "Print lab angles (nlab)",
        tooltip: "Print differential cross sections at laboratory angles instead of centre-of-mass",
        kind: choice(&[
            ChoiceOption { value: 0, label: "0 - Centre-of-mass angles" },
            ChoiceOption { value: 1, label: "1 - Laboratory angles" },
        ]),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::Output,
    },
    // advanced
    ParameterSpec {
        name: "rela",
        label: "Relativistic kinematics (rela)",
        tooltip: "Relativistic options: 'a' Ingemarsson eq(16), 'b' eq(17), 'c' or '3d' knockout",
        kind: ValueKind::Text,
        default: None,
        category: Category::Advanced,
    },
    ParameterSpec {
        name: "unitmass",
        label: "Mass unit (unitmass)",
        tooltip: "Unit in amu for the MASS values read in",
        kind: number(0.1, 10.0, 0.001),
        default: Some(ParameterDefault::Real(1.0)),
        category: Category::Advanced,
    },
    ParameterSpec {
        name: "finec",
        label: "Fine structure constant (finec)",
        tooltip: "1/(fine-structure constant) used for the electrostatic e^2",
        kind: number(100.0, 200.0, 0.001),
        default: Some(ParameterDefault::Real(137.03599)),
        category: Category::Advanced,
    },
    ParameterSpec {
        name: "hbarc",
        label: "hbar*c constant (hbarc)",
        tooltip: "Value of hbar*c in MeV fm",
        kind: number(100.0, 300.0, 0.001),
        default: Some(ParameterDefault::Real(197.3269788)),
        category: Category::Advanced,
    },
    ParameterSpec {
        name: "pel",
        label: "Elastic print (pel)",
        tooltip: "Print elastic scattering only",
        kind: choice(&[ChoiceOption { value: 0, label: "0 - All channels" }, ChoiceOption { value: 1, label: "1 - Elastic only" }]),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::Advanced,
    },
    ParameterSpec {
        name: "exl",
        label: "Excitation print (exl)",
        tooltip: "Print inelastic excitations for all or selected L-values",
        kind: choice(&[
            ChoiceOption { value: 0, label: "0 - All excitations" },
            ChoiceOption { value: 1, label: "1 - Specific L-values" },
        ]),
        default: Some(ParameterDefault::Integer(0)),
        category: Category::Advanced,
    },
];
