//! Parameter definitions for the effect's control surface.
//!
//! The DSP core assumes every control value is already inside its contract
//! range; the definitions here are where that contract is enforced, on the
//! control thread, never in the audio path.

/// How a parameter value should be displayed and interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterDisplay {
    /// Linear scaling with a unit suffix (e.g., "dB", "%").
    Linear { unit: &'static str },
    /// Logarithmic scaling, used for the frequency control.
    Logarithmic { unit: &'static str },
}

impl ParameterDisplay {
    /// Creates a linear display with the given unit.
    pub fn linear(unit: &'static str) -> Self {
        Self::Linear { unit }
    }

    /// Creates a logarithmic display with the given unit.
    pub fn logarithmic(unit: &'static str) -> Self {
        Self::Logarithmic { unit }
    }

    /// Returns the unit string.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Linear { unit } | Self::Logarithmic { unit } => unit,
        }
    }

    /// Returns true if this is a logarithmic parameter.
    pub fn is_logarithmic(&self) -> bool {
        matches!(self, Self::Logarithmic { .. })
    }
}

/// Definition of a single control parameter.
///
/// Each parameter has a unique ID, display name, valid range, and default
/// value. The range is the upstream contract the DSP core relies on.
#[derive(Clone, Debug)]
pub struct ParameterDefinition {
    /// Unique identifier for this parameter.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Minimum value of the parameter.
    pub min: f32,
    /// Maximum value of the parameter.
    pub max: f32,
    /// Default value.
    pub default: f32,
    /// How to display and interpret the parameter value.
    pub display: ParameterDisplay,
}

impl ParameterDefinition {
    /// Creates a new parameter definition.
    pub fn new(
        id: &'static str,
        name: &'static str,
        min: f32,
        max: f32,
        default: f32,
        display: ParameterDisplay,
    ) -> Self {
        Self {
            id,
            name,
            min,
            max,
            default,
            display,
        }
    }

    /// Clamps a value to this parameter's valid range.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Normalizes a value from the parameter's range to 0.0-1.0.
    pub fn normalize(&self, value: f32) -> f32 {
        if (self.max - self.min).abs() < f32::EPSILON {
            0.0
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }

    /// Denormalizes a 0.0-1.0 value to the parameter's range.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized * (self.max - self.min)
    }
}

/// Index of the frequency parameter in [`control_parameters`].
pub const PARAM_FREQUENCY: usize = 0;
/// Index of the shape parameter.
pub const PARAM_SHAPE: usize = 1;
/// Index of the mix parameter.
pub const PARAM_MIX: usize = 2;
/// Index of the volume parameter.
pub const PARAM_VOLUME: usize = 3;

/// The effect's four control parameters, in display order.
///
/// The frequency ceiling of 10 kHz keeps the carrier period at least a few
/// samples long at common rates and well below any sample rate the engine
/// will open, which the oscillator contract requires.
pub fn control_parameters() -> [ParameterDefinition; 4] {
    [
        ParameterDefinition::new(
            "frequency",
            "Frequency",
            20.0,
            10_000.0,
            440.0,
            ParameterDisplay::logarithmic("Hz"),
        ),
        ParameterDefinition::new("shape", "Shape", 0.0, 1.0, 1.0, ParameterDisplay::linear("%")),
        ParameterDefinition::new("mix", "Mix", 0.0, 1.0, 1.0, ParameterDisplay::linear("%")),
        ParameterDefinition::new(
            "volume",
            "Volume",
            -12.0,
            12.0,
            0.0,
            ParameterDisplay::linear("dB"),
        ),
    ]
}
