//! DSP module
//!
//! The effect's processing core: carrier oscillators, the ring modulator
//! channel processor, and the control parameter definitions.

pub mod oscillator;
pub mod parameter;
pub mod ring_modulator;

pub use oscillator::{AdditiveOscillator, Carrier, WavetableOscillator};
pub use parameter::{
    control_parameters, ParameterDefinition, ParameterDisplay, PARAM_FREQUENCY, PARAM_MIX,
    PARAM_SHAPE, PARAM_VOLUME,
};
pub use ring_modulator::{BlockParams, RingModulator};
