//! Engine module
//!
//! The standalone host around the DSP core. Handles cpal integration,
//! lock-free control channels, and the audio-callback-side processor.

pub mod audio_engine;
pub mod channels;
pub mod commands;
pub mod processor;

pub use audio_engine::{AudioEngine, AudioError};
pub use channels::{
    ControlHandle, EngineChannels, EngineHandle, DEFAULT_COMMAND_BUFFER_SIZE,
    DEFAULT_EVENT_BUFFER_SIZE,
};
pub use commands::{EngineCommand, EngineEvent};
pub use processor::EffectProcessor;
