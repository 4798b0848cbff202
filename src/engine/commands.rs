//! Engine Commands and Events
//!
//! Defines the messages that flow between the control thread and the audio
//! engine thread. All types here must be Send + 'static for safe
//! cross-thread communication.

/// Commands sent from the control thread to the audio engine.
/// These are processed non-blocking at the top of each audio block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    /// Set the carrier frequency in Hz.
    SetFrequency(f32),
    /// Set the carrier shape (0.0 sine, 1.0 square approximation).
    SetShape(f32),
    /// Set the dry/wet mix (0.0 dry, 1.0 wet).
    SetMix(f32),
    /// Set the output volume in dB.
    SetVolume(f32),
    /// Bypass the effect; input passes through untouched.
    SetBypass(bool),
}

/// Events sent from the audio engine to the control thread.
/// These provide feedback for metering and status display.
#[derive(Debug, Clone, Copy)]
pub enum EngineEvent {
    /// Peak output levels of the last block.
    OutputLevel {
        /// Left channel peak level (0.0-1.0+).
        left: f32,
        /// Right channel peak level (0.0-1.0+).
        right: f32,
    },

    /// The input ring buffer ran dry; the missing samples were rendered
    /// as silence.
    InputUnderrun {
        /// Number of samples that were missing.
        missing: usize,
    },
}
