//! Effect Processor
//!
//! Audio-callback-side state for the ring modulator: drains control
//! commands, snapshots the block parameters, pulls input audio from the
//! capture ring buffer, and runs the channel processor over deinterleaved
//! scratch buffers.

use rtrb::Consumer;

use crate::dsp::{BlockParams, RingModulator};

use super::channels::EngineHandle;
use super::commands::{EngineCommand, EngineEvent};

/// Effect processor that runs in the audio callback.
///
/// This struct is moved into the output stream closure and handles all
/// per-block work:
/// - Receiving and applying commands from the control thread
/// - Pulling captured input samples from the audio ring buffer
/// - Running the ring modulator in place over per-channel buffers
///
/// Parameters are applied once per block with no smoothing; a change lands
/// at the next block boundary.
pub struct EffectProcessor {
    /// The channel processor.
    ring_mod: RingModulator,
    /// Handle for receiving commands and sending events.
    engine_handle: EngineHandle,
    /// Captured input audio, interleaved at the processor's channel count.
    input_rx: Consumer<f32>,
    /// Current control values, updated by commands.
    params: BlockParams,
    /// When set, input passes through untouched.
    bypass: bool,
    /// Per-channel deinterleave scratch, sized to the current block.
    scratch: Vec<Vec<f32>>,
}

impl EffectProcessor {
    /// Creates a new effect processor.
    ///
    /// # Arguments
    /// * `sample_rate` - The audio sample rate in Hz
    /// * `max_block_size` - Expected samples per processing block
    /// * `channels` - Channel count of both the input ring buffer and the
    ///   output stream
    /// * `engine_handle` - Handle for the control thread channels
    /// * `input_rx` - Consumer side of the capture ring buffer
    pub fn new(
        sample_rate: u32,
        max_block_size: usize,
        channels: usize,
        engine_handle: EngineHandle,
        input_rx: Consumer<f32>,
    ) -> Self {
        let mut ring_mod = RingModulator::new(channels);
        ring_mod.init(sample_rate);

        Self {
            ring_mod,
            engine_handle,
            input_rx,
            params: BlockParams::default(),
            bypass: false,
            scratch: (0..channels).map(|_| vec![0.0; max_block_size]).collect(),
        }
    }

    /// Current block parameters.
    pub fn params(&self) -> BlockParams {
        self.params
    }

    /// Whether the effect is currently bypassed.
    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Processes a block of audio.
    ///
    /// Called from the cpal output callback. `output` is interleaved at
    /// `channels`, which must match the channel count the processor was
    /// built with. Missing input samples (ring buffer underrun) are
    /// rendered as silence and reported as a lossy event.
    pub fn process(&mut self, output: &mut [f32], channels: usize) {
        self.apply_commands();

        let frames = output.len() / channels;

        // Block sizes can differ between callbacks; follow the stream.
        // Growing past the initial capacity is the rare case.
        for buffer in self.scratch.iter_mut() {
            buffer.resize(frames, 0.0);
        }

        // Deinterleave captured input, padding underruns with silence.
        let mut missing = 0;
        for i in 0..frames {
            for channel in 0..channels {
                let sample = match self.input_rx.pop() {
                    Ok(sample) => sample,
                    Err(_) => {
                        missing += 1;
                        0.0
                    }
                };
                self.scratch[channel][i] = sample;
            }
        }
        if missing > 0 {
            self.engine_handle
                .send_event_lossy(EngineEvent::InputUnderrun { missing });
        }

        if !self.bypass {
            self.ring_mod.process(&mut self.scratch, &self.params);
        }

        // Interleave back out and take peak levels for metering.
        for (i, frame) in output.chunks_mut(channels).enumerate() {
            for (channel, sample) in frame.iter_mut().enumerate() {
                *sample = self.scratch[channel][i];
            }
        }

        let peak = |buffer: &[f32]| buffer.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        let left = peak(&self.scratch[0]);
        let right = self.scratch.get(1).map(|b| peak(b)).unwrap_or(left);
        self.engine_handle
            .send_event_lossy(EngineEvent::OutputLevel { left, right });
    }

    /// Applies all pending commands from the control thread.
    fn apply_commands(&mut self) {
        while let Some(cmd) = self.engine_handle.recv_command() {
            match cmd {
                EngineCommand::SetFrequency(hz) => self.params.frequency = hz,
                EngineCommand::SetShape(shape) => self.params.shape = shape,
                EngineCommand::SetMix(mix) => self.params.mix = mix,
                EngineCommand::SetVolume(db) => self.params.volume_db = db,
                EngineCommand::SetBypass(bypass) => self.bypass = bypass,
            }
        }
    }
}
