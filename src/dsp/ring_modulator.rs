//! Ring modulator channel processor.
//!
//! Multiplies the input signal by the carrier oscillator sample-by-sample,
//! then dry/wet-mixes and applies output gain. One carrier per channel.

use super::oscillator::{AdditiveOscillator, Carrier};

/// Control values for one processing block.
///
/// The host samples these once per block; the processor applies them at the
/// block boundary with no interpolation, so a fast sweep can step audibly
/// between blocks. That is the intended behavior — smoothing would change
/// the effect's character.
#[derive(Clone, Copy, Debug)]
pub struct BlockParams {
    /// Carrier frequency in Hz. Expected range 20–10000.
    pub frequency: f32,
    /// Carrier shape, 0.0 (sine) to 1.0 (square approximation).
    pub shape: f32,
    /// Dry/wet mix, 0.0 (dry) to 1.0 (fully ring modulated).
    pub mix: f32,
    /// Output volume in dB, −12 to +12.
    pub volume_db: f32,
}

impl BlockParams {
    /// Output volume as a linear gain factor.
    ///
    /// Converted once per block, never per sample.
    pub fn volume_linear(&self) -> f32 {
        10.0_f32.powf(self.volume_db / 20.0)
    }
}

impl Default for BlockParams {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            shape: 1.0,
            mix: 1.0,
            volume_db: 0.0,
        }
    }
}

/// The ring modulator: one carrier oscillator per audio channel.
///
/// Channels are processed independently; each keeps its own oscillator
/// phase, so there is no cross-channel phase coherence by design.
///
/// # Real-time Constraints
///
/// `process` runs on the audio thread: single pass, in place, no
/// allocation, no locks, no blocking. Worst-case cost per sample is bounded
/// by the 24-harmonic carrier sum. Out-of-range parameters and
/// buffer/channel-count mismatches are the caller's responsibility — the
/// hot path performs no validation.
pub struct RingModulator {
    /// One carrier per channel, index-matched to the buffer layout.
    oscillators: Vec<AdditiveOscillator>,
}

impl RingModulator {
    /// Creates a ring modulator for the given channel count.
    pub fn new(channels: usize) -> Self {
        Self {
            oscillators: vec![AdditiveOscillator::new(); channels],
        }
    }

    /// Number of channels this processor was built for.
    pub fn channels(&self) -> usize {
        self.oscillators.len()
    }

    /// Resets every carrier for a stream (re)start at the given rate.
    pub fn init(&mut self, sample_rate: u32) {
        for oscillator in self.oscillators.iter_mut() {
            oscillator.init(sample_rate);
        }
    }

    /// Processes one block of audio in place.
    ///
    /// `buffers` holds one sample array per channel and must not contain
    /// more channels than this processor was built for. Parameters are
    /// applied once at the top of the block.
    pub fn process(&mut self, buffers: &mut [Vec<f32>], params: &BlockParams) {
        let volume = params.volume_linear();
        let mix = params.mix;
        let mix_inverse = 1.0 - mix;

        for (buffer, oscillator) in buffers.iter_mut().zip(self.oscillators.iter_mut()) {
            oscillator.set_frequency(params.frequency);
            oscillator.set_shape(params.shape);

            for sample in buffer.iter_mut() {
                let input = *sample;
                let carrier = oscillator.process();
                let modulated = input * carrier;

                *sample = volume * (mix * modulated + mix_inverse * input);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(frequency: f32, shape: f32, mix: f32, volume_db: f32) -> BlockParams {
        BlockParams {
            frequency,
            shape,
            mix,
            volume_db,
        }
    }

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32 / len as f32 * 2.0 - 1.0).collect()
    }

    #[test]
    fn test_default_params_match_control_defaults() {
        let p = BlockParams::default();
        assert_eq!(p.frequency, 440.0);
        assert_eq!(p.shape, 1.0);
        assert_eq!(p.mix, 1.0);
        assert_eq!(p.volume_db, 0.0);
    }

    #[test]
    fn test_volume_conversion() {
        assert!((params(440.0, 0.0, 1.0, 0.0).volume_linear() - 1.0).abs() < 1e-6);
        // ±12 dB endpoints: 10^(±0.6).
        assert!((params(440.0, 0.0, 1.0, 12.0).volume_linear() - 3.9810717).abs() < 1e-4);
        assert!((params(440.0, 0.0, 1.0, -12.0).volume_linear() - 0.25118864).abs() < 1e-5);
        assert!((params(440.0, 0.0, 1.0, -6.0).volume_linear() - 0.5011872).abs() < 1e-5);
    }

    #[test]
    fn test_channel_allocation() {
        assert_eq!(RingModulator::new(1).channels(), 1);
        assert_eq!(RingModulator::new(2).channels(), 2);
    }

    #[test]
    fn test_mix_zero_is_dry_times_volume() {
        let mut rm = RingModulator::new(2);
        rm.init(48_000);

        let input = ramp(256);
        let mut buffers = vec![input.clone(), input.clone()];

        rm.process(&mut buffers, &params(480.0, 1.0, 0.0, -6.0));

        let volume = params(480.0, 1.0, 0.0, -6.0).volume_linear();
        for buffer in &buffers {
            for (i, (&out, &inp)) in buffer.iter().zip(input.iter()).enumerate() {
                assert!(
                    (out - volume * inp).abs() < 1e-6,
                    "sample {}: dry path should ignore the carrier, got {}",
                    i,
                    out
                );
            }
        }
    }

    #[test]
    fn test_mix_one_is_input_times_carrier() {
        let mut rm = RingModulator::new(1);
        rm.init(48_000);

        let input = ramp(256);
        let mut buffers = vec![input.clone()];
        rm.process(&mut buffers, &params(480.0, 0.3, 1.0, 0.0));

        // A reference oscillator driven identically reproduces the carrier.
        let mut reference = AdditiveOscillator::new();
        reference.init(48_000);
        reference.set_frequency(480.0);
        reference.set_shape(0.3);

        for (i, (&out, &inp)) in buffers[0].iter().zip(input.iter()).enumerate() {
            let expected = inp * reference.process();
            assert!(
                (out - expected).abs() < 1e-6,
                "sample {}: got {} expected {}",
                i,
                out,
                expected
            );
        }
    }

    #[test]
    fn test_unit_input_exposes_carrier() {
        // mix = 1, volume = 0 dB, input held at 1.0: the output is the
        // oscillator's own waveform sample for sample.
        let mut rm = RingModulator::new(1);
        rm.init(48_000);

        let mut buffers = vec![vec![1.0_f32; 100]];
        rm.process(&mut buffers, &params(480.0, 0.0, 1.0, 0.0));

        let mut reference = AdditiveOscillator::new();
        reference.init(48_000);
        reference.set_frequency(480.0);
        reference.set_shape(0.0);

        for (i, &out) in buffers[0].iter().enumerate() {
            let expected = reference.process();
            assert_eq!(
                out.to_bits(),
                expected.to_bits(),
                "sample {}: carrier should pass through bit-exactly",
                i
            );
        }
    }

    #[test]
    fn test_intermediate_mix_blend() {
        let mut rm = RingModulator::new(1);
        rm.init(48_000);

        let input = vec![0.5_f32; 64];
        let mut buffers = vec![input.clone()];
        rm.process(&mut buffers, &params(480.0, 0.0, 0.25, 0.0));

        let mut reference = AdditiveOscillator::new();
        reference.init(48_000);
        reference.set_frequency(480.0);
        reference.set_shape(0.0);

        for (i, &out) in buffers[0].iter().enumerate() {
            let carrier = reference.process();
            let expected = 0.25 * (0.5 * carrier) + 0.75 * 0.5;
            assert!(
                (out - expected).abs() < 1e-6,
                "sample {}: got {} expected {}",
                i,
                out,
                expected
            );
        }
    }

    #[test]
    fn test_channels_are_independent() {
        let mut rm = RingModulator::new(2);
        rm.init(48_000);

        // Feed different material per channel; each channel is modulated by
        // its own carrier at identical phase.
        let mut buffers = vec![vec![1.0_f32; 128], vec![-1.0_f32; 128]];
        rm.process(&mut buffers, &params(480.0, 0.0, 1.0, 0.0));

        for i in 0..128 {
            assert!(
                (buffers[0][i] + buffers[1][i]).abs() < 1e-6,
                "sample {}: channels should mirror for mirrored input",
                i
            );
        }
    }

    #[test]
    fn test_parameters_apply_per_block() {
        let mut rm = RingModulator::new(1);
        rm.init(48_000);

        // Two blocks at different frequencies: the second block picks up the
        // new period immediately, with no interpolation from the first.
        let mut first = vec![vec![1.0_f32; 100]];
        rm.process(&mut first, &params(480.0, 0.0, 1.0, 0.0));

        let mut second = vec![vec![1.0_f32; 100]];
        rm.process(&mut second, &params(960.0, 0.0, 1.0, 0.0));

        // 960 Hz at 48 kHz: 50-sample period, so the second block holds two
        // identical periods.
        for i in 0..50 {
            assert_eq!(
                second[0][i].to_bits(),
                second[0][i + 50].to_bits(),
                "sample {} should repeat at the new 50-sample period",
                i
            );
        }
    }

    #[test]
    fn test_silence_in_silence_out() {
        let mut rm = RingModulator::new(2);
        rm.init(44_100);

        let mut buffers = vec![vec![0.0_f32; 512], vec![0.0_f32; 512]];
        rm.process(&mut buffers, &params(1000.0, 1.0, 1.0, 12.0));

        for buffer in &buffers {
            assert!(
                buffer.iter().all(|&s| s == 0.0),
                "ring modulation of silence must stay silent"
            );
        }
    }

    #[test]
    fn test_fewer_buffers_than_channels() {
        // A mono buffer through a stereo processor touches only the first
        // carrier; no validation, no panic.
        let mut rm = RingModulator::new(2);
        rm.init(48_000);

        let mut buffers = vec![vec![1.0_f32; 32]];
        rm.process(&mut buffers, &params(480.0, 0.0, 1.0, 0.0));
        assert!(buffers[0].iter().all(|s| s.is_finite()));
    }
}
