//! Carrier oscillators.
//!
//! Band-limited oscillators that morph continuously from a pure sine wave
//! to a square-wave approximation by summing odd harmonics. These generate
//! the carrier signal for the ring modulator.

use std::f64::consts::PI;

/// Number of harmonics that can be added on top of the fundamental.
/// The harmonic count ranges continuously over [1, 24].
const MAX_EXTRA_HARMONICS: f64 = 23.0;

/// Common contract for carrier oscillators.
///
/// A carrier produces one sample per `process()` call. Frequency and shape
/// are pushed in at block boundaries by the channel processor; `init` is
/// called once per stream (re)start with the stream's sample rate.
///
/// # Real-time Constraints
///
/// `process`, `set_frequency`, and `set_shape` run on the audio thread and
/// must not allocate, lock, or block. All inputs are assumed pre-validated
/// by the parameter layer; none of these operations can fail.
pub trait Carrier {
    /// Sets the sample rate and resets the phase counter.
    ///
    /// Must be called before any `process()` call.
    fn init(&mut self, sample_rate: u32);

    /// Generates the next carrier sample.
    fn process(&mut self) -> f32;

    /// Sets the carrier frequency in Hz.
    ///
    /// Must be positive and below the sample rate. The frequency is
    /// quantized to one whose period is a whole number of samples.
    fn set_frequency(&mut self, frequency: f32);

    /// Sets the waveform shape. 0.0 is a pure sine, 1.0 a square-wave
    /// approximation built from 24 odd harmonics.
    fn set_shape(&mut self, shape: f32);
}

/// The reference carrier: a per-sample additive sum of odd harmonics.
///
/// The waveform is a partial Fourier series for a square wave: odd
/// harmonics at `1/(2i-1)` amplitude. The shape parameter sweeps the
/// harmonic count from 1 to 24; a fractionally weighted extra harmonic
/// keeps the sweep continuous between integer counts.
///
/// Phase is tracked as an integer sample counter over an integer period
/// length. Rounding the requested frequency to a whole number of samples
/// per period trades a small frequency error (at most the resolution of
/// `sample_rate / period_len`) for an exact wrap with zero cumulative
/// drift, so no floating-point phase accumulator is needed.
///
/// The output is the raw, unnormalized partial sum: a unit sine at
/// `shape = 0.0`, and near `shape = 1.0` a square-wave approximation whose
/// edges ring above the flat level (Gibbs phenomenon). Downstream mix and
/// volume controls are tuned against this range, so the sum must not be
/// rescaled or clamped.
#[derive(Debug, Clone)]
pub struct AdditiveOscillator {
    /// Sample rate from the last `init` call.
    sample_rate: u32,
    /// Internal shape value, the cube of the raw parameter.
    shape: f64,
    /// Position within the current period, in samples.
    phase_index: u32,
    /// Period length of the rounded carrier frequency, in samples.
    period_len: u32,
    /// Angular increment per sample of the rounded frequency.
    freq_coefficient: f64,
}

impl AdditiveOscillator {
    /// Creates a new oscillator with a 48 kHz default rate.
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000,
            shape: 0.0,
            phase_index: 0,
            period_len: 48_000,
            freq_coefficient: 1.0,
        }
    }

    /// Number of samples in one period of the rounded carrier frequency.
    pub fn period_len(&self) -> u32 {
        self.period_len
    }

    /// The frequency actually produced, after rounding the period to a
    /// whole number of samples.
    pub fn realized_frequency(&self) -> f32 {
        (self.sample_rate / self.period_len) as f32
    }
}

impl Default for AdditiveOscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Carrier for AdditiveOscillator {
    fn init(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        self.phase_index = 0;
    }

    fn process(&mut self) -> f32 {
        self.phase_index = (self.phase_index + 1) % self.period_len;

        let harmonics_f = 1.0 + MAX_EXTRA_HARMONICS * self.shape;
        let harmonics = harmonics_f as u32;

        let phase = self.freq_coefficient * f64::from(self.phase_index);

        let mut out = 0.0_f64;
        for i in 1..=harmonics {
            let odd = f64::from(2 * i - 1);
            out += (phase * odd).sin() / odd;
        }

        // Fractionally weighted next harmonic, so the shape sweep morphs
        // continuously instead of stepping at integer harmonic counts.
        let odd = f64::from(2 * harmonics + 1);
        let fraction = harmonics_f - f64::from(harmonics);
        out += fraction * (phase * odd).sin() / odd;

        out as f32
    }

    fn set_frequency(&mut self, frequency: f32) {
        // Truncate the requested frequency, then round it to a whole number
        // of samples per period. A request below 1 Hz degenerates to the
        // longest representable period instead of dividing by zero.
        let truncated = (frequency as u32).max(1);
        self.period_len = (self.sample_rate / truncated).max(1);

        let rounded = self.sample_rate / self.period_len;
        self.freq_coefficient = 2.0 * PI * f64::from(rounded) / f64::from(self.sample_rate);
    }

    fn set_shape(&mut self, shape: f32) {
        // Cubing gives the control a perceptually slower ramp near zero.
        self.shape = f64::from(shape).powi(3);
    }
}

/// Alternate carrier: half-period wavetable playback with interpolation.
///
/// Renders the additive waveform into a fixed-resolution table covering
/// half a period, then plays it back with linear interpolation, using the
/// waveform's odd half-wave symmetry for the second half. Parameter changes
/// mark the table dirty; it is re-rendered at the top of the next
/// `process()` call. The table matches [`AdditiveOscillator`] exactly at
/// table points; between points the output is interpolated rather than
/// evaluated.
///
/// Phase tracking is the same integer period counter as the reference
/// oscillator, so the two variants stay interchangeable behind [`Carrier`].
#[derive(Debug, Clone)]
pub struct WavetableOscillator {
    /// Sample rate from the last `init` call.
    sample_rate: u32,
    /// Internal shape value, the cube of the raw parameter.
    shape: f64,
    /// Position within the current period, in samples.
    phase_index: u32,
    /// Period length of the rounded carrier frequency, in samples.
    period_len: u32,
    /// Angular increment per sample of the rounded frequency.
    freq_coefficient: f64,
    /// One half period of the waveform, `TABLE_LEN + 1` points over [0, π].
    table: Vec<f32>,
    /// Table needs re-rendering before the next lookup.
    dirty: bool,
}

impl WavetableOscillator {
    /// Number of table intervals across the half period.
    const TABLE_LEN: usize = 1024;

    /// Creates a new oscillator with a 48 kHz default rate.
    ///
    /// The table is allocated here, never on the audio thread.
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000,
            shape: 0.0,
            phase_index: 0,
            period_len: 48_000,
            freq_coefficient: 1.0,
            table: vec![0.0; Self::TABLE_LEN + 1],
            dirty: true,
        }
    }

    /// Number of samples in one period of the rounded carrier frequency.
    pub fn period_len(&self) -> u32 {
        self.period_len
    }

    /// Evaluates the additive sum at angle `theta` for the current shape.
    fn evaluate(&self, theta: f64) -> f64 {
        let harmonics_f = 1.0 + MAX_EXTRA_HARMONICS * self.shape;
        let harmonics = harmonics_f as u32;

        let mut out = 0.0_f64;
        for i in 1..=harmonics {
            let odd = f64::from(2 * i - 1);
            out += (theta * odd).sin() / odd;
        }

        let odd = f64::from(2 * harmonics + 1);
        let fraction = harmonics_f - f64::from(harmonics);
        out += fraction * (theta * odd).sin() / odd;

        out
    }

    /// Re-renders the half-period table in place.
    fn render(&mut self) {
        for j in 0..=Self::TABLE_LEN {
            let theta = PI * j as f64 / Self::TABLE_LEN as f64;
            self.table[j] = self.evaluate(theta) as f32;
        }
    }

    /// Interpolated table read at angle `theta` in [0, 2π).
    ///
    /// The second half period is the negated mirror of the first.
    fn lookup(&self, theta: f64) -> f32 {
        let (theta, sign) = if theta >= PI {
            (theta - PI, -1.0_f32)
        } else {
            (theta, 1.0_f32)
        };

        let position = theta / PI * Self::TABLE_LEN as f64;
        let index = (position as usize).min(Self::TABLE_LEN - 1);
        let frac = (position - index as f64) as f32;

        sign * (self.table[index] * (1.0 - frac) + self.table[index + 1] * frac)
    }
}

impl Default for WavetableOscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Carrier for WavetableOscillator {
    fn init(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        self.phase_index = 0;
        self.dirty = true;
    }

    fn process(&mut self) -> f32 {
        if self.dirty {
            self.render();
            self.dirty = false;
        }

        self.phase_index = (self.phase_index + 1) % self.period_len;

        let theta = (self.freq_coefficient * f64::from(self.phase_index)).rem_euclid(2.0 * PI);
        self.lookup(theta)
    }

    fn set_frequency(&mut self, frequency: f32) {
        let truncated = (frequency as u32).max(1);
        self.period_len = (self.sample_rate / truncated).max(1);

        let rounded = self.sample_rate / self.period_len;
        self.freq_coefficient = 2.0 * PI * f64::from(rounded) / f64::from(self.sample_rate);
    }

    fn set_shape(&mut self, shape: f32) {
        let shape = f64::from(shape).powi(3);
        if shape != self.shape {
            self.shape = shape;
            self.dirty = true;
        }
    }
}
