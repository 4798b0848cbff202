//! Audio Engine
//!
//! Manages the cpal capture and playback streams and interfaces with the
//! system audio hardware. Both callbacks run on real-time threads and must
//! be real-time safe; audio crosses between them through a lock-free ring
//! buffer.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, SampleRate, Stream, StreamConfig};
use rtrb::Producer;
use std::sync::{Arc, Mutex};

use super::processor::EffectProcessor;

/// Errors that can occur during audio engine operation.
#[derive(Debug, Clone)]
pub enum AudioError {
    /// No audio output device was found.
    NoOutputDevice,
    /// No audio input device was found.
    NoInputDevice,
    /// Failed to get device configuration.
    ConfigurationFailed(String),
    /// Input and output devices run at different sample rates.
    SampleRateMismatch { input: u32, output: u32 },
    /// Failed to create an audio stream.
    StreamCreationFailed(String),
    /// Failed to start/stop playback.
    StreamPlaybackFailed(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "No audio output device found"),
            AudioError::NoInputDevice => write!(f, "No audio input device found"),
            AudioError::ConfigurationFailed(msg) => {
                write!(f, "Failed to get device configuration: {}", msg)
            }
            AudioError::SampleRateMismatch { input, output } => write!(
                f,
                "Input runs at {} Hz but output at {} Hz; resampling is not supported",
                input, output
            ),
            AudioError::StreamCreationFailed(msg) => {
                write!(f, "Failed to create audio stream: {}", msg)
            }
            AudioError::StreamPlaybackFailed(msg) => {
                write!(f, "Failed to control audio playback: {}", msg)
            }
        }
    }
}

impl std::error::Error for AudioError {}

/// The main audio engine: default input device in, ring modulator, default
/// output device out.
pub struct AudioEngine {
    input_device: Device,
    output_device: Device,
    input_config: StreamConfig,
    output_config: StreamConfig,
    input_stream: Option<Stream>,
    output_stream: Option<Stream>,
}

impl AudioEngine {
    /// Create a new AudioEngine using the default input and output devices.
    ///
    /// Both devices must run at the same sample rate; the engine performs
    /// no resampling.
    pub fn new() -> Result<Self, AudioError> {
        let host: Host = cpal::default_host();

        let output_device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let input_device = host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;

        let output_supported = output_device
            .default_output_config()
            .map_err(|e| AudioError::ConfigurationFailed(e.to_string()))?;
        let input_supported = input_device
            .default_input_config()
            .map_err(|e| AudioError::ConfigurationFailed(e.to_string()))?;

        let output_rate = output_supported.sample_rate().0;
        let input_rate = input_supported.sample_rate().0;
        if output_rate != input_rate {
            return Err(AudioError::SampleRateMismatch {
                input: input_rate,
                output: output_rate,
            });
        }

        let output_config = StreamConfig {
            channels: output_supported.channels(),
            sample_rate: SampleRate(output_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let input_config = StreamConfig {
            channels: input_supported.channels(),
            sample_rate: SampleRate(input_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            input_device,
            output_device,
            input_config,
            output_config,
            input_stream: None,
            output_stream: None,
        })
    }

    /// Get the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.output_config.sample_rate.0
    }

    /// Get the number of output channels. This is the channel count the
    /// effect processes at; captured input is mapped onto it.
    pub fn channels(&self) -> u16 {
        self.output_config.channels
    }

    /// Get the name of the input device.
    pub fn input_device_name(&self) -> String {
        self.input_device
            .name()
            .unwrap_or_else(|_| "Unknown".to_string())
    }

    /// Get the name of the output device.
    pub fn output_device_name(&self) -> String {
        self.output_device
            .name()
            .unwrap_or_else(|_| "Unknown".to_string())
    }

    /// Start the capture and playback streams.
    ///
    /// The processor is moved into the output callback; `input_tx` is the
    /// producer side of the ring buffer the processor consumes from, and is
    /// moved into the input callback. Captured frames are remapped from the
    /// input device's channel count onto the processor's: extra channels
    /// are dropped, missing ones are duplicated from the last captured
    /// channel.
    pub fn start(
        &mut self,
        processor: EffectProcessor,
        mut input_tx: Producer<f32>,
    ) -> Result<(), AudioError> {
        if self.output_stream.is_some() {
            return Ok(());
        }

        let input_channels = self.input_config.channels as usize;
        let output_channels = self.output_config.channels as usize;

        let input_stream = self
            .input_device
            .build_input_stream(
                &self.input_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // REAL-TIME SAFE: push remapped frames, drop on overflow.
                    for frame in data.chunks(input_channels) {
                        for channel in 0..output_channels {
                            let sample = frame
                                .get(channel)
                                .or_else(|| frame.last())
                                .copied()
                                .unwrap_or(0.0);
                            let _ = input_tx.push(sample);
                        }
                    }
                },
                move |err| {
                    eprintln!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::StreamCreationFailed(e.to_string()))?;

        // Wrap the processor in a Mutex for the callback. The lock is
        // uncontested: only the output callback takes it, so try_lock never
        // actually blocks.
        let processor = Arc::new(Mutex::new(processor));

        let output_stream = self
            .output_device
            .build_output_stream(
                &self.output_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if let Ok(mut proc) = processor.try_lock() {
                        proc.process(data, output_channels);
                    } else {
                        for sample in data.iter_mut() {
                            *sample = 0.0;
                        }
                    }
                },
                move |err| {
                    eprintln!("Audio output stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::StreamCreationFailed(e.to_string()))?;

        input_stream
            .play()
            .map_err(|e| AudioError::StreamPlaybackFailed(e.to_string()))?;
        output_stream
            .play()
            .map_err(|e| AudioError::StreamPlaybackFailed(e.to_string()))?;

        self.input_stream = Some(input_stream);
        self.output_stream = Some(output_stream);
        Ok(())
    }

    /// Stop both streams.
    pub fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = self.input_stream.take() {
            stream
                .pause()
                .map_err(|e| AudioError::StreamPlaybackFailed(e.to_string()))?;
        }
        if let Some(stream) = self.output_stream.take() {
            stream
                .pause()
                .map_err(|e| AudioError::StreamPlaybackFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Check if the engine is currently running.
    pub fn is_running(&self) -> bool {
        self.output_stream.is_some()
    }
}
