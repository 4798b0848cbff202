//! Ring Modulator Library
//!
//! Core library for the ring modulator effect: a shape-morphable carrier
//! oscillator, the per-channel modulation loop, and a small real-time host.

pub mod config;
pub mod dsp;
pub mod engine;
