//! Ring Modulator - a live ring modulator effect
//!
//! Entry point for the standalone host: captures the default input device,
//! ring modulates it against the carrier, and plays the result back on the
//! default output device. Parameters are adjusted from stdin while the
//! streams run.

use std::error::Error;
use std::io::{self, BufRead};
use std::path::Path;

use rtrb::RingBuffer;

use ring_modulator::config::{self, EffectConfig};
use ring_modulator::dsp::{
    control_parameters, ParameterDefinition, PARAM_FREQUENCY, PARAM_MIX, PARAM_SHAPE, PARAM_VOLUME,
};
use ring_modulator::engine::{
    AudioEngine, ControlHandle, EffectProcessor, EngineChannels, EngineCommand, EngineEvent,
};

/// Expected samples per callback; the processor's scratch grows if the
/// device delivers more.
const DEFAULT_BLOCK_SIZE: usize = 512;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => config::load_from_file(Path::new(&path))?,
        None => EffectConfig::default(),
    }
    .clamped();

    let (mut control, engine_handle) = EngineChannels::with_defaults().split();
    let mut engine = AudioEngine::new()?;

    let sample_rate = engine.sample_rate();
    let channels = engine.channels() as usize;

    // A quarter second of interleaved frames between capture and playback.
    let (input_tx, input_rx) = RingBuffer::new(sample_rate as usize / 4 * channels);
    let processor = EffectProcessor::new(
        sample_rate,
        DEFAULT_BLOCK_SIZE,
        channels,
        engine_handle,
        input_rx,
    );

    // Queue the startup values so the first block already runs with them.
    let _ = control.send_command(EngineCommand::SetFrequency(config.frequency));
    let _ = control.send_command(EngineCommand::SetShape(config.shape));
    let _ = control.send_command(EngineCommand::SetMix(config.mix));
    let _ = control.send_command(EngineCommand::SetVolume(config.volume_db));

    engine.start(processor, input_tx)?;

    println!(
        "ring modulator: {} -> {} ({} Hz, {} channels)",
        engine.input_device_name(),
        engine.output_device_name(),
        sample_rate,
        channels
    );
    print_help();

    let params = control_parameters();
    let mut bypassed = false;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();

        match (words.next(), words.next()) {
            (Some("freq"), value) => {
                set_parameter(&mut control, &params[PARAM_FREQUENCY], value, EngineCommand::SetFrequency)
            }
            (Some("shape"), value) => {
                set_parameter(&mut control, &params[PARAM_SHAPE], value, EngineCommand::SetShape)
            }
            (Some("mix"), value) => {
                set_parameter(&mut control, &params[PARAM_MIX], value, EngineCommand::SetMix)
            }
            (Some("volume"), value) => {
                set_parameter(&mut control, &params[PARAM_VOLUME], value, EngineCommand::SetVolume)
            }
            (Some("bypass"), _) => {
                bypassed = !bypassed;
                let _ = control.send_command(EngineCommand::SetBypass(bypassed));
                println!("bypass {}", if bypassed { "on" } else { "off" });
            }
            (Some("status"), _) => print_status(&mut control),
            (Some("help"), _) => print_help(),
            (Some("quit"), _) | (Some("exit"), _) => break,
            (None, _) => {}
            (Some(other), _) => println!("unrecognized command '{}'; try 'help'", other),
        }
    }

    engine.stop()?;
    Ok(())
}

/// Parses, clamps, and sends a parameter value.
fn set_parameter(
    control: &mut ControlHandle,
    param: &ParameterDefinition,
    value: Option<&str>,
    command: fn(f32) -> EngineCommand,
) {
    let Some(value) = value else {
        println!(
            "usage: {} <{}..{} {}>",
            param.id,
            param.min,
            param.max,
            param.display.unit()
        );
        return;
    };

    match value.parse::<f32>() {
        Ok(parsed) => {
            let clamped = param.clamp(parsed);
            if control.send_command(command(clamped)).is_err() {
                eprintln!("command queue full, value dropped");
                return;
            }
            println!("{} = {} {}", param.name, clamped, param.display.unit());
        }
        Err(_) => println!("'{}' is not a number", value),
    }
}

/// Drains engine events and prints the latest levels.
fn print_status(control: &mut ControlHandle) {
    let mut level = None;
    let mut underrun = 0;
    for event in control.drain_events() {
        match event {
            EngineEvent::OutputLevel { left, right } => level = Some((left, right)),
            EngineEvent::InputUnderrun { missing } => underrun += missing,
        }
    }

    match level {
        Some((left, right)) => println!("output peak: L {:.3} R {:.3}", left, right),
        None => println!("no level data yet"),
    }
    if underrun > 0 {
        println!("input underruns since last status: {} samples", underrun);
    }
}

fn print_help() {
    println!("commands:");
    println!("  freq <hz>      carrier frequency (20-10000)");
    println!("  shape <0-1>    carrier shape, sine to square");
    println!("  mix <0-1>      dry/wet mix");
    println!("  volume <db>    output volume (-12 to 12)");
    println!("  bypass         toggle bypass");
    println!("  status         show output levels");
    println!("  quit           stop and exit");
}
