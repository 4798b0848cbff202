//! Engine Channels
//!
//! Lock-free communication between the control thread and the audio engine
//! thread. Uses rtrb ring buffers for SPSC (single-producer,
//! single-consumer) queues, so the audio callback never locks or blocks.

use rtrb::{Consumer, Producer, RingBuffer};

use super::commands::{EngineCommand, EngineEvent};

/// Default buffer size for the command queue (control -> engine).
pub const DEFAULT_COMMAND_BUFFER_SIZE: usize = 256;

/// Default buffer size for the event queue (engine -> control).
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

/// Holds both directions of communication channels.
/// Split into producer/consumer pairs for the two threads.
pub struct EngineChannels {
    /// Send commands from control to engine.
    pub command_tx: Producer<EngineCommand>,
    /// Receive commands in engine from control.
    pub command_rx: Consumer<EngineCommand>,
    /// Send events from engine to control.
    pub event_tx: Producer<EngineEvent>,
    /// Receive events in control from engine.
    pub event_rx: Consumer<EngineEvent>,
}

impl EngineChannels {
    /// Create new engine channels with the specified buffer sizes.
    pub fn new(command_capacity: usize, event_capacity: usize) -> Self {
        let (command_tx, command_rx) = RingBuffer::new(command_capacity);
        let (event_tx, event_rx) = RingBuffer::new(event_capacity);

        Self {
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Create new channels with default buffer sizes.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_COMMAND_BUFFER_SIZE, DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Split the channels into control-side and engine-side handles.
    /// This consumes self and returns two handles that can be sent to
    /// different threads.
    pub fn split(self) -> (ControlHandle, EngineHandle) {
        let control_handle = ControlHandle {
            command_tx: self.command_tx,
            event_rx: self.event_rx,
        };
        let engine_handle = EngineHandle {
            command_rx: self.command_rx,
            event_tx: self.event_tx,
        };
        (control_handle, engine_handle)
    }
}

/// Control-side handle for communicating with the audio engine.
/// Holds the command producer and event consumer.
pub struct ControlHandle {
    command_tx: Producer<EngineCommand>,
    event_rx: Consumer<EngineEvent>,
}

impl ControlHandle {
    /// Send a command to the audio engine.
    /// Returns Ok(()) if the command was queued, or Err(cmd) if the buffer
    /// is full. Never waits for space.
    pub fn send_command(&mut self, cmd: EngineCommand) -> Result<(), EngineCommand> {
        self.command_tx
            .push(cmd)
            .map_err(|rtrb::PushError::Full(cmd)| cmd)
    }

    /// Receive an event from the audio engine.
    /// Returns Some(event) if available, None if no events pending.
    pub fn recv_event(&mut self) -> Option<EngineEvent> {
        self.event_rx.pop().ok()
    }

    /// Drain all pending events from the engine.
    pub fn drain_events(&mut self) -> impl Iterator<Item = EngineEvent> + '_ {
        std::iter::from_fn(|| self.recv_event())
    }

    /// Check if the command buffer is full.
    pub fn is_command_buffer_full(&self) -> bool {
        self.command_tx.is_full()
    }
}

/// Engine-side handle for communicating with the control thread.
/// Holds the command consumer and event producer.
///
/// IMPORTANT: All methods are real-time safe (non-blocking, no
/// allocations).
pub struct EngineHandle {
    command_rx: Consumer<EngineCommand>,
    event_tx: Producer<EngineEvent>,
}

impl EngineHandle {
    /// Receive a command from the control thread.
    ///
    /// REAL-TIME SAFE: Non-blocking operation.
    pub fn recv_command(&mut self) -> Option<EngineCommand> {
        self.command_rx.pop().ok()
    }

    /// Process all pending commands with the given handler, in order.
    ///
    /// REAL-TIME SAFE: Non-blocking, no allocations.
    pub fn process_commands<F>(&mut self, mut handler: F)
    where
        F: FnMut(EngineCommand),
    {
        while let Some(cmd) = self.recv_command() {
            handler(cmd);
        }
    }

    /// Try to send an event, dropping it silently if the buffer is full.
    /// Metering data tolerates dropped values.
    ///
    /// REAL-TIME SAFE: Non-blocking, no allocations.
    pub fn send_event_lossy(&mut self, event: EngineEvent) {
        let _ = self.event_tx.push(event);
    }

    /// Check how many commands are pending.
    pub fn commands_pending(&self) -> usize {
        self.command_rx.slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_creation() {
        let channels = EngineChannels::new(64, 32);
        assert_eq!(channels.command_tx.slots(), 64);
        assert_eq!(channels.event_tx.slots(), 32);
    }

    #[test]
    fn test_default_channels() {
        let channels = EngineChannels::with_defaults();
        assert_eq!(channels.command_tx.slots(), DEFAULT_COMMAND_BUFFER_SIZE);
        assert_eq!(channels.event_tx.slots(), DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_command_send_receive() {
        let channels = EngineChannels::new(64, 64);
        let (mut control, mut engine) = channels.split();

        let result = control.send_command(EngineCommand::SetFrequency(880.0));
        assert!(result.is_ok());

        let cmd = engine.recv_command();
        assert_eq!(cmd, Some(EngineCommand::SetFrequency(880.0)));
    }

    #[test]
    fn test_event_send_receive() {
        let channels = EngineChannels::new(64, 64);
        let (mut control, mut engine) = channels.split();

        engine.send_event_lossy(EngineEvent::OutputLevel {
            left: 0.5,
            right: 0.6,
        });

        let event = control.recv_event();
        assert!(event.is_some());
        if let Some(EngineEvent::OutputLevel { left, right }) = event {
            assert!((left - 0.5).abs() < f32::EPSILON);
            assert!((right - 0.6).abs() < f32::EPSILON);
        } else {
            panic!("Wrong event type");
        }
    }

    #[test]
    fn test_buffer_full_handling() {
        let channels = EngineChannels::new(2, 2);
        let (mut control, _engine) = channels.split();

        assert!(control.send_command(EngineCommand::SetBypass(true)).is_ok());
        assert!(control.send_command(EngineCommand::SetBypass(false)).is_ok());

        assert!(control.is_command_buffer_full());

        // The returned command is the one that did not fit.
        let result = control.send_command(EngineCommand::SetMix(0.5));
        assert_eq!(result, Err(EngineCommand::SetMix(0.5)));
    }

    #[test]
    fn test_process_commands_in_order() {
        let channels = EngineChannels::new(64, 64);
        let (mut control, mut engine) = channels.split();

        control.send_command(EngineCommand::SetFrequency(100.0)).unwrap();
        control.send_command(EngineCommand::SetShape(0.5)).unwrap();
        control.send_command(EngineCommand::SetVolume(-6.0)).unwrap();

        let mut commands = Vec::new();
        engine.process_commands(|cmd| commands.push(cmd));

        assert_eq!(
            commands,
            vec![
                EngineCommand::SetFrequency(100.0),
                EngineCommand::SetShape(0.5),
                EngineCommand::SetVolume(-6.0),
            ]
        );
        assert!(engine.recv_command().is_none());
    }

    #[test]
    fn test_lossy_event_send() {
        let channels = EngineChannels::new(1, 1);
        let (mut control, mut engine) = channels.split();

        engine.send_event_lossy(EngineEvent::InputUnderrun { missing: 10 });
        engine.send_event_lossy(EngineEvent::InputUnderrun { missing: 20 }); // Dropped.

        assert!(control.recv_event().is_some());
        assert!(control.recv_event().is_none());
    }

    #[test]
    fn test_drain_events() {
        let channels = EngineChannels::new(64, 64);
        let (mut control, mut engine) = channels.split();

        engine.send_event_lossy(EngineEvent::OutputLevel { left: 0.1, right: 0.2 });
        engine.send_event_lossy(EngineEvent::OutputLevel { left: 0.3, right: 0.4 });
        engine.send_event_lossy(EngineEvent::InputUnderrun { missing: 4 });

        let events: Vec<_> = control.drain_events().collect();
        assert_eq!(events.len(), 3);
        assert!(control.recv_event().is_none());
    }

    #[test]
    fn test_commands_pending() {
        let channels = EngineChannels::new(64, 64);
        let (mut control, engine) = channels.split();

        assert_eq!(engine.commands_pending(), 0);

        control.send_command(EngineCommand::SetBypass(true)).unwrap();
        control.send_command(EngineCommand::SetMix(1.0)).unwrap();

        assert_eq!(engine.commands_pending(), 2);
    }

    #[test]
    fn test_handles_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ControlHandle>();
        assert_send::<EngineHandle>();
    }

    #[test]
    fn test_empty_receive() {
        let channels = EngineChannels::new(64, 64);
        let (mut control, mut engine) = channels.split();

        assert!(engine.recv_command().is_none());
        assert!(control.recv_event().is_none());
    }
}
