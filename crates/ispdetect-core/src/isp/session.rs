//! Programming-mode handshake and command channel

use super::opcodes;
use crate::error::{Error, Result};
use crate::programmer::IspMaster;

/// Default number of Programming Enable attempts
const DEFAULT_MAX_ATTEMPTS: u8 = 10;
/// Default wait before each attempt in milliseconds
const DEFAULT_SETTLE_MS: u32 = 100;
/// Default width of the RESET pulse in microseconds
const DEFAULT_RESET_PULSE_US: u32 = 1000;
/// Default wait after RESET goes active, datasheets require at least 20 ms
const DEFAULT_ENABLE_DELAY_MS: u32 = 25;

/// Timing and retry parameters for entering programming mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeConfig {
    /// Total number of Programming Enable attempts before giving up
    pub max_attempts: u8,
    /// Delay before each attempt in milliseconds
    pub settle_ms: u32,
    /// Width of the RESET pulse in microseconds
    ///
    /// Never shorter than two bus clock periods.
    pub reset_pulse_us: u32,
    /// Delay between RESET going active and Programming Enable
    pub enable_delay_ms: u32,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            settle_ms: DEFAULT_SETTLE_MS,
            reset_pulse_us: DEFAULT_RESET_PULSE_US,
            enable_delay_ms: DEFAULT_ENABLE_DELAY_MS,
        }
    }
}

impl HandshakeConfig {
    /// Set the number of attempts
    pub fn with_max_attempts(mut self, attempts: u8) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the delay before each attempt
    pub fn with_settle_ms(mut self, ms: u32) -> Self {
        self.settle_ms = ms;
        self
    }

    /// Set the RESET pulse width
    pub fn with_reset_pulse_us(mut self, us: u32) -> Self {
        self.reset_pulse_us = us;
        self
    }

    /// Set the delay between RESET and Programming Enable
    pub fn with_enable_delay_ms(mut self, ms: u32) -> Self {
        self.enable_delay_ms = ms;
        self
    }
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Bus not driven, target running normally
    Idle,
    /// Handshake in progress
    Syncing,
    /// Target acknowledged Programming Enable and accepts commands
    Ready,
    /// Handshake attempts exhausted
    Failed,
}

/// An ISP session with one target chip
///
/// Owns the bus master for the duration of a detection run. The session
/// also remembers the extended address byte last loaded into the target,
/// since that register lives on the chip for as long as it stays in
/// programming mode.
pub struct IspSession<M: IspMaster> {
    master: M,
    config: HandshakeConfig,
    state: SessionState,
    attempts: u8,
    bus_held: bool,
    extended_address: u8,
}

impl<M: IspMaster> IspSession<M> {
    /// Create an idle session with the default handshake timing
    pub fn new(master: M) -> Self {
        Self::with_config(master, HandshakeConfig::default())
    }

    /// Create an idle session with custom handshake timing
    pub fn with_config(master: M, config: HandshakeConfig) -> Self {
        Self {
            master,
            config,
            state: SessionState::Idle,
            attempts: 0,
            bus_held: false,
            extended_address: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of handshake attempts made by the last `establish`
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Handshake configuration
    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// Get a reference to the bus master
    pub fn master(&self) -> &M {
        &self.master
    }

    /// Get a mutable reference to the bus master
    pub fn master_mut(&mut self) -> &mut M {
        &mut self.master
    }

    /// Tear down and return the bus master
    pub fn into_inner(mut self) -> M {
        self.teardown();
        self.master
    }

    /// Bring the target into serial programming mode
    ///
    /// Pulses RESET and sends Programming Enable until the target echoes
    /// the acknowledgement byte, up to `max_attempts` times. Calling this
    /// on a `Ready` session is a no-op. Any error leaves the session
    /// `Failed`.
    pub fn establish(&mut self) -> Result<()> {
        if self.state == SessionState::Ready {
            return Ok(());
        }

        self.state = SessionState::Syncing;
        self.attempts = 0;
        self.extended_address = 0;

        match self.sync() {
            Ok(()) => {
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    fn sync(&mut self) -> Result<()> {
        self.master.begin_session()?;
        self.bus_held = true;
        self.master.set_reset(false)?;

        let max_attempts = self.config.max_attempts.max(1);
        let pulse_us = self.reset_pulse_us();

        log::debug!(
            "isp: entering programming mode (max {} attempts, pulse {} us)",
            max_attempts,
            pulse_us
        );

        loop {
            self.attempts += 1;

            // SCK is already low here, the bus leaves it low after every byte
            self.master.delay_ms(self.config.settle_ms);
            self.master.set_reset(false)?;
            self.master.delay_us(pulse_us);
            self.master.set_reset(true)?;
            self.master.delay_ms(self.config.enable_delay_ms);

            let reply = self.exchange([
                opcodes::PROGRAM_ENABLE,
                opcodes::PROGRAM_ACK,
                0x00,
                0x00,
            ])?;

            if reply[2] == opcodes::PROGRAM_ACK {
                log::info!(
                    "isp: entered programming mode after {} attempt{}",
                    self.attempts,
                    if self.attempts == 1 { "" } else { "s" }
                );
                return Ok(());
            }

            log::debug!(
                "isp: attempt {} not acknowledged (got 0x{:02X})",
                self.attempts,
                reply[2]
            );

            if self.attempts >= max_attempts {
                log::error!(
                    "isp: failed to enter programming mode after {} attempts",
                    self.attempts
                );
                return Err(Error::ProgrammingModeFailed {
                    attempts: self.attempts,
                });
            }
        }
    }

    /// Execute one programming instruction
    ///
    /// `b1` is the instruction, `b2..b4` its arguments. The target answers
    /// one byte late, so results surface on the fourth transfer, which is
    /// what this returns.
    pub fn execute(&mut self, b1: u8, b2: u8, b3: u8, b4: u8) -> Result<u8> {
        if self.state != SessionState::Ready {
            return Err(Error::SessionNotReady);
        }
        let reply = self.exchange([b1, b2, b3, b4])?;
        Ok(reply[3])
    }

    /// Release the target
    ///
    /// Deasserts RESET and releases the bus. Safe to call in any state and
    /// any number of times.
    pub fn teardown(&mut self) {
        if self.bus_held {
            if let Err(e) = self.master.set_reset(false) {
                log::warn!("isp: failed to release RESET: {}", e);
            }
            self.master.end_session();
            self.bus_held = false;
            log::debug!("isp: session closed");
        }

        if self.state != SessionState::Failed {
            self.state = SessionState::Idle;
        }
    }

    /// Extended address byte currently loaded in the target
    pub fn loaded_extended_address(&self) -> u8 {
        self.extended_address
    }

    pub(crate) fn set_loaded_extended_address(&mut self, value: u8) {
        self.extended_address = value;
    }

    fn exchange(&mut self, frame: [u8; 4]) -> Result<[u8; 4]> {
        let mut reply = [0u8; 4];
        for (out, slot) in frame.iter().zip(reply.iter_mut()) {
            *slot = self.master.transfer(*out)?;
        }
        Ok(reply)
    }

    fn reset_pulse_us(&self) -> u32 {
        let two_clocks_us = (2 * self.master.clock_period_ns()).div_ceil(1000);
        let min_us = u32::try_from(two_clocks_us).unwrap_or(u32::MAX);
        self.config.reset_pulse_us.max(min_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedMaster;

    #[test]
    fn test_establish_first_attempt() {
        let mut session = IspSession::new(ScriptedMaster::acking_after(1));
        session.establish().unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.attempts(), 1);
        assert!(session.master().reset_active);
        assert_eq!(
            session.master().frames[0],
            [opcodes::PROGRAM_ENABLE, opcodes::PROGRAM_ACK, 0x00, 0x00]
        );
    }

    #[test]
    fn test_establish_retries_until_ack() {
        let mut session = IspSession::new(ScriptedMaster::acking_after(4));
        session.establish().unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.attempts(), 4);
        // One RESET pulse per attempt
        assert_eq!(session.master().reset_pulses, 4);
    }

    #[test]
    fn test_establish_gives_up_after_ten_attempts() {
        let mut session = IspSession::new(ScriptedMaster::never_acking());
        let err = session.establish().unwrap_err();

        assert_eq!(err, Error::ProgrammingModeFailed { attempts: 10 });
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.master().frames.len(), 10);
        assert!(session
            .master()
            .frames
            .iter()
            .all(|f| f[0] == opcodes::PROGRAM_ENABLE));

        // Nothing else can be issued
        assert_eq!(
            session.execute(opcodes::READ_SIGNATURE, 0, 0, 0),
            Err(Error::SessionNotReady)
        );
        assert_eq!(session.master().frames.len(), 10);
    }

    #[test]
    fn test_ack_on_tenth_attempt_succeeds() {
        let mut session = IspSession::new(ScriptedMaster::acking_after(10));
        session.establish().unwrap();
        assert_eq!(session.attempts(), 10);
    }

    #[test]
    fn test_reset_pulse_respects_two_clock_periods() {
        let mut master = ScriptedMaster::acking_after(1);
        // 2 us clock period, so the minimum pulse is 4 us
        master.clock_period_ns = 2_000;
        let config = HandshakeConfig::default().with_reset_pulse_us(1);
        let session = IspSession::with_config(master, config);
        assert_eq!(session.reset_pulse_us(), 4);

        let session = IspSession::new(ScriptedMaster::acking_after(1));
        assert_eq!(session.reset_pulse_us(), DEFAULT_RESET_PULSE_US);
    }

    #[test]
    fn test_handshake_delays() {
        let mut session = IspSession::new(ScriptedMaster::acking_after(2));
        session.establish().unwrap();
        let per_attempt =
            DEFAULT_SETTLE_MS * 1000 + DEFAULT_RESET_PULSE_US + DEFAULT_ENABLE_DELAY_MS * 1000;
        assert_eq!(session.master().delayed_us, 2 * per_attempt as u64);
    }

    #[test]
    fn test_execute_returns_fourth_byte() {
        let mut session = IspSession::new(ScriptedMaster::acking_after(1));

        assert_eq!(
            session.execute(opcodes::READ_SIGNATURE, 0, 0, 0),
            Err(Error::SessionNotReady)
        );

        session.establish().unwrap();
        assert_eq!(session.execute(opcodes::READ_SIGNATURE, 0, 0, 0), Ok(0x1E));
        assert_eq!(session.master().frames.last(), Some(&[0x30, 0, 0, 0]));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut session = IspSession::new(ScriptedMaster::acking_after(1));
        session.teardown();
        assert_eq!(session.master().end_sessions, 0);

        session.establish().unwrap();
        session.teardown();
        session.teardown();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.master().reset_active);
        assert_eq!(session.master().end_sessions, 1);
    }

    #[test]
    fn test_teardown_after_failure() {
        let mut session = IspSession::new(ScriptedMaster::never_acking());
        assert!(session.establish().is_err());
        session.teardown();

        assert_eq!(session.state(), SessionState::Failed);
        assert!(!session.master().reset_active);
        assert_eq!(session.master().end_sessions, 1);
    }

    #[test]
    fn test_transfer_error_fails_session() {
        let mut master = ScriptedMaster::acking_after(1);
        master.fail_transfers = true;
        let mut session = IspSession::new(master);

        assert_eq!(session.establish(), Err(Error::TransferFailed));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn test_reset_error_fails_session() {
        let mut master = ScriptedMaster::acking_after(1);
        // RESET fails when the first attempt drives it active
        master.fail_reset_after = Some(2);
        let mut session = IspSession::new(master);

        assert_eq!(session.establish(), Err(Error::ProgrammerError));
        assert_eq!(session.state(), SessionState::Failed);

        session.teardown();
        assert_eq!(session.master().end_sessions, 1);
    }

    #[test]
    fn test_begin_session_error_fails_session() {
        let mut master = ScriptedMaster::acking_after(1);
        master.fail_begin = true;
        let mut session = IspSession::new(master);

        assert_eq!(session.establish(), Err(Error::ProgrammerError));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.attempts(), 0);

        // Nothing was acquired, so there is nothing to release
        session.teardown();
        assert_eq!(session.master().end_sessions, 0);
    }
}
