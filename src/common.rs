// Licensed under the Apache-2.0 license

//! Logging shared by all drivers.
//!
//! Drivers take a `L: Logger` type parameter that defaults to [`NoOpLogger`],
//! so logging costs nothing unless a board wires a real sink in.

use core::fmt::{self, Write as _};
use heapless::{Deque, String};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Debug,
    Error,
}

impl Level {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Error => "error",
        }
    }
}

pub trait Logger {
    fn debug(&mut self, args: fmt::Arguments<'_>);
    fn error(&mut self, args: fmt::Arguments<'_>);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&mut self, _args: fmt::Arguments<'_>) {}
    fn error(&mut self, _args: fmt::Arguments<'_>) {}
}

/// Maximum stored length of a single message; longer ones are truncated.
pub const LOG_LINE_LEN: usize = 96;

/// Keeps the most recent `N` messages in RAM.
///
/// The bus handle owns its logger, so it cannot share the console with the
/// code that prints results. Messages are buffered here instead and written
/// out with [`RingLogger::drain_to`] between transactions.
pub struct RingLogger<const N: usize> {
    entries: Deque<(Level, String<LOG_LINE_LEN>), N>,
    dropped: u32,
}

impl<const N: usize> Default for RingLogger<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingLogger<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            dropped: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages evicted because the ring was full.
    #[must_use]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, &str)> {
        self.entries.iter().map(|(level, line)| (*level, line.as_str()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dropped = 0;
    }

    /// Write every buffered message to `out` as `[level] text\r\n` and empty
    /// the ring.
    ///
    /// # Errors
    ///
    /// Returns the first write error; messages not yet written stay buffered.
    pub fn drain_to<W: embedded_io::Write>(
        &mut self,
        out: &mut W,
    ) -> Result<(), embedded_io::WriteFmtError<W::Error>> {
        while let Some((level, line)) = self.entries.front() {
            write!(out, "[{}] {}\r\n", level.as_str(), line.as_str())?;
            self.entries.pop_front();
        }
        Ok(())
    }

    fn push(&mut self, level: Level, args: fmt::Arguments<'_>) {
        let mut line = String::new();
        // Overflow drops the fragment that did not fit.
        let _ = line.write_fmt(args);
        if self.entries.is_full() {
            self.entries.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        let _ = self.entries.push_back((level, line));
    }
}

impl<const N: usize> Logger for RingLogger<N> {
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.push(Level::Debug, args);
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.push(Level::Error, args);
    }
}
