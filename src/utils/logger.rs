/*
 * Console Logging
 *
 * `log` backend for the I/O layer. Records are written to a serial
 * console as `[LEVEL] message\r\n`.
 *
 * Each record is formatted into a fixed buffer first and sent as one
 * unit, so a record is never interleaved with its own formatting work.
 * Records longer than the buffer are cut short and end in "...".
 *
 * Interrupt handlers must not log: sending spins on the transmitter.
 */

use core::fmt::Write;
use core::sync::atomic::{AtomicUsize, Ordering};

use heapless::String;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use spin::Once;

use super::writer::Writer;
use crate::drivers::serial::UsartHw;

/// Longest record sent, including the trailing CR/LF
pub const RECORD_CAPACITY: usize = 128;

const ELLIPSIS: &str = "...";
const EOL: &str = "\r\n";

/// Logger writing to a serial console
pub struct SerialLogger {
    console: Once<&'static dyn UsartHw>,
    level: AtomicUsize,
}

impl SerialLogger {
    pub const fn new() -> Self {
        Self {
            console: Once::new(),
            level: AtomicUsize::new(LevelFilter::Trace as usize),
        }
    }

    /// Bind the console; the first binding sticks
    pub fn attach(&self, console: &'static dyn UsartHw) {
        self.console.call_once(|| console);
    }

    /// Drop records less severe than `level`
    pub fn set_level(&self, level: LevelFilter) {
        self.level.store(level as usize, Ordering::Relaxed);
    }
}

impl Default for SerialLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() as usize <= self.level.load(Ordering::Relaxed)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(console) = self.console.get() else {
            return;
        };
        let line = format_record::<RECORD_CAPACITY>(record);
        _ = Writer::new(*console).write_str(&line);
    }

    fn flush(&self) {}
}

/// Format a record as `[LEVEL] message\r\n`, truncating to fit N bytes
pub fn format_record<const N: usize>(record: &Record) -> String<N> {
    let mut line = String::<N>::new();
    let body = N.saturating_sub(EOL.len());

    let mut sink = Bounded { out: &mut line, limit: body, truncated: false };
    _ = write!(sink, "[{}] {}", record.level(), record.args());
    if sink.truncated {
        let keep = body.saturating_sub(ELLIPSIS.len());
        truncate_at_char(&mut line, keep);
        _ = line.push_str(ELLIPSIS);
    }
    _ = line.push_str(EOL);
    line
}

/// Cut `s` to at most `len` bytes without splitting a character
fn truncate_at_char<const N: usize>(s: &mut String<N>, len: usize) {
    let mut cut = len.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

/// fmt sink that stops at `limit` bytes and remembers it did
struct Bounded<'s, const N: usize> {
    out: &'s mut String<N>,
    limit: usize,
    truncated: bool,
}

impl<const N: usize> Write for Bounded<'_, N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        if self.truncated {
            return Ok(());
        }
        let room = self.limit - self.out.len();
        if s.len() <= room {
            _ = self.out.push_str(s);
            return Ok(());
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        _ = self.out.push_str(&s[..cut]);
        self.truncated = true;
        Ok(())
    }
}

static LOGGER: SerialLogger = SerialLogger::new();

/// Install the console logger
///
/// Fails if another logger is already installed.
pub fn init(console: &'static dyn UsartHw, level: LevelFilter) -> Result<(), SetLoggerError> {
    LOGGER.attach(console);
    LOGGER.set_level(level);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    log::info!("xio: logger up at {}", level);
    Ok(())
}
