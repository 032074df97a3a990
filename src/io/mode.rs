/*
 * Read/Write Mode Engine
 *
 * Turns a read()/write() request into a character-by-character transfer
 * over a device's single-byte primitives.
 *
 * request  mode
 *   0      nothing, returns 0
 *   1..N   SIZE: exactly N bytes; EFBIG if N is over the device limit
 *  -1      LINE: up to and including the first \r, \n or ; (or a NUL)
 *  -2      STR:  up to a NUL
 *  -3      PSTR: like STR, source is read-only program memory (write only)
 *
 * Line and string reads store the delimiter (or NUL) and NUL-terminate
 * the buffer. Hitting the limit first leaves the bytes read so far in the
 * buffer, terminated, and fails with EMSGSIZE. Writes never send the NUL
 * but count it in the returned length.
 */

use super::control::SizeLimit;
use super::device::Errno;

/// The ASCII NUL terminator
pub const NUL: u8 = 0;

pub const LINE_MODE: i16 = -1;
pub const STR_MODE: i16 = -2;
pub const PSTR_MODE: i16 = -3;

/// Transfer mode decoded from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Size(usize),
    Line,
    Str,
    PStr,
}

impl Mode {
    /// Decode a request; `None` for the zero-length no-op
    pub fn decode(request: i16) -> Result<Option<Mode>, Errno> {
        match request {
            0 => Ok(None),
            n if n > 0 => Ok(Some(Mode::Size(n as usize))),
            LINE_MODE => Ok(Some(Mode::Line)),
            STR_MODE => Ok(Some(Mode::Str)),
            PSTR_MODE => Ok(Some(Mode::PStr)),
            _ => Err(Errno::EINVAL),
        }
    }

    /// True if `c` ends a transfer in this mode (NUL is handled separately)
    #[inline]
    fn is_delimiter(self, c: u8) -> bool {
        matches!(self, Mode::Line) && matches!(c, b'\r' | b'\n' | b';')
    }
}

/// Single-byte primitives a device exposes to the engine
pub trait CharIo {
    /// Get one byte, applying the device's blocking and echo rules
    fn get_char(&self) -> Result<u8, Errno>;

    /// Put one byte, returning it
    fn put_char(&self, c: u8) -> Result<u8, Errno>;
}

/// Where write() fetches its source bytes from
pub trait ByteSource {
    /// Byte at `index`, or `None` past the end of the source
    fn fetch(&self, index: usize) -> Option<u8>;
}

impl ByteSource for [u8] {
    #[inline]
    fn fetch(&self, index: usize) -> Option<u8> {
        self.get(index).copied()
    }
}

/// A string in read-only program memory
///
/// Flash is mapped into the data address space on the targets this
/// builds for, so a fetch is an ordinary load from the static image.
#[derive(Debug, Clone, Copy)]
pub struct ProgMem<'a>(&'a [u8]);

impl<'a> ProgMem<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }
}

impl ByteSource for ProgMem<'_> {
    #[inline]
    fn fetch(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }
}

/// Read into `buf` according to `request`
pub fn read<D: CharIo + ?Sized>(
    dev: &D,
    buf: &mut [u8],
    request: i16,
    limit: SizeLimit,
) -> Result<usize, Errno> {
    match Mode::decode(request)? {
        None => Ok(0),
        Some(Mode::Size(size)) => read_size(dev, buf, size, limit),
        Some(mode @ (Mode::Line | Mode::Str)) => read_delimited(dev, buf, mode, limit),
        Some(Mode::PStr) => Err(Errno::EINVAL),
    }
}

/// Write from `buf` according to `request`
pub fn write<D: CharIo + ?Sized>(
    dev: &D,
    buf: &[u8],
    request: i16,
    limit: SizeLimit,
) -> Result<usize, Errno> {
    match Mode::decode(request)? {
        None => Ok(0),
        Some(Mode::Size(size)) => write_size(dev, buf, size, limit),
        Some(mode @ (Mode::Line | Mode::Str)) => write_delimited(dev, buf, mode, limit),
        Some(Mode::PStr) => write_delimited(dev, &ProgMem::new(buf), Mode::PStr, limit),
    }
}

fn read_size<D: CharIo + ?Sized>(
    dev: &D,
    buf: &mut [u8],
    size: usize,
    limit: SizeLimit,
) -> Result<usize, Errno> {
    if limit.exceeded_by(size) {
        return Err(Errno::EFBIG);
    }
    let dest = buf.get_mut(..size).ok_or(Errno::EINVAL)?;
    for slot in dest.iter_mut() {
        *slot = dev.get_char()?;
    }
    Ok(size)
}

fn read_delimited<D: CharIo + ?Sized>(
    dev: &D,
    buf: &mut [u8],
    mode: Mode,
    limit: SizeLimit,
) -> Result<usize, Errno> {
    // leave room for the terminator
    let room = buf.len().checked_sub(1).ok_or(Errno::EINVAL)?;
    let max = limit.bound(room);

    let mut i = 0;
    loop {
        if i == max {
            buf[i] = NUL;
            return Err(Errno::EMSGSIZE);
        }
        let c = dev.get_char()?;
        buf[i] = c;
        i += 1;
        if c == NUL {
            return Ok(i);
        }
        if mode.is_delimiter(c) {
            buf[i] = NUL;
            return Ok(i);
        }
    }
}

fn write_size<D: CharIo + ?Sized>(
    dev: &D,
    buf: &[u8],
    size: usize,
    limit: SizeLimit,
) -> Result<usize, Errno> {
    if limit.exceeded_by(size) {
        return Err(Errno::EFBIG);
    }
    let src = buf.get(..size).ok_or(Errno::EINVAL)?;
    for &c in src {
        dev.put_char(c)?;
    }
    Ok(size)
}

fn write_delimited<D, S>(dev: &D, src: &S, mode: Mode, limit: SizeLimit) -> Result<usize, Errno>
where
    D: CharIo + ?Sized,
    S: ByteSource + ?Sized,
{
    let max = limit.bound(usize::MAX);

    let mut i = 0;
    loop {
        let c = match src.fetch(i) {
            None => return Ok(i),
            Some(c) => c,
        };
        // the terminator counts against the limit too
        if i == max {
            return Err(Errno::EMSGSIZE);
        }
        if c == NUL {
            return Ok(i + 1);
        }
        dev.put_char(c)?;
        i += 1;
        if mode.is_delimiter(c) {
            return Ok(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Loopback device: reads come from `input`, writes land in `output`
    struct Script {
        input: RefCell<VecDeque<u8>>,
        output: RefCell<Vec<u8>>,
    }

    impl Script {
        fn new(input: &[u8]) -> Self {
            Self {
                input: RefCell::new(input.iter().copied().collect()),
                output: RefCell::new(Vec::new()),
            }
        }

        fn remaining(&self) -> usize {
            self.input.borrow().len()
        }
    }

    impl CharIo for Script {
        fn get_char(&self) -> Result<u8, Errno> {
            self.input.borrow_mut().pop_front().ok_or(Errno::EAGAIN)
        }

        fn put_char(&self, c: u8) -> Result<u8, Errno> {
            self.output.borrow_mut().push(c);
            Ok(c)
        }
    }

    #[test]
    fn decode_requests() {
        assert_eq!(Mode::decode(0), Ok(None));
        assert_eq!(Mode::decode(12), Ok(Some(Mode::Size(12))));
        assert_eq!(Mode::decode(-1), Ok(Some(Mode::Line)));
        assert_eq!(Mode::decode(-2), Ok(Some(Mode::Str)));
        assert_eq!(Mode::decode(-3), Ok(Some(Mode::PStr)));
        assert_eq!(Mode::decode(-4), Err(Errno::EINVAL));
        assert_eq!(Mode::decode(i16::MIN), Err(Errno::EINVAL));
    }

    #[test]
    fn zero_request_is_noop() {
        let dev = Script::new(b"abc");
        let mut buf = [0u8; 4];
        assert_eq!(read(&dev, &mut buf, 0, SizeLimit::NoLimit), Ok(0));
        assert_eq!(write(&dev, b"abc", 0, SizeLimit::NoLimit), Ok(0));
        assert_eq!(dev.remaining(), 3);
        assert!(dev.output.borrow().is_empty());
    }

    #[test]
    fn size_read_takes_exact_count() {
        let dev = Script::new(b"a\0b;cd");
        let mut buf = [0xAAu8; 8];
        assert_eq!(read(&dev, &mut buf, 5, SizeLimit::Max(31)), Ok(5));
        assert_eq!(&buf[..5], b"a\0b;c");
        assert_eq!(buf[5], 0xAA);
        assert_eq!(dev.remaining(), 1);
    }

    #[test]
    fn size_read_over_limit_moves_nothing() {
        let dev = Script::new(b"0123456789");
        let mut buf = [0u8; 128];
        assert_eq!(read(&dev, &mut buf, 100, SizeLimit::Max(32)), Err(Errno::EFBIG));
        assert_eq!(dev.remaining(), 10);
    }

    #[test]
    fn size_read_larger_than_buffer() {
        let dev = Script::new(b"0123456789");
        let mut buf = [0u8; 4];
        assert_eq!(read(&dev, &mut buf, 8, SizeLimit::NoLimit), Err(Errno::EINVAL));
        assert_eq!(dev.remaining(), 10);
    }

    #[test]
    fn line_read_stores_delimiter_and_terminates() {
        let dev = Script::new(b"G1 X10\rG0");
        let mut buf = [0xAAu8; 16];
        assert_eq!(read(&dev, &mut buf, LINE_MODE, SizeLimit::Max(63)), Ok(7));
        assert_eq!(&buf[..8], b"G1 X10\r\0");
        assert_eq!(dev.remaining(), 2);
    }

    #[test]
    fn line_read_each_delimiter() {
        for delim in [b'\r', b'\n', b';'] {
            let dev = Script::new(&[b'M', b'2', delim, b'X']);
            let mut buf = [0u8; 8];
            assert_eq!(read(&dev, &mut buf, LINE_MODE, SizeLimit::NoLimit), Ok(3));
            assert_eq!(buf[2], delim);
            assert_eq!(buf[3], NUL);
        }
    }

    #[test]
    fn line_read_stops_on_nul() {
        let dev = Script::new(b"ab\0cd\r");
        let mut buf = [0xAAu8; 8];
        assert_eq!(read(&dev, &mut buf, LINE_MODE, SizeLimit::NoLimit), Ok(3));
        assert_eq!(&buf[..3], b"ab\0");
    }

    #[test]
    fn line_read_over_limit() {
        let dev = Script::new(b"TOOLONGLINE\r");
        let mut buf = [0xAAu8; 16];
        assert_eq!(read(&dev, &mut buf, LINE_MODE, SizeLimit::Max(5)), Err(Errno::EMSGSIZE));
        assert_eq!(&buf[..6], b"TOOLO\0");
        assert_eq!(dev.remaining(), 7);
    }

    #[test]
    fn line_read_delimiter_at_limit_completes() {
        let dev = Script::new(b"ABCD\r");
        let mut buf = [0u8; 16];
        assert_eq!(read(&dev, &mut buf, LINE_MODE, SizeLimit::Max(5)), Ok(5));
        assert_eq!(&buf[..6], b"ABCD\r\0");
    }

    #[test]
    fn line_read_bounded_by_buffer() {
        let dev = Script::new(b"abcdefgh\n");
        let mut buf = [0u8; 4];
        assert_eq!(read(&dev, &mut buf, LINE_MODE, SizeLimit::NoLimit), Err(Errno::EMSGSIZE));
        assert_eq!(&buf, b"abc\0");
    }

    #[test]
    fn line_read_into_empty_buffer() {
        let dev = Script::new(b"x\n");
        assert_eq!(read(&dev, &mut [], LINE_MODE, SizeLimit::NoLimit), Err(Errno::EINVAL));
        assert_eq!(dev.remaining(), 2);
    }

    #[test]
    fn str_read_ignores_line_delimiters() {
        let dev = Script::new(b"a;b\rc\0d");
        let mut buf = [0u8; 16];
        assert_eq!(read(&dev, &mut buf, STR_MODE, SizeLimit::NoLimit), Ok(6));
        assert_eq!(&buf[..6], b"a;b\rc\0");
    }

    #[test]
    fn str_read_over_limit_is_msgsize() {
        let dev = Script::new(b"abcdef\0");
        let mut buf = [0u8; 16];
        assert_eq!(read(&dev, &mut buf, STR_MODE, SizeLimit::Max(3)), Err(Errno::EMSGSIZE));
        assert_eq!(&buf[..4], b"abc\0");
    }

    #[test]
    fn pstr_read_is_invalid() {
        let dev = Script::new(b"abc\0");
        let mut buf = [0u8; 8];
        assert_eq!(read(&dev, &mut buf, PSTR_MODE, SizeLimit::NoLimit), Err(Errno::EINVAL));
        assert_eq!(dev.remaining(), 4);
    }

    #[test]
    fn read_error_aborts_transfer() {
        let dev = Script::new(b"ab");
        let mut buf = [0u8; 8];
        assert_eq!(read(&dev, &mut buf, LINE_MODE, SizeLimit::NoLimit), Err(Errno::EAGAIN));
        assert_eq!(&buf[..2], b"ab");
    }

    #[test]
    fn size_write_sends_exact_count() {
        let dev = Script::new(b"");
        assert_eq!(write(&dev, b"ab\0cd", 5, SizeLimit::NoLimit), Ok(5));
        assert_eq!(dev.output.borrow().as_slice(), b"ab\0cd");
    }

    #[test]
    fn size_write_over_limit_sends_nothing() {
        let dev = Script::new(b"");
        assert_eq!(write(&dev, &[b'x'; 100], 100, SizeLimit::Max(32)), Err(Errno::EFBIG));
        assert!(dev.output.borrow().is_empty());
    }

    #[test]
    fn line_write_stops_after_delimiter() {
        let dev = Script::new(b"");
        assert_eq!(write(&dev, b"G1 X10\rG0 Y5\r", LINE_MODE, SizeLimit::NoLimit), Ok(7));
        assert_eq!(dev.output.borrow().as_slice(), b"G1 X10\r");
    }

    #[test]
    fn str_write_stops_at_nul() {
        let dev = Script::new(b"");
        let src = b"AB\0CD";
        assert_eq!(write(&dev, src, STR_MODE, SizeLimit::NoLimit), Ok(3));
        assert_eq!(dev.output.borrow().as_slice(), b"AB");

        assert_eq!(write(&dev, &src[3..], STR_MODE, SizeLimit::NoLimit), Ok(2));
        assert_eq!(dev.output.borrow().as_slice(), b"ABCD");
    }

    #[test]
    fn str_write_passes_line_delimiters() {
        let dev = Script::new(b"");
        assert_eq!(write(&dev, b"a;b\r\n\0", STR_MODE, SizeLimit::NoLimit), Ok(6));
        assert_eq!(dev.output.borrow().as_slice(), b"a;b\r\n");
    }

    #[test]
    fn line_write_over_limit_sends_prefix() {
        let dev = Script::new(b"");
        assert_eq!(write(&dev, b"ABCDEFG\r", LINE_MODE, SizeLimit::Max(4)), Err(Errno::EMSGSIZE));
        assert_eq!(dev.output.borrow().as_slice(), b"ABCD");
    }

    #[test]
    fn line_write_nul_at_limit_completes() {
        let dev = Script::new(b"");
        assert_eq!(write(&dev, b"ABC\0", LINE_MODE, SizeLimit::Max(4)), Ok(4));
        assert_eq!(dev.output.borrow().as_slice(), b"ABC");
    }

    #[test]
    fn write_nul_past_limit_is_msgsize() {
        let dev = Script::new(b"");
        assert_eq!(write(&dev, b"ABCD\0", STR_MODE, SizeLimit::Max(4)), Err(Errno::EMSGSIZE));
        assert_eq!(dev.output.borrow().as_slice(), b"ABCD");

        // the same bytes fail the same way on read
        let echo = Script::new(b"ABCD\0");
        let mut buf = [0xFF; 16];
        assert_eq!(read(&echo, &mut buf, STR_MODE, SizeLimit::Max(4)), Err(Errno::EMSGSIZE));

        assert_eq!(write(&dev, b"ABCD\0", STR_MODE, SizeLimit::Max(5)), Ok(5));
    }

    #[test]
    fn pstr_write_reads_program_memory() {
        static BANNER: &[u8] = b"xio ready\0ignored";
        let dev = Script::new(b"");
        assert_eq!(write(&dev, BANNER, PSTR_MODE, SizeLimit::NoLimit), Ok(10));
        assert_eq!(dev.output.borrow().as_slice(), b"xio ready");
    }

    #[test]
    fn write_without_terminator_ends_at_slice() {
        let dev = Script::new(b"");
        assert_eq!(write(&dev, b"abc", STR_MODE, SizeLimit::NoLimit), Ok(3));
        assert_eq!(dev.output.borrow().as_slice(), b"abc");
    }
}
