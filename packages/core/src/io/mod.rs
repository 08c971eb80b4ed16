//! Stream traits
//!
//! [`Reader`], [`Writer`] and [`Closer`] are implemented by plain and secure
//! connections and by datagram sockets. The provided methods build the
//! looping helpers on top of a single `read`/`write`, so they inherit each
//! implementor's deadline and error contract.

use crate::error::{self, Result};

/// A source of bytes.
pub trait Reader {
    /// Reads at most `buf.len()` bytes.
    ///
    /// A stream that has ended reports `eof` rather than returning zero.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Reads exactly `buf.len()` bytes.
    ///
    /// # Errors
    ///
    /// Any error from `read`, including `eof` when the stream ends first.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(error::eof());
            }
            filled += n;
        }
        Ok(())
    }

    /// Reads one line into `buf` and NUL-terminates it.
    ///
    /// Reading stops after a `\n` (which is kept) or when only the byte for
    /// the terminator is left. Returns the number of bytes before the NUL.
    ///
    /// # Errors
    ///
    /// `illegal_argument` for an empty buffer, otherwise any error from
    /// `read`, including `eof`.
    fn read_line(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Err(error::illegal_argument());
        }

        let mut len = 0;
        while len + 1 < buf.len() {
            let mut byte = [0u8; 1];
            if self.read(&mut byte)? == 0 {
                return Err(error::eof());
            }
            buf[len] = byte[0];
            len += 1;
            if byte[0] == b'\n' {
                break;
            }
        }

        buf[len] = 0;
        Ok(len)
    }
}

/// A sink for bytes.
pub trait Writer {
    /// Writes at most `buf.len()` bytes.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Writes all of `buf`.
    ///
    /// # Errors
    ///
    /// Any error from `write`; a write that accepts zero bytes is reported as
    /// `illegal_state`.
    fn write_full(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            let n = self.write(&buf[written..])?;
            if n == 0 {
                return Err(error::illegal_state());
            }
            written += n;
        }
        Ok(())
    }
}

/// Something that holds an OS resource until closed.
pub trait Closer {
    /// Releases the resource. Closing twice is not an error.
    fn close(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BaseCode, Error};

    /// Hands out a fixed script of chunks, then `eof`.
    struct Script {
        chunks: Vec<Vec<u8>>,
    }

    impl Script {
        fn new(chunks: &[&[u8]]) -> Self {
            let mut chunks: Vec<Vec<u8>> = chunks.iter().map(|c| c.to_vec()).collect();
            chunks.reverse();
            Script { chunks }
        }
    }

    impl Reader for Script {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let Some(mut chunk) = self.chunks.pop() else {
                return Err(error::eof());
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push(chunk.split_off(n));
            }
            Ok(n)
        }
    }

    struct Sink {
        accepted: Vec<u8>,
        per_call: usize,
    }

    impl Writer for Sink {
        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            let n = buf.len().min(self.per_call);
            self.accepted.extend_from_slice(&buf[..n]);
            Ok(n)
        }
    }

    #[test]
    fn read_full_gathers_short_reads() {
        let mut reader = Script::new(&[b"mes", b"sa", b"ge\0"]);
        let mut buf = [0u8; 8];
        reader.read_full(&mut buf).unwrap();
        assert_eq!(&buf, b"message\0");
    }

    #[test]
    fn read_full_reports_early_eof() {
        let mut reader = Script::new(&[b"abc"]);
        let mut buf = [0u8; 8];
        let err = reader.read_full(&mut buf).unwrap_err();
        assert_eq!(err, BaseCode::Eof);
    }

    #[test]
    fn read_line_stops_after_newline() {
        let mut reader = Script::new(&[b"hello\nworld\n"]);
        let mut buf = [0xffu8; 16];
        assert_eq!(reader.read_line(&mut buf).unwrap(), 6);
        assert_eq!(&buf[..7], b"hello\n\0");
        assert_eq!(reader.read_line(&mut buf).unwrap(), 6);
        assert_eq!(&buf[..7], b"world\n\0");
    }

    #[test]
    fn read_line_truncates_to_buffer() {
        let mut reader = Script::new(&[b"abcdefgh\n"]);
        let mut buf = [0xffu8; 4];
        assert_eq!(reader.read_line(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc\0");
        // the rest of the line is still in the stream
        assert_eq!(reader.read_line(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"def\0");
    }

    #[test]
    fn read_line_rejects_empty_buffer() {
        let mut reader = Script::new(&[b"x\n"]);
        let err: Error = reader.read_line(&mut []).unwrap_err();
        assert_eq!(err, BaseCode::IllegalArgument);
    }

    #[test]
    fn read_line_propagates_eof() {
        let mut reader = Script::new(&[b"no newline"]);
        let mut buf = [0u8; 64];
        assert!(reader.read_line(&mut buf).unwrap_err().is_eof());
    }

    #[test]
    fn write_full_loops_over_partial_writes() {
        let mut sink = Sink { accepted: Vec::new(), per_call: 3 };
        sink.write_full(b"message\0").unwrap();
        assert_eq!(sink.accepted, b"message\0");
    }

    #[test]
    fn write_full_rejects_stalled_writer() {
        let mut sink = Sink { accepted: Vec::new(), per_call: 0 };
        assert_eq!(sink.write_full(b"x").unwrap_err(), BaseCode::IllegalState);
    }
}
