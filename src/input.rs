// Copyright 2026 Daniel Smith
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Single-byte reads with bounded-wait semantics.

use std::io;
use std::os::fd::RawFd;

use crate::error::{Error, Result};

/// What one read attempt produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Byte(u8),
    /// Nothing arrived within the wait.
    Timeout,
    /// The other end is gone; no byte will ever arrive.
    EndOfStream,
}

pub trait ByteSource {
    fn read_byte(&mut self) -> Result<ReadOutcome>;
}

/// Reads from a file descriptor, normally stdin in raw mode.
pub struct FdReader {
    fd: RawFd,
}

impl FdReader {
    pub fn new(fd: RawFd) -> Self {
        FdReader { fd }
    }
}

impl ByteSource for FdReader {
    fn read_byte(&mut self) -> Result<ReadOutcome> {
        loop {
            let mut buf = [0u8; 1];
            let n = unsafe { libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, 1) };
            if n == 1 {
                return Ok(ReadOutcome::Byte(buf[0]));
            }
            if n == 0 {
                // With VMIN=0 a timeout also reads zero bytes; only a
                // hangup tells the two apart.
                if hung_up(self.fd) {
                    return Ok(ReadOutcome::EndOfStream);
                }
                return Ok(ReadOutcome::Timeout);
            }

            let err = io::Error::last_os_error();
            match err.kind() {
                // Some platforms (Cygwin) report the VTIME timeout as EAGAIN.
                io::ErrorKind::WouldBlock => return Ok(ReadOutcome::Timeout),
                io::ErrorKind::Interrupted => continue,
                _ if err.raw_os_error() == Some(libc::EIO) && hung_up(self.fd) => {
                    return Ok(ReadOutcome::EndOfStream);
                }
                _ => return Err(Error::Read(err)),
            }
        }
    }
}

/// Check whether the peer of `fd` has hung up, without waiting.
fn hung_up(fd: RawFd) -> bool {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let ret = unsafe { libc::poll(&mut pfd, 1, 0) };
    ret > 0 && (pfd.revents & libc::POLLHUP) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe() -> (RawFd, RawFd) {
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        (fds[0], fds[1])
    }

    fn close(fd: RawFd) {
        unsafe {
            libc::close(fd);
        }
    }

    #[test]
    fn test_would_block_is_timeout() {
        let (r, w) = pipe();
        unsafe {
            let flags = libc::fcntl(r, libc::F_GETFL);
            libc::fcntl(r, libc::F_SETFL, flags | libc::O_NONBLOCK);
        }

        let mut reader = FdReader::new(r);
        assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Timeout);

        close(r);
        close(w);
    }

    #[test]
    fn test_closed_writer_is_end_of_stream() {
        let (r, w) = pipe();
        let n = unsafe { libc::write(w, b"x".as_ptr() as *const libc::c_void, 1) };
        assert_eq!(n, 1);
        close(w);

        let mut reader = FdReader::new(r);
        assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Byte(b'x'));
        assert_eq!(reader.read_byte().unwrap(), ReadOutcome::EndOfStream);

        close(r);
    }

    #[test]
    fn test_bad_fd_is_read_error() {
        let mut reader = FdReader::new(-1);
        match reader.read_byte() {
            Err(Error::Read(e)) => assert_eq!(e.raw_os_error(), Some(libc::EBADF)),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    mod device {
        use super::super::*;
        use crate::term::{pty, RawTerminal, Timing};
        use std::os::fd::AsRawFd;
        use std::time::{Duration, Instant};

        #[test]
        fn test_reads_bytes_then_times_out() {
            let pair = pty::open().expect("open pty");
            let _term = RawTerminal::enter(pair.slave.as_raw_fd(), Timing::BOUNDED).unwrap();
            pty::write_all(&pair.master, b"hi");

            let mut reader = FdReader::new(pair.slave.as_raw_fd());
            assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Byte(b'h'));
            assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Byte(b'i'));

            let start = Instant::now();
            assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Timeout);
            assert!(start.elapsed() < Duration::from_secs(2));
        }

        #[test]
        fn test_control_bytes_arrive_literally() {
            let pair = pty::open().expect("open pty");
            let _term = RawTerminal::enter(pair.slave.as_raw_fd(), Timing::BOUNDED).unwrap();
            // Ctrl-C, Ctrl-S, CR: no signal, no flow control, no CR->NL.
            pty::write_all(&pair.master, &[0x03, 0x13, b'\r']);

            let mut reader = FdReader::new(pair.slave.as_raw_fd());
            assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Byte(0x03));
            assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Byte(0x13));
            assert_eq!(reader.read_byte().unwrap(), ReadOutcome::Byte(b'\r'));
        }

        #[test]
        fn test_master_close_is_end_of_stream() {
            let pair = pty::open().expect("open pty");
            let slave = pair.slave;
            let _term = RawTerminal::enter(slave.as_raw_fd(), Timing::BOUNDED).unwrap();
            drop(pair.master);

            let mut reader = FdReader::new(slave.as_raw_fd());
            assert_eq!(reader.read_byte().unwrap(), ReadOutcome::EndOfStream);
        }
    }
}
