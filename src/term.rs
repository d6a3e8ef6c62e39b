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

//! Terminal raw mode: capture, apply, restore.
//!
//! `RawTerminal` owns the attribute set captured on entry and writes it
//! back exactly once, either through `restore()` or on drop.

use std::io;
use std::os::fd::RawFd;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crate::error::{Error, Result};

/// Copy of the original attributes for the signal handler, which
/// cannot reach the `RawTerminal` that owns them.
static SAVED_TERMIOS: Mutex<Option<(RawFd, libc::termios)>> = Mutex::new(None);

fn saved() -> MutexGuard<'static, Option<(RawFd, libc::termios)>> {
    // A panic while holding the lock leaves the data itself intact.
    SAVED_TERMIOS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// VMIN / VTIME pair controlling when a read returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Bytes required before read() may return.
    pub min_bytes: libc::cc_t,
    /// Longest wait for input, in tenths of a second.
    pub timeout_tenths: libc::cc_t,
}

impl Timing {
    /// Return as soon as a byte arrives, or with nothing after 0.1s.
    pub const BOUNDED: Timing = Timing {
        min_bytes: 0,
        timeout_tenths: 1,
    };
}

impl Default for Timing {
    fn default() -> Self {
        Timing::BOUNDED
    }
}

const RAW_IFLAGS_OFF: libc::tcflag_t =
    libc::IXON | libc::ICRNL | libc::BRKINT | libc::INPCK | libc::ISTRIP;
const RAW_OFLAGS_OFF: libc::tcflag_t = libc::OPOST;
const RAW_LFLAGS_OFF: libc::tcflag_t = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN;

/// Read the current attributes of `fd`.
pub fn get_attributes(fd: RawFd) -> io::Result<libc::termios> {
    unsafe {
        let mut attrs: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut attrs) == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(attrs)
    }
}

/// Apply `attrs` once pending output is written; unread input is discarded.
fn set_attributes(fd: RawFd, attrs: &libc::termios) -> io::Result<()> {
    let rc = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, attrs) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Derive the raw-mode attribute set from `orig`. `orig` is left untouched.
pub fn raw_attributes(orig: &libc::termios, timing: Timing) -> libc::termios {
    let mut raw = *orig;

    // Ctrl-S/Ctrl-Q and Ctrl-M arrive as plain bytes. BRKINT, INPCK and
    // ISTRIP go along with the traditional raw mode.
    raw.c_iflag &= !RAW_IFLAGS_OFF;

    // No "\n" -> "\r\n" translation; every line must write "\r\n" itself.
    raw.c_oflag &= !RAW_OFLAGS_OFF;

    // Unechoed, byte-at-a-time, Ctrl-C/Ctrl-Z/Ctrl-V delivered literally.
    raw.c_lflag &= !RAW_LFLAGS_OFF;

    raw.c_cflag &= !libc::CSIZE;
    raw.c_cflag |= libc::CS8;

    raw.c_cc[libc::VMIN] = timing.min_bytes;
    raw.c_cc[libc::VTIME] = timing.timeout_tenths;

    raw
}

/// True when `attrs` has every raw-mode property `raw_attributes` sets.
pub fn is_raw(attrs: &libc::termios, timing: Timing) -> bool {
    attrs.c_iflag & RAW_IFLAGS_OFF == 0
        && attrs.c_oflag & RAW_OFLAGS_OFF == 0
        && attrs.c_lflag & RAW_LFLAGS_OFF == 0
        && attrs.c_cflag & libc::CSIZE == libc::CS8
        && attrs.c_cc[libc::VMIN] == timing.min_bytes
        && attrs.c_cc[libc::VTIME] == timing.timeout_tenths
}

/// A terminal held in raw mode. Dropping it puts the original settings back.
pub struct RawTerminal {
    fd: RawFd,
    original: libc::termios,
    active: bool,
}

impl RawTerminal {
    /// Capture the attributes of `fd` and switch it to raw mode.
    ///
    /// Fails without touching the device if `fd` is not a terminal.
    pub fn enter(fd: RawFd, timing: Timing) -> Result<Self> {
        let original = get_attributes(fd).map_err(Error::GetAttributes)?;
        let raw = raw_attributes(&original, timing);

        // Saved before the switch so a signal arriving right after it
        // still finds something to restore.
        *saved() = Some((fd, original));

        if let Err(e) = set_attributes(fd, &raw) {
            clear_saved();
            return Err(Error::SetAttributes(e));
        }
        // tcsetattr() succeeds if *any* of the changes took.
        match get_attributes(fd) {
            Ok(now) if !is_raw(&now, timing) => {
                log::warn!("fd {}: terminal did not accept every raw-mode setting", fd)
            }
            _ => {}
        }
        log::debug!(
            "fd {} in raw mode (VMIN={}, VTIME={})",
            fd,
            timing.min_bytes,
            timing.timeout_tenths
        );

        Ok(RawTerminal {
            fd,
            original,
            active: true,
        })
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }

    /// Write the original attributes back.
    ///
    /// Only the first call touches the device; the guard is released even
    /// if that write fails, so drop never retries it.
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let result = set_attributes(self.fd, &self.original).map_err(Error::Restore);
        clear_saved();
        result?;
        log::debug!("fd {} restored", self.fd);
        Ok(())
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("{}", e);
        }
    }
}

fn clear_saved() {
    *saved() = None;
}

/// Write the attributes of the terminal currently in raw mode back to its
/// fd, if there is one. Meant for the termination-signal handler; does
/// nothing once the owning `RawTerminal` has restored.
pub fn restore_saved() {
    // Never block: the signal may have landed while `enter` or `restore`
    // held the lock.
    let slot = match SAVED_TERMIOS.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::Poisoned(e)) => e.into_inner(),
        Err(TryLockError::WouldBlock) => return,
    };
    if let Some((fd, ref orig)) = *slot {
        unsafe {
            libc::tcsetattr(fd, libc::TCSAFLUSH, orig);
        }
    }
}
