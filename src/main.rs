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

//! rawkeys - show every byte a keypress sends
//!
//! Puts the terminal on stdin into raw mode, prints one line per byte
//! read, and puts the terminal back when `q` is pressed or input ends.

use std::io;
use std::os::fd::AsRawFd;
use std::process::ExitCode;

mod error;
mod input;
mod keyloop;
mod output;
mod term;

use keyloop::LoopEnd;
use term::{RawTerminal, Timing};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub struct Settings {
    /// Byte that ends the loop.
    pub sentinel: u8,
    pub timing: Timing,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sentinel: b'q',
            timing: Timing::BOUNDED,
        }
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

// ISIG is off, so these only come from other processes. They skip Drop,
// so the handler restores from the saved copy itself.
fn setup_signals() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = signal_handler as *const () as libc::sighandler_t;
        sa.sa_flags = 0;
        libc::sigemptyset(&mut sa.sa_mask);
        for sig in [libc::SIGTERM, libc::SIGHUP, libc::SIGQUIT] {
            libc::sigaction(sig, &sa, std::ptr::null_mut());
        }
    }
}

extern "C" fn signal_handler(sig: libc::c_int) {
    term::restore_saved();
    unsafe {
        libc::_exit(128 + sig);
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

/// The terminal guard lives only inside this function, so it has been
/// released by the time `main` prints anything to stderr.
fn run(settings: &Settings) -> error::Result<LoopEnd> {
    let stdin_fd = io::stdin().as_raw_fd();
    let mut terminal = RawTerminal::enter(stdin_fd, settings.timing)?;

    let mut reader = input::FdReader::new(terminal.fd());
    let mut out = io::stdout().lock();
    let end = keyloop::run(&mut reader, &mut out, settings.sentinel)?;

    terminal.restore()?;
    Ok(end)
}

fn main() -> ExitCode {
    setup_signals();

    match run(&Settings::default()) {
        Ok(end) => {
            log::debug!("done: {:?}", end);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("rawkeys: {}", e);
            ExitCode::from(1)
        }
    }
}
