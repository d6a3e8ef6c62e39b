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

//! Per-byte report lines.

use std::io::Write;

use crate::error::{Error, Result};

/// OPOST is off in raw mode, so a bare "\n" would not return the cursor.
pub const CRLF: &str = "\r\n";

/// Printable ASCII, space included. Control bytes and bytes >= 0x80 are not.
pub fn is_printable(byte: u8) -> bool {
    byte.is_ascii_graphic() || byte == b' '
}

/// `104 ('h')` for printable bytes, just the code otherwise.
pub fn describe(byte: u8) -> String {
    if is_printable(byte) {
        format!("{} ('{}')", byte, byte as char)
    } else {
        byte.to_string()
    }
}

/// Write one report line and flush it straight away.
pub fn report_byte(out: &mut impl Write, byte: u8) -> Result<()> {
    write!(out, "{}{}", describe(byte), CRLF)
        .and_then(|_| out.flush())
        .map_err(Error::Write)
}
