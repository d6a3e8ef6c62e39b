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

//! The read-report loop.

use std::io::Write;

use crate::error::Result;
use crate::input::{ByteSource, ReadOutcome};
use crate::output;

/// Why the loop stopped. Both are normal exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopEnd {
    Sentinel,
    EndOfStream,
}

/// Read and report bytes until `sentinel` is seen or the input ends.
///
/// A timeout is reported as the NUL byte. The sentinel is reported before
/// the loop stops, and nothing after it is read.
pub fn run(source: &mut impl ByteSource, out: &mut impl Write, sentinel: u8) -> Result<LoopEnd> {
    loop {
        let byte = match source.read_byte()? {
            ReadOutcome::Byte(b) => b,
            ReadOutcome::Timeout => b'\0',
            ReadOutcome::EndOfStream => {
                log::debug!("input stream ended");
                return Ok(LoopEnd::EndOfStream);
            }
        };

        output::report_byte(out, byte)?;

        if byte == sentinel {
            log::trace!("sentinel {} received", byte);
            return Ok(LoopEnd::Sentinel);
        }
    }
}
