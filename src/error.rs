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

//! Error type shared by the terminal controller and the input loop.

use std::io;

/// Every failure here is fatal to the run; `main` decides how to exit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("tcgetattr() failed: {0}")]
    GetAttributes(#[source] io::Error),

    #[error("tcsetattr() failed entering raw mode: {0}")]
    SetAttributes(#[source] io::Error),

    #[error("tcsetattr() failed restoring terminal: {0}")]
    Restore(#[source] io::Error),

    #[error("read() failed: {0}")]
    Read(#[source] io::Error),

    #[error("write() failed: {0}")]
    Write(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
