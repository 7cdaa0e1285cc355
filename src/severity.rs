// Copyright 2024 FastLabs Developers
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

//! Severity classification and the fixed severity-to-stream routing map.

use std::fmt;

/// Classification of a logging call.
///
/// The severity determines both the `severity` enrichment field written into
/// every record and the [`Stream`] the record is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// General informational events.
    Info,
    /// Web access events.
    Web,
    /// Recoverable errors.
    Error,
    /// Fatal or crash-level errors.
    Critical,
}

impl Severity {
    /// The value written into the `severity` enrichment field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Web => "web",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// The stream records of this severity are routed to.
    ///
    /// The mapping is total and fixed: every severity lands in exactly one
    /// stream, and every stream is the target of some severity.
    pub fn stream(&self) -> Stream {
        match self {
            Severity::Info => Stream::Info,
            Severity::Web => Stream::Web,
            Severity::Error => Stream::Errors,
            Severity::Critical => Stream::Crashes,
        }
    }

    /// The backend write level for this severity.
    ///
    /// Crash records share the error level; they are distinguished by their
    /// dedicated stream, not by a separate level.
    pub fn level(&self) -> Level {
        match self {
            Severity::Info | Severity::Web => Level::Info,
            Severity::Error | Severity::Critical => Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four independent log destinations.
///
/// Each stream owns a subdirectory under the facility's base directory and a
/// set of rotating log files named after the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Informational events (`info/info.log`).
    Info,
    /// Web access events (`web/web.log`).
    Web,
    /// Recoverable errors (`errors/errors.log`).
    Errors,
    /// Crash-level errors (`crashes/crashes.log`).
    Crashes,
}

impl Stream {
    /// All streams, in a stable order usable for indexing.
    pub const ALL: [Stream; 4] = [Stream::Info, Stream::Web, Stream::Errors, Stream::Crashes];

    /// The stream's directory name and filename base.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Info => "info",
            Stream::Web => "web",
            Stream::Errors => "errors",
            Stream::Crashes => "crashes",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Stream::Info => 0,
            Stream::Web => 1,
            Stream::Errors => 2,
            Stream::Crashes => 3,
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The level a record is written at on the backend seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Informational write.
    Info,
    /// Error write.
    Error,
}

impl Level {
    /// The value written into the `level` slot of a formatted line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
