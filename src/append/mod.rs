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

//! Various appenders for log records.

use std::fmt;

pub mod rolling_file;

mod noop;
mod stdout;

pub use self::noop::Noop;
pub use self::rolling_file::RollingFile;
pub use self::stdout::Stdout;

use crate::record::LogRecord;
use crate::severity::Level;

/// A trait representing a sink that can process finalized log records.
///
/// Every stream owns at least one appender; the router hands each record to
/// all appenders of the selected stream.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Processes a log record at the given level.
    fn append(&self, level: Level, record: &LogRecord) -> anyhow::Result<()>;

    /// Flushes any buffered records.
    fn flush(&self) {}
}
