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

use crate::append::Append;
use crate::layout::JsonLayout;
use crate::non_blocking::NonBlocking;
use crate::record::LogRecord;
use crate::severity::Level;

/// An appender that writes log records to rolling files.
///
/// Records are formatted as JSON lines and handed to the writer thread as
/// whole lines, so concurrent appends never interleave partial records.
#[derive(Debug)]
pub struct RollingFile {
    layout: JsonLayout,
    writer: NonBlocking,
}

impl RollingFile {
    /// Creates a new [`RollingFile`] appender.
    pub fn new(writer: NonBlocking) -> Self {
        Self {
            layout: JsonLayout,
            writer,
        }
    }
}

impl Append for RollingFile {
    fn append(&self, level: Level, record: &LogRecord) -> anyhow::Result<()> {
        let mut bytes = self.layout.format(level, record)?;
        bytes.push(b'\n');
        self.writer.send(bytes)?;
        Ok(())
    }
}
