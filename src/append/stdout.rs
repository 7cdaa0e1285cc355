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

use std::io::Write;

use crate::append::Append;
use crate::layout::JsonLayout;
use crate::record::LogRecord;
use crate::severity::Level;

/// An appender that mirrors log records to stdout as timestamped JSON lines.
///
/// Attached to every stream when the facility is built with the console
/// option. Unlike the rolling file appender it writes immediately and never
/// rotates.
#[derive(Debug, Default)]
pub struct Stdout {
    layout: JsonLayout,
}

impl Append for Stdout {
    fn append(&self, level: Level, record: &LogRecord) -> anyhow::Result<()> {
        let mut bytes = self.layout.format(level, record)?;
        bytes.push(b'\n');
        std::io::stdout().write_all(&bytes)?;
        Ok(())
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}
