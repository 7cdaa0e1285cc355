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
use crate::record::LogRecord;
use crate::severity::Level;

/// An appender that discards every record.
///
/// Selected as the backend strategy for test-mode facilities, so that test
/// runs neither pollute disk nor depend on filesystem state.
#[derive(Debug, Default, Clone, Copy)]
pub struct Noop;

impl Append for Noop {
    fn append(&self, _level: Level, _record: &LogRecord) -> anyhow::Result<()> {
        Ok(())
    }
}
