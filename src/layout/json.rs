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

use jiff::Zoned;
use serde::Serialize;

use crate::record::Fields;
use crate::record::LogRecord;
use crate::severity::Level;

/// A JSON layout for formatting log records, one object per line.
///
/// Output format:
///
/// ```json
/// {"timestamp":"2024-08-11T22:44:57.172051+08:00","level":"ERROR","message":"boom","app":"demo","env":"production","severity":"error"}
/// ```
///
/// The record's fields are flattened into the top-level object next to
/// `timestamp`, `level` and `message`.
#[derive(Default, Debug, Clone, Copy)]
pub struct JsonLayout;

#[derive(Debug, Serialize)]
struct RecordLine<'a> {
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: Zoned,
    level: &'a str,
    message: &'a str,
    #[serde(flatten)]
    fields: &'a Fields,
}

fn serialize_timestamp<S>(timestamp: &Zoned, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&format_args!("{timestamp:.6}"))
}

impl JsonLayout {
    pub(crate) fn format(&self, level: Level, record: &LogRecord) -> anyhow::Result<Vec<u8>> {
        let record_line = RecordLine {
            timestamp: Zoned::now(),
            level: level.as_str(),
            message: record.message(),
            fields: record.fields(),
        };

        Ok(serde_json::to_vec(&record_line)?)
    }
}
