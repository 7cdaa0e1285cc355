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

use jiff::Span;
use jiff::Timestamp;
use jiff::Zoned;

/// Defines the time-based rolling cadence of a log file.
///
/// Size-based rolling applies regardless of the variant chosen here.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Rotation {
    /// Roll over at every calendar day boundary.
    Daily,
    /// Never roll over by time.
    Never,
}

impl Rotation {
    /// The instant of the next time-based rollover after `now`, or `None`
    /// if time never triggers one.
    pub(crate) fn next_boundary(&self, now: &Zoned) -> Option<Timestamp> {
        match self {
            Rotation::Daily => {
                let tomorrow = now
                    .checked_add(Span::new().days(1))
                    .expect("invalid date arithmetic; this is a bug in the rolling file appender");
                let midnight = tomorrow
                    .start_of_day()
                    .expect("invalid time; this is a bug in the rolling file appender");
                Some(midnight.timestamp())
            }
            Rotation::Never => None,
        }
    }

    /// The date segment stamped into filenames, or `None` when filenames
    /// carry no date.
    pub(crate) fn date_stamp(&self, now: &Zoned) -> Option<String> {
        match self {
            Rotation::Daily => Some(now.strftime("%Y-%m-%d").to_string()),
            Rotation::Never => None,
        }
    }
}
