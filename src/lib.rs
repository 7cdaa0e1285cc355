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

//! Streamlog is a severity-routed, multi-stream logging facility: every
//! logging call is routed to one of four independent streams (`info`, `web`,
//! `errors`, `crashes`), each backed by daily-rotating, size-bounded files
//! under its own directory.
//!
//! # Overview
//!
//! A [`Facility`] is constructed once at process start and passed to every
//! component that logs. Each call builds one structured record — caller
//! metadata plus the `app`, `env` and `severity` enrichment fields — and
//! appends it to the stream selected by the call's severity. Error and crash
//! calls additionally unwrap the given error into a flat message and `stack`
//! field, and fold request metadata into scalar fields.
//!
//! # Examples
//!
//! ```no_run
//! use streamlog::ErrorInput;
//! use streamlog::Facility;
//!
//! let facility = Facility::builder("my-service").build()?;
//!
//! facility.info("service started", None);
//! facility.web("GET / 200", None);
//! facility.error(ErrorInput::standard("boom", None), None);
//! # Ok::<(), streamlog::SetupError>(())
//! ```
//!
//! Streams rotate by calendar day and by size; the thresholds and the base
//! directory are configured through [`FacilityBuilder`].

pub mod append;
pub mod layout;
pub mod non_blocking;

pub use append::Append;

mod error;
mod facility;
mod record;
mod severity;

pub use error::SetupError;
pub use facility::DEFAULT_MAX_FILE_SIZE;
pub use facility::ENV_VAR;
pub use facility::Facility;
pub use facility::FacilityBuilder;
pub use record::ErrorInput;
pub use record::Fields;
pub use record::LogRecord;
pub use record::RecordBuilder;
pub use severity::Level;
pub use severity::Severity;
pub use severity::Stream;
