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
use std::path::Path;
use std::path::PathBuf;

use crate::append::Append;
use crate::append::Noop;
use crate::append::RollingFile;
use crate::append::Stdout;
use crate::append::rolling_file::RollingFileWriter;
use crate::append::rolling_file::Rotation;
use crate::error::SetupError;
use crate::non_blocking::NonBlocking;
use crate::non_blocking::WorkerGuard;
use crate::record::ErrorInput;
use crate::record::Fields;
use crate::record::LogRecord;
use crate::record::RecordBuilder;
use crate::severity::Severity;
use crate::severity::Stream;

/// Default maximum size of a stream's active log file, in bytes (~5 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 5_253_125;

/// The process environment variable holding the deployment environment
/// identifier, read once at construction.
pub const ENV_VAR: &str = "APP_ENV";

/// The long-lived logging facility.
///
/// A facility owns one rotating file backend per stream and exposes the
/// logging verbs. It is constructed once at process start and passed to every
/// component that logs; there is no global binding.
///
/// Once construction succeeds the facility is ready and its verbs never fail.
/// Dropping the facility flushes each stream's buffered records.
///
/// # Examples
///
/// ```no_run
/// use streamlog::Facility;
///
/// let facility = Facility::builder("my-service").build()?;
/// facility.info("service started", None);
/// # Ok::<(), streamlog::SetupError>(())
/// ```
#[derive(Debug)]
pub struct Facility {
    builder: RecordBuilder,
    no_op: bool,
    sinks: [Vec<Box<dyn Append>>; 4],
    // Held so the writer threads are flushed when the facility drops.
    _guards: Vec<WorkerGuard>,
}

impl Facility {
    /// Creates a [`FacilityBuilder`] for the given application name.
    pub fn builder(app_name: impl Into<String>) -> FacilityBuilder {
        FacilityBuilder::new(app_name)
    }

    /// The application name stored at construction.
    pub fn app_name(&self) -> &str {
        self.builder.app()
    }

    /// The deployment environment identifier written into every record.
    pub fn env(&self) -> &str {
        self.builder.env()
    }

    /// Whether this facility is the no-op variant that performs no I/O.
    pub fn is_no_op(&self) -> bool {
        self.no_op
    }

    /// Logs an informational event to the `info` stream.
    pub fn info(&self, text: &str, metadata: Option<&Fields>) {
        let record = self.builder.event(Severity::Info, text, metadata);
        self.route(Severity::Info, record);
    }

    /// Logs a web access event to the `web` stream.
    pub fn web(&self, text: &str, metadata: Option<&Fields>) {
        let record = self.builder.event(Severity::Web, text, metadata);
        self.route(Severity::Web, record);
    }

    /// Logs an error to the `errors` stream.
    ///
    /// The error is unwrapped into a flat message plus optional `stack`
    /// field. When the metadata carries a `req` object, its `url`, `body`
    /// and `params` are promoted to top-level fields and the `url` is
    /// appended to the message; the `req` and `res` objects themselves are
    /// dropped from the record.
    pub fn error_request(&self, err: impl Into<ErrorInput>, metadata: Option<&Fields>) {
        let record = self.builder.error(Severity::Error, err.into(), metadata);
        self.route(Severity::Error, record);
    }

    /// Logs an error to the `errors` stream.
    ///
    /// A pure alias of [`Facility::error_request`].
    pub fn error(&self, err: impl Into<ErrorInput>, metadata: Option<&Fields>) {
        self.error_request(err, metadata);
    }

    /// Logs a crash-level error to the `crashes` stream.
    ///
    /// Unwraps errors like [`Facility::error_request`], but on `req`
    /// presence only the `url` field and the message suffix are produced;
    /// `body`/`params` promotion and `res` removal do not happen here. This
    /// asymmetry is observable behavior and deliberately kept.
    pub fn crash(&self, err: impl Into<ErrorInput>, metadata: Option<&Fields>) {
        let record = self.builder.error(Severity::Critical, err.into(), metadata);
        self.route(Severity::Critical, record);
    }

    /// Flushes every stream's sinks.
    pub fn flush(&self) {
        for stream_sinks in &self.sinks {
            for sink in stream_sinks {
                sink.flush();
            }
        }
    }

    // Routes a finalized record to every sink of the severity's stream.
    // Append failures are reported to stderr and never reach the caller.
    fn route(&self, severity: Severity, record: LogRecord) {
        let level = severity.level();
        for sink in &self.sinks[severity.stream().index()] {
            if let Err(err) = sink.append(level, &record) {
                handle_append_error(&record, err);
            }
        }
    }
}

fn handle_append_error(record: &LogRecord, error: anyhow::Error) {
    let _ = write!(
        std::io::stderr(),
        "error performing logging.\n    attempted to log: {message}\n    error: {error}\n",
        message = record.message(),
    );
}

/// A builder for configuring and bootstrapping a [`Facility`].
///
/// # Examples
///
/// ```no_run
/// use streamlog::Facility;
/// use streamlog::Stream;
///
/// let facility = Facility::builder("my-service")
///     .directory("/var/log/my-service")
///     .console(true)
///     .max_size(Stream::Web, 20 * 1024 * 1024)
///     .build()?;
/// # Ok::<(), streamlog::SetupError>(())
/// ```
#[derive(Debug)]
pub struct FacilityBuilder {
    app_name: String,
    directory: PathBuf,
    console: bool,
    env: Option<String>,
    no_op: Option<bool>,
    max_sizes: [Option<usize>; 4],
}

impl FacilityBuilder {
    /// Creates a new builder for the given application name.
    pub fn new(app_name: impl Into<String>) -> FacilityBuilder {
        FacilityBuilder {
            app_name: app_name.into(),
            directory: PathBuf::from("logs"),
            console: false,
            env: None,
            no_op: None,
            max_sizes: [None; 4],
        }
    }

    /// Sets the base directory holding the per-stream subdirectories.
    ///
    /// Defaults to `./logs`.
    #[must_use]
    pub fn directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.directory = directory.as_ref().to_path_buf();
        self
    }

    /// Attaches a console mirror sink to every stream.
    #[must_use]
    pub fn console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Overrides the deployment environment identifier.
    ///
    /// Defaults to the `APP_ENV` process environment variable, or the empty
    /// string when unset.
    #[must_use]
    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Forces or disables the no-op variant.
    ///
    /// By default the no-op variant is selected when the resolved
    /// environment identifier equals `test`, so test runs do not touch the
    /// filesystem.
    #[must_use]
    pub fn no_op(mut self, no_op: bool) -> Self {
        self.no_op = Some(no_op);
        self
    }

    /// Overrides the maximum active file size for one stream.
    ///
    /// Defaults to [`DEFAULT_MAX_FILE_SIZE`].
    #[must_use]
    pub fn max_size(mut self, stream: Stream, bytes: usize) -> Self {
        self.max_sizes[stream.index()] = Some(bytes);
        self
    }

    /// Bootstraps the facility.
    ///
    /// Ensures the base directory and the four stream subdirectories exist
    /// (idempotently), then opens a daily-rotating, size-bounded backend per
    /// stream and spawns its writer thread. Any directory or file creation
    /// failure propagates out of this call; a facility whose construction
    /// failed must not be used.
    pub fn build(self) -> Result<Facility, SetupError> {
        let env = self
            .env
            .unwrap_or_else(|| std::env::var(ENV_VAR).unwrap_or_default());
        let no_op = self.no_op.unwrap_or(env == "test");
        let builder = RecordBuilder::new(self.app_name, env);

        if no_op {
            let sinks: [Vec<Box<dyn Append>>; 4] =
                std::array::from_fn(|_| vec![Box::new(Noop) as Box<dyn Append>]);
            return Ok(Facility {
                builder,
                no_op,
                sinks,
                _guards: vec![],
            });
        }

        std::fs::create_dir_all(&self.directory)?;

        let mut sinks: [Vec<Box<dyn Append>>; 4] = std::array::from_fn(|_| Vec::new());
        let mut guards = Vec::with_capacity(Stream::ALL.len());
        for stream in Stream::ALL {
            let dir = self.directory.join(stream.as_str());
            std::fs::create_dir_all(&dir)?;

            let max_size = self.max_sizes[stream.index()].unwrap_or(DEFAULT_MAX_FILE_SIZE);
            let writer = RollingFileWriter::builder()
                .rotation(Rotation::Daily)
                .filename_base(stream.as_str())
                .max_file_size(max_size)
                .build(&dir)?;
            let (non_blocking, guard) =
                NonBlocking::spawn(format!("streamlog-{stream}"), writer);
            guards.push(guard);

            let stream_sinks = &mut sinks[stream.index()];
            stream_sinks.push(Box::new(RollingFile::new(non_blocking)) as Box<dyn Append>);
            if self.console {
                stream_sinks.push(Box::new(Stdout::default()) as Box<dyn Append>);
            }
        }

        Ok(Facility {
            builder,
            no_op,
            sinks,
            _guards: guards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_op_selected_for_test_env() {
        let facility = Facility::builder("demo")
            .env("test")
            .build()
            .expect("no-op construction cannot fail");
        assert!(facility.is_no_op());
        // Verbs are callable and do nothing.
        facility.info("hello", None);
        facility.web("hello", None);
        facility.error("boom", None);
        facility.crash("down", None);
    }

    #[test]
    fn test_no_op_override_wins_over_env() {
        let facility = Facility::builder("demo")
            .env("production")
            .no_op(true)
            .build()
            .expect("no-op construction cannot fail");
        assert!(facility.is_no_op());
    }

    #[test]
    fn test_no_op_creates_no_directories() {
        let facility = Facility::builder("demo")
            .directory("definitely-not-created")
            .env("test")
            .build()
            .expect("no-op construction cannot fail");
        facility.info("hello", None);
        assert!(!std::path::Path::new("definitely-not-created").exists());
    }

    #[test]
    fn test_env_defaults_from_process_environment() {
        // The only test that touches APP_ENV; every other construction in
        // this crate passes .env() explicitly, so there is no race to
        // serialize against.
        unsafe { std::env::remove_var(ENV_VAR) };
        let facility = Facility::builder("demo").no_op(true).build().unwrap();
        assert_eq!(facility.env(), "");

        unsafe { std::env::set_var(ENV_VAR, "qa") };
        let facility = Facility::builder("demo").no_op(true).build().unwrap();
        assert_eq!(facility.env(), "qa");

        unsafe { std::env::remove_var(ENV_VAR) };
    }

    #[test]
    fn test_builder_stores_identity() {
        let facility = Facility::builder("demo").env("staging").no_op(true).build().unwrap();
        assert_eq!(facility.app_name(), "demo");
        assert_eq!(facility.env(), "staging");
    }
}
