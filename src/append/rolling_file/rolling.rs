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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use jiff::Timestamp;
use jiff::Zoned;

use crate::append::rolling_file::Rotation;

/// A writer for one stream's rolling log files.
///
/// Files are named `<base>.<date>.<index>.log` (`<base>.<index>.log` when no
/// date rotation is configured). The writer rolls to index 0 of a new date
/// when the calendar day boundary passes, and to the next index of the same
/// date when the active file reaches the size threshold.
#[derive(Debug)]
pub struct RollingFileWriter {
    dir: PathBuf,
    base: String,
    rotation: Rotation,
    max_size: usize,
    max_files: Option<usize>,
    next_rollover: Option<Timestamp>,
    file_index: usize,
    file_size: usize,
    file: File,
    #[cfg(test)]
    manual_now: Option<Zoned>,
}

impl RollingFileWriter {
    /// Creates a new [`RollingFileWriterBuilder`].
    #[must_use]
    pub fn builder() -> RollingFileWriterBuilder {
        RollingFileWriterBuilder::new()
    }

    fn now(&self) -> Zoned {
        #[cfg(test)]
        if let Some(now) = &self.manual_now {
            return now.clone();
        }
        Zoned::now()
    }

    #[cfg(test)]
    fn set_now(&mut self, now: Zoned) {
        self.manual_now = Some(now);
    }

    // Swaps in the file for (now, index); on failure the current file stays
    // active so records keep landing somewhere.
    fn roll(&mut self, now: &Zoned, index: usize) {
        match next_log_file(
            &self.dir,
            &self.base,
            &self.rotation,
            self.max_files,
            now,
            index,
        ) {
            Ok(file) => {
                if let Err(err) = self.file.flush() {
                    eprintln!("failed to flush previous log file: {err}");
                }
                self.file = file;
                self.file_index = index;
                self.file_size = 0;
            }
            Err(err) => eprintln!("failed to open next log file: {err}"),
        }
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let now = self.now();
        if self.next_rollover.is_some_and(|boundary| now.timestamp() >= boundary) {
            self.next_rollover = self.rotation.next_boundary(&now);
            self.roll(&now, 0);
        } else if self.file_size >= self.max_size {
            self.roll(&now, self.file_index + 1);
        }

        let written = self.file.write(buf)?;
        self.file_size += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// A builder for configuring [`RollingFileWriter`].
#[derive(Debug)]
pub struct RollingFileWriterBuilder {
    rotation: Rotation,
    base: Option<String>,
    max_size: usize,
    max_files: Option<usize>,
    #[cfg(test)]
    manual_now: Option<Zoned>,
}

impl Default for RollingFileWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingFileWriterBuilder {
    /// Creates a new [`RollingFileWriterBuilder`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            rotation: Rotation::Never,
            base: None,
            max_size: usize::MAX,
            max_files: None,
            #[cfg(test)]
            manual_now: None,
        }
    }

    /// Sets the time-based rolling cadence.
    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the filename base; files are named `<base>.<date>.<index>.log`.
    ///
    /// Defaults to `log`.
    #[must_use]
    pub fn filename_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Sets the maximum number of log files to keep.
    #[must_use]
    pub fn max_log_files(mut self, n: usize) -> Self {
        self.max_files = Some(n);
        self
    }

    /// Sets the maximum size of a log file in bytes.
    #[must_use]
    pub fn max_file_size(mut self, n: usize) -> Self {
        self.max_size = n;
        self
    }

    #[cfg(test)]
    fn starting_now(mut self, now: Zoned) -> Self {
        self.manual_now = Some(now);
        self
    }

    /// Builds the [`RollingFileWriter`].
    ///
    /// Creates the log directory and opens the initial file; failures here
    /// are fatal and propagate to the caller.
    pub fn build(self, dir: impl AsRef<Path>) -> anyhow::Result<RollingFileWriter> {
        let dir = dir.as_ref().to_path_buf();
        let base = self.base.unwrap_or_else(|| "log".to_string());

        #[cfg(test)]
        let now = self.manual_now.clone().unwrap_or_else(Zoned::now);
        #[cfg(not(test))]
        let now = Zoned::now();

        let next_rollover = self.rotation.next_boundary(&now);
        let file = next_log_file(&dir, &base, &self.rotation, self.max_files, &now, 0)?;

        Ok(RollingFileWriter {
            dir,
            base,
            rotation: self.rotation,
            max_size: self.max_size,
            max_files: self.max_files,
            next_rollover,
            file_index: 0,
            file_size: 0,
            file,
            #[cfg(test)]
            manual_now: self.manual_now,
        })
    }
}

// Prunes old files if a cap is set, then opens the file for (now, index) in
// append mode, creating the directory as needed.
fn next_log_file(
    dir: &Path,
    base: &str,
    rotation: &Rotation,
    max_files: Option<usize>,
    now: &Zoned,
    index: usize,
) -> anyhow::Result<File> {
    if let Some(max_files) = max_files {
        if let Err(err) = prune_oldest(dir, base, max_files) {
            eprintln!("failed to delete oldest logs: {err}");
        }
    }

    let filename = match rotation.date_stamp(now) {
        Some(stamp) => format!("{base}.{stamp}.{index}.log"),
        None => format!("{base}.{index}.log"),
    };

    fs::create_dir_all(dir).context("failed to create log directory")?;
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(dir.join(&filename))
        .with_context(|| format!("failed to create log file {filename}"))
}

// Deletes the oldest matching files until max_files - 1 remain, leaving room
// for the file about to be opened. Only plain files named after this writer
// are candidates; anything else in the directory is left alone.
fn prune_oldest(dir: &Path, base: &str, max_files: usize) -> anyhow::Result<()> {
    // A directory that does not exist yet has nothing to prune.
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };

    let mut logs: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(base) || !name.ends_with(".log") {
            continue;
        }
        let Ok(created) = metadata.created() else { continue };
        logs.push((entry.path(), created));
    }

    if logs.len() < max_files {
        return Ok(());
    }

    logs.sort_by_key(|(_, created)| *created);
    let excess = logs.len() + 1 - max_files;
    for (path, _) in logs.into_iter().take(excess) {
        fs::remove_file(&path)
            .with_context(|| format!("failed to remove old log file {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cmp::min;
    use std::fs;
    use std::io::Write;
    use std::str::FromStr;

    use jiff::Span;
    use jiff::Zoned;
    use rand::Rng;
    use rand::distr::Alphanumeric;
    use tempfile::TempDir;

    use crate::append::rolling_file::Rotation;
    use crate::append::rolling_file::rolling::RollingFileWriterBuilder;

    fn generate_random_string() -> String {
        let mut rng = rand::rng();
        let len = rng.random_range(50..100);
        (&mut rng)
            .sample_iter(Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }

    #[test]
    fn test_file_rolling_via_file_size() {
        test_file_rolling_for_specific_file_size(3, 1000);
        test_file_rolling_for_specific_file_size(10, 8888);
        test_file_rolling_for_specific_file_size(20, 6666);
    }

    fn test_file_rolling_for_specific_file_size(max_files: usize, max_size: usize) {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");

        let mut writer = RollingFileWriterBuilder::new()
            .rotation(Rotation::Never)
            .filename_base("test_stream")
            .max_log_files(max_files)
            .max_file_size(max_size)
            .build(&temp_dir)
            .unwrap();

        for i in 1..=(max_files * 2) {
            let mut expected_file_size = 0;
            while expected_file_size < max_size {
                let rand_str = generate_random_string();
                expected_file_size += rand_str.len();
                assert_eq!(writer.write(rand_str.as_bytes()).unwrap(), rand_str.len());
                assert_eq!(writer.file_size, expected_file_size);
            }

            writer.flush().unwrap();
            assert_eq!(
                fs::read_dir(&writer.dir).unwrap().count(),
                min(i, max_files)
            );
        }
    }

    #[test]
    fn test_file_rolling_via_daily_rotation() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let max_files = 10;

        let start_time = Zoned::from_str("2024-08-10T00:00:00[UTC]").unwrap();
        let mut writer = RollingFileWriterBuilder::new()
            .rotation(Rotation::Daily)
            .filename_base("test_stream")
            .max_log_files(max_files)
            .max_file_size(usize::MAX)
            .starting_now(start_time.clone())
            .build(&temp_dir)
            .unwrap();

        let mut cur_time = start_time;

        for i in 1..=(max_files * 2) {
            let mut expected_file_size = 0;
            let end_time = cur_time.checked_add(Span::new().days(1)).unwrap();
            while cur_time < end_time {
                writer.set_now(cur_time.clone());

                let rand_str = generate_random_string();
                expected_file_size += rand_str.len();

                assert_eq!(writer.write(rand_str.as_bytes()).unwrap(), rand_str.len());
                assert_eq!(writer.file_size, expected_file_size);

                cur_time = cur_time.checked_add(Span::new().hours(1)).unwrap();
            }

            writer.flush().unwrap();
            assert_eq!(
                fs::read_dir(&writer.dir).unwrap().count(),
                min(i, max_files)
            );
        }
    }

    #[test]
    fn test_daily_rotation_starts_new_dated_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");

        let start_time = Zoned::from_str("2024-08-10T23:59:00[UTC]").unwrap();
        let mut writer = RollingFileWriterBuilder::new()
            .rotation(Rotation::Daily)
            .filename_base("info")
            .starting_now(start_time)
            .build(&temp_dir)
            .unwrap();

        writer.write_all(b"before midnight\n").unwrap();

        let after_midnight = Zoned::from_str("2024-08-11T00:00:01[UTC]").unwrap();
        writer.set_now(after_midnight);
        writer.write_all(b"after midnight\n").unwrap();
        writer.flush().unwrap();

        let mut names: Vec<String> = fs::read_dir(&temp_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["info.2024-08-10.0.log", "info.2024-08-11.0.log"]);
    }

    #[test]
    fn test_size_rollover_advances_index_within_day() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");

        let start_time = Zoned::from_str("2024-08-10T12:00:00[UTC]").unwrap();
        let mut writer = RollingFileWriterBuilder::new()
            .rotation(Rotation::Daily)
            .filename_base("web")
            .max_file_size(16)
            .starting_now(start_time)
            .build(&temp_dir)
            .unwrap();

        writer.write_all(b"a line longer than the threshold\n").unwrap();
        writer.write_all(b"next\n").unwrap();
        writer.flush().unwrap();

        let mut names: Vec<String> = fs::read_dir(&temp_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["web.2024-08-10.0.log", "web.2024-08-10.1.log"]);
    }
}
