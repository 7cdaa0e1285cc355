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

//! End-to-end tests: bootstrap a facility against a temporary directory, log
//! through the verbs, drop the facility to flush, then inspect the files.

use std::fs;
use std::path::Path;

use serde_json::Value;
use serde_json::json;
use streamlog::Facility;
use streamlog::Fields;
use streamlog::Stream;
use tempfile::TempDir;

/// Reads every line of every log file under one stream's directory.
fn read_stream_lines(base: &Path, stream: Stream) -> Vec<Value> {
    let dir = base.join(stream.as_str());
    let mut lines = Vec::new();
    for entry in fs::read_dir(&dir).expect("stream directory must exist") {
        let path = entry.unwrap().path();
        let content = fs::read_to_string(&path).unwrap();
        for line in content.lines() {
            lines.push(serde_json::from_str(line).expect("every line is a JSON object"));
        }
    }
    lines
}

fn stream_file_count(base: &Path, stream: Stream) -> usize {
    fs::read_dir(base.join(stream.as_str())).unwrap().count()
}

#[test]
fn test_bootstrap_creates_stream_directories() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("logs");

    let facility = Facility::builder("demo")
        .directory(&base)
        .env("production")
        .build()
        .unwrap();
    drop(facility);

    for stream in Stream::ALL {
        let dir = base.join(stream.as_str());
        assert!(dir.is_dir(), "missing directory for stream {stream}");
        assert_eq!(stream_file_count(&base, stream), 1);
    }
}

#[test]
fn test_each_verb_lands_in_exactly_one_stream() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_path_buf();

    let facility = Facility::builder("demo")
        .directory(&base)
        .env("production")
        .build()
        .unwrap();
    facility.info("informational", None);
    facility.web("access", None);
    facility.error("recoverable", None);
    facility.crash("fatal", None);
    drop(facility);

    let expectations = [
        (Stream::Info, "informational", "info", "INFO"),
        (Stream::Web, "access", "web", "INFO"),
        (Stream::Errors, "recoverable", "error", "ERROR"),
        (Stream::Crashes, "fatal", "critical", "ERROR"),
    ];
    for (stream, message, severity, level) in expectations {
        let lines = read_stream_lines(&base, stream);
        assert_eq!(lines.len(), 1, "stream {stream} must hold exactly one record");
        let line = &lines[0];
        assert_eq!(line["message"], message);
        assert_eq!(line["severity"], severity);
        assert_eq!(line["level"], level);
        assert_eq!(line["app"], "demo");
        assert_eq!(line["env"], "production");
        assert!(line["timestamp"].is_string());
    }
}

#[test]
fn test_error_record_carries_request_fields() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_path_buf();

    let facility = Facility::builder("demo")
        .directory(&base)
        .env("production")
        .build()
        .unwrap();
    let mut metadata = Fields::new();
    metadata.insert(
        "req".to_string(),
        json!({"url": "/x", "body": {"k": "v"}, "params": {"id": "7"}}),
    );
    facility.error("boom", Some(&metadata));
    drop(facility);

    let lines = read_stream_lines(&base, Stream::Errors);
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert_eq!(line["message"], "boom\n    url: /x");
    assert_eq!(line["url"], "/x");
    assert_eq!(line["body"], json!({"k": "v"}));
    assert_eq!(line["params"], json!({"id": "7"}));
    assert_eq!(line["err"], "boom");
    assert!(line.get("req").is_none());
}

#[test]
fn test_crash_record_preserves_request_asymmetry() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_path_buf();

    let facility = Facility::builder("demo")
        .directory(&base)
        .env("production")
        .build()
        .unwrap();
    let mut metadata = Fields::new();
    metadata.insert(
        "req".to_string(),
        json!({"url": "/y", "body": {"k": "v"}, "params": {"id": "7"}}),
    );
    facility.crash("down", Some(&metadata));
    drop(facility);

    let lines = read_stream_lines(&base, Stream::Crashes);
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert_eq!(line["message"], "down\n    url: /y");
    assert_eq!(line["url"], "/y");
    assert!(line.get("body").is_none());
    assert!(line.get("params").is_none());
    assert!(line.get("req").is_none());
}

#[test]
fn test_construction_is_idempotent_against_same_directory() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_path_buf();

    let first = Facility::builder("demo")
        .directory(&base)
        .env("production")
        .build()
        .unwrap();
    let second = Facility::builder("demo")
        .directory(&base)
        .env("production")
        .build()
        .unwrap();

    first.info("from first", None);
    second.info("from second", None);
    drop(first);
    drop(second);

    let lines = read_stream_lines(&base, Stream::Info);
    let messages: Vec<&str> = lines.iter().map(|l| l["message"].as_str().unwrap()).collect();
    assert!(messages.contains(&"from first"));
    assert!(messages.contains(&"from second"));
}

#[test]
fn test_maxsize_override_triggers_size_rotation() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_path_buf();

    let facility = Facility::builder("demo")
        .directory(&base)
        .env("production")
        .max_size(Stream::Info, 512)
        .build()
        .unwrap();
    for i in 0..64 {
        facility.info(&format!("filler record number {i} with some extra width"), None);
    }
    drop(facility);

    assert!(
        stream_file_count(&base, Stream::Info) > 1,
        "info stream must have rolled over by size"
    );
    // Other streams keep their single file.
    assert_eq!(stream_file_count(&base, Stream::Web), 1);
}

#[test]
fn test_error_alias_routes_like_error_request() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_path_buf();

    let facility = Facility::builder("demo")
        .directory(&base)
        .env("production")
        .build()
        .unwrap();
    facility.error_request("one", None);
    facility.error("two", None);
    drop(facility);

    let lines = read_stream_lines(&base, Stream::Errors);
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_eq!(line["severity"], "error");
    }
}

#[test]
fn test_verbs_with_empty_arguments_still_enrich() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().to_path_buf();

    let facility = Facility::builder("demo")
        .directory(&base)
        .env("production")
        .build()
        .unwrap();
    facility.info("", None);
    facility.web("", None);
    facility.error("", None);
    facility.crash("", None);
    drop(facility);

    for stream in Stream::ALL {
        let lines = read_stream_lines(&base, stream);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["message"], "");
        assert_eq!(line["app"], "demo");
        assert_eq!(line["env"], "production");
        assert!(line["severity"].is_string());
    }
}
