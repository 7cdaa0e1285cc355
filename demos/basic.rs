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

use serde_json::json;
use streamlog::ErrorInput;
use streamlog::Facility;
use streamlog::Fields;

fn main() -> Result<(), streamlog::SetupError> {
    let facility = Facility::builder("demo-service")
        .directory("logs")
        .env("development")
        .build()?;

    facility.info("service started", None);
    facility.web("GET / 200 12ms", None);

    let mut metadata = Fields::new();
    metadata.insert(
        "req".to_string(),
        json!({"url": "/checkout", "body": {"cart": 3}, "params": {"user": "42"}}),
    );
    facility.error(
        ErrorInput::standard("payment provider timed out", None),
        Some(&metadata),
    );

    facility.crash(
        ErrorInput::unexpected(
            "event loop wedged",
            Some(ErrorInput::standard(
                "deadlock detected",
                Some("thread 'main' ...".to_string()),
            )),
        ),
        None,
    );

    // Dropping the facility flushes every stream's writer thread.
    drop(facility);
    Ok(())
}
