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

use streamlog::Facility;
use streamlog::Stream;

fn main() -> Result<(), streamlog::SetupError> {
    // Every stream additionally mirrors its records to stdout as JSON lines.
    let facility = Facility::builder("demo-service")
        .directory("logs")
        .env("development")
        .console(true)
        .max_size(Stream::Web, 20 * 1024 * 1024)
        .build()?;

    facility.info("mirrored to both info/info.log and stdout", None);
    facility.web("GET /health 200", None);

    drop(facility);
    Ok(())
}
