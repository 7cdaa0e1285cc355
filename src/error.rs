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

/// Errors raised while bootstrapping a facility.
///
/// These are fatal at startup: a facility whose construction failed must not
/// be used. Once a facility is ready, logging calls never fail.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Creating a stream directory or opening a log file failed.
    #[error("failed to perform IO action: {0}")]
    Io(#[from] std::io::Error),
    /// Configuring a stream backend failed.
    #[error("failed to set up stream backend: {0}")]
    Backend(#[from] anyhow::Error),
}
