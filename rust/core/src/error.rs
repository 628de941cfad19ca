// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying model data
///
/// Data-quality problems (degenerate geometry, unresolvable labels) are
/// never errors; they are handled locally by the pipeline. These variants
/// exist only for contract violations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid reference data: {0}")]
    InvalidReference(String),

    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(String),
}
