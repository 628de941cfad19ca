// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during footprint processing
///
/// Degraded geometry outcomes (loose unions, inexact decompositions) are
/// represented in the result types, not here; these variants are contract
/// violations only.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid footprint: {0}")]
    InvalidFootprint(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Core error: {0}")]
    CoreError(#[from] loadaudit_core::Error),
}
