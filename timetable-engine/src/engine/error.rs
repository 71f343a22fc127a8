/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error type for the conflict engine.
//!
//! Evaluation itself is total: missing course or room references degrade the
//! corresponding rule instead of failing.  The only fallible operation is
//! resolving a [`Strategy`](super::Strategy) from a user-supplied name.

use thiserror::Error;

/// Error returned by [`Strategy::from_name`](super::Strategy::from_name).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The strategy string is not recognised.
    #[error("unknown evaluation strategy: '{0}' (valid: pairwise, sweep)")]
    UnknownStrategy(String),
}
