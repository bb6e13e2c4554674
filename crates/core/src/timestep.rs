// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestep identifiers: decimal strings emitted by the producing
//! simulation, ordered and compared by exact numeric value rather than by
//! their printed form.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::CoreError;

/// A non-negative decimal timestep identifier.
///
/// Preserves the original printed form (so filenames and commands built
/// from a `Timestep` look exactly like the directory name it came from)
/// while comparing and dividing by exact decimal value, never by binary
/// float.
#[derive(Debug, Clone, Eq)]
pub struct Timestep {
    raw: String,
    value: Decimal,
}

impl Timestep {
    /// Parse a timestep from its directory/file-name form.
    ///
    /// Rejects anything that isn't a valid exact decimal (spec.md §3:
    /// "Parsed as exact decimal, not binary float").
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let value = Decimal::from_str(raw).map_err(|e| CoreError::InvalidArgument {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { raw: raw.to_string(), value })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True iff `self / divisor` has no fractional part, i.e. `self` is an
    /// exact multiple of `divisor`.
    ///
    /// This is the "keep-divisibility" rule from spec.md §3/§4.2: computed
    /// via exact decimal division so that e.g. `keep_every = 0.1` correctly
    /// keeps `T = 0.3` (`simon/openfoam/listener.py::_delete_without_processing`
    /// does the equivalent check the other way around, returning true when
    /// the timestep should be *deleted*).
    pub fn is_multiple_of(&self, divisor: Decimal) -> bool {
        if divisor.is_zero() {
            return false;
        }
        (self.value / divisor) % Decimal::ONE == Decimal::ZERO
    }
}

impl fmt::Display for Timestep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for Timestep {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for Timestep {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestep {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl FromStr for Timestep {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical compressed-group filename: `times_<start>_<end>_<step>.tgz`.
///
/// Pure formatter — rejects non-decimal inputs (spec.md §4.1
/// `create_compressed_filename`).
pub fn create_compressed_filename(start: &str, end: &str, step: &str) -> Result<String, CoreError> {
    Timestep::parse(start)?;
    Timestep::parse(end)?;
    Timestep::parse(step)?;
    Ok(format!("times_{start}_{end}_{step}.tgz"))
}

/// Inverse of [`create_compressed_filename`]: parses `times_<a>_<b>_<c>.tgz`
/// back into its three decimal components.
pub fn parse_compressed_filename(name: &str) -> Result<(Timestep, Timestep, Timestep), CoreError> {
    let invalid = |reason: &str| CoreError::InvalidArgument {
        value: name.to_string(),
        reason: reason.to_string(),
    };
    let stem = name.strip_suffix(".tgz").ok_or_else(|| invalid("missing .tgz extension"))?;
    let rest = stem.strip_prefix("times_").ok_or_else(|| invalid("missing times_ prefix"))?;
    let mut parts = rest.split('_');
    let start = parts.next().ok_or_else(|| invalid("missing start"))?;
    let end = parts.next().ok_or_else(|| invalid("missing end"))?;
    let step = parts.next().ok_or_else(|| invalid("missing step"))?;
    if parts.next().is_some() {
        return Err(invalid("too many underscore-separated fields"));
    }
    Ok((Timestep::parse(start)?, Timestep::parse(end)?, Timestep::parse(step)?))
}

#[cfg(test)]
#[path = "timestep_tests.rs"]
mod tests;
