//! Contract direction relative to "our" party

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which way the rights flow in a contract.
///
/// Upstream means we acquire or commission rights from the counterparty;
/// downstream means we license or transfer rights out to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Rights flow into our party (acquisition, commissioning)
    Upstream,
    /// Rights are granted out to a counterparty (licensing, transfer)
    Downstream,
}

impl Direction {
    /// Canonical lowercase name, matching the persisted JSON form
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Upstream => "upstream",
            Direction::Downstream => "downstream",
        }
    }

    /// Map a free-form model reply to a direction.
    ///
    /// Accepts the canonical English names as well as Chinese shorthand
    /// ("上游"/"下游"). Anything unrecognized defaults to upstream: a missed
    /// license acquisition is the costlier mistake, so ambiguity is biased
    /// toward treating the contract as upstream.
    pub fn normalize(raw: &str) -> Direction {
        let val = raw.trim().to_lowercase();
        if val.contains('上') || val == "upstream" {
            return Direction::Upstream;
        }
        if val.contains('下') || val == "downstream" {
            return Direction::Downstream;
        }
        Direction::Upstream
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upstream" => Ok(Direction::Upstream),
            "downstream" => Ok(Direction::Downstream),
            other => Err(format!(
                "invalid direction '{other}' (expected 'upstream' or 'downstream')"
            )),
        }
    }
}
