//! Build domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number the server assigns to a build of a job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildNumber(pub u32);

impl BuildNumber {
    /// A zero build number means the server has not assigned one yet
    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for BuildNumber {
    fn from(n: u32) -> Self {
        BuildNumber(n)
    }
}

/// Execution record of a job run
///
/// `result` stays empty while the build is still running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub number: BuildNumber,
    #[serde(default)]
    pub queue_id: u32,
    pub url: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub building: bool,
}

impl BuildInfo {
    /// Whether the build finished with a `SUCCESS` result
    pub fn succeeded(&self) -> bool {
        !self.building && self.result.as_deref() == Some("SUCCESS")
    }
}
