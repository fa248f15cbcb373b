//! Job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::BuildInfo;

/// Fields requested for every build through the `tree` query parameter
pub const BUILD_INFO_TREE: &str = "number,queueId,url,result";

/// Response of `job/<name>/api/json?tree=builds[...]{m,n}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildsResponse {
    #[serde(default)]
    pub builds: Vec<BuildInfo>,
}

/// `tree` expression selecting builds `m` (inclusive) to `n` (exclusive)
pub fn builds_tree(m: u32, n: u32) -> String {
    format!("builds[{}]{{{},{}}}", BUILD_INFO_TREE, m, n)
}

/// `tree` expression for a single build, including the running flag
pub fn build_info_tree() -> String {
    format!("{},building", BUILD_INFO_TREE)
}
