//! View DTOs

use serde::{Deserialize, Serialize};

/// Response of `view/<name>/api/json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewResponse {
    #[serde(default)]
    pub jobs: Vec<JobRef>,
}

/// Job listed by a view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRef {
    pub name: String,
}

impl ViewResponse {
    pub fn job_names(self) -> Vec<String> {
        self.jobs.into_iter().map(|j| j.name).collect()
    }
}
