//! Redis key layout for job records and their secondary indexes.

use sf_models::{JobId, JobState};

pub fn job_key(job_id: &JobId) -> String {
    format!("job:{}", job_id)
}

pub fn user_index_key(user_id: &str) -> String {
    format!("user:{}:jobs", user_id)
}

pub fn status_index_key(state: JobState) -> String {
    format!("jobs:status:{}", state.as_str())
}

pub const ALL_STATES: [JobState; 6] = [
    JobState::Pending,
    JobState::Started,
    JobState::Processing,
    JobState::Success,
    JobState::Failure,
    JobState::Cancelled,
];
