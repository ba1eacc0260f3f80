//! Baked-in reference data used when a key is missing or unreadable.

use serde::de::DeserializeOwned;

use crate::model::{College, Config, Course, EvaluationRecord, Notice, ObservationRecord, User};

const USERS: &str = include_str!("../seed/users.json");
const COLLEGES: &str = include_str!("../seed/colleges.json");
const COURSES: &str = include_str!("../seed/courses.json");
const EVALUATIONS: &str = include_str!("../seed/evaluations.json");
const OBSERVATIONS: &str = include_str!("../seed/observations.json");
const NOTICES: &str = include_str!("../seed/notices.json");

fn parse<T: DeserializeOwned>(name: &str, raw: &str) -> Vec<T> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::error!("bundled {name} seed is invalid: {e}");
        Vec::new()
    })
}

/// Seed users. Credentials are plaintext until load-time migration hashes them.
pub fn users() -> Vec<User> {
    parse("users", USERS)
}

pub fn colleges() -> Vec<College> {
    parse("colleges", COLLEGES)
}

pub fn courses() -> Vec<Course> {
    parse("courses", COURSES)
}

pub fn evaluations() -> Vec<EvaluationRecord> {
    parse("evaluations", EVALUATIONS)
}

pub fn observations() -> Vec<ObservationRecord> {
    parse("observations", OBSERVATIONS)
}

pub fn notices() -> Vec<Notice> {
    parse("notices", NOTICES)
}

pub fn config() -> Config {
    Config::default()
}
