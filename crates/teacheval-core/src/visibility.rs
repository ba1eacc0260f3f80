//! Exclusion rules and course joins applied on every read path.

use crate::id::EntityId;
use crate::model::{
    AssessmentRecord, Course, EvaluationRecord, EvaluatorRole, Notice, ObservationRecord,
    Scoreable, ALL_COLLEGES,
};
use crate::scope;
use crate::store::Snapshot;

/// The role whose evaluations never appear in results.
pub const EXCLUDED_ROLE: EvaluatorRole = EvaluatorRole::Student;

/// Evaluations whose author role is not `role`.
pub fn exclude_role(
    records: &[EvaluationRecord],
    role: EvaluatorRole,
) -> impl Iterator<Item = &EvaluationRecord> {
    records.iter().filter(move |r| r.evaluator_role != role)
}

/// Whether `record`'s course belongs to `college`. Records whose course
/// does not resolve belong to no college.
pub fn joins_college<R: Scoreable>(record: &R, courses: &[Course], college: &str) -> bool {
    courses
        .iter()
        .find(|c| &c.id == record.course_id())
        .is_some_and(|c| c.college == college)
}

/// Every visible evaluation.
pub fn all_evaluations(snapshot: &Snapshot) -> Vec<&EvaluationRecord> {
    exclude_role(&snapshot.evaluations, EXCLUDED_ROLE).collect()
}

pub fn teacher_evaluations<'a>(snapshot: &'a Snapshot, teacher_id: &EntityId) -> Vec<&'a EvaluationRecord> {
    if teacher_id.is_blank() {
        return Vec::new();
    }
    exclude_role(&snapshot.evaluations, EXCLUDED_ROLE)
        .filter(|e| e.teacher_id() == teacher_id)
        .collect()
}

pub fn teacher_observations<'a>(snapshot: &'a Snapshot, teacher_id: &EntityId) -> Vec<&'a ObservationRecord> {
    if teacher_id.is_blank() {
        return Vec::new();
    }
    snapshot
        .observations
        .iter()
        .filter(|o| o.teacher_id() == teacher_id)
        .collect()
}

pub fn college_evaluations<'a>(snapshot: &'a Snapshot, college: &str) -> Vec<&'a EvaluationRecord> {
    if college.trim().is_empty() {
        return Vec::new();
    }
    exclude_role(&snapshot.evaluations, EXCLUDED_ROLE)
        .filter(|e| joins_college(*e, &snapshot.courses, college))
        .collect()
}

pub fn college_observations<'a>(snapshot: &'a Snapshot, college: &str) -> Vec<&'a ObservationRecord> {
    if college.trim().is_empty() {
        return Vec::new();
    }
    snapshot
        .observations
        .iter()
        .filter(|o| joins_college(*o, &snapshot.courses, college))
        .collect()
}

/// Observations held in courses within the supervisor's course scope.
pub fn supervisor_observations<'a>(
    snapshot: &'a Snapshot,
    supervisor_id: &EntityId,
) -> Vec<&'a ObservationRecord> {
    let course_ids: Vec<&EntityId> = scope::supervisor_courses(snapshot, supervisor_id)
        .into_iter()
        .map(|c| &c.id)
        .collect();
    snapshot
        .observations
        .iter()
        .filter(|o| course_ids.contains(&o.course_id()))
        .collect()
}

/// Notices addressed to every college or to `college`.
pub fn notices_for_college<'a>(snapshot: &'a Snapshot, college: &str) -> Vec<&'a Notice> {
    snapshot
        .notices
        .iter()
        .filter(|n| n.target_college == ALL_COLLEGES || n.target_college == college)
        .collect()
}

/// Evaluations followed by observations, as owned pooled records.
pub(crate) fn pool(
    evaluations: Vec<&EvaluationRecord>,
    observations: Vec<&ObservationRecord>,
) -> Vec<AssessmentRecord> {
    evaluations
        .into_iter()
        .cloned()
        .map(AssessmentRecord::Evaluation)
        .chain(
            observations
                .into_iter()
                .cloned()
                .map(AssessmentRecord::Observation),
        )
        .collect()
}
