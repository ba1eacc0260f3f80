//! Per-teacher score aggregation and ranking.
//!
//! Only the supervisor view aggregates. Evaluations and observations about
//! the scoped teachers are pooled (evaluations first, each in storage order),
//! records without a numeric total are dropped, and each teacher with at
//! least one remaining record gets a mean total. Teachers are then ranked by
//! descending mean with a stable sort, so ties keep the order in which the
//! teachers were first encountered in the pool. Ranks are sequential.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::EntityId;
use crate::model::{AssessmentRecord, Scoreable};
use crate::scope;
use crate::store::Snapshot;
use crate::visibility::{self, EXCLUDED_ROLE};

/// One ranked row of the supervisor summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub teacher_id: EntityId,
    pub teacher_name: String,
    /// Number of records with a numeric total.
    pub count: usize,
    pub total_score: f64,
    pub average_score: f64,
    /// 1-based position after sorting; no gaps, no shared ranks.
    pub rank: usize,
    pub records: Vec<AssessmentRecord>,
}

/// Rank the teachers in `supervisor_id`'s scope by mean total score.
///
/// Returns an empty list when the scope is empty or the id is not a supervisor.
pub fn summarize_for_supervisor(snapshot: &Snapshot, supervisor_id: &EntityId) -> Vec<TeacherSummary> {
    let teachers = scope::supervisor_teachers(snapshot, supervisor_id);
    if teachers.is_empty() {
        return Vec::new();
    }
    let names: HashMap<&EntityId, &str> = teachers
        .iter()
        .map(|t| (&t.id, t.display_name.as_str()))
        .collect();

    let evaluations = visibility::exclude_role(&snapshot.evaluations, EXCLUDED_ROLE)
        .filter(|e| names.contains_key(e.teacher_id()))
        .collect();
    let observations = snapshot
        .observations
        .iter()
        .filter(|o| names.contains_key(o.teacher_id()))
        .collect();
    let pooled = visibility::pool(evaluations, observations);

    let mut groups: Vec<(EntityId, Vec<AssessmentRecord>)> = Vec::new();
    let mut slot: HashMap<EntityId, usize> = HashMap::new();
    for record in pooled {
        if record.total_score().is_none() {
            continue;
        }
        let teacher_id = record.teacher_id().clone();
        let idx = *slot.entry(teacher_id.clone()).or_insert_with(|| {
            groups.push((teacher_id, Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(record);
    }

    let summaries: Vec<TeacherSummary> = groups
        .into_iter()
        .map(|(teacher_id, records)| {
            let total: f64 = records.iter().filter_map(|r| r.total_score()).sum();
            let count = records.len();
            TeacherSummary {
                teacher_name: names.get(&teacher_id).copied().unwrap_or_default().to_string(),
                teacher_id,
                count,
                total_score: total,
                average_score: total / count as f64,
                rank: 0,
                records,
            }
        })
        .collect();

    rank(summaries)
}

/// Sort descending by average (stable) and assign ranks 1..=n.
pub fn rank(mut summaries: Vec<TeacherSummary>) -> Vec<TeacherSummary> {
    summaries.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    for (idx, summary) in summaries.iter_mut().enumerate() {
        summary.rank = idx + 1;
    }
    summaries
}

/// Visible records about one teacher: evaluations, then observations.
pub fn summarize_for_teacher(snapshot: &Snapshot, teacher_id: &EntityId) -> Vec<AssessmentRecord> {
    visibility::pool(
        visibility::teacher_evaluations(snapshot, teacher_id),
        visibility::teacher_observations(snapshot, teacher_id),
    )
}

/// Visible records whose course belongs to `college`: evaluations, then observations.
pub fn summarize_for_college(snapshot: &Snapshot, college: &str) -> Vec<AssessmentRecord> {
    visibility::pool(
        visibility::college_evaluations(snapshot, college),
        visibility::college_observations(snapshot, college),
    )
}
