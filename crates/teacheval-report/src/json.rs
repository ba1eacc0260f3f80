//! JSON summary report.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teacheval_core::aggregate::TeacherSummary;
use teacheval_core::model::{AssessmentRecord, Config};
use teacheval_core::EntityId;

use crate::markdown::ANONYMOUS;

/// A supervisor ranking as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub supervisor_id: EntityId,
    pub entries: Vec<TeacherSummary>,
}

impl SummaryReport {
    /// Build a report, masking anonymous authors in every entry's records.
    pub fn new(supervisor_id: EntityId, entries: Vec<TeacherSummary>, config: &Config) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.records = masked_records(&entry.records, config);
                entry
            })
            .collect();
        Self {
            generated_at: Utc::now(),
            supervisor_id,
            entries,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize summary report")
    }

    /// Save the report to a JSON file, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SummaryReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

/// Copies of `records` with anonymous authors replaced by a placeholder
/// name and a blank id.
pub fn masked_records(records: &[AssessmentRecord], config: &Config) -> Vec<AssessmentRecord> {
    records
        .iter()
        .map(|record| {
            let mut record = record.clone();
            if config.is_anonymous(&record) {
                match &mut record {
                    AssessmentRecord::Evaluation(e) => {
                        e.evaluator_id = EntityId::new("");
                        e.evaluator_name = ANONYMOUS.to_string();
                    }
                    AssessmentRecord::Observation(o) => {
                        o.listener_id = EntityId::new("");
                        o.listener_name = ANONYMOUS.to_string();
                    }
                }
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use teacheval_core::aggregate::summarize_for_supervisor;
    use teacheval_core::persistence::MemoryAdapter;
    use teacheval_core::RecordStore;

    fn seed_report() -> SummaryReport {
        let store = RecordStore::hydrate(MemoryAdapter::new());
        let supervisor = EntityId::from(5u64);
        let entries = summarize_for_supervisor(store.snapshot(), &supervisor);
        SummaryReport::new(supervisor, entries, &store.snapshot().config)
    }

    #[test]
    fn json_roundtrip() {
        let report = seed_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("summary.json");

        report.save_json(&path).unwrap();
        let loaded = SummaryReport::load_json(&path).unwrap();
        assert_eq!(loaded.generated_at, report.generated_at);
        assert_eq!(loaded.supervisor_id, report.supervisor_id);
        assert_eq!(loaded.entries.len(), report.entries.len());
        for (a, b) in loaded.entries.iter().zip(&report.entries) {
            assert_eq!(a.teacher_id, b.teacher_id);
            assert_eq!(a.rank, b.rank);
            assert_eq!(a.records, b.records);
            assert!((a.average_score - b.average_score).abs() < 1e-9);
        }
    }

    #[test]
    fn camel_case_fields() {
        let json = seed_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["supervisorId"], "5");
        assert_eq!(value["entries"][0]["teacherName"], "Teacher Li");
        assert_eq!(value["entries"][0]["rank"], 1);
        assert_eq!(value["entries"][0]["records"][0]["kind"], "evaluation");
    }

    #[test]
    fn masking_follows_config() {
        let store = RecordStore::hydrate(MemoryAdapter::new());
        let records =
            teacheval_core::aggregate::summarize_for_teacher(store.snapshot(), &EntityId::from(1u64));

        let masked = masked_records(&records, &Config::default());
        assert_eq!(masked.len(), records.len());
        assert!(masked.iter().all(|r| r.author_name() == ANONYMOUS));

        let open = Config {
            global_anonymous: false,
            ..Config::default()
        };
        assert_eq!(masked_records(&records, &open), records);
    }

    #[test]
    fn report_hides_evaluators_under_global_anonymity() {
        let json = seed_report().to_json().unwrap();
        assert!(!json.contains("Supervisor Zhao"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for entry in value["entries"].as_array().unwrap() {
            for record in entry["records"].as_array().unwrap() {
                let author = record
                    .get("evaluatorName")
                    .or_else(|| record.get("listenerName"))
                    .unwrap();
                assert_eq!(author, ANONYMOUS);
                assert_eq!(
                    record.get("evaluatorId").or_else(|| record.get("listenerId")).unwrap(),
                    ""
                );
            }
        }
    }

    #[test]
    fn report_keeps_evaluators_when_anonymity_is_off() {
        let store = RecordStore::hydrate(MemoryAdapter::new());
        let supervisor = EntityId::from(5u64);
        let entries = summarize_for_supervisor(store.snapshot(), &supervisor);
        let open = Config {
            global_anonymous: false,
            ..Config::default()
        };
        let json = SummaryReport::new(supervisor, entries, &open).to_json().unwrap();
        assert!(json.contains("Supervisor Zhao"));
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = SummaryReport::load_json(Path::new("/no/such/report.json")).unwrap_err();
        assert!(err.to_string().contains("/no/such/report.json"));
    }
}
