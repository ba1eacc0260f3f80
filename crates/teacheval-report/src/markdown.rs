//! Markdown rendering of supervisor rankings and record lists.

use teacheval_core::aggregate::TeacherSummary;
use teacheval_core::model::{AssessmentRecord, Config, Scoreable};

/// Shown in place of the author when a record is anonymous.
pub const ANONYMOUS: &str = "Anonymous";

/// The author as displayed under `config`'s anonymity policy.
pub fn author_label<'a>(record: &'a AssessmentRecord, config: &Config) -> &'a str {
    if config.is_anonymous(record) {
        ANONYMOUS
    } else {
        record.author_name()
    }
}

/// Escape characters that would break a table cell.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Ranking table: rank, teacher, record count, total and average score.
pub fn ranking_table(summaries: &[TeacherSummary]) -> String {
    let mut md = String::new();

    if summaries.is_empty() {
        md.push_str("_No scored records in scope._\n");
        return md;
    }

    md.push_str("| Rank | Teacher | Records | Total | Average |\n");
    md.push_str("|------|---------|---------|-------|---------|\n");
    for s in summaries {
        md.push_str(&format!(
            "| {} | {} | {} | {:.1} | {:.2} |\n",
            s.rank,
            cell(&s.teacher_name),
            s.count,
            s.total_score,
            s.average_score
        ));
    }

    md
}

/// Record list. The author column honours `config`'s anonymity policy.
pub fn record_list(records: &[AssessmentRecord], config: &Config) -> String {
    let mut md = String::new();

    if records.is_empty() {
        md.push_str("_No records._\n");
        return md;
    }

    md.push_str("| Kind | Course | Teacher | Author | Total | Level | Date |\n");
    md.push_str("|------|--------|---------|--------|-------|-------|------|\n");
    for record in records {
        let body = record.body();
        let author = author_label(record, config);
        let total = record
            .total_score()
            .map(|t| format!("{t:.1}"))
            .unwrap_or_else(|| "-".into());
        let level = record
            .level()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".into());
        let date = body
            .created_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into());
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            record.kind(),
            cell(&body.course_name),
            cell(&body.teacher_name),
            cell(author),
            total,
            level,
            date
        ));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use teacheval_core::aggregate::{summarize_for_college, summarize_for_supervisor};
    use teacheval_core::model::AnonymousMode;
    use teacheval_core::persistence::MemoryAdapter;
    use teacheval_core::{EntityId, RecordStore};

    fn store() -> RecordStore<MemoryAdapter> {
        RecordStore::hydrate(MemoryAdapter::new())
    }

    #[test]
    fn ranking_table_rows_in_rank_order() {
        let store = store();
        let summary = summarize_for_supervisor(store.snapshot(), &EntityId::from(5u64));
        let md = ranking_table(&summary);

        assert!(md.starts_with("| Rank | Teacher |"));
        assert!(md.contains("| 1 | Teacher Li | 2 | 179.0 | 89.50 |"));
        let li = md.find("Teacher Li").unwrap();
        let zhang = md.find("Teacher Zhang").unwrap();
        assert!(li < zhang);
    }

    #[test]
    fn empty_ranking() {
        assert!(ranking_table(&[]).contains("No scored records"));
    }

    #[test]
    fn record_list_masks_authors_in_global_mode() {
        let store = store();
        let records = summarize_for_college(store.snapshot(), "Information Engineering");
        let config = Config::default();
        assert!(config.global_anonymous);

        let md = record_list(&records, &config);
        assert!(!md.contains("Supervisor Zhao"));
        assert!(md.contains(ANONYMOUS));
        assert!(md.contains("| evaluation | Vue.js Development | Teacher Zhang |"));
        assert!(md.contains("2025-03-20"));
    }

    #[test]
    fn record_list_per_record_mode_shows_named_authors() {
        let store = store();
        let records = summarize_for_college(store.snapshot(), "Information Engineering");
        let config = Config {
            anonymous_mode: AnonymousMode::PerRecord,
            ..Config::default()
        };

        let md = record_list(&records, &config);
        assert!(md.contains("Supervisor Zhao"));
        assert!(md.contains("excellent"));
    }

    #[test]
    fn pipes_are_escaped() {
        assert_eq!(cell("a|b\nc"), "a\\|b c");
    }
}
