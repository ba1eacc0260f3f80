//! Core data model types.
//!
//! Persisted field names are camelCase so existing stored state loads as-is.
//! Evaluations and observations share [`ScoredBody`] and the [`Scoreable`]
//! trait, and [`AssessmentRecord`] is the sum type the aggregation engine
//! pools them through.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::credential::Credential;
use crate::id::EntityId;

// ---------------------------------------------------------------------------
// People and organization
// ---------------------------------------------------------------------------

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Teacher,
    Supervisor,
    CollegeAdmin,
    SchoolAdmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Teacher => write!(f, "teacher"),
            Role::Supervisor => write!(f, "supervisor"),
            Role::CollegeAdmin => write!(f, "college_admin"),
            Role::SchoolAdmin => write!(f, "school_admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "teacher" => Ok(Role::Teacher),
            "supervisor" => Ok(Role::Supervisor),
            "college_admin" => Ok(Role::CollegeAdmin),
            "school_admin" => Ok(Role::SchoolAdmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub username: String,
    #[serde(alias = "password")]
    pub credential: Credential,
    #[serde(rename = "name", alias = "displayName")]
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub college: String,
    /// Colleges a supervisor oversees.
    #[serde(default)]
    pub responsible_colleges: Vec<String>,
    /// Teachers a supervisor oversees; takes precedence over colleges.
    #[serde(default)]
    pub responsible_teachers: Vec<EntityId>,
}

impl User {
    /// The user with the credential removed.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            college: self.college.clone(),
            responsible_colleges: self.responsible_colleges.clone(),
            responsible_teachers: self.responsible_teachers.clone(),
        }
    }
}

/// A user snapshot without any credential field, held by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub username: String,
    #[serde(rename = "name", alias = "displayName")]
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub responsible_colleges: Vec<String>,
    #[serde(default)]
    pub responsible_teachers: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct College {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub name: String,
    #[serde(alias = "_teacherId")]
    pub teacher_id: EntityId,
    #[serde(default)]
    pub teacher_name: String,
    pub college: String,
    #[serde(default)]
    pub semester: String,
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttitudeDetail {
    pub punctuality: f64,
    pub management: f64,
    pub appearance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentDetail {
    pub objectives: f64,
    pub familiarity: f64,
    pub innovation: f64,
    pub ideology: f64,
    pub practice: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDetail {
    pub materials: f64,
    pub interaction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectDetail {
    pub atmosphere: f64,
    pub inspiration: f64,
}

/// Per-item breakdown behind each dimension subtotal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoreDetail {
    pub teaching_attitude: AttitudeDetail,
    pub content: ContentDetail,
    pub method: MethodDetail,
    pub effect: EffectDetail,
}

/// The four weighted score dimensions.
///
/// A subtotal that is missing or non-numeric is `None`; such a sheet is
/// incomplete and yields no total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSheet {
    #[serde(default, deserialize_with = "numeric_or_none", skip_serializing_if = "Option::is_none")]
    pub teaching_attitude: Option<f64>,
    #[serde(default, deserialize_with = "numeric_or_none", skip_serializing_if = "Option::is_none")]
    pub content: Option<f64>,
    #[serde(default, deserialize_with = "numeric_or_none", skip_serializing_if = "Option::is_none")]
    pub method: Option<f64>,
    #[serde(default, deserialize_with = "numeric_or_none", skip_serializing_if = "Option::is_none")]
    pub effect: Option<f64>,
    #[serde(default)]
    pub detail: ScoreDetail,
}

impl ScoreSheet {
    /// Sum of the four subtotals, or `None` unless all four are present.
    pub fn total(&self) -> Option<f64> {
        Some(self.teaching_attitude? + self.content? + self.method? + self.effect?)
    }
}

/// Ordered quality bucket derived from a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Level {
    pub fn from_total(total: f64) -> Self {
        if total >= 90.0 {
            Level::Excellent
        } else if total >= 80.0 {
            Level::Good
        } else if total >= 60.0 {
            Level::Fair
        } else {
            Level::Poor
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Poor => write!(f, "poor"),
            Level::Fair => write!(f, "fair"),
            Level::Good => write!(f, "good"),
            Level::Excellent => write!(f, "excellent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Fields shared by evaluation and observation records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredBody {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub course_id: EntityId,
    #[serde(default)]
    pub course_name: String,
    #[serde(alias = "_teacherId")]
    pub teacher_id: EntityId,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub scores: Option<ScoreSheet>,
    /// Stored total. Only consulted when there is no score sheet.
    #[serde(default, deserialize_with = "numeric_or_none")]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Stored and derived totals closer than this are the same total.
const TOTAL_EPSILON: f64 = 1e-6;

impl ScoredBody {
    /// Total score: the sum of a complete score sheet, else the stored numeric total.
    pub fn total_score(&self) -> Option<f64> {
        self.scores
            .as_ref()
            .and_then(ScoreSheet::total)
            .or(self.total_score)
    }

    pub fn level(&self) -> Option<Level> {
        self.total_score().map(Level::from_total)
    }

    /// Align the stored total with a complete score sheet. Returns `true` if
    /// it changed. Incomplete sheets and rounding noise leave it untouched.
    pub fn sync_total(&mut self) -> bool {
        let Some(derived) = self.scores.as_ref().and_then(ScoreSheet::total) else {
            return false;
        };
        match self.total_score {
            Some(stored) if (stored - derived).abs() < TOTAL_EPSILON => false,
            _ => {
                self.total_score = Some(derived);
                true
            }
        }
    }
}

/// Accept any JSON value; keep it only if it is a number.
fn numeric_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

/// Who authored an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorRole {
    Teacher,
    Supervisor,
    /// Legacy category. Excluded from every read path.
    Student,
}

impl fmt::Display for EvaluatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluatorRole::Teacher => write!(f, "teacher"),
            EvaluatorRole::Supervisor => write!(f, "supervisor"),
            EvaluatorRole::Student => write!(f, "student"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    #[serde(flatten)]
    pub body: ScoredBody,
    pub evaluator_id: EntityId,
    #[serde(default)]
    pub evaluator_name: String,
    pub evaluator_role: EvaluatorRole,
    #[serde(default)]
    pub anonymous: bool,
}

/// A peer "listening-in" assessment of a teacher's class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    #[serde(flatten)]
    pub body: ScoredBody,
    pub listener_id: EntityId,
    #[serde(default)]
    pub listener_name: String,
}

/// Anything that carries a comparable quality signal about a teacher.
pub trait Scoreable {
    fn body(&self) -> &ScoredBody;

    fn teacher_id(&self) -> &EntityId {
        &self.body().teacher_id
    }

    fn course_id(&self) -> &EntityId {
        &self.body().course_id
    }

    fn total_score(&self) -> Option<f64> {
        self.body().total_score()
    }

    fn level(&self) -> Option<Level> {
        self.body().level()
    }
}

impl Scoreable for EvaluationRecord {
    fn body(&self) -> &ScoredBody {
        &self.body
    }
}

impl Scoreable for ObservationRecord {
    fn body(&self) -> &ScoredBody {
        &self.body
    }
}

/// Either record kind, as returned by pooled read paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AssessmentRecord {
    Evaluation(EvaluationRecord),
    Observation(ObservationRecord),
}

impl AssessmentRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            AssessmentRecord::Evaluation(_) => "evaluation",
            AssessmentRecord::Observation(_) => "observation",
        }
    }

    /// Author of the record: the evaluator or the listener.
    pub fn author_name(&self) -> &str {
        match self {
            AssessmentRecord::Evaluation(e) => &e.evaluator_name,
            AssessmentRecord::Observation(o) => &o.listener_name,
        }
    }

    pub fn as_evaluation(&self) -> Option<&EvaluationRecord> {
        match self {
            AssessmentRecord::Evaluation(e) => Some(e),
            AssessmentRecord::Observation(_) => None,
        }
    }
}

impl Scoreable for AssessmentRecord {
    fn body(&self) -> &ScoredBody {
        match self {
            AssessmentRecord::Evaluation(e) => &e.body,
            AssessmentRecord::Observation(o) => &o.body,
        }
    }
}

// ---------------------------------------------------------------------------
// Config and notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymousMode {
    /// One switch for every record.
    Global,
    /// Each record's own flag decides.
    #[serde(alias = "per_evaluation", alias = "custom")]
    PerRecord,
}

/// Persisted policy flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_mode")]
    pub anonymous_mode: AnonymousMode,
    #[serde(default = "default_true")]
    pub global_anonymous: bool,
    #[serde(default = "default_true", alias = "allowSelfListen")]
    pub allow_self_observation: bool,
    #[serde(default = "default_true")]
    pub audit_log: bool,
}

fn default_mode() -> AnonymousMode {
    AnonymousMode::Global
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anonymous_mode: default_mode(),
            global_anonymous: true,
            allow_self_observation: true,
            audit_log: true,
        }
    }
}

impl Config {
    /// Whether the author of `record` is hidden when displayed.
    pub fn is_anonymous(&self, record: &AssessmentRecord) -> bool {
        match self.anonymous_mode {
            AnonymousMode::Global => self.global_anonymous,
            AnonymousMode::PerRecord => match record {
                AssessmentRecord::Evaluation(e) => e.anonymous,
                AssessmentRecord::Observation(_) => false,
            },
        }
    }
}

/// Target value that addresses every college.
pub const ALL_COLLEGES: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default = "default_target")]
    pub target_college: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_read: bool,
}

fn default_target() -> String {
    ALL_COLLEGES.to_string()
}
