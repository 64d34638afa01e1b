use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPostingId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for JobPostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hiring stage a round belongs to, declared in canonical board order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Stage {
    StageOne,
    StageTwo,
    Hired,
    Rejected,
}

impl Stage {
    pub const fn ordered() -> [Self; 4] {
        [Self::StageOne, Self::StageTwo, Self::Hired, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::StageOne => "stage 1",
            Self::StageTwo => "stage 2",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    /// Position in the canonical order `stage 1 < stage 2 < hired < rejected`.
    pub const fn rank(self) -> usize {
        match self {
            Self::StageOne => 0,
            Self::StageTwo => 1,
            Self::Hired => 2,
            Self::Rejected => 3,
        }
    }

    /// Case-insensitive lookup accepting the stored labels and their compact spellings.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
            .collect();
        match normalized.as_str() {
            "stage1" => Some(Self::StageOne),
            "stage2" => Some(Self::StageTwo),
            "hired" => Some(Self::Hired),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownLabel(value.to_string()))
    }
}

impl TryFrom<String> for Stage {
    type Error = UnknownLabel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Stage> for String {
    fn from(value: Stage) -> Self {
        value.label().to_string()
    }
}

/// Dashboard persona a request is made on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Admin,
    Client,
    SubVendor,
}

impl Role {
    pub const fn ordered() -> [Self; 3] {
        [Self::Admin, Self::Client, Self::SubVendor]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
            Self::SubVendor => "sub-vendor",
        }
    }

    /// Stages whose rounds appear as columns on this role's board.
    pub const fn visible_stages(self) -> &'static [Stage] {
        match self {
            Self::Admin => &[Stage::StageOne, Stage::StageTwo, Stage::Hired, Stage::Rejected],
            Self::Client | Self::SubVendor => &[Stage::StageTwo, Stage::Hired, Stage::Rejected],
        }
    }

    pub fn sees(self, stage: Stage) -> bool {
        self.visible_stages().contains(&stage)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            "sub-vendor" | "sub_vendor" | "subvendor" | "vendor" => Ok(Self::SubVendor),
            _ => Err(UnknownLabel(value.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownLabel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised label '{0}'")]
pub struct UnknownLabel(pub String);

/// Caller identity handed explicitly into every pipeline operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Actor {
    pub fn new(role: Role) -> Self {
        Self { role, id: None }
    }

    pub fn with_id(role: Role, id: impl Into<String>) -> Self {
        Self {
            role,
            id: Some(id.into()),
        }
    }
}

/// Named step of a job posting's pipeline.
///
/// The stage is kept as the stored label so postings carrying legacy or
/// unrecognised stages still load; [`Round::stage`] resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub name: String,
    pub stage: String,
}

impl Round {
    pub fn new(name: impl Into<String>, stage: Stage) -> Self {
        Self {
            name: name.into(),
            stage: stage.label().to_string(),
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        Stage::parse(&self.stage)
    }

    pub fn is_named(&self, name: &str) -> bool {
        same_round(&self.name, name)
    }
}

/// Round names and feedback keys compare case-insensitively.
pub fn same_round(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: JobPostingId,
    pub title: String,
    pub description: String,
    pub client: String,
    pub location: String,
    pub application_deadline: NaiveDate,
    pub compensation_start: u32,
    pub compensation_end: u32,
    pub rounds: Vec<Round>,
    pub created_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn round(&self, name: &str) -> Option<&Round> {
        self.rounds.iter().find(|round| round.is_named(name))
    }
}

/// Request body for creating a job posting.
///
/// `rounds` replaces the generated default list; otherwise `stage_two_rounds`
/// (or the configured default) decides how many stage-2 interview rounds exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobPosting {
    pub title: String,
    pub description: String,
    pub client: String,
    pub location: String,
    pub application_deadline: NaiveDate,
    pub compensation_start: u32,
    pub compensation_end: u32,
    #[serde(default)]
    pub stage_two_rounds: Option<u8>,
    #[serde(default)]
    pub rounds: Option<Vec<Round>>,
}

/// Candidate contact details captured on submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

impl CandidateDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Names of required fields left blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("pincode", &self.pincode),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Request body for submitting an application against a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmission {
    pub job: JobPostingId,
    #[serde(flatten)]
    pub candidate: CandidateDetails,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub sub_vendor: Option<String>,
}

/// Feedback left when an application moved out of `round`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub round: String,
    pub feedback_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobPostingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_vendor: Option<String>,
    #[serde(flatten)]
    pub candidate: CandidateDetails,
    pub status: String,
    pub feedback: Vec<FeedbackEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Same posting and same email, compared trimmed and case-insensitively.
    pub fn same_candidate(&self, other: &Application) -> bool {
        self.job_id == other.job_id
            && self
                .candidate
                .email
                .trim()
                .eq_ignore_ascii_case(other.candidate.email.trim())
    }

    pub fn is_in(&self, round: &str) -> bool {
        same_round(&self.status, round)
    }

    pub fn feedback_for(&self, round: &str) -> Option<&FeedbackEntry> {
        self.feedback
            .iter()
            .find(|entry| same_round(&entry.round, round))
    }

    /// Overwrites the entry for `round` when present, otherwise appends one.
    pub fn upsert_feedback(&mut self, round: &str, text: &str) {
        match self
            .feedback
            .iter_mut()
            .find(|entry| same_round(&entry.round, round))
        {
            Some(entry) => entry.feedback_text = text.to_string(),
            None => self.feedback.push(FeedbackEntry {
                round: round.to_string(),
                feedback_text: text.to_string(),
            }),
        }
    }
}

/// Request content the pipeline refuses before touching any stored state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("feedback is required when moving an applicant")]
    MissingFeedback,
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },
    #[error("round '{round}' is not part of this job posting")]
    UnknownRound { round: String },
    #[error("round '{round}' has unrecognised stage '{stage}'")]
    UnrecognisedStage { round: String, stage: String },
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("stage 2 round count must be between {min} and {max}, got {actual}")]
    StageTwoRoundCount { min: u8, max: u8, actual: u8 },
    #[error("round '{round}' appears more than once")]
    DuplicateRound { round: String },
    #[error("job posting needs at least one stage 1 round to receive applications")]
    NoEntryRound,
    #[error("compensation start {start} exceeds compensation end {end}")]
    CompensationRange { start: u32, end: u32 },
}
