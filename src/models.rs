use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub total_predictions: u32,
    #[serde(default)]
    pub perfect: u32,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub incorrect: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub league: String,
    pub admin_id: u64,
    #[serde(default)]
    pub invite_code: String,
    #[serde(default)]
    pub member_count: u32,
    /// ISO-8601 UTC; drives the time-gated feature unlock.
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberAction {
    Approve,
    Reject,
    Remove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub user_id: u64,
    pub username: String,
    #[serde(default)]
    pub role: String,
    pub status: MemberStatus,
    #[serde(default)]
    pub joined_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub fixture_id: u64,
    pub home_team: String,
    pub away_team: String,
    /// Kickoff, ISO-8601 UTC.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub home_score: Option<u8>,
    #[serde(default)]
    pub away_score: Option<u8>,
    #[serde(default)]
    pub league: Option<String>,
}

impl Fixture {
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "FT" | "AET" | "PEN" | "FINISHED")
    }
}

/// Server-side lifecycle; the client only reflects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionStatus {
    Editable,
    Submitted,
    Locked,
    Processed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: u64,
    pub fixture_id: u64,
    pub score1: u8,
    pub score2: u8,
    #[serde(default)]
    pub points: Option<u32>,
    pub prediction_status: PredictionStatus,
}

impl Prediction {
    pub fn is_editable(&self) -> bool {
        matches!(self.prediction_status, PredictionStatus::Editable)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: u64,
    pub username: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub predictions: u32,
    /// Assigned client-side after sorting; the server sends rows unranked.
    #[serde(default)]
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rivalry {
    pub id: u64,
    pub user1_id: u64,
    pub user2_id: u64,
    #[serde(default)]
    pub active_weeks: Vec<u32>,
    #[serde(default)]
    pub user1_points: u32,
    #[serde(default)]
    pub user2_points: u32,
}

impl Rivalry {
    pub fn is_active_in_week(&self, week: u32) -> bool {
        self.active_weeks.contains(&week)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAnalytics {
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub total_predictions: u32,
    #[serde(default)]
    pub average_points: f64,
    #[serde(default)]
    pub rivalries: Vec<Rivalry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntry {
    pub id: u64,
    pub name: String,
}

// -- Auth payloads and responses --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthCompleteRequest {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameCheck {
    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthRedirect {
    pub url: String,
}

// -- Mutation payloads --

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    pub league: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    pub invite_code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberActionRequest {
    pub user_id: u64,
    pub action: MemberAction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    pub fixture_id: u64,
    pub score1: u8,
    pub score2: u8,
}
