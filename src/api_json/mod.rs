//! JSON wire types for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::engine::constraints::RejectionReason;

/// Hard ceiling on requested credit hours. Requests outside [1, 18] are
/// clamped, not rejected.
pub const MAX_HOURS_CAP: u32 = 18;

/// Input for `POST /api/recommend`.
///
/// # Expected JSON:
/// ```json
/// {
///   "taken_codes": ["برمجة 1", "التربية الوطنية"],
///   "max_hours": 15,
///   "use_offered": true,
///   "refresh_offered": false
/// }
/// ```
///
/// Every field is optional. `taken_codes` holds plan course names the
/// student already passed; names unknown to the plan are silently ignored.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub taken_codes: Vec<String>,
    #[serde(default = "default_max_hours")]
    pub max_hours: i64,
    #[serde(default = "default_true")]
    pub use_offered: bool,
    #[serde(default)]
    pub refresh_offered: bool,
}

fn default_max_hours() -> i64 {
    MAX_HOURS_CAP as i64
}

fn default_true() -> bool {
    true
}

impl RecommendRequest {
    /// Requested hour cap clamped into the valid range.
    pub fn clamped_max_hours(&self) -> u32 {
        self.max_hours.clamp(1, MAX_HOURS_CAP as i64) as u32
    }
}

/// One recommended course as the client renders it.
#[derive(Debug, Serialize)]
pub struct CourseRow {
    pub code: Option<String>,
    pub name: String,
    pub hours: u32,
    pub time: String,
    pub instructor: String,
    pub category: Option<String>,
}

/// A course that was offered but could not be recommended, with the first
/// reason that disqualified it.
#[derive(Debug, Serialize)]
pub struct RejectedCourse {
    pub code: String,
    pub reason: RejectionReason,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub ok: bool,
    pub total_hours: u32,
    pub courses: Vec<CourseRow>,
    /// Always empty today: the scheduler only emits conflict-free
    /// assignments. Kept in the shape for client compatibility.
    pub conflicts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedCourse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_refresh: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_gets_defaults() {
        let req: RecommendRequest = serde_json::from_str("{}").unwrap();
        assert!(req.taken_codes.is_empty());
        assert_eq!(req.max_hours, 18);
        assert!(req.use_offered);
        assert!(!req.refresh_offered);
    }

    #[test]
    fn max_hours_is_clamped_both_ways() {
        let low: RecommendRequest = serde_json::from_str(r#"{"max_hours": -4}"#).unwrap();
        assert_eq!(low.clamped_max_hours(), 1);
        let high: RecommendRequest = serde_json::from_str(r#"{"max_hours": 40}"#).unwrap();
        assert_eq!(high.clamped_max_hours(), 18);
        let fine: RecommendRequest = serde_json::from_str(r#"{"max_hours": 12}"#).unwrap();
        assert_eq!(fine.clamped_max_hours(), 12);
    }

    #[test]
    fn response_omits_empty_optional_fields() {
        let resp = RecommendResponse {
            ok: true,
            total_hours: 3,
            courses: vec![],
            conflicts: vec![],
            message: None,
            rejected: vec![],
            redirect_url: None,
            can_refresh: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("message"));
        assert!(!json.contains("rejected"));
        assert!(!json.contains("redirect_url"));
    }
}
