//! Profile directory records
//!
//! A profile is attached 1:1 to an identity and carries demographic
//! attributes plus partner preferences. `ProfileData` is the writable part;
//! `Profile` adds the server-owned columns and the nested identity summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::identity::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaritalStatus {
    NeverMarried,
    Divorced,
    Widowed,
    AwaitingDivorce,
}

impl MaritalStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "NEVER_MARRIED" => Some(Self::NeverMarried),
            "DIVORCED" => Some(Self::Divorced),
            "WIDOWED" => Some(Self::Widowed),
            "AWAITING_DIVORCE" => Some(Self::AwaitingDivorce),
            _ => None,
        }
    }

    pub fn to_db(&self) -> &'static str {
        match self {
            Self::NeverMarried => "NEVER_MARRIED",
            Self::Divorced => "DIVORCED",
            Self::Widowed => "WIDOWED",
            Self::AwaitingDivorce => "AWAITING_DIVORCE",
        }
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Education {
    HighSchool,
    Bachelors,
    Masters,
    Doctorate,
    Other,
}

impl Education {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "HIGH_SCHOOL" => Some(Self::HighSchool),
            "BACHELORS" => Some(Self::Bachelors),
            "MASTERS" => Some(Self::Masters),
            "DOCTORATE" => Some(Self::Doctorate),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn to_db(&self) -> &'static str {
        match self {
            Self::HighSchool => "HIGH_SCHOOL",
            Self::Bachelors => "BACHELORS",
            Self::Masters => "MASTERS",
            Self::Doctorate => "DOCTORATE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db())
    }
}

/// Writable profile fields, validated on create and after every partial update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_preference_ranges"))]
pub struct ProfileData {
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[validate(range(min = 18, max = 120))]
    pub age: i32,
    /// Centimetres
    #[validate(range(min = 0.0))]
    pub height: f64,
    #[validate(length(min = 1, max = 100))]
    pub religion: String,
    pub marital_status: MaritalStatus,
    pub education: Education,
    #[validate(length(min = 1, max = 100))]
    pub occupation: String,
    /// Annual income
    #[validate(range(min = 0.0))]
    pub income: f64,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[serde(default)]
    pub bio: String,

    pub preferred_age_min: i32,
    pub preferred_age_max: i32,
    #[validate(range(min = 0.0))]
    pub preferred_height_min: f64,
    #[validate(range(min = 0.0))]
    pub preferred_height_max: f64,
    #[validate(length(min = 1, max = 100))]
    pub preferred_religion: String,
    pub preferred_marital_status: MaritalStatus,
    pub preferred_education: Education,
    #[validate(length(min = 1, max = 200))]
    pub preferred_location: String,
    #[validate(range(min = 0.0))]
    pub preferred_income_min: f64,
    #[validate(range(min = 0.0))]
    pub preferred_income_max: f64,
}

fn validate_preference_ranges(data: &ProfileData) -> Result<(), ValidationError> {
    if data.preferred_age_min > data.preferred_age_max {
        return Err(ValidationError::new("preferred_age_range")
            .with_message("preferred_age_min must not exceed preferred_age_max".into()));
    }
    if data.preferred_height_min > data.preferred_height_max {
        return Err(ValidationError::new("preferred_height_range")
            .with_message("preferred_height_min must not exceed preferred_height_max".into()));
    }
    if data.preferred_income_min > data.preferred_income_max {
        return Err(ValidationError::new("preferred_income_range")
            .with_message("preferred_income_min must not exceed preferred_income_max".into()));
    }
    Ok(())
}

/// Partial update body; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub profile_picture: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub religion: Option<String>,
    pub marital_status: Option<MaritalStatus>,
    pub education: Option<Education>,
    pub occupation: Option<String>,
    pub income: Option<f64>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub preferred_age_min: Option<i32>,
    pub preferred_age_max: Option<i32>,
    pub preferred_height_min: Option<f64>,
    pub preferred_height_max: Option<f64>,
    pub preferred_religion: Option<String>,
    pub preferred_marital_status: Option<MaritalStatus>,
    pub preferred_education: Option<Education>,
    pub preferred_location: Option<String>,
    pub preferred_income_min: Option<f64>,
    pub preferred_income_max: Option<f64>,
}

impl ProfilePatch {
    pub fn apply(self, base: &ProfileData) -> ProfileData {
        let base = base.clone();
        ProfileData {
            profile_picture: self.profile_picture.or(base.profile_picture),
            age: self.age.unwrap_or(base.age),
            height: self.height.unwrap_or(base.height),
            religion: self.religion.unwrap_or(base.religion),
            marital_status: self.marital_status.unwrap_or(base.marital_status),
            education: self.education.unwrap_or(base.education),
            occupation: self.occupation.unwrap_or(base.occupation),
            income: self.income.unwrap_or(base.income),
            location: self.location.unwrap_or(base.location),
            bio: self.bio.unwrap_or(base.bio),
            preferred_age_min: self.preferred_age_min.unwrap_or(base.preferred_age_min),
            preferred_age_max: self.preferred_age_max.unwrap_or(base.preferred_age_max),
            preferred_height_min: self.preferred_height_min.unwrap_or(base.preferred_height_min),
            preferred_height_max: self.preferred_height_max.unwrap_or(base.preferred_height_max),
            preferred_religion: self.preferred_religion.unwrap_or(base.preferred_religion),
            preferred_marital_status: self
                .preferred_marital_status
                .unwrap_or(base.preferred_marital_status),
            preferred_education: self.preferred_education.unwrap_or(base.preferred_education),
            preferred_location: self.preferred_location.unwrap_or(base.preferred_location),
            preferred_income_min: self.preferred_income_min.unwrap_or(base.preferred_income_min),
            preferred_income_max: self.preferred_income_max.unwrap_or(base.preferred_income_max),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub user: UserSummary,
    #[serde(flatten)]
    pub data: ProfileData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Profile {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}

/// Query string of `GET /profiles/potential_matches`.
///
/// Text filters are exact-match. The age range only applies when both
/// bounds are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub age_min: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub age_max: Option<i32>,
    pub religion: Option<String>,
    pub marital_status: Option<String>,
    pub education: Option<String>,
    pub location: Option<String>,
}

impl MatchFilter {
    pub fn age_range(&self) -> Option<(i32, i32)> {
        match (self.age_min, self.age_max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }

    pub fn religion(&self) -> Option<&str> {
        non_empty(&self.religion)
    }

    pub fn marital_status(&self) -> Option<&str> {
        non_empty(&self.marital_status)
    }

    pub fn education(&self) -> Option<&str> {
        non_empty(&self.education)
    }

    pub fn location(&self) -> Option<&str> {
        non_empty(&self.location)
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        let data = &profile.data;
        if let Some((min, max)) = self.age_range() {
            if data.age < min || data.age > max {
                return false;
            }
        }
        self.religion().map_or(true, |r| data.religion == r)
            && self
                .marital_status()
                .map_or(true, |m| data.marital_status.to_db() == m)
            && self.education().map_or(true, |e| data.education.to_db() == e)
            && self.location().map_or(true, |l| data.location == l)
    }
}

// Empty query values (`?religion=`) are treated as absent
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_data() -> ProfileData {
        ProfileData {
            profile_picture: None,
            age: 29,
            height: 170.5,
            religion: "Hindu".into(),
            marital_status: MaritalStatus::NeverMarried,
            education: Education::Masters,
            occupation: "Engineer".into(),
            income: 85000.0,
            location: "Pune".into(),
            bio: String::new(),
            preferred_age_min: 26,
            preferred_age_max: 34,
            preferred_height_min: 155.0,
            preferred_height_max: 185.0,
            preferred_religion: "Hindu".into(),
            preferred_marital_status: MaritalStatus::NeverMarried,
            preferred_education: Education::Bachelors,
            preferred_location: "Pune".into(),
            preferred_income_min: 40000.0,
            preferred_income_max: 150000.0,
        }
    }

    #[test]
    fn test_sample_profile_is_valid() {
        assert!(sample_data().validate().is_ok());
    }

    #[test]
    fn test_age_bounds() {
        let mut data = sample_data();
        data.age = 17;
        assert!(data.validate().is_err());
        data.age = 121;
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_inverted_preference_range_rejected() {
        let mut data = sample_data();
        data.preferred_age_min = 40;
        data.preferred_age_max = 30;
        let err = data.validate().unwrap_err();
        assert!(err.to_string().contains("preferred_age_min"));
    }

    #[test]
    fn test_negative_income_rejected() {
        let mut data = sample_data();
        data.income = -1.0;
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_enums_use_upper_snake_wire_format() {
        let json = serde_json::to_value(sample_data()).unwrap();
        assert_eq!(json["marital_status"], "NEVER_MARRIED");
        assert_eq!(json["education"], "MASTERS");
        assert_eq!(
            MaritalStatus::from_db("AWAITING_DIVORCE"),
            Some(MaritalStatus::AwaitingDivorce)
        );
        assert_eq!(Education::from_db("PHD"), None);
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let base = sample_data();
        let patch = ProfilePatch {
            location: Some("Mumbai".into()),
            age: Some(30),
            ..Default::default()
        };
        let merged = patch.apply(&base);
        assert_eq!(merged.location, "Mumbai");
        assert_eq!(merged.age, 30);
        assert_eq!(merged.religion, base.religion);
        assert_eq!(merged.preferred_income_max, base.preferred_income_max);
    }

    #[test]
    fn test_age_filter_needs_both_bounds() {
        let only_min = MatchFilter {
            age_min: Some(30),
            ..Default::default()
        };
        assert_eq!(only_min.age_range(), None);

        let both = MatchFilter {
            age_min: Some(30),
            age_max: Some(40),
            ..Default::default()
        };
        assert_eq!(both.age_range(), Some((30, 40)));
    }

    #[test]
    fn test_empty_query_values_are_ignored() {
        let filter = MatchFilter {
            religion: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter.religion(), None);
    }

    #[test]
    fn test_blank_query_string_parses_to_no_filter() {
        let query = actix_web::web::Query::<MatchFilter>::from_query(
            "age_min=&age_max=&religion=&marital_status=&education=&location=",
        )
        .unwrap();
        assert_eq!(query.age_range(), None);
        assert_eq!(query.location(), None);

        let query =
            actix_web::web::Query::<MatchFilter>::from_query("age_min=25&age_max=%2035").unwrap();
        assert_eq!(query.age_range(), Some((25, 35)));

        assert!(actix_web::web::Query::<MatchFilter>::from_query("age_min=twenty").is_err());
    }
}
