//! Closed string enums shared by the entity models.
//!
//! Each enum is stored as its `snake_case` string value and serialized the same
//! way on the wire, so a value read from JSON is validated before it reaches the
//! database.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! display_as_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.to_value())
                }
            }
        )*
    };
}

/// Account role chosen at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "parent")]
    Parent,
    #[sea_orm(string_value = "counselor")]
    Counselor,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Education level, used for both users and goals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    #[sea_orm(string_value = "high_school")]
    HighSchool,
    #[sea_orm(string_value = "undergraduate")]
    Undergraduate,
    #[sea_orm(string_value = "graduate")]
    Graduate,
    #[sea_orm(string_value = "doctoral")]
    Doctoral,
}

/// Scholarship listing status, set directly by the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ScholarshipStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Application lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "waitlisted")]
    Waitlisted,
}

impl ApplicationStatus {
    /// Whether an application may move from `self` to `next`.
    ///
    /// Staying on the same status is always allowed. Otherwise the status only
    /// moves forward: draft, submitted, under review, then a decision. A
    /// waitlisted application can still be accepted or rejected.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use ApplicationStatus as S;
        matches!(
            (self, next),
            (S::Draft, S::Draft | S::Submitted)
                | (S::Submitted, S::Submitted | S::UnderReview)
                | (
                    S::UnderReview,
                    S::UnderReview | S::Accepted | S::Rejected | S::Waitlisted
                )
                | (S::Waitlisted, S::Waitlisted | S::Accepted | S::Rejected)
                | (S::Accepted, S::Accepted)
                | (S::Rejected, S::Rejected)
        )
    }

    /// Submitted but not yet decided (counts toward potential funding)
    #[must_use]
    pub const fn is_pending_decision(self) -> bool {
        matches!(self, Self::Submitted | Self::UnderReview | Self::Waitlisted)
    }
}

/// Financial goal category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    #[sea_orm(string_value = "education")]
    Education,
    #[sea_orm(string_value = "living")]
    Living,
    #[sea_orm(string_value = "emergency")]
    Emergency,
    #[sea_orm(string_value = "career")]
    Career,
    #[sea_orm(string_value = "research")]
    Research,
    #[sea_orm(string_value = "travel")]
    Travel,
}

/// Goal priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

/// Goal lifecycle status; only `active` goals feed analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// How a goal's target amount is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Target entered directly
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Target is the sum of the goal's expenses
    #[sea_orm(string_value = "itemized")]
    Itemized,
}

/// Recurrence of a goal expense line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseFrequency {
    #[sea_orm(string_value = "one_time")]
    OneTime,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "semester")]
    Semester,
    #[sea_orm(string_value = "annual")]
    Annual,
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "deadline")]
    Deadline,
    #[sea_orm(string_value = "application_update")]
    ApplicationUpdate,
    #[sea_orm(string_value = "connection")]
    Connection,
    #[sea_orm(string_value = "system")]
    System,
}

/// Kind of relationship between two connected users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRelationship {
    #[sea_orm(string_value = "parent_child")]
    ParentChild,
    #[sea_orm(string_value = "counselor_student")]
    CounselorStudent,
}

/// Connection request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "declined")]
    Declined,
}

display_as_value!(
    UserRole,
    EducationLevel,
    ScholarshipStatus,
    ApplicationStatus,
    GoalType,
    Priority,
    GoalStatus,
    CalculationMethod,
    ExpenseFrequency,
    NotificationKind,
    ConnectionRelationship,
    ConnectionStatus,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_status_moves_forward_only() {
        use ApplicationStatus as S;
        assert!(S::Draft.can_transition_to(S::Submitted));
        assert!(S::Submitted.can_transition_to(S::UnderReview));
        assert!(S::UnderReview.can_transition_to(S::Accepted));
        assert!(S::UnderReview.can_transition_to(S::Waitlisted));
        assert!(S::Waitlisted.can_transition_to(S::Rejected));
        assert!(S::Accepted.can_transition_to(S::Accepted));

        assert!(!S::Submitted.can_transition_to(S::Draft));
        assert!(!S::Draft.can_transition_to(S::Accepted));
        assert!(!S::Accepted.can_transition_to(S::Rejected));
        assert!(!S::Rejected.can_transition_to(S::UnderReview));
    }

    #[test]
    fn test_enums_use_snake_case_everywhere() {
        assert_eq!(ApplicationStatus::UnderReview.to_string(), "under_review");
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::UnderReview).ok(),
            Some("\"under_review\"".to_string())
        );
        let parsed: Option<GoalType> = serde_json::from_str("\"research\"").ok();
        assert_eq!(parsed, Some(GoalType::Research));
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
    }
}
