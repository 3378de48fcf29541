//! Form field visibility, validation and submission phases.
//!
//! Which fields a form shows depends on a few discrete selections: the
//! registration role, the student's education level, and the goal's
//! calculation method. Each selection maps to a fixed field table, so the
//! client and the server agree on what is required.

use crate::{
    core::{
        goal::NewFinancialGoal,
        user::{NewUser, ProfileUpdate},
    },
    entities::sea_orm_active_enums::{CalculationMethod, EducationLevel, UserRole},
    errors::{Error, FieldErrors, Result},
};
use serde::Serialize;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Highest GPA accepted (weighted scales go to 5.0)
pub const MAX_GPA: f64 = 5.0;

/// A single visible form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// camelCase field name as submitted in JSON
    pub name: &'static str,
    /// Whether the field must be filled in
    pub required: bool,
}

const fn required(name: &'static str) -> FormField {
    FormField {
        name,
        required: true,
    }
}

const fn optional(name: &'static str) -> FormField {
    FormField {
        name,
        required: false,
    }
}

const REGISTRATION_COMMON: &[FormField] = &[
    required("email"),
    required("password"),
    required("firstName"),
    required("lastName"),
    required("role"),
];

const STUDENT_FIELDS: &[FormField] = &[required("educationLevel")];
const COUNSELOR_FIELDS: &[FormField] = &[required("school")];
const NO_FIELDS: &[FormField] = &[];

const HIGH_SCHOOL_FIELDS: &[FormField] = &[
    required("school"),
    required("graduationYear"),
    optional("gpa"),
];
const UNDERGRADUATE_FIELDS: &[FormField] = &[
    required("school"),
    optional("major"),
    required("graduationYear"),
    optional("gpa"),
];
const GRADUATE_FIELDS: &[FormField] = &[
    required("school"),
    required("major"),
    optional("graduationYear"),
];

const GOAL_COMMON: &[FormField] = &[
    required("title"),
    optional("description"),
    required("goalType"),
    required("priority"),
    required("calculationMethod"),
    optional("currentAmount"),
    optional("deadline"),
    optional("educationLevel"),
    optional("institution"),
    optional("state"),
    optional("academicYear"),
    optional("fundingSources"),
];
const GOAL_MANUAL: &[FormField] = &[required("targetAmount")];
const GOAL_ITEMIZED: &[FormField] = &[required("expenses")];

/// Fields added by the selected role
#[must_use]
pub const fn role_fields(role: UserRole) -> &'static [FormField] {
    match role {
        UserRole::Student => STUDENT_FIELDS,
        UserRole::Counselor => COUNSELOR_FIELDS,
        UserRole::Parent | UserRole::Admin => NO_FIELDS,
    }
}

/// Fields added by a student's education level
#[must_use]
pub const fn education_fields(level: EducationLevel) -> &'static [FormField] {
    match level {
        EducationLevel::HighSchool => HIGH_SCHOOL_FIELDS,
        EducationLevel::Undergraduate => UNDERGRADUATE_FIELDS,
        EducationLevel::Graduate | EducationLevel::Doctoral => GRADUATE_FIELDS,
    }
}

/// Full ordered field list for the registration form.
///
/// Education-level fields only apply to students. Counselors keep their own
/// `school` field, and a field never appears twice.
#[must_use]
pub fn registration_fields(
    role: UserRole,
    education_level: Option<EducationLevel>,
) -> Vec<FormField> {
    let mut fields: Vec<FormField> = REGISTRATION_COMMON.to_vec();
    fields.extend_from_slice(role_fields(role));

    if role == UserRole::Student {
        if let Some(level) = education_level {
            for field in education_fields(level) {
                if !fields.iter().any(|f| f.name == field.name) {
                    fields.push(*field);
                }
            }
        }
    }

    fields
}

/// Full ordered field list for the financial goal editor
#[must_use]
pub fn goal_fields(method: CalculationMethod) -> Vec<FormField> {
    let mut fields: Vec<FormField> = GOAL_COMMON.to_vec();
    fields.extend_from_slice(match method {
        CalculationMethod::Manual => GOAL_MANUAL,
        CalculationMethod::Itemized => GOAL_ITEMIZED,
    });
    fields
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn registration_value_present(input: &NewUser, name: &str) -> bool {
    match name {
        "email" => !input.email.trim().is_empty(),
        "password" => !input.password.is_empty(),
        "firstName" => !input.first_name.trim().is_empty(),
        "lastName" => !input.last_name.trim().is_empty(),
        "role" => true,
        "educationLevel" => input.education_level.is_some(),
        "school" => !is_blank(input.school.as_deref()),
        "major" => !is_blank(input.major.as_deref()),
        "graduationYear" => input.graduation_year.is_some(),
        "gpa" => input.gpa.is_some(),
        _ => false,
    }
}

fn check_academic_ranges(
    errors: &mut FieldErrors,
    gpa: Option<f64>,
    graduation_year: Option<i32>,
) {
    if let Some(gpa) = gpa {
        if !gpa.is_finite() || !(0.0..=MAX_GPA).contains(&gpa) {
            errors.insert("gpa".into(), format!("GPA must be between 0.0 and {MAX_GPA:.1}"));
        }
    }
    if let Some(year) = graduation_year {
        if !(1900..=2100).contains(&year) {
            errors.insert(
                "graduationYear".into(),
                "Graduation year must be between 1900 and 2100".into(),
            );
        }
    }
}

fn into_result(errors: FieldErrors, summary: &str) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation {
            message: summary.to_string(),
            fields: errors,
        })
    }
}

/// Validates a registration request against the fields its role makes visible.
pub fn validate_registration(input: &NewUser) -> Result<()> {
    let mut errors = FieldErrors::new();

    for field in registration_fields(input.role, input.education_level) {
        if field.required && !registration_value_present(input, field.name) {
            errors.insert(field.name.to_string(), "This field is required".into());
        }
    }

    if input.role == UserRole::Admin {
        errors.insert(
            "role".into(),
            "Admin accounts cannot be self-registered".into(),
        );
    }

    let email = input.email.trim();
    if !email.is_empty() && !(email.contains('@') && email.contains('.')) {
        errors.insert("email".into(), "Enter a valid email address".into());
    }

    if !input.password.is_empty() && input.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.insert(
            "password".into(),
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }

    check_academic_ranges(&mut errors, input.gpa, input.graduation_year);
    into_result(errors, "Registration form has errors")
}

/// Validates a settings profile update.
pub fn validate_profile(input: &ProfileUpdate) -> Result<()> {
    let mut errors = FieldErrors::new();
    if input.first_name.trim().is_empty() {
        errors.insert("firstName".into(), "This field is required".into());
    }
    if input.last_name.trim().is_empty() {
        errors.insert("lastName".into(), "This field is required".into());
    }
    check_academic_ranges(&mut errors, input.gpa, input.graduation_year);
    into_result(errors, "Profile form has errors")
}

/// Validates a new password against the length rule.
pub fn validate_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::field(
            "newPassword",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn check_amount(errors: &mut FieldErrors, key: String, amount: f64) {
    if !amount.is_finite() || amount < 0.0 {
        errors.insert(key, "Amount must be a non-negative number".into());
    }
}

/// Validates a financial goal submission for its calculation method.
pub fn validate_goal(input: &NewFinancialGoal) -> Result<()> {
    let mut errors = FieldErrors::new();

    if input.title.trim().is_empty() {
        errors.insert("title".into(), "This field is required".into());
    }

    check_amount(&mut errors, "currentAmount".into(), input.current_amount);

    match input.calculation_method {
        CalculationMethod::Manual => match input.target_amount {
            None => {
                errors.insert("targetAmount".into(), "This field is required".into());
            }
            Some(target) if !target.is_finite() || target <= 0.0 => {
                errors.insert(
                    "targetAmount".into(),
                    "Target amount must be greater than zero".into(),
                );
            }
            Some(_) => {}
        },
        CalculationMethod::Itemized => {
            if input.expenses.is_empty() {
                errors.insert(
                    "expenses".into(),
                    "Add at least one expense for an itemized goal".into(),
                );
            }
        }
    }

    for (i, expense) in input.expenses.iter().enumerate() {
        if expense.name.trim().is_empty() {
            errors.insert(format!("expenses[{i}].name"), "This field is required".into());
        }
        check_amount(&mut errors, format!("expenses[{i}].amount"), expense.amount);
    }

    for (i, source) in input.funding_sources.iter().enumerate() {
        if source.name.trim().is_empty() {
            errors.insert(
                format!("fundingSources[{i}].name"),
                "This field is required".into(),
            );
        }
        if source.source_type.trim().is_empty() {
            errors.insert(
                format!("fundingSources[{i}].sourceType"),
                "This field is required".into(),
            );
        }
        check_amount(
            &mut errors,
            format!("fundingSources[{i}].amount"),
            source.amount,
        );
        if !(0..=100).contains(&source.probability) {
            errors.insert(
                format!("fundingSources[{i}].probability"),
                "Probability must be between 0 and 100".into(),
            );
        }
    }

    into_result(errors, "Financial goal form has errors")
}

/// Submission phase of a form.
///
/// `Editing -> Submitting -> Success | Error`, and back to `Editing` after
/// either outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
pub enum FormPhase {
    /// User is changing fields
    #[default]
    Editing,
    /// One request is outstanding
    Submitting,
    /// The last submission succeeded
    Success,
    /// The last submission failed with a banner message
    Error(String),
}

impl FormPhase {
    /// Starts a submission. Only valid while editing, so a second request cannot
    /// be sent while one is outstanding.
    pub fn submit(&self) -> Result<Self> {
        match self {
            Self::Editing => Ok(Self::Submitting),
            other => Err(Error::InvalidTransition {
                message: format!("cannot submit while {}", other.label()),
            }),
        }
    }

    /// Records the outcome of the outstanding submission.
    pub fn resolve<T, E: std::fmt::Display>(
        &self,
        outcome: &std::result::Result<T, E>,
    ) -> Result<Self> {
        match self {
            Self::Submitting => Ok(match outcome {
                Ok(_) => Self::Success,
                Err(e) => Self::Error(e.to_string()),
            }),
            other => Err(Error::InvalidTransition {
                message: format!("cannot resolve while {}", other.label()),
            }),
        }
    }

    /// Returns to editing. Allowed from any phase except `Submitting`.
    pub fn edit(&self) -> Result<Self> {
        match self {
            Self::Submitting => Err(Error::InvalidTransition {
                message: "cannot edit while submitting".into(),
            }),
            _ => Ok(Self::Editing),
        }
    }

    /// Whether the UI should show its pending indicator
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Success => "succeeded",
            Self::Error(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::goal::{NewFundingSource, NewGoalExpense};
    use crate::entities::sea_orm_active_enums::{ExpenseFrequency, GoalType, Priority};

    fn names(fields: &[FormField]) -> Vec<&'static str> {
        fields.iter().map(|f| f.name).collect()
    }

    fn student(level: Option<EducationLevel>) -> NewUser {
        NewUser {
            email: "sam@example.com".into(),
            password: "long-enough".into(),
            first_name: "Sam".into(),
            last_name: "Lee".into(),
            role: UserRole::Student,
            education_level: level,
            gpa: Some(3.8),
            school: Some("Central High".into()),
            major: None,
            graduation_year: Some(2027),
        }
    }

    fn manual_goal(target: Option<f64>) -> NewFinancialGoal {
        NewFinancialGoal {
            title: "College fund".into(),
            description: None,
            goal_type: GoalType::Education,
            target_amount: target,
            current_amount: 0.0,
            deadline: None,
            priority: Priority::High,
            calculation_method: CalculationMethod::Manual,
            education_level: None,
            institution: None,
            state: None,
            academic_year: None,
            expenses: vec![],
            funding_sources: vec![],
        }
    }

    #[test]
    fn test_registration_fields_by_role() {
        let parent = registration_fields(UserRole::Parent, None);
        assert_eq!(
            names(&parent),
            vec!["email", "password", "firstName", "lastName", "role"]
        );

        let counselor = registration_fields(UserRole::Counselor, Some(EducationLevel::Graduate));
        assert!(names(&counselor).contains(&"school"));
        assert!(!names(&counselor).contains(&"major"));

        let undergrad = registration_fields(UserRole::Student, Some(EducationLevel::Undergraduate));
        assert_eq!(
            names(&undergrad)[5..],
            ["educationLevel", "school", "major", "graduationYear", "gpa"]
        );
    }

    #[test]
    fn test_graduate_students_must_give_major() {
        let fields = registration_fields(UserRole::Student, Some(EducationLevel::Doctoral));
        let major = fields.iter().find(|f| f.name == "major").unwrap();
        assert!(major.required);
    }

    #[test]
    fn test_validate_registration_accepts_complete_student() {
        assert!(validate_registration(&student(Some(EducationLevel::HighSchool))).is_ok());
    }

    #[test]
    fn test_validate_registration_reports_each_field() {
        let mut input = student(Some(EducationLevel::Graduate));
        input.email = "not-an-email".into();
        input.password = "short".into();
        input.gpa = Some(7.0);

        let Err(Error::Validation { fields, .. }) = validate_registration(&input) else {
            panic!("expected validation error");
        };
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("gpa"));
        assert!(fields.contains_key("major"));
    }

    #[test]
    fn test_validate_registration_requires_education_level_for_students() {
        let Err(Error::Validation { fields, .. }) = validate_registration(&student(None)) else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("educationLevel"));
    }

    #[test]
    fn test_admin_cannot_self_register() {
        let mut input = student(None);
        input.role = UserRole::Admin;
        let Err(Error::Validation { fields, .. }) = validate_registration(&input) else {
            panic!("expected validation error");
        };
        assert!(fields.contains_key("role"));
    }

    #[test]
    fn test_goal_fields_follow_calculation_method() {
        assert!(names(&goal_fields(CalculationMethod::Manual)).contains(&"targetAmount"));
        assert!(!names(&goal_fields(CalculationMethod::Manual)).contains(&"expenses"));
        assert!(names(&goal_fields(CalculationMethod::Itemized)).contains(&"expenses"));
        assert!(!names(&goal_fields(CalculationMethod::Itemized)).contains(&"targetAmount"));
    }

    #[test]
    fn test_validate_goal() {
        assert!(validate_goal(&manual_goal(Some(10_000.0))).is_ok());
        assert!(validate_goal(&manual_goal(None)).is_err());
        assert!(validate_goal(&manual_goal(Some(0.0))).is_err());

        let mut itemized = manual_goal(None);
        itemized.calculation_method = CalculationMethod::Itemized;
        assert!(validate_goal(&itemized).is_err());

        itemized.expenses.push(NewGoalExpense {
            name: "Tuition".into(),
            amount: 9000.0,
            frequency: ExpenseFrequency::Annual,
        });
        itemized.funding_sources.push(NewFundingSource {
            name: "Grant".into(),
            source_type: "federal_pell_grant".into(),
            amount: 4000.0,
            probability: 150,
            is_confirmed: false,
        });
        let Err(Error::Validation { fields, .. }) = validate_goal(&itemized) else {
            panic!("expected validation error");
        };
        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            vec!["fundingSources[0].probability"]
        );
    }

    #[test]
    fn test_form_phase_cycle() {
        let phase = FormPhase::default();
        let phase = phase.submit().unwrap();
        assert!(phase.is_pending());
        assert!(phase.submit().is_err());
        assert!(phase.edit().is_err());

        let failed = phase.resolve::<(), _>(&Err("Network error")).unwrap();
        assert_eq!(failed, FormPhase::Error("Network error".into()));
        assert!(failed.submit().is_err());

        let phase = failed.edit().unwrap().submit().unwrap();
        let done = phase.resolve::<_, String>(&Ok(())).unwrap();
        assert_eq!(done, FormPhase::Success);
        assert!(done.resolve::<_, String>(&Ok(())).is_err());
        assert_eq!(done.edit().unwrap(), FormPhase::Editing);
    }
}
