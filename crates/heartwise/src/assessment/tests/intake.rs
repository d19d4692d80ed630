use super::common::*;
use crate::assessment::domain::{ActivityLevel, Answer, SweetConsumption};
use crate::assessment::intake::{FieldValue, IntakeGuard, QuestionnaireSubmission, ValidationError};
use serde_json::json;

fn guard() -> IntakeGuard {
    IntakeGuard::new()
}

#[test]
fn accepts_form_strings_and_json_numbers() {
    let submission: QuestionnaireSubmission = serde_json::from_value(json!({
        "chestPain": "no",
        "sleepHours": "5",
        "workHours": 12,
        "activityLevel": "sedentary",
        "dietQuality": "poor",
        "currentWeight": "98.5",
        "streetFood": "5",
        "gym": "no",
        "sweetConsumption": "very_often",
        "smoke": "yes",
        "alcohol": "Yes",
    }))
    .expect("submission parses");

    let questionnaire = guard()
        .questionnaire_from_submission(submission)
        .expect("valid questionnaire");

    assert_eq!(questionnaire.sleep_hours, 5);
    assert_eq!(questionnaire.work_hours, 12);
    assert_eq!(questionnaire.activity_level, ActivityLevel::Sedentary);
    assert_eq!(questionnaire.current_weight, 98.5);
    assert_eq!(questionnaire.street_food_frequency, 5);
    assert_eq!(questionnaire.sweet_consumption, SweetConsumption::VeryOften);
    assert_eq!(questionnaire.alcohol, Answer::Yes);
}

#[test]
fn street_food_frequency_alias_is_accepted() {
    let submission: QuestionnaireSubmission = serde_json::from_value(json!({
        "streetFoodFrequency": 7,
    }))
    .expect("submission parses");

    assert_eq!(submission.street_food_frequency, Some(FieldValue::Integer(7)));
}

#[test]
fn converting_back_from_a_questionnaire_validates_cleanly() {
    let questionnaire = high_risk_questionnaire();

    let parsed = guard()
        .questionnaire_from_submission(submission(&questionnaire))
        .expect("valid questionnaire");

    assert_eq!(parsed, questionnaire);
}

#[test]
fn missing_sweet_consumption_defaults_to_never() {
    let mut raw = submission(&neutral_questionnaire());
    raw.sweet_consumption = None;

    let questionnaire = guard()
        .questionnaire_from_submission(raw)
        .expect("valid questionnaire");

    assert_eq!(questionnaire.sweet_consumption, SweetConsumption::Never);
}

#[test]
fn rare_is_read_as_rarely() {
    let mut raw = submission(&neutral_questionnaire());
    raw.sweet_consumption = Some("rare".into());

    let questionnaire = guard()
        .questionnaire_from_submission(raw)
        .expect("valid questionnaire");

    assert_eq!(questionnaire.sweet_consumption, SweetConsumption::Rarely);
}

#[test]
fn missing_required_fields_are_rejected() {
    let mut raw = submission(&neutral_questionnaire());
    raw.smoke = None;
    assert_eq!(
        guard().questionnaire_from_submission(raw),
        Err(ValidationError::Missing { field: "smoke" })
    );

    let mut raw = submission(&neutral_questionnaire());
    raw.sleep_hours = Some("   ".into());
    assert_eq!(
        guard().questionnaire_from_submission(raw),
        Err(ValidationError::Missing {
            field: "sleepHours"
        })
    );
}

#[test]
fn malformed_numbers_are_rejected_instead_of_zeroed() {
    let mut raw = submission(&neutral_questionnaire());
    raw.work_hours = Some("lots".into());
    match guard().questionnaire_from_submission(raw) {
        Err(ValidationError::NotANumber { field, value }) => {
            assert_eq!(field, "workHours");
            assert_eq!(value, "lots");
        }
        other => panic!("expected not-a-number, got {other:?}"),
    }
}

#[test]
fn negative_and_fractional_counts_are_rejected() {
    let mut raw = submission(&neutral_questionnaire());
    raw.street_food_frequency = Some(FieldValue::Integer(-2));
    assert!(matches!(
        guard().questionnaire_from_submission(raw),
        Err(ValidationError::Negative {
            field: "streetFood",
            ..
        })
    ));

    let mut raw = submission(&neutral_questionnaire());
    raw.sleep_hours = Some(FieldValue::Decimal(6.5));
    assert!(matches!(
        guard().questionnaire_from_submission(raw),
        Err(ValidationError::NotWhole {
            field: "sleepHours",
            ..
        })
    ));

    let mut raw = submission(&neutral_questionnaire());
    raw.current_weight = Some(FieldValue::Decimal(-70.0));
    assert!(matches!(
        guard().questionnaire_from_submission(raw),
        Err(ValidationError::Negative {
            field: "currentWeight",
            ..
        })
    ));
}

#[test]
fn hours_cannot_exceed_a_day() {
    let mut raw = submission(&neutral_questionnaire());
    raw.work_hours = Some(FieldValue::Integer(25));

    assert_eq!(
        guard().questionnaire_from_submission(raw),
        Err(ValidationError::OutOfRange {
            field: "workHours",
            value: 25,
            max: 24,
        })
    );
}

#[test]
fn unknown_choices_are_rejected() {
    let mut raw = submission(&neutral_questionnaire());
    raw.diet_quality = Some("amazing".into());

    let error = guard()
        .questionnaire_from_submission(raw)
        .expect_err("invalid choice");

    assert_eq!(error.field(), "dietQuality");
    assert_eq!(
        error.to_string(),
        "dietQuality must be one of poor, average, good, excellent (got 'amazing')"
    );
}
