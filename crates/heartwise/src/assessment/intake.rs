use serde::{Deserialize, Serialize};

use super::domain::{ActivityLevel, Answer, DietQuality, Questionnaire, SweetConsumption};

/// Form values arrive either as JSON numbers or as the strings an HTML form posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

/// Raw questionnaire as submitted, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionnaireSubmission {
    pub chest_pain: Option<FieldValue>,
    pub sleep_hours: Option<FieldValue>,
    pub work_hours: Option<FieldValue>,
    pub activity_level: Option<FieldValue>,
    pub diet_quality: Option<FieldValue>,
    pub current_weight: Option<FieldValue>,
    #[serde(rename = "streetFood", alias = "streetFoodFrequency")]
    pub street_food_frequency: Option<FieldValue>,
    pub gym: Option<FieldValue>,
    pub sweet_consumption: Option<FieldValue>,
    pub smoke: Option<FieldValue>,
    pub alcohol: Option<FieldValue>,
}

impl From<&Questionnaire> for QuestionnaireSubmission {
    fn from(questionnaire: &Questionnaire) -> Self {
        Self {
            chest_pain: Some(answer_value(questionnaire.chest_pain)),
            sleep_hours: Some(FieldValue::Integer(questionnaire.sleep_hours.into())),
            work_hours: Some(FieldValue::Integer(questionnaire.work_hours.into())),
            activity_level: Some(questionnaire.activity_level.label().into()),
            diet_quality: Some(questionnaire.diet_quality.label().into()),
            current_weight: Some(FieldValue::Decimal(questionnaire.current_weight)),
            street_food_frequency: Some(FieldValue::Integer(
                questionnaire.street_food_frequency.into(),
            )),
            gym: Some(answer_value(questionnaire.gym)),
            sweet_consumption: Some(questionnaire.sweet_consumption.label().into()),
            smoke: Some(answer_value(questionnaire.smoke)),
            alcohol: Some(answer_value(questionnaire.alcohol)),
        }
    }
}

fn answer_value(answer: Answer) -> FieldValue {
    FieldValue::Text(answer.label().to_ascii_lowercase())
}

/// Rejections raised before a questionnaire reaches the scorer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a number (got '{value}')")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be a whole number (got {value})")]
    NotWhole { field: &'static str, value: f64 },
    #[error("{field} cannot be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be at most {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        max: u32,
    },
    #[error("{field} must be one of {expected} (got '{value}')")]
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::NotWhole { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidChoice { field, .. } => field,
        }
    }
}

const HOURS_PER_DAY: u32 = 24;

/// Boundary check turning loosely-typed submissions into questionnaires.
///
/// Negative counts, fractional hours and unknown choices are rejected rather
/// than silently treated as zero.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn questionnaire_from_submission(
        &self,
        submission: QuestionnaireSubmission,
    ) -> Result<Questionnaire, ValidationError> {
        let chest_pain = answer("chestPain", submission.chest_pain)?;
        let sleep_hours = hours("sleepHours", submission.sleep_hours)?;
        let work_hours = hours("workHours", submission.work_hours)?;
        let activity_level = choice(
            "activityLevel",
            submission.activity_level,
            "sedentary, light, moderate, active",
            ActivityLevel::parse,
        )?;
        let diet_quality = choice(
            "dietQuality",
            submission.diet_quality,
            "poor, average, good, excellent",
            DietQuality::parse,
        )?;
        let current_weight = weight("currentWeight", submission.current_weight)?;
        let street_food_frequency = count("streetFood", submission.street_food_frequency)?;
        let gym = answer("gym", submission.gym)?;
        let sweet_consumption = match submission.sweet_consumption {
            None => SweetConsumption::default(),
            Some(FieldValue::Text(raw)) if raw.trim().is_empty() => SweetConsumption::default(),
            value => choice(
                "sweetConsumption",
                value,
                "never, rarely, sometimes, often, very_often",
                SweetConsumption::parse,
            )?,
        };
        let smoke = answer("smoke", submission.smoke)?;
        let alcohol = answer("alcohol", submission.alcohol)?;

        Ok(Questionnaire {
            chest_pain,
            sleep_hours,
            work_hours,
            activity_level,
            diet_quality,
            current_weight,
            street_food_frequency,
            gym,
            sweet_consumption,
            smoke,
            alcohol,
        })
    }
}

fn required(field: &'static str, value: Option<FieldValue>) -> Result<FieldValue, ValidationError> {
    match value {
        None => Err(ValidationError::Missing { field }),
        Some(FieldValue::Text(raw)) if raw.trim().is_empty() => {
            Err(ValidationError::Missing { field })
        }
        Some(value) => Ok(value),
    }
}

fn number(field: &'static str, value: Option<FieldValue>) -> Result<f64, ValidationError> {
    match required(field, value)? {
        FieldValue::Integer(number) => Ok(number as f64),
        FieldValue::Decimal(number) if number.is_finite() => Ok(number),
        FieldValue::Decimal(number) => Err(ValidationError::NotANumber {
            field,
            value: number.to_string(),
        }),
        FieldValue::Text(raw) => match raw.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(number),
            _ => Err(ValidationError::NotANumber { field, value: raw }),
        },
    }
}

fn count(field: &'static str, value: Option<FieldValue>) -> Result<u32, ValidationError> {
    let number = number(field, value)?;
    if number < 0.0 {
        return Err(ValidationError::Negative {
            field,
            value: number,
        });
    }
    if number.fract() != 0.0 {
        return Err(ValidationError::NotWhole {
            field,
            value: number,
        });
    }
    if number > u32::MAX as f64 {
        return Err(ValidationError::OutOfRange {
            field,
            value: number as i64,
            max: u32::MAX,
        });
    }
    Ok(number as u32)
}

fn hours(field: &'static str, value: Option<FieldValue>) -> Result<u32, ValidationError> {
    let hours = count(field, value)?;
    if hours > HOURS_PER_DAY {
        return Err(ValidationError::OutOfRange {
            field,
            value: i64::from(hours),
            max: HOURS_PER_DAY,
        });
    }
    Ok(hours)
}

fn weight(field: &'static str, value: Option<FieldValue>) -> Result<f64, ValidationError> {
    let kilograms = number(field, value)?;
    if kilograms < 0.0 {
        return Err(ValidationError::Negative {
            field,
            value: kilograms,
        });
    }
    Ok(kilograms)
}

fn answer(field: &'static str, value: Option<FieldValue>) -> Result<Answer, ValidationError> {
    choice(field, value, "yes, no", Answer::parse)
}

fn choice<T>(
    field: &'static str,
    value: Option<FieldValue>,
    expected: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, ValidationError> {
    let raw = match required(field, value)? {
        FieldValue::Text(raw) => raw,
        FieldValue::Integer(number) => number.to_string(),
        FieldValue::Decimal(number) => number.to_string(),
    };

    parse(&raw).ok_or(ValidationError::InvalidChoice {
        field,
        value: raw,
        expected,
    })
}
