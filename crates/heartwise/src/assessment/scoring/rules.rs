use super::super::domain::{ActivityLevel, DietQuality, Questionnaire, SweetConsumption};
use super::{RiskRule, ScoreComponent};

const EXERCISE_RECOMMENDATION: &str =
    "Try to incorporate at least 150 minutes of moderate exercise per week.";
const DIET_RECOMMENDATION: &str =
    "Consider improving your diet with more fruits, vegetables, whole grains, and lean proteins.";

/// Street food only counts once it exceeds this many meals per week.
const STREET_FOOD_ALLOWANCE: u32 = 3;

/// Accumulates rule output in evaluation order.
#[derive(Debug, Default)]
pub(crate) struct RuleTally {
    pub score: u32,
    pub risk_factors: Vec<String>,
    pub positive_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub components: Vec<ScoreComponent>,
}

impl RuleTally {
    fn add(&mut self, rule: RiskRule, delta: u32, factor: String) {
        self.score = self.score.saturating_add(delta);
        self.components.push(ScoreComponent {
            rule,
            delta,
            notes: factor.clone(),
        });
        self.risk_factors.push(factor);
    }

    fn recommend(&mut self, text: &str) {
        self.recommendations.push(text.to_string());
    }

    fn positive(&mut self, text: String) {
        self.positive_factors.push(text);
    }
}

/// Applies every questionnaire rule in the fixed order
/// chest pain, sleep, work, activity, diet, street food, gym, sweets, smoking, alcohol.
pub(crate) fn score_questionnaire(questionnaire: &Questionnaire) -> RuleTally {
    let mut tally = RuleTally::default();

    if questionnaire.chest_pain.is_yes() {
        tally.add(
            RiskRule::ChestPain,
            30,
            "Chest pain is a serious symptom that should be evaluated by a healthcare professional immediately.".to_string(),
        );
        tally.recommend("Seek immediate medical attention for your chest pain.");
    }

    let sleep = questionnaire.sleep_hours;
    if sleep < 6 {
        tally.add(
            RiskRule::Sleep,
            10,
            format!("Getting only {sleep} hours of sleep per night can increase heart disease risk."),
        );
        tally.recommend("Aim for 7-9 hours of sleep per night to support heart health.");
    } else if (7..=9).contains(&sleep) {
        tally.positive(format!(
            "Your sleep duration of {sleep} hours is in the healthy range."
        ));
    }

    let work = questionnaire.work_hours;
    if work > 10 {
        tally.add(
            RiskRule::WorkHours,
            5,
            format!(
                "Working {work} hours per day may contribute to stress, which can impact heart health."
            ),
        );
    }

    match questionnaire.activity_level {
        ActivityLevel::Sedentary => {
            tally.add(
                RiskRule::Activity,
                15,
                "A sedentary lifestyle significantly increases heart disease risk.".to_string(),
            );
            tally.recommend(EXERCISE_RECOMMENDATION);
        }
        ActivityLevel::Light => {
            tally.add(
                RiskRule::Activity,
                5,
                "Consider increasing your physical activity for better heart health.".to_string(),
            );
            tally.recommend(EXERCISE_RECOMMENDATION);
        }
        ActivityLevel::Moderate | ActivityLevel::Active => {
            tally.positive("Your physical activity level is good for heart health.".to_string());
        }
    }

    match questionnaire.diet_quality {
        DietQuality::Poor => {
            tally.add(
                RiskRule::Diet,
                20,
                "A poor diet is a major risk factor for heart disease.".to_string(),
            );
            tally.recommend(DIET_RECOMMENDATION);
        }
        DietQuality::Average => {
            tally.add(
                RiskRule::Diet,
                10,
                "Improving your diet could benefit your heart health.".to_string(),
            );
            tally.recommend(DIET_RECOMMENDATION);
        }
        DietQuality::Good | DietQuality::Excellent => {
            tally.positive("Your diet is supporting good heart health.".to_string());
        }
    }

    let street_food = questionnaire.street_food_frequency;
    if street_food > STREET_FOOD_ALLOWANCE {
        tally.add(
            RiskRule::StreetFood,
            street_food.saturating_mul(2),
            format!(
                "Eating street food {street_food} times per week may expose you to unhealthy fats and excess sodium."
            ),
        );
        tally.recommend("Reduce street food consumption and opt for home-cooked meals when possible.");
    }

    if questionnaire.gym.is_yes() {
        tally.positive(
            "Regular gym attendance is beneficial for cardiovascular health.".to_string(),
        );
    }

    match questionnaire.sweet_consumption {
        SweetConsumption::Often | SweetConsumption::VeryOften => {
            tally.add(
                RiskRule::Sweets,
                10,
                "Frequent sweet consumption can contribute to obesity and diabetes risk."
                    .to_string(),
            );
            tally.recommend("Reduce sugar intake to improve heart health.");
        }
        SweetConsumption::Sometimes => {
            tally.add(
                RiskRule::Sweets,
                5,
                "Occasional sweets add a small amount of risk; keep them an occasional treat."
                    .to_string(),
            );
        }
        SweetConsumption::Never | SweetConsumption::Rarely => {}
    }

    if questionnaire.smoke.is_yes() {
        tally.add(
            RiskRule::Smoking,
            25,
            "Smoking is one of the most significant risk factors for heart disease.".to_string(),
        );
        tally.recommend(
            "Quitting smoking is one of the best things you can do for your heart health.",
        );
    }

    if questionnaire.alcohol.is_yes() {
        tally.add(
            RiskRule::Alcohol,
            10,
            "Excessive alcohol consumption can negatively impact heart health.".to_string(),
        );
        tally.recommend(
            "Limit alcohol consumption to moderate levels (1 drink/day for women, 2 for men).",
        );
    }

    tally
}
