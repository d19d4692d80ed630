use super::common::*;
use crate::assessment::domain::{
    ActivityLevel, Answer, DietQuality, ProfileAttributes, Questionnaire, SweetConsumption,
};
use crate::assessment::scoring::{RiskClass, RiskEngine, RiskLevel, RiskRule};

#[test]
fn high_risk_lifestyle_scores_one_hundred_and_five() {
    let result = RiskEngine::new().score(&high_risk_questionnaire());

    assert_eq!(result.risk_score, 105);
    assert_eq!(result.risk_level, RiskLevel::High);
    assert_eq!(result.risk_class, RiskClass::High);
    let rules: Vec<RiskRule> = result.components.iter().map(|c| c.rule).collect();
    assert_eq!(
        rules,
        vec![
            RiskRule::Sleep,
            RiskRule::WorkHours,
            RiskRule::Activity,
            RiskRule::Diet,
            RiskRule::StreetFood,
            RiskRule::Sweets,
            RiskRule::Smoking,
            RiskRule::Alcohol,
        ]
    );
    let deltas: u32 = result.components.iter().map(|c| c.delta).sum();
    assert_eq!(deltas, result.risk_score);
}

#[test]
fn healthy_lifestyle_scores_zero_with_positive_feedback() {
    let result = RiskEngine::new().score(&healthy_questionnaire());

    assert_eq!(result.risk_score, 0);
    assert_eq!(result.risk_level, RiskLevel::VeryLow);
    assert_eq!(result.risk_class, RiskClass::Info);
    assert!(result.risk_factors.is_empty());
    assert!(result.recommendations.is_empty());
    assert_eq!(
        result.positive_factors,
        vec![
            "Your sleep duration of 8 hours is in the healthy range.".to_string(),
            "Your physical activity level is good for heart health.".to_string(),
            "Your diet is supporting good heart health.".to_string(),
            "Regular gym attendance is beneficial for cardiovascular health.".to_string(),
        ]
    );
}

#[test]
fn scoring_is_deterministic() {
    let engine = RiskEngine::new();
    let questionnaire = high_risk_questionnaire();

    assert_eq!(engine.score(&questionnaire), engine.score(&questionnaire));
}

#[test]
fn risk_factors_follow_rule_order() {
    let mut questionnaire = neutral_questionnaire();
    questionnaire.alcohol = Answer::Yes;
    questionnaire.smoke = Answer::Yes;
    questionnaire.chest_pain = Answer::Yes;

    let result = RiskEngine::new().score(&questionnaire);

    assert_eq!(result.risk_score, 65);
    assert_eq!(
        result.risk_factors,
        vec![
            "Chest pain is a serious symptom that should be evaluated by a healthcare professional immediately.".to_string(),
            "Smoking is one of the most significant risk factors for heart disease.".to_string(),
            "Excessive alcohol consumption can negatively impact heart health.".to_string(),
        ]
    );
    assert_eq!(
        result.recommendations.first().map(String::as_str),
        Some("Seek immediate medical attention for your chest pain.")
    );
}

#[test]
fn toggling_smoking_moves_score_by_exactly_its_weight() {
    let engine = RiskEngine::new();
    let smoker = high_risk_questionnaire();
    let mut quitter = smoker.clone();
    quitter.smoke = Answer::No;

    let delta = engine.score(&smoker).risk_score - engine.score(&quitter).risk_score;
    assert_eq!(delta, 25);
}

#[test]
fn each_rule_contributes_independently() {
    let engine = RiskEngine::new();
    let baseline = engine.score(&neutral_questionnaire()).risk_score;
    assert_eq!(baseline, 0);

    let cases: [(fn(&mut Questionnaire), u32); 19] = [
        (|q: &mut Questionnaire| q.chest_pain = Answer::Yes, 30),
        (|q: &mut Questionnaire| q.sleep_hours = 5, 10),
        (|q: &mut Questionnaire| q.sleep_hours = 6, 0),
        (|q: &mut Questionnaire| q.sleep_hours = 10, 0),
        (|q: &mut Questionnaire| q.work_hours = 10, 0),
        (|q: &mut Questionnaire| q.work_hours = 11, 5),
        (|q: &mut Questionnaire| q.activity_level = ActivityLevel::Sedentary, 15),
        (|q: &mut Questionnaire| q.activity_level = ActivityLevel::Light, 5),
        (|q: &mut Questionnaire| q.activity_level = ActivityLevel::Active, 0),
        (|q: &mut Questionnaire| q.diet_quality = DietQuality::Poor, 20),
        (|q: &mut Questionnaire| q.diet_quality = DietQuality::Average, 10),
        (|q: &mut Questionnaire| q.gym = Answer::Yes, 0),
        (|q: &mut Questionnaire| q.sweet_consumption = SweetConsumption::Rarely, 0),
        (|q: &mut Questionnaire| q.sweet_consumption = SweetConsumption::Sometimes, 5),
        (|q: &mut Questionnaire| q.sweet_consumption = SweetConsumption::Often, 10),
        (|q: &mut Questionnaire| q.sweet_consumption = SweetConsumption::VeryOften, 10),
        (|q: &mut Questionnaire| q.smoke = Answer::Yes, 25),
        (|q: &mut Questionnaire| q.alcohol = Answer::Yes, 10),
        (|q: &mut Questionnaire| q.current_weight = 140.0, 0),
    ];

    for (index, (mutate, expected)) in cases.into_iter().enumerate() {
        let mut questionnaire = neutral_questionnaire();
        mutate(&mut questionnaire);
        let result = engine.score(&questionnaire);
        assert_eq!(result.risk_score, expected, "case {index}");
        assert_eq!(
            result.risk_factors.len(),
            usize::from(expected > 0),
            "case {index} risk factor count"
        );
    }
}

#[test]
fn street_food_counts_only_above_three_meals() {
    let engine = RiskEngine::new();

    for (frequency, expected) in [(0, 0), (3, 0), (4, 8), (10, 20)] {
        let mut questionnaire = neutral_questionnaire();
        questionnaire.street_food_frequency = frequency;
        assert_eq!(
            engine.score(&questionnaire).risk_score,
            expected,
            "frequency {frequency}"
        );
    }
}

#[test]
fn profile_phase_keeps_base_result_intact() {
    let engine = RiskEngine::new();
    let base = engine.score(&neutral_questionnaire());
    let profile = ProfileAttributes {
        age: Some(61),
        diabetes: true,
        family_history: true,
        ..ProfileAttributes::default()
    };

    let adjusted = engine.adjust_for_profile(base.clone(), Some(&profile));

    assert_eq!(adjusted.base, base);
    assert!(adjusted.profile_found);
    assert_eq!(adjusted.adjusted_score, 40);
    assert_eq!(adjusted.profile_delta(), 40);
    assert_eq!(adjusted.adjusted_level, RiskLevel::Medium);
    assert_eq!(adjusted.adjusted_class, RiskClass::Medium);
    let rules: Vec<RiskRule> = adjusted.profile_components.iter().map(|c| c.rule).collect();
    assert_eq!(
        rules,
        vec![RiskRule::Diabetes, RiskRule::FamilyHistory, RiskRule::Age]
    );
}

#[test]
fn age_bands_do_not_overlap() {
    let engine = RiskEngine::new();

    for (age, expected) in [(30, 0), (45, 0), (46, 5), (60, 5), (61, 10), (85, 10)] {
        let profile = ProfileAttributes {
            age: Some(age),
            ..ProfileAttributes::default()
        };
        let adjusted =
            engine.adjust_for_profile(engine.score(&neutral_questionnaire()), Some(&profile));
        assert_eq!(adjusted.profile_delta(), expected, "age {age}");
    }
}

#[test]
fn missing_profile_leaves_score_unadjusted() {
    let engine = RiskEngine::new();
    let base = engine.score(&high_risk_questionnaire());

    let adjusted = engine.adjust_for_profile(base, None);

    assert!(!adjusted.profile_found);
    assert!(adjusted.profile_components.is_empty());
    assert_eq!(adjusted.adjusted_score, 105);
    assert_eq!(adjusted.adjusted_level, RiskLevel::High);
}

#[test]
fn profile_delta_is_zero_when_adjusted_score_is_below_base() {
    let engine = RiskEngine::new();
    let mut adjusted = engine.adjust_for_profile(engine.score(&high_risk_questionnaire()), None);
    adjusted.adjusted_score = 40;

    assert_eq!(adjusted.profile_delta(), 0);
}
