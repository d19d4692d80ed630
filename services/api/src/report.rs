use clap::Args;
use heartwise::assessment::{
    AssessmentError, FieldValue, IntakeGuard, ProfileAdjustedAssessment, ProfileAttributes,
    QuestionnaireSubmission, RiskEngine,
};
use heartwise::error::AppError;

pub(crate) const DISCLAIMER: &str = "This assessment is for informational purposes only and is not a substitute for professional medical advice.";

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Chest pain or discomfort (yes/no)
    #[arg(long)]
    pub(crate) chest_pain: String,
    /// Average hours of sleep per night
    #[arg(long)]
    pub(crate) sleep_hours: String,
    /// Average hours worked per day
    #[arg(long)]
    pub(crate) work_hours: String,
    /// sedentary, light, moderate or active
    #[arg(long)]
    pub(crate) activity_level: String,
    /// poor, average, good or excellent
    #[arg(long)]
    pub(crate) diet_quality: String,
    /// Weight in kilograms
    #[arg(long)]
    pub(crate) current_weight: String,
    /// Street food meals per week
    #[arg(long)]
    pub(crate) street_food: String,
    /// Regular gym attendance (yes/no)
    #[arg(long)]
    pub(crate) gym: String,
    /// never, rarely, sometimes, often or very_often
    #[arg(long)]
    pub(crate) sweet_consumption: Option<String>,
    /// Smoker (yes/no)
    #[arg(long)]
    pub(crate) smoke: String,
    /// Regular alcohol consumption (yes/no)
    #[arg(long)]
    pub(crate) alcohol: String,
    /// Age in years, applied as a profile adjustment
    #[arg(long)]
    pub(crate) age: Option<u32>,
    #[arg(long)]
    pub(crate) diabetes: bool,
    #[arg(long)]
    pub(crate) kidney_disease: bool,
    #[arg(long)]
    pub(crate) family_history: bool,
    #[arg(long)]
    pub(crate) heart_condition: bool,
    /// Print the assessment as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

impl AssessArgs {
    fn submission(&self) -> QuestionnaireSubmission {
        QuestionnaireSubmission {
            chest_pain: text(&self.chest_pain),
            sleep_hours: text(&self.sleep_hours),
            work_hours: text(&self.work_hours),
            activity_level: text(&self.activity_level),
            diet_quality: text(&self.diet_quality),
            current_weight: text(&self.current_weight),
            street_food_frequency: text(&self.street_food),
            gym: text(&self.gym),
            sweet_consumption: self.sweet_consumption.as_deref().and_then(text),
            smoke: text(&self.smoke),
            alcohol: text(&self.alcohol),
        }
    }

    fn profile(&self) -> Option<ProfileAttributes> {
        let profile = ProfileAttributes {
            age: self.age,
            diabetes: self.diabetes,
            kidney_disease: self.kidney_disease,
            family_history: self.family_history,
            heart_condition: self.heart_condition,
            ..ProfileAttributes::default()
        };
        (profile != ProfileAttributes::default()).then_some(profile)
    }
}

fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::from(value))
}

pub(crate) fn assess(args: &AssessArgs) -> Result<ProfileAdjustedAssessment, AssessmentError> {
    let questionnaire = IntakeGuard::new().questionnaire_from_submission(args.submission())?;
    let engine = RiskEngine::new();
    let base = engine.score(&questionnaire);
    Ok(engine.adjust_for_profile(base, args.profile().as_ref()))
}

pub(crate) fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let assessment = assess(&args)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&assessment).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_assessment_report(&assessment));
    }

    Ok(())
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(title.to_string());
    lines.extend(items.iter().map(|item| format!("- {item}")));
}

pub(crate) fn render_assessment_report(assessment: &ProfileAdjustedAssessment) -> String {
    let base = &assessment.base;
    let mut lines = vec![
        "Heart health assessment".to_string(),
        format!(
            "Risk Score: {} ({})",
            base.risk_score,
            base.risk_level.label()
        ),
    ];
    if assessment.profile_found {
        lines.push(format!(
            "Profile-adjusted score: {} ({}), +{} from profile",
            assessment.adjusted_score,
            assessment.adjusted_level.label(),
            assessment.profile_delta()
        ));
    }

    push_section(&mut lines, "Risk factors", &base.risk_factors);
    push_section(&mut lines, "Positive factors", &base.positive_factors);
    push_section(&mut lines, "Recommendations", &base.recommendations);
    let profile_notes: Vec<String> = assessment
        .profile_components
        .iter()
        .map(|component| format!("+{} {}", component.delta, component.notes))
        .collect();
    push_section(&mut lines, "Profile adjustments", &profile_notes);

    lines.push(String::new());
    lines.push(DISCLAIMER.to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
