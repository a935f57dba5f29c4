use crate::domain::profile::ClientProfile;
use crate::domain::risk::{RiskAssessment, RiskFactor, RiskLevel};

// Scores are accumulated in hundredths so threshold comparisons are exact.
const BASELINE_POINTS: i32 = 50;
const MAX_POINTS: i32 = 100;

const SENIOR_AGE_THRESHOLD: u32 = 60;
const YOUNG_AGE_THRESHOLD: u32 = 25;
const LOW_INCOME_THRESHOLD: f64 = 20_000.0;

pub trait RiskEngine: Send + Sync {
    fn assess(&self, profile: &ClientProfile) -> RiskAssessment;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicRiskEngine;

impl RiskEngine for DeterministicRiskEngine {
    fn assess(&self, profile: &ClientProfile) -> RiskAssessment {
        assess_profile(profile)
    }
}

struct Adjustment {
    points: i32,
    factor: RiskFactor,
}

impl Adjustment {
    fn new(points: i32, name: &str, impact: RiskLevel, description: &str) -> Self {
        Self {
            points,
            factor: RiskFactor {
                name: name.to_string(),
                impact,
                description: description.to_string(),
            },
        }
    }
}

type Rule = fn(&ClientProfile) -> Option<Adjustment>;

/// Evaluation order; it only affects how factors are listed.
const RULES: [Rule; 4] = [age_rule, income_rule, medical_history_rule, lifestyle_rule];

pub fn assess_profile(profile: &ClientProfile) -> RiskAssessment {
    let mut points = BASELINE_POINTS;
    let mut factors = Vec::new();

    for adjustment in RULES.iter().filter_map(|rule| rule(profile)) {
        points += adjustment.points;
        factors.push(adjustment.factor);
    }

    let score_value = f64::from(points.clamp(0, MAX_POINTS)) / 100.0;
    let score = RiskLevel::from_score_value(score_value);
    let explanation = explain(score, &factors);

    RiskAssessment { score, score_value, factors, explanation }
}

fn explain(score: RiskLevel, factors: &[RiskFactor]) -> String {
    let names = factors.iter().map(|factor| factor.name.as_str()).collect::<Vec<_>>();
    format!(
        "Risk assessment concluded with a {score} risk level due to factors: {}",
        names.join(", ")
    )
}

fn age_rule(profile: &ClientProfile) -> Option<Adjustment> {
    if profile.age > SENIOR_AGE_THRESHOLD {
        Some(Adjustment::new(
            20,
            "Age",
            RiskLevel::High,
            "Client is over 60, increasing health risk.",
        ))
    } else if profile.age < YOUNG_AGE_THRESHOLD {
        Some(Adjustment::new(
            10,
            "Age",
            RiskLevel::Medium,
            "Young client, potentially higher risk for certain insurance types.",
        ))
    } else {
        None
    }
}

fn income_rule(profile: &ClientProfile) -> Option<Adjustment> {
    (profile.income < LOW_INCOME_THRESHOLD).then(|| {
        Adjustment::new(
            10,
            "Income",
            RiskLevel::Medium,
            "Lower income may affect payment consistency.",
        )
    })
}

fn medical_history_rule(profile: &ClientProfile) -> Option<Adjustment> {
    profile.medical_history.then(|| {
        Adjustment::new(
            30,
            "Medical History",
            RiskLevel::High,
            "Pre-existing conditions increase premium.",
        )
    })
}

fn lifestyle_rule(profile: &ClientProfile) -> Option<Adjustment> {
    profile.lifestyle.is_high_risk().then(|| {
        Adjustment::new(20, "Lifestyle", RiskLevel::High, "Engages in high-risk activities.")
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{assess_profile, DeterministicRiskEngine, RiskEngine};
    use crate::domain::profile::{ClientProfile, Lifestyle};
    use crate::domain::risk::RiskLevel;

    fn profile(age: u32, income: f64, medical_history: bool, lifestyle: &str) -> ClientProfile {
        ClientProfile { age, income, medical_history, lifestyle: Lifestyle::parse(lifestyle) }
    }

    #[test]
    fn typical_profile_stays_at_baseline_with_no_factors() {
        let assessment = DeterministicRiskEngine.assess(&ClientProfile::from_json(&json!({
            "age": 35,
            "income": 70000,
            "medical_history": false,
            "lifestyle": "active",
        })));

        assert_eq!(assessment.score_value, 0.5);
        assert_eq!(assessment.score, RiskLevel::Medium);
        assert!(assessment.factors.is_empty());
        assert_eq!(
            assessment.explanation,
            "Risk assessment concluded with a Medium risk level due to factors: "
        );
    }

    #[test]
    fn every_factor_triggered_clamps_to_one() {
        let assessment = assess_profile(&profile(65, 15_000.0, true, "high_risk"));

        assert_eq!(assessment.score_value, 1.0);
        assert_eq!(assessment.score, RiskLevel::High);

        let names = assessment.factors.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Age", "Income", "Medical History", "Lifestyle"]);
        assert_eq!(
            assessment.explanation,
            "Risk assessment concluded with a High risk level due to factors: \
             Age, Income, Medical History, Lifestyle"
        );
    }

    #[test]
    fn age_factor_impact_follows_age_band() {
        for age in 0..=120u32 {
            let assessment = assess_profile(&profile(age, 50_000.0, false, "standard"));
            let impact = assessment.factor("Age").map(|factor| factor.impact);

            let expected = if age > 60 {
                Some(RiskLevel::High)
            } else if age < 25 {
                Some(RiskLevel::Medium)
            } else {
                None
            };
            assert_eq!(impact, expected, "age {age}");
        }
    }

    #[test]
    fn score_category_is_consistent_with_score_value() {
        for age in [18, 30, 70] {
            for income in [10_000.0, 60_000.0] {
                for medical_history in [false, true] {
                    for lifestyle in ["standard", "high_risk"] {
                        let assessment =
                            assess_profile(&profile(age, income, medical_history, lifestyle));
                        let value = assessment.score_value;

                        assert!((0.0..=1.0).contains(&value));
                        let expected = if value < 0.4 {
                            RiskLevel::Low
                        } else if value < 0.7 {
                            RiskLevel::Medium
                        } else {
                            RiskLevel::High
                        };
                        assert_eq!(assessment.score, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn boundary_of_medium_and_high_is_exact() {
        // 0.5 + 0.2 lands exactly on the High threshold.
        let assessment = assess_profile(&profile(61, 50_000.0, false, "standard"));
        assert_eq!(assessment.score_value, 0.7);
        assert_eq!(assessment.score, RiskLevel::High);

        let young = assess_profile(&profile(22, 50_000.0, false, "standard"));
        assert_eq!(young.score_value, 0.6);
        assert_eq!(young.score, RiskLevel::Medium);
    }

    #[test]
    fn only_the_exact_high_risk_label_adds_the_lifestyle_factor() {
        let assessment =
            assess_profile(&ClientProfile::from_json(&json!({ "lifestyle": "HIGH_RISK" })));

        assert_eq!(assessment.score_value, 0.5);
        assert!(assessment.factor("Lifestyle").is_none());
    }

    #[test]
    fn assessment_is_reproducible() {
        let input = profile(23, 12_000.0, true, "high_risk");
        assert_eq!(assess_profile(&input), assess_profile(&input));
    }
}
