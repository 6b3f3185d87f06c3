//! Justification Generator: renders the decision from already-computed data.
//!
//! Pure text assembly: nothing here recomputes or adjusts a score. Skill names
//! are copied verbatim from the details so the text always agrees with the
//! record it ships with.

use crate::scoring::education::EducationDetails;
use crate::scoring::engine::ScoreDetails;
use crate::scoring::experience::ExperienceDetails;
use crate::scoring::seniority::SeniorityTier;
use crate::scoring::skills::SkillDetails;

const TOP_MATCHED_SHOWN: usize = 5;

/// Everything the generator reads.
pub struct JustificationInput<'a> {
    pub details: &'a ScoreDetails,
    pub tier: SeniorityTier,
    pub overall_fit: f64,
    pub is_shortlisted: bool,
    /// Lowest score the active policy can shortlist.
    pub minimum_score: f64,
}

/// "A", "A and B", "A, B, and C".
pub fn join_with_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

fn years(value: f64) -> String {
    let number = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    };
    if value == 1.0 {
        format!("{number} year")
    } else {
        format!("{number} years")
    }
}

fn skills_narrative(skills: &SkillDetails) -> String {
    if skills.total_required == 0 {
        return "The job lists no required skills, so skills were scored neutrally.".to_string();
    }

    let mut text = format!(
        "The candidate matches {} of {} required skills ({}%)",
        skills.matched_count, skills.total_required, skills.match_ratio
    );
    if skills.matched.is_empty() {
        text.push('.');
    } else {
        let top: Vec<String> = skills.matched.iter().take(TOP_MATCHED_SHOWN).cloned().collect();
        text.push_str(&format!(", including {}.", join_with_and(&top)));
    }

    if !skills.critical_missing.is_empty() {
        text.push_str(&format!(
            " Critical skills missing: {}.",
            join_with_and(&skills.critical_missing)
        ));
    }
    let other_missing: Vec<String> = skills
        .missing
        .iter()
        .filter(|s| !skills.critical_missing.contains(s))
        .cloned()
        .collect();
    if !other_missing.is_empty() {
        text.push_str(&format!(" Also not found: {}.", join_with_and(&other_missing)));
    }
    text
}

fn experience_narrative(experience: &ExperienceDetails) -> String {
    let mut text = if experience.required_years > 0.0 {
        format!(
            "Experience: {} found against {} required",
            years(experience.resume_years),
            years(experience.required_years)
        )
    } else {
        format!(
            "Experience: {} found; the job states no minimum",
            years(experience.resume_years)
        )
    };
    if experience.has_internship {
        text.push_str(", including internship experience");
    }
    text.push('.');
    text
}

fn education_narrative(education: &EducationDetails) -> String {
    if let Some(reason) = &education.reason {
        return format!("Education: {}.", reason.to_lowercase());
    }

    let degree = education
        .degree_level
        .map(|d| d.label())
        .unwrap_or("unspecified degree");
    let field = if education.has_tech_degree {
        "in a technical field"
    } else {
        "outside a technical field"
    };
    let marker = match (education.value_kind, education.raw_value) {
        (Some(kind), Some(value)) => {
            let assisted = if education.llm_assisted {
                " (model-assisted)"
            } else {
                ""
            };
            format!(
                "academic score {}/10 from {kind} {value}{assisted}",
                education.academic_score
            )
        }
        _ => "no CGPA or percentage found".to_string(),
    };
    format!("Education: {degree} {field}, {marker}.")
}

fn rejection_reasons(input: &JustificationInput<'_>) -> Vec<String> {
    let mut reasons = Vec::new();

    if input.overall_fit < input.minimum_score {
        reasons.push(format!(
            "the overall fit of {:.2} is below the {:.2} threshold",
            input.overall_fit, input.minimum_score
        ));
    }

    let critical_missing = &input.details.skills.critical_missing;
    if !critical_missing.is_empty() {
        let noun = if critical_missing.len() == 1 {
            "skill"
        } else {
            "skills"
        };
        reasons.push(format!(
            "critical {noun} {} {} missing",
            join_with_and(critical_missing),
            if critical_missing.len() == 1 { "is" } else { "are" }
        ));
    }

    let experience = &input.details.experience;
    if input.tier == SeniorityTier::Senior
        && experience.required_years > 0.0
        && experience.resume_years < experience.required_years
    {
        reasons.push(format!(
            "{} of experience falls short of the {} expected for a senior role",
            years(experience.resume_years),
            years(experience.required_years)
        ));
    }

    reasons
}

/// Builds the multi-paragraph justification.
pub fn generate_justification(input: &JustificationInput<'_>) -> String {
    let decision = if input.is_shortlisted {
        "Shortlisted"
    } else {
        "Not shortlisted"
    };

    let opening = format!(
        "{decision} for this {}-level role with an overall fit of {:.2}/10. {}",
        input.tier,
        input.overall_fit,
        skills_narrative(&input.details.skills)
    );

    let findings = format!(
        "{} {}",
        experience_narrative(&input.details.experience),
        education_narrative(&input.details.education)
    );

    let mut paragraphs = vec![opening, findings];

    if !input.is_shortlisted {
        let reasons = rejection_reasons(input);
        let closing = if reasons.is_empty() {
            "Not shortlisted under the current shortlisting policy.".to_string()
        } else {
            format!("Not shortlisted because {}.", join_with_and(&reasons))
        };
        paragraphs.push(closing);
    }

    paragraphs.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::education::DegreeLevel;
    use crate::scoring::academic::MarkerKind;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn details(critical_missing: &[&str], resume_years: f64, required_years: f64) -> ScoreDetails {
        ScoreDetails {
            skills: SkillDetails {
                matched: strings(&["Python", "React"]),
                missing: strings(&["AWS", "Docker"]),
                critical_skills: strings(&["Python", "React", "AWS"]),
                critical_missing: strings(critical_missing),
                total_required: 4,
                matched_count: 2,
                match_ratio: 50.0,
            },
            experience: ExperienceDetails {
                resume_years,
                required_years,
                has_internship: false,
                tier: SeniorityTier::Senior,
            },
            education: EducationDetails {
                academic_score: 9.0,
                raw_value: Some(8.5),
                value_kind: Some(MarkerKind::Cgpa),
                llm_assisted: false,
                has_tech_degree: true,
                degree_level: Some(DegreeLevel::Bachelors),
                source_excerpt: "B.Tech CSE, CGPA 8.5".to_string(),
                reason: None,
            },
        }
    }

    fn input(details: &ScoreDetails, overall: f64, shortlisted: bool) -> JustificationInput<'_> {
        JustificationInput {
            details,
            tier: SeniorityTier::Senior,
            overall_fit: overall,
            is_shortlisted: shortlisted,
            minimum_score: 7.0,
        }
    }

    #[test]
    fn test_join_with_and_grammar() {
        assert_eq!(join_with_and(&strings(&["a"])), "a");
        assert_eq!(join_with_and(&strings(&["a", "b"])), "a and b");
        assert_eq!(join_with_and(&strings(&["a", "b", "c"])), "a, b, and c");
        assert_eq!(join_with_and(&[]), "");
    }

    #[test]
    fn test_shortlisted_has_two_paragraphs() {
        let d = details(&[], 6.0, 5.0);
        let text = generate_justification(&input(&d, 8.2, true));
        assert!(text.starts_with("Shortlisted for this senior-level role"));
        assert_eq!(text.split("\n\n").count(), 2);
        assert!(text.contains("including Python and React"));
        assert!(text.contains("bachelor's degree in a technical field"));
        assert!(text.contains("CGPA 8.5"));
    }

    #[test]
    fn test_rejection_lists_three_reasons() {
        let d = details(&["AWS"], 2.0, 5.0);
        let text = generate_justification(&input(&d, 5.4, false));
        let closing = text.split("\n\n").last().unwrap();
        assert_eq!(
            closing,
            "Not shortlisted because the overall fit of 5.40 is below the 7.00 threshold, \
             critical skill AWS is missing, and 2 years of experience falls short of the \
             5 years expected for a senior role."
        );
    }

    #[test]
    fn test_threshold_rendered_at_score_precision() {
        let d = details(&[], 6.0, 5.0);
        let mut low = input(&d, 6.7, false);
        low.minimum_score = 6.75;
        let text = generate_justification(&low);
        assert!(text.contains("the overall fit of 6.70 is below the 6.75 threshold"));
    }

    #[test]
    fn test_borderline_rejection_names_critical_skills_only() {
        let d = details(&["AWS", "Docker"], 6.0, 5.0);
        let text = generate_justification(&input(&d, 7.2, false));
        let closing = text.split("\n\n").last().unwrap();
        assert_eq!(
            closing,
            "Not shortlisted because critical skills AWS and Docker are missing."
        );
    }

    #[test]
    fn test_skill_lists_copied_verbatim() {
        let d = details(&["AWS"], 6.0, 5.0);
        let text = generate_justification(&input(&d, 7.2, false));
        for skill in d.skills.matched.iter().chain(&d.skills.critical_missing) {
            assert!(text.contains(skill.as_str()), "missing {skill}");
        }
        assert!(text.contains("Also not found: Docker."));
    }

    #[test]
    fn test_no_required_skills_narrative() {
        let mut d = details(&[], 6.0, 5.0);
        d.skills = SkillDetails::default();
        let text = generate_justification(&input(&d, 8.0, true));
        assert!(text.contains("no required skills"));
    }

    #[test]
    fn test_unspecified_education_narrative() {
        let mut d = details(&[], 1.0, 0.0);
        d.education = EducationDetails {
            reason: Some("Education not specified".to_string()),
            ..Default::default()
        };
        let text = generate_justification(&input(&d, 8.0, true));
        assert!(text.contains("Education: education not specified."));
        assert!(text.contains("Experience: 1 year found; the job states no minimum."));
    }
}
