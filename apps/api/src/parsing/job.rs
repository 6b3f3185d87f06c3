//! Job-description field extraction from plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::profile::JobProfile;
use crate::parsing::{clean_text, extract_vocabulary_skills, is_bullet, strip_bullet, truncate_chars};

const NOT_SPECIFIED: &str = "Not specified";

const JOB_KEYWORDS: &[&str] = &[
    "developer",
    "engineer",
    "manager",
    "analyst",
    "designer",
    "architect",
    "lead",
    "senior",
    "junior",
    "intern",
    "internship",
    "associate",
    "specialist",
    "coordinator",
    "consultant",
    "officer",
    "executive",
    "administrator",
    "technician",
    "operator",
    "supervisor",
    "director",
    "head",
    "chief",
    "assistant",
    "trainee",
    "expert",
    "scientist",
    "researcher",
    "programmer",
    "operations",
    "support",
];

const TITLE_EXCLUDES: &[&str] = &["qualification", "requirement", "skill", "description", "about", "overview"];
const COMPANY_EXCLUDES: &[&str] = &[
    "job",
    "position",
    "role",
    "description",
    "qualification",
    "requirement",
    "intern",
    "engineer",
    "developer",
    "manager",
];
const QUALIFICATION_KEYWORDS: &[&str] = &["bachelor", "master", "phd", "b.tech", "m.tech", "mba", "degree", "diploma"];
const RESPONSIBILITY_HEADERS: &[&str] = &["responsibilit", "duties", "role"];

const MAX_QUALIFICATIONS: usize = 2;
const MAX_RESPONSIBILITIES: usize = 5;
const LINE_CHARS: usize = 100;

static ROLE_NOUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:Intern|Engineer|Developer|Manager|Analyst|Specialist|Officer|Coordinator|Associate|Executive|Consultant)\b",
    )
    .unwrap()
});
static LABELLED_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Position|Role|Title|Job)\s*:\s*(.+)").unwrap());
static LABELLED_COMPANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Company|Organization|Employer)\s*:\s*(.+)").unwrap());
static LEGAL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:Inc|Ltd|LLC|Corp|Corporation|Company|Technologies|Solutions|Systems|Services|Group|Pvt|Private Limited)\b",
    )
    .unwrap()
});
static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Remote|Hybrid|On-site|[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*,\s*[A-Z]{2})\b").unwrap()
});
static YEAR_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\+?\s*(?:to|-)\s*(\d+)\s*(?:years?|yrs?)").unwrap());
static YEAR_SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)").unwrap());

/// Parsed job description: scoring fields plus company and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedJob {
    #[serde(flatten)]
    pub profile: JobProfile,
    pub company: String,
    pub location: String,
}

pub fn parse_job(text: &str) -> ParsedJob {
    let parsed = ParsedJob {
        profile: JobProfile {
            job_title: extract_job_title(text),
            required_skills: extract_vocabulary_skills(text),
            experience_required: extract_experience_required(text),
            qualifications: extract_qualifications(text),
            responsibilities: extract_responsibilities(text),
        },
        company: extract_company(text),
        location: extract_location(text),
    };
    debug!(
        component = "parsing",
        title = %parsed.profile.job_title,
        skills = parsed.profile.required_skills.len(),
        "parsed job description"
    );
    parsed
}

fn title_sized(line: &str) -> bool {
    let len = line.chars().count();
    10 < len && len < 100
}

pub fn extract_job_title(text: &str) -> String {
    let head: Vec<&str> = text.lines().take(15).map(str::trim).collect();

    let by_keyword = head.iter().find(|line| {
        let lower = line.to_lowercase();
        title_sized(line)
            && JOB_KEYWORDS.iter().any(|k| lower.contains(k))
            && !TITLE_EXCLUDES.iter().any(|x| lower.contains(x))
    });
    if let Some(line) = by_keyword {
        return line.to_string();
    }

    if let Some(line) = head.iter().find(|line| title_sized(line) && ROLE_NOUN.is_match(line)) {
        return line.to_string();
    }

    text.lines()
        .take(20)
        .filter_map(|line| LABELLED_TITLE.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .find(|title| {
            let len = title.chars().count();
            5 < len && len < 100
        })
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// "A-B years" for a range, "N+ years" for a single figure.
pub fn extract_experience_required(text: &str) -> String {
    let lower = text.to_lowercase();
    if let Some(caps) = YEAR_RANGE.captures(&lower) {
        return format!("{}-{} years", &caps[1], &caps[2]);
    }
    if let Some(caps) = YEAR_SINGLE.captures(&lower) {
        return format!("{}+ years", &caps[1]);
    }
    NOT_SPECIFIED.to_string()
}

pub fn extract_qualifications(text: &str) -> Vec<String> {
    let found: Vec<String> = text
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            QUALIFICATION_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .take(MAX_QUALIFICATIONS)
        .map(|line| clean_text(&truncate_chars(line, LINE_CHARS)))
        .collect();

    if found.is_empty() {
        vec![NOT_SPECIFIED.to_string()]
    } else {
        found
    }
}

pub fn extract_responsibilities(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        let lower = line.to_lowercase();
        if RESPONSIBILITY_HEADERS.iter().any(|h| lower.contains(h)) {
            in_section = true;
            continue;
        }
        let trimmed = line.trim();
        if !in_section || trimmed.is_empty() {
            continue;
        }

        if is_bullet(trimmed) {
            items.push(truncate_chars(strip_bullet(trimmed), LINE_CHARS));
        } else if trimmed.chars().count() > 20 {
            items.push(truncate_chars(trimmed, LINE_CHARS));
        }

        if items.len() >= MAX_RESPONSIBILITIES {
            break;
        }
    }
    items
}

pub fn extract_company(text: &str) -> String {
    let labelled = text
        .lines()
        .take(20)
        .filter_map(|line| LABELLED_COMPANY.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .find(|name| {
            let len = name.chars().count();
            2 < len && len < 80
        });
    if let Some(name) = labelled {
        return name;
    }

    let suffixed = text.lines().take(15).map(str::trim).find(|line| {
        let len = line.chars().count();
        LEGAL_SUFFIX.is_match(line) && 5 < len && len < 80
    });
    if let Some(line) = suffixed {
        return truncate_chars(line, 50);
    }

    text.lines()
        .take(10)
        .map(str::trim)
        .find(|line| {
            let len = line.chars().count();
            let lower = line.to_lowercase();
            line.chars().next().is_some_and(char::is_uppercase)
                && 3 < len
                && len < 50
                && !COMPANY_EXCLUDES.iter().any(|x| lower.contains(x))
        })
        .map(str::to_string)
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

pub fn extract_location(text: &str) -> String {
    LOCATION
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Senior Backend Engineer
Company: Northwind Technologies
Location: Austin, TX
Responsibilities
- Lead the design of payment microservices
- Mentor junior developers on the team
Requirements
5+ years of experience with Java, Spring and AWS
Bachelor's degree in Computer Science or related field
Docker and Kubernetes are required
";

    #[test]
    fn test_title_by_keyword() {
        assert_eq!(extract_job_title(SAMPLE), "Senior Backend Engineer");
    }

    #[test]
    fn test_title_from_label() {
        assert_eq!(extract_job_title("Acme\nTitle: Data Wrangler\n"), "Data Wrangler");
        assert_eq!(extract_job_title("short\n"), "Not specified");
    }

    #[test]
    fn test_skills_in_vocabulary_order() {
        let parsed = parse_job(SAMPLE);
        assert_eq!(
            parsed.profile.required_skills,
            vec!["Java", "Docker", "Kubernetes", "Aws", "Spring", "Microservices"]
        );
    }

    #[test]
    fn test_experience_required_formats() {
        assert_eq!(extract_experience_required(SAMPLE), "5+ years");
        assert_eq!(extract_experience_required("3-5 years in Go"), "3-5 years");
        assert_eq!(extract_experience_required("2 to 4 yrs"), "2-4 years");
        assert_eq!(extract_experience_required("no figure"), "Not specified");
    }

    #[test]
    fn test_qualifications() {
        assert_eq!(
            extract_qualifications(SAMPLE),
            vec!["Bachelor's degree in Computer Science or related field"]
        );
        assert_eq!(extract_qualifications("nothing here"), vec!["Not specified"]);
    }

    #[test]
    fn test_responsibilities_after_header() {
        let items = extract_responsibilities(SAMPLE);
        assert_eq!(items[0], "Lead the design of payment microservices");
        assert_eq!(items[1], "Mentor junior developers on the team");
        assert!(items.len() <= 5);
    }

    #[test]
    fn test_company_and_location() {
        assert_eq!(extract_company(SAMPLE), "Northwind Technologies");
        assert_eq!(extract_location(SAMPLE), "Austin, TX");
        assert_eq!(extract_location("Fully Remote role"), "Remote");
        assert_eq!(extract_company("Globex Corp hiring\n"), "Globex Corp hiring");
    }
}
