//! Resume field extraction from plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::profile::ResumeProfile;
use crate::parsing::{clean_text, extract_vocabulary_skills, is_bullet, strip_bullet, truncate_chars};

const NAME_SCAN_LINES: usize = 10;
const NAME_SKIP_WORDS: &[&str] = &[
    "resume",
    "curriculum",
    "vitae",
    "cv",
    "profile",
    "summary",
    "objective",
    "education",
    "experience",
    "skills",
    "projects",
    "contact",
    "software",
    "engineer",
    "developer",
    "analyst",
    "intern",
    "internship",
    "manager",
];

const EDUCATION_KEYWORDS: &[&str] = &[
    "bachelor",
    "master",
    "phd",
    "b.tech",
    "m.tech",
    "mba",
    "bca",
    "mca",
    "b.e",
    "m.e",
    "b.sc",
    "m.sc",
    "btech",
    "mtech",
    "undergraduate",
    "graduate",
    "engineering",
    "computer science",
    "information technology",
    "electrical",
    "matriculation",
    "intermediate",
    "10th",
    "12th",
    "icse",
    "isc",
    "cbse",
];

/// Headers that end the education section.
const SECTION_HEADERS: &[&str] = &["summary", "experience", "project", "skill", "achievement", "certification"];
const HEADER_MAX_CHARS: usize = 30;
const EDUCATION_SECTION_LINES: usize = 15;
const DEGREE_BLOCKS: usize = 2;
const EDUCATION_MAX_CHARS: usize = 500;
const MAX_PROJECTS: usize = 5;
const PROJECT_NAME_CHARS: usize = 50;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());

static GRADE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)CGPA\s*[-:]?\s*(\d+\.?\d*)",
        r"(?i)GPA\s*[-:]?\s*(\d+\.?\d*)",
        r"(\d{2,3}\.\d+)%",
        r"(\d{2,3})%",
        r"(?i)10th.*?(\d{2,3}\.?\d*%)",
        r"(?i)12th.*?(\d{2,3}\.?\d*%)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static YEARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)").unwrap());

const EXPERIENCE_KEYWORDS: &[&str] = &["experience", "worked", "developer", "engineer"];

/// Parsed resume: scoring fields plus contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedResume {
    #[serde(flatten)]
    pub profile: ResumeProfile,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub fn parse_resume(text: &str) -> ParsedResume {
    let parsed = ParsedResume {
        profile: ResumeProfile {
            name: extract_name(text),
            skills: extract_vocabulary_skills(text),
            education: extract_education(text),
            experience: extract_experience(text),
            projects: extract_projects(text),
        },
        email: EMAIL.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE.find(text).map(|m| m.as_str().to_string()),
    };
    debug!(
        component = "parsing",
        name = %parsed.profile.name,
        skills = parsed.profile.skills.len(),
        "parsed resume"
    );
    parsed
}

fn looks_like_name(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=5).contains(&words.len()) {
        return false;
    }
    let capitalised = words.iter().all(|w| {
        w.chars().next().is_some_and(char::is_uppercase)
            || w.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
    });
    if !capitalised {
        return false;
    }
    let total = line.chars().count();
    let letters = line.chars().filter(|c| c.is_alphabetic() || c.is_whitespace()).count();
    letters as f64 / total as f64 > 0.8
}

pub fn extract_name(text: &str) -> String {
    text.lines()
        .take(NAME_SCAN_LINES)
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            !line.is_empty()
                && !line.contains('@')
                && !lower.contains("http")
                && !lower.contains("www")
                && !line.chars().any(|c| c.is_ascii_digit())
                && !NAME_SKIP_WORDS.iter().any(|w| lower.contains(w))
        })
        .find(|line| looks_like_name(line))
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown".to_string())
}

fn education_section(lines: &[&str]) -> Vec<String> {
    let mut in_section = false;
    let mut collected = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();
        let short = trimmed.chars().count() < HEADER_MAX_CHARS;
        if lower.contains("education") && short {
            in_section = true;
            continue;
        }
        if in_section && short && SECTION_HEADERS.iter().any(|h| lower.contains(h)) {
            break;
        }
        if in_section && !trimmed.is_empty() {
            collected.push(trimmed.to_string());
        }
    }
    collected
}

fn degree_blocks(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            let lower = line.to_lowercase();
            EDUCATION_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .take(DEGREE_BLOCKS)
        .map(|(i, _)| {
            let start = i.saturating_sub(1);
            let end = (i + 5).min(lines.len());
            lines[start..end]
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect()
}

fn grades(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for re in GRADE_PATTERNS.iter() {
        for m in re.find_iter(text) {
            let grade = m.as_str().to_string();
            if !found.contains(&grade) {
                found.push(grade);
            }
        }
    }
    found
}

/// Education section, degree context blocks and every grade figure, joined.
pub fn extract_education(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut parts: Vec<String> = Vec::new();

    let section = education_section(&lines);
    if !section.is_empty() {
        let head: Vec<String> = section.into_iter().take(EDUCATION_SECTION_LINES).collect();
        parts.push(head.join(" | "));
    }
    parts.extend(degree_blocks(&lines));

    let grades = grades(text);
    if !grades.is_empty() {
        parts.push(format!("Grades: {}", grades.join(", ")));
    }

    if parts.is_empty() {
        return "Not specified".to_string();
    }
    truncate_chars(&clean_text(&parts.join(" || ")), EDUCATION_MAX_CHARS)
}

pub fn extract_experience(text: &str) -> String {
    if let Some(caps) = YEARS.captures(&text.to_lowercase()) {
        return format!("{} years", &caps[1]);
    }
    text.lines()
        .find(|line| {
            let lower = line.to_lowercase();
            EXPERIENCE_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|line| clean_text(&truncate_chars(line, 100)))
        .unwrap_or_else(|| "Fresher".to_string())
}

pub fn extract_projects(text: &str) -> Vec<String> {
    let mut projects = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.to_lowercase().contains("project") && trimmed.chars().count() < HEADER_MAX_CHARS {
            in_section = true;
            continue;
        }
        if !in_section || trimmed.is_empty() {
            continue;
        }

        if is_bullet(trimmed) {
            projects.push(truncate_chars(strip_bullet(trimmed), PROJECT_NAME_CHARS));
        } else if trimmed.chars().count() < PROJECT_NAME_CHARS
            && !line.chars().take(3).any(|c| c.is_ascii_digit())
        {
            projects.push(trimmed.to_string());
        }

        if projects.len() >= MAX_PROJECTS {
            break;
        }
    }
    projects
}
