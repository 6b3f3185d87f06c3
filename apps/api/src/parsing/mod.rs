//! Document parsing: PDF text extraction plus heuristic field extraction for
//! resumes and job descriptions. The output feeds `models::profile`.

pub mod job;
pub mod pdf;
pub mod resume;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("document contains no extractable text")]
    Empty,
}

/// Technology vocabulary shared by both parsers. Order is significant for
/// job descriptions: the first matches become critical-skill candidates.
pub const SKILL_VOCABULARY: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "node.js",
    "nodejs",
    "angular",
    "vue",
    "mongodb",
    "sql",
    "postgresql",
    "mysql",
    "redis",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "gcp",
    "git",
    "html",
    "css",
    "typescript",
    "c++",
    "c#",
    "django",
    "flask",
    "fastapi",
    "spring",
    "express",
    "rest",
    "api",
    "graphql",
    "machine learning",
    "deep learning",
    "ai",
    "nlp",
    "tensorflow",
    "pytorch",
    "pandas",
    "numpy",
    "scikit-learn",
    "data analysis",
    "excel",
    "powerbi",
    "agile",
    "scrum",
    "jira",
    "ci/cd",
    "jenkins",
    "linux",
    "bash",
    "shell",
    "elasticsearch",
    "kafka",
    "rabbitmq",
    "microservices",
    "oauth",
    "jwt",
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses whitespace runs to one space and drops non-ASCII characters.
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    collapsed
        .chars()
        .filter(char::is_ascii)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Uppercases the first letter of every alphabetic run: "node.js" → "Node.Js".
pub fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_alpha = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Vocabulary skills found anywhere in `text` (substring match), title-cased,
/// de-duplicated, in vocabulary order.
pub fn extract_vocabulary_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for skill in SKILL_VOCABULARY {
        if lower.contains(skill) {
            let titled = title_case(skill);
            if !found.contains(&titled) {
                found.push(titled);
            }
        }
    }
    found
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Strips a leading "-" or "•" bullet marker.
pub(crate) fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['-', '•']).trim_start()
}

pub(crate) fn is_bullet(line: &str) -> bool {
    line.starts_with('-') || line.starts_with('•')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_and_strips() {
        assert_eq!(clean_text("  B.Tech\n\n  CSE\t— 2021 "), "B.Tech CSE  2021");
        assert_eq!(clean_text("naïve"), "nave");
    }

    #[test]
    fn test_title_case_matches_word_boundaries() {
        assert_eq!(title_case("node.js"), "Node.Js");
        assert_eq!(title_case("ci/cd"), "Ci/Cd");
        assert_eq!(title_case("machine learning"), "Machine Learning");
        assert_eq!(title_case("c++"), "C++");
    }

    #[test]
    fn test_vocabulary_skills_in_vocabulary_order() {
        let skills = extract_vocabulary_skills("Docker, Kubernetes and Python required");
        assert_eq!(skills, vec!["Python", "Docker", "Kubernetes"]);
    }

    #[test]
    fn test_vocabulary_substring_semantics() {
        // "javascript" contains "java"
        let skills = extract_vocabulary_skills("JavaScript");
        assert_eq!(skills, vec!["Java", "Javascript"]);
    }

    #[test]
    fn test_strip_bullet() {
        assert_eq!(strip_bullet("- Build APIs"), "Build APIs");
        assert_eq!(strip_bullet("• Ship"), "Ship");
        assert!(is_bullet("- x"));
        assert!(!is_bullet("x"));
    }
}
