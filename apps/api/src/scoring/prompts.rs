// LLM prompt constants for the scoring module.
// The only model call in scoring is the academic-marker fallback.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for academic-marker extraction.
pub fn academic_marker_system() -> String {
    format!(
        "You read the education section of a resume and report the candidate's \
        headline academic result. {JSON_ONLY_SYSTEM}"
    )
}

/// Marker extraction prompt. Replace `{education_text}` before sending.
pub const ACADEMIC_MARKER_PROMPT_TEMPLATE: &str = r#"Find the candidate's overall academic result in the text below.

EDUCATION TEXT:
{education_text}

Return a JSON object with this EXACT schema:
{"value": 8.4, "kind": "CGPA"}

Rules:
- "kind" is "CGPA" for grade-point values (any scale, report the number as written) or "Percentage" for marks out of 100.
- Prefer the highest completed degree when several results are listed.
- If no result is stated, return {"value": null, "kind": null}.
- Never estimate or infer a value that is not written in the text."#;
