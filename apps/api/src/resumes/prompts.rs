// Resume LLM prompt templates.

use serde::{Deserialize, Serialize};

/// Prompts carry at most this much resume text.
pub const MAX_PROMPT_CHARS: usize = 24_000;

pub const ANALYZE_SYSTEM: &str = "\
You are an experienced technical recruiter reviewing resumes. \
Be specific and concrete; never invent experience the resume does not show. \
You MUST respond with valid JSON only, with no markdown fences and no explanations.";

pub const ANALYZE_PROMPT: &str = r#"Review the resume below{target_role_clause}.

RESUME:
{resume_text}

Return exactly this JSON object:
{
  "score": number 0-100,
  "summary": "two or three sentence overall assessment",
  "strengths": ["string"],
  "weaknesses": ["string"],
  "suggestions": ["concrete, actionable edit"],
  "keywords": ["skills and technologies the resume demonstrates"]
}"#;

pub const REFORMAT_SYSTEM: &str = "\
You rewrite resumes into clean Markdown. \
Keep every fact, date, employer, and metric exactly as given. \
Do not add skills, numbers, or roles that are not in the source. \
Return only the Markdown document.";

pub const REFORMAT_PROMPT: &str = r#"Rewrite the resume below{target_role_clause}.

STYLE:
{style_instructions}

RESUME:
{resume_text}"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReformatStyle {
    Classic,
    #[default]
    Modern,
    Compact,
}

impl ReformatStyle {
    pub fn instructions(&self) -> &'static str {
        match self {
            ReformatStyle::Classic => {
                "Reverse-chronological. Sections: Summary, Experience, Education, Skills. \
                 Full sentences in the summary, bullet points elsewhere."
            }
            ReformatStyle::Modern => {
                "Lead with a one-line headline and a Skills section. \
                 Short achievement-first bullets starting with strong verbs."
            }
            ReformatStyle::Compact => {
                "Fit on one page. At most three bullets per role, no summary paragraph, \
                 skills as a single comma-separated line."
            }
        }
    }
}

pub fn build_analyze_prompt(resume_text: &str, target_role: Option<&str>) -> String {
    ANALYZE_PROMPT
        .replace("{target_role_clause}", &target_role_clause(target_role))
        .replace("{resume_text}", clip(resume_text))
}

pub fn build_reformat_prompt(
    resume_text: &str,
    style: ReformatStyle,
    target_role: Option<&str>,
) -> String {
    REFORMAT_PROMPT
        .replace("{target_role_clause}", &target_role_clause(target_role))
        .replace("{style_instructions}", style.instructions())
        .replace("{resume_text}", clip(resume_text))
}

fn target_role_clause(target_role: Option<&str>) -> String {
    match target_role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => format!(" for a candidate targeting the role \"{role}\""),
        None => String::new(),
    }
}

fn clip(text: &str) -> &str {
    match text.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_prompt_with_role() {
        let prompt = build_analyze_prompt("Jane Doe", Some(" Staff Engineer "));
        assert!(prompt.contains("targeting the role \"Staff Engineer\""));
        assert!(prompt.contains("RESUME:\nJane Doe"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_reformat_prompt_without_role() {
        let prompt = build_reformat_prompt("Jane", ReformatStyle::Compact, Some("  "));
        assert!(prompt.starts_with("Rewrite the resume below."));
        assert!(prompt.contains("Fit on one page"));
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        let text = "é".repeat(MAX_PROMPT_CHARS + 10);
        assert_eq!(clip(&text).chars().count(), MAX_PROMPT_CHARS);
    }

    #[test]
    fn test_style_default_and_serde() {
        assert_eq!(ReformatStyle::default(), ReformatStyle::Modern);
        let style: ReformatStyle = serde_json::from_str(r#""classic""#).unwrap();
        assert_eq!(style, ReformatStyle::Classic);
    }
}
