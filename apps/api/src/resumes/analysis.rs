//! Normalization of model-produced resume analyses.
//!
//! Models drift on key names (`overall_score`, `pros`, `improvements`, …) and on score
//! formats (`82`, `"82"`, `"8.2/10"`). Everything is folded into `ResumeAnalysis`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{get_field, get_str, get_string_list};

const SCORE_ALIASES: &[&str] = &["score", "overall_score", "overallScore", "rating"];
const SUMMARY_ALIASES: &[&str] = &["summary", "overview", "assessment"];
const STRENGTH_ALIASES: &[&str] = &["strengths", "pros"];
const WEAKNESS_ALIASES: &[&str] = &["weaknesses", "cons", "gaps"];
const SUGGESTION_ALIASES: &[&str] = &["suggestions", "improvements", "recommendations"];
const KEYWORD_ALIASES: &[&str] = &["keywords", "skills"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    /// 0 – 100
    pub score: u8,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub keywords: Vec<String>,
}

/// Returns `None` when the reply carries neither a score nor a summary.
pub fn normalize_analysis(raw: &Value) -> Option<ResumeAnalysis> {
    // some models nest everything under a single top-level key
    let record = get_field(raw, &["analysis", "result"])
        .filter(|v| v.is_object())
        .unwrap_or(raw);

    let score = get_field(record, SCORE_ALIASES).and_then(parse_score);
    let summary = get_str(record, SUMMARY_ALIASES);
    if score.is_none() && summary.is_none() {
        return None;
    }

    Some(ResumeAnalysis {
        score: score.unwrap_or(0),
        summary: summary.unwrap_or_default(),
        strengths: get_string_list(record, STRENGTH_ALIASES),
        weaknesses: get_string_list(record, WEAKNESS_ALIASES),
        suggestions: get_string_list(record, SUGGESTION_ALIASES),
        keywords: get_string_list(record, KEYWORD_ALIASES),
    })
}

fn parse_score(value: &Value) -> Option<u8> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_score_str(s)?,
        _ => return None,
    };
    if !score.is_finite() {
        return None;
    }
    Some(score.round().clamp(0.0, 100.0) as u8)
}

/// "82", "82%", "8.2/10", "41 / 50"
fn parse_score_str(s: &str) -> Option<f64> {
    let s = s.trim().trim_end_matches('%').trim();
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den > 0.0).then(|| num / den * 100.0)
        }
        None => s.parse().ok(),
    }
}
