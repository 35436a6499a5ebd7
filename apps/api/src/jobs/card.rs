//! Job cards: HTML fragments rendered from a string template.
//!
//! Every interpolated value is escaped, and placeholders are substituted in a single
//! pass so a value that happens to contain `{title}` is never expanded again.

use crate::models::job::JobListing;

const DESCRIPTION_PREVIEW_CHARS: usize = 200;
const MAX_CARD_TAGS: usize = 6;

const CARD_TEMPLATE: &str = r#"<article class="job-card" data-job-id="{id}">
  <header>
    <h3 class="job-title">{title}</h3>
    <p class="job-company">{company}</p>
  </header>
  <ul class="job-meta">{meta}</ul>
  <p class="job-description">{description}</p>{tags}{apply}
</article>"#;

const EMPTY_FRAGMENT: &str = r#"<p class="job-empty">No jobs match your search.</p>"#;

pub fn render_cards(jobs: &[JobListing]) -> String {
    if jobs.is_empty() {
        return EMPTY_FRAGMENT.to_string();
    }
    jobs.iter().map(render_card).collect::<Vec<_>>().join("\n")
}

pub fn render_card(job: &JobListing) -> String {
    let meta: String = [
        job.location.as_deref().map(str::to_string),
        job.job_type.as_deref().map(humanize),
        job.salary.clone(),
        job.published_at
            .as_deref()
            .map(|d| d.chars().take(10).collect::<String>()),
    ]
    .into_iter()
    .flatten()
    .filter(|m| !m.trim().is_empty())
    .map(|m| format!("<li>{}</li>", escape_html(&m)))
    .collect();

    let tags = if job.tags.is_empty() {
        String::new()
    } else {
        let items: String = job
            .tags
            .iter()
            .take(MAX_CARD_TAGS)
            .map(|t| format!("<li>{}</li>", escape_html(t)))
            .collect();
        format!("\n  <ul class=\"job-tags\">{items}</ul>")
    };

    let apply = match job.url.as_deref().filter(|u| is_http_url(u)) {
        Some(url) => format!(
            "\n  <a class=\"job-apply\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Apply</a>",
            escape_html(url)
        ),
        None => String::new(),
    };

    render_template(
        CARD_TEMPLATE,
        &[
            ("id", escape_html(&job.id)),
            ("title", escape_html(&job.title)),
            ("company", escape_html(&job.company)),
            ("meta", meta),
            (
                "description",
                escape_html(&preview(&strip_tags(&job.description))),
            ),
            ("tags", tags),
            ("apply", apply),
        ],
    )
}

/// Single-pass `{name}` substitution. Unknown placeholders are left verbatim.
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replacement = after.find('}').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, end))
        });
        match replacement {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Drops markup from feed descriptions and collapses whitespace.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes the named entities feeds actually use plus numeric `&#NNN;` / `&#xHH;` forms.
/// Anything unrecognized is kept verbatim.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let decoded = after
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&after[..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Truncates on a char boundary, appending an ellipsis when anything was cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(DESCRIPTION_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

fn humanize(raw: &str) -> String {
    let spaced = raw.replace(['_', '-'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}
