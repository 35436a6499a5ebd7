//! Upload format detection and plain-text extraction.

use thiserror::Error;

const PDF_MAGIC: &[u8] = b"%PDF-";
const MAX_FILE_NAME_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("text file is not valid UTF-8")]
    NotUtf8,

    #[error("no readable text found in document")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    PlainText,
    Markdown,
}

impl ResumeFormat {
    /// Detects the format from magic bytes first, then extension, then the declared content type.
    pub fn detect(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PDF_MAGIC) {
            return Some(Self::Pdf);
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("pdf") => return Some(Self::Pdf),
            Some("md" | "markdown") => return Some(Self::Markdown),
            Some("txt") => return Some(Self::PlainText),
            _ => {}
        }

        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some("application/pdf") => Some(Self::Pdf),
            Some("text/markdown" | "text/x-markdown") => Some(Self::Markdown),
            Some("text/plain") => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain; charset=utf-8",
            Self::Markdown => "text/markdown; charset=utf-8",
        }
    }
}

/// Extracts and tidies the text of an uploaded resume. CPU-bound for PDFs;
/// callers run it on a blocking thread.
pub fn extract_text(format: ResumeFormat, bytes: &[u8]) -> Result<String, ExtractError> {
    let raw = match format {
        ResumeFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string()))?,
        ResumeFormat::PlainText | ResumeFormat::Markdown => {
            String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::NotUtf8)?
        }
    };

    let text = tidy_text(&raw);
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

/// Drops control characters and trailing spaces, and collapses blank-line runs to one.
fn tidy_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;

    for line in raw.lines() {
        let line: String = line
            .chars()
            .filter(|c| !c.is_control() || *c == '\t')
            .collect();
        let line = line.trim_end();

        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }

    out.trim().to_string()
}

/// Reduces a client-supplied file name to a safe S3 key segment and header value.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let mut cleaned = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            cleaned.push(c);
        } else if !cleaned.ends_with('_') {
            cleaned.push('_');
        }
    }

    let cleaned: String = cleaned
        .trim_start_matches(['.', '_'])
        .chars()
        .take(MAX_FILE_NAME_CHARS)
        .collect();

    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf_by_magic_despite_extension() {
        let bytes = b"%PDF-1.7\n...";
        assert_eq!(
            ResumeFormat::detect("resume.txt", Some("text/plain"), bytes),
            Some(ResumeFormat::Pdf)
        );
    }

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            ResumeFormat::detect("CV.MD", None, b"# Me"),
            Some(ResumeFormat::Markdown)
        );
        assert_eq!(
            ResumeFormat::detect("cv.txt", None, b"me"),
            Some(ResumeFormat::PlainText)
        );
    }

    #[test]
    fn test_detect_by_content_type() {
        assert_eq!(
            ResumeFormat::detect("blob", Some("text/plain; charset=utf-8"), b"me"),
            Some(ResumeFormat::PlainText)
        );
    }

    #[test]
    fn test_detect_rejects_docx() {
        assert_eq!(
            ResumeFormat::detect(
                "cv.docx",
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
                b"PK\x03\x04"
            ),
            None
        );
    }

    #[test]
    fn test_extract_plain_text_tidies() {
        let text = extract_text(
            ResumeFormat::PlainText,
            b"Jane Doe   \r\n\r\n\r\n\r\nRust engineer\x07\n",
        )
        .unwrap();
        assert_eq!(text, "Jane Doe\n\nRust engineer");
    }

    #[test]
    fn test_extract_empty_text_errors() {
        assert!(matches!(
            extract_text(ResumeFormat::Markdown, b"  \n\n \t\n"),
            Err(ExtractError::Empty)
        ));
    }

    #[test]
    fn test_extract_invalid_utf8_errors() {
        assert!(matches!(
            extract_text(ResumeFormat::PlainText, &[0xff, 0xfe, 0xfd]),
            Err(ExtractError::NotUtf8)
        ));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\My CV (final).pdf"), "My_CV_final_.pdf");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name("???"), "resume");
        assert_eq!(sanitize_file_name(&"a".repeat(300)).len(), 100);
    }
}
