// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text extraction from files on disk.
//!
//! Plain text is read as UTF-8 and HTML is rendered with `html2text`. PDF
//! and DOCX files are handed to external converters (`pdftotext` and
//! `pandoc` by default) whose stdout becomes the text.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use mnemos_config::model::IndexerConfig;
use mnemos_core::{AdapterType, HealthStatus, MnemosError, PluginAdapter, TextExtractor};
use tracing::debug;

/// Files larger than this are not read.
pub const MAX_FILE_BYTES: u64 = 16 * 1024 * 1024;

/// A converter still running after this long is killed.
const CONVERTER_TIMEOUT: Duration = Duration::from_secs(60);

/// Wrap width used when rendering HTML to text.
const HTML_WIDTH: usize = 100;

const HTML_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

/// Extensions never treated as text even if their bytes happen to decode.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "ico", "zip", "gz", "tgz", "xz", "bz2", "7z",
    "tar", "jar", "exe", "dll", "so", "dylib", "o", "a", "class", "pyc", "wasm", "mp3", "mp4",
    "mov", "avi", "mkv", "flac", "wav", "xlsx", "pptx", "db", "sqlite",
];

/// What kind of content a path holds, judged by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Pdf,
    Docx,
    Binary,
    /// Anything else; read as UTF-8 if the bytes allow.
    Text,
}

/// Classify `path` by its (case-insensitive) extension.
pub fn content_kind(path: &Path) -> ContentKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => ContentKind::Pdf,
        "docx" => ContentKind::Docx,
        e if HTML_EXTENSIONS.contains(&e) => ContentKind::Html,
        e if BINARY_EXTENSIONS.contains(&e) => ContentKind::Binary,
        _ => ContentKind::Text,
    }
}

/// Default extractor for text, HTML, PDF, and DOCX files.
///
/// Unsupported, unreadable, oversized, or binary files yield an empty
/// string, which the worker treats as "nothing to index". So does a PDF
/// or DOCX whose converter is disabled, missing, or fails.
#[derive(Debug, Clone)]
pub struct FileTextExtractor {
    pdf_converter: Option<String>,
    docx_converter: Option<String>,
}

impl Default for FileTextExtractor {
    fn default() -> Self {
        Self::from_config(&IndexerConfig::default())
    }
}

impl FileTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the converters named in the `[indexer]` section.
    pub fn from_config(config: &IndexerConfig) -> Self {
        Self::with_converters(&config.pdf_converter, &config.docx_converter)
    }

    /// Explicit converter programs. An empty name disables that format.
    pub fn with_converters(pdf: &str, docx: &str) -> Self {
        let program = |name: &str| {
            let name = name.trim();
            (!name.is_empty()).then(|| name.to_string())
        };
        Self {
            pdf_converter: program(pdf),
            docx_converter: program(docx),
        }
    }

    /// Extraction with the reason for an empty result preserved.
    pub async fn try_extract(&self, path: &Path) -> Result<String, MnemosError> {
        let kind = content_kind(path);
        let converter = match kind {
            ContentKind::Binary => return Ok(String::new()),
            ContentKind::Pdf => match &self.pdf_converter {
                Some(program) => Some(program.as_str()),
                None => return Ok(String::new()),
            },
            ContentKind::Docx => match &self.docx_converter {
                Some(program) => Some(program.as_str()),
                None => return Ok(String::new()),
            },
            ContentKind::Html | ContentKind::Text => None,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(|e| extraction_err(path, e))?;
        if !metadata.is_file() || metadata.len() > MAX_FILE_BYTES {
            return Ok(String::new());
        }

        if let Some(program) = converter {
            let file = path.as_os_str();
            let args: Vec<&OsStr> = if kind == ContentKind::Pdf {
                vec![file, OsStr::new("-")]
            } else {
                vec![OsStr::new("-t"), OsStr::new("plain"), OsStr::new("--wrap=none"), file]
            };
            return run_converter(program, &args, path).await;
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| extraction_err(path, e))?;
        match kind {
            ContentKind::Html => html2text::from_read(bytes.as_slice(), HTML_WIDTH)
                .map_err(|e| extraction_err(path, e)),
            _ => Ok(decode_text(bytes)),
        }
    }
}

/// Run `program` and take its stdout as the document text. Page breaks
/// become newlines.
async fn run_converter(program: &str, args: &[&OsStr], path: &Path) -> Result<String, MnemosError> {
    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true)
        .output();
    let output = tokio::time::timeout(CONVERTER_TIMEOUT, child)
        .await
        .map_err(|_| {
            extraction_err(
                path,
                io::Error::new(io::ErrorKind::TimedOut, format!("{program} timed out")),
            )
        })?
        .map_err(|e| extraction_err(path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = output.status.code().unwrap_or(-1);
        return Err(extraction_err(
            path,
            io::Error::other(format!("{program} exited with {code}: {}", stderr.trim())),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout).replace('\u{c}', "\n");
    debug!(program, chars = text.len(), "document converted");
    Ok(text)
}

/// UTF-8 text without NUL bytes, else empty.
fn decode_text(bytes: Vec<u8>) -> String {
    if bytes.contains(&0) {
        return String::new();
    }
    String::from_utf8(bytes).unwrap_or_default()
}

fn extraction_err<E>(path: &Path, err: E) -> MnemosError
where
    E: std::error::Error + Send + Sync + 'static,
{
    MnemosError::Extraction {
        path: path.to_path_buf(),
        source: Box::new(err),
    }
}

#[async_trait]
impl PluginAdapter for FileTextExtractor {
    fn name(&self) -> &str {
        "file-text"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Extractor
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl TextExtractor for FileTextExtractor {
    async fn extract(&self, path: &Path) -> String {
        match self.try_extract(path).await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "no text extracted");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_by_extension() {
        assert_eq!(content_kind(Path::new("/a/index.HTML")), ContentKind::Html);
        assert_eq!(content_kind(Path::new("/a/photo.jpg")), ContentKind::Binary);
        assert_eq!(content_kind(Path::new("/a/notes.md")), ContentKind::Text);
        assert_eq!(content_kind(Path::new("/a/Makefile")), ContentKind::Text);
        assert_eq!(content_kind(Path::new("/a/report.PDF")), ContentKind::Pdf);
        assert_eq!(content_kind(Path::new("/a/letter.docx")), ContentKind::Docx);
        assert_eq!(content_kind(Path::new("/a/sheet.xlsx")), ContentKind::Binary);
    }

    #[tokio::test]
    async fn reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello world").unwrap();
        assert_eq!(FileTextExtractor::new().extract(&path).await, "hello world");
    }

    #[tokio::test]
    async fn renders_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body><h1>Title</h1><p>Body text</p></body></html>").unwrap();
        let text = FileTextExtractor::new().extract(&path).await;
        assert!(text.contains("Title"), "got {text:?}");
        assert!(text.contains("Body text"), "got {text:?}");
        assert!(!text.contains("<p>"));
    }

    #[tokio::test]
    async fn binary_content_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, [0u8, 159, 146, 150]).unwrap();
        assert_eq!(FileTextExtractor::new().extract(&path).await, "");
    }

    #[tokio::test]
    async fn missing_file_is_empty_but_reported() {
        let extractor = FileTextExtractor::new();
        let path = Path::new("/definitely/not/here.txt");
        assert_eq!(extractor.extract(path).await, "");
        assert!(matches!(
            extractor.try_extract(path).await,
            Err(MnemosError::Extraction { .. })
        ));
    }

    #[tokio::test]
    async fn directories_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FileTextExtractor::new().extract(dir.path()).await, "");
    }

    /// Writes an executable shell script and returns its path.
    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pdf_text_comes_from_the_converter() {
        let dir = tempfile::tempdir().unwrap();
        let converter = script(dir.path(), "fake-pdftotext", r"printf 'page one\fpage two'");
        let pdf = dir.path().join("report.pdf");
        std::fs::write(&pdf, b"%PDF-1.7 not really").unwrap();

        let extractor = FileTextExtractor::with_converters(&converter, "");
        assert_eq!(extractor.extract(&pdf).await, "page one\npage two");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn docx_path_is_the_last_argument() {
        let dir = tempfile::tempdir().unwrap();
        let converter = script(dir.path(), "fake-pandoc", r#"echo "$1 $2 $3"; cat "$4""#);
        let docx = dir.path().join("letter.docx");
        std::fs::write(&docx, "Dear reader").unwrap();

        let extractor = FileTextExtractor::with_converters("", &converter);
        let text = extractor.extract(&docx).await;
        assert_eq!(text, "-t plain --wrap=none\nDear reader");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_converter_yields_empty_but_reported() {
        let dir = tempfile::tempdir().unwrap();
        let converter = script(dir.path(), "broken", "echo 'corrupt file' >&2; exit 3");
        let pdf = dir.path().join("bad.pdf");
        std::fs::write(&pdf, b"garbage").unwrap();

        let extractor = FileTextExtractor::with_converters(&converter, "");
        assert_eq!(extractor.extract(&pdf).await, "");
        let err = extractor.try_extract(&pdf).await.unwrap_err();
        assert!(matches!(err, MnemosError::Extraction { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn missing_or_disabled_converter_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("a.pdf");
        let docx = dir.path().join("b.docx");
        std::fs::write(&pdf, b"%PDF").unwrap();
        std::fs::write(&docx, b"PK").unwrap();

        let missing = FileTextExtractor::with_converters(
            "/definitely/not/a/pdftotext",
            "/definitely/not/a/pandoc",
        );
        assert_eq!(missing.extract(&pdf).await, "");
        assert!(matches!(
            missing.try_extract(&docx).await,
            Err(MnemosError::Extraction { .. })
        ));

        let disabled = FileTextExtractor::with_converters("", " ");
        assert_eq!(disabled.try_extract(&pdf).await.unwrap(), "");
        assert_eq!(disabled.try_extract(&docx).await.unwrap(), "");
    }
}
