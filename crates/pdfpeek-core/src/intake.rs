//! Input validation: device detection, type/size/count checks, and turning
//! picker selections or dropped (pasted) paths into candidates.

use std::io::Read;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::{PDF_MIME, format_file_size};

/// One mebibyte; size limits are configured in these units.
pub const MB: u64 = 1024 * 1024;

static MOBILE_UA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)iPhone|iPad|iPod|Android").unwrap());
static TABLET_UA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)iPad|Android").unwrap());
static MOBILE_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)mobile").unwrap());

/// Coarse device class used for size ceilings and render scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

/// What we know about the display device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    /// Mobile user agent (phones and tablets both count).
    pub mobile: bool,
    pub tablet: bool,
    /// Viewport width in CSS pixels.
    pub viewport_width: u32,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            mobile: false,
            tablet: false,
            viewport_width: 1280,
        }
    }
}

impl DeviceProfile {
    /// Sniff a user-agent string. `None` means a desktop terminal.
    pub fn from_user_agent(user_agent: Option<&str>, viewport_width: u32) -> Self {
        let ua = user_agent.unwrap_or("");
        let mobile = MOBILE_UA.is_match(ua);
        // iPad, or Android without the "mobile" token.
        let tablet = TABLET_UA
            .find_iter(ua)
            .any(|m| m.as_str().eq_ignore_ascii_case("ipad") || !MOBILE_KEYWORD.is_match(ua));
        Self {
            mobile,
            tablet,
            viewport_width,
        }
    }

    pub fn class(&self) -> DeviceClass {
        if self.mobile && !self.tablet {
            DeviceClass::Mobile
        } else if self.tablet {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Size and count limits for the intake.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPolicy {
    pub device: DeviceProfile,
    pub max_file_size_bytes: u64,
    pub max_mobile_file_size_bytes: u64,
    pub max_batch_files: usize,
}

impl Default for InputPolicy {
    fn default() -> Self {
        Self {
            device: DeviceProfile::default(),
            max_file_size_bytes: 50 * MB,
            max_mobile_file_size_bytes: 15 * MB,
            max_batch_files: 10,
        }
    }
}

impl InputPolicy {
    pub fn new(device: DeviceProfile) -> Self {
        Self {
            device,
            ..Self::default()
        }
    }

    /// The size ceiling for the detected device.
    pub fn size_ceiling(&self) -> u64 {
        if self.device.mobile {
            self.max_mobile_file_size_bytes
        } else {
            self.max_file_size_bytes
        }
    }

    /// Mobile devices pick one file at a time.
    pub fn allows_multiple(&self) -> bool {
        !self.device.mobile
    }

    /// Footer hint describing the limit.
    pub fn hint(&self) -> String {
        format!("Maximum size {} MB", self.size_ceiling() / MB)
    }

    /// Validate one candidate.
    pub fn check(&self, candidate: &Candidate) -> Result<(), IntakeError> {
        if candidate.mime != PDF_MIME {
            return Err(IntakeError::NotPdf {
                name: candidate.name.clone(),
            });
        }
        let ceiling = self.size_ceiling();
        if candidate.size_bytes > ceiling {
            return Err(IntakeError::TooLarge {
                name: candidate.name.clone(),
                size_bytes: candidate.size_bytes,
                max_mb: ceiling / MB,
                mobile: self.device.mobile,
            });
        }
        Ok(())
    }

    /// Validate a whole batch. Accepted candidates keep submission order.
    pub fn screen(&self, batch: CandidateBatch) -> IntakeOutcome {
        let mut outcome = IntakeOutcome::default();
        let mut files = batch.files;

        // Only the PDFs of a drop count toward the batch limit.
        if batch.source == BatchSource::Drop {
            let pdfs = files.iter().filter(|c| c.mime == PDF_MIME).count();
            if pdfs == 0 {
                outcome.rejected.push(IntakeError::NoPdfInDrop);
                return outcome;
            }
            if pdfs > self.max_batch_files {
                outcome.rejected.push(IntakeError::TooManyFiles {
                    count: pdfs,
                    max: self.max_batch_files,
                });
                return outcome;
            }
        }

        if batch.source == BatchSource::Picker && !self.allows_multiple() {
            files.truncate(1);
        }

        for candidate in files {
            match self.check(&candidate) {
                Ok(()) => outcome.accepted.push(candidate),
                Err(e) => {
                    tracing::debug!(file = %candidate.name, reason = %e, "candidate rejected");
                    outcome.rejected.push(e);
                }
            }
        }
        outcome
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Please select a valid PDF document.")]
    NotPdf { name: String },
    #[error(
        "File too large! Maximum size is {max_mb}MB{}.\n\nYour file: {}",
        mobile_suffix(.mobile),
        size_text(.size_bytes)
    )]
    TooLarge {
        name: String,
        size_bytes: u64,
        max_mb: u64,
        mobile: bool,
    },
    #[error("Maximum {max} files can be uploaded at once.")]
    TooManyFiles { count: usize, max: usize },
    #[error("Only PDF files are supported.")]
    NoPdfInDrop,
    #[error("Cannot read {path}: {message}")]
    Unreadable { path: String, message: String },
}

fn mobile_suffix(mobile: &bool) -> &'static str {
    if *mobile { " on mobile devices" } else { "" }
}

fn size_text(bytes: &u64) -> String {
    format_file_size(*bytes)
}

/// Where a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSource {
    Picker,
    Drop,
}

/// A file offered for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub mime: String,
}

impl Candidate {
    /// Build a candidate from a file on disk.
    pub fn from_path(path: &Path) -> Result<Self, IntakeError> {
        let unreadable = |e: std::io::Error| IntakeError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let meta = std::fs::metadata(path).map_err(unreadable)?;
        if !meta.is_file() {
            return Err(IntakeError::Unreadable {
                path: path.display().to_string(),
                message: "not a regular file".to_string(),
            });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            path: path.to_path_buf(),
            size_bytes: meta.len(),
            mime: mime_for_path(path),
        })
    }
}

/// A set of candidates submitted together.
#[derive(Debug, Clone)]
pub struct CandidateBatch {
    pub source: BatchSource,
    pub files: Vec<Candidate>,
}

impl CandidateBatch {
    pub fn new(source: BatchSource, files: Vec<Candidate>) -> Self {
        Self { source, files }
    }

    /// Build a batch from paths. Unreadable paths are reported separately.
    pub fn from_paths(source: BatchSource, paths: &[PathBuf]) -> (Self, Vec<IntakeError>) {
        let mut files = Vec::new();
        let mut errors = Vec::new();
        for path in paths {
            match Candidate::from_path(path) {
                Ok(c) => files.push(c),
                Err(e) => errors.push(e),
            }
        }
        (Self::new(source, files), errors)
    }
}

/// Result of screening a batch.
#[derive(Debug, Default)]
pub struct IntakeOutcome {
    pub accepted: Vec<Candidate>,
    pub rejected: Vec<IntakeError>,
}

/// A user-visible message that must be acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl From<IntakeError> for Notice {
    fn from(e: IntakeError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// MIME type the way a browser assigns it: by extension, with a `%PDF-`
/// sniff for files that have none.
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => PDF_MIME.to_string(),
        Some("txt") | Some("text") => "text/plain".to_string(),
        Some("html") | Some("htm") => "text/html".to_string(),
        Some("png") => "image/png".to_string(),
        Some("jpg") | Some("jpeg") => "image/jpeg".to_string(),
        Some("zip") => "application/zip".to_string(),
        Some(_) => "application/octet-stream".to_string(),
        None => {
            if has_pdf_magic(path) {
                PDF_MIME.to_string()
            } else {
                "application/octet-stream".to_string()
            }
        }
    }
}

fn has_pdf_magic(path: &Path) -> bool {
    let mut head = [0u8; 5];
    std::fs::File::open(path)
        .and_then(|mut f| f.read_exact(&mut head))
        .map(|_| &head == b"%PDF-")
        .unwrap_or(false)
}

/// Split pasted text (what a terminal delivers for a file drag) into paths.
///
/// Handles one path per line, whitespace-separated paths, single or double
/// quotes, backslash-escaped spaces and `file://` URIs.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => quote = Some(c),
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (None, c) if c.is_whitespace() => flush(&mut current, &mut paths),
            (None, c) => current.push(c),
        }
    }
    flush(&mut current, &mut paths);
    paths
}

fn flush(current: &mut String, paths: &mut Vec<PathBuf>) {
    if !current.is_empty() {
        paths.push(normalize_dropped(current));
        current.clear();
    }
}

fn normalize_dropped(raw: &str) -> PathBuf {
    match raw.strip_prefix("file://") {
        Some(rest) => PathBuf::from(decode_uri_path(rest)),
        None => PathBuf::from(raw),
    }
}

fn decode_uri_path(rest: &str) -> String {
    match urlencoding::decode(rest) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            let bytes = urlencoding::decode_binary(rest.as_bytes());
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, size: u64) -> Candidate {
        Candidate {
            name: name.to_string(),
            path: PathBuf::from(name),
            size_bytes: size,
            mime: PDF_MIME.to_string(),
        }
    }

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";
    const ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) Safari/537.36";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) Mobile Safari/537.36";
    const IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) Mobile/15E148";

    #[test]
    fn device_classes_from_user_agent() {
        assert_eq!(DeviceProfile::from_user_agent(None, 1280).class(), DeviceClass::Desktop);
        assert_eq!(DeviceProfile::from_user_agent(Some(IPHONE), 390).class(), DeviceClass::Mobile);
        assert_eq!(
            DeviceProfile::from_user_agent(Some(ANDROID_PHONE), 412).class(),
            DeviceClass::Mobile
        );
        assert_eq!(
            DeviceProfile::from_user_agent(Some(ANDROID_TABLET), 800).class(),
            DeviceClass::Tablet
        );
        assert_eq!(DeviceProfile::from_user_agent(Some(IPAD), 820).class(), DeviceClass::Tablet);
    }

    #[test]
    fn size_ceiling_depends_on_device() {
        let desktop = InputPolicy::default();
        assert_eq!(desktop.size_ceiling(), 50 * MB);
        let mobile = InputPolicy::new(DeviceProfile::from_user_agent(Some(IPHONE), 390));
        assert_eq!(mobile.size_ceiling(), 15 * MB);
        // Tablets sniff as mobile too.
        let tablet = InputPolicy::new(DeviceProfile::from_user_agent(Some(IPAD), 820));
        assert_eq!(tablet.size_ceiling(), 15 * MB);
    }

    #[test]
    fn rejects_non_pdf_mime() {
        let policy = InputPolicy::default();
        let mut c = pdf("notes.txt", 10);
        c.mime = "text/plain".into();
        assert_eq!(
            policy.check(&c),
            Err(IntakeError::NotPdf {
                name: "notes.txt".into()
            })
        );
    }

    #[test]
    fn rejects_oversized_with_message() {
        let policy = InputPolicy::new(DeviceProfile::from_user_agent(Some(IPHONE), 390));
        let err = policy.check(&pdf("big.pdf", 20 * MB)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File too large! Maximum size is 15MB on mobile devices.\n\nYour file: 20.0 MB"
        );
        let desktop = InputPolicy::default();
        assert!(desktop.check(&pdf("big.pdf", 20 * MB)).is_ok());
        assert!(desktop.check(&pdf("exact.pdf", 50 * MB)).is_ok());
        assert!(desktop.check(&pdf("over.pdf", 50 * MB + 1)).is_err());
    }

    #[test]
    fn drop_of_eleven_rejected_whole() {
        let policy = InputPolicy::default();
        let files = (0..11).map(|i| pdf(&format!("{i}.pdf"), 10)).collect();
        let outcome = policy.screen(CandidateBatch::new(BatchSource::Drop, files));
        assert!(outcome.accepted.is_empty());
        assert_eq!(
            outcome.rejected,
            vec![IntakeError::TooManyFiles { count: 11, max: 10 }]
        );
        assert_eq!(
            outcome.rejected[0].to_string(),
            "Maximum 10 files can be uploaded at once."
        );
    }

    #[test]
    fn drop_of_ten_accepted() {
        let policy = InputPolicy::default();
        let files = (0..10).map(|i| pdf(&format!("{i}.pdf"), 10)).collect();
        let outcome = policy.screen(CandidateBatch::new(BatchSource::Drop, files));
        assert_eq!(outcome.accepted.len(), 10);
    }

    #[test]
    fn drop_limit_counts_only_pdfs() {
        let policy = InputPolicy::default();
        let mut files: Vec<Candidate> = (0..10).map(|i| pdf(&format!("{i}.pdf"), 10)).collect();
        let mut txt = pdf("notes.txt", 10);
        txt.mime = "text/plain".into();
        files.push(txt.clone());
        let outcome = policy.screen(CandidateBatch::new(BatchSource::Drop, files));
        assert_eq!(outcome.accepted.len(), 10);
        assert!(
            !outcome
                .rejected
                .iter()
                .any(|e| matches!(e, IntakeError::TooManyFiles { .. }))
        );

        let mut files: Vec<Candidate> = (0..11).map(|i| pdf(&format!("{i}.pdf"), 10)).collect();
        files.push(txt);
        let outcome = policy.screen(CandidateBatch::new(BatchSource::Drop, files));
        assert!(outcome.accepted.is_empty());
        assert_eq!(
            outcome.rejected,
            vec![IntakeError::TooManyFiles { count: 11, max: 10 }]
        );
    }

    #[test]
    fn drop_without_pdf_gets_single_notice() {
        let policy = InputPolicy::default();
        let mut c = pdf("a.txt", 10);
        c.mime = "text/plain".into();
        let outcome = policy.screen(CandidateBatch::new(BatchSource::Drop, vec![c]));
        assert_eq!(outcome.rejected, vec![IntakeError::NoPdfInDrop]);
    }

    #[test]
    fn mixed_batch_keeps_order_and_reports_rejects() {
        let policy = InputPolicy::default();
        let mut txt = pdf("b.txt", 10);
        txt.mime = "text/plain".into();
        let files = vec![pdf("a.pdf", 10), txt, pdf("c.pdf", 10)];
        let outcome = policy.screen(CandidateBatch::new(BatchSource::Picker, files));
        let names: Vec<_> = outcome.accepted.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn mobile_picker_keeps_first_file() {
        let policy = InputPolicy::new(DeviceProfile::from_user_agent(Some(IPHONE), 390));
        let files = vec![pdf("a.pdf", 10), pdf("b.pdf", 10)];
        let outcome = policy.screen(CandidateBatch::new(BatchSource::Picker, files));
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].name, "a.pdf");
    }

    #[test]
    fn mime_by_extension_and_magic() {
        let dir = tempfile::tempdir().unwrap();
        let bare = dir.path().join("scan");
        std::fs::write(&bare, b"%PDF-1.7\n...").unwrap();
        assert_eq!(mime_for_path(&bare), PDF_MIME);
        let other = dir.path().join("blob");
        std::fs::write(&other, b"hello").unwrap();
        assert_eq!(mime_for_path(&other), "application/octet-stream");
        assert_eq!(mime_for_path(Path::new("x.PDF")), PDF_MIME);
        assert_eq!(mime_for_path(Path::new("x.txt")), "text/plain");
    }

    #[test]
    fn candidate_from_path_reads_size() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("doc.pdf");
        std::fs::write(&p, vec![0u8; 1234]).unwrap();
        let c = Candidate::from_path(&p).unwrap();
        assert_eq!(c.name, "doc.pdf");
        assert_eq!(c.size_bytes, 1234);
        assert_eq!(c.mime, PDF_MIME);
        assert!(Candidate::from_path(&dir.path().join("missing.pdf")).is_err());
        assert!(Candidate::from_path(dir.path()).is_err());
    }

    #[test]
    fn parses_dropped_paths() {
        assert_eq!(
            parse_dropped_paths("/tmp/a.pdf /tmp/b.pdf"),
            vec![PathBuf::from("/tmp/a.pdf"), PathBuf::from("/tmp/b.pdf")]
        );
        assert_eq!(
            parse_dropped_paths("'/tmp/my file.pdf'\n\"/tmp/x y.pdf\""),
            vec![PathBuf::from("/tmp/my file.pdf"), PathBuf::from("/tmp/x y.pdf")]
        );
        assert_eq!(
            parse_dropped_paths("/tmp/my\\ file.pdf"),
            vec![PathBuf::from("/tmp/my file.pdf")]
        );
        assert_eq!(
            parse_dropped_paths("file:///tmp/a%20b.pdf\r\n"),
            vec![PathBuf::from("/tmp/a b.pdf")]
        );
        assert_eq!(
            parse_dropped_paths("file:///tmp/caf%C3%A9%20x.pdf"),
            vec![PathBuf::from("/tmp/café x.pdf")]
        );
        // Invalid UTF-8 after decoding is replaced, not dropped.
        assert_eq!(
            parse_dropped_paths("file:///tmp/%FFa.pdf"),
            vec![PathBuf::from("/tmp/\u{FFFD}a.pdf")]
        );
        assert!(parse_dropped_paths("   \n").is_empty());
    }
}
