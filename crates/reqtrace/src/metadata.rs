//! Concrete metadata sources: overrides, files and git
//!
//! Each front matter field is resolved through a [`FallbackChain`]; see
//! [`resolve_metadata`] for the order. Nothing here fails the run.

use eyre::{Result, WrapErr, bail};
use reqtrace_core::metadata::{FnSource, UNKNOWN_AUTHOR, UNKNOWN_VERSION, front_matter_value};
use reqtrace_core::{FallbackChain, MetadataSource, ReportMetadata, Resolution};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub const ENV_RELEASE_AUTHOR: &str = "RELEASE_AUTHOR";
pub const ENV_GITHUB_ACTOR: &str = "GITHUB_ACTOR";
pub const ENV_RELEASE_DATE: &str = "RELEASE_DATE";
pub const ENV_RELEASE_VERSION: &str = "RELEASE_VERSION";

/// Values supplied by the invoking environment
#[derive(Debug, Clone, Default)]
pub struct MetadataInputs {
    pub author_override: Option<String>,
    pub ci_actor: Option<String>,
    pub date_override: Option<String>,
    pub version_override: Option<String>,
}

impl MetadataInputs {
    /// Read the override variables from the process environment
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            author_override: var(ENV_RELEASE_AUTHOR),
            ci_actor: var(ENV_GITHUB_ACTOR),
            date_override: var(ENV_RELEASE_DATE),
            version_override: var(ENV_RELEASE_VERSION),
        }
    }

    /// Command-line values take precedence over the environment
    pub fn with_cli(
        mut self,
        author: Option<String>,
        date: Option<String>,
        version: Option<String>,
    ) -> Self {
        if author.is_some() {
            self.author_override = author;
        }
        if date.is_some() {
            self.date_override = date;
        }
        if version.is_some() {
            self.version_override = version;
        }
        self
    }
}

/// Where metadata sources live on disk
#[derive(Debug, Clone)]
pub struct MetadataPaths {
    pub project_root: PathBuf,
    pub version_file: PathBuf,
    pub author_document: Option<PathBuf>,
    /// Extra environment for git queries, e.g. `GIT_CONFIG_GLOBAL`
    pub git_env: Vec<(String, String)>,
}

/// Resolved metadata plus how each field was obtained
#[derive(Debug, Clone)]
pub struct ResolvedMetadata {
    pub metadata: ReportMetadata,
    pub version: Resolution,
    pub author: Resolution,
    pub date: Resolution,
}

/// Resolve version, author and date.
///
/// - version: override, version file, `0.0.0`
/// - author: override, CI actor, `docAuthor` front matter of the author
///   document, `git config user.name`, `Unknown`
/// - date: override (`YYYY-MM-DD`), date of the latest commit, today
pub fn resolve_metadata(inputs: &MetadataInputs, paths: &MetadataPaths) -> ResolvedMetadata {
    let version = FallbackChain::new(UNKNOWN_VERSION)
        .then(input("version override", &inputs.version_override))
        .then(VersionFile(paths.version_file.clone()))
        .resolve();

    let mut author = FallbackChain::new(UNKNOWN_AUTHOR)
        .then(input("author override", &inputs.author_override))
        .then(input("CI actor", &inputs.ci_actor));
    if let Some(document) = &paths.author_document {
        author = author.then(FrontMatter {
            path: document.clone(),
            key: "docAuthor",
        });
    }
    let author = author
        .then(GitConfig {
            root: paths.project_root.clone(),
            env: paths.git_env.clone(),
            key: "user.name",
        })
        .resolve();

    let date = FallbackChain::new(format_date(today()))
        .then(DateOverride(inputs.date_override.clone()))
        .then(LatestCommitDate {
            root: paths.project_root.clone(),
            env: paths.git_env.clone(),
        })
        .resolve();

    ResolvedMetadata {
        metadata: ReportMetadata {
            version: version.value.clone(),
            author: author.value.clone(),
            date: date.value.clone(),
        },
        version,
        author,
        date,
    }
}

fn input<'a>(
    name: &'a str,
    value: &'a Option<String>,
) -> FnSource<impl Fn() -> Result<Option<String>> + 'a> {
    FnSource::new(name, move || Ok(value.clone()))
}

/// Trimmed content of the version file
struct VersionFile(PathBuf);

impl MetadataSource for VersionFile {
    fn name(&self) -> String {
        format!("version file {}", self.0.display())
    }

    fn lookup(&self) -> Result<Option<String>> {
        if !self.0.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.0)
            .wrap_err_with(|| format!("Failed to read {}", self.0.display()))?;
        Ok(Some(content.trim().to_string()))
    }
}

/// A key of a document's front matter
struct FrontMatter {
    path: PathBuf,
    key: &'static str,
}

impl MetadataSource for FrontMatter {
    fn name(&self) -> String {
        format!("{} in {}", self.key, self.path.display())
    }

    fn lookup(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)
            .wrap_err_with(|| format!("Failed to read {}", self.path.display()))?;
        Ok(front_matter_value(&text, self.key))
    }
}

/// `git config <key>` in the project root
struct GitConfig {
    root: PathBuf,
    env: Vec<(String, String)>,
    key: &'static str,
}

impl MetadataSource for GitConfig {
    fn name(&self) -> String {
        format!("git config {}", self.key)
    }

    fn lookup(&self) -> Result<Option<String>> {
        git_capture(&self.root, &self.env, &["config", self.key]).map(Some)
    }
}

/// Explicit date, which must be a calendar date
struct DateOverride(Option<String>);

impl MetadataSource for DateOverride {
    fn name(&self) -> String {
        "date override".to_string()
    }

    fn lookup(&self) -> Result<Option<String>> {
        match self.0.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_calendar_date(value).map(|d| Some(format_date(d))),
        }
    }
}

/// Author date of the latest commit, as a calendar date in its own offset
struct LatestCommitDate {
    root: PathBuf,
    env: Vec<(String, String)>,
}

impl MetadataSource for LatestCommitDate {
    fn name(&self) -> String {
        "latest commit date".to_string()
    }

    fn lookup(&self) -> Result<Option<String>> {
        let iso = git_capture(&self.root, &self.env, &["log", "-1", "--format=%aI"])?;
        let iso = iso.trim();
        if iso.is_empty() {
            return Ok(None);
        }
        let timestamp = OffsetDateTime::parse(iso, &Rfc3339)
            .wrap_err_with(|| format!("Unrecognized commit timestamp '{}'", iso))?;
        Ok(Some(format_date(timestamp.date())))
    }
}

/// Run a git command in the project root and capture trimmed stdout.
pub fn git_capture(
    project_root: &Path,
    env: &[(String, String)],
    args: &[&str],
) -> Result<String> {
    let out = std::process::Command::new("git")
        .args(args)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(project_root)
        .output()
        .wrap_err("failed to run git")?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }

    String::from_utf8(out.stdout)
        .map(|s| s.trim().to_string())
        .wrap_err_with(|| format!("git {} output is not valid UTF-8", args.join(" ")))
}

/// Parse `YYYY-MM-DD`
pub fn parse_calendar_date(value: &str) -> Result<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .wrap_err_with(|| format!("'{}' is not a YYYY-MM-DD date", value))
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
