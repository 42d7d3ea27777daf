//! SEO presence audit for a web project tree.
//!
//! Walks the project, looks for well-known SEO files and for source patterns
//! (metadata exports, Open Graph, JSON-LD and so on), and reports which were
//! found. Informational only: nothing is validated and a missing item is not
//! an error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into.
const SKIP_DIRS: &[&str] = &["node_modules", ".next", ".git", "target", "dist", "out"];

/// Source extensions scanned for patterns.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "html"];

/// Files larger than this are not scanned for patterns.
const MAX_SCAN_BYTES: u64 = 1024 * 1024;

/// Evidence paths kept per check.
const MAX_EVIDENCE: usize = 3;

#[derive(Debug, Error)]
pub enum SeoAuditError {
    #[error("Project root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

static METADATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+(const\s+metadata\b|(async\s+)?function\s+generateMetadata\b)")
        .expect("Invalid regex")
});

static OPEN_GRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"openGraph\s*:|property=["']og:"#).expect("Invalid regex"));

static TWITTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"twitter\s*:\s*\{|name=["']twitter:card"#).expect("Invalid regex"));

static JSON_LD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"application/ld\+json").expect("Invalid regex"));

static CANONICAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"canonical\s*:|rel=["']canonical"#).expect("Invalid regex")
});

/// What a check looks for.
enum Signal {
    /// Any of these paths, relative to the root, exists.
    Files(&'static [&'static str]),
    /// Some scanned source file matches.
    Pattern(&'static LazyLock<Regex>),
}

struct CheckDef {
    name: &'static str,
    signal: Signal,
}

static CHECKS: &[CheckDef] = &[
    CheckDef {
        name: "robots.txt",
        signal: Signal::Files(&["public/robots.txt", "app/robots.ts", "app/robots.js", "src/app/robots.ts"]),
    },
    CheckDef {
        name: "Sitemap",
        signal: Signal::Files(&[
            "public/sitemap.xml",
            "app/sitemap.ts",
            "app/sitemap.js",
            "src/app/sitemap.ts",
            "next-sitemap.config.js",
        ]),
    },
    CheckDef {
        name: "Metadata exports",
        signal: Signal::Pattern(&METADATA_RE),
    },
    CheckDef {
        name: "Open Graph tags",
        signal: Signal::Pattern(&OPEN_GRAPH_RE),
    },
    CheckDef {
        name: "Twitter cards",
        signal: Signal::Pattern(&TWITTER_RE),
    },
    CheckDef {
        name: "JSON-LD structured data",
        signal: Signal::Pattern(&JSON_LD_RE),
    },
    CheckDef {
        name: "Canonical URLs",
        signal: Signal::Pattern(&CANONICAL_RE),
    },
    CheckDef {
        name: "Web manifest",
        signal: Signal::Files(&[
            "public/manifest.json",
            "public/site.webmanifest",
            "app/manifest.ts",
            "app/manifest.json",
        ]),
    },
    CheckDef {
        name: "Favicon",
        signal: Signal::Files(&["public/favicon.ico", "app/favicon.ico", "app/icon.png", "app/icon.svg"]),
    },
    CheckDef {
        name: "Next.js config",
        signal: Signal::Files(&["next.config.js", "next.config.mjs", "next.config.ts"]),
    },
];

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoCheck {
    pub name: &'static str,
    pub found: bool,
    /// Up to a few relative paths that satisfied the check.
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SeoReport {
    pub root: PathBuf,
    pub checks: Vec<SeoCheck>,
    pub files_scanned: usize,
}

impl SeoReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.found).count()
    }

    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        self.checks.iter().filter(|c| !c.found).map(|c| c.name).collect()
    }

    #[must_use]
    pub fn check(&self, name: &str) -> Option<&SeoCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for SeoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SEO audit: {}", self.root.display())?;
        for check in &self.checks {
            let mark = if check.found { "ok  " } else { "miss" };
            write!(f, "  [{mark}] {}", check.name)?;
            if !check.evidence.is_empty() {
                write!(f, " ({})", check.evidence.join(", "))?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "{}/{} checks found, {} source files scanned",
            self.passed(),
            self.checks.len(),
            self.files_scanned
        )
    }
}

/// Audit the project rooted at `root`.
///
/// # Errors
///
/// Returns `RootNotFound` if `root` is not a directory. Unreadable entries
/// below the root are skipped.
pub fn audit(root: &Path) -> Result<SeoReport, SeoAuditError> {
    if !root.is_dir() {
        return Err(SeoAuditError::RootNotFound(root.to_path_buf()));
    }

    let sources = collect_sources(root)?;

    let mut checks: Vec<SeoCheck> = CHECKS
        .iter()
        .map(|def| SeoCheck {
            name: def.name,
            found: false,
            evidence: Vec::new(),
        })
        .collect();

    for (def, check) in CHECKS.iter().zip(checks.iter_mut()) {
        if let Signal::Files(candidates) = def.signal {
            check.evidence = candidates
                .iter()
                .filter(|rel| root.join(rel).is_file())
                .take(MAX_EVIDENCE)
                .map(|rel| (*rel).to_string())
                .collect();
        }
    }

    for (rel, path) in &sources {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Skipping unreadable file {:?}: {}", path, e);
                continue;
            }
        };
        for (def, check) in CHECKS.iter().zip(checks.iter_mut()) {
            if let Signal::Pattern(re) = def.signal {
                if check.evidence.len() < MAX_EVIDENCE && re.is_match(&content) {
                    check.evidence.push(rel.clone());
                }
            }
        }
    }

    for check in &mut checks {
        check.found = !check.evidence.is_empty();
    }

    Ok(SeoReport {
        root: root.to_path_buf(),
        checks,
        files_scanned: sources.len(),
    })
}

/// Collect `(relative, absolute)` paths of scannable source files.
///
/// Symlinks are not followed, so a link back into the tree is never
/// re-entered.
fn collect_sources(root: &Path) -> Result<Vec<(String, PathBuf)>, SeoAuditError> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

    let mut out = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let scannable = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
        let small = entry.metadata().is_ok_and(|m| m.len() <= MAX_SCAN_BYTES);
        if scannable && small {
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap_or_else(|_| entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            out.push((rel, entry.into_path()));
        }
    }
    Ok(out)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRS.contains(&name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_empty_project_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let report = audit(dir.path()).unwrap();
        assert_eq!(report.passed(), 0);
        assert_eq!(report.missing().len(), CHECKS.len());
        assert_eq!(report.files_scanned, 0);
    }

    #[test]
    fn test_detects_files_and_patterns() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "public/robots.txt", "User-agent: *");
        write(root, "app/sitemap.ts", "export default function sitemap() {}");
        write(root, "next.config.js", "module.exports = {}");
        write(
            root,
            "app/layout.tsx",
            "export const metadata = { openGraph: { title: 'Ankkor' }, twitter: { card: 'summary' } };",
        );
        write(
            root,
            "app/product/[handle]/page.tsx",
            r#"<script type="application/ld+json" />
            export async function generateMetadata() { return { alternates: { canonical: '/x' } } }"#,
        );

        let report = audit(root).unwrap();
        for name in [
            "robots.txt",
            "Sitemap",
            "Metadata exports",
            "Open Graph tags",
            "Twitter cards",
            "JSON-LD structured data",
            "Canonical URLs",
            "Next.js config",
        ] {
            assert!(report.check(name).unwrap().found, "{name} not found");
        }
        assert_eq!(report.missing(), vec!["Web manifest", "Favicon"]);
        assert_eq!(
            report.check("Metadata exports").unwrap().evidence,
            vec!["app/layout.tsx", "app/product/[handle]/page.tsx"]
        );
    }

    #[test]
    fn test_skips_dependency_directories() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "node_modules/pkg/index.js",
            r#"<script type="application/ld+json" />"#,
        );
        write(dir.path(), ".next/server/page.js", "export const metadata = {}");

        let report = audit(dir.path()).unwrap();
        assert_eq!(report.files_scanned, 0);
        assert!(!report.check("JSON-LD structured data").unwrap().found);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_not_followed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "app/layout.tsx", "export const metadata = {};");
        std::os::unix::fs::symlink(root, root.join("app/loop")).unwrap();

        let report = audit(root).unwrap();
        assert_eq!(report.files_scanned, 1);
        assert_eq!(
            report.check("Metadata exports").unwrap().evidence,
            vec!["app/layout.tsx"]
        );
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = audit(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SeoAuditError::RootNotFound(_)));
    }

    #[test]
    fn test_report_display() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "public/favicon.ico", "");
        let text = audit(dir.path()).unwrap().to_string();
        assert!(text.contains("[ok  ] Favicon (public/favicon.ico)"));
        assert!(text.contains("[miss] Sitemap"));
        assert!(text.ends_with("1/10 checks found, 0 source files scanned"));
    }
}
