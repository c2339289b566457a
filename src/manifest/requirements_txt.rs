//! requirements.txt reader for pip
//!
//! One PEP 508 specifier per logical line; a trailing `\` continues the line
//! (the pip-compile `--hash` layout). Comments, blank lines and pip options
//! (`-r`, `-e`, `--index-url`, ...) are skipped, as are per-requirement options
//! such as `--hash=...`. Direct URL and VCS references cannot be pinned to a
//! registry version and produce a warning.

use crate::domain::{Ecosystem, RawDeclaration};
use crate::error::ParseWarning;
use crate::manifest::{Declarations, ManifestKind, ManifestReader};
use crate::parser::split_requirement;
use std::str::Lines;

/// Reader for requirements files
pub struct RequirementsTxtReader;

fn strip_comment(line: &str) -> &str {
    if line.starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Physical lines joined across trailing backslashes, with the first line number
struct LogicalLines<'a> {
    lines: std::iter::Enumerate<Lines<'a>>,
}

impl<'a> LogicalLines<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines().enumerate(),
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = (usize, String);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, first) = self.lines.next()?;
        let mut text = String::new();
        let mut current = first;
        loop {
            let trimmed = current.trim_end();
            match trimmed.strip_suffix('\\') {
                Some(head) => {
                    text.push_str(head);
                    text.push(' ');
                    match self.lines.next() {
                        Some((_, next)) => current = next,
                        None => break,
                    }
                }
                None => {
                    text.push_str(trimmed);
                    break;
                }
            }
        }
        Some((idx + 1, text))
    }
}

/// Drops per-requirement options (`--hash=...`, `--config-settings ...`)
fn strip_options(spec: &str) -> &str {
    match spec.find(" --").or_else(|| spec.find("\t--")) {
        Some(idx) => spec[..idx].trim_end(),
        None => spec,
    }
}

fn is_url_reference(spec: &str) -> bool {
    spec.contains("://")
        || spec.contains(" @ ")
        || ["git+", "hg+", "svn+", "bzr+", "./", "../", "/"]
            .iter()
            .any(|prefix| spec.starts_with(prefix))
}

impl ManifestReader for RequirementsTxtReader {
    fn kind(&self) -> ManifestKind {
        ManifestKind::Requirements
    }

    fn declarations<'a>(&'a self, content: &'a str) -> Declarations<'a> {
        Box::new(LogicalLines::new(content).filter_map(|(line, raw)| {
            let spec = strip_comment(raw.trim()).trim();
            if spec.is_empty() || spec.starts_with('-') {
                return None;
            }
            let spec = strip_options(spec);

            if is_url_reference(spec) {
                return Some(Err(ParseWarning::at(
                    line,
                    format!("unsupported URL or VCS requirement '{spec}'"),
                )));
            }

            Some(match split_requirement(spec) {
                Some((name, constraint)) => {
                    Ok(RawDeclaration::runtime(Ecosystem::Pip, name, constraint).at_line(line))
                }
                None => Err(ParseWarning::at(line, format!("invalid requirement '{spec}'"))),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scope;

    #[test]
    fn test_requirements() {
        let content = "# pinned deps\nrequests==2.31.0\nDjango>=4.2,<5.0  # web\n\n-r base.txt\n--index-url https://example.org/simple\nnumpy; platform_system != 'Windows'\n";
        let decls: Vec<_> = RequirementsTxtReader
            .declarations(content)
            .collect::<Result<_, _>>()
            .unwrap();

        let summary: Vec<_> = decls
            .iter()
            .map(|d| (d.name.as_str(), d.version_constraint.as_str(), d.line))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("requests", "==2.31.0", Some(2)),
                ("Django", ">=4.2,<5.0", Some(3)),
                ("numpy", "", Some(7)),
            ]
        );
        assert!(decls.iter().all(|d| d.scope == Scope::Runtime));
    }

    #[test]
    fn test_vcs_and_url_warn() {
        let content = "git+https://github.com/psf/requests.git#egg=requests\npkg @ https://example.org/pkg.whl\nsix\n";
        let results: Vec<_> = RequirementsTxtReader.declarations(content).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_err());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().name, "six");
    }

    #[test]
    fn test_hashed_requirements() {
        let content = "requests==2.31.0 \\\n    --hash=sha256:58cd2187c01e70e6e26505bca751777aa9f2ee0b7f4300988b709f44e013003f \\\n    --hash=sha256:942c5a758f98d790eaed1a29cb6eefc7ffb0d1cf7af05c3d2791656dbd6ad1e1\n    # via -r requirements.in\nsix==1.16.0 --hash=sha256:8abb2f1d86890a2dfb989f9a77cfcfd3e47c2a354b01111771326f8aa26e0254\nidna==3.4\n";
        let decls: Vec<_> = RequirementsTxtReader
            .declarations(content)
            .collect::<Result<_, _>>()
            .unwrap();

        let summary: Vec<_> = decls
            .iter()
            .map(|d| (d.name.as_str(), d.version_constraint.as_str(), d.line))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("requests", "==2.31.0", Some(1)),
                ("six", "==1.16.0", Some(5)),
                ("idna", "==3.4", Some(6)),
            ]
        );
    }

    #[test]
    fn test_trailing_backslash_at_end_of_file() {
        let decls: Vec<_> = RequirementsTxtReader
            .declarations("click>=8.0 \\")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].version_constraint, ">=8.0");
    }

    #[test]
    fn test_invalid_line_warns() {
        let results: Vec<_> = RequirementsTxtReader.declarations(">=1.0\n").collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap_err().line, Some(1));
    }
}
