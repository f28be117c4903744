//! Single key/value updates to INI-style profile files
//!
//! Section and key names compare case-insensitively. Everything not touched by
//! an update (comments, blank lines, ordering, other keys) is written back as
//! it was read.

use crate::error::{Result, SetProxyError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Section { name: String, raw: String },
    Entry { key: String, value: String, raw: String },
    Other(String),
}

impl Line {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(rest) = trimmed.strip_prefix('[') {
            if let Some(end) = rest.find(']') {
                return Line::Section {
                    name: rest[..end].trim().to_string(),
                    raw: raw.to_string(),
                };
            }
        }
        if !trimmed.starts_with(';') && !trimmed.starts_with('#') {
            if let Some((key, value)) = raw.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    return Line::Entry {
                        key: key.to_string(),
                        value: value.trim().to_string(),
                        raw: raw.to_string(),
                    };
                }
            }
        }
        Line::Other(raw.to_string())
    }

    fn entry(key: &str, value: &str) -> Self {
        Line::Entry {
            key: key.to_string(),
            value: value.to_string(),
            raw: format!("{key}={value}"),
        }
    }

    fn is_section(&self, name: &str) -> bool {
        matches!(self, Line::Section { name: s, .. } if s.eq_ignore_ascii_case(name))
    }

    fn is_key(&self, name: &str) -> bool {
        matches!(self, Line::Entry { key, .. } if key.eq_ignore_ascii_case(name))
    }
}

/// An INI-style file held in memory
#[derive(Debug, Clone)]
pub struct Profile {
    path: PathBuf,
    lines: Vec<Line>,
    crlf: bool,
}

impl Profile {
    /// Read `path`; a missing file is an empty profile
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(SetProxyError::Profile { path, source: e }),
        };

        Ok(Self::parse(path, &contents))
    }

    fn parse(path: PathBuf, contents: &str) -> Self {
        Self {
            path,
            lines: contents.lines().map(Line::parse).collect(),
            crlf: contents.contains("\r\n"),
        }
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let (start, end) = self.section_range(section)?;
        self.lines[start..end].iter().find_map(|line| match line {
            Line::Entry { key: k, value, .. } if k.eq_ignore_ascii_case(key) => {
                Some(value.as_str())
            }
            _ => None,
        })
    }

    /// Set `key` in `section`, creating either as needed
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let Some((start, end)) = self.section_range(section) else {
            let needs_gap = match self.lines.last() {
                None => false,
                Some(Line::Other(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };
            if needs_gap {
                self.lines.push(Line::Other(String::new()));
            }
            self.lines.push(Line::Section {
                name: section.to_string(),
                raw: format!("[{section}]"),
            });
            self.lines.push(Line::entry(key, value));
            return;
        };

        if let Some(idx) = (start..end).find(|&i| self.lines[i].is_key(key)) {
            let existing = match &self.lines[idx] {
                Line::Entry { key, .. } => key.clone(),
                _ => key.to_string(),
            };
            self.lines[idx] = Line::entry(&existing, value);
            return;
        }

        // After the last entry, so trailing comments and blanks stay with the next section
        let insert_at = (start..end)
            .rev()
            .find(|&i| matches!(self.lines[i], Line::Entry { .. }))
            .map_or(start + 1, |i| i + 1);
        self.lines.insert(insert_at, Line::entry(key, value));
    }

    /// Index range covering the section header and its body
    fn section_range(&self, section: &str) -> Option<(usize, usize)> {
        let header = self.lines.iter().position(|l| l.is_section(section))?;
        let end = self.lines[header + 1..]
            .iter()
            .position(|l| matches!(l, Line::Section { .. }))
            .map_or(self.lines.len(), |off| header + 1 + off);
        Some((header, end))
    }

    pub fn contents(&self) -> String {
        let eol = if self.crlf { "\r\n" } else { "\n" };
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Section { raw, .. } | Line::Entry { raw, .. } | Line::Other(raw) => {
                    out.push_str(raw)
                }
            }
            out.push_str(eol);
        }
        out
    }

    /// Replace the file on disk with the current contents
    pub fn save(&self) -> Result<()> {
        let err = |source: io::Error| SetProxyError::Profile {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(err)?;
        tmp.write_all(self.contents().as_bytes()).map_err(err)?;
        tmp.persist(&self.path).map_err(|e| err(e.error))?;
        Ok(())
    }
}

/// Write one `key=value` into `section` of the profile file at `path`
pub fn write_profile_string(path: &Path, section: &str, key: &str, value: &str) -> Result<()> {
    let mut profile = Profile::load(path)?;
    profile.set(section, key, value);
    profile.save()?;
    tracing::debug!("Set [{section}] {key} in {:?}", path);
    Ok(())
}
