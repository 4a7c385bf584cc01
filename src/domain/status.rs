//! Working tree status of the output repository.

use std::path::PathBuf;

/// Working tree status, parsed from `git status --porcelain`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputStatus {
    /// Files not known to git
    pub untracked: Vec<PathBuf>,
    /// Tracked files changed in the working tree
    pub modified: Vec<PathBuf>,
    /// Tracked files missing from the working tree
    pub deleted: Vec<PathBuf>,
    /// Paths with changes already in the index
    pub staged: Vec<PathBuf>,
}

impl OutputStatus {
    /// Parse NUL-separated `git status --porcelain -z` output
    pub fn parse_porcelain_z(raw: &str) -> Self {
        let mut status = Self::default();
        let mut entries = raw.split('\0').filter(|e| !e.is_empty());

        while let Some(entry) = entries.next() {
            if entry.len() < 4 {
                continue;
            }
            let mut codes = entry.chars();
            let index = codes.next().unwrap_or(' ');
            let worktree = codes.next().unwrap_or(' ');
            let path = PathBuf::from(&entry[3..]);

            // Renames and copies carry the original path as the next entry
            if matches!(index, 'R' | 'C') {
                entries.next();
            }

            match (index, worktree) {
                ('?', '?') => status.untracked.push(path),
                ('!', '!') => {}
                (i, w) => {
                    if i != ' ' {
                        status.staged.push(path.clone());
                    }
                    match w {
                        'M' => status.modified.push(path),
                        'D' => status.deleted.push(path),
                        _ => {}
                    }
                }
            }
        }

        status
    }

    /// Any uncommitted change at all: untracked, modified, deleted or staged
    pub fn is_dirty(&self) -> bool {
        !(self.untracked.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.staged.is_empty())
    }

    /// Files the publisher stages: untracked plus modified, never deletions
    pub fn publishable(&self) -> Vec<PathBuf> {
        self.untracked
            .iter()
            .chain(self.modified.iter())
            .cloned()
            .collect()
    }

    pub fn description(&self) -> String {
        if !self.is_dirty() {
            return "Clean".to_string();
        }
        let mut parts = Vec::new();
        if !self.modified.is_empty() {
            parts.push(format!("{}M", self.modified.len()));
        }
        if !self.deleted.is_empty() {
            parts.push(format!("{}D", self.deleted.len()));
        }
        if !self.staged.is_empty() {
            parts.push(format!("{}S", self.staged.len()));
        }
        if !self.untracked.is_empty() {
            parts.push(format!("{}?", self.untracked.len()));
        }
        parts.join(" ")
    }
}

impl std::fmt::Display for OutputStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
