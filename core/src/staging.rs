//! File staging model.
//!
//! Holds the files chosen for upload until the form is submitted. The set
//! is insertion-ordered and enforces the configured [`FileLimits`]:
//!
//! - no two members share a `(name, size)` identity,
//! - every member's media type is on the allow-list,
//! - every member fits the per-file cap (if any),
//! - the member count never exceeds the count cap (if any),
//! - the total size is kept under the total cap or reported, depending on
//!   the [`TotalSizePolicy`].
//!
//! Adding files never fails: partial success is the common case, so the
//! outcome is described by an [`AddReport`].
//!
//! The payload type `P` is opaque to the model. The browser stores a
//! `web_sys::File`, the command-line tool the file's bytes.

use std::fmt;

use crate::config::{FileLimits, TotalSizePolicy};
use crate::format::format_bytes;

// =============================================================================
// Attached Files
// =============================================================================

/// Identity used for de-duplication: equal name and size means same file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub name: String,
    pub size: u64,
}

impl FileIdentity {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self { name: name.into(), size }
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, format_bytes(self.size))
    }
}

/// A file chosen by the user, plus its payload.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachedFile<P> {
    pub name: String,
    pub size: u64,
    pub media_type: String,
    pub payload: P,
}

impl<P> AttachedFile<P> {
    pub fn new(name: impl Into<String>, size: u64, media_type: impl Into<String>, payload: P) -> Self {
        Self {
            name: name.into(),
            size,
            media_type: media_type.into(),
            payload,
        }
    }

    pub fn identity(&self) -> FileIdentity {
        FileIdentity::new(self.name.clone(), self.size)
    }

    fn has_identity(&self, name: &str, size: u64) -> bool {
        self.name == name && self.size == size
    }
}

// =============================================================================
// Add Report
// =============================================================================

/// Outcome of [`StagingSet::add`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Number of candidates appended.
    pub added: usize,
    /// Candidates refused because their media type is not allowed.
    pub rejected_unsupported: Vec<String>,
    /// Candidates refused because they exceed the per-file cap.
    pub rejected_oversized: Vec<String>,
    /// Candidates refused under [`TotalSizePolicy::RejectExcess`].
    pub rejected_over_total: Vec<String>,
    /// Candidates ignored because an identical file is already staged.
    pub duplicates: Vec<String>,
    /// At least one candidate was dropped because the count cap was full.
    pub count_cap_reached: bool,
    /// The total cap was (or would have been) exceeded.
    pub total_exceeded: bool,
}

impl AddReport {
    /// True when every candidate was accepted and no cap was hit.
    pub fn is_clean(&self) -> bool {
        self.rejected_unsupported.is_empty()
            && self.rejected_oversized.is_empty()
            && self.rejected_over_total.is_empty()
            && !self.count_cap_reached
            && !self.total_exceeded
    }

    /// Lines shown under the drop zone. Duplicates are not mentioned.
    pub fn messages(&self, limits: &FileLimits) -> Vec<String> {
        let mut messages = Vec::new();

        if !self.rejected_unsupported.is_empty() {
            messages.push(format!(
                "Unsupported file type: {}",
                self.rejected_unsupported.join(", ")
            ));
        }
        if !self.rejected_oversized.is_empty() {
            let cap = limits.max_file_size.map(format_bytes).unwrap_or_default();
            messages.push(format!(
                "File too large (max {cap} each): {}",
                self.rejected_oversized.join(", ")
            ));
        }
        if self.count_cap_reached {
            if let Some(max) = limits.max_files {
                messages.push(format!("You can attach up to {max} files."));
            }
        }
        if self.total_exceeded {
            let cap = format_bytes(limits.max_total_size);
            if self.rejected_over_total.is_empty() {
                messages.push(format!(
                    "Total size exceeds {cap}. Remove some files before submitting."
                ));
            } else {
                messages.push(format!(
                    "Total size would exceed {cap}: {}",
                    self.rejected_over_total.join(", ")
                ));
            }
        }

        messages
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Render-ready view of the staged set.
#[derive(Debug, PartialEq)]
pub struct Snapshot<'a, P> {
    pub files: &'a [AttachedFile<P>],
    pub total_size: u64,
    pub count: usize,
    pub max_total_size: u64,
    pub within_limits: bool,
}

impl<P> Snapshot<'_, P> {
    /// Fraction of the total cap in use, clamped to `1.0`.
    pub fn usage_ratio(&self) -> f64 {
        (self.total_size as f64 / self.max_total_size as f64).min(1.0)
    }

    /// `"2 files · 1.5 MB of 25 MB"`.
    pub fn summary(&self) -> String {
        let noun = if self.count == 1 { "file" } else { "files" };
        format!(
            "{} {noun} · {} of {}",
            self.count,
            format_bytes(self.total_size),
            format_bytes(self.max_total_size)
        )
    }
}

// =============================================================================
// Staging Set
// =============================================================================

/// The authoritative set of attached files for one form.
#[derive(Clone, Debug)]
pub struct StagingSet<P> {
    limits: FileLimits,
    files: Vec<AttachedFile<P>>,
}

impl<P> StagingSet<P> {
    /// An empty set enforcing `limits`.
    pub fn new(limits: FileLimits) -> Self {
        Self { limits, files: Vec::new() }
    }

    pub fn limits(&self) -> &FileLimits {
        &self.limits
    }

    /// Stage `candidates` in order.
    ///
    /// Per candidate: duplicates are skipped, files over the per-file cap
    /// are rejected as oversized, disallowed media types as unsupported,
    /// and anything past the count cap is dropped. The total cap is then
    /// handled by the configured [`TotalSizePolicy`]. An empty candidate
    /// list (a cancelled picker) leaves the set untouched.
    pub fn add(&mut self, candidates: impl IntoIterator<Item = AttachedFile<P>>) -> AddReport {
        let mut report = AddReport::default();
        let policy = self.limits.total_size_policy;

        for candidate in candidates {
            if self.contains_identity(&candidate.name, candidate.size) {
                report.duplicates.push(candidate.name);
                continue;
            }
            if self.limits.max_file_size.is_some_and(|cap| candidate.size > cap) {
                log::warn!("Rejected oversized file {}", candidate.name);
                report.rejected_oversized.push(candidate.name);
                continue;
            }
            if !self.limits.allows(&candidate.media_type) {
                log::warn!(
                    "Rejected {} with unsupported type '{}'",
                    candidate.name,
                    candidate.media_type
                );
                report.rejected_unsupported.push(candidate.name);
                continue;
            }
            if self.limits.max_files.is_some_and(|cap| self.files.len() >= cap) {
                report.count_cap_reached = true;
                continue;
            }
            if policy == TotalSizePolicy::RejectExcess
                && self.total_size() + candidate.size > self.limits.max_total_size
            {
                report.total_exceeded = true;
                report.rejected_over_total.push(candidate.name);
                continue;
            }

            self.files.push(candidate);
            report.added += 1;
        }

        if self.total_size() > self.limits.max_total_size {
            log::warn!(
                "Staged files total {} (cap {})",
                format_bytes(self.total_size()),
                format_bytes(self.limits.max_total_size)
            );
            report.total_exceeded = true;
        }

        log::debug!("Staged {} file(s), {} in set", report.added, self.files.len());
        report
    }

    /// Remove the member with the given identity. Absent identities are a no-op.
    pub fn remove(&mut self, identity: &FileIdentity) -> Option<AttachedFile<P>> {
        let index = self
            .files
            .iter()
            .position(|f| f.has_identity(&identity.name, identity.size))?;
        Some(self.files.remove(index))
    }

    /// Drop every staged file.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn contains(&self, identity: &FileIdentity) -> bool {
        self.contains_identity(&identity.name, identity.size)
    }

    fn contains_identity(&self, name: &str, size: u64) -> bool {
        self.files.iter().any(|f| f.has_identity(name, size))
    }

    pub fn files(&self) -> &[AttachedFile<P>] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Whether the set currently satisfies the count and total caps.
    pub fn within_limits(&self) -> bool {
        let count_ok = self.limits.max_files.map_or(true, |cap| self.files.len() <= cap);
        count_ok && self.total_size() <= self.limits.max_total_size
    }

    pub fn snapshot(&self) -> Snapshot<'_, P> {
        Snapshot {
            files: &self.files,
            total_size: self.total_size(),
            count: self.files.len(),
            max_total_size: self.limits.max_total_size,
            within_limits: self.within_limits(),
        }
    }
}
