use crate::wildcard::Wildcard;
use log;
use once_cell::sync::Lazy;

/// Text templates whose generated output is nested beneath them.
pub const GENERATED_TEMPLATE_PATTERN: &str = "*.tt";

static GENERATED_TEMPLATE: Lazy<Wildcard> = Lazy::new(|| Wildcard::multi(GENERATED_TEMPLATE_PATTERN));

/// Decides whether a leaf's name makes it a formatting target.
#[derive(Debug, Clone)]
pub struct FileFilter {
    inclusion: Wildcard,
    exclusion: Wildcard,
}

impl FileFilter {
    /// An empty inclusion pattern includes everything; an empty exclusion
    /// pattern excludes nothing. Both accept `;`-separated alternatives.
    pub fn new(inclusion_pattern: &str, exclusion_pattern: &str) -> Self {
        Self {
            inclusion: Wildcard::multi(inclusion_pattern),
            exclusion: Wildcard::multi(exclusion_pattern),
        }
    }

    pub fn accepts(&self, name: &str) -> bool {
        let included =
            self.inclusion.pattern().is_empty() || self.inclusion.is_match(name);
        if !included {
            log::trace!("File not included by pattern: {}", name);
            return false;
        }
        let excluded =
            !self.exclusion.pattern().is_empty() && self.exclusion.is_match(name);
        if excluded {
            log::trace!("File excluded by pattern: {}", name);
            return false;
        }
        true
    }

    pub fn inclusion_pattern(&self) -> &str {
        self.inclusion.pattern()
    }

    pub fn exclusion_pattern(&self) -> &str {
        self.exclusion.pattern()
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Decides whether traversal descends into a container.
///
/// Only gates expansion of children. Leaves are judged by [`FileFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyFilter {
    exclude_generated_artifacts: bool,
}

impl HierarchyFilter {
    pub fn new(exclude_generated_artifacts: bool) -> Self {
        Self {
            exclude_generated_artifacts,
        }
    }

    pub fn accepts(&self, container_name: &str) -> bool {
        if self.exclude_generated_artifacts && GENERATED_TEMPLATE.is_match(container_name) {
            log::trace!("Not descending into generated template: {}", container_name);
            return false;
        }
        true
    }

    pub fn excludes_generated_artifacts(&self) -> bool {
        self.exclude_generated_artifacts
    }
}

impl Default for HierarchyFilter {
    fn default() -> Self {
        Self::new(true)
    }
}
