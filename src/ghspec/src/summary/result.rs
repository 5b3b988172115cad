//! Processing result types.

/// Result of processing a single repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingResult {
    /// Repository matches its definition or license template.
    Matches {
        /// Repository full name.
        repository: String,
    },

    /// Repository differs and was left alone.
    Differs {
        repository: String,
        /// Rendered diffs, one per attribute.
        diffs: Vec<String>,
    },

    /// Repository differed and fix pull requests were opened.
    Fixed {
        repository: String,
        /// Number of pull requests opened.
        pull_requests: usize,
    },

    /// Repository exists but has no definition.
    Unexpected { repository: String },

    /// Repository is declared but does not exist.
    Missing { repository: String },

    /// License type could not be detected.
    Undetermined {
        repository: String,
        /// Why detection failed.
        reason: String,
    },

    /// Processing was skipped.
    Skipped {
        repository: String,
        /// Reason for skipping.
        reason: String,
    },

    /// Processing failed.
    Failed {
        repository: String,
        /// Error message.
        error: String,
    },
}

impl ProcessingResult {
    /// Full name of the repository the result is for.
    #[must_use]
    pub fn repository(&self) -> &str {
        match self {
            Self::Matches { repository }
            | Self::Differs { repository, .. }
            | Self::Fixed { repository, .. }
            | Self::Unexpected { repository }
            | Self::Missing { repository }
            | Self::Undetermined { repository, .. }
            | Self::Skipped { repository, .. }
            | Self::Failed { repository, .. } => repository,
        }
    }
}
