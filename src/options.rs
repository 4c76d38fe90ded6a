//! Pipeline options for page extraction.

use crate::claim::DEFAULT_STATEMENT_CAP;
use crate::complexity::DEFAULT_MAX_ARGUMENT_CHARS;
use crate::identifier::IdentifierOptions;
use crate::structure::DEFAULT_HEAD_WINDOW;

/// Options for controlling extraction behavior.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Identifier recovery settings used for algorithm names.
    pub identifier: IdentifierOptions,

    /// Characters at the head of a page inspected by the structural locator.
    pub head_window: usize,

    /// Maximum claim statement length in characters.
    pub statement_cap: usize,

    /// Maximum complexity-token argument length in characters.
    pub max_argument_chars: usize,

    /// Whether to process pages in parallel.
    pub parallel: bool,

    /// What to do when a page file is missing.
    pub missing_pages: MissingPagePolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            identifier: IdentifierOptions::default(),
            head_window: DEFAULT_HEAD_WINDOW,
            statement_cap: DEFAULT_STATEMENT_CAP,
            max_argument_chars: DEFAULT_MAX_ARGUMENT_CHARS,
            parallel: true,
            missing_pages: MissingPagePolicy::Skip,
        }
    }
}

impl PipelineOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits identifier recovery to `passes` gap-collapse passes.
    pub fn with_identifier_passes(mut self, passes: usize) -> Self {
        self.identifier = self.identifier.with_max_passes(passes);
        self
    }

    /// Sets the structural locator window.
    pub fn with_head_window(mut self, chars: usize) -> Self {
        self.head_window = chars;
        self
    }

    /// Sets the claim statement cap.
    pub fn with_statement_cap(mut self, chars: usize) -> Self {
        self.statement_cap = chars;
        self
    }

    /// Sets the complexity-token argument cap.
    pub fn with_max_argument_chars(mut self, chars: usize) -> Self {
        self.max_argument_chars = chars;
        self
    }

    /// Emits an empty record for every missing page.
    pub fn emit_missing(mut self) -> Self {
        self.missing_pages = MissingPagePolicy::EmitEmpty;
        self
    }

    /// Disables parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// How to handle a page whose input file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPagePolicy {
    /// Leave the page out of the output.
    #[default]
    Skip,
    /// Emit a minimal `content` record flagged as empty.
    EmitEmpty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PipelineOptions::new();
        assert!(options.parallel);
        assert_eq!(options.head_window, 500);
        assert_eq!(options.statement_cap, 400);
        assert_eq!(options.missing_pages, MissingPagePolicy::Skip);
        assert_eq!(options.identifier.max_passes, None);
    }

    #[test]
    fn test_builder_chain() {
        let options = PipelineOptions::new()
            .sequential()
            .emit_missing()
            .with_identifier_passes(0)
            .with_statement_cap(120);
        assert!(!options.parallel);
        assert_eq!(options.missing_pages, MissingPagePolicy::EmitEmpty);
        assert_eq!(options.identifier.max_passes, Some(1));
        assert_eq!(options.statement_cap, 120);
    }
}
