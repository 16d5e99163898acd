//! Reader and writer options.

use chrono::{DateTime, Utc};

/// Options for writing `.pzfx` files.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Fixed number of decimals for cell values (default: shortest exact form).
    pub decimals: Option<usize>,
    /// `CreatedByProgram` attribute.
    pub created_by_program: String,
    /// `CreatedByVersion` attribute.
    pub created_by_version: String,
    /// `DateTime` attribute; omitted when unset so output is reproducible.
    pub created_at: Option<DateTime<Utc>>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            decimals: None,
            created_by_program: "pzfx".to_string(),
            created_by_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: None,
        }
    }
}

impl WriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write every value with exactly this many decimals (trailing zeros trimmed).
    #[must_use]
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = Some(decimals);
        self
    }

    #[must_use]
    pub fn with_program(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.created_by_program = name.into();
        self.created_by_version = version.into();
        self
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Stamp the file with the current time.
    #[must_use]
    pub fn created_now(self) -> Self {
        self.with_created_at(Utc::now())
    }
}

/// Options for reading `.pzfx` files.
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    /// Reject unknown table types and tables missing from `TableSequence`.
    pub strict: bool,
}

impl ReaderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict validation.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}
