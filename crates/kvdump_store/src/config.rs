//! Store configuration.

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the store if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to fail if the store doesn't exist yet.
    ///
    /// Takes precedence over `create_if_missing`.
    pub error_if_missing: bool,

    /// Whether damaged log records are fatal.
    ///
    /// When false, a torn or corrupted tail found while opening is cut off
    /// at the last intact record and the store opens with what survived.
    pub strict: bool,

    /// Whether to fsync the log when the store is closed.
    pub sync_on_close: bool,

    /// Whether the store is opened for reading only.
    ///
    /// A read-only store never creates, appends to or truncates its log. In
    /// non-strict mode a damaged tail is skipped rather than cut off.
    pub read_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            error_if_missing: false,
            strict: true,
            sync_on_close: false,
            read_only: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the store if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether a missing store is an error.
    #[must_use]
    pub const fn error_if_missing(mut self, value: bool) -> Self {
        self.error_if_missing = value;
        self
    }

    /// Sets strict corruption handling.
    #[must_use]
    pub const fn strict(mut self, value: bool) -> Self {
        self.strict = value;
        self
    }

    /// Sets whether to fsync the log on close.
    #[must_use]
    pub const fn sync_on_close(mut self, value: bool) -> Self {
        self.sync_on_close = value;
        self
    }

    /// Sets read-only access.
    #[must_use]
    pub const fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    /// Returns true if opening may create a new store.
    #[must_use]
    pub const fn may_create(&self) -> bool {
        self.create_if_missing && !self.error_if_missing && !self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.create_if_missing);
        assert!(!config.error_if_missing);
        assert!(config.strict);
        assert!(!config.sync_on_close);
        assert!(!config.read_only);
        assert!(config.may_create());
    }

    #[test]
    fn error_if_missing_wins_over_create() {
        let config = Config::new().create_if_missing(true).error_if_missing(true);
        assert!(!config.may_create());
    }

    #[test]
    fn read_only_never_creates() {
        let config = Config::new().create_if_missing(true).read_only(true);
        assert!(!config.may_create());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new().strict(false).sync_on_close(true);
        assert!(!config.strict);
        assert!(config.sync_on_close);
    }
}
