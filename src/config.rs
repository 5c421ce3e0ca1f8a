//! Solver configuration: worker count, table kind and memory budgets

use std::str::FromStr;

use thiserror::Error;

/// Default and maximum megabytes for the small table
pub const THREADMEM_SMALL_DEF_MB: usize = 20;
pub const THREADMEM_SMALL_MAX_MB: usize = 30;
/// Default and maximum megabytes for the large table
pub const THREADMEM_LARGE_DEF_MB: usize = 95;
pub const THREADMEM_LARGE_MAX_MB: usize = 160;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("unknown transposition table kind {0:?} (expected \"small\" or \"large\")")]
    UnknownTtKind(String),
    #[error("memory budget must be at least 1 MB")]
    ZeroMemory,
    #[error("default memory {default} MB exceeds maximum {max} MB")]
    DefaultExceedsMaximum { default: usize, max: usize },
}

/// Which transposition table backend a slot uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TtKind {
    /// Search tree index with wholesale reset when full
    Small,
    /// Hashed block pool with age-based harvesting
    #[default]
    Large,
}

impl TtKind {
    pub fn default_memory_mb(self) -> usize {
        match self {
            TtKind::Small => THREADMEM_SMALL_DEF_MB,
            TtKind::Large => THREADMEM_LARGE_DEF_MB,
        }
    }

    pub fn max_memory_mb(self) -> usize {
        match self {
            TtKind::Small => THREADMEM_SMALL_MAX_MB,
            TtKind::Large => THREADMEM_LARGE_MAX_MB,
        }
    }
}

impl FromStr for TtKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" | "s" => Ok(TtKind::Small),
            "large" | "l" => Ok(TtKind::Large),
            _ => Err(ConfigError::UnknownTtKind(s.to_string())),
        }
    }
}

/// How a batch is spread over workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadBackend {
    /// One board after another on the calling thread
    Sequential,
    /// A rayon pool with one solve slot per worker
    #[default]
    Rayon,
}

impl FromStr for ThreadBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" | "none" => Ok(ThreadBackend::Sequential),
            "rayon" => Ok(ThreadBackend::Rayon),
            _ => Err(ConfigError::InvalidValue {
                key: "backend",
                value: s.to_string(),
            }),
        }
    }
}

/// Pruning aids used by the search. Turning any of them off changes only
/// the amount of work, never a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub quick_tricks: bool,
    pub later_tricks: bool,
    pub trans_table: bool,
    /// Skip moves equivalent to an earlier losing move
    pub rank_skip: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            quick_tricks: true,
            later_tricks: true,
            trans_table: true,
            rank_skip: true,
        }
    }
}

impl SearchOptions {
    /// Plain alpha-beta with no shortcuts and no table
    pub fn plain() -> Self {
        SearchOptions {
            quick_tricks: false,
            later_tricks: false,
            trans_table: false,
            rank_skip: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Number of solve slots (0 = auto-detect)
    pub threads: usize,
    pub tt_kind: TtKind,
    pub memory_default_mb: usize,
    pub memory_max_mb: usize,
    pub backend: ThreadBackend,
    pub options: SearchOptions,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::with_tt_kind(TtKind::default())
    }
}

impl SolverConfig {
    /// Default configuration with the memory budgets of the given table kind
    pub fn with_tt_kind(tt_kind: TtKind) -> Self {
        SolverConfig {
            threads: 0,
            tt_kind,
            memory_default_mb: tt_kind.default_memory_mb(),
            memory_max_mb: tt_kind.max_memory_mb(),
            backend: ThreadBackend::default(),
            options: SearchOptions::default(),
        }
    }

    /// Defaults overlaid with `DDS_THREADS`, `DDS_TT_KIND`, `DDS_MEMORY_MB`
    /// and `DDS_MAX_MEMORY_MB` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_kind(None)
    }

    /// Like `from_env`, with `tt_kind` (when given) taking the place of
    /// `DDS_TT_KIND`. The memory variables still apply on top of it.
    pub fn from_env_with_kind(tt_kind: Option<TtKind>) -> Result<Self, ConfigError> {
        Self::from_lookup_with_kind(tt_kind, |key| std::env::var(key).ok())
    }

    #[cfg(test)]
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::from_lookup_with_kind(None, lookup)
    }

    fn from_lookup_with_kind(
        tt_kind: Option<TtKind>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let tt_kind = match (tt_kind, lookup("DDS_TT_KIND")) {
            (Some(kind), _) => kind,
            (None, Some(kind)) => kind.parse()?,
            (None, None) => TtKind::default(),
        };
        let mut config = SolverConfig::with_tt_kind(tt_kind);
        if let Some(threads) = lookup("DDS_THREADS") {
            config.threads = parse_number("DDS_THREADS", &threads)?;
        }
        if let Some(mb) = lookup("DDS_MEMORY_MB") {
            config.memory_default_mb = parse_number("DDS_MEMORY_MB", &mb)?;
        }
        if let Some(mb) = lookup("DDS_MAX_MEMORY_MB") {
            config.memory_max_mb = parse_number("DDS_MAX_MEMORY_MB", &mb)?;
        }
        if let Some(backend) = lookup("DDS_BACKEND") {
            config.backend = backend.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_default_mb == 0 || self.memory_max_mb == 0 {
            return Err(ConfigError::ZeroMemory);
        }
        if self.memory_default_mb > self.memory_max_mb {
            return Err(ConfigError::DefaultExceedsMaximum {
                default: self.memory_default_mb,
                max: self.memory_max_mb,
            });
        }
        Ok(())
    }

    /// Get the actual number of workers to use.
    pub fn actual_threads(&self) -> usize {
        if self.threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.threads
        }
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_follow_tt_kind() {
        let small = SolverConfig::with_tt_kind(TtKind::Small);
        assert_eq!(small.memory_default_mb, 20);
        assert_eq!(small.memory_max_mb, 30);
        let large = SolverConfig::default();
        assert_eq!(large.tt_kind, TtKind::Large);
        assert_eq!(large.memory_max_mb, 160);
        assert!(large.validate().is_ok());
    }

    #[test]
    fn test_env_overlay() {
        let config = SolverConfig::from_lookup(lookup(&[
            ("DDS_TT_KIND", "small"),
            ("DDS_THREADS", "3"),
            ("DDS_MEMORY_MB", "10"),
            ("DDS_BACKEND", "sequential"),
        ]))
        .unwrap();
        assert_eq!(config.tt_kind, TtKind::Small);
        assert_eq!(config.threads, 3);
        assert_eq!(config.memory_default_mb, 10);
        assert_eq!(config.memory_max_mb, 30);
        assert_eq!(config.backend, ThreadBackend::Sequential);
    }

    #[test]
    fn test_explicit_kind_keeps_env_memory() {
        let config = SolverConfig::from_lookup_with_kind(
            Some(TtKind::Small),
            lookup(&[
                ("DDS_TT_KIND", "large"),
                ("DDS_MEMORY_MB", "12"),
                ("DDS_MAX_MEMORY_MB", "25"),
            ]),
        )
        .unwrap();
        assert_eq!(config.tt_kind, TtKind::Small);
        assert_eq!(config.memory_default_mb, 12);
        assert_eq!(config.memory_max_mb, 25);

        let config =
            SolverConfig::from_lookup_with_kind(Some(TtKind::Large), lookup(&[])).unwrap();
        assert_eq!(config, SolverConfig::with_tt_kind(TtKind::Large));
    }

    #[test]
    fn test_env_errors() {
        assert_eq!(
            SolverConfig::from_lookup(lookup(&[("DDS_TT_KIND", "huge")])),
            Err(ConfigError::UnknownTtKind("huge".to_string()))
        );
        assert!(matches!(
            SolverConfig::from_lookup(lookup(&[("DDS_THREADS", "many")])),
            Err(ConfigError::InvalidValue { key: "DDS_THREADS", .. })
        ));
        assert_eq!(
            SolverConfig::from_lookup(lookup(&[("DDS_MEMORY_MB", "500")])),
            Err(ConfigError::DefaultExceedsMaximum { default: 500, max: 160 })
        );
    }

    #[test]
    fn test_actual_threads() {
        let mut config = SolverConfig::default();
        assert!(config.actual_threads() >= 1);
        config.threads = 2;
        assert_eq!(config.actual_threads(), 2);
    }
}
