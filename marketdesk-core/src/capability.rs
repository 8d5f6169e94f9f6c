use core::fmt;
use serde::{Deserialize, Serialize};

/// High-level capability labels for routing, errors, and telemetry.
///
/// These map one-to-one with desk operations and allow consistent Display
/// formatting, per-capability provider ordering, and match-exhaustive
/// handling when adding new operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Fast point-in-time price snapshot for a single symbol.
    Quote,
    /// Descriptive quote enrichment (name, volume, market cap, P/E, 52-week range).
    QuoteEnrichment,
    /// Historical daily OHLCV bars.
    History,
    /// Recent news articles for a symbol.
    News,
    /// Free-text symbol search.
    Search,
    /// Macroeconomic series observations and metadata.
    MacroSeries,
    /// Company reference profile.
    Profile,
}

impl Capability {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::QuoteEnrichment => "quote-enrichment",
            Self::History => "history",
            Self::News => "news",
            Self::Search => "search",
            Self::MacroSeries => "macro-series",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
