use advisor_core::{AnalysisType, RetrievalContext};
use std::collections::BTreeSet;

/// Classifies a user message (plus its retrieved context) into a coarse
/// analysis category. Pluggable so tests can pin a deterministic classifier.
pub trait QueryClassifier: Send + Sync {
    fn classify(&self, message: &str, context: &RetrievalContext) -> AnalysisType;
}

/// Extracts candidate ticker symbols from free text. Heuristic by design,
/// not exhaustive.
pub trait SymbolExtractor: Send + Sync {
    fn extract(&self, text: &str) -> BTreeSet<String>;
}

/// Keyword-based classifier over the lowercased message and context.
///
/// Categories are checked in priority order; the first hit wins and
/// everything else falls through to `General`.
#[derive(Debug, Default, Clone)]
pub struct KeywordClassifier;

const PORTFOLIO_KEYWORDS: &[&str] = &[
    "portfolio",
    "allocation",
    "holding",
    "diversif",
    "rebalanc",
    "position size",
];
const RISK_KEYWORDS: &[&str] = &["risk", "volatil", "drawdown", "hedge", "hedging", "exposure"];
const NEWS_KEYWORDS: &[&str] = &["news", "headline", "announce", "press release"];
const MARKET_KEYWORDS: &[&str] = &[
    "market", "sector", "trend", "outlook", "economy", "earnings", "index",
];

impl QueryClassifier for KeywordClassifier {
    fn classify(&self, message: &str, context: &RetrievalContext) -> AnalysisType {
        let mut haystack = message.to_lowercase();
        haystack.push(' ');
        haystack.push_str(&context.context.to_lowercase());

        let matches = |keywords: &[&str]| keywords.iter().any(|k| haystack.contains(k));

        if matches(PORTFOLIO_KEYWORDS) {
            AnalysisType::Portfolio
        } else if matches(RISK_KEYWORDS) {
            AnalysisType::Risk
        } else if matches(NEWS_KEYWORDS) {
            AnalysisType::News
        } else if matches(MARKET_KEYWORDS) {
            AnalysisType::Market
        } else {
            AnalysisType::General
        }
    }
}

/// Matches uppercase tokens of one to five letters, minus a stopword list of
/// common English words and finance abbreviations that look like tickers.
#[derive(Debug, Default, Clone)]
pub struct TickerPatternExtractor;

const TICKER_STOPWORDS: &[&str] = &[
    "A", "AI", "AM", "AN", "AND", "API", "AS", "AT", "BE", "BUY", "BY", "CEO", "CFO", "DO", "EPS",
    "ETF", "FAQ", "FOR", "GDP", "GO", "I", "IF", "IN", "IPO", "IS", "IT", "LLC", "ME", "MY", "NO",
    "NOT", "NYSE", "OF", "OK", "ON", "OR", "PE", "Q", "SELL", "SO", "THE", "TO", "UP", "US",
    "USA", "USD", "VS", "YOY",
];

impl SymbolExtractor for TickerPatternExtractor {
    fn extract(&self, text: &str) -> BTreeSet<String> {
        text.split(|c: char| !c.is_ascii_alphabetic())
            .filter(|token| {
                (1..=5).contains(&token.len())
                    && token.chars().all(|c| c.is_ascii_uppercase())
                    && !TICKER_STOPWORDS.contains(token)
            })
            .map(|token| token.to_string())
            .collect()
    }
}
