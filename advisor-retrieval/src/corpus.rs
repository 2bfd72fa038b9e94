use advisor_core::DocumentMetadata;
use std::collections::BTreeSet;

use crate::ingestion::SeedDocument;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn seed(
    id: &str,
    title: &str,
    source: &str,
    kind: &str,
    symbols: &[&str],
    sectors: &[&str],
    content: &str,
) -> SeedDocument {
    SeedDocument {
        id: Some(id.to_string()),
        content: content.to_string(),
        metadata: DocumentMetadata {
            title: title.to_string(),
            source: source.to_string(),
            kind: kind.to_string(),
            symbols: set(symbols),
            sectors: set(sectors),
        },
    }
}

/// Built-in finance corpus used when no corpus file is configured, so a bare
/// boot still has retrieval material to answer against.
pub fn default_corpus() -> Vec<SeedDocument> {
    vec![
        seed(
            "diversification-basics",
            "Diversification and Asset Allocation",
            "Investing Handbook",
            "education",
            &[],
            &[],
            "Diversification spreads portfolio capital across asset classes, sectors, and \
             geographies so that no single position dominates returns. A common allocation \
             framework weighs equities, bonds, and cash against the investor's horizon and \
             risk tolerance, then rebalances periodically to keep the portfolio near its \
             target weights. Concentrated portfolios can outperform in bull markets but \
             suffer deeper drawdowns when a single holding or sector falls out of favor.",
        ),
        seed(
            "risk-volatility",
            "Understanding Volatility and Risk Metrics",
            "Investing Handbook",
            "education",
            &[],
            &[],
            "Volatility measures how widely an asset's returns swing around their average. \
             Standard deviation and beta are the most common risk metrics: beta compares a \
             stock's moves to the broader market, while maximum drawdown captures the worst \
             peak-to-trough loss an investor would have endured. Higher expected returns \
             generally require accepting higher volatility, and hedging with options or \
             defensive assets can reduce exposure at a cost.",
        ),
        seed(
            "apple-earnings",
            "Apple Quarterly Earnings Overview",
            "Market Research Desk",
            "earnings_report",
            &["AAPL"],
            &["technology"],
            "Apple's quarterly earnings are driven by iPhone revenue, services growth, and \
             gross margin guidance. AAPL trades on earnings outlook more than on trailing \
             results: a strong services quarter with soft hardware guidance has historically \
             pressured the stock. Analysts watch unit economics in wearables and the \
             installed-base figure as leading indicators for the services segment.",
        ),
        seed(
            "microsoft-cloud",
            "Microsoft Cloud Segment Analysis",
            "Market Research Desk",
            "research",
            &["MSFT"],
            &["technology"],
            "Microsoft's Intelligent Cloud segment, led by Azure, is the company's primary \
             growth engine. MSFT guidance hinges on Azure's constant-currency growth rate \
             and commercial bookings. Enterprise seat expansion in productivity software \
             provides a recurring-revenue floor that supports the valuation through \
             hardware cycles.",
        ),
        seed(
            "index-funds",
            "Index Funds and ETFs",
            "Investing Handbook",
            "education",
            &["SPY", "VOO"],
            &[],
            "Index funds and exchange-traded funds track a market benchmark such as the \
             S&P 500 at low cost. Because most active managers underperform their benchmark \
             after fees over long horizons, broad index exposure through vehicles like SPY \
             or VOO is the default core holding for many portfolios. Expense ratio, \
             tracking error, and liquidity are the main selection criteria.",
        ),
        seed(
            "bonds-rates",
            "Bonds and Interest Rate Sensitivity",
            "Investing Handbook",
            "education",
            &[],
            &["fixed_income"],
            "Bond prices move inversely to interest rates, with duration measuring the \
             sensitivity: a bond with a duration of five loses roughly five percent of its \
             price for a one-point rise in rates. Short-duration treasuries behave like \
             cash, while long-duration and high-yield credit carry equity-like drawdown \
             risk in stress scenarios. Laddering maturities smooths reinvestment risk.",
        ),
        seed(
            "market-cycles",
            "Market Cycles and Sector Rotation",
            "Market Research Desk",
            "market_analysis",
            &[],
            &["energy", "financials", "technology"],
            "Equity markets move through cycles in which leadership rotates between \
             sectors. Early-cycle recoveries favor financials and consumer discretionary, \
             mid-cycle expansions favor technology and industrials, and late-cycle phases \
             favor energy and defensive staples. Macro trend indicators such as yield-curve \
             shape and credit spreads help identify the prevailing phase, though no single \
             signal is reliable on its own.",
        ),
        seed(
            "earnings-season",
            "Reading an Earnings Report",
            "Investing Handbook",
            "education",
            &[],
            &[],
            "An earnings report contains the income statement, guidance, and management \
             commentary. Headline earnings per share is compared against consensus \
             estimates, but revenue quality, margin trend, and forward guidance usually \
             move the stock more than the headline beat or miss. News coverage during \
             earnings season amplifies short-term volatility around the print.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_corpus_well_formed() {
        let corpus = default_corpus();
        assert!(corpus.len() >= 6);

        let mut ids = std::collections::HashSet::new();
        for seed in &corpus {
            let id = seed.id.as_deref().expect("built-in seeds carry ids");
            assert!(ids.insert(id.to_string()), "duplicate id {id}");
            assert!(!seed.content.trim().is_empty());
            assert!(!seed.metadata.title.is_empty());
            assert!(!seed.metadata.source.is_empty());
        }
    }

    #[test]
    fn test_default_corpus_covers_key_symbols() {
        let corpus = default_corpus();
        let has_symbol = |sym: &str| {
            corpus
                .iter()
                .any(|s| s.metadata.symbols.contains(sym))
        };
        assert!(has_symbol("AAPL"));
        assert!(has_symbol("MSFT"));
    }
}
