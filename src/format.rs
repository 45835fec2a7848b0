//! Plain-text rendering of query results for tool-calling clients.

use crate::config::MARKET_ID_FALLBACK_CHARS;
use crate::types::{Opportunity, OpportunityReport, SponsorSummary, SponsoredSnapshot};

pub fn format_usd(v: f64) -> String {
    format!("${v:.2}")
}

/// First `max` characters of `s`, no ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn rewards_summary(snapshot: &SponsoredSnapshot) -> String {
    let o = &snapshot.overall;
    [
        format!("Total deposited: {}", format_usd(o.total_amount_usdc)),
        format!("Net amount: {}", format_usd(o.net_amount_usdc)),
        format!("Consumed (paid to LPs): {}", format_usd(o.total_consumed_usdc)),
        format!("Returned to sponsors: {}", format_usd(o.total_returned_usdc)),
        format!("Total events: {}", o.total_events),
        format!("Unique markets: {}", o.unique_markets),
        format!("Unique sponsors: {}", o.unique_sponsors),
        format!("Block range: {} → {}", snapshot.from_block, snapshot.to_block),
        format!("Updated: {}", snapshot.fetched_at_text()),
    ]
    .join("\n")
}

fn opportunity_block(o: &Opportunity) -> String {
    let e = &o.event;
    let title = e
        .market_question
        .clone()
        .unwrap_or_else(|| truncate(&e.market_id, MARKET_ID_FALLBACK_CHARS));

    let mut lines = vec![
        title,
        format!(
            "  Amount: {} | Rate: {}/day | {}d left",
            format_usd(e.amount_usdc),
            format_usd(e.rate_per_day_usdc),
            o.days_remaining
        ),
        format!("  Sponsor: {}", e.sponsor),
    ];
    if let Some(url) = &o.event_url {
        lines.push(format!("  URL: {url}"));
    }
    lines.push(format!("  Tx: {}", o.tx_url));
    lines.join("\n")
}

pub fn opportunities_text(report: &OpportunityReport) -> String {
    let header = format!(
        "Active opportunities: {}\nTotal daily rate: {}/day\nFilters: min ${}/day, limit {}\n",
        report.count,
        format_usd(report.total_daily_rate),
        report.min_rate_per_day,
        report.limit,
    );
    let blocks: Vec<String> = report.opportunities.iter().map(opportunity_block).collect();
    header + &blocks.join("\n\n")
}

pub fn sponsors_text(ranked: &[SponsorSummary]) -> String {
    let lines: Vec<String> = ranked
        .iter()
        .map(|s| {
            let noun = if s.market_count == 1 { "market" } else { "markets" };
            format!(
                "{}. {} — {} across {} {noun}",
                s.rank,
                s.address,
                format_usd(s.net_usdc),
                s.market_count
            )
        })
        .collect();
    format!("Top {} sponsors:\n\n{}", ranked.len(), lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{rank, RankParams};
    use crate::types::fixtures::{event, now, snapshot};

    #[test]
    fn summary_lists_totals_and_range() {
        let mut snap = snapshot(vec![]);
        snap.overall.total_amount_usdc = 1234.5;
        snap.overall.total_events = 7;
        let text = rewards_summary(&snap);

        assert!(text.starts_with("Total deposited: $1234.50\n"));
        assert!(text.contains("Total events: 7"));
        assert!(text.contains("Block range: 69000000 → 70100000"));
        assert!(text.ends_with("Updated: 2025-06-01T12:00:00.000Z"));
    }

    #[test]
    fn opportunity_falls_back_to_market_id() {
        let mut e = event("0x0123456789abcdef0123456789abcdef0123456789abcdef", "0xabc", 2.5);
        e.market_question = None;
        e.event_slug = Some("slug".to_string());
        let report = rank(&snapshot(vec![e]), now(), RankParams::default());
        let text = opportunities_text(&report);

        assert!(text.starts_with(
            "Active opportunities: 1\nTotal daily rate: $2.50/day\nFilters: min $0/day, limit 50\n"
        ));
        assert!(text.contains("\n0x0123456789abcdef0123456789abcdef012345\n"));
        assert!(text.contains("  Amount: $25.00 | Rate: $2.50/day | 9d left"));
        assert!(text.contains("  URL: https://polymarket.com/event/slug"));
        assert!(text.contains("  Tx: https://polygonscan.com/tx/0xtx0x0123"));
    }

    #[test]
    fn opportunity_without_slug_has_no_url_line() {
        let report = rank(&snapshot(vec![event("m1", "0xabc", 1.0)]), now(), RankParams::default());
        let text = opportunities_text(&report);
        assert!(text.contains("Will m1 resolve yes?"));
        assert!(!text.contains("URL:"));
    }

    #[test]
    fn sponsor_lines_pluralize() {
        let ranked = vec![
            SponsorSummary { rank: 1, address: "0xa".into(), net_usdc: 130.0, market_count: 2 },
            SponsorSummary { rank: 2, address: "0xb".into(), net_usdc: 0.0, market_count: 1 },
        ];
        let text = sponsors_text(&ranked);
        assert_eq!(
            text,
            "Top 2 sponsors:\n\n1. 0xa — $130.00 across 2 markets\n2. 0xb — $0.00 across 1 market"
        );
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ab", 10), "ab");
    }
}
