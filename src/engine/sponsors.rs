use std::collections::{HashMap, HashSet};

use crate::types::{SponsorSummary, SponsoredSnapshot};

/// Per-sponsor accumulator, keyed by the lowercased address.
#[derive(Debug, Default)]
struct SponsorRollup {
    address: String,
    net_usdc: f64,
    markets: HashSet<String>,
}

/// Rank sponsors by net contribution (`amount - returned`, summed).
///
/// Addresses that differ only in case are merged. `market_count` is the number
/// of distinct markets sponsored. Equal totals keep first-seen order.
pub fn top_sponsors(snapshot: &SponsoredSnapshot, limit: usize) -> Vec<SponsorSummary> {
    let (_, mut rollups) = snapshot.events.iter().fold(
        (HashMap::<String, usize>::new(), Vec::<SponsorRollup>::new()),
        |(mut index, mut rollups), event| {
            let key = event.sponsor.to_lowercase();
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                rollups.push(SponsorRollup {
                    address: key,
                    ..SponsorRollup::default()
                });
                rollups.len() - 1
            });
            let rollup = &mut rollups[slot];
            rollup.net_usdc += event.net_usdc();
            rollup.markets.insert(event.market_id.clone());
            (index, rollups)
        },
    );

    rollups.sort_by(|a, b| b.net_usdc.total_cmp(&a.net_usdc));

    rollups
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| SponsorSummary {
            rank: i + 1,
            address: r.address,
            net_usdc: r.net_usdc,
            market_count: r.markets.len(),
        })
        .collect()
}
