use moka::sync::Cache;

use crate::models::{
    CompetitionLevel, MarketRating, MarketReport, MarketTrend, Opportunity, OpportunityKind,
    PriceRange, PropertyRecord,
};

/// Aggregate market statistics over a result set.
///
/// All aggregates default to 0 when no records carry the required field;
/// an empty input never fails. The last report per location is kept in a
/// small overwrite-on-recompute cache.
pub struct MarketAnalyzer {
    cache: Cache<String, MarketReport>,
}

impl MarketAnalyzer {
    pub fn new(cache_size: u64) -> Self {
        Self {
            cache: Cache::new(cache_size),
        }
    }

    /// Build a market report and cache it under the location key.
    pub fn analyze(&self, properties: &[PropertyRecord], location: &str) -> MarketReport {
        let report = build_report(properties, location);
        self.cache.insert(location.to_string(), report.clone());
        report
    }

    /// Last computed report for a location, if any.
    pub fn cached(&self, location: &str) -> Option<MarketReport> {
        self.cache.get(location)
    }
}

fn build_report(properties: &[PropertyRecord], location: &str) -> MarketReport {
    let prices: Vec<f64> = properties
        .iter()
        .map(|p| p.price)
        .filter(|price| *price > 0.0)
        .collect();
    let days: Vec<u32> = properties
        .iter()
        .filter_map(|p| p.days_on_market)
        .filter(|days| *days > 0)
        .collect();

    let average_price = mean(&prices);
    let median_price = median(&prices);
    let price_range = PriceRange {
        min: prices.iter().copied().fold(f64::INFINITY, f64::min),
        max: prices.iter().copied().fold(0.0, f64::max),
    };
    let price_range = if prices.is_empty() {
        PriceRange::default()
    } else {
        price_range
    };

    let average_days_on_market = if days.is_empty() {
        0.0
    } else {
        days.iter().map(|d| f64::from(*d)).sum::<f64>() / days.len() as f64
    };

    // Mean of per-record price/area ratios, not mean price over mean area
    let ratios: Vec<f64> = properties.iter().filter_map(|p| p.price_per_sqft()).collect();
    let average_price_per_sqft = mean(&ratios);

    let with_dom = properties.iter().filter_map(|p| p.days_on_market);
    let dom_count = with_dom.clone().count();
    let recent_count = with_dom.filter(|days| *days < 30).count();
    let recent_listing_pct = if dom_count == 0 {
        0.0
    } else {
        recent_count as f64 / dom_count as f64 * 100.0
    };

    let trend = classify_trend(average_days_on_market, recent_listing_pct, dom_count);
    let (competition_score, competition_level) = competition(
        properties.len(),
        average_days_on_market,
        dom_count,
        &price_range,
    );
    let opportunities = find_opportunities(properties, average_price);
    let market_score = market_score(
        average_days_on_market,
        dom_count,
        properties.len(),
        average_price,
    );

    MarketReport {
        location: location.to_string(),
        listing_count: properties.len(),
        average_price,
        median_price,
        price_range,
        average_price_per_sqft,
        average_days_on_market,
        recent_listing_pct,
        trend,
        competition_score,
        competition_level,
        opportunities,
        market_score,
        rating: rating_for(market_score),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn classify_trend(avg_days: f64, recent_pct: f64, dom_count: usize) -> MarketTrend {
    if dom_count > 0 && avg_days < 15.0 && recent_pct > 60.0 {
        MarketTrend::Hot
    } else if dom_count > 0 && avg_days < 30.0 && recent_pct > 40.0 {
        MarketTrend::Sellers
    } else if avg_days < 60.0 {
        MarketTrend::Balanced
    } else {
        MarketTrend::Buyers
    }
}

/// 0-8 point competition score: listing volume (0-3), market speed (0-3),
/// and price spread narrowness (0-2).
fn competition(
    listing_count: usize,
    avg_days: f64,
    dom_count: usize,
    price_range: &PriceRange,
) -> (u8, CompetitionLevel) {
    let volume = match listing_count {
        n if n >= 50 => 3,
        n if n >= 20 => 2,
        n if n >= 10 => 1,
        _ => 0,
    };

    let speed = if dom_count == 0 {
        0
    } else if avg_days < 15.0 {
        3
    } else if avg_days < 30.0 {
        2
    } else if avg_days < 60.0 {
        1
    } else {
        0
    };

    // A narrow spread relative to the top price means listings cluster
    // tightly, which reads as a more competitive market
    let narrowness = if price_range.max > 0.0 {
        let spread_ratio = (price_range.max - price_range.min) / price_range.max;
        if spread_ratio < 0.25 {
            2
        } else if spread_ratio < 0.50 {
            1
        } else {
            0
        }
    } else {
        0
    };

    let score = volume + speed + narrowness;
    let level = match score {
        s if s >= 7 => CompetitionLevel::VeryHigh,
        s if s >= 5 => CompetitionLevel::High,
        s if s >= 3 => CompetitionLevel::Moderate,
        _ => CompetitionLevel::Low,
    };
    (score, level)
}

fn find_opportunities(properties: &[PropertyRecord], average_price: f64) -> Vec<Opportunity> {
    let mut opportunities = Vec::new();

    let stale = properties
        .iter()
        .filter(|p| matches!(p.days_on_market, Some(days) if days > 90))
        .count();
    if stale > 0 {
        opportunities.push(Opportunity {
            kind: OpportunityKind::StaleListings,
            count: stale,
            description: format!(
                "{} listings over 90 days on market - sellers may be motivated",
                stale
            ),
        });
    }

    if average_price > 0.0 {
        let underpriced = properties
            .iter()
            .filter(|p| p.price > 0.0 && p.price < 0.85 * average_price)
            .count();
        if underpriced > 0 {
            opportunities.push(Opportunity {
                kind: OpportunityKind::UnderpricedListings,
                count: underpriced,
                description: format!(
                    "{} listings priced well below the area average",
                    underpriced
                ),
            });
        }
    }

    let fresh = properties
        .iter()
        .filter(|p| matches!(p.days_on_market, Some(days) if days < 7))
        .count();
    if fresh > 5 {
        opportunities.push(Opportunity {
            kind: OpportunityKind::FreshInventory,
            count: fresh,
            description: format!("{} new listings in the last week - fresh inventory", fresh),
        });
    }

    opportunities
}

/// 0-100 market health score: base 50, days-on-market tier, inventory
/// tier, and a price-sanity bonus.
fn market_score(avg_days: f64, dom_count: usize, listing_count: usize, average_price: f64) -> u8 {
    let mut score: i32 = 50;

    if dom_count > 0 {
        score += if avg_days < 15.0 {
            25
        } else if avg_days < 30.0 {
            15
        } else if avg_days < 60.0 {
            5
        } else {
            -10
        };
    }

    score += if listing_count >= 20 {
        15
    } else if listing_count >= 10 {
        10
    } else if listing_count < 5 {
        -15
    } else {
        0
    };

    if (100_000.0..=1_000_000.0).contains(&average_price) {
        score += 10;
    }

    score.clamp(0, 100) as u8
}

fn rating_for(score: u8) -> MarketRating {
    match score {
        s if s >= 80 => MarketRating::Excellent,
        s if s >= 60 => MarketRating::Good,
        s if s >= 40 => MarketRating::Fair,
        _ => MarketRating::Poor,
    }
}
