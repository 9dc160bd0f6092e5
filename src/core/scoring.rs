use std::collections::BTreeMap;

use crate::models::{
    Interaction, InteractionAction, PropertyRecord, PropertyType, ScoredProperty, UserProfile,
};

const BASE_SCORE: f64 = 50.0;

/// Suitability scorer driven by the accumulated user profile.
///
/// Scoring formula (base 50, additive, clamped to 0-100):
/// - price affinity: up to +25 when within 20% of the user's average price
/// - property-type affinity: min(20, interaction count for the type * 10)
/// - bedroom affinity: +15 exact match, +8 off by one
/// - freshness: +10 under 7 days on market, +5 over 60
/// - price-per-sqft: +15 under $150/sqft, else +10 under $200
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score a result set against the profile.
    ///
    /// Output is the same length as the input, sorted descending by score;
    /// ties keep their input order.
    pub fn score(&self, properties: &[PropertyRecord], profile: &UserProfile) -> Vec<ScoredProperty> {
        let mut scored: Vec<ScoredProperty> = properties
            .iter()
            .map(|property| {
                let breakdown = score_property(property, profile);
                ScoredProperty {
                    property: property.clone(),
                    score: breakdown.total(),
                    reasons: breakdown.reasons(property),
                }
            })
            .collect();

        // sort_by is stable, so equal scores keep their input order
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }
}

/// Individual factor contributions for one property.
#[derive(Debug, Clone, Copy, Default)]
struct ScoreBreakdown {
    price_affinity: f64,
    type_affinity: f64,
    bedroom_affinity: f64,
    freshness: f64,
    efficiency: f64,
}

impl ScoreBreakdown {
    fn total(&self) -> u8 {
        let raw = BASE_SCORE
            + self.price_affinity
            + self.type_affinity
            + self.bedroom_affinity
            + self.freshness
            + self.efficiency;
        raw.clamp(0.0, 100.0).round() as u8
    }

    /// Up to three reasons: score tier first, then freshness extremes and
    /// price-per-sqft efficiency, then the strongest profile factor.
    fn reasons(&self, property: &PropertyRecord) -> Vec<String> {
        let mut reasons = Vec::new();
        let total = self.total();

        if total >= 85 {
            reasons.push("Perfect match for your preferences".to_string());
        } else if total >= 70 {
            reasons.push("Great match for your preferences".to_string());
        } else if total >= 60 {
            reasons.push("Good potential match".to_string());
        }

        match property.days_on_market {
            Some(days) if days < 7 => reasons.push("New listing - act fast!".to_string()),
            Some(days) if days > 60 => {
                reasons.push("Long time on market - seller may be motivated".to_string())
            }
            _ => {}
        }

        if matches!(property.price_per_sqft(), Some(ratio) if ratio < 150.0) {
            reasons.push("Excellent price per square foot".to_string());
        }

        if let Some(explanation) = self.strongest_profile_factor() {
            reasons.push(explanation.to_string());
        }

        reasons.truncate(3);
        reasons
    }

    fn strongest_profile_factor(&self) -> Option<&'static str> {
        let factors = [
            (self.price_affinity, "Priced close to your usual range"),
            (self.type_affinity, "Matches your preferred property type"),
            (self.bedroom_affinity, "Has your preferred bedroom count"),
        ];
        factors
            .into_iter()
            .filter(|(value, _)| *value > 0.0)
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, label)| label)
    }
}

fn score_property(property: &PropertyRecord, profile: &UserProfile) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();

    // Price affinity only applies within 20% of the historical average
    if let Some(avg_price) = profile.avg_price {
        if avg_price > 0.0 && property.price > 0.0 {
            let deviation = (property.price - avg_price).abs() / avg_price;
            if deviation <= 0.20 {
                breakdown.price_affinity = 25.0 * (1.0 - 2.0 * deviation);
            }
        }
    }

    // Raw interaction count, saturated downstream at 20 points
    if let Some(weight) = profile.preferred_types.get(&property.property_type) {
        breakdown.type_affinity = (f64::from(*weight) * 10.0).min(20.0);
    }

    if let Some(preferred) = profile.preferred_bedrooms {
        let diff = preferred.abs_diff(property.bedrooms);
        breakdown.bedroom_affinity = match diff {
            0 => 15.0,
            1 => 8.0,
            _ => 0.0,
        };
    }

    breakdown.freshness = match property.days_on_market {
        Some(days) if days < 7 => 10.0,
        Some(days) if days > 60 => 5.0,
        _ => 0.0,
    };

    breakdown.efficiency = match property.price_per_sqft() {
        Some(ratio) if ratio < 150.0 => 15.0,
        Some(ratio) if ratio < 200.0 => 10.0,
        _ => 0.0,
    };

    breakdown
}

/// Append an interaction and recompute the profile's derived fields.
///
/// Average price is the arithmetic mean of all logged positive prices.
/// Per-type weights are raw interaction counts; they grow unbounded and
/// are only saturated by the min(20, weight * 10) in scoring.
pub fn track_interaction(
    profile: &mut UserProfile,
    property: &PropertyRecord,
    action: InteractionAction,
) {
    profile.interactions.push(Interaction {
        property: property.clone(),
        action,
        created_at: chrono::Utc::now(),
    });

    let prices: Vec<f64> = profile
        .interactions
        .iter()
        .map(|i| i.property.price)
        .filter(|price| *price > 0.0)
        .collect();
    if !prices.is_empty() {
        profile.avg_price = Some(prices.iter().sum::<f64>() / prices.len() as f64);
    }

    profile.preferred_types.clear();
    for interaction in &profile.interactions {
        *profile
            .preferred_types
            .entry(interaction.property.property_type)
            .or_default() += 1;
    }

    profile.preferred_bedrooms = most_frequent_bedrooms(&profile.interactions);
}

/// Most frequent bedroom count in the log; ties resolve to the smaller count.
fn most_frequent_bedrooms(interactions: &[Interaction]) -> Option<u32> {
    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for interaction in interactions {
        *counts.entry(interaction.property.bedrooms).or_default() += 1;
    }

    let mut best: Option<(u32, u32)> = None;
    for (bedrooms, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((bedrooms, count)),
        }
    }
    best.map(|(bedrooms, _)| bedrooms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(price: f64, property_type: PropertyType, bedrooms: u32) -> PropertyRecord {
        PropertyRecord {
            formatted_address: "123 Test Ln".to_string(),
            price,
            bedrooms,
            bathrooms: 2.0,
            property_type,
            square_footage: None,
            days_on_market: None,
        }
    }

    fn seeded_profile() -> UserProfile {
        let mut profile = UserProfile::default();
        for _ in 0..3 {
            track_interaction(
                &mut profile,
                &property(300_000.0, PropertyType::SingleFamily, 3),
                InteractionAction::Viewed,
            );
        }
        profile
    }

    #[test]
    fn test_empty_profile_gives_base_score() {
        let scored = ScoringEngine::new().score(
            &[property(250_000.0, PropertyType::Condo, 2)],
            &UserProfile::default(),
        );

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].score, 50);
    }

    #[test]
    fn test_price_affinity_peaks_at_average() {
        let profile = seeded_profile();
        let engine = ScoringEngine::new();

        let at_avg = engine.score(&[property(300_000.0, PropertyType::Unknown, 0)], &profile);
        let off_avg = engine.score(&[property(345_000.0, PropertyType::Unknown, 0)], &profile);
        let out_of_range = engine.score(&[property(500_000.0, PropertyType::Unknown, 0)], &profile);

        assert!(at_avg[0].score > off_avg[0].score);
        // 500k is more than 20% from a 300k average, so no price contribution
        assert_eq!(out_of_range[0].score, 50);
    }

    #[test]
    fn test_type_affinity_saturates_at_twenty() {
        let mut profile = UserProfile::default();
        for _ in 0..10 {
            track_interaction(
                &mut profile,
                &property(0.0, PropertyType::Condo, 1),
                InteractionAction::Saved,
            );
        }

        let breakdown = score_property(&property(0.0, PropertyType::Condo, 1), &profile);
        assert_eq!(breakdown.type_affinity, 20.0);
    }

    #[test]
    fn test_bedroom_affinity_tiers() {
        let profile = seeded_profile();

        let exact = score_property(&property(1.0, PropertyType::Unknown, 3), &profile);
        let off_by_one = score_property(&property(1.0, PropertyType::Unknown, 4), &profile);
        let far = score_property(&property(1.0, PropertyType::Unknown, 6), &profile);

        assert_eq!(exact.bedroom_affinity, 15.0);
        assert_eq!(off_by_one.bedroom_affinity, 8.0);
        assert_eq!(far.bedroom_affinity, 0.0);
    }

    #[test]
    fn test_freshness_bonus_tiers() {
        let profile = UserProfile::default();
        let mut fresh = property(1.0, PropertyType::Unknown, 0);
        fresh.days_on_market = Some(3);
        let mut stale = property(1.0, PropertyType::Unknown, 0);
        stale.days_on_market = Some(90);

        assert_eq!(score_property(&fresh, &profile).freshness, 10.0);
        assert_eq!(score_property(&stale, &profile).freshness, 5.0);
    }

    #[test]
    fn test_efficiency_tiers() {
        let profile = UserProfile::default();
        let mut cheap = property(140_000.0, PropertyType::Unknown, 0);
        cheap.square_footage = Some(1000.0);
        let mut mid = property(190_000.0, PropertyType::Unknown, 0);
        mid.square_footage = Some(1000.0);
        let mut expensive = property(250_000.0, PropertyType::Unknown, 0);
        expensive.square_footage = Some(1000.0);

        assert_eq!(score_property(&cheap, &profile).efficiency, 15.0);
        assert_eq!(score_property(&mid, &profile).efficiency, 10.0);
        assert_eq!(score_property(&expensive, &profile).efficiency, 0.0);
    }

    #[test]
    fn test_output_sorted_descending_and_stable() {
        let profile = seeded_profile();
        let properties = vec![
            property(900_000.0, PropertyType::Unknown, 0), // base score
            property(300_000.0, PropertyType::SingleFamily, 3), // strong match
            property(850_000.0, PropertyType::Unknown, 0), // base score
        ];

        let scored = ScoringEngine::new().score(&properties, &profile);

        assert_eq!(scored.len(), 3);
        assert!(scored[0].score >= scored[1].score);
        assert!(scored[1].score >= scored[2].score);
        // The two base-score listings keep their input order
        assert_eq!(scored[1].property.price, 900_000.0);
        assert_eq!(scored[2].property.price, 850_000.0);
    }

    #[test]
    fn test_scores_clamped_to_range() {
        let profile = seeded_profile();
        let mut strong = property(300_000.0, PropertyType::SingleFamily, 3);
        strong.days_on_market = Some(2);
        strong.square_footage = Some(2500.0);

        let scored = ScoringEngine::new().score(&[strong], &profile);
        assert!(scored[0].score <= 100);
    }

    #[test]
    fn test_reasons_capped_at_three_and_tier_first() {
        let profile = seeded_profile();
        let mut strong = property(300_000.0, PropertyType::SingleFamily, 3);
        strong.days_on_market = Some(2);
        strong.square_footage = Some(2500.0);

        let scored = ScoringEngine::new().score(&[strong], &profile);
        let reasons = &scored[0].reasons;

        assert!(reasons.len() <= 3);
        assert!(reasons[0].contains("match"));
        assert!(reasons.iter().any(|r| r.contains("New listing")));
    }

    #[test]
    fn test_track_interaction_recomputes_profile() {
        let mut profile = UserProfile::default();

        track_interaction(
            &mut profile,
            &property(200_000.0, PropertyType::Condo, 2),
            InteractionAction::Viewed,
        );
        track_interaction(
            &mut profile,
            &property(400_000.0, PropertyType::Condo, 2),
            InteractionAction::Saved,
        );
        track_interaction(
            &mut profile,
            &property(0.0, PropertyType::Townhouse, 3),
            InteractionAction::Viewed,
        );

        // Zero price is excluded from the average
        assert_eq!(profile.avg_price, Some(300_000.0));
        assert_eq!(profile.preferred_types.get(&PropertyType::Condo), Some(&2));
        assert_eq!(profile.preferred_types.get(&PropertyType::Townhouse), Some(&1));
        assert_eq!(profile.preferred_bedrooms, Some(2));
        assert_eq!(profile.interactions.len(), 3);
    }
}
