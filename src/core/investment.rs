use crate::models::{InvestmentRating, InvestmentReport, PropertyRecord, Recommendation};

// Annual carrying-cost rates as a fraction of purchase price
const TAX_RATE: f64 = 0.012;
const INSURANCE_RATE: f64 = 0.005;
const MAINTENANCE_RATE: f64 = 0.01;

// Monthly charges as a fraction of estimated rent
const MANAGEMENT_RATE: f64 = 0.08;
const VACANCY_RATE: f64 = 0.05;

const DOWN_PAYMENT_RATIO: f64 = 0.25;

/// Heuristic rental-economics analyzer.
///
/// Rent and expense figures are rule-of-thumb estimates derived from the
/// purchase price, not externally sourced.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvestmentAnalyzer;

impl InvestmentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one property. Returns None when the price is non-positive,
    /// never a NaN-filled report.
    pub fn analyze(&self, property: &PropertyRecord) -> Option<InvestmentReport> {
        if property.price <= 0.0 {
            return None;
        }

        let estimated_rent = estimate_rent(property);
        let monthly_expenses = property.price * (TAX_RATE + INSURANCE_RATE + MAINTENANCE_RATE)
            / 12.0
            + estimated_rent * (MANAGEMENT_RATE + VACANCY_RATE);

        let cash_flow = estimated_rent - monthly_expenses;
        let cap_rate = (estimated_rent - monthly_expenses) * 12.0 / property.price * 100.0;
        let annual_roi = cash_flow * 12.0 / (DOWN_PAYMENT_RATIO * property.price) * 100.0;

        let score = investment_score(cap_rate, cash_flow, annual_roi);
        let (rating, recommendation) = rate(score);

        Some(InvestmentReport {
            estimated_rent,
            monthly_expenses,
            cash_flow,
            cap_rate,
            annual_roi,
            score,
            rating,
            recommendation,
            risks: find_risks(property, cash_flow, cap_rate),
            opportunities: find_opportunities(property, cap_rate),
        })
    }
}

/// max(0.5% of price, bedrooms x $500), then clamped so rent per square
/// foot stays within $1.50-$3.50 when the area is known.
fn estimate_rent(property: &PropertyRecord) -> f64 {
    let base = (property.price * 0.005).max(f64::from(property.bedrooms) * 500.0);
    match property.square_footage {
        Some(area) if area > 0.0 => base.clamp(1.5 * area, 3.5 * area),
        _ => base,
    }
}

fn investment_score(cap_rate: f64, cash_flow: f64, annual_roi: f64) -> u8 {
    let mut score: i32 = 50;

    score += if cap_rate >= 8.0 {
        25
    } else if cap_rate >= 6.0 {
        15
    } else if cap_rate >= 4.0 {
        5
    } else {
        -10
    };

    score += if cash_flow >= 500.0 {
        20
    } else if cash_flow >= 0.0 {
        10
    } else {
        -20
    };

    if annual_roi >= 15.0 {
        score += 15;
    } else if annual_roi >= 10.0 {
        score += 10;
    } else if annual_roi >= 5.0 {
        score += 5;
    }

    score.clamp(0, 100) as u8
}

fn rate(score: u8) -> (InvestmentRating, Recommendation) {
    match score {
        s if s >= 80 => (InvestmentRating::Excellent, Recommendation::StrongBuy),
        s if s >= 60 => (InvestmentRating::Good, Recommendation::Consider),
        s if s >= 40 => (InvestmentRating::Fair, Recommendation::Caution),
        _ => (InvestmentRating::Poor, Recommendation::Avoid),
    }
}

fn find_risks(property: &PropertyRecord, cash_flow: f64, cap_rate: f64) -> Vec<String> {
    let mut risks = Vec::new();
    if cash_flow < 0.0 {
        risks.push("Negative monthly cash flow".to_string());
    }
    if cap_rate < 4.0 {
        risks.push("Cap rate below 4% - weak income relative to price".to_string());
    }
    if matches!(property.days_on_market, Some(days) if days > 90) {
        risks.push("Over 90 days on market - may indicate pricing or condition issues".to_string());
    }
    risks
}

fn find_opportunities(property: &PropertyRecord, cap_rate: f64) -> Vec<String> {
    let mut opportunities = Vec::new();
    if cap_rate > 8.0 {
        opportunities.push("Cap rate above 8% - strong income potential".to_string());
    }
    if property.price < 200_000.0 {
        opportunities.push("Priced under $200k - low barrier to entry".to_string());
    }
    opportunities
}
