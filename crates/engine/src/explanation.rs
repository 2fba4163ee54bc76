//! Human-readable reasons for a recommendation.

use crate::ranking::ScoreBreakdown;
use catalog::{Feature, Item, PowerTarget, PreferenceSnapshot};

/// Importance assumed for a stated preference with no explicit weight
const DEFAULT_IMPORTANCE: f64 = 1.0;

/// Word for how much the buyer cares about a feature
pub fn importance_label(importance: f64) -> &'static str {
    if importance >= 1.4 {
        "crucial"
    } else if importance >= 0.9 {
        "important"
    } else if importance >= 0.5 {
        "preferred"
    } else {
        "optional"
    }
}

/// Build the explanation text for one scored item.
pub fn explain(item: &Item, preferences: &PreferenceSnapshot, breakdown: &ScoreBreakdown) -> String {
    let label = |feature: Feature| {
        importance_label(preferences.importance(feature).unwrap_or(DEFAULT_IMPORTANCE))
    };
    let scores = &breakdown.features;
    let mut reasons: Vec<String> = Vec::new();

    if let Some(brand) = PreferenceSnapshot::stated(&preferences.brand) {
        if scores.brand >= 0.8 {
            reasons.push(format!("matches your {} brand preference ({})", label(Feature::Brand), brand));
        }
    }
    if let Some(budget) = preferences.max_budget.filter(|b| *b > 0.0) {
        if item.price <= budget {
            reasons.push(format!(
                "{} fits your {} budget of {}",
                format_price(item.price),
                label(Feature::Price),
                format_price(budget)
            ));
        } else {
            let over = (item.price - budget) / budget * 100.0;
            reasons.push(format!("{} is {:.0}% over your budget", format_price(item.price), over));
        }
    }
    if let Some(fuel) = PreferenceSnapshot::stated(&preferences.fuel) {
        if scores.fuel >= 0.7 {
            reasons.push(format!("runs on {} ({} {})", item.fuel, label(Feature::Fuel), fuel));
        }
    }
    if scores.power >= 0.6 && (preferences.power.is_some() || preferences.comfort_vs_sport != 0.5) {
        let style = match preferences.power {
            Some(PowerTarget::Absolute(kw)) => format!("your {:.0} kW target", kw),
            _ if preferences.comfort_vs_sport < 0.4 => "a sporty driving style".to_string(),
            _ if preferences.comfort_vs_sport > 0.6 => "a comfortable driving style".to_string(),
            _ => "a balanced driving style".to_string(),
        };
        reasons.push(format!("{} kW suits {}", item.power, style));
    }
    if let Some(body_type) = PreferenceSnapshot::stated(&preferences.body_type) {
        if scores.body_type >= 0.7 {
            reasons.push(format!(
                "{} body ({} {})",
                item.body_type,
                label(Feature::BodyType),
                body_type
            ));
        }
    }
    if preferences.automatic_transmission.is_some() && scores.transmission >= 1.0 {
        reasons.push(format!("{} gearbox", item.transmission.to_lowercase()));
    }
    if scores.year >= 0.8 {
        reasons.push(format!("recent model year ({})", item.year));
    }

    let summary = if reasons.is_empty() {
        "balanced match on price, power and age".to_string()
    } else {
        reasons.join("; ")
    };

    let mut text = format!(
        "{}: {}. Score {:.2} (similarity {:.2}, utility {:.2}",
        item.display_name(),
        summary,
        breakdown.final_score,
        breakdown.similarity,
        breakdown.utility
    );
    if let Some(external) = breakdown.external {
        text.push_str(&format!(", model {:.2}", external));
    }
    text.push(')');
    text
}

/// "€23,500" style price
pub fn format_price(price: f64) -> String {
    let whole = price.round().max(0.0) as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (pos, ch) in digits.chars().enumerate() {
        if pos > 0 && (digits.len() - pos) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("€{}", grouped)
}
