//! Conditional trade command model.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    /// Leading keyword of the sentence shape.
    pub fn keyword(self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
        }
    }

    /// Direction keyword the price has to move in.
    pub fn direction(self) -> &'static str {
        match self {
            Action::Buy => "below",
            Action::Sell => "above",
        }
    }
}

/// A parsed `buy/sell <symbol> if price goes below/above <threshold>` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandIntent {
    pub action: Action,
    pub symbol: String,
    pub threshold: f64,
}

impl CommandIntent {
    /// True when `price` satisfies the intent's condition. Both comparisons
    /// are strict, so a price equal to the threshold never triggers.
    pub fn is_met_by(&self, price: f64) -> bool {
        match self.action {
            Action::Buy => price < self.threshold,
            Action::Sell => price > self.threshold,
        }
    }
}

impl fmt::Display for CommandIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.action.keyword().to_uppercase(),
            self.symbol,
            self.action.direction().to_uppercase(),
            self.threshold
        )
    }
}

/// Format a price the way the status messages show it: shortest round-trip
/// digits, integral values keep one decimal place (`140.0`), and magnitudes
/// from `1e16` up or below `1e-4` use exponent form (`1e+16`, `1.5e-05`).
pub fn format_price(price: f64) -> String {
    if price.is_nan() {
        return "nan".to_string();
    }
    if price.is_infinite() {
        return if price > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    if price != 0.0 {
        let sci = format!("{:e}", price);
        if let Some((mantissa, exp)) = sci.split_once('e') {
            if let Ok(exp) = exp.parse::<i32>() {
                if !(-4..16).contains(&exp) {
                    let sign = if exp < 0 { '-' } else { '+' };
                    return format!("{}e{}{:02}", mantissa, sign, exp.abs());
                }
            }
        }
    }

    if price.fract() == 0.0 {
        format!("{:.1}", price)
    } else {
        format!("{}", price)
    }
}
