use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::{Money, DISPLAY_SCALE};

/// fixed conversion constant; no live rates are ever fetched
pub const INR_PER_USD: Decimal = dec!(83);

/// display currency for amounts shown to a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Inr,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Inr => "INR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Inr => "₹",
        }
    }

    /// convert using the fixed constant
    pub fn convert(&self, amount: Money, to: Currency) -> Money {
        match (self, to) {
            (Currency::Usd, Currency::Inr) => Money::from_decimal(amount.as_decimal() * INR_PER_USD),
            (Currency::Inr, Currency::Usd) => Money::from_decimal(amount.as_decimal() / INR_PER_USD),
            _ => amount,
        }
    }

    /// format with symbol, grouping and two decimals, e.g. `$1,059.84`
    pub fn format(&self, amount: Money) -> String {
        let rounded = amount
            .as_decimal()
            .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded < Decimal::ZERO;
        let text = format!("{:.2}", rounded.abs());
        let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let grouped = match self {
            Currency::Usd => group_thousands(whole),
            Currency::Inr => group_lakhs(whole),
        };

        format!(
            "{}{}{}.{}",
            if negative { "-" } else { "" },
            self.symbol(),
            grouped,
            frac
        )
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 1234567 -> 1,234,567
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 1234567 -> 12,34,567
fn group_lakhs(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}
