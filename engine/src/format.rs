// Canonical numbers back to Brazilian display strings. Never parses text.
use painel_shared::models::{CanonicalCell, Notation};
use painel_shared::utils::brazilian_format::format_decimal;

pub const MISSING_MARK: &str = "-";
pub const CURRENCY_MARKER: &str = "R$";
/// Balances below this magnitude are shown as not applicable.
pub const CURRENCY_EPSILON: f64 = 0.01;

pub fn format_cell(cell: CanonicalCell, notation: Notation) -> String {
    match cell {
        CanonicalCell::Number(value) if value.is_finite() => match notation {
            Notation::Currency => format_currency(value),
            Notation::Percent => format_percent(value),
        },
        _ => MISSING_MARK.to_string(),
    }
}

/// "R$ 1.234.567,89"; zero and negligible balances render as "-".
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() || value.abs() < CURRENCY_EPSILON {
        return MISSING_MARK.to_string();
    }
    format!("{} {}", CURRENCY_MARKER, format_decimal(value, 2))
}

/// "12,34%". The value is already in percent units; "0,00%" is a real result.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return MISSING_MARK.to_string();
    }
    format!("{}%", format_decimal(value, 2))
}
