//! Utility functions and helpers

/// Format an amount with thousands separators and fixed decimal places
pub fn format_amount(value: f64, decimal_places: u32, thousands_sep: &str, decimal_sep: &str) -> String {
    let negative = value < 0.0;
    let formatted = format!("{:.*}", decimal_places as usize, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push_str(&thousands_sep.chars().rev().collect::<String>());
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let mut result: String = grouped.chars().rev().collect();

    if let Some(frac) = frac_part {
        result.push_str(decimal_sep);
        result.push_str(frac);
    }
    if negative {
        result.insert(0, '-');
    }
    result
}

/// Format a ratio as a percentage with two decimal places
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_grouping() {
        assert_eq!(format_amount(1234567.5, 2, ",", "."), "1,234,567.50");
        assert_eq!(format_amount(600.0, 2, ",", "."), "600.00");
        assert_eq!(format_amount(0.0, 2, ",", "."), "0.00");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(-100.0, 2, ",", "."), "-100.00");
        assert_eq!(format_amount(-1234.0, 0, ".", ","), "-1.234");
    }

    #[test]
    fn test_format_amount_custom_separators() {
        assert_eq!(format_amount(2600.0, 2, ".", ","), "2.600,00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(103.84615384615384), "103.85%");
        assert_eq!(format_percent(0.0), "0.00%");
    }
}
