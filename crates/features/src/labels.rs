//! Euro amount formatting for chart labels and metric cards.

/// Format a bucket bound: `€1.5M`, `€45K`, `€500`.
pub fn format_cost(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("€{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("€{:.0}K", value / 1_000.0)
    } else {
        format!("€{:.0}", value)
    }
}

/// Label for a bucket spanning `[lower, upper]`.
pub fn bucket_label(lower: f64, upper: f64) -> String {
    format!("{}–{}", format_cost(lower), format_cost(upper))
}

/// Format a total with one decimal, up to billions: `€2.3B`.
pub fn format_total_value(value: f64) -> String {
    if value >= 1e9 {
        format!("€{:.1}B", value / 1e9)
    } else {
        format_compact(value)
    }
}

/// Format an average or median with one decimal: `€1.2M`, `€45.5K`.
pub fn format_compact(value: f64) -> String {
    if value >= 1e6 {
        format!("€{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("€{:.1}K", value / 1e3)
    } else {
        format!("€{:.0}", value)
    }
}

/// Format a whole-euro amount with thousands separators: `€1,234,567`.
pub fn format_cost_full(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-€{grouped}")
    } else {
        format!("€{grouped}")
    }
}
