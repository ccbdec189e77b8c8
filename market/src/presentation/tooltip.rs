use corelib::{CurvePoint, OrderbookError, Side};

use crate::book::{Attribution, attribute};
use crate::synthesizer::OrderbookSnapshot;

/// Text lines shown when hovering a point. Joining and markup are left to
/// the renderer.
pub fn tooltip_lines(point: &CurvePoint, snapshot: &OrderbookSnapshot) -> Result<Vec<String>, OrderbookError> {
    let t0 = &snapshot.orderbook.token0.symbol;
    let t1 = &snapshot.orderbook.token1.symbol;

    let (sold, bought) = match point.side {
        Side::Bid => (t0, t1),
        Side::Ask => (t1, t0),
    };

    let attributions = attribute(&point.distribution, &snapshot.orderbook.pools)?;

    let mut lines = vec![
        "You sell".to_string(),
        format!("= {} {}", format_amount(point.input), sold),
        "Simulated price".to_string(),
        format!("= {} {} for 1 {}", format_amount(point.price), t1, t0),
        format!("= {} {} for 1 {}", format_amount(1.0 / point.price), t0, t1),
        "You buy".to_string(),
        format!("= {} {}", format_amount(point.output), bought),
        "Distribution".to_string(),
    ];
    lines.extend(attributions.iter().map(distribution_line));

    Ok(lines)
}

/// `- 20% in uniswap_v3 5bps`
pub fn distribution_line(a: &Attribution) -> String {
    format!(
        "- {}% in {} {}bps",
        format_decimal(a.share_pct, 2),
        a.protocol,
        format_decimal(a.fee_bps, 1)
    )
}

/// Thousands separators and at most 7 decimals, trailing zeros trimmed.
pub fn format_amount(v: f64) -> String {
    format_decimal(v, 7)
}

/// Price axis label: the price and its reciprocal on two lines.
pub fn axis_label(price: f64) -> String {
    format!("{}\n{}", format_amount(price), format_amount(1.0 / price))
}

fn format_decimal(v: f64, max_decimals: usize) -> String {
    if v.is_nan() {
        return "-".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "∞".into() } else { "-∞".into() };
    }

    let fixed = format!("{:.*}", max_decimals, v.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac.trim_end_matches('0');

    let mut out = group_thousands(int);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }

    if v < 0.0 && out != "0" {
        out.insert(0, '-');
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
