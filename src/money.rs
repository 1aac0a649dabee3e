//! Cent-level arithmetic for splitting currency amounts.

/// Split `total` evenly into `count` amounts that sum back exactly to
/// `total`.
///
/// The split works in integer cents: every part receives `total / count`
/// rounded down to the cent, and the leftover cents are spread one each over
/// the leading parts. For example, 100.00 split 3 ways yields
/// `[33.34, 33.33, 33.33]`.
///
/// # Panics
/// Panics if `count` is zero.
pub(crate) fn split_evenly(total: f64, count: u32) -> Vec<f64> {
    assert!(count > 0, "cannot split an amount into zero parts");

    let total_cents = to_cents(total);
    let base = total_cents / count as i64;
    let remainder = total_cents % count as i64;

    (0..count as i64)
        .map(|index| {
            let cents = if index < remainder { base + 1 } else { base };
            cents as f64 / 100.0
        })
        .collect()
}

/// Round `amount` to the nearest cent.
pub(crate) fn round_to_cents(amount: f64) -> f64 {
    to_cents(amount) as f64 / 100.0
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
