//! Manual significant-digit rendering for doubles.
//!
//! The standard `Display` for `f64` picks the shortest representation that
//! round-trips; the writer instead honors a significant-figure budget and a
//! decimal/scientific window, so digits are extracted by hand.

use super::style::{FormatStyle, NumberMode};

pub(super) fn format_double(value: f64, style: &FormatStyle) -> String {
    if value.is_nan() {
        return ".NaN".to_string();
    }

    let mut out = String::new();
    if value.is_sign_negative() {
        out.push('-');
    } else if style.always_show_sign {
        out.push('+');
    }

    if value.is_infinite() {
        out.push_str(".Inf");
        return out;
    }

    let magnitude = value.abs();
    let significant = (style.significant_digits as usize).clamp(1, 17);

    let scientific = match style.number_mode {
        NumberMode::Decimal => false,
        NumberMode::Scientific => true,
        NumberMode::Auto => {
            if magnitude == 0.0 {
                false
            } else {
                let exp = exponent_of(magnitude);
                exp >= style.scientific_upper || exp < style.scientific_lower
            }
        }
    };

    if scientific && magnitude != 0.0 {
        out.push_str(&render_scientific(magnitude, significant, style));
    } else {
        out.push_str(&render_decimal(magnitude, significant));
    }
    out
}

pub(super) fn format_int(value: i64, style: &FormatStyle) -> String {
    if style.always_show_sign && value >= 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Decimal exponent: the power of ten of the leading digit. `log10` alone
/// drifts by one near exact powers of ten, so the result is nudged until
/// `10^exp <= value < 10^(exp+1)` holds.
fn exponent_of(value: f64) -> i32 {
    let mut exp = value.log10().floor() as i32;
    while pow10_div(value, exp) < 1.0 {
        exp -= 1;
    }
    while pow10_div(value, exp + 1) >= 1.0 {
        exp += 1;
    }
    exp
}

/// `value / 10^exp`. Subnormal inputs put `exp` past the range where
/// `10^exp` itself is representable, so large powers are applied in two
/// halves.
fn pow10_div(value: f64, exp: i32) -> f64 {
    if exp.abs() <= 300 {
        value / 10f64.powi(exp)
    } else {
        let half = exp / 2;
        value / 10f64.powi(half) / 10f64.powi(exp - half)
    }
}

/// Render `magnitude >= 0` as `integral.fraction`, spending at most
/// `significant` digits across both parts. Always contains a decimal point.
fn render_decimal(magnitude: f64, significant: usize) -> String {
    if magnitude == 0.0 {
        return "0.0".to_string();
    }

    let integral = magnitude.trunc();
    let fraction = magnitude - integral;

    let (mut integral_text, budget_used) = if integral == 0.0 {
        ("0".to_string(), 0)
    } else {
        render_integral(integral, significant)
    };

    let budget = significant.saturating_sub(budget_used);
    let (fraction_text, carry) = render_fraction(fraction, budget);
    if carry {
        integral_text = increment_digits(&integral_text);
    }

    integral_text.push('.');
    integral_text.push_str(&fraction_text);
    integral_text
}

/// Digits of the integral part, plus the number of significant-figure
/// slots it consumes. An exact power of ten costs one slot fewer, which is
/// what makes a `1` followed by zeros leave the full budget to the
/// fraction.
fn render_integral(integral: f64, significant: usize) -> (String, usize) {
    let width = exponent_of(integral) as usize + 1;
    let (digits, exp) = extract_digits(integral, width.min(significant));

    let width = exp as usize + 1;
    let mut text = digits.clone();
    while text.len() < width {
        text.push('0');
    }

    let used = if digits == "1" { width - 1 } else { width };
    (text, used)
}

/// Up to `count` significant digits of `value`, trailing zeros trimmed,
/// together with the decimal exponent of the first digit. Rounds half-up
/// on the digit after the last one kept; a rounding overflow past the
/// leading digit bumps the exponent instead.
fn extract_digits(value: f64, count: usize) -> (String, i32) {
    let count = count.clamp(1, 17);
    let mut exp = exponent_of(value);
    let normalized = pow10_div(value, exp);

    let scaled = normalized * 10f64.powi(count as i32 - 1);
    let mut n = scaled as u64;
    if scaled - n as f64 >= 0.5 {
        n += 1;
    }
    if n >= 10u64.pow(count as u32) {
        n /= 10;
        exp += 1;
    }

    let mut digits = n.to_string();
    while digits.len() < count {
        digits.insert(0, '0');
    }
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    (digits, exp)
}

/// Digits of the fractional part under a slot budget. Returns the digit
/// text and whether rounding carried all the way into the integral part
/// (`0.9999… -> 1.0`).
fn render_fraction(fraction: f64, budget: usize) -> (String, bool) {
    let budget = budget.min(17);
    if budget == 0 || fraction <= 0.0 {
        return ("0".to_string(), false);
    }

    let scaled = fraction * 10f64.powi(budget as i32);
    let mut n = scaled as u64;
    if scaled - n as f64 >= 0.5 {
        n += 1;
    }
    if n >= 10u64.pow(budget as u32) {
        return ("0".to_string(), true);
    }
    if n == 0 {
        return ("0".to_string(), false);
    }

    let mut digits = n.to_string();
    while digits.len() < budget {
        digits.insert(0, '0');
    }
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    (digits, false)
}

fn render_scientific(magnitude: f64, significant: usize, style: &FormatStyle) -> String {
    let mut exp = exponent_of(magnitude);
    let mantissa = pow10_div(magnitude, exp);

    let mut out = render_decimal(mantissa, significant);
    // Rounding may push the mantissa to 10.0; renormalize.
    if out == "10.0" {
        out = "1.0".to_string();
        exp += 1;
    }

    out.push('e');
    if exp < 0 {
        out.push('-');
    } else if style.always_show_exponent_sign {
        out.push('+');
    }
    out.push_str(&exp.unsigned_abs().to_string());
    out
}

/// Add one to a decimal digit string, carrying leftward.
fn increment_digits(digits: &str) -> String {
    let mut out: Vec<char> = digits.chars().collect();
    for slot in out.iter_mut().rev() {
        if *slot == '9' {
            *slot = '0';
        } else if let Some(d) = slot.to_digit(10) {
            *slot = char::from_digit(d + 1, 10).unwrap_or('0');
            return out.into_iter().collect();
        }
    }
    let mut grown = String::from("1");
    grown.extend(out);
    grown
}
