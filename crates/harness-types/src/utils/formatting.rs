//! String formatting utilities.
//!
//! Hex prefix handling, id truncation for log lines, and rendering of raw
//! on-chain amounts in whole-token units.

use alloy::primitives::U256;

/// Shortens a hex id to its first 8 characters followed by "..".
pub fn truncate_id(id: &str) -> String {
	match id.get(..8) {
		Some(head) if id.len() > 8 => format!("{}..", head),
		_ => id.to_string(),
	}
}

/// Adds a "0x" prefix unless one (of either case) is already present.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Strips a leading "0x" or "0X".
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Renders a raw amount with `decimals` decimal places, dropping trailing
/// zeros from the fractional part.
///
/// `format_units(U256::from(1_500_000u64), 6)` is `"1.5"`.
pub fn format_units(amount: U256, decimals: u8) -> String {
	let digits = amount.to_string();
	if decimals == 0 {
		return digits;
	}

	let scale = decimals as usize;
	let padded = format!("{:0>width$}", digits, width = scale + 1);
	let (whole, fraction) = padded.split_at(padded.len() - scale);
	let fraction = fraction.trim_end_matches('0');

	if fraction.is_empty() {
		whole.to_string()
	} else {
		format!("{}.{}", whole, fraction)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("0x1234"), "0x1234");
		assert_eq!(truncate_id("0x123456"), "0x123456");
		assert_eq!(truncate_id("0x1234567890abcdef"), "0x123456..");
	}

	#[test]
	fn test_prefix_helpers() {
		assert_eq!(with_0x_prefix("abcd"), "0xabcd");
		assert_eq!(with_0x_prefix("0xabcd"), "0xabcd");
		assert_eq!(with_0x_prefix("0Xabcd"), "0Xabcd");
		assert_eq!(without_0x_prefix("0xabcd"), "abcd");
		assert_eq!(without_0x_prefix("0Xabcd"), "abcd");
		assert_eq!(without_0x_prefix("abcd"), "abcd");
	}

	#[test]
	fn test_format_units() {
		let wei = |n: u128| U256::from(n);
		assert_eq!(format_units(wei(1_000_000_000_000_000_000), 18), "1");
		assert_eq!(format_units(wei(1_000_000_000_000_000), 18), "0.001");
		assert_eq!(format_units(wei(21_000 * 30_000_000_000), 18), "0.00063");
		assert_eq!(format_units(wei(102_500_000_000_000_000_000), 18), "102.5");
		assert_eq!(format_units(wei(0), 18), "0");
		assert_eq!(format_units(wei(1_500_000), 6), "1.5");
		assert_eq!(format_units(wei(1000), 0), "1000");
	}
}
