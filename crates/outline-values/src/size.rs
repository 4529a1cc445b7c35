//! Human-readable data sizes such as `500MB`, `1.5 GB` or `2GiB`.
//!
//! Parsing accepts both decimal (powers of 1000) and binary (powers of 1024)
//! units; rendering always uses decimal units and is meant for display, so a
//! value does not necessarily survive a render/parse cycle byte-for-byte.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};

const KB: u64 = 1_000;
const MB: u64 = KB * 1_000;
const GB: u64 = MB * 1_000;
const TB: u64 = GB * 1_000;
const PB: u64 = TB * 1_000;
const EB: u64 = PB * 1_000;

const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;
const GIB: u64 = 1 << 30;
const TIB: u64 = 1 << 40;
const PIB: u64 = 1 << 50;

/// Digits past this point in a fractional magnitude are ignored.
const MAX_FRACTION_DIGITS: usize = 18;

const DISPLAY_UNITS: [(&str, u64); 7] = [
    ("B", 1),
    ("KB", KB),
    ("MB", MB),
    ("GB", GB),
    ("TB", TB),
    ("PB", PB),
    ("EB", EB),
];

/// A byte quota. Zero means "unset" and renders as an empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataSize(u64);

impl DataSize {
    /// The unset size.
    pub const ZERO: Self = Self(0);

    /// Wrap an exact byte count.
    #[must_use]
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Exact byte count.
    #[must_use]
    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Whether the size is zero, which callers treat as "no limit given".
    #[must_use]
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// Parse a magnitude with an optional unit suffix.
    ///
    /// Empty input yields [`DataSize::ZERO`]. Fractional magnitudes are
    /// multiplied exactly and truncated to whole bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] for negative magnitudes, text that does not
    /// start with a number, unknown unit suffixes, and sizes beyond 64 bits.
    pub fn parse(input: &str) -> ValueResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }

        let result = parse_trimmed(trimmed);
        if let Err(err) = &result {
            tracing::debug!(input = trimmed, error = %err, "rejected data size");
        }
        result
    }
}

fn parse_trimmed(trimmed: &str) -> ValueResult<DataSize> {
    if trimmed.starts_with('-') {
        return Err(ValueError::NegativeSize {
            input: trimmed.to_string(),
        });
    }

    let split = trimmed
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.' || ch == ','))
        .unwrap_or(trimmed.len());
    let (magnitude, unit) = trimmed.split_at(split);
    let magnitude: String = magnitude.chars().filter(|ch| *ch != ',').collect();
    let unit = unit.trim().to_ascii_lowercase();

    let malformed = || ValueError::MalformedSize {
        input: trimmed.to_string(),
    };
    let overflow = || ValueError::SizeOverflow {
        input: trimmed.to_string(),
    };

    let (whole, fraction) = magnitude
        .split_once('.')
        .unwrap_or((magnitude.as_str(), ""));
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return Err(malformed());
    }

    let multiplier = unit_multiplier(&unit).ok_or_else(|| ValueError::UnknownUnit {
        input: trimmed.to_string(),
        unit: unit.clone(),
    })?;
    let multiplier = u128::from(multiplier);

    // Only ASCII digits remain, so a parse failure can only mean overflow.
    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    let fraction_value: u128 = if fraction.is_empty() {
        0
    } else {
        fraction.parse().map_err(|_| malformed())?
    };
    let scale = fraction.bytes().fold(1_u128, |acc, _| acc * 10);

    let total = whole_value
        .checked_mul(multiplier)
        .and_then(|bytes| bytes.checked_add(fraction_value * multiplier / scale))
        .ok_or_else(overflow)?;

    u64::try_from(total)
        .map(DataSize)
        .map_err(|_| overflow())
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    match unit {
        "" | "b" => Some(1),
        "k" | "kb" => Some(KB),
        "ki" | "kib" => Some(KIB),
        "m" | "mb" => Some(MB),
        "mi" | "mib" => Some(MIB),
        "g" | "gb" => Some(GB),
        "gi" | "gib" => Some(GIB),
        "t" | "tb" => Some(TB),
        "ti" | "tib" => Some(TIB),
        "p" | "pb" => Some(PB),
        "pi" | "pib" => Some(PIB),
        _ => None,
    }
}

impl Display for DataSize {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            return Ok(());
        }

        let (unit, base) = DISPLAY_UNITS
            .iter()
            .rev()
            .find(|(_, base)| self.0 >= *base)
            .copied()
            .unwrap_or(DISPLAY_UNITS[0]);
        if base == 1 {
            return write!(formatter, "{} {unit}", self.0);
        }

        let bytes = u128::from(self.0);
        let base = u128::from(base);
        let tenths = (bytes * 10 + base / 2) / base;
        if tenths < 100 {
            write!(formatter, "{}.{} {unit}", tenths / 10, tenths % 10)
        } else {
            write!(formatter, "{} {unit}", (bytes + base / 2) / base)
        }
    }
}

impl FromStr for DataSize {
    type Err = ValueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl TryFrom<String> for DataSize {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DataSize> for String {
    fn from(value: DataSize) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_binary_units() -> ValueResult<()> {
        let cases = [
            ("1B", 1),
            ("1KB", 1_000),
            ("1MB", 1_000_000),
            ("1GB", 1_000_000_000),
            ("1TB", 1_000_000_000_000),
            ("1KiB", 1_024),
            ("1MiB", 1_048_576),
            ("1GiB", 1_073_741_824),
            ("1TiB", 1_099_511_627_776),
            ("1gb", 1_000_000_000),
            ("1Gb", 1_000_000_000),
            (" 1GB ", 1_000_000_000),
            ("1 GB", 1_000_000_000),
            ("1.5GB", 1_500_000_000),
            ("0GB", 0),
            ("1000", 1_000),
            ("1,000KB", 1_000_000),
            ("500mib", 524_288_000),
        ];
        for (input, expected) in cases {
            assert_eq!(DataSize::parse(input)?.bytes(), expected, "input {input:?}");
        }
        Ok(())
    }

    #[test]
    fn empty_input_is_unset() -> ValueResult<()> {
        let size = DataSize::parse("")?;
        assert_eq!(size, DataSize::ZERO);
        assert!(DataSize::parse("   ")?.is_unset());
        assert_eq!(size.to_string(), "");
        Ok(())
    }

    #[test]
    fn rejects_garbage_unknown_units_and_negatives() {
        assert!(matches!(
            DataSize::parse("invalid"),
            Err(ValueError::MalformedSize { .. })
        ));
        assert!(matches!(
            DataSize::parse("1ZB"),
            Err(ValueError::UnknownUnit { unit, .. }) if unit == "zb"
        ));
        assert!(matches!(
            DataSize::parse("-1GB"),
            Err(ValueError::NegativeSize { .. })
        ));
        assert!(matches!(
            DataSize::parse("1.2.3GB"),
            Err(ValueError::MalformedSize { .. })
        ));
    }

    #[test]
    fn rejects_sizes_beyond_u64() {
        assert!(matches!(
            DataSize::parse("20000PB"),
            Err(ValueError::SizeOverflow { .. })
        ));
        assert!(matches!(
            DataSize::parse("999999999999999999999999999999999999999999"),
            Err(ValueError::SizeOverflow { .. })
        ));
    }

    #[test]
    fn renders_with_largest_decimal_unit() {
        assert_eq!(DataSize::from_bytes(999).to_string(), "999 B");
        assert_eq!(DataSize::from_bytes(1_000).to_string(), "1.0 KB");
        assert_eq!(DataSize::from_bytes(1_500_000_000).to_string(), "1.5 GB");
        assert_eq!(DataSize::from_bytes(15_000_000_000).to_string(), "15 GB");
        assert_eq!(DataSize::from_bytes(1_073_741_824).to_string(), "1.1 GB");
        assert_eq!(DataSize::from_bytes(9_960).to_string(), "10 KB");
    }

    #[test]
    fn rendered_output_parses_again() -> ValueResult<()> {
        let size = DataSize::from_bytes(2_000_000_000_000);
        assert_eq!(DataSize::parse(&size.to_string())?, size);
        Ok(())
    }

    #[test]
    fn serde_uses_text_form() -> Result<(), Box<dyn std::error::Error>> {
        let encoded = serde_json::to_string(&DataSize::from_bytes(5_000_000))?;
        assert_eq!(encoded, "\"5.0 MB\"");
        let decoded: DataSize = serde_json::from_str("\"2GiB\"")?;
        assert_eq!(decoded.bytes(), 2 * GIB);
        assert!(serde_json::from_str::<DataSize>("\"1ZB\"").is_err());
        Ok(())
    }
}
