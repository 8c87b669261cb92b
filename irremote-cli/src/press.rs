use anyhow::{bail, Context, Result};
use irremote_core::keytab::{KeyIndex, RawScanCode, NUM_KEYS};

/// One `--press` argument: what the contact reads as and how long it is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressSpec {
    pub code: RawScanCode,
    pub hold_ms: u64,
}

/// Parse `TARGET:HOLD_MS`.
///
/// `TARGET` is either a key index (`7`) or a raw position code in hex
/// (`0x21`); raw codes let a scenario press something that is not a key.
pub fn parse_press(input: &str) -> Result<PressSpec> {
    let (target, hold) = match input.split_once(':') {
        Some(parts) => parts,
        None => bail!("press '{}' must be TARGET:HOLD_MS", input),
    };

    let code = parse_target(target.trim())
        .with_context(|| format!("press '{}': invalid target", input))?;
    let hold_ms = hold
        .trim()
        .parse::<u64>()
        .with_context(|| format!("press '{}': invalid hold time", input))?;

    Ok(PressSpec { code, hold_ms })
}

/// A key index or a `0x`-prefixed position code.
pub fn parse_target(target: &str) -> Result<RawScanCode> {
    if let Some(hex) = target.strip_prefix("0x").or_else(|| target.strip_prefix("0X")) {
        let bits = u8::from_str_radix(hex, 16)
            .with_context(|| format!("invalid hex code '{}'", target))?;
        return Ok(RawScanCode::from_bits(bits));
    }
    parse_key(target).map(KeyIndex::position)
}

pub fn parse_key(input: &str) -> Result<KeyIndex> {
    let index: usize = input
        .parse()
        .with_context(|| format!("invalid key index '{}'", input))?;
    match KeyIndex::new(index) {
        Some(key) => Ok(key),
        None => bail!("key index {} out of range (0..{})", index, NUM_KEYS),
    }
}

pub fn parse_selector(input: &str) -> Result<u8> {
    let state: u8 = input
        .parse()
        .with_context(|| format!("invalid selector state '{}'", input))?;
    if state > 3 {
        bail!("selector state {} out of range (0..=3)", state);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_press() {
        let press = parse_press("7:120").unwrap();
        assert_eq!(press.code.bits(), 0x21);
        assert_eq!(press.hold_ms, 120);
    }

    #[test]
    fn test_parse_raw_press() {
        let press = parse_press("0x33:50").unwrap();
        assert_eq!(press.code, RawScanCode::from_bits(0x33));
        assert_eq!(press.hold_ms, 50);
    }

    #[test]
    fn test_missing_hold() {
        assert!(parse_press("7").is_err());
        assert!(parse_press("7:").is_err());
    }

    #[test]
    fn test_key_out_of_range() {
        assert!(parse_press("24:10").is_err());
        assert!(parse_key("23").is_ok());
    }

    #[test]
    fn test_bad_hex() {
        assert!(parse_target("0xZZ").is_err());
        assert!(parse_target("0x100").is_err());
    }

    #[test]
    fn test_selector_range() {
        assert_eq!(parse_selector("3").unwrap(), 3);
        assert!(parse_selector("4").is_err());
        assert!(parse_selector("-1").is_err());
    }
}
