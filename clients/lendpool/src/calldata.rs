//! Manual calldata encoding for the router's borrow and repay entry points.
//!
//! The router is called with raw transactions whose payload is
//! `selector || pad32(asset) || pad32(amount) [|| pad32(rate_mode) || 0^32]
//! || pad32(on_behalf_of)`.
//! Every argument occupies one 32-byte big-endian word.

use std::fmt;
use std::str::FromStr;

use alloy::hex;
use alloy::primitives::{Address, Bytes, B256, U256};
use thiserror::Error;

/// Errors produced while building calldata from untyped input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("invalid selector {0:?}: expected 4 bytes of hex")]
    InvalidSelector(String),

    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    #[error("negative amount {0:?}")]
    NegativeAmount(String),

    #[error("amount {0:?} does not fit in 256 bits")]
    AmountOutOfRange(String),

    #[error("amount {0:?} is not a decimal integer")]
    InvalidAmount(String),
}

/// A 4-byte function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Parses a selector from hex, with or without a `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, EncodingError> {
        let bytes = hex::decode(value.trim())
            .map_err(|_| EncodingError::InvalidSelector(value.to_string()))?;
        let selector: [u8; 4] = bytes
            .try_into()
            .map_err(|_| EncodingError::InvalidSelector(value.to_string()))?;
        Ok(Self(selector))
    }
}

impl FromStr for Selector {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Left-pads an address to a 32-byte word.
pub fn pad32_address(address: Address) -> B256 {
    address.into_word()
}

/// Encodes an unsigned integer as a 32-byte big-endian word.
pub fn pad32_uint(value: U256) -> B256 {
    B256::from(value.to_be_bytes::<32>())
}

/// Builds router calldata.
///
/// When `rate_mode` is present it is followed by an all-zero reserved word
/// before `on_behalf_of`.
pub fn encode(
    selector: Selector,
    asset: Address,
    amount: U256,
    rate_mode: Option<U256>,
    on_behalf_of: Address,
) -> Bytes {
    let words = if rate_mode.is_some() { 5 } else { 3 };
    let mut data = Vec::with_capacity(4 + 32 * words);
    data.extend_from_slice(&selector.0);
    data.extend_from_slice(pad32_address(asset).as_slice());
    data.extend_from_slice(pad32_uint(amount).as_slice());
    if let Some(rate_mode) = rate_mode {
        data.extend_from_slice(pad32_uint(rate_mode).as_slice());
        data.extend_from_slice(B256::ZERO.as_slice());
    }
    data.extend_from_slice(pad32_address(on_behalf_of).as_slice());
    Bytes::from(data)
}

/// String-level entry point for [`encode`]: validates every argument first.
///
/// This is the validating path for untyped input such as hex strings read from
/// a file or the command line; typed callers go straight to [`encode`].
/// Amounts are decimal integers in the token's smallest unit.
pub fn encode_hex(
    selector: &str,
    asset: &str,
    amount: &str,
    rate_mode: Option<&str>,
    on_behalf_of: &str,
) -> Result<Bytes, EncodingError> {
    let selector = Selector::from_hex(selector)?;
    let asset = parse_address(asset)?;
    let amount = parse_uint(amount)?;
    let rate_mode = rate_mode.map(parse_uint).transpose()?;
    let on_behalf_of = parse_address(on_behalf_of)?;
    Ok(encode(selector, asset, amount, rate_mode, on_behalf_of))
}

fn parse_address(value: &str) -> Result<Address, EncodingError> {
    Address::from_str(value.trim())
        .map_err(|_| EncodingError::InvalidAddress(value.to_string()))
}

fn parse_uint(value: &str) -> Result<U256, EncodingError> {
    let trimmed = value.trim();
    if trimmed.starts_with('-') {
        return Err(EncodingError::NegativeAmount(value.to_string()));
    }
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EncodingError::InvalidAmount(value.to_string()));
    }
    U256::from_str_radix(trimmed, 10)
        .map_err(|_| EncodingError::AmountOutOfRange(value.to_string()))
}

/// A raw transaction payload addressed to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCallPayload {
    pub to: Address,
    pub calldata: Bytes,
}

impl RawCallPayload {
    /// `borrow(asset, amount, rate_mode, 0, on_behalf_of)` against `router`.
    pub fn borrow(
        router: Address,
        selector: Selector,
        asset: Address,
        amount: U256,
        rate_mode: U256,
        on_behalf_of: Address,
    ) -> Self {
        Self {
            to: router,
            calldata: encode(selector, asset, amount, Some(rate_mode), on_behalf_of),
        }
    }

    /// Repay uses the same layout as borrow, including the reserved word.
    pub fn repay(
        router: Address,
        selector: Selector,
        asset: Address,
        amount: U256,
        rate_mode: U256,
        on_behalf_of: Address,
    ) -> Self {
        Self {
            to: router,
            calldata: encode(selector, asset, amount, Some(rate_mode), on_behalf_of),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ILendingPool;
    use alloy::primitives::address;
    use alloy::sol_types::SolCall;

    const USDC: Address = address!("0x48249feEb47a8453023f702f15CF00206eeBdF08");
    const OWNER: Address = address!("0x00000000000000000000000000000000deadbeef");

    fn borrow_selector() -> Selector {
        Selector::from_hex("a415bcad").unwrap()
    }

    #[test]
    fn selector_accepts_optional_prefix() {
        assert_eq!(
            Selector::from_hex("0x26a4e8d2").unwrap(),
            Selector([0x26, 0xa4, 0xe8, 0xd2])
        );
        assert_eq!(borrow_selector().to_string(), "0xa415bcad");
    }

    #[test]
    fn selector_rejects_wrong_length() {
        assert!(matches!(
            Selector::from_hex("a415bc"),
            Err(EncodingError::InvalidSelector(_))
        ));
        assert!(Selector::from_hex("a415bcad00").is_err());
        assert!(Selector::from_hex("zzzzzzzz").is_err());
    }

    #[test]
    fn layout_with_rate_mode() {
        let data = encode(
            borrow_selector(),
            USDC,
            U256::from(100_000u64),
            Some(U256::from(2u64)),
            OWNER,
        );
        assert_eq!(data.len(), 4 + 32 * 5);
        assert_eq!(&data[..4], &[0xa4, 0x15, 0xbc, 0xad]);
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..36], USDC.as_slice());
        assert_eq!(U256::from_be_slice(&data[36..68]), U256::from(100_000u64));
        assert_eq!(U256::from_be_slice(&data[68..100]), U256::from(2u64));
        assert_eq!(&data[100..132], &[0u8; 32]);
        assert_eq!(&data[144..164], OWNER.as_slice());
    }

    #[test]
    fn layout_without_rate_mode() {
        let data = encode(borrow_selector(), USDC, U256::from(7u64), None, OWNER);
        assert_eq!(data.len(), 4 + 32 * 3);
        assert_eq!(U256::from_be_slice(&data[36..68]), U256::from(7u64));
        assert_eq!(&data[80..100], OWNER.as_slice());
    }

    #[test]
    fn amount_word_is_big_endian() {
        for amount in [U256::ZERO, U256::from(1u64), U256::from(u128::MAX), U256::MAX] {
            let data = encode(borrow_selector(), USDC, amount, None, OWNER);
            assert_eq!(U256::from_be_slice(&data[36..68]), amount);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let amount = U256::from(5u64);
        let rate_mode = Some(U256::from(2u64));
        let a = encode(borrow_selector(), USDC, amount, rate_mode, OWNER);
        let b = encode(borrow_selector(), USDC, amount, rate_mode, OWNER);
        assert_eq!(a, b);
    }

    #[test]
    fn borrow_matches_abi_encoding() {
        let amount = U256::from(100_000u64);
        let manual = RawCallPayload::borrow(
            Address::ZERO,
            Selector(ILendingPool::borrowCall::SELECTOR),
            USDC,
            amount,
            U256::from(2u64),
            OWNER,
        );
        let call = ILendingPool::borrowCall {
            asset: USDC,
            amount,
            interestRateMode: U256::from(2u64),
            referralCode: 0,
            onBehalfOf: OWNER,
        };
        assert_eq!(manual.calldata.as_ref(), call.abi_encode().as_slice());
        assert_eq!(borrow_selector().0, ILendingPool::borrowCall::SELECTOR);
    }

    #[test]
    fn encode_hex_validates_inputs() {
        const ASSET: &str = "0x48249feEb47a8453023f702f15CF00206eeBdF08";
        const BEHALF: &str = "0x00000000000000000000000000000000deadbeef";

        let ok = encode_hex("0xa415bcad", ASSET, "100000", Some("2"), BEHALF).unwrap();
        let expected = encode(
            borrow_selector(),
            USDC,
            U256::from(100_000u64),
            Some(U256::from(2u64)),
            OWNER,
        );
        assert_eq!(ok, expected);

        assert!(matches!(
            encode_hex("a415bcad", "0x1234", "1", None, BEHALF),
            Err(EncodingError::InvalidAddress(_))
        ));
        assert!(matches!(
            encode_hex("a415bcad", ASSET, "-5", None, BEHALF),
            Err(EncodingError::NegativeAmount(_))
        ));
        assert!(matches!(
            encode_hex("a415bcad", ASSET, "1", Some("-2"), BEHALF),
            Err(EncodingError::NegativeAmount(_))
        ));
        let too_big = format!("{}0", U256::MAX);
        assert!(matches!(
            encode_hex("a415bcad", ASSET, &too_big, None, BEHALF),
            Err(EncodingError::AmountOutOfRange(_))
        ));
        assert!(matches!(
            encode_hex("a415bcad", ASSET, "1.5", None, BEHALF),
            Err(EncodingError::InvalidAmount(_))
        ));
        assert!(matches!(
            encode_hex("a415bcad", ASSET, "1", None, "not-an-address"),
            Err(EncodingError::InvalidAddress(_))
        ));
    }
}
