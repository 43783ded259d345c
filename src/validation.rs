use crate::error::Error;
use crate::types::Amount;

/// Smallest amount accepted for a single transfer or payment (1.00).
pub const MIN_TRANSFER_AMOUNT: Amount = Amount::from_minor(100);

/// Largest amount accepted for a single transfer or payment (100000.00).
pub const MAX_TRANSFER_AMOUNT: Amount = Amount::from_minor(10_000_000);

/// Validates a mobile number.
///
/// A valid mobile number is:
/// - Exactly 10 digits
/// - Starts with 6, 7, 8 or 9
/// - All characters are ASCII digits
#[must_use]
pub fn is_valid_mobile_number(s: &str) -> bool {
    s.len() == 10
        && s.bytes().all(|b| b.is_ascii_digit())
        && matches!(s.as_bytes()[0], b'6'..=b'9')
}

/// Validates an MPIN: exactly 6 ASCII digits.
#[must_use]
pub fn is_valid_mpin(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Validates a one-time password: exactly 6 ASCII digits.
#[must_use]
pub fn is_valid_otp(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Validates an IFSC branch code, e.g. `HDFC0001234`.
///
/// Four uppercase letters, a literal `0`, then six uppercase letters or digits.
#[must_use]
pub fn is_valid_ifsc(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 11
        && b[..4].iter().all(u8::is_ascii_uppercase)
        && b[4] == b'0'
        && b[5..]
            .iter()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Client-side checks applied to every outgoing money movement.
///
/// Runs before any request is built, so a rejected amount never reaches the
/// network.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the amount is zero, outside the per-transaction
/// bounds, or larger than `available_balance`.
pub fn check_transfer_amount(amount: Amount, available_balance: Amount) -> Result<(), Error> {
    if amount.is_zero() {
        return Err(Error::validation("Amount must be greater than zero"));
    }
    if amount < MIN_TRANSFER_AMOUNT {
        return Err(Error::validation(format!(
            "Minimum amount is {MIN_TRANSFER_AMOUNT}"
        )));
    }
    if amount > MAX_TRANSFER_AMOUNT {
        return Err(Error::validation(format!(
            "Maximum amount per transaction is {MAX_TRANSFER_AMOUNT}"
        )));
    }
    if amount > available_balance {
        return Err(Error::validation("Insufficient balance"));
    }
    Ok(())
}
