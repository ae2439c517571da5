//! Field validation rules shared by request DTOs and domain constructors.
//!
//! Functions named `validate_*` have the shape `validator` expects for
//! `#[validate(custom(function = ...))]`.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::config::{
    MAX_ROOM_CAPACITY, MAX_ROOM_FLOOR, MIN_PASSWORD_LENGTH, MIN_ROOM_CAPACITY, MIN_ROOM_FLOOR,
    PINCODE_LENGTH,
};
use crate::errors::{AppError, AppResult};

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid regex"));

pub const PHONE_MESSAGE: &str = "Enter a valid 10-digit mobile number";
pub const PINCODE_MESSAGE: &str = "Pincode must be 6 digits";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords don't match";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Digits that step by `delta` (mod 10) from one position to the next.
fn is_stepped(digits: &[u8], delta: u8) -> bool {
    digits.windows(2).all(|w| (w[0] + delta) % 10 == w[1])
}

/// Mobile number: `^[6-9]\d{9}$`, rejecting numbers that are clearly fake:
/// all one digit, ascending or descending runs, an alternating digit pair
/// and two identical halves.
pub fn is_valid_phone(phone: &str) -> bool {
    if !PHONE_RE.is_match(phone) {
        return false;
    }

    let digits: Vec<u8> = phone.bytes().map(|b| b - b'0').collect();

    let all_same = digits.iter().all(|d| *d == digits[0]);
    let ascending = is_stepped(&digits, 1);
    let descending = is_stepped(&digits, 9);
    let alternating = digits.iter().enumerate().all(|(i, d)| *d == digits[i % 2]);
    let (head, tail) = digits.split_at(digits.len() / 2);
    let repeated_halves = head == tail;

    !(all_same || ascending || descending || alternating || repeated_halves)
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(error("phone", PHONE_MESSAGE))
    }
}

pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == PINCODE_LENGTH && pincode.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_pincode(pincode: &str) -> Result<(), ValidationError> {
    if is_valid_pincode(pincode) {
        Ok(())
    } else {
        Err(error("pincode", PINCODE_MESSAGE))
    }
}

/// Returns the first strength rule the password breaks, if any.
pub fn password_strength_error(password: &str) -> Option<&'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        Some("Password must be at least 8 characters")
    } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
        Some("Password must contain an uppercase letter")
    } else if !password.chars().any(|c| c.is_ascii_lowercase()) {
        Some("Password must contain a lowercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("Password must contain a number")
    } else {
        None
    }
}

pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    match password_strength_error(password) {
        Some(message) => Err(error("password_strength", message)),
        None => Ok(()),
    }
}

/// Reset-password rule: the confirmation must equal the new password.
pub fn confirm_password_error(password: &str, confirm_password: &str) -> Option<ValidationError> {
    (password != confirm_password).then(|| error("password_mismatch", PASSWORD_MISMATCH_MESSAGE))
}

/// Room form bounds, also applied when a room type template supplies the capacity.
pub fn check_room_bounds(capacity: i32, floor: i32) -> AppResult<()> {
    if !(MIN_ROOM_CAPACITY..=MAX_ROOM_CAPACITY).contains(&capacity) {
        return Err(AppError::validation(format!(
            "Capacity must be between {} and {}",
            MIN_ROOM_CAPACITY, MAX_ROOM_CAPACITY
        )));
    }
    if !(MIN_ROOM_FLOOR..=MAX_ROOM_FLOOR).contains(&floor) {
        return Err(AppError::validation(format!(
            "Floor must be between {} and {}",
            MIN_ROOM_FLOOR, MAX_ROOM_FLOOR
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_accepts_realistic_numbers() {
        assert!(is_valid_phone("9876501234"));
        assert!(is_valid_phone("6301928475"));
    }

    #[test]
    fn test_phone_rejects_pattern_outside_regex() {
        assert!(!is_valid_phone("5876501234"));
        assert!(!is_valid_phone("987650123"));
        assert!(!is_valid_phone("98765012345"));
        assert!(!is_valid_phone("98765o1234"));
    }

    #[test]
    fn test_phone_rejects_fake_numbers_matching_regex() {
        // all same digit
        assert!(!is_valid_phone("9999999999"));
        assert!(!is_valid_phone("7777777777"));
        // ascending, wrapping past 9
        assert!(!is_valid_phone("6789012345"));
        // descending
        assert!(!is_valid_phone("9876543210"));
        // alternating pair
        assert!(!is_valid_phone("9898989898"));
        // repeated halves
        assert!(!is_valid_phone("9123491234"));
    }

    #[test]
    fn test_pincode() {
        assert!(validate_pincode("560001").is_ok());
        let err = validate_pincode("123").unwrap_err();
        assert_eq!(err.message.as_deref(), Some(PINCODE_MESSAGE));
        assert!(validate_pincode("56000a").is_err());
    }

    #[test]
    fn test_confirm_password_mismatch() {
        assert!(confirm_password_error("Secret123", "Secret123").is_none());
        let err = confirm_password_error("Secret123", "Secret124").unwrap();
        assert_eq!(err.code, "password_mismatch");
    }

    #[test]
    fn test_room_bounds() {
        assert!(check_room_bounds(1, 1).is_ok());
        assert!(check_room_bounds(10, 8).is_ok());
        assert!(check_room_bounds(0, 1).is_err());
        assert!(check_room_bounds(11, 1).is_err());
        assert!(check_room_bounds(2, 0).is_err());
        assert!(check_room_bounds(2, 9).is_err());
    }
}
