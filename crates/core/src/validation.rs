//! Field format validation for the checkout, login and registration forms.
//!
//! Every rule is fixed. Validators are pure: they return a [`Verdict`] and
//! leave visual feedback to whoever renders the form.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::types::{Email, EmailError};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

static DNI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}$").expect("Invalid regex"));
static RUC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{11}$").expect("Invalid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9}$").expect("Invalid regex"));
static CARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("Invalid regex"));
static CVV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("Invalid regex"));
static CONFIRMATION_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("Invalid regex"));
/// `MM/YY` with a month between 01 and 12.
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("Invalid regex"));
/// Any two digits, a slash and two digits; used to tell a bad month from a bad shape.
static EXPIRY_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}$").expect("Invalid regex"));

/// A form field the validator knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Dni,
    Ruc,
    Address,
    Reference,
    CardNumber,
    Expiry,
    CardHolder,
    Cvv,
    YapePhone,
    YapeCode,
    Password,
}

impl Field {
    /// Label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Dni => "DNI",
            Self::Ruc => "RUC",
            Self::Address => "Address",
            Self::Reference => "Reference",
            Self::CardNumber => "Card number",
            Self::Expiry => "Expiry date",
            Self::CardHolder => "Card holder",
            Self::Cvv => "CVV",
            Self::YapePhone => "Yape phone",
            Self::YapeCode => "Confirmation code",
            Self::Password => "Password",
        }
    }
}

/// Reasons a field value is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The field is required and blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// A numeric field has the wrong number of digits.
    #[error("{label} must be exactly {digits} digits")]
    DigitCount {
        /// Field label.
        label: &'static str,
        /// Expected digit count.
        digits: usize,
    },

    /// CVV is not 3 or 4 digits.
    #[error("CVV must be 3 or 4 digits")]
    CvvLength,

    /// Expiry does not look like `MM/YY`.
    #[error("Expiry date must be MM/YY (e.g. 07/27)")]
    ExpiryFormat,

    /// Expiry month outside 01-12.
    #[error("Expiry month must be between 01 and 12")]
    ExpiryMonth,

    /// Expiry month/year is before the current month.
    #[error("Expiry date must not be in the past")]
    Expired,

    /// Email is malformed.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// Password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length.
        min: usize,
    },

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Outcome of validating one field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub valid: bool,
    pub message: Option<String>,
}

impl Verdict {
    /// A passing verdict.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    /// A failing verdict carrying the failure's message.
    #[must_use]
    pub fn fail(failure: &ValidationFailure) -> Self {
        Self {
            valid: false,
            message: Some(failure.to_string()),
        }
    }
}

impl From<Result<(), ValidationFailure>> for Verdict {
    fn from(result: Result<(), ValidationFailure>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(failure) => Self::fail(&failure),
        }
    }
}

/// Validate a field against today's local date.
#[must_use]
pub fn validate(field: Field, value: &str) -> Verdict {
    validate_on(field, value, Local::now().date_naive())
}

/// Validate a field, using `today` as the reference for card expiry.
#[must_use]
pub fn validate_on(field: Field, value: &str, today: NaiveDate) -> Verdict {
    check(field, value, today).into()
}

/// Validate a field, returning the typed failure.
///
/// Blank values fail with [`ValidationFailure::Required`] for every field.
///
/// # Errors
///
/// Returns the first rule the value breaks.
pub fn check(field: Field, value: &str, today: NaiveDate) -> Result<(), ValidationFailure> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationFailure::Required(field.label()));
    }

    match field {
        Field::Dni => dni(value),
        Field::Ruc => ruc(value),
        Field::Phone | Field::YapePhone => phone(field, value),
        Field::CardNumber => card_number(value),
        Field::Expiry => expiry(value, today),
        Field::Cvv => cvv(value),
        Field::YapeCode => confirmation_code(value),
        Field::Email => Email::parse(value).map(|_| ()).map_err(Into::into),
        Field::Password => password(value),
        Field::FirstName
        | Field::LastName
        | Field::Address
        | Field::Reference
        | Field::CardHolder => Ok(()),
    }
}

/// DNI: exactly 8 digits.
///
/// # Errors
///
/// Returns [`ValidationFailure::DigitCount`] otherwise.
pub fn dni(value: &str) -> Result<(), ValidationFailure> {
    digits(&DNI_RE, Field::Dni, 8, value)
}

/// RUC: exactly 11 digits.
///
/// # Errors
///
/// Returns [`ValidationFailure::DigitCount`] otherwise.
pub fn ruc(value: &str) -> Result<(), ValidationFailure> {
    digits(&RUC_RE, Field::Ruc, 11, value)
}

/// Phone: exactly 9 digits.
///
/// # Errors
///
/// Returns [`ValidationFailure::DigitCount`] otherwise.
pub fn phone(field: Field, value: &str) -> Result<(), ValidationFailure> {
    digits(&PHONE_RE, field, 9, value)
}

/// Card number: exactly 16 digits once every non-digit is stripped.
///
/// # Errors
///
/// Returns [`ValidationFailure::DigitCount`] otherwise.
pub fn card_number(value: &str) -> Result<(), ValidationFailure> {
    digits(&CARD_RE, Field::CardNumber, 16, &digits_only(value, usize::MAX))
}

/// CVV: 3 or 4 digits.
///
/// # Errors
///
/// Returns [`ValidationFailure::CvvLength`] otherwise.
pub fn cvv(value: &str) -> Result<(), ValidationFailure> {
    if CVV_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationFailure::CvvLength)
    }
}

/// Yape confirmation code: exactly 6 digits.
///
/// # Errors
///
/// Returns [`ValidationFailure::DigitCount`] otherwise.
pub fn confirmation_code(value: &str) -> Result<(), ValidationFailure> {
    digits(&CONFIRMATION_CODE_RE, Field::YapeCode, 6, value)
}

/// Expiry: `MM/YY`, not before the month containing `today`.
///
/// # Errors
///
/// Returns a format, month, or expired failure.
pub fn expiry(value: &str, today: NaiveDate) -> Result<(), ValidationFailure> {
    let Some(caps) = EXPIRY_RE.captures(value) else {
        return Err(if EXPIRY_SHAPE_RE.is_match(value) {
            ValidationFailure::ExpiryMonth
        } else {
            ValidationFailure::ExpiryFormat
        });
    };

    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    let month: u32 = group(1)
        .parse()
        .map_err(|_| ValidationFailure::ExpiryFormat)?;
    let year: i32 = group(2)
        .parse::<i32>()
        .map_err(|_| ValidationFailure::ExpiryFormat)?
        + 2000;

    if (year, month) < (today.year(), today.month()) {
        return Err(ValidationFailure::Expired);
    }
    Ok(())
}

/// Registration password: at least [`MIN_PASSWORD_LENGTH`] characters.
///
/// # Errors
///
/// Returns [`ValidationFailure::PasswordTooShort`] otherwise.
pub fn password(value: &str) -> Result<(), ValidationFailure> {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationFailure::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Password confirmation must match when it was provided.
///
/// # Errors
///
/// Returns [`ValidationFailure::PasswordMismatch`] when both are present and differ.
pub fn password_confirmation(
    password: &str,
    confirmation: Option<&str>,
) -> Result<(), ValidationFailure> {
    match confirmation {
        Some(c) if !c.is_empty() && c != password => Err(ValidationFailure::PasswordMismatch),
        _ => Ok(()),
    }
}

fn digits(
    re: &Regex,
    field: Field,
    count: usize,
    value: &str,
) -> Result<(), ValidationFailure> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ValidationFailure::DigitCount {
            label: field.label(),
            digits: count,
        })
    }
}

// =============================================================================
// Input formatting
// =============================================================================

/// Keep ASCII digits only, truncated to `max` characters.
#[must_use]
pub fn digits_only(raw: &str, max: usize) -> String {
    raw.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Group card digits in blocks of four (`1234 5678 ...`).
#[must_use]
pub fn format_card_number(raw: &str) -> String {
    let digits = digits_only(raw, 16);
    let mut out = String::with_capacity(digits.len() + 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Insert the slash after a valid two-digit month (`0727` becomes `07/27`).
///
/// An invalid month is returned as the bare digits so the validator can
/// flag it.
#[must_use]
pub fn format_expiry(raw: &str) -> String {
    let digits = digits_only(raw, 4);
    if digits.len() < 2 {
        return digits;
    }
    let (month, year) = digits.split_at(2);
    match month.parse::<u32>() {
        Ok(1..=12) => format!("{month}/{year}"),
        _ => digits,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dni_digit_count() {
        let verdict = validate(Field::Dni, "1234567");
        assert!(!verdict.valid);
        assert_eq!(
            verdict.message.as_deref(),
            Some("DNI must be exactly 8 digits")
        );
        assert_eq!(validate(Field::Dni, "12345678"), Verdict::ok());
        assert!(!validate(Field::Dni, "1234567a").valid);
    }

    #[test]
    fn test_ruc_digit_count() {
        assert!(validate(Field::Ruc, "20123456789").valid);
        assert!(!validate(Field::Ruc, "2012345678").valid);
    }

    #[test]
    fn test_phone_and_yape_phone() {
        assert!(validate(Field::Phone, "987654321").valid);
        assert!(!validate(Field::Phone, "98765432").valid);
        let verdict = validate(Field::YapePhone, "12");
        assert_eq!(
            verdict.message.as_deref(),
            Some("Yape phone must be exactly 9 digits")
        );
    }

    #[test]
    fn test_card_number_strips_non_digits() {
        assert!(validate(Field::CardNumber, "4111 1111 1111 1111").valid);
        assert!(validate(Field::CardNumber, "4111-1111-1111-1111").valid);
        assert!(!validate(Field::CardNumber, "4111 1111 1111 111").valid);
        assert!(!validate(Field::CardNumber, "4111 1111 1111 11111").valid);
        assert!(!validate(Field::CardNumber, "card").valid);
    }

    #[test]
    fn test_card_number_property_over_lengths() {
        for len in 0..24 {
            let raw: String = "4".repeat(len);
            let spaced = format_card_number(&raw);
            let expected = len == 16;
            assert_eq!(card_number(&raw).is_ok(), expected, "len {len}");
            if len <= 16 {
                assert_eq!(card_number(&spaced).is_ok(), expected, "spaced len {len}");
            }
        }
    }

    #[test]
    fn test_cvv_lengths() {
        assert!(cvv("123").is_ok());
        assert!(cvv("1234").is_ok());
        assert_eq!(cvv("12"), Err(ValidationFailure::CvvLength));
        assert_eq!(cvv("12345"), Err(ValidationFailure::CvvLength));
    }

    #[test]
    fn test_confirmation_code() {
        assert!(confirmation_code("123456").is_ok());
        assert!(confirmation_code("12345").is_err());
    }

    #[test]
    fn test_expiry_current_month_is_accepted() {
        let today = day(2026, 10, 18);
        assert!(expiry("10/26", today).is_ok());
        assert!(expiry("11/26", today).is_ok());
        assert!(expiry("01/27", today).is_ok());
    }

    #[test]
    fn test_expiry_past_is_rejected() {
        let today = day(2026, 10, 18);
        assert_eq!(expiry("09/26", today), Err(ValidationFailure::Expired));
        assert_eq!(expiry("12/25", today), Err(ValidationFailure::Expired));
    }

    #[test]
    fn test_expiry_bad_shapes() {
        let today = day(2026, 10, 18);
        assert_eq!(expiry("13/27", today), Err(ValidationFailure::ExpiryMonth));
        assert_eq!(expiry("00/27", today), Err(ValidationFailure::ExpiryMonth));
        assert_eq!(expiry("1/27", today), Err(ValidationFailure::ExpiryFormat));
        assert_eq!(expiry("10-27", today), Err(ValidationFailure::ExpiryFormat));
        assert_eq!(expiry("10/2027", today), Err(ValidationFailure::ExpiryFormat));
    }

    #[test]
    fn test_expiry_exhaustive_months() {
        let today = day(2026, 6, 1);
        for yy in 0..100u32 {
            for mm in 0..=13u32 {
                let input = format!("{mm:02}/{yy:02}");
                let year = 2000 + i32::try_from(yy).unwrap();
                let expected = (1..=12).contains(&mm) && (year, mm) >= (2026, 6);
                assert_eq!(expiry(&input, today).is_ok(), expected, "{input}");
            }
        }
    }

    #[test]
    fn test_blank_is_required() {
        let verdict = validate(Field::FirstName, "   ");
        assert_eq!(verdict.message.as_deref(), Some("First name is required"));
        assert!(validate(Field::FirstName, "Ana").valid);
    }

    #[test]
    fn test_email_field() {
        assert!(validate(Field::Email, "ana@example.com").valid);
        assert!(!validate(Field::Email, "ana@example").valid);
    }

    #[test]
    fn test_password_rules() {
        assert!(password("secret").is_ok());
        assert!(password("short").is_err());
        assert!(password_confirmation("secret", Some("secret")).is_ok());
        assert!(password_confirmation("secret", None).is_ok());
        assert_eq!(
            password_confirmation("secret", Some("other")),
            Err(ValidationFailure::PasswordMismatch)
        );
    }

    #[test]
    fn test_format_card_number() {
        assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("41111"), "4111 1");
        assert_eq!(format_card_number("ab12"), "12");
    }

    #[test]
    fn test_format_expiry() {
        assert_eq!(format_expiry("0727"), "07/27");
        assert_eq!(format_expiry("07"), "07/");
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_expiry("1327"), "1327");
    }
}
