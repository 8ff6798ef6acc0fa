//! The sanitizer contract
//!
//! A sanitizer validates one raw parameter value and either parses it into
//! a typed value or rejects it with [`InvalidParam`]. A rejection may carry
//! a suggested replacement; the scope layer turns replacements into a
//! redirect so that the corrected value becomes the visible, linkable
//! navigation state. A sanitizer must never "fix" a value by returning the
//! correction directly.

/// A single raw value failed validation
///
/// `replacement: Some(_)` asks for the value to be corrected via redirect;
/// `None` asks for it to be discarded entirely (treated as absent).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameter value")]
pub struct InvalidParam {
    /// Suggested corrected raw value, if any
    pub replacement: Option<String>,
}

impl InvalidParam {
    /// Reject the value, asking for it to be discarded
    #[inline]
    #[must_use]
    pub fn discard() -> Self {
        Self { replacement: None }
    }

    /// Reject the value, suggesting a corrected raw form
    #[inline]
    #[must_use]
    pub fn replace(replacement: impl Into<String>) -> Self {
        Self {
            replacement: Some(replacement.into()),
        }
    }
}

/// Validating converter from raw string to typed value
///
/// Implemented for free by any `Fn(&str) -> Result<T, InvalidParam>`, so
/// plain functions and closures are sanitizers.
pub trait Sanitize<T> {
    /// Validate and convert one raw value
    ///
    /// # Errors
    /// [`InvalidParam`] when the value is rejected.
    fn sanitize(&self, raw: &str) -> Result<T, InvalidParam>;
}

impl<T, F> Sanitize<T> for F
where
    F: Fn(&str) -> Result<T, InvalidParam>,
{
    fn sanitize(&self, raw: &str) -> Result<T, InvalidParam> {
        self(raw)
    }
}

/// Identity sanitizer: every string is valid as-is
///
/// # Errors
/// Never fails.
pub fn sane_string(raw: &str) -> Result<String, InvalidParam> {
    Ok(raw.to_string())
}

/// Integer sanitizer rejecting non-canonical textual forms
///
/// Accepts exactly the canonical decimal serialization of an `i64`. A value
/// that parses leniently (leading whitespace, explicit `+`, leading zeros,
/// trailing garbage) but is not canonical is rejected with the canonical
/// re-serialization as the suggested replacement; anything with no leading
/// integer at all is rejected with no replacement.
///
/// # Errors
/// [`InvalidParam`] as described above.
pub fn sane_number(raw: &str) -> Result<i64, InvalidParam> {
    if raw.is_empty() {
        return Err(InvalidParam::discard());
    }
    let value = lenient_parse(raw).ok_or_else(InvalidParam::discard)?;
    let canonical = value.to_string();
    if canonical == raw {
        Ok(value)
    } else {
        Err(InvalidParam::replace(canonical))
    }
}

/// Longest-leading-integer parse: optional whitespace, optional sign, then
/// as many ASCII digits as present. `None` when there are no digits or the
/// magnitude overflows `i64`.
fn lenient_parse(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }
    // Accumulate toward the sign so the full i64 range parses, including
    // i64::MIN whose magnitude has no positive representation.
    let mut value: i64 = 0;
    for byte in digits.bytes() {
        let digit = i64::from(byte - b'0');
        value = value.checked_mul(10)?;
        value = if negative {
            value.checked_sub(digit)?
        } else {
            value.checked_add(digit)?
        };
    }
    Some(value)
}

/// Boolean sanitizer with `y`/`n` as the canonical forms
///
/// Any other input is rejected with a suggested correction: `n` when the
/// trimmed, lowercased input looks falsy (`""`, `"0"`, `"false"`, `"no"`),
/// `y` otherwise.
///
/// # Errors
/// [`InvalidParam`] with a replacement for every non-canonical input.
pub fn sane_boolean(raw: &str) -> Result<bool, InvalidParam> {
    match raw {
        "y" => Ok(true),
        "n" => Ok(false),
        _ => {
            let falsy = matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "" | "0" | "false" | "no"
            );
            Err(InvalidParam::replace(if falsy { "n" } else { "y" }))
        }
    }
}

/// Enumeration sanitizer over string options
///
/// Values outside the allowed set are rejected with no replacement.
pub fn sane_option<I, S>(options: I) -> impl Sanitize<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    sane_option_with(options.into_iter().map(Into::into).collect(), sane_string)
}

/// Enumeration sanitizer over options of any type
///
/// The base sanitizer converts the raw value first; the result must then be
/// one of the allowed options, otherwise the value is rejected with no
/// replacement.
pub fn sane_option_with<T, B>(options: Vec<T>, base: B) -> impl Sanitize<T>
where
    T: PartialEq,
    B: Sanitize<T>,
{
    move |raw: &str| {
        let value = base.sanitize(raw)?;
        if options.contains(&value) {
            Ok(value)
        } else {
            Err(InvalidParam::discard())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn string_passthrough() {
        assert_eq!(sane_string.sanitize("anything").unwrap(), "anything");
        assert_eq!(sane_string.sanitize("").unwrap(), "");
    }

    #[test]
    fn number_canonical_forms() {
        assert_eq!(sane_number.sanitize("0").unwrap(), 0);
        assert_eq!(sane_number.sanitize("1337").unwrap(), 1337);
        assert_eq!(sane_number.sanitize("-5").unwrap(), -5);
    }

    #[test]
    fn number_rejects_without_replacement() {
        assert_eq!(sane_number.sanitize("").unwrap_err(), InvalidParam::discard());
        assert_eq!(sane_number.sanitize("IM").unwrap_err(), InvalidParam::discard());
        assert_eq!(sane_number.sanitize("-").unwrap_err(), InvalidParam::discard());
    }

    #[test]
    fn number_suggests_canonical_replacement() {
        assert_eq!(
            sane_number.sanitize("007").unwrap_err(),
            InvalidParam::replace("7")
        );
        assert_eq!(
            sane_number.sanitize("+3").unwrap_err(),
            InvalidParam::replace("3")
        );
        assert_eq!(
            sane_number.sanitize("12abc").unwrap_err(),
            InvalidParam::replace("12")
        );
        assert_eq!(
            sane_number.sanitize("-0").unwrap_err(),
            InvalidParam::replace("0")
        );
    }

    #[test]
    fn boolean_canonical_and_corrections() {
        assert_eq!(sane_boolean.sanitize("y").unwrap(), true);
        assert_eq!(sane_boolean.sanitize("n").unwrap(), false);
        assert_eq!(
            sane_boolean.sanitize("0").unwrap_err(),
            InvalidParam::replace("n")
        );
        assert_eq!(
            sane_boolean.sanitize("FALSE ").unwrap_err(),
            InvalidParam::replace("n")
        );
        assert_eq!(
            sane_boolean.sanitize("1").unwrap_err(),
            InvalidParam::replace("y")
        );
        assert_eq!(
            sane_boolean.sanitize("true").unwrap_err(),
            InvalidParam::replace("y")
        );
    }

    #[test]
    fn option_filters_values() {
        let sanitizer = sane_option(["1", "2", "3"]);
        assert_eq!(sanitizer.sanitize("1").unwrap(), "1");
        assert_eq!(sanitizer.sanitize("4").unwrap_err(), InvalidParam::discard());
    }

    #[test]
    fn option_with_base_sanitizer() {
        let sanitizer = sane_option_with(vec![1i64, 2, 3], sane_number);
        assert_eq!(sanitizer.sanitize("2").unwrap(), 2);
        assert_eq!(sanitizer.sanitize("9").unwrap_err(), InvalidParam::discard());
        // Base rejection surfaces before the membership check
        assert_eq!(
            sanitizer.sanitize("02").unwrap_err(),
            InvalidParam::replace("2")
        );
    }

    proptest! {
        #[test]
        fn number_accepts_every_canonical_i64(value in any::<i64>()) {
            prop_assert_eq!(sane_number.sanitize(&value.to_string()), Ok(value));
        }

        #[test]
        fn number_replacement_is_always_canonical(raw in "\\PC*") {
            if let Err(InvalidParam { replacement: Some(fixed) }) = sane_number.sanitize(&raw) {
                prop_assert_eq!(sane_number.sanitize(&fixed).ok().map(|v| v.to_string()), Some(fixed));
            }
        }
    }
}
