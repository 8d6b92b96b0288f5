//! Helper functions to [`toml_span`].

use std::borrow::Cow;

use toml_span::{DeserError, value::ValueInner};

/// Deserialize a TOML string into a value of the specified type.
pub fn from_toml_str<T>(toml_str: &str) -> Result<T, DeserError>
where
    T: for<'de> toml_span::Deserialize<'de>,
{
    let mut value = toml_span::de::parse(toml_str)?;
    T::deserialize(&mut value)
}

/// Create a custom [`DeserError`] with a span.
pub fn custom_deser_error(
    span: toml_span::Span,
    msg: impl Into<Cow<'static, str>>,
) -> DeserError {
    let err_kind = toml_span::ErrorKind::Custom(msg.into());
    let err = toml_span::Error::from((err_kind, span));
    DeserError::from(err)
}

/// A TOML number that may be written as either an integer or a float.
///
/// `toml_span` refuses to read `40` as an `f64`, but people write
/// percentages both ways.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TomlNumber(f64);

impl TomlNumber {
    /// Convert to an [`f64`].
    pub fn into_f64(self) -> f64 {
        self.0
    }
}

impl<'de> toml_span::Deserialize<'de> for TomlNumber {
    fn deserialize(value: &mut toml_span::Value<'de>) -> Result<Self, DeserError> {
        match value.take() {
            ValueInner::Integer(i) => Ok(TomlNumber(i as f64)),
            ValueInner::Float(f) if f.is_finite() => Ok(TomlNumber(f)),
            _ => Err(custom_deser_error(value.span, "expected a number")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapper {
        n: TomlNumber,
    }

    impl<'de> toml_span::Deserialize<'de> for Wrapper {
        fn deserialize(value: &mut toml_span::Value<'de>) -> Result<Self, DeserError> {
            let mut th = toml_span::de_helpers::TableHelper::new(value)?;
            let n = th.required("n")?;
            th.finalize(None)?;
            Ok(Wrapper { n })
        }
    }

    #[test]
    fn numbers_accept_integers_and_floats() {
        let w: Wrapper = from_toml_str("n = 40").unwrap();
        assert_eq!(w.n.into_f64(), 40.0);
        let w: Wrapper = from_toml_str("n = 40.5").unwrap();
        assert_eq!(w.n.into_f64(), 40.5);
    }

    #[test]
    fn numbers_reject_strings() {
        assert!(from_toml_str::<Wrapper>("n = \"forty\"").is_err());
    }
}
