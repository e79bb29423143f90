// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Conversion of the values given to `with_header` and friends into the
//! string form they're stored in. Numbers are the only non-string values
//! accepted, and they're formatted with [`ToString`].

use std::borrow::Cow;

/// A single header value.
pub trait IntoHeaderValue {
    fn into_header_value(self) -> String;
}

/// One or more header values, e.g. a single string or a list of strings.
pub trait IntoHeaderValues {
    fn into_header_values(self) -> Vec<String>;
}

impl IntoHeaderValue for String {
    fn into_header_value(self) -> String {
        self
    }
}

impl IntoHeaderValue for &String {
    fn into_header_value(self) -> String {
        self.clone()
    }
}

impl IntoHeaderValue for &str {
    fn into_header_value(self) -> String {
        self.to_string()
    }
}

impl IntoHeaderValue for Cow<'_, str> {
    fn into_header_value(self) -> String {
        self.into_owned()
    }
}

macro_rules! impl_numeric_header_value {
    ($($ty:ty),*) => {
        $(
            impl IntoHeaderValue for $ty {
                fn into_header_value(self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_numeric_header_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

macro_rules! impl_single_header_values {
    ($($ty:ty),*) => {
        $(
            impl IntoHeaderValues for $ty {
                fn into_header_values(self) -> Vec<String> {
                    vec![self.into_header_value()]
                }
            }
        )*
    };
}

impl_single_header_values!(String, &String, &str, Cow<'_, str>);
impl_single_header_values!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<T: IntoHeaderValue> IntoHeaderValues for Vec<T> {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(IntoHeaderValue::into_header_value).collect()
    }
}

impl<T: IntoHeaderValue, const N: usize> IntoHeaderValues for [T; N] {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(IntoHeaderValue::into_header_value).collect()
    }
}

impl<T: IntoHeaderValue + Clone> IntoHeaderValues for &[T] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().cloned().map(IntoHeaderValue::into_header_value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_coerced_to_strings() {
        assert_eq!(42u16.into_header_values(), vec!["42"]);
        assert_eq!((-7i64).into_header_values(), vec!["-7"]);
        assert_eq!(1.5f64.into_header_values(), vec!["1.5"]);
    }

    #[test]
    fn lists_keep_their_order() {
        assert_eq!(["b", "a"].into_header_values(), vec!["b", "a"]);
        assert_eq!(vec![String::from("x"), String::from("y")].into_header_values(), vec!["x", "y"]);
        let slice: &[&str] = &["gzip", "br"];
        assert_eq!(slice.into_header_values(), vec!["gzip", "br"]);
    }
}
