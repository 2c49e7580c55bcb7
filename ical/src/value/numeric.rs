// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! INTEGER and FLOAT values as defined in RFC 5545 Sections 3.3.7 and 3.3.8,
//! plus the two-float GEO value of Section 3.8.1.6.

use std::fmt;

use chumsky::Parser;
use chumsky::extra::ParserExtra;
use chumsky::label::LabelError;
use chumsky::prelude::*;

use crate::value::{ValueExpected, ValueParseError, ValueType, parse_with};

/// Geographic position, latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geo {
    /// Latitude, positive north
    pub latitude: f64,
    /// Longitude, positive east
    pub longitude: f64,
}

impl Geo {
    /// ```txt
    /// geovalue   = float ";" float
    /// ```
    pub(crate) fn parse(text: &str) -> Result<Self, ValueParseError> {
        let parser = value_float()
            .then_ignore(just(';'))
            .then(value_float())
            .map(|(latitude, longitude)| Geo {
                latitude,
                longitude,
            });
        parse_with(text, ValueType::Float, parser)
    }
}

impl fmt::Display for Geo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.latitude, self.longitude)
    }
}

pub(crate) fn parse_integer(text: &str) -> Result<i32, ValueParseError> {
    parse_with(text, ValueType::Integer, value_integer())
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// float      = (["+"] / "-") 1*DIGIT ["." 1*DIGIT]
/// ```
fn value_float<'src, I, E>() -> impl Parser<'src, I, f64, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let digits = select! { c @ '0'..='9' => c }
        .repeated()
        .at_least(1)
        .collect::<String>();

    sign()
        .or_not()
        .then(digits)
        .then(just('.').ignore_then(digits).or_not())
        .try_map_with(|((sign, int_part), frac_part), e| {
            let mut s = String::with_capacity(int_part.len() + 16);
            if let Some(sign) = sign {
                s.push(sign);
            }
            s.push_str(&int_part);
            if let Some(frac) = frac_part {
                s.push('.');
                s.push_str(&frac);
            }

            match lexical::parse_partial::<f64, _>(&s) {
                Ok((f, n)) if n == s.len() && f.is_finite() => Ok(f),
                _ => Err(E::Error::expected_found([ValueExpected::F64], None, e.span())),
            }
        })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// integer    = (["+"] / "-") 1*DIGIT
/// ```
fn value_integer<'src, I, E>() -> impl Parser<'src, I, i32, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    sign()
        .or_not()
        .then(
            select! { c @ '0'..='9' => c }
                .repeated()
                .at_least(1)
                .collect::<String>(),
        )
        .try_map_with(|(sign, digits), e| {
            let mut int_str = String::with_capacity(digits.len() + 1);
            if let Some(sign) = sign {
                int_str.push(sign);
            }
            int_str.push_str(&digits);

            match lexical::parse_partial::<i32, _>(&int_str) {
                Ok((v, n)) if n == int_str.len() => Ok(v),
                _ => Err(E::Error::expected_found([ValueExpected::I32], None, e.span())),
            }
        })
}

fn sign<'src, I, E>() -> impl Parser<'src, I, char, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    select! { c @ ('+' | '-') => c }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer() {
        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 5545 Section 3.3.8
            ("1234567890",  1_234_567_890),
            ("-1234567890", -1_234_567_890),
            ("+1234567890", 1_234_567_890),
            ("432109876",   432_109_876),
            // extra tests
            ("0",           0),
            ("-0",          0),
            ("2147483647",  i32::MAX),
            ("-2147483648", i32::MIN),
        ];
        for (src, expected) in success_cases {
            assert_eq!(parse_integer(src).unwrap(), expected, "{src}");
        }

        let fail_cases = [
            "2147483648", // overflow
            "1.5",        // float
            "+",          // sign only
            "1 2",        // space
            "",
        ];
        for src in fail_cases {
            assert!(parse_integer(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn parses_geo() {
        let geo = Geo::parse("37.386013;-122.082932").unwrap();
        assert!((geo.latitude - 37.386_013).abs() < 1e-9);
        assert!((geo.longitude + 122.082_932).abs() < 1e-9);
        assert_eq!(geo.to_string(), "37.386013;-122.082932");

        for src in ["37.386013", "37.386013;", "37.;1", "1,2", "a;b"] {
            assert!(Geo::parse(src).is_err(), "Parse {src} should fail");
        }
    }
}
