//! Indicator expression parser.
//!
//! Recursive descent parser for indicator specifications such as
//! `SMA(20)`, `EMA(10)@volume`, `MACD(12,26,9)` or `BOLLINGER(20,2.5)`.
//! Omitted trailing arguments take the indicator's defaults. Errors carry
//! the byte offset of the offending token.
//!
//! Grammar:
//! ```text
//! list       := expression (';' expression)* [';']
//! expression := NAME ['(' [argument (',' argument)*] ')'] ['@' field ['/' field]]
//! ```
//!
//! The second field rebinds the volume of VWAP variants.

use crate::domain::accessor::Field;
use crate::domain::error::ParseError;
use crate::domain::indicator::{
    adx, aroon, atr, atr_trailing_stop, bollinger, ema, ichimoku, macd, rsi, sma, stddev,
    stochastic, williams, AtrAverage, FloatParam, IndicatorType, Smoothing, VwapReset,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Every accepted indicator name with its argument list and defaults.
pub const SYNTAX: &[(&str, &str)] = &[
    ("SMA(period=10)", "simple moving average"),
    ("EMA(period=10)", "exponential moving average, alpha 2/(n+1)"),
    ("WILDER(period=10)", "Wilder moving average, alpha 1/n"),
    ("STDDEV(period=20)", "population standard deviation"),
    ("ATR(period=14)", "average true range, simple average"),
    ("ATR_WILDER(period=14)", "average true range, Wilder average"),
    ("MACD(fast=12,slow=26,signal=9)", "macd, signal, divergence"),
    ("RSI(period=14)", "relative strength index"),
    ("BOLLINGER(period=20,multiplier=2)", "upper, middle, lower bands"),
    ("ADX(period=14)", "adx, plus_di, minus_di"),
    ("AROON(period=20)", "up, down, oscillator"),
    ("STOCHASTIC(period=14,period_d=3)", "%K and %D"),
    ("WILLIAMS(period=14)", "Williams %R"),
    ("ICHIMOKU(tenkan=9,kijun=26,senkou_b=52)", "unshifted Ichimoku lines"),
    ("ATR_TRAILING_STOP(period=14,multiplier=3)", "up and down stops"),
    ("ATR_TRAILING_STOP_WILDER(period=14,multiplier=3)", "stops over Wilder ATR"),
    ("VWAP", "volume weighted average price since series start"),
    ("VWAP_DAILY", "volume weighted average price, reset each day"),
    ("VWAP_ANCHORED(datetime)", "volume weighted average price from an anchor"),
];

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: format!("expected '{}', found end of input", expected),
                position: self.pos,
            }),
        }
    }

    fn consume_char(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek_word(&self) -> &'a str {
        let remaining = self.remaining();
        let end = remaining
            .char_indices()
            .find(|(_, ch)| !(ch.is_alphanumeric() || *ch == '_'))
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());
        &remaining[..end]
    }

    fn describe_next(&self) -> String {
        let word = self.peek_word();
        if !word.is_empty() {
            word.to_string()
        } else {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: format!("expected number, found '{}'", self.describe_next()),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_integer(&mut self) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: format!("expected integer, found '{}'", self.describe_next()),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<usize>().map_err(|_| ParseError {
            message: format!("invalid integer: {}", num_str),
            position: start,
        })
    }

    /// Parses an optional parenthesised argument list of at most `max`
    /// entries, handing each position to `arg`.
    fn parse_arg_list(
        &mut self,
        name: &str,
        max: usize,
        mut arg: impl FnMut(&mut Self, usize) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        if !self.consume_char('(') || self.consume_char(')') {
            return Ok(());
        }
        let mut index = 0;
        loop {
            self.skip_whitespace();
            if index == max {
                return Err(ParseError {
                    message: format!("{} takes at most {} argument(s)", name, max),
                    position: self.pos,
                });
            }
            arg(self, index)?;
            index += 1;
            if self.consume_char(')') {
                return Ok(());
            }
            self.expect_char(',')?;
        }
    }

    /// Integer arguments; omitted trailing ones keep their defaults.
    fn parse_periods<const N: usize>(
        &mut self,
        name: &str,
        defaults: [usize; N],
    ) -> Result<[usize; N], ParseError> {
        let mut values = defaults;
        self.parse_arg_list(name, N, |p, i| {
            values[i] = p.parse_integer()?;
            Ok(())
        })?;
        Ok(values)
    }

    /// An integer period followed by a decimal multiplier.
    fn parse_period_and_multiplier(
        &mut self,
        name: &str,
        period: usize,
        multiplier: f64,
    ) -> Result<(usize, f64), ParseError> {
        let (mut period, mut multiplier) = (period, multiplier);
        self.parse_arg_list(name, 2, |p, i| {
            if i == 0 {
                period = p.parse_integer()?;
            } else {
                multiplier = p.parse_number()?;
            }
            Ok(())
        })?;
        Ok((period, multiplier))
    }

    fn parse_anchor(&mut self) -> Result<NaiveDateTime, ParseError> {
        self.expect_char('(')?;
        self.skip_whitespace();
        let start = self.pos;
        let end = self
            .remaining()
            .find(')')
            .map(|i| self.pos + i)
            .ok_or_else(|| ParseError {
                message: "expected ')', found end of input".to_string(),
                position: self.input.len(),
            })?;
        let text = self.input[start..end].trim();
        let anchor = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
            })
            .map_err(|_| ParseError {
                message: format!(
                    "invalid anchor '{}', expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS",
                    text
                ),
                position: start,
            })?;
        self.pos = end + 1;
        Ok(anchor)
    }

    /// `@field` suffix; `None` when absent.
    fn parse_source(&mut self) -> Result<Option<(Field, usize)>, ParseError> {
        if !self.consume_char('@') {
            return Ok(None);
        }
        self.parse_field().map(Some)
    }

    fn parse_field(&mut self) -> Result<(Field, usize), ParseError> {
        self.skip_whitespace();
        let position = self.pos;
        let word = self.peek_word();
        if word.is_empty() {
            return Err(ParseError {
                message: format!("expected field name, found '{}'", self.describe_next()),
                position,
            });
        }
        self.pos += word.len();
        let field = word.parse::<Field>().unwrap_or_else(|e| match e {});
        Ok((field, position))
    }

    fn parse_expression(&mut self) -> Result<IndicatorType, ParseError> {
        self.skip_whitespace();
        let name_pos = self.pos;
        let name = self.peek_word();
        self.pos += name.len();

        let (indicator_type, takes_source) = match name {
            "SMA" => {
                let [period] = self.parse_periods(name, [sma::DEFAULT_PERIOD])?;
                (
                    IndicatorType::Sma {
                        period,
                        source: Field::Close,
                    },
                    true,
                )
            }
            "EMA" | "WILDER" => {
                let [period] = self.parse_periods(name, [ema::DEFAULT_PERIOD])?;
                let smoothing = if name == "EMA" {
                    Smoothing::Exponential
                } else {
                    Smoothing::Wilder
                };
                (
                    IndicatorType::Ema {
                        period,
                        smoothing,
                        source: Field::Close,
                    },
                    true,
                )
            }
            "STDDEV" => {
                let [period] = self.parse_periods(name, [stddev::DEFAULT_PERIOD])?;
                (
                    IndicatorType::Stddev {
                        period,
                        source: Field::Close,
                    },
                    true,
                )
            }
            "ATR" | "ATR_WILDER" => {
                let [period] = self.parse_periods(name, [atr::DEFAULT_PERIOD])?;
                let average = if name == "ATR" {
                    AtrAverage::Simple
                } else {
                    AtrAverage::Wilder
                };
                (
                    IndicatorType::Atr {
                        period,
                        average,
                    },
                    false,
                )
            }
            "MACD" => {
                let [fast, slow, signal] = self.parse_periods(
                    name,
                    [macd::DEFAULT_FAST, macd::DEFAULT_SLOW, macd::DEFAULT_SIGNAL],
                )?;
                (
                    IndicatorType::Macd {
                        fast,
                        slow,
                        signal,
                        source: Field::Close,
                    },
                    true,
                )
            }
            "RSI" => {
                let [period] = self.parse_periods(name, [rsi::DEFAULT_PERIOD])?;
                (
                    IndicatorType::Rsi {
                        period,
                        source: Field::Close,
                    },
                    true,
                )
            }
            "BOLLINGER" => {
                let (period, multiplier) = self.parse_period_and_multiplier(
                    name,
                    bollinger::DEFAULT_PERIOD,
                    bollinger::DEFAULT_MULTIPLIER,
                )?;
                (
                    IndicatorType::Bollinger {
                        period,
                        multiplier: FloatParam::new(multiplier),
                        source: Field::Close,
                    },
                    true,
                )
            }
            "ADX" => {
                let [period] = self.parse_periods(name, [adx::DEFAULT_PERIOD])?;
                (IndicatorType::Adx { period }, false)
            }
            "AROON" => {
                let [period] = self.parse_periods(name, [aroon::DEFAULT_PERIOD])?;
                (IndicatorType::Aroon { period }, false)
            }
            "STOCHASTIC" => {
                let [period, period_d] = self.parse_periods(
                    name,
                    [stochastic::DEFAULT_PERIOD, stochastic::DEFAULT_PERIOD_D],
                )?;
                (IndicatorType::Stochastic { period, period_d }, false)
            }
            "WILLIAMS" => {
                let [period] = self.parse_periods(name, [williams::DEFAULT_PERIOD])?;
                (IndicatorType::Williams { period }, false)
            }
            "ICHIMOKU" => {
                let [tenkan, kijun, senkou_b] = self.parse_periods(
                    name,
                    [
                        ichimoku::DEFAULT_TENKAN,
                        ichimoku::DEFAULT_KIJUN,
                        ichimoku::DEFAULT_SENKOU_B,
                    ],
                )?;
                (
                    IndicatorType::Ichimoku {
                        tenkan,
                        kijun,
                        senkou_b,
                    },
                    false,
                )
            }
            "ATR_TRAILING_STOP" | "ATR_TRAILING_STOP_WILDER" => {
                let (period, multiplier) = self.parse_period_and_multiplier(
                    name,
                    atr::DEFAULT_PERIOD,
                    atr_trailing_stop::DEFAULT_MULTIPLIER,
                )?;
                let average = if name == "ATR_TRAILING_STOP" {
                    AtrAverage::Simple
                } else {
                    AtrAverage::Wilder
                };
                (
                    IndicatorType::AtrTrailingStop {
                        period,
                        average,
                        multiplier: FloatParam::new(multiplier),
                    },
                    false,
                )
            }
            "VWAP" | "VWAP_DAILY" => {
                self.parse_periods(name, [])?;
                let reset = if name == "VWAP" {
                    VwapReset::Never
                } else {
                    VwapReset::Daily
                };
                (
                    IndicatorType::Vwap {
                        reset,
                        source: Field::Typical,
                        volume: Field::Volume,
                    },
                    true,
                )
            }
            "VWAP_ANCHORED" => {
                let anchor = self.parse_anchor()?;
                (
                    IndicatorType::Vwap {
                        reset: VwapReset::At(anchor),
                        source: Field::Typical,
                        volume: Field::Volume,
                    },
                    true,
                )
            }
            _ => {
                self.pos = name_pos;
                return Err(ParseError {
                    message: format!("expected indicator, found '{}'", self.describe_next()),
                    position: name_pos,
                });
            }
        };

        match self.parse_source()? {
            None => Ok(indicator_type),
            Some((_, position)) if !takes_source => Err(ParseError {
                message: format!("{} does not take a source field", name),
                position,
            }),
            Some((field, _)) => match with_source(indicator_type, field) {
                IndicatorType::Vwap {
                    reset,
                    source,
                    volume,
                } => {
                    let volume = if self.consume_char('/') {
                        self.parse_field()?.0
                    } else {
                        volume
                    };
                    Ok(IndicatorType::Vwap {
                        reset,
                        source,
                        volume,
                    })
                }
                other => Ok(other),
            },
        }
    }

    fn parse_single(&mut self) -> Result<IndicatorType, ParseError> {
        let indicator_type = self.parse_expression()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(ParseError {
                message: format!("unexpected input after indicator: '{}'", self.remaining()),
                position: self.pos,
            });
        }
        Ok(indicator_type)
    }

    fn parse_list(&mut self) -> Result<Vec<IndicatorType>, ParseError> {
        let mut list = vec![self.parse_expression()?];
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }
            self.expect_char(';')?;
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }
            list.push(self.parse_expression()?);
        }
        Ok(list)
    }
}

fn with_source(indicator_type: IndicatorType, field: Field) -> IndicatorType {
    match indicator_type {
        IndicatorType::Sma { period, .. } => IndicatorType::Sma {
            period,
            source: field,
        },
        IndicatorType::Ema {
            period, smoothing, ..
        } => IndicatorType::Ema {
            period,
            smoothing,
            source: field,
        },
        IndicatorType::Stddev { period, .. } => IndicatorType::Stddev {
            period,
            source: field,
        },
        IndicatorType::Macd {
            fast, slow, signal, ..
        } => IndicatorType::Macd {
            fast,
            slow,
            signal,
            source: field,
        },
        IndicatorType::Rsi { period, .. } => IndicatorType::Rsi {
            period,
            source: field,
        },
        IndicatorType::Bollinger {
            period, multiplier, ..
        } => IndicatorType::Bollinger {
            period,
            multiplier,
            source: field,
        },
        IndicatorType::Vwap { reset, volume, .. } => IndicatorType::Vwap {
            reset,
            source: field,
            volume,
        },
        other => other,
    }
}

/// Parses one indicator expression.
pub fn parse(input: &str) -> Result<IndicatorType, ParseError> {
    Parser::new(input).parse_single()
}

/// Parses a `;`-separated list of indicator expressions.
pub fn parse_list(input: &str) -> Result<Vec<IndicatorType>, ParseError> {
    Parser::new(input).parse_list()
}
