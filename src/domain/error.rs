//! Domain error types.

/// A parse error with position information for indicator expressions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        // `position` is a byte offset; the caret is padded in characters.
        let column = input
            .get(..self.position)
            .map_or(self.position, |prefix| prefix.chars().count());
        let caret = " ".repeat(column) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Invalid indicator configuration, reported by `compute` before any bar is read.
///
/// Running out of history is never an error: warm-up bars are `None`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error("{indicator}: {parameter} must be positive, got {value}")]
    InvalidPeriod {
        indicator: &'static str,
        parameter: &'static str,
        value: usize,
    },

    #[error("{indicator}: {reason}")]
    InvalidParameter {
        indicator: &'static str,
        reason: String,
    },
}

impl IndicatorError {
    pub fn invalid_period(indicator: &'static str, parameter: &'static str, value: usize) -> Self {
        IndicatorError::InvalidPeriod {
            indicator,
            parameter,
            value,
        }
    }

    /// Returns `Ok` when `value` is a usable window length.
    pub fn check_period(
        indicator: &'static str,
        parameter: &'static str,
        value: usize,
    ) -> Result<(), Self> {
        if value == 0 {
            Err(Self::invalid_period(indicator, parameter, value))
        } else {
            Ok(())
        }
    }
}

/// Top-level error type for techind.
#[derive(Debug, thiserror::Error)]
pub enum TechindError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    ExpressionParse(#[from] ParseError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TechindError> for std::process::ExitCode {
    fn from(err: &TechindError) -> Self {
        let code: u8 = match err {
            TechindError::Io(_) => 1,
            TechindError::ConfigParse { .. }
            | TechindError::ConfigMissing { .. }
            | TechindError::ConfigInvalid { .. } => 2,
            TechindError::Data { .. } => 3,
            TechindError::ExpressionParse(_) => 4,
            TechindError::Indicator(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_context_points_at_position() {
        let err = ParseError {
            message: "expected integer".into(),
            position: 4,
        };
        let rendered = err.display_with_context("SMA(x)");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "SMA(x)");
        assert_eq!(lines[1], "    ^");
        assert_eq!(lines[2], "parse error at position 4: expected integer");
    }

    #[test]
    fn parse_error_context_counts_characters_not_bytes() {
        let input = "ä;SMA(x)";
        let err = ParseError {
            message: "expected integer".into(),
            position: input.find('x').unwrap(),
        };
        let rendered = err.display_with_context(input);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(err.position, 7);
        assert_eq!(lines[1], "      ^");
    }

    #[test]
    fn invalid_period_message() {
        let err = IndicatorError::invalid_period("SMA", "period", 0);
        assert_eq!(err.to_string(), "SMA: period must be positive, got 0");
    }

    #[test]
    fn check_period_rejects_zero_only() {
        assert!(IndicatorError::check_period("EMA", "period", 0).is_err());
        assert!(IndicatorError::check_period("EMA", "period", 1).is_ok());
    }

    #[test]
    fn indicator_error_converts_to_top_level() {
        let err: TechindError = IndicatorError::invalid_period("RSI", "period", 0).into();
        assert!(matches!(err, TechindError::Indicator(_)));
        assert_eq!(err.to_string(), "RSI: period must be positive, got 0");
    }
}
