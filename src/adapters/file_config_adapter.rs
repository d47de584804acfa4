//! INI file configuration adapter.

use crate::domain::error::TechindError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

/// Sections `compute` reads; anything else is reported and ignored.
pub const KNOWN_SECTIONS: [&str; 4] = ["data", "indicators", "output", "logging"];

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TechindError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| TechindError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self::checked(config))
    }

    pub fn from_string(content: &str) -> Result<Self, TechindError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TechindError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self::checked(config))
    }

    fn checked(config: Ini) -> Self {
        for section in config.sections() {
            if !KNOWN_SECTIONS.contains(&section.as_str()) {
                tracing::warn!(section = %section, "ignoring unknown config section");
            }
        }
        Self { config }
    }

    fn invalid(section: &str, key: &str, reason: String) -> TechindError {
        TechindError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason,
        }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TechindError> {
        self.config
            .getint(section, key)
            .map_err(|_| {
                let raw = self.config.get(section, key).unwrap_or_default();
                Self::invalid(section, key, format!("expected an integer, got '{raw}'"))
            })
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, TechindError> {
        self.config
            .get(section, key)
            .map(|v| {
                Self::parse_bool(&v).ok_or_else(|| {
                    Self::invalid(section, key, format!("expected a boolean, got '{v}'"))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TECHIND_INI: &str = r#"
[data]
path = prices.csv
start = 2024-01-01
end = 2024-06-30

[indicators]
list = SMA(20); MACD(12,26,9); BOLLINGER(20,2.5)

[output]
path = out.csv
precision = 2
header = no

[logging]
level = warn
"#;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn reads_every_compute_section() {
        let config = adapter(TECHIND_INI);

        assert_eq!(config.get_string("data", "path"), Some("prices.csv".into()));
        assert_eq!(config.get_string("data", "end"), Some("2024-06-30".into()));
        assert_eq!(
            config.get_string("indicators", "list"),
            Some("SMA(20); MACD(12,26,9); BOLLINGER(20,2.5)".into())
        );
        assert_eq!(config.get_int("output", "precision").unwrap(), Some(2));
        assert_eq!(config.get_bool("output", "header").unwrap(), Some(false));
        assert_eq!(config.get_string("logging", "level"), Some("warn".into()));
    }

    #[test]
    fn absent_keys_are_none() {
        let config = adapter("[output]\n");
        assert_eq!(config.get_string("data", "path"), None);
        assert_eq!(config.get_int("output", "precision").unwrap(), None);
        assert_eq!(config.get_bool("output", "header").unwrap(), None);
    }

    #[test]
    fn negative_precision_is_kept_for_the_caller() {
        let config = adapter("[output]\nprecision = -1\n");
        assert_eq!(config.get_int("output", "precision").unwrap(), Some(-1));
    }

    #[test]
    fn malformed_precision_is_invalid() {
        let err = adapter("[output]\nprecision = abc\n")
            .get_int("output", "precision")
            .unwrap_err();
        assert!(matches!(
            err,
            TechindError::ConfigInvalid { ref section, ref key, ref reason }
                if section == "output" && key == "precision" && reason.contains("abc")
        ));
    }

    #[test]
    fn header_accepts_common_spellings() {
        let config = adapter("[output]\na = Yes\nb = on\nc = 0\nd = FALSE\n");
        assert_eq!(config.get_bool("output", "a").unwrap(), Some(true));
        assert_eq!(config.get_bool("output", "b").unwrap(), Some(true));
        assert_eq!(config.get_bool("output", "c").unwrap(), Some(false));
        assert_eq!(config.get_bool("output", "d").unwrap(), Some(false));
    }

    #[test]
    fn malformed_header_is_invalid() {
        let err = adapter("[output]\nheader = sometimes\n")
            .get_bool("output", "header")
            .unwrap_err();
        assert!(matches!(err, TechindError::ConfigInvalid { ref key, .. } if key == "header"));
    }

    #[test]
    fn unknown_sections_are_tolerated() {
        let config = adapter("[data]\npath = a.csv\n[strategy]\nname = x\n");
        assert_eq!(config.get_string("data", "path"), Some("a.csv".into()));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[logging]\nlevel = debug\n").unwrap();
        let config = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(config.get_string("logging", "level"), Some("debug".into()));
    }

    #[test]
    fn missing_file_is_parse_error_naming_the_file() {
        let err = FileConfigAdapter::from_file("/nonexistent/techind.ini")
            .err()
            .unwrap();
        assert!(matches!(
            err,
            TechindError::ConfigParse { ref file, .. } if file == "/nonexistent/techind.ini"
        ));
    }
}
