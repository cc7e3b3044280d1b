use std::env;
use std::fmt;
use std::str::FromStr;

/// The environment variable `Printer::from_env` reads its settings from.
pub const CONFIG_ENV: &str = "PTC_PRINT";

/// The settings of a printer.
///
/// The `Default` implementation gives the settings of Python's `print`: a
/// newline terminator, a single space separator, no wrap pattern and no
/// forced flush.
///
/// # Text form
///
/// `PrintConfig` implements `FromStr` and `Display` for a compact text form:
/// a `;` separated list of `key=value` settings, where the keys are `end`
/// (or `terminator`), `sep` (or `separator`), `pattern` and `flush`. Settings
/// that are not mentioned keep their default. Values may use the escapes
/// `\n`, `\t`, `\r`, `\e` (the ANSI escape character), `\s` (a space), `\;`
/// and `\\`. `flush` accepts `true`, `false`, `yes`, `no`, `on`, `off`, `1`
/// and `0`.
///
/// ```
/// use ptc::PrintConfig;
///
/// let config: PrintConfig = r"sep=,\s;end=.\n;flush=yes".parse().unwrap();
/// assert_eq!(config.separator(), ", ");
/// assert_eq!(config.terminator(), ".\n");
/// assert!(config.flush());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrintConfig {
    pub(crate) terminator: String,
    pub(crate) separator: String,
    pub(crate) pattern: String,
    pub(crate) flush: bool,
}

impl Default for PrintConfig {
    fn default() -> PrintConfig {
        PrintConfig {
            terminator: "\n".to_string(),
            separator: " ".to_string(),
            pattern: String::new(),
            flush: false,
        }
    }
}

impl PrintConfig {
    /// Create the default settings.
    pub fn new() -> PrintConfig {
        PrintConfig::default()
    }

    /// Reads settings from the environment variable `name`.
    ///
    /// Returns `Ok(None)` if the variable is not set.
    pub fn from_env(name: &str) -> Result<Option<PrintConfig>, ConfigParseError> {
        match env::var(name) {
            Ok(text) => text.parse().map(Some),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(ConfigParseError::NotUnicode(name.to_string()))
            }
        }
    }

    /// Get the text written after the last value.
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Set the text written after the last value.
    pub fn set_terminator(
        &mut self,
        terminator: impl Into<String>,
    ) -> &mut PrintConfig {
        self.terminator = terminator.into();
        self
    }

    /// Get the text written between two values.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Set the text written between two values.
    pub fn set_separator(
        &mut self,
        separator: impl Into<String>,
    ) -> &mut PrintConfig {
        self.separator = separator.into();
        self
    }

    /// Get the text written before and after every value.
    ///
    /// An empty pattern disables wrapping.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Set the text written before and after every value.
    pub fn set_pattern(&mut self, pattern: impl Into<String>) -> &mut PrintConfig {
        self.pattern = pattern.into();
        self
    }

    /// Whether the sink is flushed after every call.
    pub fn flush(&self) -> bool {
        self.flush
    }

    /// Set whether the sink is flushed after every call.
    ///
    /// In-memory sinks are never flushed.
    pub fn set_flush(&mut self, yes: bool) -> &mut PrintConfig {
        self.flush = yes;
        self
    }
}

/// An error that occurs when parsing a `PrintConfig` fails.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigParseError {
    /// The key of a setting is not one of the known keys.
    #[error(
        "unrecognized print setting '{0}': valid settings are: \
         end, sep, pattern, flush"
    )]
    UnknownSetting(String),
    /// A setting has no `=`.
    #[error("print setting '{0}' has no value, expected '{0}=<value>'")]
    MissingValue(String),
    /// The value of `flush` is not a boolean.
    #[error(
        "unrecognized flush value '{0}': valid values are: \
         true, false, yes, no, on, off, 1, 0"
    )]
    InvalidFlag(String),
    /// A backslash is followed by an unknown character.
    #[error("unrecognized escape '\\{0}' in print setting")]
    InvalidEscape(char),
    /// A setting ends with a lone backslash.
    #[error("print setting ends with an unfinished escape")]
    DanglingEscape,
    /// The environment variable holds invalid unicode.
    #[error("environment variable {0} is not valid unicode")]
    NotUnicode(String),
}

impl FromStr for PrintConfig {
    type Err = ConfigParseError;

    fn from_str(text: &str) -> Result<PrintConfig, ConfigParseError> {
        let mut config = PrintConfig::new();
        for part in split_settings(text)? {
            let part = part.trim_start();
            if part.trim().is_empty() {
                continue;
            }
            let Some((key, raw)) = part.split_once('=') else {
                return Err(ConfigParseError::MissingValue(
                    part.trim().to_string(),
                ));
            };
            let value = unescape(raw)?;
            match key.trim() {
                "end" | "terminator" => {
                    config.set_terminator(value);
                }
                "sep" | "separator" => {
                    config.set_separator(value);
                }
                "pattern" => {
                    config.set_pattern(value);
                }
                "flush" => {
                    config.set_flush(parse_flag(value.trim())?);
                }
                unknown => {
                    return Err(ConfigParseError::UnknownSetting(
                        unknown.to_string(),
                    ));
                }
            }
        }
        Ok(config)
    }
}

/// Splits on every `;` that is not escaped. Escapes are left in place.
fn split_settings(text: &str) -> Result<Vec<&str>, ConfigParseError> {
    let mut parts = vec![];
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ';' {
            parts.push(&text[start..i]);
            start = i + 1;
        }
    }
    if escaped {
        return Err(ConfigParseError::DanglingEscape);
    }
    parts.push(&text[start..]);
    Ok(parts)
}

fn unescape(raw: &str) -> Result<String, ConfigParseError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('e') => out.push('\x1B'),
            Some('s') => out.push(' '),
            Some(';') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(ConfigParseError::InvalidEscape(other)),
            None => return Err(ConfigParseError::DanglingEscape),
        }
    }
    Ok(out)
}

fn escape(value: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for c in value.chars() {
        match c {
            '\n' => f.write_str(r"\n")?,
            '\t' => f.write_str(r"\t")?,
            '\r' => f.write_str(r"\r")?,
            '\x1B' => f.write_str(r"\e")?,
            ' ' => f.write_str(r"\s")?,
            ';' => f.write_str(r"\;")?,
            '\\' => f.write_str(r"\\")?,
            c => write!(f, "{c}")?,
        }
    }
    Ok(())
}

fn parse_flag(value: &str) -> Result<bool, ConfigParseError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigParseError::InvalidFlag(value.to_string())),
    }
}

impl fmt::Display for PrintConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("end=")?;
        escape(&self.terminator, f)?;
        f.write_str(";sep=")?;
        escape(&self.separator, f)?;
        f.write_str(";pattern=")?;
        escape(&self.pattern, f)?;
        write!(f, ";flush={}", self.flush)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use test_case::test_case;

    use super::*;

    #[test]
    fn defaults() {
        let config = PrintConfig::default();
        assert_eq!(config.terminator(), "\n");
        assert_eq!(config.separator(), " ");
        assert_eq!(config.pattern(), "");
        assert!(!config.flush());
    }

    #[test]
    fn setters_chain() {
        let mut config = PrintConfig::new();
        config.set_terminator('.').set_separator("*").set_flush(true);
        assert_eq!(config.terminator(), ".");
        assert_eq!(config.separator(), "*");
        assert!(config.flush());
    }

    #[test]
    fn parses_every_setting() {
        let config: PrintConfig =
            r"end=\e[0m\n; sep=\;\s;pattern=|;flush=on".parse().unwrap();
        let mut expected = PrintConfig::new();
        expected
            .set_terminator("\x1B[0m\n")
            .set_separator("; ")
            .set_pattern("|")
            .set_flush(true);
        assert_eq!(config, expected);
    }

    #[test]
    fn empty_text_is_the_default() {
        assert_eq!("".parse::<PrintConfig>().unwrap(), PrintConfig::new());
        assert_eq!(" ; ;".parse::<PrintConfig>().unwrap(), PrintConfig::new());
    }

    #[test]
    fn display_parses_back() {
        let mut config = PrintConfig::new();
        config.set_terminator(";\\\t").set_separator(" ").set_pattern("\x1B");
        let text = config.to_string();
        assert_eq!(text, r"end=\;\\\t;sep=\s;pattern=\e;flush=false");
        assert_eq!(text.parse::<PrintConfig>().unwrap(), config);
    }

    #[test_case("colour=red", ConfigParseError::UnknownSetting("colour".into()) ; "unknown key")]
    #[test_case("sep", ConfigParseError::MissingValue("sep".into()) ; "missing value")]
    #[test_case("flush=maybe", ConfigParseError::InvalidFlag("maybe".into()) ; "bad flag")]
    #[test_case(r"sep=\x", ConfigParseError::InvalidEscape('x') ; "bad escape")]
    #[test_case("end=\\", ConfigParseError::DanglingEscape ; "dangling escape")]
    fn parse_errors(text: &str, expected: ConfigParseError) {
        assert_eq!(text.parse::<PrintConfig>().unwrap_err(), expected);
    }

    #[test]
    fn error_messages() {
        let err = "colour=red".parse::<PrintConfig>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unrecognized print setting 'colour': valid settings are: \
             end, sep, pattern, flush"
        );
    }

    #[serial]
    #[test]
    fn reads_the_environment() {
        let name = "PTC_PRINT_CONFIG_TEST";
        // SAFETY: tests touching the environment are serialized.
        unsafe { env::remove_var(name) };
        assert_eq!(PrintConfig::from_env(name).unwrap(), None);

        unsafe { env::set_var(name, "sep=*") };
        let config = PrintConfig::from_env(name).unwrap().unwrap();
        assert_eq!(config.separator(), "*");

        unsafe { env::set_var(name, "sep") };
        assert!(PrintConfig::from_env(name).is_err());
        unsafe { env::remove_var(name) };
    }
}
