use regex::Regex;
use crate::error::Struct2MsgError;

/// Decides, by resolved name, which definitions are written out.
#[derive(Debug, Clone, Default)]
pub enum EmissionFilter {
    #[default]
    All,
    /// Names containing the substring. An empty substring matches everything.
    Contains(String),
    Matches(Regex),
}

impl EmissionFilter {
    pub fn contains(substring: impl Into<String>) -> EmissionFilter {
        EmissionFilter::Contains(substring.into())
    }

    pub fn regex(pattern: &str) -> Result<EmissionFilter, Struct2MsgError> {
        Ok(EmissionFilter::Matches(Regex::new(pattern)?))
    }

    pub fn accepts(&self, name: &str) -> bool {
        match self {
            EmissionFilter::All => true,
            EmissionFilter::Contains(substring) => name.contains(substring.as_str()),
            EmissionFilter::Matches(regex) => regex.is_match(name),
        }
    }
}

/// Settings handed to the walker. There is no global state: every run
/// carries its own config.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub filter: EmissionFilter,
}

impl GeneratorConfig {
    pub fn with_filter(filter: EmissionFilter) -> GeneratorConfig {
        GeneratorConfig { filter }
    }
}
