use crate::data::loader::DataSource;

/// Where the dashboard reads its data unless told otherwise.
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/your-repo/sample_data.csv";

/// Startup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub source: DataSource,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: DataSource::parse(DEFAULT_SOURCE),
        }
    }
}

impl DashboardConfig {
    /// The first positional argument, if any, overrides the data source.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        match args.into_iter().find(|a| !a.trim().is_empty()) {
            Some(arg) => Self {
                source: DataSource::parse(&arg),
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn no_arguments_uses_default_url() {
        let config = DashboardConfig::from_args(Vec::new());
        assert_eq!(config.source, DataSource::Url(DEFAULT_SOURCE.to_string()));
    }

    #[test]
    fn first_argument_overrides_source() {
        let config = DashboardConfig::from_args(vec!["data/cases.parquet".to_string()]);
        assert_eq!(
            config.source,
            DataSource::File(PathBuf::from("data/cases.parquet"))
        );
    }
}
