//! Error types for configuration loading and validation.

/// Why a `weft.toml` could not be turned into a [`ProjectConfig`](crate::ProjectConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read weft.toml: {0}")]
    Io(#[from] std::io::Error),

    /// The content is not valid TOML or does not match the schema.
    #[error("invalid weft.toml: {0}")]
    Parse(String),

    /// A required key is absent or empty.
    #[error("weft.toml is missing `{0}`")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_the_key() {
        let err = ConfigError::MissingField("project.design");
        assert_eq!(err.to_string(), "weft.toml is missing `project.design`");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("cannot read weft.toml:"));
    }
}
