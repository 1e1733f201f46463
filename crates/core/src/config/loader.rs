use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "RDFIN_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Unprefixed variable names understood for compatibility with older
/// deployments, and the keys they set.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("REALDEBRID_TOKEN", "debrid.api_token"),
    ("MEDIA_ROOT", "library.media_root"),
    ("LOG_ROOT", "library.log_root"),
];

fn with_env(figment: Figment) -> Figment {
    let legacy = Env::raw()
        .only(&["REALDEBRID_TOKEN", "MEDIA_ROOT", "LOG_ROOT"])
        .map(|key| {
            LEGACY_ENV
                .iter()
                .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                .map(|(_, target)| (*target).into())
                .unwrap_or_else(|| key.as_str().to_string().into())
        });

    figment
        .merge(Env::prefixed("RDFIN_").ignore(&["CONFIG"]).split("__"))
        .merge(legacy)
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    with_env(Figment::new().merge(Toml::file(path)))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration for the binary.
///
/// Reads the file named by `RDFIN_CONFIG` (default `config.toml`) when it
/// exists, then applies environment overrides. Without a file, defaults plus
/// environment make a complete configuration.
pub fn load_config_from_env() -> Result<(Config, Option<PathBuf>), ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    if path.exists() {
        return load_config(&path).map(|config| (config, Some(path)));
    }
    if std::env::var_os(CONFIG_PATH_ENV).is_some() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config = with_env(Figment::new())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;
    Ok((config, None))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[debrid]
api_token = "abc"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.debrid.api_token, "abc");
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[server]
port = "eighty"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3000

[library]
media_root = "/srv/media"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.library.media_root, PathBuf::from("/srv/media"));
    }

    #[test]
    fn test_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "rdfin.toml",
                r#"
[server]
port = 3000

[library]
media_root = "/from/file"
"#,
            )?;
            jail.set_env("RDFIN_SERVER__PORT", "4000");
            jail.set_env("RDFIN_DEBRID__API_TOKEN", "prefixed-token");
            jail.set_env("MEDIA_ROOT", "/from/env");

            let config = load_config(Path::new("rdfin.toml")).unwrap();
            assert_eq!(config.server.port, 4000);
            assert_eq!(config.debrid.api_token, "prefixed-token");
            assert_eq!(config.library.media_root, PathBuf::from("/from/env"));
            Ok(())
        });
    }

    #[test]
    fn test_legacy_token_wins() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("rdfin.toml", "")?;
            jail.set_env("RDFIN_DEBRID__API_TOKEN", "prefixed-token");
            jail.set_env("REALDEBRID_TOKEN", "legacy-token");

            let config = load_config(Path::new("rdfin.toml")).unwrap();
            assert_eq!(config.debrid.api_token, "legacy-token");
            Ok(())
        });
    }
}
