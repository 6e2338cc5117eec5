//! `capgate config`: print the resolved configuration.

use anyhow::Result;
use capgate_config::Config;

/// Render `config` as TOML.
pub(crate) fn render(config: &Config) -> Result<String> {
    Ok(config.to_toml_string()?)
}

/// Print the resolved configuration.
pub(crate) fn show_config(config: &Config) -> Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_round_trips() {
        let mut config = Config::default();
        config.auth.audience = "https://api.example".to_string();
        config.auth.issuer = "https://clerk.example".to_string();

        let rendered = render(&config).unwrap();
        assert!(rendered.contains("audience = \"https://api.example\""));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
