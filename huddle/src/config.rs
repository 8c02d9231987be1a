use zeroize::Zeroizing;

use crate::error::Error;

pub const APP_ID_VAR: &str = "HUDDLE_APP_ID";
pub const APP_TOKEN_VAR: &str = "HUDDLE_APP_TOKEN";
pub const CHANNEL_NAME_VAR: &str = "HUDDLE_CHANNEL_NAME";

/// Identifies the application, credential and channel used for every call.
/// Fixed for the life of the process.
#[derive(Clone)]
pub struct Config {
    app_id: String,
    app_token: Option<Zeroizing<String>>,
    channel_name: String,
}

impl Config {
    pub fn new(
        app_id: impl Into<String>,
        app_token: Option<String>,
        channel_name: impl Into<String>,
    ) -> Result<Self, Error> {
        let app_id = non_empty(APP_ID_VAR, app_id.into())?;
        let channel_name = non_empty(CHANNEL_NAME_VAR, channel_name.into())?;
        let app_token = app_token
            .filter(|token| !token.is_empty())
            .map(Zeroizing::new);
        Ok(Self {
            app_id,
            app_token,
            channel_name,
        })
    }

    /// Loads from `HUDDLE_APP_ID`, `HUDDLE_APP_TOKEN` and `HUDDLE_CHANNEL_NAME`
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_id = lookup(APP_ID_VAR).ok_or_else(|| Error::MissingConfig(APP_ID_VAR.into()))?;
        let channel_name = lookup(CHANNEL_NAME_VAR)
            .ok_or_else(|| Error::MissingConfig(CHANNEL_NAME_VAR.into()))?;
        Self::new(app_id, lookup(APP_TOKEN_VAR), channel_name)
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_token(&self) -> Option<&str> {
        self.app_token.as_ref().map(|token| token.as_str())
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("app_token", &self.app_token.as_ref().map(|_| "<redacted>"))
            .field("channel_name", &self.channel_name)
            .finish()
    }
}

fn non_empty(key: &str, value: String) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(Error::InvalidConfig {
            key: key.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn loads_all_values() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup(&[
            (APP_ID_VAR, "app"),
            (APP_TOKEN_VAR, "secret"),
            (CHANNEL_NAME_VAR, "lobby"),
        ]))?;
        assert_eq!(config.app_id(), "app");
        assert_eq!(config.app_token(), Some("secret"));
        assert_eq!(config.channel_name(), "lobby");
        Ok(())
    }

    #[test]
    fn token_is_optional() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup(&[
            (APP_ID_VAR, "app"),
            (APP_TOKEN_VAR, ""),
            (CHANNEL_NAME_VAR, "lobby"),
        ]))?;
        assert_eq!(config.app_token(), None);
        Ok(())
    }

    #[test]
    fn missing_app_id() {
        let result = Config::from_lookup(lookup(&[(CHANNEL_NAME_VAR, "lobby")]));
        assert!(matches!(result, Err(Error::MissingConfig(key)) if key == APP_ID_VAR));
    }

    #[test]
    fn empty_channel_is_invalid() {
        let result = Config::new("app", None, "  ");
        assert!(matches!(result, Err(Error::InvalidConfig { key, .. }) if key == CHANNEL_NAME_VAR));
    }

    #[test]
    fn debug_redacts_token() -> anyhow::Result<()> {
        let config = Config::new("app", Some("secret".into()), "lobby")?;
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
        Ok(())
    }
}
