use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

/// Global configuration, loaded from `configuration/*.yaml` and `APP_*` env
/// vars. See `get_configuration`.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub mailing_list: MailingListSettings,
}

/// Server configuration
#[derive(Clone, Debug, Deserialize)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    /// Port 0 lets the OS pick one (tests)
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Credentials and location of the mailing-list provider (Mailchimp).
///
/// The three values that identify an account (`api_key`, `api_server`,
/// `audience_id`) are issued by the provider; they are usually supplied as
/// env vars in production:
///
/// ```sh
///     APP_MAILING_LIST__API_KEY=...
///     APP_MAILING_LIST__API_SERVER=us21
///     APP_MAILING_LIST__AUDIENCE_ID=...
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct MailingListSettings {
    /// `Secret` keeps the key out of `Debug` output (and therefore out of logs)
    pub api_key: Secret<String>,

    /// Regional shard embedded in the api hostname, e.g. `us21`
    pub api_server: String,

    /// Id of the list (audience) new members are added to
    pub audience_id: String,

    /// Overrides the provider origin; only really useful for pointing the
    /// client at a mock server
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl MailingListSettings {
    /// `https://{api_server}.api.mailchimp.com`, unless overridden by
    /// `base_url`
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.mailchimp.com", self.api_server),
        }
    }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!(
                "{e} is not a supported environment; use either `local` or `production`"
            )),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`:
/// `base.yaml` first, then `{APP_ENVIRONMENT}.yaml` (`local` if unset), then
/// env vars prefixed with `APP_`.
///
/// All fields (except `mailing_list.base_url`) must be present in one of these
/// sources, otherwise initialisation fails and the server does not start.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Foreign(Box::new(e)))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- strings; numeric fields need `serde-aux`
            //
            // `APP_MAILING_LIST__AUDIENCE_ID=abc` -> `Settings.mailing_list.audience_id`
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
