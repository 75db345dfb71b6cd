use serde::Deserialize;

//--------------------------------------------------------------------------------------------------
// Config to be read from file
//--------------------------------------------------------------------------------------------------

pub const DEFAULT_ADMIN_SERVER_PORT: u16 = 4000;
pub const DEFAULT_AUTH_SERVER_PORT: u16 = 3000;

#[derive(Deserialize)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    pub admin_server_port: Option<u16>,
    pub auth_server_port: Option<u16>,
    pub secret_key: String,
}

pub const ENV_PREFIX: &str = "REGAUTH";

// REGAUTH_SECRET_KEY, REGAUTH_AUTH_SERVER_PORT and so on
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name("config.local").required(false))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    pub fn admin_bind_addr(&self) -> String {
        format!(
            "0.0.0.0:{}",
            self.admin_server_port.unwrap_or(DEFAULT_ADMIN_SERVER_PORT)
        )
    }

    pub fn auth_bind_addr(&self) -> String {
        format!(
            "0.0.0.0:{}",
            self.auth_server_port.unwrap_or(DEFAULT_AUTH_SERVER_PORT)
        )
    }
}

// Keep the secret out of any accidental debug output
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("debug", &self.debug)
            .field("admin_server_port", &self.admin_server_port)
            .field("auth_server_port", &self.auth_server_port)
            .finish_non_exhaustive()
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
