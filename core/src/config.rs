use crate::error::{Result, SqlxFluentError};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

fn default_port() -> u16 {
    3306
}

/// 数据库连接配置
///
/// 设置了 `url` 时直接使用，否则由 host / port / database / username / password 拼出 `mysql://` URL。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: default_port(),
            database: None,
            username: None,
            password: None,
        }
    }
}

impl DbConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// 从环境变量读取：优先 `DATABASE_URL`，否则读取
    /// `DB_HOST` / `DB_PORT` / `DB_DATABASE` / `DB_USERNAME` / `DB_PASSWORD`
    pub fn from_env() -> Result<Self> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return Ok(Self::from_url(url));
        }
        let port = match std::env::var("DB_PORT") {
            Ok(port) => port.parse().map_err(|_| {
                SqlxFluentError::Configuration(format!("Invalid DB_PORT: {}", port))
            })?,
            Err(_) => default_port(),
        };
        let config = Self {
            url: None,
            host: std::env::var("DB_HOST").ok(),
            port,
            database: std::env::var("DB_DATABASE").ok(),
            username: std::env::var("DB_USERNAME").ok(),
            password: std::env::var("DB_PASSWORD").ok(),
        };
        config.to_url()?;
        Ok(config)
    }

    /// 生成连接 URL，用户名和密码会做百分号编码
    pub fn to_url(&self) -> Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        let host = self.host.as_deref().ok_or_else(|| {
            SqlxFluentError::Configuration("Missing database host".to_string())
        })?;
        let database = self.database.as_deref().ok_or_else(|| {
            SqlxFluentError::Configuration("Missing database name".to_string())
        })?;

        let credentials = match (&self.username, &self.password) {
            (Some(user), Some(password)) => format!(
                "{}:{}@",
                utf8_percent_encode(user, NON_ALPHANUMERIC),
                utf8_percent_encode(password, NON_ALPHANUMERIC)
            ),
            (Some(user), None) => format!("{}@", utf8_percent_encode(user, NON_ALPHANUMERIC)),
            _ => String::new(),
        };
        Ok(format!(
            "mysql://{}{}:{}/{}",
            credentials, host, self.port, database
        ))
    }
}
