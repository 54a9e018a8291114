use std::sync::Arc;

use crate::config::Config;
use crate::error::ClientError;
use crate::utils::{http::ApiClient, report::InfoLine};

/// Everything a page session needs: configuration, the API client and the
/// status line the client reports into.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub info: InfoLine,
    pub config: Config,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let info = InfoLine::new();
        let api = ApiClient::from_config(&config, Arc::new(info.clone()))?;
        Ok(Self { api, info, config })
    }
}
