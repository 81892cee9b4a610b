use std::sync::Arc;

use thiserror::Error;

use crate::action_executor::{launch_ssh, LaunchError};
use crate::config::{validate, Config};
use crate::contract::{
    CoreRequest, CoreResponse, HostsResponse, MatchResponse, RunResponse, SuggestionDto,
};
use crate::matcher::MatchEngine;
use crate::model::{HostEntry, Suggestion};
use crate::ssh_config::HostConfigStore;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("launch error: {0}")]
    Launch(#[from] LaunchError),
}

pub struct CoreService {
    config: Config,
    engine: MatchEngine,
}

impl CoreService {
    pub fn new(config: Config) -> Result<Self, ServiceError> {
        Self::with_store(config, HostConfigStore::new())
    }

    pub fn with_store(config: Config, store: HostConfigStore) -> Result<Self, ServiceError> {
        validate(&config).map_err(ServiceError::Config)?;
        Ok(Self {
            config,
            engine: MatchEngine::new(Arc::new(store)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hosts(&self) -> Vec<HostEntry> {
        self.engine.store().hosts()
    }

    pub fn match_query(&self, query: &str) -> Vec<Suggestion> {
        self.engine.match_query(query)
    }

    pub fn run(&self, host: &str) -> Result<(), ServiceError> {
        launch_ssh(&self.config.terminal(), host)?;
        Ok(())
    }

    pub fn handle_command(&self, request: CoreRequest) -> Result<CoreResponse, ServiceError> {
        match request {
            CoreRequest::Match(request) => {
                let suggestions = self
                    .match_query(&request.query)
                    .into_iter()
                    .map(SuggestionDto::from)
                    .collect();
                Ok(CoreResponse::Match(MatchResponse { suggestions }))
            }
            CoreRequest::Run(request) => {
                if request.host.trim().is_empty() {
                    return Err(ServiceError::InvalidRequest(
                        "run request requires a host".to_string(),
                    ));
                }
                self.run(&request.host)?;
                Ok(CoreResponse::Run(RunResponse { launched: true }))
            }
            CoreRequest::Hosts => Ok(CoreResponse::Hosts(HostsResponse {
                hosts: self
                    .hosts()
                    .into_iter()
                    .map(|host| host.name().to_string())
                    .collect(),
            })),
        }
    }
}
