//! Data directory, config and adapter wiring shared by the commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use taskweave_core::analysis::{DisabledAnalyzer, GeminiAnalyzer};
use taskweave_core::auth::{EnvOrKeyring, StaticToken};
use taskweave_core::storage::{data_dir, state_path_in};
use taskweave_core::{
    Analyzer, Config, CredentialSource, Engine, GoogleCalendarClient, GoogleTasksClient,
    HttpRuntime, StateStore,
};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub struct Context {
    data_dir: PathBuf,
}

impl Context {
    pub fn new(override_dir: Option<PathBuf>) -> CliResult<Self> {
        Ok(Self {
            data_dir: data_dir(override_dir.as_deref())?,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        Config::path_in(&self.data_dir)
    }

    pub fn state_path(&self) -> PathBuf {
        state_path_in(&self.data_dir)
    }

    pub fn load_config(&self) -> CliResult<Config> {
        Ok(Config::load_from(&self.config_path())?)
    }

    pub fn load_state(&self) -> StateStore {
        StateStore::load(self.state_path())
    }

    /// Engine wired to Google Tasks, Google Calendar and Gemini.
    ///
    /// Fails before any request when no Google token is available.
    pub fn engine(&self) -> CliResult<Engine> {
        let config = self.load_config()?;

        let token = EnvOrKeyring::google().access_token()?;
        let credentials: Arc<dyn CredentialSource> = Arc::new(StaticToken(token));

        let http = HttpRuntime::new(Duration::from_secs(config.http.timeout_secs))?;
        let tasks = GoogleTasksClient::new(Arc::clone(&http), Arc::clone(&credentials), &config.tasks);
        let calendar = GoogleCalendarClient::new(Arc::clone(&http), credentials, &config.calendar);
        let analyzer = analyzer_for(&config, http);

        Ok(Engine::new(
            config,
            Box::new(tasks),
            Box::new(calendar),
            analyzer,
            self.load_state(),
        ))
    }

    /// Analyzer alone, for commands that never touch Google.
    pub fn analyzer(&self, config: &Config) -> CliResult<Box<dyn Analyzer>> {
        let http = HttpRuntime::new(Duration::from_secs(config.http.timeout_secs))?;
        Ok(analyzer_for(config, http))
    }
}

fn analyzer_for(config: &Config, http: Arc<HttpRuntime>) -> Box<dyn Analyzer> {
    if !config.analysis.enabled {
        tracing::info!("analysis disabled in config; using default durations and no classification");
        return Box::new(DisabledAnalyzer);
    }
    match EnvOrKeyring::gemini().lookup() {
        Ok(Some((key, _))) => Box::new(GeminiAnalyzer::new(http, &config.analysis, key)),
        Ok(None) => {
            tracing::warn!("no Gemini API key found; analysis disabled for this run");
            Box::new(DisabledAnalyzer)
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not read Gemini API key; analysis disabled for this run");
            Box::new(DisabledAnalyzer)
        }
    }
}
