use clap::{Subcommand, ValueEnum};
use taskweave_core::auth::{EnvOrKeyring, SecretOrigin};

use crate::context::CliResult;

#[derive(Clone, Copy, ValueEnum)]
pub enum Service {
    /// Google OAuth access token for Tasks and Calendar
    Google,
    /// Gemini API key
    Gemini,
}

impl Service {
    fn secret(self) -> EnvOrKeyring {
        match self {
            Service::Google => EnvOrKeyring::google(),
            Service::Gemini => EnvOrKeyring::gemini(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Service::Google => "google",
            Service::Gemini => "gemini",
        }
    }
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store a token in the OS keyring
    SetToken {
        /// Token or API key
        token: String,
        #[arg(long, value_enum, default_value = "google")]
        service: Service,
    },
    /// Show where each credential comes from
    Status,
    /// Remove a token from the OS keyring
    Clear {
        #[arg(long, value_enum, default_value = "google")]
        service: Service,
    },
}

pub fn run(action: AuthAction) -> CliResult {
    match action {
        AuthAction::SetToken { token, service } => {
            let token = token.trim();
            if token.is_empty() {
                return Err("token must not be empty".into());
            }
            service.secret().store(token)?;
            println!("{}: token stored in keyring", service.label());
        }
        AuthAction::Status => {
            for service in [Service::Google, Service::Gemini] {
                let status = match service.secret().lookup() {
                    Ok(Some((_, SecretOrigin::Environment))) => "configured (environment)".to_string(),
                    Ok(Some((_, SecretOrigin::Keyring))) => "configured (keyring)".to_string(),
                    Ok(None) => "not configured".to_string(),
                    Err(e) => format!("unavailable ({e})"),
                };
                println!("{}: {status}", service.label());
            }
        }
        AuthAction::Clear { service } => {
            service.secret().clear()?;
            println!("{}: token removed from keyring", service.label());
        }
    }
    Ok(())
}
