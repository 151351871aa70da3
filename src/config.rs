//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::auth::DEFAULT_TOKEN_TTL_HOURS;
use crate::generation::gemini::DEFAULT_MODEL;
use crate::protocol::DEFAULT_PORT;

/// Options for `quizgen serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// JSON snapshot file; data is kept in memory only when omitted
    #[arg(short, long, env = "QUIZGEN_DATA")]
    pub data: Option<PathBuf>,

    /// API key for the generation service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Model used for question generation
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,

    /// Secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Seconds to wait for one generation request before giving up
    #[arg(long, default_value_t = 120)]
    pub generation_timeout: u64,
}

/// Options for `quizgen connect`.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

/// Resolved server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_path: Option<PathBuf>,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub generation_timeout: Duration,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            addr: SocketAddr::new(args.bind, args.port),
            data_path: args.data,
            gemini_api_key: args.gemini_api_key,
            gemini_model: args.gemini_model,
            jwt_secret: args.jwt_secret,
            token_ttl: chrono::Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            generation_timeout: Duration::from_secs(args.generation_timeout),
        }
    }
}
