use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use url::Url;

use service::{spawn_service, Config, ProcessError};

/// Run the gateway and pipeline API in the foreground
#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Port to listen on
    #[arg(long, default_value_t = service::config::DEFAULT_PORT)]
    pub port: u16,

    /// SQLite database file for stored pipelines (in-memory if unset)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Public gateway URL used to build download links
    #[arg(long)]
    pub gateway_url: Option<Url>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value_t = tracing::Level::INFO)]
    pub log_level: tracing::Level,
}

impl Serve {
    pub fn config(&self) -> Config {
        Config {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], self.port)),
            sqlite_path: self.database.clone(),
            log_level: self.log_level,
            gateway_url: self.gateway_url.clone(),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ProcessError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        spawn_service(&self.config()).await?;
        Ok("service stopped".to_string())
    }
}
