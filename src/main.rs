use colored::Colorize;
use jamroom_server::{run_server, ConfigError, RunError, ServerConfig};
use log::{error, info};
use thiserror::Error;
use tokio::runtime::{self, Runtime};

mod logging;

pub struct Jamroom {
    config: ServerConfig,
    runtime: Runtime,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Server(#[from] RunError),

    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Jamroom {
    fn new() -> Result<Self, StartupError> {
        info!("Reading configuration...");
        let config = ServerConfig::from_env()?;

        info!("Building async runtime...");
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("jamroom-async")
            .build()
            .map_err(|e| StartupError::Fatal(e.to_string()))?;

        Ok(Self { config, runtime })
    }

    fn run(self) -> Result<(), StartupError> {
        self.runtime.block_on(run_server(self.config))?;

        Ok(())
    }
}

impl StartupError {
    fn hint(&self) -> String {
        match self {
            StartupError::Config(_) => "Check the JAMROOM_* environment variables and try again.".to_string(),
            StartupError::Server(RunError::Bind { .. }) => "Another process may be using the port. Set JAMROOM_PORT to a free port and try again.".to_string(),
            StartupError::Server(RunError::Library(_)) => "Make sure JAMROOM_MUSIC_DIR points to a directory the server can read and write.".to_string(),
            StartupError::Server(RunError::Serve(_)) => "The server stopped while running. Restarting it usually helps.".to_string(),
            StartupError::Fatal(_) => "This error is fatal, and should not happen.".to_string(),
        }
    }
}

fn main() {
    logging::init_logger();

    let result = Jamroom::new().and_then(|jamroom| {
        info!("Initialized successfully.");
        jamroom.run()
    });

    if let Err(error) = result {
        error!("{} Read the error below to troubleshoot the issue. If you think this might be a bug, please report it by making a GitHub issue.", "jamroom failed to start!".bold().red());
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).bright_black().italic());
    }
}
