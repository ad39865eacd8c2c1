use anyhow::{Context, Result};
use porssisahko::api::PorssisahkoClient;
use porssisahko::web::{AppState, serve};
use porssisahko::{APP_VERSION, Config, Supervisor};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    porssisahko::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;

    info!("Porssisahko price sensor {} starting up", APP_VERSION);

    let config = Arc::new(config);
    let client = PorssisahkoClient::new(&config.api).context("Failed to build API client")?;
    let supervisor = Supervisor::new(config.clone(), Arc::new(client))
        .context("Failed to load config entry")?;
    let handle = supervisor.handle();

    let web_task = if config.web.enabled {
        let state = AppState {
            handle: handle.clone(),
            config: config.clone(),
        };
        let host = config.web.host.clone();
        let port = config.web.port;
        Some(tokio::spawn(async move {
            if let Err(e) = serve(state, &host, port).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    let signal_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_handle.shutdown();
        }
    });

    let result = supervisor.run().await;
    if let Some(task) = web_task {
        task.abort();
    }

    match result {
        Ok(()) => {
            info!("Shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Supervisor failed with error: {}", e);
            Err(anyhow::anyhow!("Supervisor error: {}", e))
        }
    }
}
