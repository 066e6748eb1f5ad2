//! Serve command implementation.
//!
//! Runs the three pipelines in watch mode through the readiness coordinator
//! and hosts the client middleware until Ctrl+C or a fatal pipeline error.

use crate::cli::ServeArgs;
use crate::config::{CliOverrides, SsrDevConfig};
use crate::error::{CliError, Result};
use crate::host::{self, HostRoutes, HostState, SnapshotLog};
use crate::ui;
use ssr_dev::{setup_dev_server, ArtifactSnapshot};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::sync::oneshot;

/// How long open connections get to finish after shutdown is requested.
/// Event streams never end on their own.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Execute the serve command.
///
/// # Process Flow
///
/// 1. Load and validate configuration
/// 2. Start the template watcher and all three pipelines
/// 3. Bind the HTTP host (assets, hot updates, status)
/// 4. Report readiness once, then every renderer update
/// 5. Stop on Ctrl+C, or fail on the first fatal pipeline error
///
/// # Errors
///
/// Returns errors for invalid configuration, pipeline startup failures,
/// bind failures and fatal errors raised while watching.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let started = Instant::now();
    ui::info("Starting ssr-dev...");

    let config = SsrDevConfig::load(args.config.as_deref(), &CliOverrides::from(&args))?;
    config.validate()?;
    let cwd = config.working_dir()?;
    config.verify_paths(&cwd)?;
    ui::info(&format!("Working directory: {}", cwd.display()));

    let compilers = config.compilers(&cwd);
    let snapshots = Arc::new(SnapshotLog::new());

    let on_update = {
        let snapshots = Arc::clone(&snapshots);
        move |snapshot: ArtifactSnapshot| {
            let updates = snapshots.record(snapshot);
            // The first dispatch is reported by the ready task
            if updates > 1 {
                tracing::info!("Renderer updated ({} updates)", updates);
            }
        }
    };

    let dev = setup_dev_server(config.dev_server_options(&cwd, &compilers), on_update).await?;

    let state = Arc::new(HostState::from_dev_server(
        &dev,
        snapshots,
        &config.output_dir,
        Duration::from_millis(config.heartbeat_ms),
    ));
    let routes = HostRoutes {
        public_path: config.client.public_path.clone(),
        hmr_path: config.hmr_path.clone(),
    };

    let listener = host::bind(&config.host, config.port).await?;
    let url = format!("http://{}:{}", config.host, config.port);
    ui::info(&format!("Listening on {}, waiting for the first build...", url));

    let ready = dev.ready();
    tokio::spawn(async move {
        if ready.wait().await.is_ok() {
            ui::success(&format!(
                "Ready at {} in {}",
                url,
                ui::format_duration(started.elapsed())
            ));
        }
    });

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(host::serve(
        listener,
        host::build_router(&routes, state),
        async move {
            let _ = stop_rx.await;
        },
    ));

    ui::info("Press Ctrl+C to stop");

    let outcome = tokio::select! {
        result = signal::ctrl_c() => {
            result?;
            ui::info("Shutting down...");
            Ok(())
        }

        result = &mut server => match result {
            Ok(Ok(())) => Err(CliError::Server("Server stopped unexpectedly".to_string())),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(CliError::Server(format!("Server task failed: {}", e))),
        },

        result = dev.join() => match result {
            Ok(()) => {
                ui::warning("All pipelines stopped watching");
                Ok(())
            }
            Err(e) => {
                ui::error("Build pipelines stopped with a fatal error");
                Err(e.into())
            }
        },
    };

    if !server.is_finished() {
        let _ = stop_tx.send(());
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            server.abort();
        }
    }

    if outcome.is_ok() {
        ui::success("ssr-dev stopped");
    }
    outcome
}
