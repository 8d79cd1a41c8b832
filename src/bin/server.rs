use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chaum_pedersen_auth::proto::auth_server::AuthServer;
use chaum_pedersen_auth::verifier::{AuthServiceImpl, ServerConfig};
use chaum_pedersen_auth::{GroupPreset, VerifierEngine};
use clap::Parser;
use tokio::{signal, time};
use tonic::transport::Server;
use tonic_health::server::{health_reporter, HealthReporter};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line flags. Anything set here overrides the file and `ZKP_`
/// environment layers of [`ServerConfig`].
#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Chaum-Pedersen interactive authentication server", long_about = None)]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Named group parameter set (toy, demo256, rfc5114)
    #[arg(long)]
    preset: Option<GroupPreset>,

    /// Explicit modulus p (requires q, g and h)
    #[arg(long, requires_all = ["q", "g", "h"])]
    p: Option<String>,

    /// Explicit subgroup order q
    #[arg(long, requires = "p")]
    q: Option<String>,

    /// Explicit first generator g
    #[arg(long, requires = "p")]
    g: Option<String>,

    /// Explicit second generator h
    #[arg(long, requires = "p")]
    h: Option<String>,

    /// Maximum outstanding challenges per user
    #[arg(long)]
    max_challenges: Option<usize>,

    /// Enable metrics endpoint
    #[arg(long)]
    metrics: bool,

    /// Metrics port
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(preset) = self.preset {
            config.group.preset = preset;
        }
        if self.p.is_some() {
            config.group.p = self.p;
            config.group.q = self.q;
            config.group.g = self.g;
            config.group.h = self.h;
        }
        if let Some(max) = self.max_challenges {
            config.policy.max_challenges_per_user = max;
        }
        if self.metrics {
            config.metrics.enabled = true;
        }
        if let Some(port) = self.metrics_port {
            config.metrics.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ServerConfig::from_env().inspect_err(|e| {
        error!("Failed to load configuration: {e}");
    })?;
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {e}");
        return Err(format!("Invalid configuration: {e}").into());
    }

    let params = config.group.build().inspect_err(|e| {
        error!("Invalid group parameters: {e}");
    })?;
    info!(
        group = %config.group.describe(),
        p_bits = params.p().bits(),
        q_bits = params.q().bits(),
        "group parameters validated"
    );

    let engine = VerifierEngine::with_policy(Arc::new(params), config.policy.verifier_policy());
    let service = AuthServiceImpl::new(engine.clone());

    if config.policy.expires() {
        spawn_cleanup(engine.clone(), config.policy.cleanup_interval());
    }

    if config.metrics.enabled {
        let metrics_addr = config.metrics.addr()?;
        match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()
        {
            Ok(()) => info!("Metrics server started on {metrics_addr}"),
            Err(e) => error!("Failed to start metrics server: {e}"),
        }
    }

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<AuthServer<AuthServiceImpl>>()
        .await;

    let addr: SocketAddr = config.addr()?;
    info!(
        %addr,
        max_challenges_per_user = config.policy.max_challenges_per_user,
        challenge_ttl_secs = ?config.policy.challenge_ttl_secs,
        session_ttl_secs = ?config.policy.session_ttl_secs,
        metrics = config.metrics.enabled,
        "Server starting"
    );

    Server::builder()
        .add_service(health_service)
        .add_service(AuthServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal(health_reporter))
        .await?;

    let users = engine.state().user_count().await;
    let sessions = engine.sessions().len().await;
    info!(users, sessions, "Server shutdown complete");
    Ok(())
}

/// Periodically sweeps expired challenges and sessions, restarting the sweep
/// if it ever dies.
fn spawn_cleanup(engine: VerifierEngine, every: Duration) {
    tokio::spawn(async move {
        loop {
            let sweeper = engine.clone();
            let handle = tokio::spawn(async move {
                let mut interval = time::interval(every);
                loop {
                    interval.tick().await;
                    sweeper.cleanup_expired().await;
                }
            });

            match handle.await {
                Ok(()) => error!("Cleanup task terminated unexpectedly, restarting..."),
                Err(e) => error!("Cleanup task panicked: {e:?}, restarting..."),
            }

            time::sleep(Duration::from_secs(5)).await;
        }
    });
}

async fn shutdown_signal(mut health_reporter: HealthReporter) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    health_reporter
        .set_not_serving::<AuthServer<AuthServiceImpl>>()
        .await;

    info!("Initiating graceful shutdown (allowing in-flight requests to complete)");
}
