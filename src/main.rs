use std::{process, sync::Arc};

use knoxs::{
    application::{
        admin::AdminPanel, auth::AuthGate, contact::ContactService, error::AppError,
        sections::PublicSections,
    },
    cache::{CacheConfig, QueryCache},
    config,
    infra::{
        backend,
        error::InfraError,
        http::{self, AdminState, HttpState},
        telemetry,
    },
};
use tokio::{sync::watch, try_join};
use tracing::{Dispatch, Level, debug, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let backend = backend::connect(&settings.backend, &settings.auth)?;
    let cache = Arc::new(QueryCache::new(CacheConfig::from(&settings.cache)));

    let sections = PublicSections::new(
        Arc::clone(&backend.store),
        Arc::clone(&cache),
        settings.sections.fallback_to_defaults,
    );
    let http_state = HttpState {
        sections: sections.clone(),
        contact: ContactService::new(Arc::clone(&backend.store), Arc::clone(&cache)),
    };
    let admin_state = AdminState {
        gate: AuthGate::new(Arc::clone(&backend.auth)),
        panel: AdminPanel::new(backend.store, cache),
    };

    warm_sections(sections);
    serve_http(&settings, http_state, admin_state).await
}

/// Prime the public sections so the first visitor is served from cache.
fn warm_sections(sections: PublicSections) {
    tokio::spawn(async move {
        let result = try_join!(
            sections.portfolio.load(),
            sections.gallery.load(),
            sections.experience.load(),
        );
        match result {
            Ok(_) => debug!("public sections warmed"),
            Err(err) => warn!(error = %err, "section warmup failed; readers will retry on demand"),
        }
    });
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_router(http_state);
    let admin_router = http::build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "listening"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()))
        .into_future();
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .into_future();

    let servers = async { try_join!(public_server, admin_server) };
    tokio::pin!(servers);

    tokio::select! {
        result = &mut servers => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => info!("shutdown requested; draining in-flight requests"),
            Err(err) => {
                warn!(error = %err, "cannot listen for Ctrl-C; serving until the listeners stop");
                (&mut servers)
                    .await
                    .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
                return Ok(());
            }
        },
    }

    let _ = shutdown_tx.send(true);
    match tokio::time::timeout(settings.server.graceful_shutdown, servers).await {
        Ok(result) => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
            info!("listeners stopped");
        }
        Err(_) => warn!(
            grace_secs = settings.server.graceful_shutdown.as_secs(),
            "graceful shutdown timed out; dropping open connections"
        ),
    }

    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
