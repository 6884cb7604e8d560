use crate::{
    cmd::connect,
    config::AppConfig,
    modules::{
        handlers::{
            auth, liveness, problem, profile, readiness, sync, topic, upsolve, user,
        },
        state::AppState,
    },
};
use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::HeaderValue, Method},
    routing, Router, Server,
};
use clap::Args;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let config = AppConfig::from_env()?;
    let pool = connect(&config.database).await?;
    let cors = cors_layer(config.frontend_origin.as_deref())?;
    let state = AppState::connect(config, pool)?;

    state.users.ping().await.with_context(|| {
        let message = "database is not available";
        tracing::error!(message);
        message
    })?;

    let app = create_router(Arc::new(state)).layer(cors);
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 8000");
            8000u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| {
            let message = format!("server at port {} stopped unexpectedly", port);
            tracing::error!(message);
            message
        })?;

    Ok(())
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    match origin {
        Some(origin) => {
            let origin: HeaderValue = origin.parse().with_context(|| {
                let message = format!("FRONTEND_ORIGIN_URL `{}` is not a valid origin", origin);
                tracing::error!(message);
                message
            })?;
            Ok(layer.allow_origin(AllowOrigin::exact(origin)))
        }
        None => {
            tracing::warn!("FRONTEND_ORIGIN_URL is not set. Requests from any origin will be allowed.");
            Ok(layer.allow_origin(Any))
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/register", routing::post(auth::register))
        .route("/api/auth/login", routing::post(auth::login))
        .route("/api/auth/user", routing::get(auth::get_user))
        .route(
            "/api/user/profile",
            routing::get(user::get_profile).put(user::update_profile),
        )
        .route("/api/profile/stats", routing::get(profile::get_stats))
        .route("/api/sync", routing::post(sync::sync))
        .route("/api/upsolve", routing::get(upsolve::list_upsolves))
        .route("/api/upsolve/:id", routing::delete(upsolve::delete_upsolve))
        .route("/api/problems", routing::get(problem::search_problem))
        .route("/api/topics", routing::get(topic::list_topics))
        .route("/api/topics/:slug", routing::get(topic::get_topic))
        .route("/api/liveness", routing::get(liveness))
        .route("/api/readiness", routing::get(readiness))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, starting graceful shutdown.");
}
