use std::sync::Arc;

use clap::Parser;
use log::{error, info};

mod args;
mod auth;
mod backend;
mod directory;
mod error;
mod password;
mod repository;
mod routes;
mod service;
mod store;
mod user;
mod validation;

use args::Args;
use backend::Backend;
use directory::Directory;
use password::Hasher;
use repository::Repository;
use service::UserService;
use store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let addr = args.addr()?;

    let store = Arc::new(Store::new());
    let backend = Backend::new(args.store());
    let hasher = Hasher::new();

    backend.load(&store, &args.seed(), &hasher).map_err(|e| {
        error!("couldn't load users from {:?}: {e}", backend.path());
        e
    })?;

    let service = UserService::new(Repository::new(Arc::clone(&store)), hasher);
    let dir = Arc::new(Directory::new(service));

    let (addr, server) = warp::serve(routes::routes(dir))
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())?;

    info!("listening on {addr}");
    server.await;

    backend.save(&store).map_err(|e| {
        error!("couldn't save users to {:?}: {e}", backend.path());
        e
    })?;

    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("couldn't listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("couldn't listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }

    info!("shutting down");
}
