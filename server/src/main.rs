use crate::cfg::Config;
use crate::state::{State, StateRef};
use anyhow::Result;
use regauth::{SharedSecret, Signer};
use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{info, Level};

//--------------------------------------------------------------------------------------------------

mod cfg;
mod handler_proxy;
mod handlers;
mod response;
mod routes;
mod state;

//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Load config, a missing secret_key stops us here
    let cfg = Config::load()?;

    // Initialize tracing
    let mut fmt_sub = tracing_subscriber::fmt();
    if cfg.debug {
        fmt_sub = fmt_sub.with_max_level(Level::DEBUG);
    } else {
        fmt_sub = fmt_sub.with_max_level(Level::INFO);
    }
    fmt_sub.init();

    // Key the signer once, it is the only state shared by both listeners
    let secret = SharedSecret::new(cfg.secret_key.as_bytes())?;
    let signer = Signer::new(&secret)?;
    let state: StateRef = Arc::new(State::new(signer));

    let admin_app = routes::admin_router(state.clone());
    let auth_app = routes::auth_router(state);

    // Run both APIs
    let admin_addr = cfg.admin_bind_addr();
    let auth_addr = cfg.auth_bind_addr();
    let admin_listener = tokio::net::TcpListener::bind(&admin_addr).await?;
    let auth_listener = tokio::net::TcpListener::bind(&auth_addr).await?;
    info!("Admin server listening on {}", admin_addr);
    info!("Auth server listening on {}", auth_addr);

    tokio::try_join!(
        axum::serve(admin_listener, admin_app).into_future(),
        axum::serve(auth_listener, auth_app).into_future(),
    )?;

    Ok(())
}

//--------------------------------------------------------------------------------------------------
