//! Two-player cooperative garden session server.
//!
//! Hosts rooms over WebSocket: two gardeners tend a shared garden, collect
//! resources, plant and nurture flowers until the session timer runs out.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin niwa-server
//! cargo run --bin niwa-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use niwa::{
    common::{logger::setup_logger, time::SystemClock},
    infrastructure::{RoomStore, WebSocketGateway},
    ui::{Server, state::AppState},
    usecase::{
        GameActions, LifecycleConfig, RoomLifecycle, SimulationConfig, SimulationScheduler,
    },
};

#[derive(Parser, Debug)]
#[command(name = "niwa-server")]
#[command(about = "Cooperative garden session server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to (the PORT environment variable
    /// takes precedence)
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(args.port);

    // Initialize dependencies in order:
    // 1. RoomStore
    // 2. BroadcastGateway
    // 3. Scheduler and UseCases
    // 4. AppState
    // 5. Server

    let store = Arc::new(RoomStore::new());
    let gateway = Arc::new(WebSocketGateway::new());

    let scheduler = Arc::new(SimulationScheduler::new(
        store.clone(),
        gateway.clone(),
        SimulationConfig::default(),
    ));
    let lifecycle = Arc::new(RoomLifecycle::new(
        store.clone(),
        gateway.clone(),
        scheduler.clone(),
        Arc::new(SystemClock),
        LifecycleConfig::default(),
    ));
    let actions = Arc::new(GameActions::new(store.clone(), gateway.clone()));

    // Periodic sweep for abandoned rooms
    tokio::spawn(lifecycle.clone().run_cleanup_sweep());

    let state = Arc::new(AppState {
        lifecycle,
        actions,
        gateway,
        store,
    });

    let server = Server::new(state);
    if let Err(e) = server.run(args.host, port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
