use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "ponder_dsl=info".into()))
        .init();

    if let Err(e) = ponder_dsl::run() {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}
