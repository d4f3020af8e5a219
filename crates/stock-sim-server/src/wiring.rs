use api::AppState;
use axum::{routing::get, Router};
use core_sim::{SimulationEngine, Stock};
use runtime::{InMemoryStockStore, SimulationScheduler};
use tracing::info;

use crate::config::Config;
use crate::seed::{self, SeedError};

pub type StockScheduler = SimulationScheduler<InMemoryStockStore, AppState>;

pub fn build_app(state: AppState) -> Router {
    api::app(state).route("/health", get(healthcheck))
}

async fn healthcheck() -> &'static str {
    "ok"
}

pub fn build_engine(config: &Config) -> SimulationEngine {
    match config.rng_seed {
        Some(seed) => {
            info!(seed, "using deterministic random source");
            SimulationEngine::from_seed(seed, config.sim)
        }
        None => SimulationEngine::from_entropy(config.sim),
    }
}

pub fn initial_stocks(config: &Config) -> Result<Vec<Stock>, SeedError> {
    match &config.seed_path {
        Some(path) => {
            let stocks = seed::load_seed_file(path)?;
            info!(path = %path.display(), stocks = stocks.len(), "loaded seed stocks");
            Ok(stocks)
        }
        None => seed::default_stocks(),
    }
}

pub async fn build_store(config: &Config) -> Result<InMemoryStockStore, SeedError> {
    let store = InMemoryStockStore::new();
    store.insert_all(initial_stocks(config)?).await;
    Ok(store)
}

pub fn build_scheduler(config: &Config, store: InMemoryStockStore, state: AppState) -> StockScheduler {
    SimulationScheduler::new(store, state, build_engine(config), config.scheduler)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use api::{AppState, StockEvent};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use core_sim::SimConfig;
    use runtime::SchedulerConfig;
    use tower::ServiceExt;

    use crate::config::Config;

    fn test_config() -> Config {
        Config {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            scheduler: SchedulerConfig::default(),
            sim: SimConfig::default(),
            seed_path: None,
            rng_seed: Some(7),
        }
    }

    #[tokio::test]
    async fn server_healthcheck_responds_ok() {
        let app = super::build_app(AppState::new());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn default_store_is_seeded() {
        let store = super::build_store(&test_config()).await.unwrap();

        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn scheduler_tick_publishes_to_app_state() {
        let config = test_config();
        let state = AppState::new();
        let mut events = state.subscribe_events();
        let store = super::build_store(&config).await.unwrap();
        let mut scheduler = super::build_scheduler(&config, store, state);

        let outcome = scheduler.tick().await.unwrap();

        assert_eq!(outcome.updated, 4);
        assert!(outcome.notified);
        match events.recv().await.unwrap() {
            StockEvent::PricesChanged { stocks } => {
                assert_eq!(stocks.len(), 4);
                assert!(stocks.iter().all(|quote| quote.previous_price.is_some()));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn seeded_engines_replay_identical_paths() {
        let config = test_config();
        let mut first = super::build_engine(&config);
        let mut second = super::build_engine(&config);
        let mut left = crate::seed::default_stocks().unwrap().remove(0);
        let mut right = left.clone();

        for _ in 0..100 {
            first.step(&mut left);
            second.step(&mut right);
            assert_eq!(left.state, right.state);
            assert_eq!(left.price, right.price);
        }
    }
}
