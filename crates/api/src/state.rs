use async_trait::async_trait;
use core_sim::{StockId, StockState};
use runtime::{NotifyError, PriceNotifier, PriceUpdate};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Price snapshot pushed to subscribers for one stock.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct StockQuote {
    pub id: StockId,
    pub symbol: String,
    pub title: String,
    pub price: Decimal,
    /// Price before the latest tick; `None` until the stock was saved once.
    pub previous_price: Option<Decimal>,
    pub state: StockState,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&PriceUpdate> for StockQuote {
    fn from(update: &PriceUpdate) -> Self {
        let stock = &update.stock;
        Self {
            id: stock.id,
            symbol: stock.symbol.clone(),
            title: stock.title.clone(),
            price: stock.price,
            previous_price: update.previous_price,
            state: stock.state,
            updated_at: stock.updated_at,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum StockEvent {
    Connected,
    PricesChanged { stocks: Vec<StockQuote> },
}

impl StockEvent {
    pub fn prices_changed(updates: &[PriceUpdate]) -> Self {
        Self::PricesChanged {
            stocks: updates.iter().map(StockQuote::from).collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    events_tx: broadcast::Sender<StockEvent>,
}

impl Default for AppState {
    fn default() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { events_tx }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StockEvent> {
        self.events_tx.subscribe()
    }

    /// Returns how many subscribers the event reached; zero when nobody listens.
    pub fn publish_event(&self, event: StockEvent) -> usize {
        self.events_tx.send(event).unwrap_or(0)
    }
}

#[async_trait]
impl PriceNotifier for AppState {
    async fn notify(&self, updates: &[PriceUpdate]) -> Result<(), NotifyError> {
        let reached = self.publish_event(StockEvent::prices_changed(updates));
        debug!(stocks = updates.len(), subscribers = reached, "published price update");
        Ok(())
    }
}
