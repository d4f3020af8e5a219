use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use core_sim::{Stock, StockId};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// Prices remembered per stock for previous-price lookups.
pub const PRICE_HISTORY_DEPTH: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("stock store unavailable: {0}")]
    Unavailable(String),
    #[error("stock {0} is not tracked by the store")]
    UnknownStock(StockId),
}

/// Persistence the scheduler reads from and writes to.
#[async_trait]
pub trait StockStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Stock>, StoreError>;

    /// Persists the whole batch or nothing.
    async fn save_all(&self, stocks: &[Stock]) -> Result<(), StoreError>;

    /// Price the stock had before its most recent save, if it was ever saved.
    async fn previous_price(&self, id: StockId) -> Result<Option<Decimal>, StoreError>;
}

#[async_trait]
impl<T: StockStore + ?Sized> StockStore for Arc<T> {
    async fn fetch_all(&self) -> Result<Vec<Stock>, StoreError> {
        (**self).fetch_all().await
    }

    async fn save_all(&self, stocks: &[Stock]) -> Result<(), StoreError> {
        (**self).save_all(stocks).await
    }

    async fn previous_price(&self, id: StockId) -> Result<Option<Decimal>, StoreError> {
        (**self).previous_price(id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    pub price: Decimal,
    pub recorded_at: OffsetDateTime,
}

#[derive(Debug, Default)]
struct StoreInner {
    stocks: BTreeMap<StockId, Stock>,
    history: HashMap<StockId, VecDeque<PricePoint>>,
}

/// Stock store kept in process memory; clones share the same data.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStockStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, stock: Stock) {
        self.inner.write().await.stocks.insert(stock.id, stock);
    }

    pub async fn insert_all(&self, stocks: impl IntoIterator<Item = Stock>) {
        let mut inner = self.inner.write().await;
        for stock in stocks {
            inner.stocks.insert(stock.id, stock);
        }
    }

    pub async fn get(&self, id: StockId) -> Option<Stock> {
        self.inner.read().await.stocks.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.stocks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Superseded prices of `id`, oldest first.
    pub async fn history(&self, id: StockId) -> Vec<PricePoint> {
        self.inner
            .read()
            .await
            .history
            .get(&id)
            .map(|points| points.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn fetch_all(&self) -> Result<Vec<Stock>, StoreError> {
        Ok(self.inner.read().await.stocks.values().cloned().collect())
    }

    async fn save_all(&self, stocks: &[Stock]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(unknown) = stocks
            .iter()
            .find(|stock| !inner.stocks.contains_key(&stock.id))
        {
            return Err(StoreError::UnknownStock(unknown.id));
        }

        let StoreInner { stocks: current, history } = &mut *inner;
        for stock in stocks {
            if let Some(previous) = current.insert(stock.id, stock.clone()) {
                let points = history.entry(stock.id).or_default();
                if points.len() == PRICE_HISTORY_DEPTH {
                    points.pop_front();
                }
                points.push_back(PricePoint {
                    price: previous.price,
                    recorded_at: previous.updated_at,
                });
            }
        }

        Ok(())
    }

    async fn previous_price(&self, id: StockId) -> Result<Option<Decimal>, StoreError> {
        let inner = self.inner.read().await;
        if !inner.stocks.contains_key(&id) {
            return Err(StoreError::UnknownStock(id));
        }

        Ok(inner
            .history
            .get(&id)
            .and_then(|points| points.back())
            .map(|point| point.price))
    }
}
