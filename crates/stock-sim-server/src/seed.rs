use std::{fs, io, path::Path};

use core_sim::{Stock, StockError, StockState};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One entry of the seed file. `state` defaults to `stable`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStock {
    pub symbol: String,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub state: StockState,
}

impl NewStock {
    pub fn into_stock(self) -> Result<Stock, SeedError> {
        let NewStock {
            symbol,
            title,
            price,
            state,
        } = self;
        Stock::new(symbol.clone(), title, price, state)
            .map_err(|source| SeedError::InvalidStock { symbol, source })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] io::Error),
    #[error("seed file is not a valid stock list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("seed stock {symbol} is invalid: {source}")]
    InvalidStock {
        symbol: String,
        #[source]
        source: StockError,
    },
}

pub fn load_seed_file(path: &Path) -> Result<Vec<Stock>, SeedError> {
    let raw = fs::read_to_string(path)?;
    parse_seed(&raw)
}

pub fn parse_seed(raw: &str) -> Result<Vec<Stock>, SeedError> {
    let entries: Vec<NewStock> = serde_json::from_str(raw)?;
    entries.into_iter().map(NewStock::into_stock).collect()
}

/// Stocks used when no seed file is configured.
pub fn default_stocks() -> Result<Vec<Stock>, SeedError> {
    [
        ("ACME", "Acme Corporation", Decimal::new(10_000, 2)),
        ("GLBX", "Globex", Decimal::new(4_250, 2)),
        ("INIT", "Initech", Decimal::new(1_875, 2)),
        ("UMBR", "Umbrella Holdings", Decimal::new(23_010, 2)),
    ]
    .into_iter()
    .map(|(symbol, title, price)| {
        NewStock {
            symbol: symbol.to_owned(),
            title: title.to_owned(),
            price,
            state: StockState::Stable,
        }
        .into_stock()
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use core_sim::StockState;
    use rust_decimal_macros::dec;

    use super::{default_stocks, load_seed_file, parse_seed, SeedError};

    #[test]
    fn parses_string_and_numeric_prices_with_default_state() {
        let stocks = parse_seed(
            r#"[
                {"symbol": "AAA", "title": "Alpha", "price": "12.50", "state": "volatile"},
                {"symbol": "BBB", "title": "Beta", "price": 100}
            ]"#,
        )
        .unwrap();

        assert_eq!(stocks.len(), 2);
        assert_eq!(stocks[0].price, dec!(12.50));
        assert_eq!(stocks[0].initial_price(), dec!(12.50));
        assert_eq!(stocks[0].state, StockState::Volatile);
        assert_eq!(stocks[1].price, dec!(100));
        assert_eq!(stocks[1].state, StockState::Stable);
    }

    #[test]
    fn rejects_non_positive_price() {
        let err = parse_seed(r#"[{"symbol": "ZERO", "title": "Zero", "price": "0"}]"#).unwrap_err();

        assert!(matches!(err, SeedError::InvalidStock { ref symbol, .. } if symbol == "ZERO"));
    }

    #[test]
    fn rejects_unknown_state() {
        let err = parse_seed(
            r#"[{"symbol": "AAA", "title": "Alpha", "price": "1", "state": "sideways"}]"#,
        )
        .unwrap_err();

        assert!(matches!(err, SeedError::Json(_)));
    }

    #[test]
    fn load_seed_file_reads_from_disk() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let root = std::env::temp_dir().join(format!("stock-sim-seed-{unique}"));
        fs::create_dir_all(&root).unwrap();
        let path = root.join("stocks.json");
        fs::write(&path, r#"[{"symbol": "AAA", "title": "Alpha", "price": "3.5"}]"#).unwrap();

        let stocks = load_seed_file(&path).expect("seed file should load");
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[0].symbol, "AAA");

        fs::remove_dir_all(&root).expect("temp seed directory should be removable");
    }

    #[test]
    fn missing_seed_file_is_io_error() {
        let path = std::env::temp_dir().join("stock-sim-seed-does-not-exist.json");

        assert!(matches!(load_seed_file(&path), Err(SeedError::Io(_))));
    }

    #[test]
    fn default_stocks_are_distinct_and_positive() {
        let stocks = default_stocks().unwrap();

        assert_eq!(stocks.len(), 4);
        assert!(stocks.iter().all(|stock| stock.price > dec!(0)));
        for (index, stock) in stocks.iter().enumerate() {
            assert!(stocks[index + 1..].iter().all(|other| other.id != stock.id));
        }
    }
}
