/// Display name and quote ticker of each tracked market index, in report order.
pub const INDEX_SYMBOLS: &[(&str, &str)] = &[
    ("S&P 500", "^GSPC"),
    ("Dow Jones", "^DJI"),
    ("Nasdaq", "^IXIC"),
    ("Russell 2000", "^RUT"),
];

/// Equities and ETFs whose latest headline goes into the report.
pub const NEWS_SYMBOLS: &[&str] = &["SPY", "QQQ", "NVDA", "TSLA", "AAPL", "MSFT"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSymbol {
    pub name: String,
    pub ticker: String,
}

impl IndexSymbol {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Exactly zero counts as down.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// Rising is red and falling is blue, following the Korean market convention.
    pub fn color(self) -> &'static str {
        match self {
            Direction::Up => "#d32f2f",
            Direction::Down => "#1565c0",
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSample {
    pub symbol_name: String,
    pub last_close: f64,
    pub prior_close: f64,
}

impl QuoteSample {
    /// Takes the last two closes of an oldest-first series. `None` when fewer than two exist
    /// or when the pair cannot yield a finite percent change.
    pub fn from_closes(symbol_name: &str, closes: &[f64]) -> Option<Self> {
        match closes {
            [.., prior_close, last_close]
                if prior_close.is_finite() && *prior_close != 0.0 && last_close.is_finite() =>
            {
                Some(Self {
                    symbol_name: symbol_name.to_string(),
                    last_close: *last_close,
                    prior_close: *prior_close,
                })
            }
            _ => None,
        }
    }

    pub fn percent_change(&self) -> f64 {
        (self.last_close - self.prior_close) / self.prior_close * 100.0
    }

    pub fn direction(&self) -> Direction {
        Direction::from_change(self.percent_change())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub symbol: String,
    pub title: String,
    /// Empty when the source gave no link.
    pub link: String,
}
