mod block;
mod hotel;
mod reservation;

use std::fmt;
use std::str::FromStr;

use derive_more::{Deref, Display, From};
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::DisplayFromStr;
use thiserror::Error;

use crate::domain::Id;

pub use self::block::*;
pub use self::hotel::*;
pub use self::reservation::*;

/// 客室番号
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    From,
    Deref,
    Default,
)]
pub struct RoomId(u32);

impl Id for RoomId {
    type Inner = u32;
}

/// 料金
#[serde_as]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    amount: i64,
    #[serde_as(as = "DisplayFromStr")]
    currency: Currency,
}

impl Price {
    pub const fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// 通貨の最小単位での金額
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn times(&self, count: i64) -> Price {
        Price::new(self.amount * count, self.currency)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10i64.pow(self.currency.minor_units());
        let whole = (self.amount / scale).to_formatted_string(&Locale::en);
        match self.currency.minor_units() {
            0 => write!(f, "{}{}", self.currency.symbol(), whole),
            units => write!(
                f,
                "{}{}.{:0width$}",
                self.currency.symbol(),
                whole,
                (self.amount % scale).unsigned_abs(),
                width = units as usize
            ),
        }
    }
}

/// 通貨
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Currency {
    JPY,
    USD,
    EUR,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::JPY => "¥",
            Currency::USD => "$",
            Currency::EUR => "€",
        }
    }

    fn minor_units(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            Currency::USD | Currency::EUR => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Currency::JPY => "JPY",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        };
        f.write_str(code)
    }
}

impl FromStr for Currency {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JPY" => Ok(Currency::JPY),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            _ => Err(ParseCurrencyError),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown currency code")]
pub struct ParseCurrencyError;
