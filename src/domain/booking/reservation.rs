use std::ops::Range;

use chrono::NaiveDate;
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Id};

use super::{Price, RoomId};

/// 予約ID
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, From, Deref, Default,
)]
pub struct ReservationId(u64);

impl Id for ReservationId {
    type Inner = u64;
}

/// 宿泊予約エンティティ
///
/// 作成後は変更されない。検証はすべてホテル集約が行う。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    id: ReservationId,
    guest: String,
    room: RoomId,
    dates: Range<NaiveDate>,
    price: Price,
}

impl Reservation {
    pub(crate) fn new(
        id: ReservationId,
        guest: String,
        room: RoomId,
        dates: Range<NaiveDate>,
        price: Price,
    ) -> Self {
        Self {
            id,
            guest,
            room,
            dates,
            price,
        }
    }

    pub fn guest(&self) -> &str {
        &self.guest
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    /// 宿泊期間。終了日はチェックアウト日で、宿泊には含まれない
    pub fn dates(&self) -> &Range<NaiveDate> {
        &self.dates
    }

    /// 1泊あたりの料金
    pub fn price(&self) -> &Price {
        &self.price
    }

    pub fn nights(&self) -> i64 {
        (self.dates.end - self.dates.start).num_days()
    }

    pub fn total_price(&self) -> Price {
        self.price.times(self.nights())
    }
}

impl Entity for Reservation {
    type Id = ReservationId;

    const ENTITY_NAME: &'static str = "reservation";

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::super::Currency;
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nights_and_total_price() {
        let reservation = Reservation::new(
            ReservationId::from(1),
            "guest".to_owned(),
            RoomId::from(1),
            date(2018, 3, 11)..date(2018, 3, 14),
            Price::new(16_000, Currency::JPY),
        );
        assert_eq!(reservation.nights(), 3);
        assert_eq!(reservation.total_price(), Price::new(48_000, Currency::JPY));
    }
}
