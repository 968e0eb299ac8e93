use std::ops::Range;

use chrono::NaiveDate;
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Id};

use super::{Price, RoomId};

/// ブロックID
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, From, Deref, Default,
)]
pub struct BlockId(u64);

impl Id for BlockId {
    type Inner = u64;
}

/// 団体向けブロックエンティティ
///
/// 管理者が一定期間・固定料金で押さえた客室のまとまり。個々の客室は
/// 後から予約として引き当てられる。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    admin: String,
    rooms: Vec<RoomId>,
    dates: Range<NaiveDate>,
    price: Price,
    drawn: usize,
}

impl Block {
    pub(crate) fn new(
        id: BlockId,
        admin: String,
        rooms: Vec<RoomId>,
        dates: Range<NaiveDate>,
        price: Price,
    ) -> Self {
        Self {
            id,
            admin,
            rooms,
            dates,
            price,
            drawn: 0,
        }
    }

    pub fn admin(&self) -> &str {
        &self.admin
    }

    /// ブロックに含まれる客室。引き当てはこの並び順で行われる
    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    pub fn dates(&self) -> &Range<NaiveDate> {
        &self.dates
    }

    /// 1泊あたりのブロック料金
    pub fn price(&self) -> &Price {
        &self.price
    }

    pub fn contains(&self, room: RoomId) -> bool {
        self.rooms.contains(&room)
    }

    /// 引き当て済みの客室数
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    pub fn remaining(&self) -> usize {
        self.rooms.len() - self.drawn
    }

    pub fn is_exhausted(&self) -> bool {
        self.drawn == self.rooms.len()
    }

    /// 次に引き当てられる客室
    pub fn next_room(&self) -> Option<RoomId> {
        self.rooms.get(self.drawn).copied()
    }

    // 引き当て経路は Hotel::reserve_block_room のみ。drawn <= rooms.len() を保つ。
    pub(crate) fn draw(&mut self) -> Option<RoomId> {
        let room = self.next_room()?;
        self.drawn += 1;
        Some(room)
    }
}

impl Entity for Block {
    type Id = BlockId;

    const ENTITY_NAME: &'static str = "block";

    fn id(&self) -> Self::Id {
        self.id
    }
}
