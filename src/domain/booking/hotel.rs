use std::collections::HashSet;
use std::ops::Range;

use bio::data_structures::interval_tree::IntervalTree;
use chrono::NaiveDate;
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Aggregation, Entity, Event, EventQueue, EventQueueIntoIter, Id};

use super::{Block, BlockId, Currency, Price, Reservation, ReservationId, RoomId};

/// 客室数。客室番号は 1 から ROOM_COUNT まで
pub const ROOM_COUNT: u32 = 20;

/// ホテルID
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, From, Deref, Default,
)]
pub struct HotelId(u64);

impl Id for HotelId {
    type Inner = u64;
}

/// ホテルイベント
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HotelEvent {
    /// ホテルが開業した
    Created { id: HotelId },
    /// 予約が追加された
    ReservationAdded {
        id: HotelId,
        reservation: Reservation,
    },
    /// ブロックが追加された
    BlockAdded { id: HotelId, block: Block },
    /// ブロックから客室が引き当てられた
    BlockRoomDrawn {
        id: HotelId,
        block_id: BlockId,
        reservation: Reservation,
    },
}

impl Event for HotelEvent {
    type Id = HotelId;
}

/// ホテル集約
///
/// 客室・予約・ブロックの台帳を所有する。予約とブロックは追記される
/// だけで、削除されることはない。
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Hotel {
    id: HotelId,
    rooms: Vec<RoomId>,
    reservations: Vec<Reservation>,
    blocks: Vec<Block>,
    #[serde(skip)]
    events: EventQueue<HotelEvent>,
}

impl Hotel {
    /// 1泊あたりの標準料金
    pub const STANDARD_RATE: Price = Price::new(20_000, Currency::USD);

    pub fn create(id: HotelId) -> Self {
        let mut entity = Hotel::default();
        entity.apply(HotelEvent::Created { id });
        entity
    }

    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    pub fn all_reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn all_blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn reservation(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id() == id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    /// 標準料金で客室を予約する
    ///
    /// 同じ客室の既存予約と期間が重なる場合は `RoomUnavailable`。
    /// チェックアウト日は宿泊に含まれないため、前の予約の終了日に
    /// 始まる予約は作成できる。
    pub fn create_reservation(
        &mut self,
        guest: String,
        room: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Reservation, HotelError> {
        let reservation = Reservation::new(
            self.next_reservation_id(),
            guest,
            room,
            check_in..check_out,
            Self::STANDARD_RATE,
        );
        let event = HotelEvent::ReservationAdded {
            id: self.id,
            reservation: reservation.clone(),
        };
        self.validate(&event)?;
        self.apply(event);
        tracing::debug!(room = %room, guest = %reservation.guest(), "reservation created");
        Ok(reservation)
    }

    /// 複数客室を固定料金で一括して押さえる
    ///
    /// 要求された客室のうち一つでも既存の予約またはブロックと期間が
    /// 重なる場合、ブロック全体が作成されない。
    pub fn create_block(
        &mut self,
        admin: String,
        rooms: Vec<RoomId>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        price_per_night: Price,
    ) -> Result<Block, HotelError> {
        // 重複した客室番号は意味を持たないので、初出順を保って落とす
        let mut wanted: Vec<RoomId> = Vec::with_capacity(rooms.len());
        for room in rooms {
            if !wanted.contains(&room) {
                wanted.push(room);
            }
        }
        let block = Block::new(
            self.next_block_id(),
            admin,
            wanted,
            check_in..check_out,
            price_per_night,
        );
        let event = HotelEvent::BlockAdded {
            id: self.id,
            block: block.clone(),
        };
        self.validate(&event)?;
        self.apply(event);
        tracing::debug!(block = %block.id(), rooms = block.rooms().len(), "block created");
        Ok(block)
    }

    /// ブロックの客室を並び順に一つ引き当てて予約に変える
    ///
    /// 空室の再検査はしない。ブロック作成時に全客室が期間ごと確保
    /// されており、残り容量も空室照会から除外され続けるため。
    pub fn reserve_block_room(&mut self, block_id: BlockId) -> Result<Reservation, HotelError> {
        let block = self
            .block(block_id)
            .ok_or(HotelError::UnknownBlock { block: block_id })?;
        let room = block
            .next_room()
            .ok_or(HotelError::BlockExhausted { block: block_id })?;
        let reservation = Reservation::new(
            self.next_reservation_id(),
            block.admin().to_owned(),
            room,
            block.dates().clone(),
            *block.price(),
        );
        let event = HotelEvent::BlockRoomDrawn {
            id: self.id,
            block_id,
            reservation: reservation.clone(),
        };
        self.validate(&event)?;
        self.apply(event);
        tracing::debug!(block = %block_id, room = %room, "block room drawn");
        Ok(reservation)
    }

    /// 指定日に滞在中の予約を台帳順に返す。チェックアウト日は含まない
    pub fn get_reservations_for_date(&self, date: NaiveDate) -> Vec<&Reservation> {
        self.reservations
            .iter()
            .filter(|r| r.dates().contains(&date))
            .collect()
    }

    /// 期間中に予約もブロックも重ならない客室番号を昇順で返す
    ///
    /// ブロックは引き当て状況にかかわらず、含まれる全客室を期間中
    /// ふさぐ。
    pub fn availability(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<RoomId>, HotelError> {
        let stay = check_in..check_out;
        Self::validate_stay(&stay)?;

        let mut occupied: HashSet<RoomId> = HashSet::new();
        let mut reserved = IntervalTree::new();
        for reservation in &self.reservations {
            reserved.insert(reservation.dates().clone(), reservation.room());
        }
        for entry in reserved.find(stay.clone()) {
            occupied.insert(*entry.data());
        }
        let mut blocked = IntervalTree::new();
        for block in &self.blocks {
            blocked.insert(block.dates().clone(), block.rooms());
        }
        for entry in blocked.find(stay.clone()) {
            occupied.extend(entry.data().iter().copied());
        }

        Ok(self
            .rooms
            .iter()
            .copied()
            .filter(|room| !occupied.contains(room))
            .collect())
    }

    fn next_reservation_id(&self) -> ReservationId {
        ReservationId::from(self.reservations.len() as u64 + 1)
    }

    fn next_block_id(&self) -> BlockId {
        BlockId::from(self.blocks.len() as u64 + 1)
    }

    fn validate_id(&self, id: &HotelId) -> Result<(), HotelError> {
        match self.id == *id {
            true => Ok(()),
            false => Err(HotelError::MismatchedId),
        }
    }

    fn validate_stay(stay: &Range<NaiveDate>) -> Result<(), HotelError> {
        match stay.start < stay.end {
            true => Ok(()),
            false => Err(HotelError::InvalidStay),
        }
    }

    fn validate_room_known(&self, room: RoomId) -> Result<(), HotelError> {
        match self.rooms.contains(&room) {
            true => Ok(()),
            false => Err(HotelError::UnknownRoom { room }),
        }
    }

    fn validate_room_free(&self, room: RoomId, stay: &Range<NaiveDate>) -> Result<(), HotelError> {
        let mut reserved = IntervalTree::new();
        for reservation in self.reservations.iter().filter(|r| r.room() == room) {
            reserved.insert(reservation.dates().clone(), reservation.id());
        }
        match reserved.find(stay.clone()).next() {
            Some(_) => Err(HotelError::RoomUnavailable { room }),
            None => Ok(()),
        }
    }

    fn validate_room_unblocked(
        &self,
        room: RoomId,
        stay: &Range<NaiveDate>,
    ) -> Result<(), HotelError> {
        let mut blocked = IntervalTree::new();
        for block in self.blocks.iter().filter(|b| b.contains(room)) {
            blocked.insert(block.dates().clone(), block.id());
        }
        match blocked.find(stay.clone()).next() {
            Some(_) => Err(HotelError::RoomUnavailable { room }),
            None => Ok(()),
        }
    }

    fn validate_reservation_added(&self, reservation: &Reservation) -> Result<(), HotelError> {
        Self::validate_stay(reservation.dates())?;
        self.validate_room_known(reservation.room())?;
        self.validate_room_free(reservation.room(), reservation.dates())
    }

    fn validate_block_added(&self, block: &Block) -> Result<(), HotelError> {
        Self::validate_stay(block.dates())?;
        if block.rooms().is_empty() {
            return Err(HotelError::EmptyBlock);
        }
        for &room in block.rooms() {
            self.validate_room_known(room)?;
            self.validate_room_free(room, block.dates())?;
            self.validate_room_unblocked(room, block.dates())?;
        }
        Ok(())
    }

    fn validate_block_drawn(&self, block_id: &BlockId) -> Result<(), HotelError> {
        match self.block(*block_id) {
            Some(block) if block.is_exhausted() => {
                Err(HotelError::BlockExhausted { block: *block_id })
            }
            Some(_) => Ok(()),
            None => Err(HotelError::UnknownBlock { block: *block_id }),
        }
    }
}

impl Entity for Hotel {
    type Id = HotelId;

    const ENTITY_NAME: &'static str = "hotel";

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Aggregation for Hotel {
    type Event = HotelEvent;
    type Error = HotelError;

    fn validate(&self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            HotelEvent::Created { .. } => Ok(()),
            HotelEvent::ReservationAdded { id, reservation } => {
                self.validate_id(id)?;
                self.validate_reservation_added(reservation)
            }
            HotelEvent::BlockAdded { id, block } => {
                self.validate_id(id)?;
                self.validate_block_added(block)
            }
            HotelEvent::BlockRoomDrawn { id, block_id, .. } => {
                self.validate_id(id)?;
                self.validate_block_drawn(block_id)
            }
        }
    }

    fn apply(&mut self, event: Self::Event) {
        if self.validate(&event).is_err() {
            return;
        }
        match event.clone() {
            HotelEvent::Created { id } => {
                self.id = id;
                self.rooms = (1..=ROOM_COUNT).map(RoomId::from).collect();
            }
            HotelEvent::ReservationAdded { reservation, .. } => {
                self.reservations.push(reservation);
            }
            HotelEvent::BlockAdded { block, .. } => {
                self.blocks.push(block);
            }
            HotelEvent::BlockRoomDrawn {
                block_id,
                reservation,
                ..
            } => {
                if let Some(block) = self.blocks.iter_mut().find(|b| b.id() == block_id) {
                    block.draw();
                }
                self.reservations.push(reservation);
            }
        }
        self.events.push(event);
    }

    fn events(&self) -> &EventQueue<Self::Event> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventQueue<Self::Event> {
        &mut self.events
    }
}

impl IntoIterator for Hotel {
    type Item = HotelEvent;
    type IntoIter = EventQueueIntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl PartialEq for Hotel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.rooms == other.rooms
            && self.reservations == other.reservations
            && self.blocks == other.blocks
    }
}

impl Eq for Hotel {}

/// ホテルエラー
#[derive(Debug, Error)]
pub enum HotelError {
    /// イベントの宛先がこのホテルではない
    #[error("Hotel ID does not match")]
    MismatchedId,
    /// チェックイン日がチェックアウト日以降
    #[error("Check-in date must fall before check-out date")]
    InvalidStay,
    /// 存在しない客室番号
    #[error("Room {room} does not exist in this hotel")]
    UnknownRoom { room: RoomId },
    /// 期間が既存の予約またはブロックと重なっている
    #[error("Room {room} is not available for the requested dates")]
    RoomUnavailable { room: RoomId },
    /// 客室のないブロックは作れない
    #[error("A block must contain at least one room")]
    EmptyBlock,
    /// このホテルのブロックではない
    #[error("Block {block} does not belong to this hotel")]
    UnknownBlock { block: BlockId },
    /// ブロックの客室がすべて引き当て済み
    #[error("No rooms remaining in block {block}")]
    BlockExhausted { block: BlockId },
}
