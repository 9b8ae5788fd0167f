use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::layout;

/// Nanoseconds since midnight.
///
/// Ordering compares the raw nanosecond count; the `HH:MM:SS.mmm` rendering
/// is for display only. Values past 24h are kept as-is and render with an
/// hour field above 23.
///
/// # Examples
/// ```
/// use itchcast_core::Timestamp;
///
/// let ts = Timestamp::from_nanos(3_723_456_000_000);
/// assert_eq!(ts.to_string(), "01:02:03.456");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    pub const fn is_within_day(self) -> bool {
        self.0 < layout::NANOS_PER_DAY
    }

    /// Split into hours, minutes, seconds and milliseconds.
    pub const fn clock(self) -> Clock {
        const NANOS_PER_MILLI: u64 = 1_000_000;
        const NANOS_PER_SECOND: u64 = 1_000_000_000;
        let total_seconds = self.0 / NANOS_PER_SECOND;
        Clock {
            hours: total_seconds / 3600,
            minutes: ((total_seconds % 3600) / 60) as u8,
            seconds: (total_seconds % 60) as u8,
            millis: ((self.0 % NANOS_PER_SECOND) / NANOS_PER_MILLI) as u16,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock = self.clock();
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            clock.hours, clock.minutes, clock.seconds, clock.millis
        )
    }
}

/// Display decomposition of a [`Timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
    pub millis: u16,
}

impl Clock {
    pub fn seconds_with_fraction(&self) -> f64 {
        f64::from(self.seconds) + f64::from(self.millis) / 1000.0
    }
}

/// Fixed-point price in 1/10,000 units of the quoted currency.
///
/// # Examples
/// ```
/// use itchcast_core::Price;
///
/// let price = Price::from_raw(1_500_000);
/// assert_eq!(price.to_string(), "150.0000");
/// assert_eq!(price.to_decimal().to_string(), "150.0000");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u32);

impl Price {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(i64::from(self.0), 4)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / f64::from(layout::PRICE_SCALE)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:04}",
            self.0 / layout::PRICE_SCALE,
            self.0 % layout::PRICE_SCALE
        )
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemEvent {
    pub timestamp: Timestamp,
    pub event_code: char,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockDirectory {
    pub timestamp: Timestamp,
    pub stock: String,
    pub market_category: char,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradingAction {
    pub timestamp: Timestamp,
    pub stock: String,
    pub trading_state: char,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddOrder {
    pub timestamp: Timestamp,
    pub order_ref: u64,
    pub side: char,
    pub shares: u32,
    pub stock: String,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddOrderMpid {
    #[serde(flatten)]
    pub order: AddOrder,
    pub mpid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderExecuted {
    pub timestamp: Timestamp,
    pub order_ref: u64,
    pub executed_shares: u32,
    pub match_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderExecutedWithPrice {
    #[serde(flatten)]
    pub execution: OrderExecuted,
    pub printable: char,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCancel {
    pub timestamp: Timestamp,
    pub order_ref: u64,
    pub cancelled_shares: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDelete {
    pub timestamp: Timestamp,
    pub order_ref: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReplace {
    pub timestamp: Timestamp,
    pub original_ref: u64,
    pub new_ref: u64,
    pub shares: u32,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trade {
    pub timestamp: Timestamp,
    pub order_ref: u64,
    pub side: char,
    pub shares: u32,
    pub stock: String,
    pub price: Price,
    pub match_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTrade {
    pub timestamp: Timestamp,
    pub shares: u64,
    pub stock: String,
    pub cross_price: Price,
    pub match_number: u64,
    pub cross_type: char,
}

/// One decoded feed record, discriminated by its one-byte type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ItchMessage {
    SystemEvent(SystemEvent),
    StockDirectory(StockDirectory),
    TradingAction(TradingAction),
    AddOrder(AddOrder),
    AddOrderMpid(AddOrderMpid),
    OrderExecuted(OrderExecuted),
    OrderExecutedWithPrice(OrderExecutedWithPrice),
    OrderCancel(OrderCancel),
    OrderDelete(OrderDelete),
    OrderReplace(OrderReplace),
    Trade(Trade),
    CrossTrade(CrossTrade),
    /// Tag without a decoding routine; kept for forward compatibility.
    Unknown { tag: u8, length: usize },
}

impl ItchMessage {
    pub fn tag(&self) -> u8 {
        match self {
            ItchMessage::SystemEvent(_) => layout::SYSTEM_EVENT,
            ItchMessage::StockDirectory(_) => layout::STOCK_DIRECTORY,
            ItchMessage::TradingAction(_) => layout::TRADING_ACTION,
            ItchMessage::AddOrder(_) => layout::ADD_ORDER,
            ItchMessage::AddOrderMpid(_) => layout::ADD_ORDER_MPID,
            ItchMessage::OrderExecuted(_) => layout::ORDER_EXECUTED,
            ItchMessage::OrderExecutedWithPrice(_) => layout::ORDER_EXECUTED_WITH_PRICE,
            ItchMessage::OrderCancel(_) => layout::ORDER_CANCEL,
            ItchMessage::OrderDelete(_) => layout::ORDER_DELETE,
            ItchMessage::OrderReplace(_) => layout::ORDER_REPLACE,
            ItchMessage::Trade(_) => layout::TRADE,
            ItchMessage::CrossTrade(_) => layout::CROSS_TRADE,
            ItchMessage::Unknown { tag, .. } => *tag,
        }
    }

    /// Event time, absent only for [`ItchMessage::Unknown`].
    pub fn timestamp(&self) -> Option<Timestamp> {
        let ts = match self {
            ItchMessage::SystemEvent(m) => m.timestamp,
            ItchMessage::StockDirectory(m) => m.timestamp,
            ItchMessage::TradingAction(m) => m.timestamp,
            ItchMessage::AddOrder(m) => m.timestamp,
            ItchMessage::AddOrderMpid(m) => m.order.timestamp,
            ItchMessage::OrderExecuted(m) => m.timestamp,
            ItchMessage::OrderExecutedWithPrice(m) => m.execution.timestamp,
            ItchMessage::OrderCancel(m) => m.timestamp,
            ItchMessage::OrderDelete(m) => m.timestamp,
            ItchMessage::OrderReplace(m) => m.timestamp,
            ItchMessage::Trade(m) => m.timestamp,
            ItchMessage::CrossTrade(m) => m.timestamp,
            ItchMessage::Unknown { .. } => return None,
        };
        Some(ts)
    }

    /// Stock symbol for the kinds that carry one.
    pub fn stock(&self) -> Option<&str> {
        match self {
            ItchMessage::StockDirectory(m) => Some(&m.stock),
            ItchMessage::TradingAction(m) => Some(&m.stock),
            ItchMessage::AddOrder(m) => Some(&m.stock),
            ItchMessage::AddOrderMpid(m) => Some(&m.order.stock),
            ItchMessage::Trade(m) => Some(&m.stock),
            ItchMessage::CrossTrade(m) => Some(&m.stock),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ItchMessage::Unknown { .. })
    }
}
