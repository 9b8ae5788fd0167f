use std::fmt::{self, Write as _};

use super::message::ItchMessage;

/// One-line human description of a decoded message.
///
/// # Examples
/// ```
/// use itchcast_core::{ItchMessage, summary};
///
/// let line = summary(&ItchMessage::Unknown { tag: b'Z', length: 12 });
/// assert_eq!(line, "Unknown message type: Z (length: 12)");
/// ```
pub fn summary(message: &ItchMessage) -> String {
    message.to_string()
}

impl fmt::Display for ItchMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItchMessage::SystemEvent(m) => write!(
                f,
                "System Event - Time: {}, Event: {}",
                m.timestamp,
                Code(m.event_code)
            ),
            ItchMessage::StockDirectory(m) => write!(
                f,
                "Stock Directory - Time: {}, Stock: {}, Category: {}",
                m.timestamp,
                Text(&m.stock),
                Code(m.market_category)
            ),
            ItchMessage::TradingAction(m) => write!(
                f,
                "Trading Action - Time: {}, Stock: {}, State: {}",
                m.timestamp,
                Text(&m.stock),
                Code(m.trading_state)
            ),
            ItchMessage::AddOrder(m) => write!(
                f,
                "Add Order - Time: {}, Stock: {}, Side: {}, Shares: {}, Price: ${}",
                m.timestamp,
                Text(&m.stock),
                Code(m.side),
                m.shares,
                m.price
            ),
            ItchMessage::AddOrderMpid(m) => write!(
                f,
                "Add Order (MPID) - Time: {}, Stock: {}, Side: {}, Shares: {}, Price: ${}, MPID: {}",
                m.order.timestamp,
                Text(&m.order.stock),
                Code(m.order.side),
                m.order.shares,
                m.order.price,
                Text(&m.mpid)
            ),
            ItchMessage::OrderExecuted(m) => write!(
                f,
                "Order Executed - Time: {}, Order: {}, Shares: {}, Match: {}",
                m.timestamp, m.order_ref, m.executed_shares, m.match_number
            ),
            ItchMessage::OrderExecutedWithPrice(m) => write!(
                f,
                "Order Executed w/Price - Time: {}, Order: {}, Shares: {}, Price: ${}",
                m.execution.timestamp, m.execution.order_ref, m.execution.executed_shares, m.price
            ),
            ItchMessage::OrderCancel(m) => write!(
                f,
                "Order Cancel - Time: {}, Order: {}, Cancelled: {}",
                m.timestamp, m.order_ref, m.cancelled_shares
            ),
            ItchMessage::OrderDelete(m) => write!(
                f,
                "Order Delete - Time: {}, Order: {}",
                m.timestamp, m.order_ref
            ),
            ItchMessage::OrderReplace(m) => write!(
                f,
                "Order Replace - Time: {}, Original: {}, New: {}, Shares: {}, Price: ${}",
                m.timestamp, m.original_ref, m.new_ref, m.shares, m.price
            ),
            ItchMessage::Trade(m) => write!(
                f,
                "Trade - Time: {}, Stock: {}, Side: {}, Shares: {}, Price: ${}",
                m.timestamp,
                Text(&m.stock),
                Code(m.side),
                m.shares,
                m.price
            ),
            ItchMessage::CrossTrade(m) => write!(
                f,
                "Cross Trade - Time: {}, Stock: {}, Shares: {}, Price: ${}, Type: {}",
                m.timestamp,
                Text(&m.stock),
                m.shares,
                m.cross_price,
                Code(m.cross_type)
            ),
            ItchMessage::Unknown { tag, length } => write!(
                f,
                "Unknown message type: {} (length: {})",
                Code(char::from(*tag)),
                length
            ),
        }
    }
}

/// Text field as printed: control and non-ASCII bytes become `\xNN`
/// so a summary always stays on one line.
struct Text<'a>(&'a str);

impl fmt::Display for Text<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.chars().try_for_each(|c| write_escaped(f, c))
    }
}

/// Single-byte code field, escaped like [`Text`].
struct Code(char);

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, self.0)
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    if c == ' ' || c.is_ascii_graphic() {
        f.write_char(c)
    } else {
        write!(f, "\\x{:02x}", u32::from(c))
    }
}
