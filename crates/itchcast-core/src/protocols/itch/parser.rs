use super::error::DecodeError;
use super::layout::{self, TimestampWidth};
use super::message::{
    AddOrder, AddOrderMpid, CrossTrade, ItchMessage, OrderCancel, OrderDelete, OrderExecuted,
    OrderExecutedWithPrice, OrderReplace, StockDirectory, SystemEvent, Trade, TradingAction,
};
use super::reader::ItchReader;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    pub timestamp_width: TimestampWidth,
}

/// Stateless frame decoder; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> DecoderConfig {
        self.config
    }

    /// Decode one frame (length prefix already stripped).
    ///
    /// # Errors
    /// `EmptyFrame` when there is no tag, `Truncated` when a field of the
    /// matched layout overruns the frame, `Encoding` on non-ASCII text.
    pub fn decode(&self, frame: &[u8]) -> Result<ItchMessage, DecodeError> {
        let Some(&tag) = frame.get(layout::TAG_OFFSET) else {
            return Err(DecodeError::EmptyFrame);
        };
        let reader = ItchReader::new(frame, tag, self.config.timestamp_width);
        reader.require_len()?;

        let message = match tag {
            layout::SYSTEM_EVENT => ItchMessage::SystemEvent(parse_system_event(&reader)?),
            layout::STOCK_DIRECTORY => {
                ItchMessage::StockDirectory(parse_stock_directory(&reader)?)
            }
            layout::TRADING_ACTION => ItchMessage::TradingAction(parse_trading_action(&reader)?),
            layout::ADD_ORDER => ItchMessage::AddOrder(parse_add_order(&reader)?),
            layout::ADD_ORDER_MPID => ItchMessage::AddOrderMpid(parse_add_order_mpid(&reader)?),
            layout::ORDER_EXECUTED => ItchMessage::OrderExecuted(parse_order_executed(&reader)?),
            layout::ORDER_EXECUTED_WITH_PRICE => {
                ItchMessage::OrderExecutedWithPrice(parse_order_executed_with_price(&reader)?)
            }
            layout::ORDER_CANCEL => ItchMessage::OrderCancel(parse_order_cancel(&reader)?),
            layout::ORDER_DELETE => ItchMessage::OrderDelete(parse_order_delete(&reader)?),
            layout::ORDER_REPLACE => ItchMessage::OrderReplace(parse_order_replace(&reader)?),
            layout::TRADE => ItchMessage::Trade(parse_trade(&reader)?),
            layout::CROSS_TRADE => ItchMessage::CrossTrade(parse_cross_trade(&reader)?),
            _ => ItchMessage::Unknown {
                tag,
                length: frame.len(),
            },
        };
        Ok(message)
    }
}

/// Decode with the default configuration (8-byte timestamp).
///
/// # Examples
/// ```
/// use itchcast_core::{ItchMessage, decode};
///
/// let message = decode(b"Z12").unwrap();
/// assert_eq!(message, ItchMessage::Unknown { tag: b'Z', length: 3 });
/// ```
pub fn decode(frame: &[u8]) -> Result<ItchMessage, DecodeError> {
    Decoder::default().decode(frame)
}

fn parse_system_event(reader: &ItchReader<'_>) -> Result<SystemEvent, DecodeError> {
    use layout::system_event::*;
    Ok(SystemEvent {
        timestamp: reader.timestamp()?,
        event_code: reader.code(EVENT_CODE)?,
    })
}

fn parse_stock_directory(reader: &ItchReader<'_>) -> Result<StockDirectory, DecodeError> {
    use layout::stock_directory::*;
    Ok(StockDirectory {
        timestamp: reader.timestamp()?,
        stock: reader.stock(STOCK)?,
        market_category: reader.code(MARKET_CATEGORY)?,
    })
}

fn parse_trading_action(reader: &ItchReader<'_>) -> Result<TradingAction, DecodeError> {
    use layout::trading_action::*;
    Ok(TradingAction {
        timestamp: reader.timestamp()?,
        stock: reader.stock(STOCK)?,
        trading_state: reader.code(TRADING_STATE)?,
    })
}

fn parse_add_order(reader: &ItchReader<'_>) -> Result<AddOrder, DecodeError> {
    use layout::add_order::*;
    Ok(AddOrder {
        timestamp: reader.timestamp()?,
        order_ref: reader.u64(ORDER_REF)?,
        side: reader.code(SIDE)?,
        shares: reader.u32(SHARES)?,
        stock: reader.stock(STOCK)?,
        price: reader.price(PRICE)?,
    })
}

fn parse_add_order_mpid(reader: &ItchReader<'_>) -> Result<AddOrderMpid, DecodeError> {
    Ok(AddOrderMpid {
        order: parse_add_order(reader)?,
        mpid: reader.text(layout::add_order::MPID, layout::MPID_LEN)?,
    })
}

fn parse_order_executed(reader: &ItchReader<'_>) -> Result<OrderExecuted, DecodeError> {
    use layout::order_executed::*;
    Ok(OrderExecuted {
        timestamp: reader.timestamp()?,
        order_ref: reader.u64(ORDER_REF)?,
        executed_shares: reader.u32(EXECUTED_SHARES)?,
        match_number: reader.u64(MATCH_NUMBER)?,
    })
}

fn parse_order_executed_with_price(
    reader: &ItchReader<'_>,
) -> Result<OrderExecutedWithPrice, DecodeError> {
    use layout::order_executed::*;
    Ok(OrderExecutedWithPrice {
        execution: parse_order_executed(reader)?,
        printable: reader.code(PRINTABLE)?,
        price: reader.price(PRICE)?,
    })
}

fn parse_order_cancel(reader: &ItchReader<'_>) -> Result<OrderCancel, DecodeError> {
    use layout::order_cancel::*;
    Ok(OrderCancel {
        timestamp: reader.timestamp()?,
        order_ref: reader.u64(ORDER_REF)?,
        cancelled_shares: reader.u32(CANCELLED_SHARES)?,
    })
}

fn parse_order_delete(reader: &ItchReader<'_>) -> Result<OrderDelete, DecodeError> {
    use layout::order_delete::*;
    Ok(OrderDelete {
        timestamp: reader.timestamp()?,
        order_ref: reader.u64(ORDER_REF)?,
    })
}

fn parse_order_replace(reader: &ItchReader<'_>) -> Result<OrderReplace, DecodeError> {
    use layout::order_replace::*;
    Ok(OrderReplace {
        timestamp: reader.timestamp()?,
        original_ref: reader.u64(ORIGINAL_REF)?,
        new_ref: reader.u64(NEW_REF)?,
        shares: reader.u32(SHARES)?,
        price: reader.price(PRICE)?,
    })
}

fn parse_trade(reader: &ItchReader<'_>) -> Result<Trade, DecodeError> {
    use layout::trade::*;
    Ok(Trade {
        timestamp: reader.timestamp()?,
        order_ref: reader.u64(ORDER_REF)?,
        side: reader.code(SIDE)?,
        shares: reader.u32(SHARES)?,
        stock: reader.stock(STOCK)?,
        price: reader.price(PRICE)?,
        match_number: reader.u64(MATCH_NUMBER)?,
    })
}

fn parse_cross_trade(reader: &ItchReader<'_>) -> Result<CrossTrade, DecodeError> {
    use layout::cross_trade::*;
    Ok(CrossTrade {
        timestamp: reader.timestamp()?,
        shares: reader.u64(SHARES)?,
        stock: reader.stock(STOCK)?,
        cross_price: reader.price(CROSS_PRICE)?,
        match_number: reader.u64(MATCH_NUMBER)?,
        cross_type: reader.code(CROSS_TYPE)?,
    })
}
