//! Byte layout of ITCH records.
//!
//! Offsets in the per-type modules are relative to the start of the message
//! body, which begins right after the timestamp. The body start depends on
//! the configured [`TimestampWidth`].

pub const TAG_OFFSET: usize = 0;
pub const STOCK_LOCATE_RANGE: std::ops::Range<usize> = 1..3;
pub const TRACKING_NUMBER_RANGE: std::ops::Range<usize> = 3..5;
pub const TIMESTAMP_OFFSET: usize = 5;

pub const STOCK_LEN: usize = 8;
pub const MPID_LEN: usize = 4;

pub const PRICE_SCALE: u32 = 10_000;
pub const NANOS_PER_DAY: u64 = 86_400_000_000_000;

pub const SYSTEM_EVENT: u8 = b'S';
pub const STOCK_DIRECTORY: u8 = b'R';
pub const TRADING_ACTION: u8 = b'H';
pub const ADD_ORDER: u8 = b'A';
pub const ADD_ORDER_MPID: u8 = b'F';
pub const ORDER_EXECUTED: u8 = b'E';
pub const ORDER_EXECUTED_WITH_PRICE: u8 = b'C';
pub const ORDER_CANCEL: u8 = b'X';
pub const ORDER_DELETE: u8 = b'D';
pub const ORDER_REPLACE: u8 = b'U';
pub const TRADE: u8 = b'P';
pub const CROSS_TRADE: u8 = b'Q';

/// Every tag with a decoding routine, in protocol-table order.
pub const KNOWN_TAGS: [u8; 12] = [
    SYSTEM_EVENT,
    STOCK_DIRECTORY,
    TRADING_ACTION,
    ADD_ORDER,
    ADD_ORDER_MPID,
    ORDER_EXECUTED,
    ORDER_EXECUTED_WITH_PRICE,
    ORDER_CANCEL,
    ORDER_DELETE,
    ORDER_REPLACE,
    TRADE,
    CROSS_TRADE,
];

/// Width of the timestamp slot that starts at [`TIMESTAMP_OFFSET`].
///
/// `Eight` reads a full big-endian `u64` and shifts the body by two bytes.
/// `Six` follows the published ITCH 5.0 layout (48-bit timestamp).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimestampWidth {
    Six,
    #[default]
    Eight,
}

impl TimestampWidth {
    pub const fn from_bytes(bytes: u8) -> Option<Self> {
        match bytes {
            6 => Some(Self::Six),
            8 => Some(Self::Eight),
            _ => None,
        }
    }

    pub const fn bytes(self) -> usize {
        match self {
            Self::Six => 6,
            Self::Eight => 8,
        }
    }

    pub const fn body_offset(self) -> usize {
        TIMESTAMP_OFFSET + self.bytes()
    }
}

pub mod system_event {
    pub const EVENT_CODE: usize = 0;
    pub const BODY_LEN: usize = 1;
    pub const FIELDS: &[usize] = &[EVENT_CODE];
}

pub mod stock_directory {
    pub const STOCK: usize = 0;
    pub const MARKET_CATEGORY: usize = 8;
    pub const BODY_LEN: usize = 9;
    pub const FIELDS: &[usize] = &[STOCK, MARKET_CATEGORY];
}

pub mod trading_action {
    pub const STOCK: usize = 0;
    pub const TRADING_STATE: usize = 8;
    pub const BODY_LEN: usize = 9;
    pub const FIELDS: &[usize] = &[STOCK, TRADING_STATE];
}

pub mod add_order {
    pub const ORDER_REF: usize = 0;
    pub const SIDE: usize = 8;
    pub const SHARES: usize = 9;
    pub const STOCK: usize = 13;
    pub const PRICE: usize = 21;
    pub const BODY_LEN: usize = 25;
    pub const MPID: usize = 25;
    pub const MPID_BODY_LEN: usize = 29;
    pub const FIELDS: &[usize] = &[ORDER_REF, SIDE, SHARES, STOCK, PRICE];
    pub const MPID_FIELDS: &[usize] = &[ORDER_REF, SIDE, SHARES, STOCK, PRICE, MPID];
}

pub mod order_executed {
    pub const ORDER_REF: usize = 0;
    pub const EXECUTED_SHARES: usize = 8;
    pub const MATCH_NUMBER: usize = 12;
    pub const BODY_LEN: usize = 20;
    pub const PRINTABLE: usize = 20;
    pub const PRICE: usize = 21;
    pub const WITH_PRICE_BODY_LEN: usize = 25;
    pub const FIELDS: &[usize] = &[ORDER_REF, EXECUTED_SHARES, MATCH_NUMBER];
    pub const WITH_PRICE_FIELDS: &[usize] =
        &[ORDER_REF, EXECUTED_SHARES, MATCH_NUMBER, PRINTABLE, PRICE];
}

pub mod order_cancel {
    pub const ORDER_REF: usize = 0;
    pub const CANCELLED_SHARES: usize = 8;
    pub const BODY_LEN: usize = 12;
    pub const FIELDS: &[usize] = &[ORDER_REF, CANCELLED_SHARES];
}

pub mod order_delete {
    pub const ORDER_REF: usize = 0;
    pub const BODY_LEN: usize = 8;
    pub const FIELDS: &[usize] = &[ORDER_REF];
}

pub mod order_replace {
    pub const ORIGINAL_REF: usize = 0;
    pub const NEW_REF: usize = 8;
    pub const SHARES: usize = 16;
    pub const PRICE: usize = 20;
    pub const BODY_LEN: usize = 24;
    pub const FIELDS: &[usize] = &[ORIGINAL_REF, NEW_REF, SHARES, PRICE];
}

pub mod trade {
    pub const ORDER_REF: usize = 0;
    pub const SIDE: usize = 8;
    pub const SHARES: usize = 9;
    pub const STOCK: usize = 13;
    pub const PRICE: usize = 21;
    pub const MATCH_NUMBER: usize = 25;
    pub const BODY_LEN: usize = 33;
    pub const FIELDS: &[usize] = &[ORDER_REF, SIDE, SHARES, STOCK, PRICE, MATCH_NUMBER];
}

pub mod cross_trade {
    pub const SHARES: usize = 0;
    pub const STOCK: usize = 8;
    pub const CROSS_PRICE: usize = 16;
    pub const MATCH_NUMBER: usize = 20;
    pub const CROSS_TYPE: usize = 28;
    pub const BODY_LEN: usize = 29;
    pub const FIELDS: &[usize] = &[SHARES, STOCK, CROSS_PRICE, MATCH_NUMBER, CROSS_TYPE];
}

/// Body length of a known tag, `None` for tags without a layout.
pub const fn body_len(tag: u8) -> Option<usize> {
    let len = match tag {
        SYSTEM_EVENT => system_event::BODY_LEN,
        STOCK_DIRECTORY => stock_directory::BODY_LEN,
        TRADING_ACTION => trading_action::BODY_LEN,
        ADD_ORDER => add_order::BODY_LEN,
        ADD_ORDER_MPID => add_order::MPID_BODY_LEN,
        ORDER_EXECUTED => order_executed::BODY_LEN,
        ORDER_EXECUTED_WITH_PRICE => order_executed::WITH_PRICE_BODY_LEN,
        ORDER_CANCEL => order_cancel::BODY_LEN,
        ORDER_DELETE => order_delete::BODY_LEN,
        ORDER_REPLACE => order_replace::BODY_LEN,
        TRADE => trade::BODY_LEN,
        CROSS_TRADE => cross_trade::BODY_LEN,
        _ => return None,
    };
    Some(len)
}

/// Body-relative start of every field of a known tag, in wire order.
///
/// Fields are contiguous: each one ends where the next starts, and the last
/// ends at the body length.
pub const fn field_starts(tag: u8) -> Option<&'static [usize]> {
    let starts = match tag {
        SYSTEM_EVENT => system_event::FIELDS,
        STOCK_DIRECTORY => stock_directory::FIELDS,
        TRADING_ACTION => trading_action::FIELDS,
        ADD_ORDER => add_order::FIELDS,
        ADD_ORDER_MPID => add_order::MPID_FIELDS,
        ORDER_EXECUTED => order_executed::FIELDS,
        ORDER_EXECUTED_WITH_PRICE => order_executed::WITH_PRICE_FIELDS,
        ORDER_CANCEL => order_cancel::FIELDS,
        ORDER_DELETE => order_delete::FIELDS,
        ORDER_REPLACE => order_replace::FIELDS,
        TRADE => trade::FIELDS,
        CROSS_TRADE => cross_trade::FIELDS,
        _ => return None,
    };
    Some(starts)
}

/// Smallest frame a known tag decodes from.
pub const fn min_frame_len(tag: u8, width: TimestampWidth) -> Option<usize> {
    match body_len(tag) {
        Some(len) => Some(width.body_offset() + len),
        None => None,
    }
}
