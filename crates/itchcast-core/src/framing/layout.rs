pub const LENGTH_PREFIX_LEN: usize = 2;
pub const LENGTH_RANGE: std::ops::Range<usize> = 0..LENGTH_PREFIX_LEN;
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;
