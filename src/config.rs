use std::error::Error;
use std::fmt;

/// Reasons a cache geometry can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Associativity of zero leaves no line to hold any block.
    ZeroWays,
    /// The index and offset fields do not fit in a 64-bit address.
    AddressOverflow { set_bits: u32, block_bits: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroWays => {
                write!(f, "cache must have at least one line per set")
            }
            ConfigError::AddressOverflow {
                set_bits,
                block_bits,
            } => {
                write!(
                    f,
                    "{set_bits} set index bits plus {block_bits} block offset bits \
                     exceed the {}-bit address width",
                    CacheConfig::ADDRESS_BITS
                )
            }
        }
    }
}

impl Error for ConfigError {}

/// Validated cache geometry.
///
/// Addresses split, high to low, into a tag, `set_bits` bits of set index, and
/// `block_bits` bits of block offset. The offset never takes part in hit or
/// miss classification; a whole block is one unit keyed by its tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    set_bits: u32,
    ways: usize,
    block_bits: u32,
}

impl CacheConfig {
    /// Width of the simulated addresses.
    pub const ADDRESS_BITS: u32 = u64::BITS;

    /// Builds a geometry with `set_bits` bits of set index, `ways` lines per
    /// set, and `block_bits` bits of block offset.
    ///
    /// `set_bits == 0` (a single set) and `block_bits == 0` (one-byte blocks)
    /// are both valid; a zero-way cache or a split wider than the address is
    /// not.
    pub fn new(set_bits: u32, ways: usize, block_bits: u32) -> Result<Self, ConfigError> {
        if ways == 0 {
            return Err(ConfigError::ZeroWays);
        }
        if set_bits >= Self::ADDRESS_BITS
            || u64::from(set_bits) + u64::from(block_bits) > u64::from(Self::ADDRESS_BITS)
        {
            return Err(ConfigError::AddressOverflow {
                set_bits,
                block_bits,
            });
        }
        Ok(Self {
            set_bits,
            ways,
            block_bits,
        })
    }

    pub fn ways(&self) -> usize {
        self.ways
    }

    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }

    /// Number of sets, always a power of two.
    pub fn set_count(&self) -> u64 {
        1u64 << self.set_bits
    }

    /// Total line capacity of the cache.
    pub fn total_lines(&self) -> u64 {
        self.set_count() * self.ways as u64
    }

    /// Set selected by `addr`.
    pub fn set_index(&self, addr: u64) -> u64 {
        if self.set_bits == 0 {
            // Single set; also keeps the shift below the address width.
            return 0;
        }
        (addr >> self.block_bits) & (self.set_count() - 1)
    }

    /// Tag bits of `addr`, the part above the set index and block offset.
    pub fn tag(&self, addr: u64) -> u64 {
        let shift = self.set_bits + self.block_bits;
        if shift == Self::ADDRESS_BITS {
            0
        } else {
            addr >> shift
        }
    }
}
