//! Fixed-width channel bitmask.

use core::fmt;
use core::ops::{BitAnd, BitOr, Not};

/// Largest channel count a decoder supports.
pub use touch_traits::MAX_CHANNELS;

/// A set of channels, bit `i` standing for channel `i`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelMask(u32);

impl ChannelMask {
    pub const EMPTY: Self = Self(0);

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Mask with the low `width` bits set (`width` is clamped to 32).
    #[inline]
    pub fn full(width: u8) -> Self {
        if width >= MAX_CHANNELS {
            Self(u32::MAX)
        } else {
            Self((1u32 << width) - 1)
        }
    }

    /// Drop every bit at or above `width`.
    #[inline]
    pub fn truncate(self, width: u8) -> Self {
        self & Self::full(width)
    }

    #[inline]
    pub fn test(self, channel: u8) -> bool {
        channel < MAX_CHANNELS && self.0 & (1u32 << channel) != 0
    }

    /// Set the bit for `channel`; channels outside the mask width are ignored.
    #[inline]
    pub fn set(&mut self, channel: u8) {
        if channel < MAX_CHANNELS {
            self.0 |= 1u32 << channel;
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Channels in ascending order.
    pub fn iter(self) -> Channels {
        Channels(self.0)
    }
}

/// Ascending iterator over the channels of a [`ChannelMask`].
#[derive(Debug, Clone)]
pub struct Channels(u32);

impl Iterator for Channels {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.0 == 0 {
            return None;
        }
        let ch = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Some(ch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Channels {}

impl IntoIterator for ChannelMask {
    type Item = u8;
    type IntoIter = Channels;

    fn into_iter(self) -> Channels {
        self.iter()
    }
}

impl FromIterator<u8> for ChannelMask {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut m = Self::EMPTY;
        for ch in iter {
            m.set(ch);
        }
        m
    }
}

impl BitAnd for ChannelMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for ChannelMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Not for ChannelMask {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl From<u32> for ChannelMask {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelMask({:#b})", self.0)
    }
}

impl fmt::Binary for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}
