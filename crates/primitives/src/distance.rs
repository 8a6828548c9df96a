//! Identifier-space distance.

use alloy_primitives::U256;
use core::fmt;

use crate::{ContentId, NodeId};

/// Distance between two identifiers.
///
/// A 256-bit unsigned value; larger means farther. Also used as a store's
/// radius, the farthest distance it currently promises to cover.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Distance(U256);

impl Distance {
    /// The farthest possible distance. A radius of `MAX` covers the whole space.
    pub const MAX: Self = Self(U256::MAX);

    /// The distance of an identifier to itself.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Wrap a raw 256-bit value.
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Build a distance from big-endian bytes.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }

    /// The raw 256-bit value.
    pub const fn into_inner(self) -> U256 {
        self.0
    }

    /// Big-endian bytes of the distance.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    /// The most significant 32 bits of the distance.
    ///
    /// Order-preserving: `a <= b` implies `a.big_endian_u32() <= b.big_endian_u32()`,
    /// so rows can be ordered by this projection instead of the full value.
    pub fn big_endian_u32(&self) -> u32 {
        let [a, b, c, d, ..] = self.to_be_bytes();
        u32::from_be_bytes([a, b, c, d])
    }

    /// Distance as a fraction of [`Distance::MAX`], in `[0.0, 1.0]`.
    ///
    /// Only precise to the top 32 bits; meant for reporting.
    pub fn fraction_of_max(&self) -> f64 {
        f64::from(self.big_endian_u32()) / f64::from(u32::MAX)
    }
}

impl From<U256> for Distance {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::MAX {
            return f.write_str("max");
        }
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Debug for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Distance({self})")
    }
}

/// A total-order metric over the identifier space.
pub trait Metric {
    /// Distance between two raw identifiers.
    fn distance(x: &[u8; 32], y: &[u8; 32]) -> Distance;
}

/// Kademlia XOR metric: the bitwise exclusive-or of both identifiers,
/// read as a big-endian integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XorMetric;

impl Metric for XorMetric {
    fn distance(x: &[u8; 32], y: &[u8; 32]) -> Distance {
        let mut xored = [0u8; 32];
        for (out, (a, b)) in xored.iter_mut().zip(x.iter().zip(y.iter())) {
            *out = a ^ b;
        }
        Distance::from_be_bytes(xored)
    }
}

/// Metric selection carried in store configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DistanceFunction {
    /// [`XorMetric`].
    #[default]
    Xor,
}

impl DistanceFunction {
    /// Distance between the local node and a content id under this metric.
    pub fn distance(&self, node_id: &NodeId, content_id: &ContentId) -> Distance {
        match self {
            DistanceFunction::Xor => XorMetric::distance(node_id.as_bytes(), content_id.as_bytes()),
        }
    }
}
