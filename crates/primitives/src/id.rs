//! Fixed-length identifiers.

use alloy_primitives::B256;
use core::fmt;

use crate::ID_LENGTH;

/// Error returned when building an identifier from a slice of the wrong length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier length: expected {ID_LENGTH} bytes, got {0}")]
pub struct IdLengthError(pub usize);

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(B256);

        impl $name {
            /// Identifier with every bit cleared.
            pub const ZERO: Self = Self(B256::ZERO);

            /// Wrap raw identifier bytes.
            #[inline]
            pub const fn new(bytes: [u8; ID_LENGTH]) -> Self {
                Self(B256::new(bytes))
            }

            /// Borrow the raw identifier bytes.
            #[inline]
            pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
                &self.0.0
            }

            /// Borrow the identifier as a byte slice.
            #[inline]
            pub fn as_slice(&self) -> &[u8] {
                self.0.as_slice()
            }

            /// The underlying 256-bit value.
            #[inline]
            pub const fn into_inner(self) -> B256 {
                self.0
            }
        }

        impl From<[u8; ID_LENGTH]> for $name {
            fn from(bytes: [u8; ID_LENGTH]) -> Self {
                Self::new(bytes)
            }
        }

        impl From<B256> for $name {
            fn from(value: B256) -> Self {
                Self(value)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = IdLengthError;

            fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
                let bytes: [u8; ID_LENGTH] =
                    bytes.try_into().map_err(|_| IdLengthError(bytes.len()))?;
                Ok(Self::new(bytes))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.as_slice()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = alloy_primitives::hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<B256>().map(Self)
            }
        }
    };
}

define_id!(
    /// Identifier of a stored item, derived from its content key by the network layer.
    ///
    /// Primary key of every content table and the input to distance computation.
    ContentId
);

define_id!(
    /// Identifier of the local node in the overlay.
    NodeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_slice() {
        let bytes = [7u8; ID_LENGTH];
        let id = ContentId::try_from(bytes.as_slice()).unwrap();
        assert_eq!(id.as_bytes(), &bytes);
    }

    #[test]
    fn test_try_from_wrong_length() {
        let err = NodeId::try_from([1u8; 20].as_slice()).unwrap_err();
        assert_eq!(err, IdLengthError(20));
    }

    #[test]
    fn test_parse_hex() {
        let id: ContentId = "0x0100000000000000000000000000000000000000000000000000000000000002"
            .parse()
            .unwrap();
        assert_eq!(id.as_bytes()[0], 1);
        assert_eq!(id.as_bytes()[31], 2);
        assert!(id.to_string().starts_with("0x01"));
    }
}
