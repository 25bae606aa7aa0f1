//! Value encoding for session fields
//!
//! Values are stored as opaque bincode bytes. The codec holds no state and
//! performs no I/O; any `Serialize` value that bincode supports survives a
//! round trip unchanged.

use crate::errors::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;

/// Encode a value into the bytes stored under a session field
pub fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    bincode::serialize(value).map_err(|source| Error::Encoding { source })
}

/// Decode stored bytes back into the requested shape
pub fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    bincode::deserialize(bytes).map_err(|source| Error::Decoding { source })
}

/// Stable string key for a field name: its `Display` form
pub fn encode_name(name: impl Display) -> String {
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        user_id: u64,
        name: String,
        roles: Vec<String>,
        flags: BTreeMap<String, bool>,
        last_seen: Option<i64>,
    }

    #[test]
    fn test_integer_round_trip() {
        let bytes = encode(&42i64).unwrap();
        let value: i64 = decode(&bytes).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_unsized_str_encodes_like_string() {
        let from_str = encode("alice").unwrap();
        let from_string = encode(&"alice".to_string()).unwrap();
        assert_eq!(from_str, from_string);
        let back: String = decode(&from_str).unwrap();
        assert_eq!(back, "alice");
    }

    #[test]
    fn test_truncated_bytes_fail_to_decode() {
        let bytes = encode(&"a fairly long string value".to_string()).unwrap();
        let result: Result<String> = decode(&bytes[..4]);
        assert!(matches!(result, Err(Error::Decoding { .. })));
    }

    #[test]
    fn test_empty_bytes_fail_to_decode() {
        let result: Result<u64> = decode(&[]);
        assert!(matches!(result, Err(Error::Decoding { .. })));
    }

    #[test]
    fn test_unsupported_value_fails_to_encode() {
        struct Unknown;

        impl Serialize for Unknown {
            fn serialize<S: serde::Serializer>(
                &self,
                _serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("unsupported construct"))
            }
        }

        assert!(matches!(encode(&Unknown), Err(Error::Encoding { .. })));
    }

    #[test]
    fn test_encode_name_uses_display_form() {
        assert_eq!(encode_name("user_id"), "user_id");
        assert_eq!(encode_name(42), "42");
        assert_eq!(encode_name('x'), "x");
    }

    fn profile_strategy() -> impl Strategy<Value = Profile> {
        (
            any::<u64>(),
            ".{0,32}",
            proptest::collection::vec("[a-z]{1,12}", 0..6),
            proptest::collection::btree_map("[a-z]{1,8}", any::<bool>(), 0..6),
            proptest::option::of(any::<i64>()),
        )
            .prop_map(|(user_id, name, roles, flags, last_seen)| Profile {
                user_id,
                name,
                roles,
                flags,
                last_seen,
            })
    }

    proptest! {
        #[test]
        fn prop_profile_round_trip(profile in profile_strategy()) {
            let bytes = encode(&profile).unwrap();
            let back: Profile = decode(&bytes).unwrap();
            prop_assert_eq!(back, profile);
        }

        #[test]
        fn prop_bytes_round_trip(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let bytes = encode(&data).unwrap();
            let back: Vec<u8> = decode(&bytes).unwrap();
            prop_assert_eq!(back, data);
        }
    }
}
