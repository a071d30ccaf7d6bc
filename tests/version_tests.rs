//! Version Tests
//!
//! Tests for unbounded version numbers and the client's version registry.

use std::cmp::Ordering;

use ticketlink::protocol::Encoding;
use ticketlink::version::{
    ProtocolVersion, RegisteredVersion, VersionNumber, VersionRegistry, TICKETS_PROTOCOL_ID,
};
use ticketlink::ClientError;

// =============================================================================
// Version Number Tests
// =============================================================================

#[test]
fn test_decimal_round_trip_beyond_u64() {
    let text = "340282366920938463463374607431768211457";
    let number: VersionNumber = text.parse().unwrap();
    assert_eq!(number.to_string(), text);
    assert_eq!(number.to_u64(), None);
}

#[test]
fn test_ordering_by_magnitude() {
    let small = VersionNumber::from(255u64);
    let large = VersionNumber::from(256u64);
    let huge: VersionNumber = "18446744073709551616".parse().unwrap();
    assert!(small < large);
    assert!(large < huge);
    assert_eq!(
        VersionNumber::from(7u64).cmp(&VersionNumber::from(7u64)),
        Ordering::Equal
    );
}

#[test]
fn test_zero_and_leading_zeros() {
    assert_eq!(VersionNumber::zero().to_string(), "0");
    assert!(VersionNumber::zero().is_zero());
    assert_eq!(
        "0007".parse::<VersionNumber>().unwrap(),
        VersionNumber::from(7u64)
    );
    assert_eq!(VersionNumber::from_be_bytes(&[0, 0, 1]).to_be_bytes(), &[1]);
}

#[test]
fn test_rejects_non_digits() {
    assert!("".parse::<VersionNumber>().is_err());
    assert!("-1".parse::<VersionNumber>().is_err());
    assert!("1.5".parse::<VersionNumber>().is_err());
}

#[test]
fn test_json_carries_large_numbers_as_numbers() {
    let huge: VersionNumber = "123456789012345678901234567890".parse().unwrap();
    let json = serde_json::to_string(&huge).unwrap();
    assert_eq!(json, "123456789012345678901234567890");
    let back: VersionNumber = serde_json::from_str(&json).unwrap();
    assert_eq!(back, huge);

    assert_eq!(serde_json::to_string(&VersionNumber::from(3u64)).unwrap(), "3");
}

#[test]
fn test_binary_round_trip() {
    let huge: VersionNumber = "98765432109876543210987654321".parse().unwrap();
    let bytes = bincode::serialize(&huge).unwrap();
    let back: VersionNumber = bincode::deserialize(&bytes).unwrap();
    assert_eq!(back, huge);
}

#[test]
fn test_version_display_and_precedence() {
    let a = ProtocolVersion::new("tickets", 1u64, 10u64, "t/1/10/");
    let b = ProtocolVersion::new("tickets", 2u64, 0u64, "t/2/0/");
    assert_eq!(a.to_string(), "tickets 1.10");
    assert_eq!(a.cmp_precedence(&b), Ordering::Less);
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_builtin_versions() {
    let registry = VersionRegistry::builtin();
    assert_eq!(registry.versions_for(TICKETS_PROTOCOL_ID).count(), 2);
    assert_eq!(registry.versions_for("other").count(), 0);
}

#[test]
fn test_codec_rejects_unsupported_encoding() {
    let registry = VersionRegistry::builtin();
    let v10 = ProtocolVersion::new(TICKETS_PROTOCOL_ID, 1u64, 0u64, "t/1/0/");
    let entry = registry.find(&v10).unwrap();

    assert!(entry.codec(Encoding::Text).is_ok());
    let err = entry.codec(Encoding::Binary).err().unwrap();
    assert!(matches!(err, ClientError::Protocol { .. }));
}

#[test]
fn test_registry_matches_id_and_pair_only() {
    let registry = VersionRegistry::new().with(RegisteredVersion::new(
        "tickets",
        1u64,
        1u64,
        &[Encoding::Text, Encoding::Binary],
    ));

    // The endpoint path plays no part in matching
    assert!(registry
        .find(&ProtocolVersion::new("tickets", 1u64, 1u64, "anything/"))
        .is_some());
    assert!(registry
        .find(&ProtocolVersion::new("admin", 1u64, 1u64, "t/1/1/"))
        .is_none());
    assert!(registry
        .find(&ProtocolVersion::new("tickets", 1u64, 2u64, "t/1/2/"))
        .is_none());
}
