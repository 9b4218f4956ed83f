// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use hdrhistogram::{Error, Histogram, Width};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TRACKABLE_MAX: u64 = 3_600_000_000;
const SIGFIG: u8 = 3;

#[test]
fn sparse_round_trip_is_byte_equal() {
    let mut h = Histogram::new_with_bounds(1, TRACKABLE_MAX, SIGFIG).unwrap();
    for (value, count) in [
        (89_151, 6),
        (90_501, 4),
        (98_119, 3),
        (104_399, 2),
        (110_055, 2),
        (122_998, 2),
        (137_423, 1),
        (153_135, 1),
        (172_011, 1),
        (209_664, 1),
    ] {
        h.record_n(value, count).unwrap();
    }

    let encoded = h.encode().unwrap();
    let decoded = Histogram::decode(&encoded).unwrap();

    assert_eq!(decoded, h);
    assert_eq!(decoded.count(), h.count());
    assert_eq!(decoded.min(), h.min());
    assert_eq!(decoded.max(), h.max());
    assert_eq!(decoded.encode().unwrap(), encoded);
}

#[test]
fn random_round_trips() {
    let mut rng = StdRng::seed_from_u64(0xdec0de);

    for _ in 0..50 {
        let mut h = Histogram::new_with_bounds(1, TRACKABLE_MAX, SIGFIG).unwrap();
        let samples = rng.gen_range(0..1000);
        for _ in 0..samples {
            h.record_n(rng.gen_range(1..TRACKABLE_MAX), rng.gen_range(1..100))
                .unwrap();
        }

        let encoded = h.encode().unwrap();
        let decoded = Histogram::decode(&encoded).unwrap();
        assert_eq!(decoded, h);
        assert_eq!(decoded.encode().unwrap(), encoded);
    }
}

#[test]
fn round_trip_preserves_percentiles() {
    let mut rng = StdRng::seed_from_u64(0xdec0de + 1);
    let mut h = Histogram::new_with_bounds(1, TRACKABLE_MAX, SIGFIG).unwrap();
    for _ in 0..10_000 {
        h.record(rng.gen_range(1..1_000_000)).unwrap();
    }

    let decoded = Histogram::decode(&h.encode().unwrap()).unwrap();
    for percentile in [50.0, 90.0, 99.0, 99.9] {
        assert_eq!(
            decoded.value_at_percentile(percentile).unwrap(),
            h.value_at_percentile(percentile).unwrap()
        );
    }
}

// A payload assembled by hand from the V2 wire rules shared with the other
// HDR histogram implementations: a histogram over [1, 3600000000] at 3
// significant figures holding one count at value 1 and two counts at value
// 2.
fn peer_payload() -> Vec<u8> {
    let mut bytes = Vec::new();
    // cookie
    bytes.extend_from_slice(&[0x1c, 0x84, 0x93, 0x13]);
    // payload length
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x03]);
    // normalizing index offset
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    // significant figures
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x03]);
    // lowest discernible value
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]);
    // highest trackable value
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0xd6, 0x93, 0xa4, 0x00]);
    // conversion ratio 1.0
    bytes.extend_from_slice(&[0x3f, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    // counts: a lone zero at slot 0, then 1 and 2 zig-zag encoded
    bytes.extend_from_slice(&[0x00, 0x02, 0x04]);
    bytes
}

#[test]
fn decodes_peer_payload() {
    let decoded = Histogram::decode(&peer_payload()).unwrap();

    assert_eq!(decoded.low(), 1);
    assert_eq!(decoded.high(), TRACKABLE_MAX);
    assert_eq!(decoded.sigfig(), 3);
    assert_eq!(decoded.count(), 3);
    assert_eq!(decoded.count_at(1), 1);
    assert_eq!(decoded.count_at(2), 2);
    assert_eq!(decoded.min(), 1);
    assert_eq!(decoded.max(), 2);
    assert_eq!(decoded.value_at_percentile(50.0).unwrap(), 2);
    assert_eq!(decoded.value_at_percentile(99.0).unwrap(), 2);
}

#[test]
fn encodes_peer_payload() {
    let mut h = Histogram::new_with_bounds(1, TRACKABLE_MAX, SIGFIG).unwrap();
    h.record(1).unwrap();
    h.record_n(2, 2).unwrap();
    assert_eq!(h.encode().unwrap(), peer_payload());
}

#[test]
fn empty_round_trip() {
    let h = Histogram::new_with_bounds(1, TRACKABLE_MAX, SIGFIG).unwrap();
    let encoded = h.encode().unwrap();
    // header plus a single literal zero entry
    assert_eq!(encoded.len(), 41);

    let decoded = Histogram::decode(&encoded).unwrap();
    assert!(decoded.is_empty());
    assert_eq!(decoded, h);
}

#[test]
fn single_byte_zero_run() {
    // replace the empty payload with a zero run of length one
    let h = Histogram::new_with_bounds(1, TRACKABLE_MAX, SIGFIG).unwrap();
    let mut encoded = h.encode().unwrap();
    encoded[40] = 0x01;

    let decoded = Histogram::decode(&encoded).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn truncation_yields_no_histogram() {
    let mut h = Histogram::new_with_bounds(1, TRACKABLE_MAX, SIGFIG).unwrap();
    h.record_n(1000, 1 << 20).unwrap();
    let encoded = h.encode().unwrap();

    for len in 0..encoded.len() {
        assert!(matches!(
            Histogram::decode(&encoded[..len]),
            Err(Error::Truncated)
        ));
    }
}

#[test]
fn width_round_trips() {
    for width in [Width::U16, Width::U32, Width::U64] {
        let mut h = Histogram::builder()
            .highest_trackable_value(1_000_000)
            .counter_width(width)
            .build()
            .unwrap();
        h.record_n(100, 60_000).unwrap();
        h.record(999_999).unwrap();

        let encoded = h.encode().unwrap();
        let decoded = Histogram::decode_with_width(&encoded, width).unwrap();
        assert_eq!(decoded, h);
        assert_eq!(decoded.counter_width(), width);
    }
}

#[test]
fn encode_into_writer() {
    let mut h = Histogram::new_with_bounds(1, TRACKABLE_MAX, SIGFIG).unwrap();
    h.record(1000).unwrap();

    let mut out = Vec::new();
    let written = h.encode_into(&mut out).unwrap();
    assert_eq!(written, out.len());
    assert_eq!(out, h.encode().unwrap());
}
