//! Unit tests for Wiegand decoding, edge filtering and frame assembly.
//!
//! Edges are fed with explicit timestamps so no hardware or clock is needed.

use wiegand_forwarder::capture::FrameAssembler;
use wiegand_forwarder::filter::EdgeFilter;
use wiegand_forwarder::{
    decode_26, CardId, Config, EdgeFilterMode, EdgeOutcome, Frame, FrameEvent, FrameTiming, Line,
    WiegandCapture, FRAME_BITS,
};

const BIT_SPACING_US: u64 = 2_000;

fn timing() -> FrameTiming {
    FrameTiming::from(&Config::default())
}

/// Assemble an H10301 frame with correct parity bits.
fn encode_26(facility: u32, card: u32) -> u32 {
    let data = (facility << 16) | card;
    let upper = data >> 12;
    let lower = data & 0xFFF;
    let even_parity = upper.count_ones() % 2;
    let odd_parity = if (lower.count_ones() % 2) == 0 { 1 } else { 0 };
    (even_parity << 25) | (data << 1) | odd_parity
}

/// Feed the first `bits` bits of `raw` (MSB first) starting at `start_us`.
/// Returns the timestamp of the last edge.
fn feed(capture: &WiegandCapture, raw: u32, bits: u8, start_us: u64) -> u64 {
    let mut now = start_us;
    for i in 0..bits {
        let line = if (raw >> (FRAME_BITS - 1 - i)) & 1 == 1 { Line::D1 } else { Line::D0 };
        assert_eq!(capture.on_edge(line, now), EdgeOutcome::Recorded);
        now += BIT_SPACING_US;
    }
    now - BIT_SPACING_US
}

fn configured_capture() -> WiegandCapture {
    let capture = WiegandCapture::new();
    capture.configure(Config::default().edge_filter);
    capture
}

// ============================================================================
// Tests for decode_26
// ============================================================================

#[test]
fn test_decode_26_bit_field_extraction() {
    let frame = Frame::from_bit_str("01000000000101111000000000").unwrap();
    let raw = 0b01000000000101111000000000u32;
    assert_eq!(frame.raw(), raw);
    assert_eq!(decode_26(&frame), CardId(((raw >> 1) & 0xFFFF) as u16));
    assert_eq!(decode_26(&frame), CardId(0x2F00));
}

#[test]
fn test_decode_26_small_card() {
    let frame = Frame::from_raw(0b00000000000000000001000001);
    assert_eq!(frame.card_id(), CardId(32));
}

#[test]
fn test_decode_26_discards_facility_and_parity() {
    let frame = Frame::from_raw(encode_26(100, 12345));
    assert_eq!(frame.card_id(), CardId(12345));
}

#[test]
fn test_decode_26_max_card() {
    let frame = Frame::from_raw(encode_26(255, 65535));
    assert_eq!(frame.card_id(), CardId(65535));
}

#[test]
fn test_decode_26_all_zeros() {
    assert_eq!(Frame::from_raw(0).card_id(), CardId(0));
}

#[test]
fn test_decode_26_all_ones() {
    assert_eq!(Frame::from_raw(0x3FF_FFFF).card_id(), CardId(0xFFFF));
}

#[test]
fn test_card_id_display_is_decimal() {
    assert_eq!(CardId(32).to_string(), "32");
    assert_eq!(CardId(65535).to_string(), "65535");
}

// ============================================================================
// Tests for Frame
// ============================================================================

#[test]
fn test_frame_from_raw_masks_high_bits() {
    let frame = Frame::from_raw(0xFC00_0001);
    assert_eq!(frame.raw(), 1);
}

#[test]
fn test_frame_from_bit_str_wrong_length() {
    assert!(Frame::from_bit_str("").is_none());
    assert!(Frame::from_bit_str("0101").is_none());
    assert!(Frame::from_bit_str("010000000001011110000000001").is_none());
}

#[test]
fn test_frame_from_bit_str_invalid_character() {
    assert!(Frame::from_bit_str("0100000000010111100000000x").is_none());
    assert!(Frame::from_bit_str("01000000000101111000000002").is_none());
}

#[test]
fn test_frame_display_matches_bit_string() {
    let text = "10110000000000000000000011";
    let frame = Frame::from_bit_str(text).unwrap();
    assert_eq!(frame.to_string(), text);
    assert_eq!(Frame::from_raw(1).to_string(), "00000000000000000000000001");
}

#[test]
fn test_frame_bit_indexing_msb_first() {
    let frame = Frame::from_bit_str("10000000000000000000000001").unwrap();
    assert_eq!(frame.bit(0), Some(1));
    assert_eq!(frame.bit(1), Some(0));
    assert_eq!(frame.bit(25), Some(1));
    assert_eq!(frame.bit(26), None);
}

#[test]
fn test_line_bit_values() {
    assert_eq!(Line::D0.bit(), 0);
    assert_eq!(Line::D1.bit(), 1);
}

// ============================================================================
// Tests for parity diagnostics
// ============================================================================

#[test]
fn test_parity_ok_on_valid_frames() {
    let cases = [(0, 0), (1, 1), (127, 32768), (255, 65535), (100, 12345), (45, 9876)];
    for (facility, card) in cases {
        let frame = Frame::from_raw(encode_26(facility, card));
        assert!(frame.parity_ok(), "facility={} card={}", facility, card);
    }
}

#[test]
fn test_parity_even_bit_flipped() {
    let frame = Frame::from_raw(encode_26(100, 12345) ^ (1 << 25));
    assert!(!frame.parity_ok());
}

#[test]
fn test_parity_odd_bit_flipped() {
    let frame = Frame::from_raw(encode_26(100, 12345) ^ 1);
    assert!(!frame.parity_ok());
}

#[test]
fn test_parity_data_bit_flipped() {
    let frame = Frame::from_raw(encode_26(100, 12345) ^ (1 << 10));
    assert!(!frame.parity_ok());
}

#[test]
fn test_parity_mismatch_still_decodes() {
    let raw = encode_26(100, 12345) ^ 1;
    let frame = Frame::from_raw(raw);
    assert!(!frame.parity_ok());
    assert_eq!(frame.card_id(), CardId(12345));
}

// ============================================================================
// Tests for EdgeFilter
// ============================================================================

#[test]
fn test_filter_disabled_accepts_everything() {
    let filter = EdgeFilter::new();
    assert_eq!(filter.mode(), EdgeFilterMode::Disabled);
    assert!(filter.accept(100));
    assert!(filter.accept(100));
    assert!(filter.accept(101));
}

#[test]
fn test_filter_first_edge_accepted() {
    let filter = EdgeFilter::new();
    filter.configure(EdgeFilterMode::DeadTime { dead_time_us: 200 });
    assert!(filter.accept(0));
}

#[test]
fn test_filter_rejects_within_dead_time() {
    let filter = EdgeFilter::new();
    filter.configure(EdgeFilterMode::DeadTime { dead_time_us: 200 });
    assert!(filter.accept(1_000));
    assert!(!filter.accept(1_001));
    assert!(!filter.accept(1_199));
    assert!(filter.accept(1_200));
}

#[test]
fn test_filter_rejected_edge_does_not_move_clock() {
    let filter = EdgeFilter::new();
    filter.configure(EdgeFilterMode::DeadTime { dead_time_us: 200 });
    assert!(filter.accept(0));
    assert!(!filter.accept(150));
    // Measured from the accepted edge at 0, not the rejected one at 150
    assert!(filter.accept(250));
}

#[test]
fn test_filter_accepted_edges_respect_dead_time() {
    let dead_time = 200;
    let filter = EdgeFilter::new();
    filter.configure(EdgeFilterMode::DeadTime { dead_time_us: dead_time });

    // Deterministic jittered edge train, 0..400us apart
    let mut seed: u64 = 0x2545_F491;
    let mut now: u64 = 0;
    let mut accepted = Vec::new();
    for _ in 0..2_000 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        now += (seed >> 33) % 400;
        if filter.accept(now) {
            accepted.push(now);
        }
    }

    assert!(accepted.len() > 10);
    for pair in accepted.windows(2) {
        assert!(pair[1] - pair[0] >= dead_time, "edges {:?} too close", pair);
    }
}

#[test]
fn test_filter_configure_resets_clock() {
    let filter = EdgeFilter::new();
    filter.configure(EdgeFilterMode::DeadTime { dead_time_us: 200 });
    assert!(filter.accept(500));
    filter.configure(EdgeFilterMode::DeadTime { dead_time_us: 200 });
    assert!(filter.accept(510));
}

#[test]
fn test_filter_shared_between_lines() {
    let capture = configured_capture();
    assert_eq!(capture.on_edge(Line::D0, 0), EdgeOutcome::Recorded);
    assert_eq!(capture.on_edge(Line::D1, 100), EdgeOutcome::Filtered);
    assert_eq!(capture.assembler().bit_count(), 1);
}

// ============================================================================
// Tests for frame assembly
// ============================================================================

#[test]
fn test_capture_empty_poll_returns_none() {
    let capture = configured_capture();
    assert_eq!(capture.poll(1_000_000, timing()), None);
}

#[test]
fn test_capture_complete_frame_after_gap() {
    let capture = configured_capture();
    let raw = encode_26(12, 4242);
    let last = feed(&capture, raw, FRAME_BITS, 0);
    assert_eq!(capture.assembler().bit_count(), FRAME_BITS);

    // Exactly at the gap is still "in progress"
    assert_eq!(capture.poll(last + 20_000, timing()), None);
    assert_eq!(capture.assembler().bit_count(), FRAME_BITS);

    let event = capture.poll(last + 20_001, timing());
    assert_eq!(event, Some(FrameEvent::Complete(Frame::from_raw(raw))));
    assert_eq!(capture.assembler().bit_count(), 0);
    assert_eq!(capture.poll(last + 40_000, timing()), None);
}

#[test]
fn test_capture_partial_frame_abandoned() {
    let capture = configured_capture();
    let last = feed(&capture, 0x2AA_AAAA, 10, 0);

    assert_eq!(capture.poll(last + 20_001, timing()), None);
    assert_eq!(capture.poll(last + 200_000, timing()), None);
    assert_eq!(
        capture.poll(last + 200_001, timing()),
        Some(FrameEvent::Abandoned { bits: 10 })
    );
    assert_eq!(capture.assembler().bit_count(), 0);
}

#[test]
fn test_capture_partial_frame_kept_while_bits_arrive() {
    let capture = configured_capture();
    let mut now = 0;
    for _ in 0..20 {
        assert_eq!(capture.on_edge(Line::D0, now), EdgeOutcome::Recorded);
        assert_eq!(capture.poll(now + 1_000, timing()), None);
        now += 150_000;
    }
    assert_eq!(capture.assembler().bit_count(), 20);
}

#[test]
fn test_capture_full_frame_ignores_extra_edges() {
    let capture = configured_capture();
    let raw = encode_26(1, 2);
    let last = feed(&capture, raw, FRAME_BITS, 0);

    assert_eq!(capture.on_edge(Line::D1, last + 1_000), EdgeOutcome::Overrun);
    assert_eq!(capture.assembler().bit_count(), FRAME_BITS);

    // The overrun edge does not stamp the frame, so the gap counts from `last`
    let event = capture.poll(last + 20_001, timing());
    assert_eq!(event, Some(FrameEvent::Complete(Frame::from_raw(raw))));
}

#[test]
fn test_capture_full_frame_never_abandoned() {
    let capture = configured_capture();
    let raw = encode_26(3, 4);
    let last = feed(&capture, raw, FRAME_BITS, 0);
    let event = capture.poll(last + 5_000_000, timing());
    assert_eq!(event, Some(FrameEvent::Complete(Frame::from_raw(raw))));
}

#[test]
fn test_capture_back_to_back_frames() {
    let capture = configured_capture();
    let first = encode_26(10, 111);
    let second = encode_26(20, 222);

    let last = feed(&capture, first, FRAME_BITS, 0);
    assert_eq!(
        capture.poll(last + 25_000, timing()).map(|e| match e {
            FrameEvent::Complete(f) => f.card_id(),
            FrameEvent::Abandoned { .. } => CardId(0),
        }),
        Some(CardId(111))
    );

    let last = feed(&capture, second, FRAME_BITS, last + 500_000);
    assert_eq!(
        capture.poll(last + 25_000, timing()),
        Some(FrameEvent::Complete(Frame::from_raw(second)))
    );
}

#[test]
fn test_capture_bounce_does_not_add_bits() {
    let capture = configured_capture();
    let raw = encode_26(7, 7777);
    let mut now = 0;
    for i in 0..FRAME_BITS {
        let line = if (raw >> (FRAME_BITS - 1 - i)) & 1 == 1 { Line::D1 } else { Line::D0 };
        assert_eq!(capture.on_edge(line, now), EdgeOutcome::Recorded);
        // Contact bounce 50us later
        assert_eq!(capture.on_edge(line, now + 50), EdgeOutcome::Filtered);
        now += BIT_SPACING_US;
    }
    let event = capture.poll(now + 25_000, timing());
    assert_eq!(event, Some(FrameEvent::Complete(Frame::from_raw(raw))));
}

#[test]
fn test_capture_configure_drops_partial_frame() {
    let capture = configured_capture();
    feed(&capture, 0x3FF_FFFF, 5, 0);
    capture.configure(EdgeFilterMode::Disabled);
    assert_eq!(capture.assembler().bit_count(), 0);
    assert_eq!(capture.filter().mode(), EdgeFilterMode::Disabled);
}

#[test]
fn test_assembler_reset() {
    let assembler = FrameAssembler::new();
    assert!(assembler.record_bit(Line::D1, 10));
    assert!(assembler.record_bit(Line::D0, 20));
    assert_eq!(assembler.bit_count(), 2);
    assembler.reset();
    assert_eq!(assembler.bit_count(), 0);
}

#[test]
fn test_frame_timing_from_config() {
    let config = Config::default()
        .with_partial_timeout_ms(150)
        .with_complete_gap_ms(30);
    let timing = FrameTiming::from(&config);
    assert_eq!(timing.partial_timeout_us, 150_000);
    assert_eq!(timing.complete_gap_us, 30_000);
}

#[test]
fn test_frame_timing_saturates_oversized_values() {
    let config = Config::default()
        .with_partial_timeout_ms(u64::MAX)
        .with_complete_gap_ms(u64::MAX / 10);
    let timing = FrameTiming::from(&config);
    assert_eq!(timing.partial_timeout_us, u64::MAX);
    assert_eq!(timing.complete_gap_us, u64::MAX);
}
