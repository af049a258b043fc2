//! End-to-end laws of the text → audio pipeline.

use chatmorse::audio::synth::ToneParams;
use chatmorse::error::ChatMorseError;
use chatmorse::morse::encoder::{Mark, encode};
use chatmorse::morse::table::Symbol;
use chatmorse::morse::timeline::Beat;
use chatmorse::pipeline::MorsePipeline;
use std::time::Duration;

fn pipeline(dot_ms: u64, sample_rate: u32) -> MorsePipeline {
    MorsePipeline::new(ToneParams {
        frequency_hz: 650.0,
        dot_duration: Duration::from_millis(dot_ms),
        sample_rate,
        volume: 0.5,
    })
}

#[test]
fn sos_has_exact_patterns() {
    let encoded = encode("sos");
    let patterns: Vec<Vec<Symbol>> = encoded
        .marks()
        .iter()
        .map(|mark| match mark {
            Mark::Letter(p) => p.symbols().to_vec(),
            Mark::WordBreak => panic!("No word break expected in 'sos'"),
        })
        .collect();

    use Symbol::{Dash, Dot};
    assert_eq!(
        patterns,
        vec![vec![Dot, Dot, Dot], vec![Dash, Dash, Dash], vec![Dot, Dot, Dot]]
    );
    assert_eq!(encoded.to_string(), "... --- ...");
}

#[test]
fn sos_sos_is_68_beats() {
    let rendered = pipeline(40, 44100).render("SOS SOS").unwrap();
    assert_eq!(rendered.timeline.len(), 68);
    assert_eq!(rendered.timeline.tone_units(), 2 * (3 + 9 + 3));
    assert_eq!(
        rendered.timeline.beats().last(),
        Some(&Beat::Silence),
        "Timeline should end with the word gap"
    );
}

#[test]
fn sample_count_law_holds_for_odd_rates() {
    for (dot_ms, rate) in [(40, 44100), (33, 22050), (17, 8000), (1, 48000)] {
        let p = pipeline(dot_ms, rate);
        let per_unit = p.params().samples_per_unit();
        for text in ["e", "paris", "hello world", "73 de n0call"] {
            let rendered = p.render(text).unwrap();
            assert_eq!(
                rendered.waveform.len(),
                rendered.timeline.len() * per_unit,
                "Sample count law broken for {:?} at {} ms / {} Hz",
                text,
                dot_ms,
                rate
            );
        }
    }
}

#[test]
fn unknown_characters_are_dropped() {
    let p = pipeline(40, 8000);
    let noisy = p.render("s!o?s 🎉").unwrap();
    let clean = p.render("sos").unwrap();
    assert_eq!(noisy.encoded, clean.encoded);
    assert_eq!(noisy.waveform, clean.waveform);
}

#[test]
fn empty_and_unencodable_input_gives_empty_everything() {
    let p = pipeline(40, 44100);
    for text in ["", "   ", "!?#", "🎉🎉"] {
        let rendered = p.render(text).unwrap();
        assert!(rendered.encoded.is_empty(), "encoded not empty for {:?}", text);
        assert!(rendered.timeline.is_empty(), "timeline not empty for {:?}", text);
        assert!(rendered.waveform.is_empty(), "waveform not empty for {:?}", text);
    }
}

#[test]
fn waveform_stays_within_volume() {
    let rendered = pipeline(10, 8000).render("paris").unwrap();
    let peak = rendered
        .waveform
        .samples()
        .iter()
        .fold(0.0f32, |acc, s| acc.max(s.abs()));
    assert!((peak - 0.5).abs() < f32::EPSILON, "peak was {}", peak);
}

#[test]
fn invalid_tone_is_rejected_for_any_text() {
    let p = MorsePipeline::new(ToneParams {
        frequency_hz: 0.0,
        ..ToneParams::default()
    });
    assert!(matches!(
        p.render("sos"),
        Err(ChatMorseError::InvalidParameter { .. })
    ));
}
