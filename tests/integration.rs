use std::collections::BTreeMap;

use bit_scope::{
    analyze_transcript, bloom_efficiency, detect_balloon_pop, detect_seesaw, detect_topper,
    detect_trimming_opportunities, detect_word_smuggling, estimate_syllables, segment_by_pauses,
    AnalyzerConfig, BitSegment, RegexSentenceTokenizer, ServiceConfig, Transcript, WordToken,
    COMEDY_STYLES,
};

fn word(text: &str, start: f64, end: f64) -> WordToken {
    WordToken {
        text: text.to_string(),
        start,
        end: Some(end),
    }
}

fn text_transcript(text: &str) -> Transcript {
    Transcript {
        text: text.to_string(),
        words: Vec::new(),
    }
}

#[test]
fn syllable_estimates_cover_edge_cases() {
    assert_eq!(estimate_syllables(""), 0);
    assert_eq!(estimate_syllables("a"), 1);
    assert_eq!(estimate_syllables("123"), 1);
    assert_eq!(estimate_syllables("?!"), 1);
    assert!(estimate_syllables("rhythm") >= 1);
    for w in ["comedy", "punchline", "mic", "audience", "heckler"] {
        assert!(
            estimate_syllables(w) >= 1,
            "nonempty word {w:?} must never estimate to 0"
        );
    }
}

#[test]
fn pause_segmentation_splits_on_long_gaps() {
    let transcript = Transcript {
        text: "why is it".to_string(),
        words: vec![
            word("why", 0.0, 400.0),
            word("is", 500.0, 900.0),
            word("it", 3000.0, 3400.0),
        ],
    };
    let segments = segment_by_pauses(&transcript, 1.5, None);
    assert_eq!(segments.len(), 2, "only the 2100ms gap should split");
    assert_eq!(segments[0].text, "why is");
    assert!((segments[0].start_time - 0.0).abs() < 1e-9);
    assert!((segments[0].end_time - 0.9).abs() < 1e-9);
    assert_eq!(segments[1].text, "it");
    assert!((segments[1].start_time - 3.0).abs() < 1e-9);
    assert!((segments[1].end_time - 3.4).abs() < 1e-9);
}

#[test]
fn sentence_segmentation_without_timestamps() {
    let transcript = text_transcript("Why is it hot. I melted.");
    let segments = segment_by_pauses(&transcript, 1.5, None);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].text, "Why is it hot");
    assert_eq!(segments[0].start_time, 0.0);
    assert_eq!(segments[0].end_time, 0.0);
    assert!(segments[0].syllable_count > 0);
}

#[test]
fn empty_transcript_produces_empty_report() {
    let report = analyze_transcript(&Transcript::default(), &AnalyzerConfig::default());
    assert!(report.segments.is_empty());
    assert_eq!(report.overall_statistics.total_segments, 0);
    assert_eq!(report.overall_statistics.total_syllables, 0);
    assert!(report.overall_statistics.most_common_styles.is_empty());
}

#[test]
fn word_alias_and_missing_fields_are_tolerated() {
    let transcript: Transcript = serde_json::from_value(serde_json::json!({
        "words": [
            { "word": "hello", "start": 0 },
            { "word": "there", "start": 200, "end": 600 }
        ]
    }))
    .unwrap();
    let segments = segment_by_pauses(&transcript, 1.5, None);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "hello there");
    assert!((segments[0].end_time - 0.6).abs() < 1e-9);

    let empty: Transcript = serde_json::from_str("{}").unwrap();
    assert!(empty.text.is_empty());
    assert!(empty.words.is_empty());
}

#[test]
fn analysis_is_deterministic() {
    let transcript = text_transcript(
        "One time I went to the supermarket and the cart had a broken wheel. \
         The supermarket cart kept steering me into strangers. \
         I think this joke is, like, really very good.",
    );
    let config = AnalyzerConfig::default();
    let first = serde_json::to_string(&analyze_transcript(&transcript, &config)).unwrap();
    let second = serde_json::to_string(&analyze_transcript(&transcript, &config)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn topper_requires_at_least_two_shared_premise_words() {
    let previous = "I went to the supermarket yesterday";
    assert!(!detect_topper(
        "The supermarket was closed completely",
        Some(previous)
    ));

    let previous = "I went to the supermarket yesterday evening";
    assert!(detect_topper(
        "The supermarket was closed yesterday evening",
        Some(previous)
    ));

    assert!(!detect_topper("The supermarket was closed", None));
}

#[test]
fn balloon_pop_needs_a_reveal_after_the_buildup() {
    assert!(detect_balloon_pop(
        "wait, I thought this was my coat, but it was nothing like mine"
    ));
    assert!(!detect_balloon_pop("nothing happened today"));
    assert!(!detect_balloon_pop(""));
}

#[test]
fn word_smuggling_looks_for_consecutive_meaty_words() {
    assert!(detect_word_smuggling(
        "He ordered seventeen pancakes immediately",
        None
    ));
    assert!(!detect_word_smuggling("I am so mad. It is big.", None));
    assert!(!detect_word_smuggling("Too short.", None));
}

#[test]
fn seesaw_needs_a_sentence_tokenizer() {
    let text =
        "I spent four years studying philosophy with expensive professors at a famous university. \
         It was useless.";
    assert!(!detect_seesaw(text, None), "unsupported without a tokenizer");
    assert!(detect_seesaw(text, Some(&RegexSentenceTokenizer)));

    // Single sentence has no setup/punchline split.
    assert!(!detect_seesaw(
        "Just one sentence here",
        Some(&RegexSentenceTokenizer)
    ));
}

#[test]
fn trimming_surfaces_fillers_redundancy_and_qualifiers() {
    let suggestions =
        detect_trimming_opportunities("I think this joke is, like, really very good");
    assert!(suggestions.contains(&"Remove filler: 'like'".to_string()));
    assert!(suggestions.contains(&"Consider removing qualifier: 'I think'".to_string()));
    assert!(
        suggestions.iter().any(|s| s.starts_with("Trim redundant:")),
        "'really very' should be flagged as redundant"
    );
    assert!(detect_trimming_opportunities("").is_empty());
}

#[test]
fn style_scores_cover_the_full_vocabulary() {
    let transcript = text_transcript("Why is it hot. I melted. People are strange.");
    let report = analyze_transcript(&transcript, &AnalyzerConfig::default());
    assert!(!report.segments.is_empty());
    for segment in &report.segments {
        assert_eq!(segment.style_scores.len(), COMEDY_STYLES.len());
        for style in COMEDY_STYLES {
            let score = segment.style_scores.get(style).copied().unwrap();
            assert!(
                (0.0..=1.0).contains(&score),
                "score for {style} out of range: {score}"
            );
        }
    }
}

#[test]
fn keyword_classifier_ranks_matching_styles() {
    let transcript = text_transcript(
        "One time I went to the store, remember the story that happened when I was young",
    );
    let report = analyze_transcript(&transcript, &AnalyzerConfig::default());
    let segment = &report.segments[0];
    assert!(segment.style_scores["Anecdotal"] > 0.3);
    assert_eq!(segment.styles.first().map(String::as_str), Some("Anecdotal"));
}

#[test]
fn timestamped_analysis_counts_toppers() {
    let mut words = Vec::new();
    for (i, w) in ["my", "landlord", "raised", "the", "rent", "yesterday"]
        .into_iter()
        .enumerate()
    {
        let start = i as f64 * 400.0;
        words.push(word(w, start, start + 300.0));
    }
    for (i, w) in ["my", "landlord", "raised", "the", "rent", "again"]
        .into_iter()
        .enumerate()
    {
        let start = 6000.0 + i as f64 * 400.0;
        words.push(word(w, start, start + 300.0));
    }
    let transcript = Transcript {
        text: String::new(),
        words,
    };
    let report = analyze_transcript(&transcript, &AnalyzerConfig::default());
    assert_eq!(report.overall_statistics.total_segments, 2);
    assert!(!report.segments[0].topper_detected);
    assert!(report.segments[1].topper_detected);
    assert_eq!(report.overall_statistics.topper_detections, 1);
    assert!(report.overall_statistics.most_common_styles.len() <= 5);
}

#[test]
fn unreachable_service_falls_back_to_keyword_scoring() {
    let transcript = text_transcript("One time I went to the store. The story people remember.");

    let keyword_report = analyze_transcript(&transcript, &AnalyzerConfig::default());

    let remote_config = AnalyzerConfig {
        service: Some(ServiceConfig {
            api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: "test-key".to_string(),
            timeout_secs: 2,
            ..ServiceConfig::default()
        }),
        ..AnalyzerConfig::default()
    };
    let remote_report = analyze_transcript(&transcript, &remote_config);

    assert_eq!(
        serde_json::to_string(&keyword_report).unwrap(),
        serde_json::to_string(&remote_report).unwrap(),
        "remote failure must degrade to the keyword fallback"
    );
}

#[test]
fn bloom_efficiency_is_laughs_per_syllable() {
    let transcript = text_transcript("Why is it hot. I melted.");
    let segments = segment_by_pauses(&transcript, 1.5, None);
    assert_eq!(segments[0].syllable_count, 4);
    assert!((bloom_efficiency(&segments[0], 2) - 0.5).abs() < 1e-9);

    let empty = BitSegment {
        text: String::new(),
        start_time: 0.0,
        end_time: 0.0,
        styles: Vec::new(),
        style_scores: BTreeMap::new(),
        seesaw_detected: false,
        balloon_pop_detected: false,
        word_smuggling_detected: false,
        topper_detected: false,
        trimming_opportunities: Vec::new(),
        syllable_count: 0,
        bloom_efficiency_score: None,
    };
    assert_eq!(bloom_efficiency(&empty, 3), 0.0);
}
