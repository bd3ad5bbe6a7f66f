use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// One word of a transcript with millisecond timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct WordToken {
    #[serde(alias = "word", default)]
    pub text: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
}

impl WordToken {
    fn end_ms(&self) -> f64 {
        self.end.unwrap_or(self.start)
    }
}

/// Transcript input: raw text plus an optional word-level timing track.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<WordToken>,
}

/// A single bit: one pause-bounded (or sentence-bounded) unit of the set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BitSegment {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub styles: Vec<String>,
    pub style_scores: BTreeMap<String, f64>,
    pub seesaw_detected: bool,
    pub balloon_pop_detected: bool,
    pub word_smuggling_detected: bool,
    pub topper_detected: bool,
    pub trimming_opportunities: Vec<String>,
    pub syllable_count: usize,
    /// Laughs per syllable. Requires a laugh-count signal, which the
    /// transcript format does not carry, so the pipeline leaves it unset.
    pub bloom_efficiency_score: Option<f64>,
}

impl BitSegment {
    fn new(text: String, start_time: f64, end_time: f64, syllable_count: usize) -> Self {
        Self {
            text,
            start_time,
            end_time,
            styles: Vec::new(),
            style_scores: BTreeMap::new(),
            seesaw_detected: false,
            balloon_pop_detected: false,
            word_smuggling_detected: false,
            topper_detected: false,
            trimming_opportunities: Vec::new(),
            syllable_count,
            bloom_efficiency_score: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStatistics {
    pub total_segments: usize,
    pub total_syllables: usize,
    pub most_common_styles: Vec<(String, usize)>,
    pub seesaw_detections: usize,
    pub balloon_pop_detections: usize,
    pub word_smuggling_detections: usize,
    pub topper_detections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub segments: Vec<BitSegment>,
    pub overall_statistics: OverallStatistics,
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Hyperparameters {
    default_pause_threshold_secs: f64,
    style_confidence_threshold: f64,
    keyword_match_weight: f64,
    keyword_words_basis: f64,
    top_style_count: usize,
    seesaw_ratio_threshold: f64,
    smuggle_min_sentence_words: usize,
    smuggle_min_word_len: usize,
    smuggle_max_word_len: usize,
    topper_min_word_chars: usize,
    topper_overlap_threshold: f64,
    topper_min_shared_words: usize,
    remote_temperature: f64,
    remote_max_tokens: u32,
    default_remote_timeout_secs: u64,
}

static HP: Hyperparameters = Hyperparameters {
    default_pause_threshold_secs: 1.5,
    style_confidence_threshold: 0.3,
    keyword_match_weight: 1.5,
    keyword_words_basis: 10.0,
    top_style_count: 5,
    seesaw_ratio_threshold: 0.7,
    smuggle_min_sentence_words: 3,
    smuggle_min_word_len: 5,
    smuggle_max_word_len: 10,
    topper_min_word_chars: 4,
    topper_overlap_threshold: 0.3,
    topper_min_shared_words: 2,
    remote_temperature: 0.3,
    remote_max_tokens: 500,
    default_remote_timeout_secs: 10,
};

// ---------------------------------------------------------------------------
// Style vocabulary
// ---------------------------------------------------------------------------

pub const COMEDY_STYLES: [&str; 18] = [
    "Anecdotal",
    "Clowning",
    "Edgy",
    "Fantastical",
    "Heartfelt",
    "Observational",
    "Opinionated",
    "Playful",
    "Puns",
    "Philosophical",
    "Sarcasm",
    "Satire",
    "Self-deprecation",
    "Shock",
    "Superiority",
    "Surrealism",
    "Tragedy",
    "Wordplay",
];

static STYLE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Anecdotal",
        &["story", "happened", "one time", "remember", "when i", "told me", "went to"],
    ),
    (
        "Clowning",
        &["silly", "ridiculous", "absurd", "goofy", "funny", "weird", "strange"],
    ),
    (
        "Edgy",
        &["damn", "hell", "fuck", "shit", "controversial", "offensive", "dark"],
    ),
    (
        "Fantastical",
        &["imagine", "magic", "fantasy", "dream", "unreal", "impossible"],
    ),
    (
        "Heartfelt",
        &["love", "family", "heart", "feelings", "emotion", "touching"],
    ),
    (
        "Observational",
        &["notice", "did you ever", "what is it with", "why is it", "people"],
    ),
    (
        "Opinionated",
        &["think", "believe", "opinion", "should", "wrong", "right", "stupid"],
    ),
    (
        "Playful",
        &["play", "fun", "joke", "teasing", "banter", "cheeky", "witty"],
    ),
    ("Puns", &["pun", "play on words", "double meaning", "wordplay"]),
    (
        "Philosophical",
        &["meaning", "life", "exist", "universe", "reality", "truth", "deep"],
    ),
    (
        "Sarcasm",
        &["yeah right", "sure", "obviously", "totally", "great", "perfect"],
    ),
    (
        "Satire",
        &["society", "politics", "government", "system", "mock", "parody"],
    ),
    (
        "Self-deprecation",
        &["i'm so", "i'm terrible", "i suck", "i'm bad", "pathetic", "loser"],
    ),
    (
        "Shock",
        &["what the", "holy", "unbelievable", "incredible", "amazing", "wow"],
    ),
    (
        "Superiority",
        &["better than", "smarter", "above", "superior", "i'm better"],
    ),
    (
        "Surrealism",
        &["surreal", "dreamlike", "bizarre", "abstract", "unrealistic"],
    ),
    (
        "Tragedy",
        &["sad", "tragic", "depressing", "miserable", "unfortunate", "suffering"],
    ),
    (
        "Wordplay",
        &["word", "pun", "double", "meaning", "play on", "clever", "wit"],
    ),
];

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static VOWEL_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[aeiou]+").unwrap());

static DIPHTHONG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[aeiou]{2}").unwrap());

static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").unwrap());

static BUILDUP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(so|then|and|but|until|when|suddenly)\s+[^.!?]{10,}").unwrap(),
        Regex::new(r"(turns out|actually|really|just|only)").unwrap(),
        Regex::new(r"(wait|hold on|no way|you know what)").unwrap(),
    ]
});

static REVEAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b(just|only|actually|really|turns out|but|however)\b").unwrap(),
        Regex::new(r"\b(not|never|no|nobody|nothing)\b").unwrap(),
        Regex::new(r"\b(was|is|are|were)\s+\w+ing").unwrap(),
    ]
});

static REDUNDANCY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b(really|very|pretty|quite)\s+(really|very|pretty|quite)\s+").unwrap(),
        Regex::new(r"\b(kind of|sort of)\s+\w+").unwrap(),
    ]
});

static JSON_OBJECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]+\}").unwrap());

static FILLER_WORDS: &[&str] = &[
    "like", "you know", "um", "uh", "actually", "basically", "literally", "really", "very",
    "pretty", "quite", "sort of", "kind of", "I mean",
];

static QUALIFIER_PHRASES: &[&str] =
    &["I think", "I guess", "I suppose", "maybe", "perhaps", "probably"];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Sentence-boundary capability. A linguistic tokenizer can be plugged in
/// here; [`RegexSentenceTokenizer`] is the built-in punctuation splitter.
pub trait SentenceTokenizer {
    fn split(&self, text: &str) -> Vec<String>;
}

/// Splits on runs of `.`, `!`, `?` followed by whitespace.
pub struct RegexSentenceTokenizer;

impl SentenceTokenizer for RegexSentenceTokenizer {
    fn split(&self, text: &str) -> Vec<String> {
        fallback_split_sentences(text)
    }
}

/// Remote style-classification endpoint (OpenAI-compatible chat completion).
#[derive(Clone)]
pub struct ServiceConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: HP.default_remote_timeout_secs,
        }
    }
}

pub struct AnalyzerConfig {
    /// Minimum silence between words, in seconds, that starts a new bit.
    pub pause_threshold_secs: f64,
    pub tokenizer: Option<Box<dyn SentenceTokenizer>>,
    pub service: Option<ServiceConfig>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            pause_threshold_secs: HP.default_pause_threshold_secs,
            tokenizer: None,
            service: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of the remote classification call. Never escapes the crate:
/// the classifier logs it and falls back to keyword scoring.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to classification service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classification service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed classification response: {0}")]
    Malformed(&'static str),
}

// ---------------------------------------------------------------------------
// Syllable estimation
// ---------------------------------------------------------------------------

fn letters_only(word: &str) -> String {
    word.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

/// Estimate the syllable count of a single word from its vowel runs,
/// with silent-e and diphthong corrections. Nonempty input never maps
/// to zero, so per-syllable ratios downstream stay divide-safe.
pub fn estimate_syllables(word: &str) -> usize {
    if word.is_empty() {
        return 0;
    }
    let trimmed = word.trim();
    if trimmed.is_empty() {
        return 1;
    }

    let stripped = letters_only(trimmed);
    if stripped.len() <= 2 {
        return 1;
    }

    let mut count = VOWEL_RUN_RE.find_iter(&stripped).count() as i64;

    if stripped.ends_with('e') && count > 1 {
        count -= 1;
    }

    // Non-overlapping vowel pairs; a four-vowel run contributes two.
    let diphthongs = DIPHTHONG_RE.find_iter(&stripped).count() as i64;
    if diphthongs > 0 {
        count = (count - diphthongs + 1).max(1);
    }

    count.max(1) as usize
}

fn syllables_in_text(text: &str) -> usize {
    text.split_whitespace().map(estimate_syllables).sum()
}

// ---------------------------------------------------------------------------
// Sentence splitting
// ---------------------------------------------------------------------------

fn fallback_split_sentences(text: &str) -> Vec<String> {
    SENTENCE_SPLIT_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_sentences(text: &str, tokenizer: Option<&dyn SentenceTokenizer>) -> Vec<String> {
    match tokenizer {
        Some(t) => t
            .split(text)
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => fallback_split_sentences(text),
    }
}

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

/// Split a transcript into bits. With word timestamps, a new bit starts at
/// every inter-word gap of at least `pause_threshold_secs`; without them,
/// each sentence-like unit becomes a bit with zeroed timestamps.
pub fn segment_by_pauses(
    transcript: &Transcript,
    pause_threshold_secs: f64,
    tokenizer: Option<&dyn SentenceTokenizer>,
) -> Vec<BitSegment> {
    if transcript.words.is_empty() {
        return split_sentences(&transcript.text, tokenizer)
            .into_iter()
            .map(|sentence| {
                let syllable_count = syllables_in_text(&sentence);
                BitSegment::new(sentence, 0.0, 0.0, syllable_count)
            })
            .collect();
    }

    let mut segments = Vec::new();
    let mut group: Vec<&WordToken> = Vec::new();
    let mut last_end_secs: Option<f64> = None;

    for word in &transcript.words {
        let start_secs = word.start / 1000.0;
        if let Some(last_end) = last_end_secs {
            if start_secs - last_end >= pause_threshold_secs && !group.is_empty() {
                segments.push(segment_from_group(&group));
                group.clear();
            }
        }
        group.push(word);
        last_end_secs = Some(word.end_ms() / 1000.0);
    }

    if !group.is_empty() {
        segments.push(segment_from_group(&group));
    }

    segments
}

fn segment_from_group(group: &[&WordToken]) -> BitSegment {
    let text = group
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let start_time = group.first().map(|w| w.start / 1000.0).unwrap_or(0.0);
    let end_time = group.last().map(|w| w.end_ms() / 1000.0).unwrap_or(0.0);
    let syllable_count = group.iter().map(|w| estimate_syllables(&w.text)).sum();
    BitSegment::new(text, start_time, end_time, syllable_count)
}

// ---------------------------------------------------------------------------
// Structural pattern detectors
// ---------------------------------------------------------------------------

/// Seesaw: the punchline should be substantially shorter than its setup.
/// Needs a sentence tokenizer to find the setup/punchline split; without
/// one the signal is unsupported and reports `false`.
pub fn detect_seesaw(text: &str, tokenizer: Option<&dyn SentenceTokenizer>) -> bool {
    let Some(tokenizer) = tokenizer else {
        return false;
    };

    let sentences = split_sentences(text, Some(tokenizer));
    if sentences.len() < 2 {
        return false;
    }

    let setup = sentences[..sentences.len() - 1].join(" ");
    let punchline = &sentences[sentences.len() - 1];

    let setup_syllables = syllables_in_text(&setup);
    let punchline_syllables = syllables_in_text(punchline);

    if setup_syllables > 0 && punchline_syllables > 0 {
        let ratio = punchline_syllables as f64 / setup_syllables as f64;
        return ratio < HP.seesaw_ratio_threshold;
    }
    false
}

/// Balloon pop: tension builds, then releases. Fires when some buildup
/// phrase ends before some reveal phrase starts.
pub fn detect_balloon_pop(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();

    let mut buildup_ends = Vec::new();
    for pattern in BUILDUP_PATTERNS.iter() {
        for m in pattern.find_iter(&lower) {
            buildup_ends.push(m.end());
        }
    }

    let mut reveal_starts = Vec::new();
    for pattern in REVEAL_PATTERNS.iter() {
        for m in pattern.find_iter(&lower) {
            reveal_starts.push(m.start());
        }
    }

    buildup_ends
        .iter()
        .any(|&build| reveal_starts.iter().any(|&reveal| reveal > build))
}

/// Word smuggling: a punch-word buried inside a casual closing sentence,
/// approximated by two consecutive meaty words in the last sentence.
pub fn detect_word_smuggling(text: &str, tokenizer: Option<&dyn SentenceTokenizer>) -> bool {
    if text.is_empty() {
        return false;
    }

    let sentences = split_sentences(text, tokenizer);
    let Some(last) = sentences.last() else {
        return false;
    };

    let words: Vec<&str> = last.split_whitespace().collect();
    if words.len() < HP.smuggle_min_sentence_words {
        return false;
    }

    let meaty = |w: &str| {
        let len = letters_only(w).len();
        (HP.smuggle_min_word_len..=HP.smuggle_max_word_len).contains(&len)
    };
    words.windows(2).any(|pair| meaty(pair[0]) && meaty(pair[1]))
}

fn premise_words(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .filter(|w| {
            w.chars().count() > HP.topper_min_word_chars && w.chars().all(char::is_alphabetic)
        })
        .map(|w| w.to_lowercase())
        .collect()
}

/// Topper: a follow-up joke riding the previous bit's premise, detected
/// as significant key-word overlap with the preceding segment.
pub fn detect_topper(text: &str, previous_text: Option<&str>) -> bool {
    let previous = match previous_text {
        Some(p) if !p.is_empty() => p,
        _ => return false,
    };
    if text.is_empty() {
        return false;
    }

    let current_words = premise_words(text);
    let previous_words = premise_words(previous);

    let overlap = current_words.intersection(&previous_words).count();
    let denominator = current_words.len().min(previous_words.len()).max(1);
    let overlap_ratio = overlap as f64 / denominator as f64;

    overlap_ratio > HP.topper_overlap_threshold && overlap >= HP.topper_min_shared_words
}

/// Trimming: fillers, stacked intensifiers, and hedging qualifiers that
/// spend syllables without buying laughs. One suggestion per find, in
/// filler / redundancy / qualifier order.
pub fn detect_trimming_opportunities(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let lower = text.to_lowercase();
    let mut opportunities = Vec::new();

    for filler in FILLER_WORDS {
        if lower.contains(&filler.to_lowercase()) {
            opportunities.push(format!("Remove filler: '{filler}'"));
        }
    }

    for pattern in REDUNDANCY_PATTERNS.iter() {
        for m in pattern.find_iter(&lower) {
            opportunities.push(format!("Trim redundant: '{}'", m.as_str()));
        }
    }

    for qualifier in QUALIFIER_PHRASES {
        if lower.contains(&qualifier.to_lowercase()) {
            opportunities.push(format!("Consider removing qualifier: '{qualifier}'"));
        }
    }

    opportunities
}

// ---------------------------------------------------------------------------
// Style classification
// ---------------------------------------------------------------------------

fn classify_styles_keyword(bit_text: &str) -> BTreeMap<String, f64> {
    let lower = bit_text.to_lowercase();
    let word_count = lower.split_whitespace().count();
    let basis = (word_count as f64 / HP.keyword_words_basis).max(1.0);

    let mut scores = BTreeMap::new();
    for (style, keywords) in STYLE_KEYWORDS {
        let matches = keywords.iter().filter(|k| lower.contains(*k)).count();
        let score = (matches as f64 * HP.keyword_match_weight / basis).min(1.0);
        scores.insert((*style).to_string(), score);
    }
    scores
}

fn top_styles(scores: &BTreeMap<String, f64>) -> Vec<String> {
    let mut ranked: Vec<(&str, f64)> = COMEDY_STYLES
        .iter()
        .map(|style| (*style, scores.get(*style).copied().unwrap_or(0.0)))
        .collect();
    // Stable sort keeps vocabulary order among ties.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .filter(|(_, score)| *score > HP.style_confidence_threshold)
        .map(|(style, _)| style.to_string())
        .collect()
}

pub struct RemoteClassifier {
    client: reqwest::blocking::Client,
    config: ServiceConfig,
}

impl RemoteClassifier {
    fn new(config: ServiceConfig) -> Result<Self, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn classify(&self, bit_text: &str) -> Result<BTreeMap<String, f64>, RemoteError> {
        let styles = COMEDY_STYLES.join(", ");
        let prompt = format!(
            "Analyze this comedy bit and classify which comedy styles apply.\n\
             Rate each style from 0.0 to 1.0 based on how strongly it applies.\n\n\
             Comedy Bit: \"{bit_text}\"\n\n\
             Available Styles: {styles}\n\n\
             Respond with a JSON object where keys are style names and values are scores (0.0-1.0).\n\
             Example: {{\"Observational\": 0.9, \"Sarcasm\": 0.7, \"Self-deprecation\": 0.5}}\n"
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an expert comedy analyst. Return only valid JSON."
                },
                { "role": "user", "content": prompt }
            ],
            "temperature": HP.remote_temperature,
            "max_tokens": HP.remote_max_tokens,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }

        let payload: serde_json::Value = response.json()?;
        let content = payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or(RemoteError::Malformed("missing message content"))?;

        let object = JSON_OBJECT_RE
            .find(content)
            .ok_or(RemoteError::Malformed("no JSON object in content"))?;
        let raw: HashMap<String, f64> = serde_json::from_str(object.as_str())
            .map_err(|_| RemoteError::Malformed("content is not a style-score object"))?;

        // Unknown styles are dropped; missing ones score 0.
        let mut scores = BTreeMap::new();
        for style in COMEDY_STYLES {
            let value = raw.get(style).copied().unwrap_or(0.0);
            scores.insert(style.to_string(), value.clamp(0.0, 1.0));
        }
        Ok(scores)
    }
}

/// Bit text to style-score mapping, either via a remote service or via
/// deterministic keyword scoring. Remote failures degrade to keywords.
pub enum StyleClassifier {
    Keyword,
    Remote(RemoteClassifier),
}

impl StyleClassifier {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        match &config.service {
            Some(service) => match RemoteClassifier::new(service.clone()) {
                Ok(remote) => StyleClassifier::Remote(remote),
                Err(err) => {
                    log::warn!("could not build remote classifier ({err}), using keyword scoring");
                    StyleClassifier::Keyword
                }
            },
            None => StyleClassifier::Keyword,
        }
    }

    /// Always returns a score in [0, 1] for every style in the vocabulary.
    pub fn classify(&self, bit_text: &str) -> BTreeMap<String, f64> {
        match self {
            StyleClassifier::Keyword => classify_styles_keyword(bit_text),
            StyleClassifier::Remote(remote) => match remote.classify(bit_text) {
                Ok(scores) => scores,
                Err(err) => {
                    log::warn!("remote classification failed ({err}), falling back to keywords");
                    classify_styles_keyword(bit_text)
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Bloom efficiency
// ---------------------------------------------------------------------------

/// Laughs per syllable. The laugh count must come from outside the
/// transcript, so the analysis pipeline itself never fills this in.
pub fn bloom_efficiency(segment: &BitSegment, laugh_count: usize) -> f64 {
    if segment.syllable_count == 0 {
        return 0.0;
    }
    laugh_count as f64 / segment.syllable_count as f64
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze_transcript(transcript: &Transcript, config: &AnalyzerConfig) -> AnalysisReport {
    let classifier = StyleClassifier::from_config(config);
    let tokenizer = config.tokenizer.as_deref();

    let mut segments = segment_by_pauses(transcript, config.pause_threshold_secs, tokenizer);
    log::debug!("segmented transcript into {} bits", segments.len());

    // The topper detector needs the previous bit's text, so segments are
    // analyzed strictly in order.
    let mut previous_text: Option<String> = None;
    for segment in &mut segments {
        let scores = classifier.classify(&segment.text);
        segment.styles = top_styles(&scores);
        segment.style_scores = scores;

        segment.seesaw_detected = detect_seesaw(&segment.text, tokenizer);
        segment.balloon_pop_detected = detect_balloon_pop(&segment.text);
        segment.word_smuggling_detected = detect_word_smuggling(&segment.text, tokenizer);
        segment.topper_detected = detect_topper(&segment.text, previous_text.as_deref());
        segment.trimming_opportunities = detect_trimming_opportunities(&segment.text);

        previous_text = Some(segment.text.clone());
    }

    let overall_statistics = summarize(&segments);
    AnalysisReport {
        segments,
        overall_statistics,
    }
}

fn summarize(segments: &[BitSegment]) -> OverallStatistics {
    let mut style_counts: Vec<(String, usize)> = Vec::new();
    for segment in segments {
        for style in &segment.styles {
            match style_counts.iter_mut().find(|(s, _)| s == style) {
                Some((_, count)) => *count += 1,
                None => style_counts.push((style.clone(), 1)),
            }
        }
    }
    // Stable sort: ties keep first-encountered order.
    style_counts.sort_by(|a, b| b.1.cmp(&a.1));
    style_counts.truncate(HP.top_style_count);

    OverallStatistics {
        total_segments: segments.len(),
        total_syllables: segments.iter().map(|s| s.syllable_count).sum(),
        most_common_styles: style_counts,
        seesaw_detections: segments.iter().filter(|s| s.seesaw_detected).count(),
        balloon_pop_detections: segments.iter().filter(|s| s.balloon_pop_detected).count(),
        word_smuggling_detections: segments
            .iter()
            .filter(|s| s.word_smuggling_detected)
            .count(),
        topper_detections: segments.iter().filter(|s| s.topper_detected).count(),
    }
}
