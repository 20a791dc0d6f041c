//! UTF-8 text generators for benchmarking and testing.
//!
//! Every generator emits valid UTF-8 of exactly the requested size (padding
//! with ASCII where the last piece would not fit). [`corrupt`] then injects
//! invalid sequences at known offsets.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pattern types for UTF-8 text generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Pattern {
    /// Pure ASCII (7-bit, single-byte sequences)
    Ascii,
    /// Latin accented words (2-byte sequences)
    Latin,
    /// Greek and Cyrillic (2-byte sequences)
    GreekCyrillic,
    /// Chinese/Japanese/Korean (3-byte sequences)
    Cjk,
    /// Emoji and symbols (4-byte sequences)
    Emoji,
    /// Mixed realistic content (prose with occasional non-ASCII)
    Mixed,
    /// Uniform mix of all sequence lengths (1-4 bytes)
    AllLengths,
    /// Edge code points placed across every block boundary offset
    Boundary,
    /// Pathological: maximum multi-byte density
    Pathological,
}

impl Utf8Pattern {
    pub const ALL: [Utf8Pattern; 9] = [
        Utf8Pattern::Ascii,
        Utf8Pattern::Latin,
        Utf8Pattern::GreekCyrillic,
        Utf8Pattern::Cjk,
        Utf8Pattern::Emoji,
        Utf8Pattern::Mixed,
        Utf8Pattern::AllLengths,
        Utf8Pattern::Boundary,
        Utf8Pattern::Pathological,
    ];

    /// Name used for directories and reports.
    pub fn name(self) -> &'static str {
        match self {
            Utf8Pattern::Ascii => "ascii",
            Utf8Pattern::Latin => "latin",
            Utf8Pattern::GreekCyrillic => "greek_cyrillic",
            Utf8Pattern::Cjk => "cjk",
            Utf8Pattern::Emoji => "emoji",
            Utf8Pattern::Mixed => "mixed",
            Utf8Pattern::AllLengths => "all_lengths",
            Utf8Pattern::Boundary => "boundary",
            Utf8Pattern::Pathological => "pathological",
        }
    }
}

const SENTENCES: &[&str] = &[
    "The quick brown fox jumps over the lazy dog.",
    "Pack my box with five dozen liquor jugs.",
    "How vexingly quick daft zebras jump!",
    "Sphinx of black quartz, judge my vow.",
    "Validation must reject overlong and surrogate encodings.",
    "Every block is checked against a table of legal byte ranges.",
];

const LATIN: &[&str] = &[
    "café", "résumé", "naïve", "über", "façade", "jalapeño", "señor", "mañana", "Ångström",
    "smörgåsbord", "Müller", "Größe", "Köln", "Zürich", "Ærø", "Øresund", "Łódź", "Kraków",
];

const GREEK_CYRILLIC: &[&str] = &[
    "άλφα", "βήτα", "γάμμα", "δέλτα", "λάμβδα", "ωμέγα", "Αθήνα", "Москва", "привет", "мир",
    "спасибо", "хорошо", "Київ", "Беларусь", "щука", "ёлка",
];

const CJK: &[&str] = &[
    "日本語", "東京", "中文", "北京", "漢字", "ひらがな", "カタカナ", "한국어", "서울", "世界",
    "文字化け", "検証",
];

const EMOJI: &[&str] = &[
    "😀", "🎉", "🚀", "🌍", "🔥", "💯", "🦀", "🧪", "𝕳", "𝔸", "𐀀", "𝄞", "🏳\u{fe0f}",
];

/// Code points at the edges of each encoding length and of the excluded ranges.
const EDGE_CHARS: &[char] = &[
    '\u{80}',
    '\u{7FF}',
    '\u{800}',
    '\u{FFF}',
    '\u{1000}',
    '\u{D7FF}',
    '\u{E000}',
    '\u{FFFD}',
    '\u{FFFF}',
    '\u{10000}',
    '\u{3FFFF}',
    '\u{40000}',
    '\u{FFFFF}',
    '\u{100000}',
    '\u{10FFFF}',
];

/// Generate UTF-8 text of exactly `target_size` bytes.
///
/// The same seed always produces the same text. Without a seed, seed 0 is
/// used.
pub fn generate_utf8(target_size: usize, pattern: Utf8Pattern, seed: Option<u64>) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.unwrap_or(0));
    let mut out = Vec::with_capacity(target_size);

    match pattern {
        Utf8Pattern::Ascii => words(&mut out, target_size, &mut rng, SENTENCES),
        Utf8Pattern::Latin => words(&mut out, target_size, &mut rng, LATIN),
        Utf8Pattern::GreekCyrillic => words(&mut out, target_size, &mut rng, GREEK_CYRILLIC),
        Utf8Pattern::Cjk => words(&mut out, target_size, &mut rng, CJK),
        Utf8Pattern::Emoji => words(&mut out, target_size, &mut rng, EMOJI),
        Utf8Pattern::Mixed => mixed(&mut out, target_size, &mut rng),
        Utf8Pattern::AllLengths => all_lengths(&mut out, target_size, &mut rng),
        Utf8Pattern::Boundary => boundary(&mut out, target_size, &mut rng),
        Utf8Pattern::Pathological => pathological(&mut out, target_size),
    }

    // Pad with ASCII if the last piece did not fit
    out.resize(target_size, b' ');
    out
}

/// Append `piece` if it fits; returns `false` once the output is full.
fn push(out: &mut Vec<u8>, target: usize, piece: &[u8]) -> bool {
    if out.len() + piece.len() > target {
        return false;
    }
    out.extend_from_slice(piece);
    true
}

/// Words separated by spaces, wrapped at 80 columns.
fn words(out: &mut Vec<u8>, target: usize, rng: &mut ChaCha8Rng, pool: &[&str]) {
    let mut line_len = 0;
    loop {
        let word = pool[rng.gen_range(0..pool.len())].as_bytes();
        let sep: &[u8] = if line_len == 0 {
            b""
        } else if line_len + word.len() + 1 > 80 {
            b"\n"
        } else {
            b" "
        };
        if !push(out, target, sep) || !push(out, target, word) {
            return;
        }
        line_len = match sep {
            b"\n" => word.len(),
            _ => line_len + sep.len() + word.len(),
        };
    }
}

/// ASCII prose with roughly one in six words non-ASCII.
fn mixed(out: &mut Vec<u8>, target: usize, rng: &mut ChaCha8Rng) {
    let pools = [LATIN, GREEK_CYRILLIC, CJK, EMOJI];
    loop {
        let sentence = SENTENCES[rng.gen_range(0..SENTENCES.len())];
        for word in sentence.split(' ') {
            let word = if rng.gen_ratio(1, 6) {
                let pool = pools[rng.gen_range(0..pools.len())];
                pool[rng.gen_range(0..pool.len())]
            } else {
                word
            };
            if !push(out, target, word.as_bytes()) || !push(out, target, b" ") {
                return;
            }
        }
        if !push(out, target, b"\n") {
            return;
        }
    }
}

/// Random scalar values with each encoded length equally likely.
fn all_lengths(out: &mut Vec<u8>, target: usize, rng: &mut ChaCha8Rng) {
    let mut buf = [0u8; 4];
    loop {
        let cp = match rng.gen_range(0..4) {
            0 => rng.gen_range(0x20..0x7F),
            1 => rng.gen_range(0x80..0x800),
            2 => rng.gen_range(0x800..0x10000),
            _ => rng.gen_range(0x10000..0x110000),
        };
        // Surrogates have no char; draw again
        let Some(ch) = char::from_u32(cp) else {
            continue;
        };
        if !push(out, target, ch.encode_utf8(&mut buf).as_bytes()) {
            return;
        }
    }
}

/// Edge code points starting 1 to 3 bytes before a 32-byte boundary, so
/// they straddle both 16- and 32-byte blocks.
fn boundary(out: &mut Vec<u8>, target: usize, rng: &mut ChaCha8Rng) {
    let mut buf = [0u8; 4];
    let mut before = 1;
    loop {
        let ch = EDGE_CHARS[rng.gen_range(0..EDGE_CHARS.len())];
        let bytes = ch.encode_utf8(&mut buf).as_bytes();
        let want = (32 - before.min(bytes.len() - 1)) % 32;
        while out.len() % 32 != want {
            if !push(out, target, b".") {
                return;
            }
        }
        if !push(out, target, bytes) {
            return;
        }
        before = before % 3 + 1;
    }
}

/// Edge code points back to back, cycling through every length.
fn pathological(out: &mut Vec<u8>, target: usize) {
    let mut buf = [0u8; 4];
    for &ch in EDGE_CHARS.iter().cycle() {
        if !push(out, target, ch.encode_utf8(&mut buf).as_bytes()) {
            return;
        }
    }
}

/// Invalid byte sequences injected by [`corrupt`]. Each one is invalid
/// regardless of the bytes that follow it.
const MUTATIONS: &[&[u8]] = &[
    &[0x80],                   // bare continuation byte
    &[0xFF],                   // never valid
    &[0xC0, 0xAF],             // overlong '/'
    &[0xE0, 0x80, 0xAF],       // overlong '/'
    &[0xED, 0xA0, 0x80],       // surrogate U+D800
    &[0xF4, 0x90, 0x80, 0x80], // U+110000
    &[0xE2, 0x82, b'!'],       // truncated '€'
];

/// Overwrite up to `count` places in `text` with invalid sequences.
///
/// The text is split into `count` equal segments and each gets at most one
/// mutation, starting on a character boundary, so mutations never overlap.
/// Returns the start offsets of the mutations, ascending.
pub fn corrupt(text: &mut [u8], count: usize, seed: Option<u64>) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.unwrap_or(0) ^ 0xC0FF_EE00);
    let mut offsets = Vec::new();
    if count == 0 || text.is_empty() {
        return offsets;
    }

    let segment = text.len().div_ceil(count);
    for seg_start in (0..text.len()).step_by(segment) {
        let seg_end = (seg_start + segment).min(text.len());
        let mutation = MUTATIONS[rng.gen_range(0..MUTATIONS.len())];
        if seg_end - seg_start < mutation.len() {
            continue;
        }

        let last = seg_end - mutation.len();
        let from = rng.gen_range(seg_start..=last);
        let Some(pos) = (from..=last)
            .find(|&i| !is_continuation(text[i]))
            .or_else(|| (seg_start..from).rev().find(|&i| !is_continuation(text[i])))
        else {
            continue;
        };

        text[pos..pos + mutation.len()].copy_from_slice(mutation);
        offsets.push(pos);
    }
    offsets
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}
