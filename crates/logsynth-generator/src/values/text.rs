//! Keyword, composite-string and free-text producers.

use rand::Rng;

use super::pick;

pub const LOREM_IPSUM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.";

/// Default word pool for host names, domains and labels.
pub const WORDS: &[&str] = &[
    "aware", "accessible", "aggressive", "alike", "average", "bathe", "behave", "bite-sized",
    "boy", "bulb", "buzz", "caption", "cars", "channel", "choke", "class", "dazzling",
    "disagreeable", "dramatic", "ducks", "dynamic", "elite", "enchanting", "encouraging", "end",
    "excite", "excuse", "exotic", "eyes", "fearless", "fix", "flat", "four", "futuristic",
    "gifted", "great", "green", "hanging", "happy", "hard", "horse", "house", "huge",
    "hysterical", "identify", "ink", "kill", "linen", "living", "long-term", "lunchroom", "man",
    "march", "melodic", "monkey", "muddled", "murky", "neat", "nutritious", "obnoxious",
    "obsequious", "oil", "old", "parched", "payment", "pedal", "pine", "pointless", "poor",
    "preach", "previous", "psychedelic", "radiate", "ragged", "rely", "ring", "romantic",
    "seashore", "seat", "share", "skate", "slip", "soak", "solid", "spoon", "spray",
    "squeamish", "stir", "stranger", "tacit", "test", "thinkable", "thoughtless", "tiny",
    "tough", "towering", "unadvised", "vagabond", "women",
];

/// Keyword drawn uniformly from `pool`. An empty pool yields an empty string.
pub fn keyword<'a, R: Rng>(rng: &mut R, pool: &'a [String]) -> &'a str {
    if pool.is_empty() {
        return "";
    }
    pick(rng, pool).as_str()
}

/// Domain-like string `word.word.tld`.
pub fn domain<R: Rng>(rng: &mut R, words: &[String]) -> String {
    let host = keyword(rng, words);
    let zone = keyword(rng, words);
    let tld = pick(rng, &["com", "org", "co"]);
    format!("{host}.{zone}.{tld}")
}

/// URL-like string `scheme://domain/word{/|?}word`.
pub fn url<R: Rng>(rng: &mut R, words: &[String]) -> String {
    let scheme = pick(rng, &["http", "https"]);
    let domain = domain(rng, words);
    let first = keyword(rng, words);
    let separator = pick(rng, &["/", "?"]);
    let second = keyword(rng, words);
    format!("{scheme}://{domain}/{first}{separator}{second}")
}

/// Lowercase hex digest-like string of `bytes` random bytes.
pub fn hash_hex<R: Rng>(rng: &mut R, bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rng.fill(buf.as_mut_slice());
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

/// Leading words of `text`, word count uniform in `[min_words, max_words)`.
/// Counts past the end of the text yield the whole text.
pub fn lorem<R: Rng>(rng: &mut R, text: &str, min_words: usize, max_words: usize) -> String {
    let count = if max_words > min_words {
        rng.gen_range(min_words..max_words)
    } else {
        min_words
    };
    let words: Vec<&str> = text.split(' ').collect();
    if count >= words.len() {
        return text.to_string();
    }
    words[..count].join(" ")
}
