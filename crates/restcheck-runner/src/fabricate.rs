//! Random-but-plausible request data
//!
//! Backed by a `SmallRng`; a fixed seed replays the exact same value sequence.
//! Values are not guaranteed unique across calls.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const GENDERS: &[&str] = &["male", "female"];
pub const USER_STATUSES: &[&str] = &["active", "inactive"];
pub const TODO_STATUSES: &[&str] = &["pending", "completed"];

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Ada", "Alan", "Amara", "Anika", "Bela", "Chandra", "Dev", "Diya", "Elena", "Farah",
    "Grace", "Hiro", "Ishaan", "Jasper", "Kavya", "Leela", "Linus", "Maya", "Meera", "Nikhil",
    "Noor", "Omar", "Priya", "Rahul", "Rohan", "Sana", "Tara", "Uma", "Vikram", "Yara", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Agarwal", "Banerjee", "Chopra", "Das", "Desai", "Gill", "Hopper", "Iyer", "Joshi", "Kapoor",
    "Khan", "Kumar", "Lovelace", "Mehta", "Menon", "Nair", "Patel", "Pillai", "Rao", "Reddy",
    "Sharma", "Singh", "Thakur", "Torvalds", "Varma", "Verma",
];

const DOMAINS: &[&str] = &["example.com", "example.net", "example.org"];

const WORDS: &[&str] = &[
    "alias", "amet", "animi", "aperiam", "beatae", "blanditis", "commodi", "consequatur",
    "corporis", "cumque", "debitis", "deleniti", "dolor", "dolores", "eius", "enim", "eos",
    "excepturi", "facere", "fugit", "harum", "illum", "impedit", "ipsa", "labore", "laborum",
    "magnam", "minima", "molestiae", "nemo", "nihil", "nostrum", "odio", "officia", "omnis",
    "pariatur", "placeat", "quae", "quasi", "quia", "ratione", "rerum", "saepe", "sequi", "sint",
    "soluta", "tempora", "totam", "ullam", "velit", "veniam", "vero", "voluptas", "voluptatem",
];

/// Upper bound for `due_on` timestamps (2029-12-31T23:59:59Z).
const LATEST_DUE_ON: i64 = 1_893_455_999;

/// `+05:30`
const DUE_ON_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Source of fabricated field values.
#[derive(Debug, Clone)]
pub struct Fabricator {
    rng: SmallRng,
    seed: Option<u64>,
}

impl Fabricator {
    /// Seeded when `seed` is set, entropy-seeded otherwise.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        Self { rng, seed }
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// "First Last"
    pub fn name(&mut self) -> String {
        let first = self.one_of(FIRST_NAMES);
        let last = self.one_of(LAST_NAMES);
        format!("{first} {last}")
    }

    /// "first.last1234@example.org"
    pub fn email(&mut self) -> String {
        let first = self.one_of(FIRST_NAMES).to_ascii_lowercase();
        let last = self.one_of(LAST_NAMES).to_ascii_lowercase();
        let n: u32 = self.rng.gen_range(1..100_000);
        let domain = self.one_of(DOMAINS);
        format!("{first}.{last}{n}@{domain}")
    }

    /// Capitalised sentence of exactly `words` words, ending with a period.
    pub fn sentence(&mut self, words: usize) -> String {
        let mut out = String::new();
        for i in 0..words {
            let word = self.one_of(WORDS);
            if i == 0 {
                let mut chars = word.chars();
                if let Some(c) = chars.next() {
                    out.extend(c.to_uppercase());
                    out.push_str(chars.as_str());
                }
            } else {
                out.push(' ');
                out.push_str(word);
            }
        }
        if !out.is_empty() {
            out.push('.');
        }
        out
    }

    /// Sentences joined by spaces, at most `max_chars` characters long.
    ///
    /// Empty only when `max_chars` is 0.
    pub fn text(&mut self, max_chars: usize) -> String {
        let mut out = String::new();
        loop {
            let words = self.rng.gen_range(4..=10);
            let sentence = self.sentence(words);
            let needed = if out.is_empty() {
                sentence.len()
            } else {
                out.len() + 1 + sentence.len()
            };
            if needed > max_chars {
                break;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&sentence);
        }
        if out.is_empty() && max_chars > 0 {
            // Word lists are ASCII, so byte truncation keeps whole chars.
            let mut cut = self.sentence(10);
            if max_chars == 1 {
                cut.truncate(1);
            } else {
                cut.truncate(max_chars - 1);
                cut.push('.');
            }
            out = cut;
        }
        out
    }

    /// One element of `items`, or `None` if empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    pub fn gender(&mut self) -> &'static str {
        self.one_of(GENDERS)
    }

    pub fn user_status(&mut self) -> &'static str {
        self.one_of(USER_STATUSES)
    }

    pub fn todo_status(&mut self) -> &'static str {
        self.one_of(TODO_STATUSES)
    }

    /// Timestamp rendered as `YYYY-MM-DDTHH:MM:SS.mmm+05:30`.
    pub fn due_on(&mut self) -> String {
        let secs = self.rng.gen_range(0..=LATEST_DUE_ON);
        render_due_on(secs).unwrap_or_default()
    }

    fn one_of(&mut self, items: &[&'static str]) -> &'static str {
        self.pick(items).copied().unwrap_or_default()
    }
}

fn render_due_on(secs: i64) -> Option<String> {
    let offset = FixedOffset::east_opt(DUE_ON_OFFSET_SECS)?;
    let utc = DateTime::from_timestamp(secs, 0)?;
    Some(
        utc.with_timezone(&offset)
            .to_rfc3339_opts(SecondsFormat::Millis, false),
    )
}
