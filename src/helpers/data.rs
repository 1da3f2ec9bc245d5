//! Test data generation

use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::{EN, FR_FR, JA_JP, ZH_CN};
use fake::Fake;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::CustomerSignupData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    FrFr,
    JaJp,
    ZhCn,
}

/// Groups of locales by script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleGroup {
    BasicLatin,
    Accented,
    NonLatin,
}

impl LocaleGroup {
    pub fn locales(&self) -> &'static [Locale] {
        match self {
            LocaleGroup::BasicLatin => &[Locale::En],
            LocaleGroup::Accented => &[Locale::FrFr],
            LocaleGroup::NonLatin => &[Locale::JaJp, Locale::ZhCn],
        }
    }
}

/// Character classes for boundary-value inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    AsciiLetter,
    Digit,
    PunctuationNoAt,
    Punctuation,
    Symbol,
    Math,
    Emoji,
    Control,
    Whitespace,
}

const ASCII_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

impl CharClass {
    pub fn chars(&self) -> Vec<char> {
        match self {
            CharClass::AsciiLetter => ASCII_LETTERS.chars().collect(),
            CharClass::Digit => DIGITS.chars().collect(),
            CharClass::PunctuationNoAt => PUNCTUATION.chars().filter(|c| *c != '@').collect(),
            CharClass::Punctuation => PUNCTUATION.chars().collect(),
            CharClass::Symbol => "©®™§¶†‡•€£¥∞±≠".chars().collect(),
            CharClass::Math => "+-=*/√^∞∫≈≠≤≥∀∂∃∅∇∈∉∋∏∑−∕∗∘∝∠∧∨∩∪∬∭∮".chars().collect(),
            CharClass::Emoji => "😀🚀🔥✅❌🌟💯🐱".chars().collect(),
            CharClass::Control => (0u8..32).map(char::from).collect(),
            CharClass::Whitespace => vec![' ', '\t', '\n', '\r', '\u{00A0}', '\u{200B}'],
        }
    }
}

const COUNTRIES: &[&str] = &["Viet Nam", "France", "Japan", "China", "United States"];

/// Email that is unique per second: `user_<unix-seconds>@gmail.com`
pub fn timestamp_email() -> String {
    format!("user_{}@gmail.com", chrono::Utc::now().timestamp())
}

/// Seeded random data source. The same seed yields the same sequence.
pub struct DataHelper {
    seed: u64,
    rng: StdRng,
}

impl DataHelper {
    /// Seeds from the current time when `seed` is `None`
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| chrono::Utc::now().timestamp().unsigned_abs());
        debug!("[CONFIG] DataHelper seed: {}", seed);
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn first_name(&mut self, locale: Locale) -> String {
        match locale {
            Locale::En => FirstName(EN).fake_with_rng(&mut self.rng),
            Locale::FrFr => FirstName(FR_FR).fake_with_rng(&mut self.rng),
            Locale::JaJp => FirstName(JA_JP).fake_with_rng(&mut self.rng),
            Locale::ZhCn => FirstName(ZH_CN).fake_with_rng(&mut self.rng),
        }
    }

    pub fn last_name(&mut self, locale: Locale) -> String {
        match locale {
            Locale::En => LastName(EN).fake_with_rng(&mut self.rng),
            Locale::FrFr => LastName(FR_FR).fake_with_rng(&mut self.rng),
            Locale::JaJp => LastName(JA_JP).fake_with_rng(&mut self.rng),
            Locale::ZhCn => LastName(ZH_CN).fake_with_rng(&mut self.rng),
        }
    }

    pub fn locale_from(&mut self, group: LocaleGroup) -> Locale {
        let locales = group.locales();
        locales[self.rng.gen_range(0..locales.len())]
    }

    /// `len` characters drawn from `class`
    pub fn string_of(&mut self, class: CharClass, len: usize) -> String {
        let chars = class.chars();
        (0..len)
            .map(|_| chars[self.rng.gen_range(0..chars.len())])
            .collect()
    }

    /// Local mobile number: `09` followed by eight digits
    pub fn phone(&mut self) -> String {
        format!("09{}", self.string_of(CharClass::Digit, 8))
    }

    /// At least one letter, one digit and one punctuation mark (never `@`)
    pub fn password(&mut self, len: usize) -> String {
        let len = len.max(3);
        let mut chars: Vec<char> = self
            .string_of(CharClass::AsciiLetter, len - 2)
            .chars()
            .collect();
        chars.extend(self.string_of(CharClass::Digit, 1).chars());
        chars.extend(self.string_of(CharClass::PunctuationNoAt, 1).chars());
        chars.shuffle(&mut self.rng);
        chars.into_iter().collect()
    }

    pub fn country(&mut self) -> String {
        COUNTRIES[self.rng.gen_range(0..COUNTRIES.len())].to_string()
    }

    /// A complete, valid signup form for a new account
    pub fn signup_data(&mut self, locale: Locale) -> CustomerSignupData {
        CustomerSignupData {
            first_name: self.first_name(locale),
            last_name: self.last_name(locale),
            country: self.country(),
            phone: self.phone(),
            email: timestamp_email(),
            password: self.password(12),
        }
    }
}

impl Default for DataHelper {
    fn default() -> Self {
        Self::new(None)
    }
}
