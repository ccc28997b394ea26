//! [`Slug`] definitions and assignment.

use std::{collections::BTreeSet, sync::LazyLock};

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use unicode_normalization::{
    char::is_combining_mark, UnicodeNormalization as _,
};
use uuid::Uuid;

#[cfg(doc)]
use super::Listing;
use super::Name;

/// Highest numeric suffix tried before falling back to a random one.
pub const MAX_NUMERIC_SUFFIX: u64 = 1000;

/// Length of a random hexadecimal suffix.
const RANDOM_SUFFIX_LEN: usize = 8;

/// Unique, URL-safe identifier of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Slug(String);

impl Slug {
    /// Creates a new [`Slug`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `slug` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Creates a new [`Slug`] if the given `slug` is valid.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Option<Self> {
        let slug = slug.into();
        Self::check(&slug).then_some(Self(slug))
    }

    /// Checks whether the given `slug` is a valid [`Slug`].
    fn check(slug: impl AsRef<str>) -> bool {
        static FORMAT: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new("^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex")
        });

        let slug = slug.as_ref();
        slug.len() <= 255 && FORMAT.is_match(slug)
    }

    /// Returns the numeric suffix of this [`Slug`] if it has the
    /// `<base>-<n>` form for the provided [`Base`].
    ///
    /// Suffixes with leading zeros (`<base>-01`) aren't numbers produced by
    /// [`assign()`], so don't occupy one.
    #[must_use]
    pub fn numeric_suffix(&self, base: &Base) -> Option<u64> {
        let digits = self.0.strip_prefix(base.0.as_str())?.strip_prefix('-')?;
        if digits.starts_with('0')
            || digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        digits.parse().ok()
    }

    /// Creates a [`Slug`] of the provided [`Base`] followed by a random
    /// hexadecimal suffix (or the suffix alone for an empty [`Base`]).
    #[must_use]
    pub fn random(base: &Base) -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        let suffix = &uuid[..RANDOM_SUFFIX_LEN];
        if base.is_empty() {
            Self(suffix.to_owned())
        } else {
            Self(format!("{base}-{suffix}"))
        }
    }
}

/// Base of a [`Slug`] derived from a [`Name`] before deduplication.
///
/// May be empty if the [`Name`] contains no alphanumerics representable in
/// ASCII.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
pub struct Base(String);

impl Base {
    /// Derives a [`Base`] from the provided [`Name`].
    ///
    /// Letters are decomposed (NFKD) and stripped of their diacritics, and
    /// whatever still isn't ASCII is dropped. ASCII alphanumerics are
    /// lowercased, and every run of other characters collapses into a single
    /// hyphen. No leading or trailing hyphens remain.
    #[must_use]
    pub fn from_name(name: &Name) -> Self {
        Self::slugify(name.as_ref())
    }

    /// Slugifies an arbitrary `input`.
    #[must_use]
    pub fn slugify(input: &str) -> Self {
        let mut out = String::with_capacity(input.len());
        let mut pending_dash = false;
        let ascii = input
            .nfkd()
            .filter(|c| !is_combining_mark(*c))
            .filter(char::is_ascii);
        for c in ascii {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        Self(out)
    }

    /// Indicates whether this [`Base`] is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns this [`Base`] as a [`Slug`], if it's not empty.
    #[must_use]
    pub fn to_slug(&self) -> Option<Slug> {
        (!self.is_empty()).then(|| Slug(self.0.clone()))
    }
}

/// Picks a [`Slug`] for the provided [`Base`] given the `taken` slugs of the
/// other active listings sharing it.
///
/// The [`Base`] itself is used when free, otherwise the first unused numeric
/// suffix (so gaps left by renames and deletions are refilled). Empty bases
/// and suffixes above [`MAX_NUMERIC_SUFFIX`] get a random suffix instead.
#[must_use]
pub fn assign<'a>(
    base: &Base,
    taken: impl IntoIterator<Item = &'a Slug>,
) -> Slug {
    let Some(plain) = base.to_slug() else {
        return Slug::random(base);
    };

    let mut base_taken = false;
    let mut suffixes = BTreeSet::new();
    for slug in taken {
        if *slug == plain {
            base_taken = true;
        } else if let Some(n) = slug.numeric_suffix(base) {
            _ = suffixes.insert(n);
        }
    }
    if !base_taken {
        return plain;
    }

    let mut n = 1;
    for used in suffixes.range(1..) {
        if *used != n {
            break;
        }
        n += 1;
    }
    if n > MAX_NUMERIC_SUFFIX {
        return Slug::random(base);
    }
    Slug(format!("{base}-{n}"))
}

#[cfg(test)]
mod spec {
    use crate::domain::listing::Name;

    use super::{assign, Base, Slug, MAX_NUMERIC_SUFFIX};

    fn slug(s: &str) -> Slug {
        Slug::new(s).unwrap()
    }

    fn base(s: &str) -> Base {
        Base::from_name(&Name::new(s).unwrap())
    }

    #[test]
    fn slugifies_names() {
        assert_eq!(base("Test Game").as_ref(), "test-game");
        assert_eq!(base("The  Mole: Season #2!").as_ref(), "the-mole-season-2");
        assert_eq!(base("--Big--Brother--").as_ref(), "big-brother");
        assert_eq!(base("Rock'n Roll").as_ref(), "rock-n-roll");
        assert!(base("!!!").is_empty());
    }

    #[test]
    fn transliterates_accented_letters() {
        assert_eq!(base("Pokémon Survivor").as_ref(), "pokemon-survivor");
        assert_eq!(base("Señor Ñandú").as_ref(), "senor-nandu");
        assert_eq!(base("Ｆｕｌｌ Width").as_ref(), "full-width");
        assert_eq!(base("Café 😀 Night").as_ref(), "cafe-night");
        assert!(base("東京").is_empty());
    }

    #[test]
    fn validates_slugs() {
        assert!(Slug::new("test-game-1").is_some());
        assert!(Slug::new("Test-Game").is_none());
        assert!(Slug::new("test--game").is_none());
        assert!(Slug::new("-test").is_none());
        assert!(Slug::new("").is_none());
    }

    #[test]
    fn uses_free_base() {
        assert_eq!(assign(&base("Test Game"), &[]), slug("test-game"));
        assert_eq!(
            assign(&base("Test Game"), &[slug("test-game-1")]),
            slug("test-game"),
        );
    }

    #[test]
    fn numbers_duplicates() {
        assert_eq!(
            assign(&base("Test Game"), &[slug("test-game")]),
            slug("test-game-1"),
        );
    }

    #[test]
    fn fills_gaps() {
        let taken = [slug("test-game"), slug("test-game-1"), slug("test-game-3")];

        assert_eq!(assign(&base("Test Game"), &taken), slug("test-game-2"));
    }

    #[test]
    fn ignores_unrelated_suffixes() {
        let taken = [
            slug("test-game"),
            slug("test-game-ish"),
            slug("test-game-1-2"),
        ];

        assert_eq!(assign(&base("Test Game"), &taken), slug("test-game-1"));
    }

    #[test]
    fn ignores_zero_padded_suffixes() {
        let taken = [slug("test-game"), slug("test-game-01")];

        assert_eq!(assign(&base("Test Game"), &taken), slug("test-game-1"));
        assert_eq!(
            slug("test-game-01").numeric_suffix(&base("Test Game")),
            None,
        );
        assert_eq!(
            slug("test-game-10").numeric_suffix(&base("Test Game")),
            Some(10),
        );
    }

    #[test]
    fn falls_back_to_random_suffix_when_exhausted() {
        let taken = std::iter::once(slug("busy"))
            .chain((1..=MAX_NUMERIC_SUFFIX).map(|n| slug(&format!("busy-{n}"))))
            .collect::<Vec<_>>();

        let assigned = assign(&base("Busy"), &taken);

        let suffix = AsRef::<str>::as_ref(&assigned).strip_prefix("busy-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.bytes().all(|b| b.is_ascii_hexdigit()));
        assert!(!taken.contains(&assigned));
    }

    #[test]
    fn gives_empty_base_random_slug() {
        let assigned = assign(&base("???"), &[]);

        assert_eq!(AsRef::<str>::as_ref(&assigned).len(), 8);
        assert!(Slug::new(assigned.to_string()).is_some());
    }
}
