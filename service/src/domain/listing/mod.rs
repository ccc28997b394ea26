//! [`Listing`] definitions.

pub mod schedule;
pub mod slug;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::geography::{city, country, region};

pub use self::{schedule::Schedule, slug::Slug};

/// Game listed in the directory.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// [`Slug`] addressing this [`Listing`].
    pub slug: Slug,

    /// [`Name`] of this [`Listing`].
    pub name: Name,

    /// [`Format`] of this [`Listing`].
    pub format: Format,

    /// [`Duration`] of this [`Listing`], if known.
    pub duration: Option<Duration>,

    /// [`FilmingStatus`] of this [`Listing`], if known.
    pub filming_status: Option<FilmingStatus>,

    /// Indicator whether this [`Listing`] is still running, if known.
    pub active: Option<bool>,

    /// Indicator whether this [`Listing`] is played for charity, if known.
    pub for_charity: Option<bool>,

    /// Indicator whether this [`Listing`] casts friends and family only, if
    /// known.
    pub friends_and_family: Option<bool>,

    /// Indicator whether this [`Listing`] is a college game, if known.
    pub college_game: Option<bool>,

    /// [`CollegeName`] of a college game.
    pub college_name: Option<CollegeName>,

    /// Country this [`Listing`] takes place in.
    pub country: country::Id,

    /// Region this [`Listing`] takes place in, if any.
    pub region: Option<region::Id>,

    /// City this [`Listing`] takes place in, if any.
    pub city: Option<city::Id>,

    /// [`Description`] of this [`Listing`].
    pub description: Option<Description>,

    /// [`Host`] of this [`Listing`].
    pub host: Option<Host>,

    /// Contact [`Email`] of this [`Listing`].
    pub email: Option<Email>,

    /// Website of this [`Listing`].
    pub website: Option<Link>,

    /// Instagram handle of this [`Listing`].
    pub instagram_handle: Option<Handle>,

    /// Facebook page name of this [`Listing`].
    pub facebook_link: Option<Handle>,

    /// YouTube path of this [`Listing`].
    pub youtube_link: Option<Handle>,

    /// Page name of this [`Listing`] on the Live Reality Games wiki.
    pub lrg_wiki_page: Option<Handle>,

    /// Casting call of this [`Listing`].
    pub casting_link: Option<Link>,

    /// [`Logo`] of this [`Listing`].
    pub logo: Option<Logo>,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Listing`] was modified the last time.
    pub updated_at: ModificationDateTime,

    /// [`DateTime`] when this [`Listing`] was deleted, if it was.
    pub deleted_at: Option<DeletionDateTime>,
}

impl Listing {
    /// Indicates whether this [`Listing`] is soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Indicates whether this [`Listing`] has an open casting call.
    ///
    /// Empty links stored by older writers count as no link.
    #[must_use]
    pub fn is_casting(&self) -> bool {
        self.casting_link
            .as_ref()
            .is_some_and(|l| !AsRef::<str>::as_ref(l).is_empty())
    }
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Defines a validated free-text attribute of a [`Listing`].
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        $name:ident(max = $max:literal)
    ) => {
        #[doc = $doc]
        #[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent)
        )]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Maximum length of a [`", stringify!($name), "`] in characters.")]
            pub const MAX_LEN: usize = $max;

            #[doc = concat!("Creates a new [`", stringify!($name), "`].")]
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `value` matches the
            /// format.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[doc = concat!("Creates a new [`", stringify!($name), "`] if the given `value` is valid.")]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            /// Checks whether the given `value` is trimmed, non-empty and
            /// fits the length limit.
            fn check(value: impl AsRef<str>) -> bool {
                let value = value.as_ref();
                value.trim() == value
                    && !value.is_empty()
                    && value.chars().count() <= Self::MAX_LEN
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

define_text! {
    #[doc = "Display name of a [`Listing`]."]
    Name(max = 200)
}

define_text! {
    #[doc = "Free-form description of a [`Listing`]."]
    Description(max = 20_000)
}

define_text! {
    #[doc = "Name of the college a [`Listing`] is played at."]
    CollegeName(max = 200)
}

define_text! {
    #[doc = "Host(s) running a [`Listing`]."]
    Host(max = 200)
}

define_text! {
    #[doc = "External link of a [`Listing`]."]
    Link(max = 200)
}

define_text! {
    #[doc = "Page name, handle or path of a [`Listing`] on a social site."]
    Handle(max = 200)
}

define_text! {
    #[doc = "Storage reference of a [`Listing`] logo."]
    Logo(max = 255)
}

/// Contact email address of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Maximum length of an [`Email`] in characters.
    pub const MAX_LEN: usize = 254;

    /// Creates a new [`Email`] if the given `email` is valid.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Option<Self> {
        let email = email.into();
        Self::check(&email).then_some(Self(email))
    }

    /// Checks whether the given `email` is a valid [`Email`].
    fn check(email: impl AsRef<str>) -> bool {
        static FORMAT: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s.]+(?:\.[^@\s.]+)+$")
                .expect("valid regex")
        });

        let email = email.as_ref();
        email.chars().count() <= Self::MAX_LEN && FORMAT.is_match(email)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

define_kind! {
    #[doc = "Format a [`Listing`] is modelled after."]
    enum Format {
        #[doc = "Amazing Race."]
        AmazingRace = "AR" => "Amazing Race",

        #[doc = "Big Brother."]
        BigBrother = "BB" => "Big Brother",

        #[doc = "Survivor."]
        Survivor = "SU" => "Survivor",

        #[doc = "Task Master."]
        TaskMaster = "TM" => "Task Master",

        #[doc = "The Challenge."]
        TheChallenge = "CH" => "The Challenge",

        #[doc = "The Genius."]
        TheGenius = "GE" => "The Genius",

        #[doc = "The Mole."]
        TheMole = "MO" => "The Mole",

        #[doc = "The Traitors."]
        TheTraitors = "TR" => "The Traitors",

        #[doc = "A format of its own."]
        OriginalFormat = "OF" => "Original Format",

        #[doc = "Several formats."]
        VariousFormats = "VF" => "Various Formats",
    }
}

define_kind! {
    #[doc = "How long a [`Listing`] runs."]
    enum Duration {
        #[doc = "Played within a single day."]
        SingleDay = "SD" => "Single Day",

        #[doc = "Played over several days."]
        MultipleDays = "MD" => "Multiple Days",

        #[doc = "Played over a semester."]
        Semester = "SE" => "Semester",
    }
}

define_kind! {
    #[doc = "Whether and how a [`Listing`] is recorded."]
    enum FilmingStatus {
        #[doc = "Filmed and released as a whole."]
        Filmed = "FI" => "Filmed",

        #[doc = "Not filmed."]
        NotFilmed = "NF" => "Not Filmed",

        #[doc = "Released as episodes."]
        Episodes = "EP" => "Episodes",

        #[doc = "Streamed live."]
        Livestreamed = "LI" => "Livestreamed",
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

/// [`DateTime`] when a [`Listing`] was modified.
pub type ModificationDateTime = DateTimeOf<(Listing, unit::Modification)>;

/// [`DateTime`] when a [`Listing`] was deleted.
pub type DeletionDateTime = DateTimeOf<(Listing, unit::Deletion)>;

#[cfg(test)]
pub(crate) mod fixture {
    //! [`Listing`] fixtures.

    use common::DateTime;

    use crate::domain::geography::country;

    use super::{Format, Id, Listing, Name, Slug};

    /// Creates an active [`Listing`] in country `1` with the provided `name`.
    pub(crate) fn listing(name: &str) -> Listing {
        let name = Name::new(name).unwrap();
        let slug = super::slug::Base::from_name(&name)
            .to_slug()
            .unwrap_or_else(|| Slug::new("game").unwrap());
        Listing {
            id: Id::new(),
            slug,
            name,
            format: Format::OriginalFormat,
            duration: None,
            filming_status: None,
            active: Some(true),
            for_charity: None,
            friends_and_family: None,
            college_game: None,
            college_name: None,
            country: country::Id::from(1),
            region: None,
            city: None,
            description: None,
            host: None,
            email: None,
            website: None,
            instagram_handle: None,
            facebook_link: None,
            youtube_link: None,
            lrg_wiki_page: None,
            casting_link: None,
            logo: None,
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Kind as _;

    use super::{Email, Format, Link, Name};

    #[test]
    fn validates_names() {
        assert!(Name::new("Test Game").is_some());
        assert!(Name::new(" Test Game").is_none());
        assert!(Name::new("").is_none());
        assert!(Name::new("x".repeat(200)).is_some());
        assert!(Name::new("x".repeat(201)).is_none());
        assert!(Link::new("https://example.com/cast").is_some());
    }

    #[test]
    fn validates_emails() {
        assert!(Email::new("host@example.com").is_some());
        assert!(Email::new("first.last@mail.example.org").is_some());
        assert!(Email::new("host@localhost").is_none());
        assert!(Email::new("host@@example.com").is_none());
        assert!(Email::new("host @example.com").is_none());
        assert!(Email::new("@example.com").is_none());
        assert!(Email::new("host@example.").is_none());
    }

    #[test]
    fn parses_format_codes() {
        assert_eq!("TR".parse::<Format>().unwrap(), Format::TheTraitors);
        assert_eq!(Format::TheTraitors.label(), "The Traitors");
        assert_eq!(Format::ALL.len(), 10);
        assert!("XX".parse::<Format>().is_err());
        assert!("tr".parse::<Format>().is_err());
    }
}
