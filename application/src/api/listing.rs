//! [`Listing`]-related API definitions.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use common::Kind;
use serde::Serialize;
use service::{
    domain::{
        geography::{city, country, region},
        listing::{
            self,
            schedule::{NextDate, Season},
        },
        Listing,
    },
    query,
    read::listing::{Detail, FilterCriteria},
    Query as _,
};

use crate::{define_error, AsError as _, Error, Service};

use super::{last_param, Params};

define_error! {
    enum ListingError {
        #[code = "GAME_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Game does not exist"]
        NotFound,
    }
}

/// Coded value along with its human-readable label.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Labeled {
    /// Stable code of the value.
    pub code: &'static str,

    /// Human-readable label of the value.
    pub label: &'static str,
}

impl Labeled {
    /// Describes the provided [`Kind`] variant.
    fn of(kind: impl Kind) -> Self {
        Self {
            code: kind.code(),
            label: kind.label(),
        }
    }
}

/// Game as returned by the API.
#[derive(Clone, Debug, Serialize)]
pub struct Game {
    /// ID of the game.
    pub id: listing::Id,

    /// Slug addressing the game.
    pub slug: String,

    /// Name of the game.
    pub name: String,

    /// Format the game is modelled after.
    pub format: Labeled,

    /// How long the game runs.
    pub duration: Option<Labeled>,

    /// Whether and how the game is recorded.
    pub filming_status: Option<Labeled>,

    /// Indicator whether the game is still running.
    pub active: Option<bool>,

    /// Indicator whether the game is played for charity.
    pub for_charity: Option<bool>,

    /// Indicator whether the game casts friends and family only.
    pub friends_and_family: Option<bool>,

    /// Indicator whether the game is a college one.
    pub college_game: Option<bool>,

    /// Name of the college the game is played at.
    pub college_name: Option<String>,

    /// Country the game takes place in.
    pub country: country::Id,

    /// Region the game takes place in.
    pub region: Option<region::Id>,

    /// City the game takes place in.
    pub city: Option<city::Id>,

    /// Description of the game.
    pub description: Option<String>,

    /// Host(s) of the game.
    pub host: Option<String>,

    /// Contact email of the game.
    pub email: Option<String>,

    /// Website of the game.
    pub website: Option<String>,

    /// Instagram handle of the game.
    pub instagram_handle: Option<String>,

    /// Facebook page name of the game.
    pub facebook_link: Option<String>,

    /// YouTube path of the game.
    pub youtube_link: Option<String>,

    /// Live Reality Games wiki page of the game.
    pub lrg_wiki_page: Option<String>,

    /// Casting call of the game.
    pub casting_link: Option<String>,

    /// Logo of the game.
    pub logo: Option<String>,

    /// [RFC 3339] timestamp of the game creation.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] timestamp of the last game modification.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub updated_at: String,
}

impl From<Listing> for Game {
    fn from(listing: Listing) -> Self {
        let Listing {
            id,
            slug,
            name,
            format,
            duration,
            filming_status,
            active,
            for_charity,
            friends_and_family,
            college_game,
            college_name,
            country,
            region,
            city,
            description,
            host,
            email,
            website,
            instagram_handle,
            facebook_link,
            youtube_link,
            lrg_wiki_page,
            casting_link,
            logo,
            created_at,
            updated_at,
            deleted_at: _,
        } = listing;

        Self {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
            format: Labeled::of(format),
            duration: duration.map(Labeled::of),
            filming_status: filming_status.map(Labeled::of),
            active,
            for_charity,
            friends_and_family,
            college_game,
            college_name: college_name.as_ref().map(ToString::to_string),
            country,
            region,
            city,
            description: description.as_ref().map(ToString::to_string),
            host: host.as_ref().map(ToString::to_string),
            email: email.as_ref().map(ToString::to_string),
            website: website.as_ref().map(ToString::to_string),
            instagram_handle: instagram_handle
                .as_ref()
                .map(ToString::to_string),
            facebook_link: facebook_link.as_ref().map(ToString::to_string),
            youtube_link: youtube_link.as_ref().map(ToString::to_string),
            lrg_wiki_page: lrg_wiki_page.as_ref().map(ToString::to_string),
            casting_link: casting_link.as_ref().map(ToString::to_string),
            logo: logo.as_ref().map(ToString::to_string),
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
        }
    }
}

/// Season of a [`Game`].
#[derive(Clone, Debug, Serialize)]
pub struct GameSeason {
    /// Number of the season.
    pub number: i16,

    /// Name of the season, if it has one.
    pub name: Option<String>,

    /// Human-readable label of the season.
    pub label: String,

    /// External page of the season.
    pub link: Option<String>,
}

impl From<Season> for GameSeason {
    fn from(season: Season) -> Self {
        let label = season.label();
        let Season { number, name, link } = season;
        Self {
            number: number.into(),
            name: name.as_ref().map(ToString::to_string),
            label,
            link: link.as_ref().map(ToString::to_string),
        }
    }
}

/// Announced date of the next season of a [`Game`].
#[derive(Clone, Debug, Serialize)]
pub struct GameDate {
    /// First day of the season, as `YYYY-MM-DD`.
    pub start: Option<String>,

    /// Last day of the season, as `YYYY-MM-DD`.
    pub end: Option<String>,

    /// Human-readable form of the dates.
    pub display: String,
}

impl From<NextDate> for GameDate {
    fn from(date: NextDate) -> Self {
        Self {
            start: date.start.map(|d| d.to_string()),
            end: date.end.map(|d| d.to_string()),
            display: date.to_string(),
        }
    }
}

/// [`Game`] along with its seasons, as shown on its own page.
#[derive(Clone, Debug, Serialize)]
pub struct GameDetail {
    /// Detailed [`Game`].
    #[serde(flatten)]
    pub game: Game,

    /// Played seasons of the [`Game`], in order.
    pub seasons: Vec<GameSeason>,

    /// Announced dates of the next season of the [`Game`].
    pub next_season_dates: Vec<GameDate>,
}

impl From<Detail> for GameDetail {
    fn from(detail: Detail) -> Self {
        let Detail { listing, schedule } = detail;
        Self {
            game: listing.into(),
            seasons: schedule.seasons.into_iter().map(Into::into).collect(),
            next_season_dates: schedule
                .next_dates
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Page of [`Game`]s.
#[derive(Clone, Debug, Serialize)]
pub struct GameList {
    /// [`Game`]s on this page.
    pub games: Vec<Game>,

    /// 1-based number of this page.
    pub page: usize,

    /// Total number of pages.
    pub num_pages: usize,

    /// Total number of matching [`Game`]s.
    pub total: usize,

    /// Indicator whether there is a next page.
    pub has_next: bool,

    /// Indicator whether there is a previous page.
    pub has_previous: bool,

    /// Canonical query string of the applied filter.
    pub filter: String,
}

/// Lists a page of [`Game`]s matching the filter in the query parameters.
///
/// # Errors
///
/// If the [`Service`] failed to select the [`Game`]s.
#[tracing::instrument(skip(service))]
pub async fn list(
    Extension(service): Extension<Service>,
    Query(params): Query<Params>,
) -> Result<Json<GameList>, Error> {
    let filter =
        FilterCriteria::from_query(params.iter().map(|(k, v)| (k, v)));
    let query_string = filter.to_query_string();
    let page = service
        .execute(query::listings::List {
            page: last_param(&params, "page").map(ToOwned::to_owned),
            filter,
        })
        .await
        .map_err(|e| e.as_error())?;

    Ok(Json(GameList {
        page: page.number,
        num_pages: page.num_pages(),
        total: page.total,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        games: page.items.into_iter().map(Game::from).collect(),
        filter: query_string,
    }))
}

/// Returns the [`GameDetail`] addressed by the provided slug.
///
/// # Errors
///
/// - `GAME_NOT_FOUND` if there is no active [`Game`] with such slug.
/// - If the [`Service`] failed to select the [`Game`].
#[tracing::instrument(skip(service))]
pub async fn detail(
    Extension(service): Extension<Service>,
    Path(slug): Path<String>,
) -> Result<Json<GameDetail>, Error> {
    let slug = listing::Slug::new(slug).ok_or(ListingError::NotFound)?;
    service
        .execute(query::listing::Details { slug })
        .await
        .map_err(|e| e.as_error())?
        .map(|d| Json(GameDetail::from(d)))
        .ok_or_else(|| ListingError::NotFound.into())
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use service::{
        domain::{
            geography::country,
            listing::{
                self,
                schedule::{DateLabel, NextDate, Season, SeasonNumber},
                Duration, Email, Format, Handle, Name, Schedule, Slug,
            },
            Listing,
        },
        read::listing::Detail,
    };
    use time::{Date, Month};

    use super::{Game, GameDetail};

    fn listing() -> Listing {
        let now = DateTime::now();
        Listing {
            id: listing::Id::new(),
            slug: Slug::new("the-mole").unwrap(),
            name: Name::new("The Mole").unwrap(),
            format: Format::TheMole,
            duration: Some(Duration::Semester),
            filming_status: None,
            active: Some(true),
            for_charity: None,
            friends_and_family: Some(false),
            college_game: None,
            college_name: None,
            country: country::Id::new(1),
            region: None,
            city: None,
            description: None,
            host: None,
            email: Email::new("mole@example.com"),
            website: None,
            instagram_handle: Handle::new("themole"),
            facebook_link: None,
            youtube_link: None,
            lrg_wiki_page: Handle::new("The_Mole"),
            casting_link: None,
            logo: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            deleted_at: None,
        }
    }

    #[test]
    fn serializes_game() {
        let json = serde_json::to_value(Game::from(listing())).unwrap();

        assert_eq!(json["slug"], "the-mole");
        assert_eq!(json["format"]["code"], "MO");
        assert_eq!(json["format"]["label"], "The Mole");
        assert_eq!(json["duration"]["label"], "Semester");
        assert_eq!(json["country"], 1);
        assert!(json["region"].is_null());
        assert_eq!(json["email"], "mole@example.com");
        assert_eq!(json["instagram_handle"], "themole");
        assert_eq!(json["lrg_wiki_page"], "The_Mole");
        assert!(json["youtube_link"].is_null());
    }

    #[test]
    fn serializes_game_detail() {
        let listing = listing();
        let start = Date::from_calendar_date(2025, Month::April, 1).unwrap();
        let schedule = Schedule::new(
            listing.id,
            vec![Season {
                number: SeasonNumber::new(2).unwrap(),
                name: None,
                link: None,
            }],
            vec![
                NextDate {
                    start: Some(start),
                    end: Date::from_calendar_date(2025, Month::April, 5).ok(),
                    label: None,
                },
                NextDate {
                    start: None,
                    end: None,
                    label: DateLabel::new("Fall 2025"),
                },
            ],
        );

        let detail = GameDetail::from(Detail { listing, schedule });
        let json = serde_json::to_value(detail).unwrap();

        assert_eq!(json["slug"], "the-mole");
        assert_eq!(json["seasons"][0]["number"], 2);
        assert_eq!(json["seasons"][0]["label"], "Season 2");
        assert_eq!(json["next_season_dates"][0]["start"], "2025-04-01");
        assert_eq!(json["next_season_dates"][0]["end"], "2025-04-05");
        assert_eq!(
            json["next_season_dates"][0]["display"],
            "April 01–05, 2025",
        );
        assert!(json["next_season_dates"][1]["start"].is_null());
        assert_eq!(json["next_season_dates"][1]["display"], "Fall 2025");
    }
}
