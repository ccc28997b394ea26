//! [`Attributes`] of a [`Listing`] being written.

use common::operations::{By, Select};
use derive_more::{Display, Error};
use tracerr::Traced;

use crate::{
    domain::{
        geography::{city, country, region, City, Country, Region},
        listing, Listing,
    },
    infra::{database, Database},
};

/// Editable attributes of a [`Listing`].
#[derive(Clone, Debug)]
pub struct Attributes {
    /// [`listing::Name`] of the [`Listing`].
    pub name: listing::Name,

    /// [`listing::Format`] of the [`Listing`].
    pub format: listing::Format,

    /// [`listing::Duration`] of the [`Listing`].
    pub duration: Option<listing::Duration>,

    /// [`listing::FilmingStatus`] of the [`Listing`].
    pub filming_status: Option<listing::FilmingStatus>,

    /// Indicator whether the [`Listing`] is still running.
    pub active: Option<bool>,

    /// Indicator whether the [`Listing`] is played for charity.
    pub for_charity: Option<bool>,

    /// Indicator whether the [`Listing`] casts friends and family only.
    pub friends_and_family: Option<bool>,

    /// Indicator whether the [`Listing`] is a college game.
    pub college_game: Option<bool>,

    /// [`listing::CollegeName`] of a college game.
    pub college_name: Option<listing::CollegeName>,

    /// Country the [`Listing`] takes place in.
    pub country: country::Id,

    /// Region the [`Listing`] takes place in, if any.
    pub region: Option<region::Id>,

    /// City the [`Listing`] takes place in, if any.
    pub city: Option<city::Id>,

    /// [`listing::Description`] of the [`Listing`].
    pub description: Option<listing::Description>,

    /// [`listing::Host`] of the [`Listing`].
    pub host: Option<listing::Host>,

    /// Contact [`listing::Email`] of the [`Listing`].
    pub email: Option<listing::Email>,

    /// Website of the [`Listing`].
    pub website: Option<listing::Link>,

    /// Instagram handle of the [`Listing`].
    pub instagram_handle: Option<listing::Handle>,

    /// Facebook page name of the [`Listing`].
    pub facebook_link: Option<listing::Handle>,

    /// YouTube path of the [`Listing`].
    pub youtube_link: Option<listing::Handle>,

    /// Live Reality Games wiki page of the [`Listing`].
    pub lrg_wiki_page: Option<listing::Handle>,

    /// Casting call of the [`Listing`].
    pub casting_link: Option<listing::Link>,

    /// [`listing::Logo`] of the [`Listing`].
    pub logo: Option<listing::Logo>,
}

impl Attributes {
    /// Creates new [`Attributes`] with the required values only.
    #[must_use]
    pub fn new(
        name: listing::Name,
        format: listing::Format,
        country: country::Id,
    ) -> Self {
        Self {
            name,
            format,
            duration: None,
            filming_status: None,
            active: None,
            for_charity: None,
            friends_and_family: None,
            college_game: None,
            college_name: None,
            country,
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
        }
    }

    /// Validates these [`Attributes`] against the geography reference.
    ///
    /// # Errors
    ///
    /// - [`Invalid`] if the [`Attributes`] are inconsistent.
    /// - [`database::Error`] if the [`Database`] failed.
    pub(crate) async fn validate<Db, E>(&self, db: &Db) -> Result<(), Traced<E>>
    where
        Db: Database<
                Select<By<Option<Country>, country::Id>>,
                Ok = Option<Country>,
                Err = Traced<database::Error>,
            > + Database<
                Select<By<Option<Region>, region::Id>>,
                Ok = Option<Region>,
                Err = Traced<database::Error>,
            > + Database<
                Select<By<Option<City>, city::Id>>,
                Ok = Option<City>,
                Err = Traced<database::Error>,
            >,
        E: From<database::Error> + From<Invalid>,
    {
        if self.college_name.is_some() && self.college_game != Some(true) {
            return Err(tracerr::new!(E::from(Invalid::CollegeNameOfNonCollege)));
        }

        let country = db
            .execute(Select(By::<Option<Country>, _>::new(self.country)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if country.is_none() {
            return Err(tracerr::new!(E::from(Invalid::UnknownCountry)));
        }

        if let Some(id) = self.region {
            let region = db
                .execute(Select(By::<Option<Region>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(Invalid::UnknownRegion)
                .map_err(tracerr::from_and_wrap!(=> E))?;
            if region.country != self.country {
                return Err(tracerr::new!(E::from(Invalid::RegionNotInCountry)));
            }
        }

        if let Some(id) = self.city {
            let Some(region) = self.region else {
                return Err(tracerr::new!(E::from(Invalid::CityWithoutRegion)));
            };
            let city = db
                .execute(Select(By::<Option<City>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(Invalid::UnknownCity)
                .map_err(tracerr::from_and_wrap!(=> E))?;
            if city.region != region {
                return Err(tracerr::new!(E::from(Invalid::CityNotInRegion)));
            }
        }

        Ok(())
    }

    /// Writes these [`Attributes`] into the provided [`Listing`].
    ///
    /// The [`listing::Slug`] is left untouched.
    pub(crate) fn write_to(self, listing: &mut Listing) {
        let Self {
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
        } = self;

        listing.name = name;
        listing.format = format;
        listing.duration = duration;
        listing.filming_status = filming_status;
        listing.active = active;
        listing.for_charity = for_charity;
        listing.friends_and_family = friends_and_family;
        listing.college_game = college_game;
        listing.college_name = college_name;
        listing.country = country;
        listing.region = region;
        listing.city = city;
        listing.description = description;
        listing.host = host;
        listing.email = email;
        listing.website = website;
        listing.instagram_handle = instagram_handle;
        listing.facebook_link = facebook_link;
        listing.youtube_link = youtube_link;
        listing.lrg_wiki_page = lrg_wiki_page;
        listing.casting_link = casting_link;
        listing.logo = logo;
    }
}

/// Inconsistency of [`Attributes`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum Invalid {
    /// Country doesn't exist.
    #[display("Country does not exist")]
    UnknownCountry,

    /// Region doesn't exist.
    #[display("Region does not exist")]
    UnknownRegion,

    /// City doesn't exist.
    #[display("City does not exist")]
    UnknownCity,

    /// Region belongs to another country.
    #[display("Region does not belong to the country")]
    RegionNotInCountry,

    /// City belongs to another region.
    #[display("City does not belong to the region")]
    CityNotInRegion,

    /// City is specified without a region.
    #[display("City is specified without a region")]
    CityWithoutRegion,

    /// College name is specified for a game that isn't a college one.
    #[display("College name is specified for a non-college game")]
    CollegeNameOfNonCollege,
}
