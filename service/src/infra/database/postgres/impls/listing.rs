//! [`Listing`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    pagination::Page,
    Kind,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{
        database::{
            self,
            postgres::{Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read::{
        listing::{list, FilterCriteria, SiblingsOf, TakenSlugs, TriState},
        map,
    },
};

/// Columns of the `listings` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, slug, name, format, duration, filming_status, \
    active, for_charity, friends_and_family, college_game, college_name, \
    country_id, region_id, city_id, \
    description, host, email, website, \
    instagram_handle, facebook_link, youtube_link, lrg_wiki_page, \
    casting_link, logo, \
    created_at, updated_at, deleted_at";

/// Reads a [`Listing`] out of the provided [`Row`] selected with [`COLUMNS`].
fn from_row(row: &Row) -> Listing {
    Listing {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        format: row.get("format"),
        duration: row.get("duration"),
        filming_status: row.get("filming_status"),
        active: row.get("active"),
        for_charity: row.get("for_charity"),
        friends_and_family: row.get("friends_and_family"),
        college_game: row.get("college_game"),
        college_name: row.get("college_name"),
        country: row.get("country_id"),
        region: row.get("region_id"),
        city: row.get("city_id"),
        description: row.get("description"),
        host: row.get("host"),
        email: row.get("email"),
        website: row.get("website"),
        instagram_handle: row.get("instagram_handle"),
        facebook_link: row.get("facebook_link"),
        youtube_link: row.get("youtube_link"),
        lrg_wiki_page: row.get("lrg_wiki_page"),
        casting_link: row.get("casting_link"),
        logo: row.get("logo"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted_at: row.get("deleted_at"),
    }
}

/// [`FilterCriteria`] values converted into SQL parameters.
struct Filtering<'f> {
    /// [`FilterCriteria`] being converted.
    filter: &'f FilterCriteria,

    /// Pattern of the text search, if any.
    pattern: Option<LikePattern>,

    /// Codes of the [`FilterCriteria::formats`].
    formats: Vec<&'static str>,

    /// Codes of the [`FilterCriteria::durations`].
    durations: Vec<&'static str>,

    /// Codes of the [`FilterCriteria::filming_statuses`].
    filming_statuses: Vec<&'static str>,
}

impl<'f> Filtering<'f> {
    /// Converts the provided [`FilterCriteria`].
    fn new(filter: &'f FilterCriteria) -> Self {
        Self {
            filter,
            pattern: filter.text.as_deref().map(LikePattern::containing),
            formats: filter.formats.iter().map(|f| f.code()).collect(),
            durations: filter.durations.iter().map(|d| d.code()).collect(),
            filming_statuses: filter
                .filming_statuses
                .iter()
                .map(|s| s.code())
                .collect(),
        }
    }

    /// Pushes the needed parameters into `ps` and returns the `WHERE`
    /// condition selecting active [`Listing`]s matching the
    /// [`FilterCriteria`].
    fn condition<'a>(&'a self, ps: &mut Vec<&'a (dyn ToSql + Sync)>) -> String {
        let mut push = |p: &'a (dyn ToSql + Sync)| {
            ps.push(p);
            ps.len()
        };

        let mut conds = vec!["deleted_at IS NULL".to_owned()];
        if let Some(pattern) = &self.pattern {
            let i = push(pattern);
            conds.push(format!(
                "(name ILIKE ${i}::VARCHAR \
                  OR description ILIKE ${i}::VARCHAR)",
            ));
        }
        for (column, codes) in [
            ("format", &self.formats),
            ("duration", &self.durations),
            ("filming_status", &self.filming_statuses),
        ] {
            if !codes.is_empty() {
                let i = push(codes);
                conds.push(format!("{column} = ANY(${i}::VARCHAR[])"));
            }
        }

        let f = self.filter;
        if let Some(id) = &f.country {
            conds.push(format!("country_id = ${}::INT8", push(id)));
        }
        if let Some(id) = &f.region {
            conds.push(format!("region_id = ${}::INT8", push(id)));
        } else if f.no_region {
            conds.push("region_id IS NULL".into());
        }
        if let Some(id) = &f.city {
            conds.push(format!("city_id = ${}::INT8", push(id)));
        } else if f.no_city {
            conds.push("city_id IS NULL".into());
        }

        conds.extend(
            [
                (f.inactive, "active IS NOT TRUE"),
                (f.college, "college_game"),
                (f.friends_and_family, "friends_and_family"),
                (f.charity, "for_charity"),
                (f.casting, "casting_link IS NOT NULL AND casting_link <> ''"),
            ]
            .into_iter()
            .filter_map(|(state, flag)| match state {
                TriState::Unrestricted => None,
                TriState::Exclude => Some(format!("({flag}) IS NOT TRUE")),
                TriState::Only => Some(format!("({flag}) IS TRUE")),
            }),
        );

        conds.into_iter().join(" AND ")
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE id = $1::UUID \
               AND deleted_at IS NULL",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Slug>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Slug>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slug = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE slug = $1::VARCHAR \
               AND deleted_at IS NULL",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&slug])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<TakenSlugs, SiblingsOf>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = TakenSlugs;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<TakenSlugs, SiblingsOf>>,
    ) -> Result<Self::Ok, Self::Err> {
        let SiblingsOf { base, except } = by.into_inner();
        let base: &str = base.as_ref();

        // `Base` consists of `[a-z0-9-]` only, so needs no regex escaping.
        const SQL: &str = "\
            SELECT slug \
            FROM listings \
            WHERE deleted_at IS NULL \
              AND (slug = $1::VARCHAR \
                   OR slug ~ ('^' || $1::VARCHAR || '-[0-9]+$')) \
              AND ($2::UUID IS NULL OR id <> $2::UUID)";
        Ok(TakenSlugs(
            self.query(SQL, &[&base, &except])
                .await
                .map_err(tracerr::wrap!())?
                .into_iter()
                .map(|row| row.get("slug"))
                .collect(),
        ))
    }
}

impl<C> Database<Insert<Listing>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Listing>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
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
            deleted_at,
        } = listing;

        let sql = format!(
            "INSERT INTO listings ({COLUMNS}) \
             VALUES (\
                 $1::UUID, $2::VARCHAR, $3::VARCHAR, \
                 $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, \
                 $7::BOOL, $8::BOOL, $9::BOOL, $10::BOOL, $11::VARCHAR, \
                 $12::INT8, $13::INT8, $14::INT8, \
                 $15::TEXT, $16::VARCHAR, $17::VARCHAR, $18::VARCHAR, \
                 $19::VARCHAR, $20::VARCHAR, $21::VARCHAR, $22::VARCHAR, \
                 $23::VARCHAR, $24::VARCHAR, \
                 $25::TIMESTAMPTZ, $26::TIMESTAMPTZ, $27::TIMESTAMPTZ\
             ) \
             ON CONFLICT (id) DO UPDATE \
             SET slug = EXCLUDED.slug, \
                 name = EXCLUDED.name, \
                 format = EXCLUDED.format, \
                 duration = EXCLUDED.duration, \
                 filming_status = EXCLUDED.filming_status, \
                 active = EXCLUDED.active, \
                 for_charity = EXCLUDED.for_charity, \
                 friends_and_family = EXCLUDED.friends_and_family, \
                 college_game = EXCLUDED.college_game, \
                 college_name = EXCLUDED.college_name, \
                 country_id = EXCLUDED.country_id, \
                 region_id = EXCLUDED.region_id, \
                 city_id = EXCLUDED.city_id, \
                 description = EXCLUDED.description, \
                 host = EXCLUDED.host, \
                 email = EXCLUDED.email, \
                 website = EXCLUDED.website, \
                 instagram_handle = EXCLUDED.instagram_handle, \
                 facebook_link = EXCLUDED.facebook_link, \
                 youtube_link = EXCLUDED.youtube_link, \
                 lrg_wiki_page = EXCLUDED.lrg_wiki_page, \
                 casting_link = EXCLUDED.casting_link, \
                 logo = EXCLUDED.logo, \
                 updated_at = EXCLUDED.updated_at, \
                 deleted_at = EXCLUDED.deleted_at",
        );
        self.exec(
            sql.as_str(),
            &[
                &id,
                &slug,
                &name,
                &format,
                &duration,
                &filming_status,
                &active,
                &for_charity,
                &friends_and_family,
                &college_game,
                &college_name,
                &country,
                &region,
                &city,
                &description,
                &host,
                &email,
                &website,
                &instagram_handle,
                &facebook_link,
                &youtube_link,
                &lrg_wiki_page,
                &casting_link,
                &logo,
                &created_at,
                &updated_at,
                &deleted_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Listing, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM listings \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<list::Page, list::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector { arguments, filter } = by.into_inner();

        let filtering = Filtering::new(&filter);
        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let condition = filtering.condition(&mut ps);

        let sql = format!(
            "SELECT COUNT(*) AS total \
             FROM listings \
             WHERE {condition}",
        );
        let total: i64 = self
            .query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .first()
            .map_or(0, |row| row.get("total"));
        let total = usize::try_from(total).unwrap_or_default();

        let limit = i64::try_from(arguments.per_page()).unwrap_or(i64::MAX);
        let offset =
            i64::try_from(arguments.offset(total)).unwrap_or(i64::MAX);
        ps.push(&limit);
        let limit_idx = ps.len();
        ps.push(&offset);
        let offset_idx = ps.len();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE {condition} \
             ORDER BY LOWER(name), id \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8",
        );
        let items = self
            .query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect();

        Ok(Page {
            items,
            number: arguments.number(total),
            per_page: arguments.per_page(),
            total,
        })
    }
}

impl<C> Database<Select<By<Vec<Listing>, FilterCriteria>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, FilterCriteria>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();

        let filtering = Filtering::new(&filter);
        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let condition = filtering.condition(&mut ps);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE {condition} \
             ORDER BY LOWER(name), id",
        );
        Ok(self
            .query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<map::Counts, FilterCriteria>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = map::Counts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<map::Counts, FilterCriteria>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();

        let filtering = Filtering::new(&filter);
        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let condition = filtering.condition(&mut ps);

        let sql = format!(
            "SELECT country_id, region_id, city_id, COUNT(*) AS count \
             FROM listings \
             WHERE {condition} \
             GROUP BY country_id, region_id, city_id",
        );
        Ok(map::Counts(
            self.query(sql.as_str(), &ps)
                .await
                .map_err(tracerr::wrap!())?
                .into_iter()
                .map(|row| map::LocationCount {
                    country: row.get("country_id"),
                    region: row.get("region_id"),
                    city: row.get("city_id"),
                    count: u64::try_from(row.get::<_, i64>("count"))
                        .unwrap_or_default(),
                })
                .collect(),
        ))
    }
}
