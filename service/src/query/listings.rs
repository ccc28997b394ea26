//! [`Query`] collection related to the multiple [`Listing`]s.

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::{domain::Listing, Config};
use crate::{
    infra::{database, Database},
    read::listing::{list, FilterCriteria},
    Service,
};

use super::Query;

/// Queries a [`list::Page`] of [`Listing`]s.
///
/// The page size is [`Config::per_page`].
#[derive(Clone, Debug, Default)]
pub struct List {
    /// Raw requested page number.
    ///
    /// A missing or malformed number requests the first page, and a number
    /// out of range requests the last one.
    pub page: Option<String>,

    /// [`FilterCriteria`] to apply.
    pub filter: FilterCriteria,
}

impl<Db> Query<List> for Service<Db>
where
    Db: Database<
        Select<By<list::Page, list::Selector>>,
        Ok = list::Page,
        Err = Traced<database::Error>,
    >,
{
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        List { page, filter }: List,
    ) -> Result<Self::Ok, Self::Err> {
        let arguments =
            list::Arguments::new(page.as_deref(), self.config().per_page);
        self.database()
            .execute(Select(By::new(list::Selector { arguments, filter })))
            .await
            .map_err(tracerr::wrap!())
    }
}
