//! Region data source

use super::mapper;
use super::model::RegionModel;
use crate::context::Context;
use crate::error::{During, Result};
use crate::resource::DataSource;
use async_trait::async_trait;
use catalyst_client::RegionApi;
use std::sync::Arc;

const KIND: &str = "region";

/// How the region is located
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lookup {
    /// Single `GetRegion` round trip
    #[default]
    ByName,
    /// `ListRegions`, then a linear scan
    Scan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionQuery {
    pub name: String,
}

pub struct RegionDataSource<C: ?Sized> {
    client: Arc<C>,
    lookup: Lookup,
}

impl<C: RegionApi + ?Sized> RegionDataSource<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            lookup: Lookup::default(),
        }
    }

    pub fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }
}

#[async_trait]
impl<C: RegionApi + ?Sized + 'static> DataSource for RegionDataSource<C> {
    type Config = RegionQuery;
    type Model = RegionModel;

    const TYPE_NAME: &'static str = "catalyst_region";

    async fn read(&self, ctx: &Context, query: &RegionQuery) -> Result<Option<RegionModel>> {
        let name = query.name.as_str();
        let found = match self.lookup {
            Lookup::ByName => match ctx
                .run(self.client.get_region(name))
                .await
                .during("read", KIND, name)
            {
                Ok(region) => Some(region),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            },
            Lookup::Scan => ctx
                .run(self.client.list_regions())
                .await
                .during("list", KIND, name)?
                .into_iter()
                .find(|r| r.name() == Some(name)),
        };

        let Some(region) = found else {
            tracing::debug!("Region {} not found", name);
            return Ok(None);
        };

        let mut model = RegionModel {
            name: name.to_string(),
            ..Default::default()
        };
        mapper::refresh(&mut model, &region);
        Ok(Some(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Attr;
    use catalyst_client::{MockCatalyst, Op, Region, RegionSpec};

    fn api() -> Arc<MockCatalyst> {
        let region = Region::new(
            "r1",
            RegionSpec {
                host: Some("h1".to_string()),
                ingress: Some("https://*.x.io:443".to_string()),
                ..Default::default()
            },
        );
        Arc::new(MockCatalyst::builder().with_region(region).build())
    }

    fn query(name: &str) -> RegionQuery {
        RegionQuery {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_lookup_by_name() {
        let api = api();
        let source = RegionDataSource::new(api.clone());

        let model = source
            .read(&Context::background(), &query("r1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(model.host, Attr::Known("h1".to_string()));
        assert!(!model.join_token.is_known());
        assert_eq!(api.count(Op::GetRegion), 1);
        assert_eq!(api.count(Op::ListRegions), 0);
    }

    #[tokio::test]
    async fn test_lookup_by_scan() {
        let api = api();
        let source = RegionDataSource::new(api.clone()).with_lookup(Lookup::Scan);

        let model = source
            .read(&Context::background(), &query("r1"))
            .await
            .unwrap();

        assert!(model.is_some());
        assert_eq!(api.count(Op::ListRegions), 1);
        assert_eq!(api.count(Op::GetRegion), 0);
    }

    #[tokio::test]
    async fn test_missing_region_yields_nothing() {
        for lookup in [Lookup::ByName, Lookup::Scan] {
            let source = RegionDataSource::new(api()).with_lookup(lookup);
            let model = source
                .read(&Context::background(), &query("nope"))
                .await
                .unwrap();
            assert!(model.is_none());
        }
    }
}
