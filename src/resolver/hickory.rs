//! SRV resolver backed by [`hickory_resolver`].

use super::SrvResolver;
use crate::{SrvName, SrvRecord};
use async_trait::async_trait;
use hickory_resolver::{
    name_server::ConnectionProvider, proto::rr::rdata::SRV, Name, ResolveError, Resolver,
};

#[async_trait]
impl<P> SrvResolver for Resolver<P>
where
    P: ConnectionProvider,
{
    type Record = SRV;
    type Error = ResolveError;

    async fn get_srv_records_unordered(
        &self,
        srv: &SrvName,
    ) -> Result<Vec<Self::Record>, Self::Error> {
        let lookup = self.srv_lookup(srv.to_string()).await?;
        Ok(lookup.into_iter().collect())
    }
}

impl SrvRecord for SRV {
    type Target = Name;

    fn target(&self) -> &Self::Target {
        self.target()
    }

    fn port(&self) -> u16 {
        self.port()
    }

    fn priority(&self) -> u16 {
        self.priority()
    }

    fn weight(&self) -> u16 {
        self.weight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_SRV: &str = "_detsys_ids._tcp.install.determinate.systems.";

    #[test]
    fn srv_endpoint_drops_root_label() {
        let target = Name::from_ascii("node-0.cockroachdb.default.svc.cluster.local.").unwrap();
        let srv = SRV::new(0, 10, 26257, target);
        assert_eq!(
            srv.endpoint().as_str(),
            "node-0.cockroachdb.default.svc.cluster.local:26257"
        );
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn srv_lookup() -> Result<(), ResolveError> {
        let name = SrvName::parse(EXAMPLE_SRV).unwrap();
        let records = Resolver::builder_tokio()?
            .build()
            .get_srv_records(&name)
            .await?;
        assert_ne!(records.len(), 0);
        assert!(records
            .windows(2)
            .all(|pair| pair[0].priority() <= pair[1].priority()));
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn invalid_host() {
        let name = SrvName::parse("_http._tcp.foobar.deshaw.com").unwrap();
        Resolver::builder_tokio()
            .unwrap()
            .build()
            .get_srv_records(&name)
            .await
            .unwrap_err();
    }
}
