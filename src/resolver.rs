use std::net::IpAddr;

use trust_dns_resolver::TokioAsyncResolver;

use crate::error::MonitorError;


/// Maps a hostname to the addresses it currently resolves to.
pub trait HostResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, MonitorError>;
}


/// Resolves hostnames through the system's configured DNS servers.
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}
impl DnsResolver {
    pub fn from_system_conf() -> Result<Self, MonitorError> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| MonitorError::ResolverSetup(e.to_string()))?;
        Ok(Self { resolver })
    }
}
impl HostResolver for DnsResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, MonitorError> {
        let lookup = self.resolver.lookup_ip(name).await
            .map_err(|e| MonitorError::Resolve {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(lookup.iter().collect())
    }
}
