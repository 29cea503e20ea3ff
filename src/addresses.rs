use std::collections::HashSet;
use std::net::IpAddr;

use tracing::{info, warn};

use crate::error::MonitorError;
use crate::resolver::HostResolver;


/// The addresses whose traffic is recorded.
///
/// Addresses are stored in canonical form, so an IPv4-mapped IPv6 literal such as
/// `::ffff:10.0.0.5` tracks the same peer as `10.0.0.5`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TrackedAddresses {
    addresses: HashSet<IpAddr>,
}
impl TrackedAddresses {
    pub fn new() -> Self {
        Self {
            addresses: HashSet::new(),
        }
    }

    /// Adds an address given in textual form. Returns whether it was newly added.
    pub fn add(&mut self, literal: &str) -> Result<bool, MonitorError> {
        let address: IpAddr = literal.trim().parse()
            .map_err(|_| MonitorError::InvalidAddress(literal.to_owned()))?;
        Ok(self.insert(address))
    }

    pub fn insert(&mut self, address: IpAddr) -> bool {
        self.addresses.insert(address.to_canonical())
    }

    pub fn contains(&self, address: IpAddr) -> bool {
        self.addresses.contains(&address.to_canonical())
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// The tracked addresses in ascending order.
    pub fn sorted(&self) -> Vec<IpAddr> {
        let mut addresses: Vec<IpAddr> = self.addresses.iter().copied().collect();
        addresses.sort_unstable();
        addresses
    }

    /// Builds the set from user-supplied targets.
    ///
    /// Targets that parse as IP addresses are taken as-is; everything else is looked up as a
    /// hostname and all of its addresses are tracked. A failed lookup only drops that target.
    /// Fails with [`MonitorError::NoTargets`] if nothing at all could be tracked.
    pub async fn from_targets<R: HostResolver>(targets: &[String], resolver: &R) -> Result<Self, MonitorError> {
        let mut tracked = Self::new();

        for target in targets {
            let target = target.trim();
            if target.is_empty() {
                continue;
            }

            if tracked.add(target).is_ok() {
                continue;
            }

            info!("resolving hostname {}", target);
            match resolver.resolve(target).await {
                Ok(addresses) if addresses.is_empty() => {
                    warn!("{} did not resolve to any address", target);
                },
                Ok(addresses) => {
                    for address in addresses {
                        tracked.insert(address);
                    }
                },
                Err(e) => {
                    warn!("{}", e);
                },
            }
        }

        if tracked.is_empty() {
            return Err(MonitorError::NoTargets);
        }
        Ok(tracked)
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::Ipv4Addr;

    use super::*;

    struct FixedResolver {
        names: HashMap<&'static str, Vec<IpAddr>>,
    }
    impl HostResolver for FixedResolver {
        async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, MonitorError> {
            self.names.get(name)
                .cloned()
                .ok_or_else(|| MonitorError::Resolve {
                    name: name.to_owned(),
                    reason: "no such host".to_owned(),
                })
        }
    }

    fn resolver() -> FixedResolver {
        let mut names = HashMap::new();
        names.insert("example.com", vec![
            IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
            "2606:2800:220:1:248:1893:25c8:1946".parse().unwrap(),
        ]);
        names.insert("empty.example", vec![]);
        FixedResolver { names }
    }

    fn targets(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn add_is_idempotent() {
        let mut once = TrackedAddresses::new();
        once.add("10.0.0.5").unwrap();

        let mut twice = TrackedAddresses::new();
        assert!(twice.add("10.0.0.5").unwrap());
        assert!(!twice.add("10.0.0.5").unwrap());

        assert_eq!(once.len(), twice.len());
        assert_eq!(once, twice);
    }

    #[test]
    fn add_rejects_non_addresses() {
        let mut tracked = TrackedAddresses::new();
        assert!(matches!(tracked.add("example.com"), Err(MonitorError::InvalidAddress(_))));
        assert!(matches!(tracked.add("10.0.0.256"), Err(MonitorError::InvalidAddress(_))));
        assert!(tracked.is_empty());
    }

    #[test]
    fn add_accepts_both_families() {
        let mut tracked = TrackedAddresses::new();
        tracked.add(" 192.0.2.1 ").unwrap();
        tracked.add("2001:db8::1").unwrap();
        assert_eq!(tracked.len(), 2);
        assert!(tracked.contains(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))));
    }

    #[test]
    fn mapped_addresses_are_canonical() {
        let mut tracked = TrackedAddresses::new();
        tracked.add("::ffff:10.0.0.5").unwrap();
        assert!(!tracked.add("10.0.0.5").unwrap());
        assert!(tracked.contains(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))));
    }

    #[tokio::test]
    async fn literals_and_hostnames() {
        let tracked = TrackedAddresses::from_targets(
            &targets(&["10.0.0.5", "", "  example.com ", "10.0.0.5"]),
            &resolver(),
        ).await.unwrap();

        assert_eq!(tracked.len(), 3);
        assert!(tracked.contains(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))));
        assert_eq!(tracked.sorted()[0], IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)));
    }

    #[tokio::test]
    async fn resolution_failures_are_skipped() {
        let tracked = TrackedAddresses::from_targets(
            &targets(&["no.such.host", "192.0.2.7"]),
            &resolver(),
        ).await.unwrap();
        assert_eq!(tracked.sorted(), vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7))]);
    }

    #[tokio::test]
    async fn nothing_resolvable_is_fatal() {
        let result = TrackedAddresses::from_targets(
            &targets(&["no.such.host", "empty.example", " "]),
            &resolver(),
        ).await;
        assert!(matches!(result, Err(MonitorError::NoTargets)));
    }
}
