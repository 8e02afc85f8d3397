// # procfs Interface Enumerator
//
// This crate finds the active network interface on Linux by reading the
// kernel's routing table and wireless statistics.
//
// ## Detection
//
// 1. Parse `/proc/net/route` and keep the default routes (destination
//    `00000000`) that are up
// 2. The one with the lowest metric carries traffic
// 3. It is wireless if `/proc/net/wireless` lists it or
//    `/sys/class/net/<iface>/wireless` exists; otherwise it is wired
//
// ## Platform Support
//
// Only meaningful on Linux. All paths are resolved below a configurable
// root so the parser can be exercised against a fake tree.

use netstatus_core::connection::{RAW_WIRED, RAW_WIRELESS};
use netstatus_core::traits::{ActiveInterface, InterfaceEnumerator};
use netstatus_core::{Error, Result};

use std::path::{Path, PathBuf};
use tracing::debug;

/// `RTF_UP` from `<linux/route.h>`
const RTF_UP: u32 = 0x0001;

/// A default-route entry of `/proc/net/route`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRoute {
    pub iface: String,
    pub metric: u32,
}

/// Interface enumerator over procfs and sysfs
pub struct ProcfsInterfaceEnumerator {
    root: PathBuf,
}

impl ProcfsInterfaceEnumerator {
    /// Enumerator over the live system (`/`)
    pub fn new() -> Self {
        Self::with_root("/")
    }

    /// Enumerator over a tree rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn is_wireless(&self, iface: &str) -> bool {
        let wireless = self.root.join("proc/net/wireless");
        if let Ok(contents) = tokio::fs::read_to_string(&wireless).await {
            if wireless_interfaces(&contents).any(|name| name == iface) {
                return true;
            }
        }

        let sysfs = self.root.join("sys/class/net").join(iface).join("wireless");
        tokio::fs::try_exists(&sysfs).await.unwrap_or(false)
    }
}

impl Default for ProcfsInterfaceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InterfaceEnumerator for ProcfsInterfaceEnumerator {
    async fn active_interface(&self) -> Result<Option<ActiveInterface>> {
        let route = self.root.join("proc/net/route");
        let contents = tokio::fs::read_to_string(&route).await.map_err(|e| {
            Error::interface(format!("Failed to read {}: {}", route.display(), e))
        })?;

        let Some(default) = default_route(&contents) else {
            debug!("No default route in {}", route.display());
            return Ok(None);
        };

        let kind = if self.is_wireless(&default.iface).await {
            RAW_WIRELESS
        } else {
            RAW_WIRED
        };

        debug!(
            "Default route via {} (metric {}, {})",
            default.iface, default.metric, kind
        );
        Ok(Some(ActiveInterface::new(default.iface, kind)))
    }
}

/// Pick the lowest-metric default route that is up
///
/// Malformed lines are skipped.
pub fn default_route(route_table: &str) -> Option<DefaultRoute> {
    route_table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 7 {
                return None;
            }

            let (iface, destination, flags, metric) = (fields[0], fields[1], fields[3], fields[6]);
            let flags = u32::from_str_radix(flags, 16).ok()?;
            if destination != "00000000" || flags & RTF_UP == 0 {
                return None;
            }

            Some(DefaultRoute {
                iface: iface.to_string(),
                metric: metric.parse().ok()?,
            })
        })
        .min_by_key(|route| route.metric)
}

/// Interface names listed in `/proc/net/wireless`
fn wireless_interfaces(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .lines()
        .skip(2)
        .filter_map(|line| line.split_once(':'))
        .map(|(name, _)| name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ROUTE_HEADER: &str =
        "Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT";

    const WIRELESS: &str = "\
Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
 face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
 wlan0: 0000   70.  -40.  -256        0      0      0      0      0        0
";

    fn route_table(rows: &[&str]) -> String {
        let mut table = ROUTE_HEADER.to_string();
        for row in rows {
            table.push('\n');
            table.push_str(row);
        }
        table
    }

    fn fake_root(route: Option<&str>, wireless: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("proc/net")).unwrap();
        if let Some(route) = route {
            fs::write(dir.path().join("proc/net/route"), route).unwrap();
        }
        if let Some(wireless) = wireless {
            fs::write(dir.path().join("proc/net/wireless"), wireless).unwrap();
        }
        dir
    }

    #[test]
    fn test_default_route_lowest_metric() {
        let table = route_table(&[
            "wlan0\t00000000\t0101A8C0\t0003\t0\t0\t600\t00000000\t0\t0\t0",
            "eth0\t00000000\t0100000A\t0003\t0\t0\t100\t00000000\t0\t0\t0",
            "eth0\t0000A8C0\t00000000\t0001\t0\t0\t100\t00FFFFFF\t0\t0\t0",
        ]);

        assert_eq!(
            default_route(&table),
            Some(DefaultRoute {
                iface: "eth0".to_string(),
                metric: 100,
            })
        );
    }

    #[test]
    fn test_default_route_ignores_down_and_malformed() {
        let table = route_table(&[
            "eth0\t00000000\t0100000A\t0002\t0\t0\t0\t00000000\t0\t0\t0",
            "garbage",
            "wlan0\t00000000\t0101A8C0\tzz\t0\t0\t600\t00000000\t0\t0\t0",
        ]);
        assert_eq!(default_route(&table), None);
        assert_eq!(default_route(ROUTE_HEADER), None);
    }

    #[test]
    fn test_wireless_interfaces() {
        assert_eq!(wireless_interfaces(WIRELESS).collect::<Vec<_>>(), vec!["wlan0"]);
        assert_eq!(wireless_interfaces("").count(), 0);
    }

    #[tokio::test]
    async fn test_wired_interface() {
        let table = route_table(&["eth0\t00000000\t0100000A\t0003\t0\t0\t100\t00000000\t0\t0\t0"]);
        let root = fake_root(Some(&table), Some(WIRELESS));

        let enumerator = ProcfsInterfaceEnumerator::with_root(root.path());
        assert_eq!(
            enumerator.active_interface().await.unwrap(),
            Some(ActiveInterface::new("eth0", RAW_WIRED))
        );
    }

    #[tokio::test]
    async fn test_wireless_from_procfs() {
        let table = route_table(&["wlan0\t00000000\t0101A8C0\t0003\t0\t0\t600\t00000000\t0\t0\t0"]);
        let root = fake_root(Some(&table), Some(WIRELESS));

        let enumerator = ProcfsInterfaceEnumerator::with_root(root.path());
        assert_eq!(
            enumerator.active_interface().await.unwrap(),
            Some(ActiveInterface::new("wlan0", RAW_WIRELESS))
        );
    }

    #[tokio::test]
    async fn test_wireless_from_sysfs() {
        let table = route_table(&["wlp2s0\t00000000\t0101A8C0\t0003\t0\t0\t600\t00000000\t0\t0\t0"]);
        let root = fake_root(Some(&table), None);
        fs::create_dir_all(root.path().join("sys/class/net/wlp2s0/wireless")).unwrap();

        let enumerator = ProcfsInterfaceEnumerator::with_root(root.path());
        let interface = enumerator.active_interface().await.unwrap().unwrap();
        assert_eq!(interface.kind.as_deref(), Some(RAW_WIRELESS));
    }

    #[tokio::test]
    async fn test_no_default_route() {
        let root = fake_root(Some(ROUTE_HEADER), None);
        let enumerator = ProcfsInterfaceEnumerator::with_root(root.path());
        assert_eq!(enumerator.active_interface().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_route_table() {
        let root = fake_root(None, None);
        let enumerator = ProcfsInterfaceEnumerator::with_root(root.path());
        assert!(matches!(
            enumerator.active_interface().await,
            Err(Error::Interface(_))
        ));
    }
}
