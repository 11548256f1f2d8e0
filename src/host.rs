//! Typed view of the `host` component.
//!
//! # Grammar Reference
//!
//! ```abnf
//! host       = IP-literal / IPv4address / reg-name
//! IP-literal = "[" ( IPv6address / IPv6addrz / IPvFuture ) "]"
//! IPv6addrz  = IPv6address "%25" ZoneID
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::constants::ZONE_ID_DELIMITER;

/// The host of a URI reference, classified by the grammar alternative it
/// matched.
///
/// Borrowed from a [`Uri`](crate::Uri); obtained with
/// [`Uri::host_kind`](crate::Uri::host_kind).
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use uri_grammar::{Host, Uri};
///
/// let uri = Uri::parse("http://192.0.2.16/").unwrap();
/// assert_eq!(uri.host_kind(), Some(Host::Ipv4(Ipv4Addr::new(192, 0, 2, 16))));
///
/// let uri = Uri::parse("http://256.0.0.1/").unwrap();
/// assert_eq!(uri.host_kind(), Some(Host::RegName("256.0.0.1")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Host<'a> {
    /// An IPv6 literal, optionally scoped by a zone identifier
    Ipv6 {
        /// The address
        address: Ipv6Addr,
        /// The RFC 6874 zone identifier, as written (still percent-encoded)
        zone_id: Option<&'a str>,
    },
    /// A future IP literal form (e.g. `v7.fe:80`)
    IpvFuture(&'a str),
    /// A dotted-quad IPv4 address
    Ipv4(Ipv4Addr),
    /// A registered name (may be empty)
    RegName(&'a str),
}

impl Host<'_> {
    /// Returns the IP address for the IPv4 and IPv6 variants.
    #[must_use]
    pub const fn ip(&self) -> Option<IpAddr> {
        match *self {
            Self::Ipv6 { address, .. } => Some(IpAddr::V6(address)),
            Self::Ipv4(address) => Some(IpAddr::V4(address)),
            Self::IpvFuture(_) | Self::RegName(_) => None,
        }
    }

    /// Returns true if this is a loopback address or the name `localhost`.
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        match self {
            Self::Ipv6 { address, .. } => address.is_loopback(),
            Self::Ipv4(address) => address.is_loopback(),
            Self::RegName(name) => name.eq_ignore_ascii_case("localhost"),
            Self::IpvFuture(_) => false,
        }
    }

    /// Returns true if the registered name is empty, as in `file:///etc`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::RegName(name) if name.is_empty())
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::RegName(_) => 0,
            Self::Ipv4(_) => 1,
            Self::Ipv6 { .. } => 2,
            Self::IpvFuture(_) => 3,
        }
    }
}

/// Writes the host in URI syntax; IP literals get their brackets back.
impl fmt::Display for Host<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv6 {
                address,
                zone_id: Some(zone),
            } => write!(f, "[{address}{ZONE_ID_DELIMITER}{zone}]"),
            Self::Ipv6 {
                address,
                zone_id: None,
            } => write!(f, "[{address}]"),
            Self::IpvFuture(literal) => write!(f, "[{literal}]"),
            Self::Ipv4(address) => write!(f, "{address}"),
            Self::RegName(name) => f.write_str(name),
        }
    }
}

impl PartialOrd for Host<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Host<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::RegName(a), Self::RegName(b)) | (Self::IpvFuture(a), Self::IpvFuture(b)) => {
                a.cmp(b)
            }
            (Self::Ipv4(a), Self::Ipv4(b)) => a.cmp(b),
            (
                Self::Ipv6 {
                    address: a,
                    zone_id: za,
                },
                Self::Ipv6 {
                    address: b,
                    zone_id: zb,
                },
            ) => a.cmp(b).then_with(|| za.cmp(zb)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}
