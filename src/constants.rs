//! Constants for URI reference parsing.

/// Separator between the scheme and the hierarchical part.
pub const SCHEME_DELIMITER: char = ':';

/// Prefix introducing an authority component.
pub const AUTHORITY_PREFIX: &str = "//";

/// Delimiter introducing the query component.
pub const QUERY_DELIMITER: char = '?';

/// Delimiter introducing the fragment component.
pub const FRAGMENT_DELIMITER: char = '#';

/// Separator between userinfo and host.
pub const USERINFO_DELIMITER: char = '@';

/// Separator between host and port.
pub const PORT_DELIMITER: char = ':';

/// Percent-encoded `%` that introduces an IPv6 zone identifier (RFC 6874).
pub const ZONE_ID_DELIMITER: &str = "%25";

/// Number of 16-bit groups in an IPv6 address.
pub const IPV6_GROUPS: usize = 8;

/// Maximum number of hex digits in one IPv6 group (`h16`).
pub const MAX_H16_DIGITS: usize = 4;

/// Number of IPv6 groups covered by a trailing dotted-quad `ls32`.
pub const IPV4_GROUP_WIDTH: usize = 2;

/// Characters of the `sub-delims` class.
pub const SUB_DELIMS: &str = "!$&'()*+,;=";

/// Non-alphanumeric characters of the `unreserved` class.
pub const UNRESERVED_MARKS: &str = "-._~";
