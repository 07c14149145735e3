//! IPv4 address blocks in CIDR notation.
//!
//! Provides [`Ipv4`] for representing an address block, along with the mask,
//! broadcast and child-block arithmetic used to carve subnet tiers out of a
//! base allocation.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Addresses the provider keeps back in every subnet: network, router, DNS,
/// one reserved for future use, and broadcast.
pub const RESERVED_HOSTS: u64 = 5;

/// Errors raised while parsing or doing arithmetic on CIDR blocks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CidrError {
    #[error("expected <address>/<prefix>, got '{0}'")]
    Malformed(String),
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix length '{0}'")]
    InvalidPrefix(String),
    #[error("prefix length /{0} is longer than /32")]
    PrefixTooLong(u8),
    #[error("{addr}/{mask} has host bits set, the network address is {network}/{mask}")]
    HostBitsSet {
        addr: Ipv4Addr,
        mask: u8,
        network: Ipv4Addr,
    },
    #[error("child index {index} does not fit in {newbits} new bits")]
    ChildOutOfRange { index: u64, newbits: u8 },
    #[error("address arithmetic overflowed past 255.255.255.255")]
    Overflow,
}

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// Lengths above 32 are treated as 32.
///
/// # Examples
/// ```
/// use network_topology_planner::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24), 0xFFFFFF00);
/// assert_eq!(get_cidr_mask(0), 0);
/// ```
pub fn get_cidr_mask(len: u8) -> u32 {
    let right_len = MAX_LENGTH - len.min(MAX_LENGTH);
    let all_bits = u32::MAX as u64;
    ((all_bits >> right_len) << right_len) as u32
}

/// Number of hosts a workload can actually use in a subnet of the given
/// prefix length, after the provider's reserved addresses.
///
/// Returns `None` when the block is too small to hold any host.
pub fn usable_hosts(len: u8) -> Option<u64> {
    if len > MAX_LENGTH {
        return None;
    }
    let total = 1u64 << (MAX_LENGTH - len);
    total.checked_sub(RESERVED_HOSTS).filter(|n| *n > 0)
}

/// The longest prefix `ip` can be the network address of, based on its
/// trailing zero bits.
pub fn lo_mask(ip: Ipv4Addr) -> u8 {
    let trailing_zeros = u32::from(ip).trailing_zeros() as u8;
    MAX_LENGTH - trailing_zeros.min(MAX_LENGTH)
}

/// IPv4 address block in CIDR notation.
///
/// Ordering is by address first, then by prefix length, so a larger block
/// sorts before the smaller blocks that start at the same address.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    addr: Ipv4Addr,
    mask: u8,
}

impl Ipv4 {
    /// `0.0.0.0/0`, the destination of a default route.
    pub const DEFAULT_ROUTE: Ipv4 = Ipv4 {
        addr: Ipv4Addr::UNSPECIFIED,
        mask: 0,
    };

    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    ///
    /// Host bits below the prefix are accepted and kept; see
    /// [`Ipv4::network`] for the strict form.
    pub fn new(addr_cidr: &str) -> Result<Ipv4, CidrError> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| CidrError::Malformed(addr_cidr.to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| CidrError::InvalidAddress(addr.to_string()))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| CidrError::InvalidPrefix(mask.to_string()))?;
        Ipv4::from_parts(addr, mask)
    }

    /// Parse a CIDR string that must name a network address.
    pub fn network(addr_cidr: &str) -> Result<Ipv4, CidrError> {
        let ipv4 = Ipv4::new(addr_cidr)?;
        if ipv4.addr != ipv4.lo() {
            return Err(CidrError::HostBitsSet {
                addr: ipv4.addr,
                mask: ipv4.mask,
                network: ipv4.lo(),
            });
        }
        Ok(ipv4)
    }

    pub fn from_parts(addr: Ipv4Addr, mask: u8) -> Result<Ipv4, CidrError> {
        if mask > MAX_LENGTH {
            return Err(CidrError::PrefixTooLong(mask));
        }
        Ok(Ipv4 { addr, mask })
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// The prefix length (0-32).
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Get the lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & get_cidr_mask(self.mask))
    }

    /// Get the highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        let mask = get_cidr_mask(self.mask);
        Ipv4Addr::from((u32::from(self.addr) & mask) | !mask)
    }

    /// Number of addresses in the block.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.mask)
    }

    pub fn usable_hosts(&self) -> Option<u64> {
        usable_hosts(self.mask)
    }

    /// True when `other` lies entirely inside this block.
    pub fn covers(&self, other: &Ipv4) -> bool {
        self.lo() <= other.lo() && other.hi() <= self.hi()
    }

    /// True when the two blocks share at least one address.
    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }

    /// Number of child blocks produced by adding `newbits` to the prefix.
    ///
    /// Returns `None` if the resulting prefix would be longer than /32.
    pub fn child_count(&self, newbits: u8) -> Option<u64> {
        if self.mask as u16 + newbits as u16 > MAX_LENGTH as u16 {
            None
        } else {
            Some(1u64 << newbits)
        }
    }

    /// The `index`-th child block after adding `newbits` bits to the prefix,
    /// counted from the start of this block.
    pub fn child(&self, newbits: u8, index: u64) -> Result<Ipv4, CidrError> {
        let new_mask = self.mask as u16 + newbits as u16;
        if new_mask > MAX_LENGTH as u16 {
            return Err(CidrError::PrefixTooLong(new_mask.min(u8::MAX as u16) as u8));
        }
        let new_mask = new_mask as u8;
        if index >= 1u64 << newbits {
            return Err(CidrError::ChildOutOfRange { index, newbits });
        }
        let child_size = 1u64 << (MAX_LENGTH - new_mask);
        let start = u32::from(self.lo()) as u64 + index * child_size;
        let start = u32::try_from(start).map_err(|_| CidrError::Overflow)?;
        Ok(Ipv4 {
            addr: Ipv4Addr::from(start),
            mask: new_mask,
        })
    }
}

impl FromStr for Ipv4 {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(de::Error::custom)
    }
}

impl fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
