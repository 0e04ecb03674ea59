//! Random host addresses inside an [`AddressRange`].

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::range::{AddressRange, Family};

/// Draws uniformly random addresses from a fixed range.
///
/// The random source is owned by the generator, so two generators built from
/// the same seed yield the same address sequence.
#[derive(Debug, Clone)]
pub struct AddressGenerator {
    range: AddressRange,
    rng: StdRng,
}

impl AddressGenerator {
    pub fn new(range: AddressRange, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(clock_seed);
        Self {
            range,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn range(&self) -> &AddressRange {
        &self.range
    }

    /// Random bits for the host part, network bits copied from the range.
    pub fn draw(&mut self) -> IpAddr {
        match (self.range.network(), self.range.mask()) {
            (IpAddr::V4(base), IpAddr::V4(mask)) => {
                let mut bytes = [0u8; 4];
                self.rng.fill_bytes(&mut bytes);
                IpAddr::V4(Ipv4Addr::from(combine(base.octets(), mask.octets(), bytes)))
            }
            (IpAddr::V6(base), IpAddr::V6(mask)) => {
                let mut bytes = [0u8; 16];
                self.rng.fill_bytes(&mut bytes);
                IpAddr::V6(Ipv6Addr::from(combine(base.octets(), mask.octets(), bytes)))
            }
            // A range never mixes families.
            _ => self.range.network(),
        }
    }

    pub fn family(&self) -> Family {
        self.range.family()
    }
}

fn combine<const N: usize>(base: [u8; N], mask: [u8; N], mut random: [u8; N]) -> [u8; N] {
    for i in 0..N {
        random[i] = (base[i] & mask[i]) | (random[i] & !mask[i]);
    }
    random
}

/// Seed derived from the wall clock, used when no seed is configured.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
