//! Address and port producers.

use std::net::{Ipv4Addr, Ipv6Addr};

use rand::Rng;

/// Random IPv4 address. The low byte of the drawn word is the first octet.
pub fn ipv4<R: Rng>(rng: &mut R) -> Ipv4Addr {
    Ipv4Addr::from(rng.gen::<u32>().to_le_bytes())
}

/// Random IPv6 address with roughly 30% of its bytes zeroed, so the
/// compressed `::` forms show up regularly.
pub fn ipv6<R: Rng>(rng: &mut R) -> Ipv6Addr {
    let mut octets = [0u8; 16];
    rng.fill(&mut octets);
    for octet in octets.iter_mut() {
        if rng.gen::<f64>() < 0.3 {
            *octet = 0;
        }
    }
    Ipv6Addr::from(octets)
}

/// Random port in `0..=65535`.
pub fn port<R: Rng>(rng: &mut R) -> u16 {
    rng.gen()
}

/// Random 6-byte hardware address in colon-separated lowercase hex.
pub fn hardware_addr<R: Rng>(rng: &mut R) -> String {
    let mut octets = [0u8; 6];
    rng.fill(&mut octets);
    octets
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ipv4_deterministic() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        assert_eq!(ipv4(&mut rng1), ipv4(&mut rng2));
    }

    #[test]
    fn test_ipv6_has_zeroed_bytes() {
        let mut rng = StdRng::seed_from_u64(42);
        let zeroed: usize = (0..100)
            .map(|_| ipv6(&mut rng).octets().iter().filter(|b| **b == 0).count())
            .sum();
        // 1600 bytes drawn, about 30% forced to zero
        assert!(zeroed > 300, "only {zeroed} zero bytes");
    }

    #[test]
    fn test_hardware_addr_format() {
        let mut rng = StdRng::seed_from_u64(42);
        let addr = hardware_addr(&mut rng);
        assert_eq!(addr.len(), 17);
        assert_eq!(addr.split(':').count(), 6);
        assert!(addr
            .split(':')
            .all(|part| u8::from_str_radix(part, 16).is_ok()));
    }
}
