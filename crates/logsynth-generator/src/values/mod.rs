//! Field-value producers.
//!
//! Each producer draws one typed value from the caller's random stream. The
//! free functions in the submodules are used directly by the fixed-layout
//! variants; [`ValueProducer`] binds the same functions to the value pools of
//! a [`ValueContext`] for catalog-driven records.

pub mod http;
pub mod network;
pub mod numeric;
pub mod text;
pub mod uuid;

use chrono::{DateTime, Utc};
use rand::Rng;

/// Pick one element uniformly. `items` must not be empty.
pub fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Named value pools a catalog producer can draw keywords from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Words,
    Users,
    Privileges,
    Methods,
    Interfaces,
    TimeZones,
    Actions,
    Messages,
}

/// Value pools consumed by catalog producers.
#[derive(Debug, Clone, PartialEq)]
pub struct Pools {
    pub words: Vec<String>,
    pub users: Vec<String>,
    pub privileges: Vec<String>,
    pub methods: Vec<String>,
    pub interfaces: Vec<String>,
    pub time_zones: Vec<String>,
    pub actions: Vec<String>,
    pub messages: Vec<String>,
    pub text: String,
}

impl Pools {
    pub fn get(&self, pool: Pool) -> &[String] {
        match pool {
            Pool::Words => &self.words,
            Pool::Users => &self.users,
            Pool::Privileges => &self.privileges,
            Pool::Methods => &self.methods,
            Pool::Interfaces => &self.interfaces,
            Pool::TimeZones => &self.time_zones,
            Pool::Actions => &self.actions,
            Pool::Messages => &self.messages,
        }
    }
}

impl Default for Pools {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            words: owned(text::WORDS),
            users: owned(&["alice", "bob", "eve", "mallory"]),
            privileges: owned(&["Administrator", "User", "Guest"]),
            methods: owned(http::METHODS),
            interfaces: owned(&["eth0", "eth1"]),
            time_zones: owned(&["Europe/London", "Europe/Paris", "America/New_York"]),
            actions: owned(&["Accept", "Bypass", "Drop"]),
            messages: owned(&[
                "Signature violation rule ID 807: web-cgi /wwwboard/passwd.txt access",
                "Disallow Illegal URL.",
                "Transformed (xout) potential credit card numbers seen in server response",
                "Maximum number of potential credit card numbers seen",
                "Field consistency check failed for field passwd",
            ]),
            text: text::LOREM_IPSUM.to_string(),
        }
    }
}

/// Inputs a catalog producer may read besides the random stream.
#[derive(Debug, Clone, Copy)]
pub struct ValueContext<'a> {
    pub pools: &'a Pools,
    pub now: DateTime<Utc>,
    /// Render every UUID as the fixed zeroed-v4 value
    pub zero_uuid: bool,
}

/// A catalog-bound value producer.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueProducer {
    Ipv4,
    Ipv6,
    HardwareAddr,
    Uuid,
    Hash { bytes: usize },
    Domain,
    Url,
    Keyword(Pool),
    OneOf(&'static [&'static str]),
    IntRange { min: i64, max: i64 },
    FloatRange { min: f64, max: f64 },
    /// Epoch milliseconds within the hour before `now`
    RecentMillis,
    Text { min_words: usize, max_words: usize },
    UserAgent,
}

impl ValueProducer {
    /// Draw one value and render it as text.
    pub fn produce<R: Rng>(&self, ctx: &ValueContext<'_>, rng: &mut R) -> String {
        match self {
            ValueProducer::Ipv4 => network::ipv4(rng).to_string(),
            ValueProducer::Ipv6 => network::ipv6(rng).to_string(),
            ValueProducer::HardwareAddr => network::hardware_addr(rng),
            ValueProducer::Uuid => {
                if ctx.zero_uuid {
                    uuid::zeroed_uuid().to_string()
                } else {
                    uuid::uuid_v4(rng).to_string()
                }
            }
            ValueProducer::Hash { bytes } => text::hash_hex(rng, *bytes),
            ValueProducer::Domain => text::domain(rng, &ctx.pools.words),
            ValueProducer::Url => text::url(rng, &ctx.pools.words),
            ValueProducer::Keyword(pool) => text::keyword(rng, ctx.pools.get(*pool)).to_string(),
            ValueProducer::OneOf(items) => pick(rng, items).to_string(),
            ValueProducer::IntRange { min, max } => numeric::int_range(rng, *min, *max).to_string(),
            ValueProducer::FloatRange { min, max } => {
                numeric::float_range(rng, *min, *max).to_string()
            }
            ValueProducer::RecentMillis => numeric::recent_millis(rng, ctx.now).to_string(),
            ValueProducer::Text {
                min_words,
                max_words,
            } => text::lorem(rng, &ctx.pools.text, *min_words, *max_words),
            ValueProducer::UserAgent => http::user_agent(rng).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn context(pools: &Pools) -> ValueContext<'_> {
        ValueContext {
            pools,
            now: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            zero_uuid: false,
        }
    }

    #[test]
    fn test_keyword_comes_from_pool() {
        let pools = Pools::default();
        let ctx = context(&pools);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let user = ValueProducer::Keyword(Pool::Users).produce(&ctx, &mut rng);
            assert!(pools.users.contains(&user));
        }
    }

    #[test]
    fn test_one_of() {
        let pools = Pools::default();
        let ctx = context(&pools);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = ValueProducer::OneOf(&["tcp", "udp"]).produce(&ctx, &mut rng);
            assert!(value == "tcp" || value == "udp");
        }
    }

    #[test]
    fn test_zero_uuid_mode() {
        let pools = Pools::default();
        let mut ctx = context(&pools);
        ctx.zero_uuid = true;
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(
            ValueProducer::Uuid.produce(&ctx, &mut rng),
            "00000000-0000-4000-8000-000000000000"
        );
    }

    #[test]
    fn test_recent_millis_window() {
        let pools = Pools::default();
        let ctx = context(&pools);
        let mut rng = StdRng::seed_from_u64(42);
        let now = ctx.now.timestamp_millis();

        for _ in 0..100 {
            let value: i64 = ValueProducer::RecentMillis
                .produce(&ctx, &mut rng)
                .parse()
                .unwrap();
            assert!((now - 3_600_000..=now).contains(&value));
        }
    }

    #[test]
    fn test_producers_are_deterministic() {
        let pools = Pools::default();
        let ctx = context(&pools);
        let producers = [
            ValueProducer::Ipv4,
            ValueProducer::Ipv6,
            ValueProducer::HardwareAddr,
            ValueProducer::Uuid,
            ValueProducer::Hash { bytes: 16 },
            ValueProducer::Url,
            ValueProducer::FloatRange { min: 0.0, max: 1.0 },
        ];

        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        for producer in &producers {
            assert_eq!(
                producer.produce(&ctx, &mut rng1),
                producer.produce(&ctx, &mut rng2)
            );
        }
    }
}
