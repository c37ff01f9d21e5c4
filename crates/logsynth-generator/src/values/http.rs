//! HTTP and cloud vocabulary shared by several formats.

use rand::Rng;

use super::pick;

pub const METHODS: &[&str] = &["CONNECT", "DELETE", "GET", "POST", "PUT"];

pub const STATUSES: &[u16] = &[
    100, 200, 201, 202, 204, 206, 301, 302, 304, 400, 401, 403, 404, 405, 408, 409, 410, 413,
    418, 500, 501, 502, 504, 505,
];

pub const VERSIONS: &[&str] = &["HTTP/1.0", "HTTP/1.1", "HTTP/2"];

pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:98.0) Gecko/20100101 Firefox/98.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 12.3; rv:98.0) Gecko/20100101 Firefox/98.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:98.0) Gecko/20100101 Firefox/98.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 12_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) FxiOS/98.0 Mobile/15E148 Safari/605.1.15",
    "Mozilla/5.0 (Android 12; Mobile; rv:68.0) Gecko/68.0 Firefox/98.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.84 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 12_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.84 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.84 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 15_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/99.0.4844.59 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 10) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.88 Mobile Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 12_3) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.3 Safari/605.1.15",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 15_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.3 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPad; CPU OS 15_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.3 Mobile/15E148 Safari/604.1",
];

pub const AVAILABILITY_ZONES: &[&str] = &[
    "us-east-1a", "us-east-1b", "us-east-1c", "us-east-2a", "us-east-2b", "us-west-1a",
    "us-west-2a", "us-west-2b", "eu-west-1a", "eu-west-1b", "eu-west-1c", "eu-central-1a",
    "ap-southeast-1a", "ap-southeast-2b", "ap-northeast-1a", "sa-east-1a",
];

pub fn method<R: Rng>(rng: &mut R) -> &'static str {
    *pick(rng, METHODS)
}

pub fn status<R: Rng>(rng: &mut R) -> u16 {
    *pick(rng, STATUSES)
}

pub fn version<R: Rng>(rng: &mut R) -> &'static str {
    *pick(rng, VERSIONS)
}

pub fn user_agent<R: Rng>(rng: &mut R) -> &'static str {
    *pick(rng, USER_AGENTS)
}

pub fn availability_zone<R: Rng>(rng: &mut R) -> &'static str {
    *pick(rng, AVAILABILITY_ZONES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_status_codes_are_valid() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            assert!((100..600).contains(&status(&mut rng)));
        }
    }

    #[test]
    fn test_vocabulary_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        assert!(METHODS.contains(&method(&mut rng)));
        assert!(VERSIONS.contains(&version(&mut rng)));
        assert!(user_agent(&mut rng).starts_with("Mozilla/5.0"));
        assert!(AVAILABILITY_ZONES.contains(&availability_zone(&mut rng)));
    }
}
