use aliri_clock::{Clock, DurationSecs, System, UnixTime};

use crate::{AccessToken, AccessTokenRef};

/// An access token paired with the lifetime information reported by the
/// authority
///
/// The effective expiry has the configured expiration buffer already
/// subtracted, so a token whose effective expiry has passed still has some
/// real lifetime remaining on the authority's side.
#[derive(Clone, Debug)]
pub struct Token {
    access_token: AccessToken,
    lifetime: DurationSecs,
    issued: UnixTime,
    expiry: UnixTime,
}

impl Token {
    /// Gets the access token value
    #[inline]
    pub fn access_token(&self) -> &AccessTokenRef {
        &self.access_token
    }

    /// Consumes the token, returning the owned access token value
    #[inline]
    pub fn into_access_token(self) -> AccessToken {
        self.access_token
    }

    /// Gets the raw lifetime reported by the authority
    #[inline]
    pub fn lifetime(&self) -> DurationSecs {
        self.lifetime
    }

    /// Gets the time that the token was issued
    #[inline]
    pub fn issued(&self) -> UnixTime {
        self.issued
    }

    /// Gets the effective expiry, after the expiration buffer is applied
    #[inline]
    pub fn expiry(&self) -> UnixTime {
        self.expiry
    }

    /// Reports whether the token is still valid as of the provided time
    #[inline]
    pub fn is_valid_at(&self, time: UnixTime) -> bool {
        time < self.expiry
    }

    /// Gets a duration for how much longer the token would be valid as of
    /// the provided time
    #[inline]
    pub fn until_expiry_at(&self, time: UnixTime) -> DurationSecs {
        if time < self.expiry {
            self.expiry - time
        } else {
            DurationSecs(0)
        }
    }
}

/// Policy for computing a token's effective expiry from the lifetime
/// reported by the authority
///
/// The expiration buffer is subtracted from the reported lifetime so that a
/// refresh is triggered before the token actually expires. A token whose
/// reported lifetime does not exceed the buffer is treated as immediately
/// expired rather than rejected.
#[derive(Clone, Debug)]
pub struct TokenLifetimeConfig<C = System> {
    expiration_buffer: DurationSecs,
    clock: C,
}

impl Default for TokenLifetimeConfig {
    /// Default lifetime configuration
    ///
    /// Uses an expiration buffer of 300 seconds and the system clock.
    fn default() -> Self {
        Self {
            expiration_buffer: DurationSecs(300),
            clock: System,
        }
    }
}

impl TokenLifetimeConfig {
    /// Constructs a lifetime configuration with the given expiration buffer
    pub fn new(expiration_buffer: DurationSecs) -> Self {
        Self {
            expiration_buffer,
            clock: System,
        }
    }
}

impl<C> TokenLifetimeConfig<C> {
    /// Sets a custom clock to be used
    ///
    /// Useful for testing purposes
    pub fn with_clock<D>(self, clock: D) -> TokenLifetimeConfig<D> {
        TokenLifetimeConfig {
            expiration_buffer: self.expiration_buffer,
            clock,
        }
    }

    /// Gets the configured expiration buffer
    #[inline]
    pub fn expiration_buffer(&self) -> DurationSecs {
        self.expiration_buffer
    }
}

impl<C: Clock> TokenLifetimeConfig<C> {
    /// Constructs a token issued now, with its effective expiry computed
    /// from the reported lifetime less the expiration buffer
    pub fn create_token(&self, access_token: AccessToken, expires_in: DurationSecs) -> Token {
        let issued = self.clock.now();
        let effective = DurationSecs(expires_in.0.saturating_sub(self.expiration_buffer.0));
        Token {
            access_token,
            lifetime: expires_in,
            issued,
            expiry: issued + effective,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug)]
    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now(&self) -> UnixTime {
            UnixTime(self.0)
        }
    }

    fn config_at(buffer: u64, now: u64) -> TokenLifetimeConfig<FixedClock> {
        TokenLifetimeConfig::new(DurationSecs(buffer)).with_clock(FixedClock(now))
    }

    #[test]
    fn effective_expiry_subtracts_buffer() {
        let token = config_at(300, 1_000_000)
            .create_token(AccessToken::from_static("abc"), DurationSecs(3600));

        assert_eq!(token.issued().0, 1_000_000);
        assert_eq!(token.lifetime().0, 3600);
        assert_eq!(token.expiry().0, 1_003_300);
        assert!(token.is_valid_at(UnixTime(1_003_299)));
        assert!(!token.is_valid_at(UnixTime(1_003_300)));
    }

    #[test]
    fn lifetime_not_exceeding_buffer_is_immediately_expired() {
        let token = config_at(300, 1_000_000)
            .create_token(AccessToken::from_static("abc"), DurationSecs(300));

        assert_eq!(token.expiry(), token.issued());
        assert!(!token.is_valid_at(token.issued()));
    }

    #[test]
    fn zero_lifetime_is_immediately_expired() {
        let token = config_at(300, 1_000_000)
            .create_token(AccessToken::from_static("abc"), DurationSecs(0));

        assert!(!token.is_valid_at(token.issued()));
    }

    #[test]
    fn until_expiry_counts_down_and_floors_at_zero() {
        let token = config_at(300, 1_000_000)
            .create_token(AccessToken::from_static("abc"), DurationSecs(3600));

        assert_eq!(token.until_expiry_at(UnixTime(1_000_000)).0, 3300);
        assert_eq!(token.until_expiry_at(UnixTime(1_003_000)).0, 300);
        assert_eq!(token.until_expiry_at(UnixTime(1_010_000)).0, 0);
    }
}
