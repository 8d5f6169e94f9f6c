use marketdesk_core::types::{CompanyProfile, normalize_symbol};
use marketdesk_core::{Capability, DeskError};
use tracing::warn;

use crate::core::Desk;

impl Desk {
    /// Fetch the company reference profile for a symbol.
    ///
    /// Reference data changes rarely, so hits are held for the long profile
    /// TTL. Absence is never cached.
    pub async fn profile(&self, symbol: &str) -> Option<CompanyProfile> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return None;
        }
        let key = format!("profile:{symbol}");
        self.stores
            .profiles
            .cached(&key, self.cfg.ttl.profile, || self.profile_uncached(&symbol))
            .await
            .inspect_err(|e| warn!(symbol = %symbol, error = %e, "profile unavailable"))
            .ok()
    }

    async fn profile_uncached(&self, symbol: &str) -> Result<CompanyProfile, DeskError> {
        self.attempt(Capability::Profile, |p| {
            p.as_profile_source()?;
            let sym = symbol.to_string();
            Some(async move {
                match p.as_profile_source() {
                    Some(src) => src.profile(&sym).await,
                    None => Err(DeskError::unsupported(Capability::Profile.as_str())),
                }
            })
        })
        .await
    }
}
