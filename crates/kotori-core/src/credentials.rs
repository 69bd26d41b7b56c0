//! Channel credentials fetched from the secret store.

use std::fmt;

use serde::Deserialize;

/// Messaging-channel credentials.
///
/// Deserialized from the secret-store entry, whose field names follow the
/// platform's console export (`CHANNEL_ACCESS_TOKEN` / `CHANNEL_SECRET`).
/// Fetched once per process lifetime and cached; the `Debug` impl redacts
/// both fields so credentials cannot leak through logs or error chains.
#[derive(Clone, Deserialize)]
pub struct ChannelCredentials {
    /// Bearer token for the reply and content-fetch APIs.
    #[serde(alias = "CHANNEL_ACCESS_TOKEN")]
    pub access_token: String,
    /// Shared secret keying the webhook signature HMAC.
    #[serde(alias = "CHANNEL_SECRET")]
    pub signing_secret: String,
}

impl fmt::Debug for ChannelCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelCredentials")
            .field("access_token", &"***")
            .field("signing_secret", &"***")
            .finish()
    }
}
