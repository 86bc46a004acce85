use std::fmt;

/// Transcription provider credentials.
///
/// Presence or absence of each credential decides which providers the
/// gateway attempts: the primary (Whisper) needs `OPENAI_API_KEY`, the
/// secondary (Deepgram) needs `DEEPGRAM_API_TOKEN`.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub openai_api_key: Option<String>,
    pub deepgram_api_token: Option<String>,
}

impl ProviderCredentials {
    /// Reads credentials from the environment. Blank values count as unset.
    pub fn from_env() -> Self {
        fn non_empty(var: &str) -> Option<String> {
            std::env::var(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            deepgram_api_token: non_empty("DEEPGRAM_API_TOKEN"),
        }
    }

    /// True when at least one provider credential is present.
    pub fn any_configured(&self) -> bool {
        self.openai_api_key.is_some() || self.deepgram_api_token.is_some()
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "[REDACTED]"
            } else {
                "<unset>"
            }
        }

        f.debug_struct("ProviderCredentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("deepgram_api_token", &redact(&self.deepgram_api_token))
            .finish()
    }
}
