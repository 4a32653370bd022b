use std::fmt;

/// A failed call to the upstream rate provider.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: &'static str,
    pub stage: &'static str,
    pub status: Option<u16>,
    pub detail: String,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "rate provider error (provider={}, stage={}, status={status}): {}",
                self.provider, self.stage, self.detail
            ),
            None => write!(
                f,
                "rate provider error (provider={}, stage={}): {}",
                self.provider, self.stage, self.detail
            ),
        }
    }
}

impl std::error::Error for ProviderError {}
