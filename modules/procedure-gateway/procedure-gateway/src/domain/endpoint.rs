//! Endpoint selector resolution.

use procedure_gateway_sdk::{EndpointTag, Presence};

use super::DomainError;
use crate::config::EndpointsConfig;

/// Base URL per call endpoint, fixed when the gateway is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointTable {
    general: Option<String>,
    output: Option<String>,
    output_front: Option<String>,
    getdate: Option<String>,
}

impl EndpointTable {
    #[must_use]
    pub fn from_config(config: &EndpointsConfig) -> Self {
        let url = |tag| config.url_for(tag).map(str::to_owned);
        Self {
            general: url(EndpointTag::General),
            output: url(EndpointTag::Output),
            output_front: url(EndpointTag::OutputFront),
            getdate: url(EndpointTag::GetDate),
        }
    }

    #[must_use]
    pub fn url(&self, tag: EndpointTag) -> Option<&str> {
        match tag {
            EndpointTag::General => self.general.as_deref(),
            EndpointTag::Output => self.output.as_deref(),
            EndpointTag::OutputFront => self.output_front.as_deref(),
            EndpointTag::GetDate => self.getdate.as_deref(),
        }
    }

    /// Resolve a selector to its tag and base URL.
    ///
    /// # Errors
    ///
    /// `EndpointMissing` for an unset, null, or blank selector,
    /// `EndpointUnknown` for an unrecognized one, and
    /// `EndpointNotConfigured` when the tag has no base URL.
    pub fn resolve(&self, selector: &Presence<String>) -> Result<(EndpointTag, &str), DomainError> {
        let selector = match selector {
            Presence::Present(s) if !s.trim().is_empty() => s,
            _ => return Err(DomainError::EndpointMissing),
        };
        let tag = EndpointTag::parse(selector)
            .ok_or_else(|| DomainError::EndpointUnknown(selector.to_uppercase()))?;
        let url = self
            .url(tag)
            .ok_or(DomainError::EndpointNotConfigured(tag.as_str()))?;
        Ok((tag, url))
    }
}
