use anyhow::Result;
use strum_macros::{Display, EnumIter, EnumString};

use super::{
    anthropic::AnthropicProvider, base::Provider, configs::ProviderConfig, mock::MockProvider,
    openai::OpenAiProvider,
};

/// The providers a caller can select, parsed from `--provider` and
/// iterable for help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderType {
    OpenAi,
    Anthropic,
    Mock,
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Anthropic(anthropic_config) => {
            Ok(Box::new(AnthropicProvider::new(anthropic_config)?))
        }
    }
}

/// The scripted provider behind `--mock` runs.
pub fn get_mock_provider() -> Box<dyn Provider> {
    Box::new(MockProvider::canned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_provider_type_round_trips_through_strings() {
        for provider_type in ProviderType::iter() {
            let name = provider_type.to_string();
            let parsed: ProviderType = name.parse().unwrap();
            assert_eq!(parsed, provider_type);
        }
        assert_eq!("openai".parse::<ProviderType>().unwrap(), ProviderType::OpenAi);
        assert!("nope".parse::<ProviderType>().is_err());
    }
}
