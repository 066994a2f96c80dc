use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spia_model::CombiningResultsFlag;

/// Free-text flag values accepted in the combining results column.
///
/// Keys are matched case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, CombiningResultsFlag>",
    into = "BTreeMap<String, CombiningResultsFlag>"
)]
pub struct FlagVocabulary {
    values: BTreeMap<String, CombiningResultsFlag>,
}

impl From<BTreeMap<String, CombiningResultsFlag>> for FlagVocabulary {
    fn from(values: BTreeMap<String, CombiningResultsFlag>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(text, flag)| (normalize(&text), flag))
                .collect(),
        }
    }
}

impl From<FlagVocabulary> for BTreeMap<String, CombiningResultsFlag> {
    fn from(vocabulary: FlagVocabulary) -> Self {
        vocabulary.values
    }
}

impl Default for FlagVocabulary {
    fn default() -> Self {
        Self {
            values: CombiningResultsFlag::ALL
                .into_iter()
                .map(|flag| (flag.code().to_string(), flag))
                .collect(),
        }
    }
}

impl FlagVocabulary {
    #[must_use]
    pub fn with_alias(mut self, text: &str, flag: CombiningResultsFlag) -> Self {
        self.values.insert(normalize(text), flag);
        self
    }

    pub fn resolve(&self, text: &str) -> Option<CombiningResultsFlag> {
        self.values.get(&normalize(text)).copied()
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
