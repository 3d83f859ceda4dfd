use crate::{ColorCount, ColorKey, ShortfallPolicy};
use std::fmt;

/// One output line: the source URL and its ranked color keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultRecord {
    pub url: String,
    pub colors: Vec<ColorKey>,
}

impl ResultRecord {
    /// Builds a record with exactly `k` colors from a ranking.
    ///
    /// Returns `None` when the ranking is empty, or when it is short and the
    /// policy is [`ShortfallPolicy::Skip`].
    pub fn from_ranking(
        url: impl Into<String>,
        ranking: &[ColorCount],
        k: usize,
        policy: ShortfallPolicy,
    ) -> Option<Self> {
        let last = ranking.last()?;

        if ranking.len() < k && policy == ShortfallPolicy::Skip {
            return None;
        }

        let mut colors: Vec<ColorKey> = ranking.iter().take(k).map(|c| c.key).collect();
        colors.resize(k, last.key);

        Some(Self {
            url: url.into(),
            colors,
        })
    }

    /// The newline-terminated text written to the output file.
    pub fn line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)?;
        for color in &self.colors {
            write!(f, ",#{color}")?;
        }
        Ok(())
    }
}
