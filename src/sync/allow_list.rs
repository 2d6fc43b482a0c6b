use crate::config::DEFAULT_PROTECTED_SUFFIXES;

/// Filename suffixes that the cleanup pass never deletes.
///
/// Matching is an exact, case-sensitive `ends_with` on the entry name, so a
/// suffix may be an extension (`.step`) or a whole file name (`flow_data.json`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    suffixes: Vec<String>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_SUFFIXES.iter().copied())
    }
}

impl AllowList {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }
}
