use assurconnect_core::LeadCategory;
use std::collections::BTreeMap;
use url::Url;

/// Fixed category to webhook table, built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints(BTreeMap<LeadCategory, Url>);

impl Endpoints {
    pub fn new(map: BTreeMap<LeadCategory, Url>) -> Self {
        Self(map)
    }

    pub fn resolve(&self, category: LeadCategory) -> Option<&Url> {
        self.0.get(&category)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn missing(&self) -> impl Iterator<Item = LeadCategory> + '_ {
        LeadCategory::ALL
            .into_iter()
            .filter(|category| !self.0.contains_key(category))
    }
}

impl FromIterator<(LeadCategory, Url)> for Endpoints {
    fn from_iter<I: IntoIterator<Item = (LeadCategory, Url)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
