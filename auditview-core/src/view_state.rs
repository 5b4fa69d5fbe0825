//! Shareable view state carried in a report URL query.
//!
//! `?backend=<url-encoded endpoint>&print=true` selects the data source and
//! the print layout. Parsing and emitting are inverse so the state can be
//! synced both ways.

use reqwest::Url;

use crate::{Error, Result};

const BACKEND_PARAM: &str = "backend";
const PRINT_PARAM: &str = "print";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub backend: Option<String>,
    pub print: bool,
}

impl ViewState {
    /// Read state from a full URL
    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::Url(format!("{url}: {e}")))?;
        Ok(Self::from_pairs(url.query_pairs()))
    }

    /// Read state from a bare query string, with or without the leading `?`
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        Self::from_pairs(url_pairs(query))
    }

    fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    {
        let mut state = Self::default();
        for (key, value) in pairs {
            match key.as_ref() {
                BACKEND_PARAM if !value.is_empty() => state.backend = Some(value.into_owned()),
                PRINT_PARAM => state.print = value == "true",
                _ => {}
            }
        }
        state
    }

    /// Write this state into `base`, keeping unrelated query parameters
    pub fn apply_to(&self, base: &str) -> Result<String> {
        let mut url = Url::parse(base).map_err(|e| Error::Url(format!("{base}: {e}")))?;
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != BACKEND_PARAM && key != PRINT_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.set_query(None);
        let extra = self.pairs();
        if !kept.is_empty() || !extra.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in kept.iter().map(|(k, v)| (k.as_str(), v.as_str())).chain(extra) {
                query.append_pair(key, value);
            }
        }
        Ok(url.to_string())
    }

    /// Query string for this state, without the leading `?`
    pub fn to_query(&self) -> String {
        Url::parse("http://localhost/")
            .map(|mut url| {
                url.query_pairs_mut().extend_pairs(self.pairs());
                url.query().unwrap_or_default().to_string()
            })
            .unwrap_or_default()
    }

    fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        if let Some(backend) = &self.backend {
            pairs.push((BACKEND_PARAM, backend.as_str()));
        }
        if self.print {
            pairs.push((PRINT_PARAM, "true"));
        }
        pairs
    }
}

fn url_pairs(query: &str) -> Vec<(std::borrow::Cow<'static, str>, std::borrow::Cow<'static, str>)> {
    Url::parse(&format!("http://localhost/?{query}"))
        .map(|url| {
            url.query_pairs()
                .map(|(k, v)| (k.into_owned().into(), v.into_owned().into()))
                .collect()
        })
        .unwrap_or_default()
}
