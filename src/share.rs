//! Reflects the current endpoint and window into a linkable URL and reads
//! it back at startup.

use crate::types::BlockNumber;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareableState {
    pub endpoint: Url,
    pub start: Option<BlockNumber>,
    pub end: Option<BlockNumber>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareableStateError {
    #[error("`endpoint` parameter is missing")]
    MissingEndpoint,
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("invalid `{name}` parameter: {value}")]
    InvalidBlock { name: &'static str, value: String },
}

impl ShareableState {
    /// `base` with its query replaced by `endpoint`, `start` and `end`.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_fragment(None);
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair("endpoint", self.endpoint.as_str());
            if let Some(start) = self.start {
                query.append_pair("start", &start.to_string());
            }
            if let Some(end) = self.end {
                query.append_pair("end", &end.to_string());
            }
        }
        url
    }

    /// Empty `start`/`end` values are treated as absent.
    pub fn from_url(url: &Url) -> Result<Self, ShareableStateError> {
        let mut endpoint = None;
        let mut start = None;
        let mut end = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "endpoint" => endpoint = Some(Url::parse(&value)?),
                "start" => start = parse_block("start", &value)?,
                "end" => end = parse_block("end", &value)?,
                _ => {}
            }
        }
        Ok(Self {
            endpoint: endpoint.ok_or(ShareableStateError::MissingEndpoint)?,
            start,
            end,
        })
    }
}

fn parse_block(
    name: &'static str,
    value: &str,
) -> Result<Option<BlockNumber>, ShareableStateError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ShareableStateError::InvalidBlock {
            name,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://weight.example.com/graph?old=1#top").unwrap()
    }

    #[test]
    fn round_trips_through_url() {
        let state = ShareableState {
            endpoint: Url::parse("wss://kusama-rpc.polkadot.io").unwrap(),
            start: Some(100),
            end: Some(2_000),
        };
        let url = state.to_url(&base());
        assert_eq!(
            url.as_str(),
            "https://weight.example.com/graph?endpoint=wss%3A%2F%2Fkusama-rpc.polkadot.io%2F&start=100&end=2000"
        );
        assert_eq!(ShareableState::from_url(&url).unwrap(), state);
    }

    #[test]
    fn missing_bounds_are_optional() {
        let url = Url::parse("https://x.io/?endpoint=ws://127.0.0.1:9944&start=").unwrap();
        let state = ShareableState::from_url(&url).unwrap();
        assert_eq!(state.endpoint.as_str(), "ws://127.0.0.1:9944/");
        assert_eq!((state.start, state.end), (None, None));
    }

    #[test]
    fn rejects_malformed_state() {
        let url = Url::parse("https://x.io/?start=1").unwrap();
        assert_eq!(
            ShareableState::from_url(&url),
            Err(ShareableStateError::MissingEndpoint)
        );

        let url = Url::parse("https://x.io/?endpoint=ws://a&end=-4").unwrap();
        assert_eq!(
            ShareableState::from_url(&url),
            Err(ShareableStateError::InvalidBlock {
                name: "end",
                value: "-4".to_string()
            })
        );
    }
}
