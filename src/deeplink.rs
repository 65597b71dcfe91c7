//! `channel=<id>` deep links: startup preselection and share links

use url::Url;

use crate::error::Result;

pub const CHANNEL_PARAM: &str = "channel";

/// Channel id from `channel=<id>`, `?channel=<id>` or a full URL carrying the parameter
pub fn channel_from_arg(arg: &str) -> Option<String> {
    let arg = arg.trim();

    let query = match Url::parse(arg) {
        Ok(url) => return channel_from_pairs(url.query_pairs()),
        Err(_) => arg.strip_prefix('?').unwrap_or(arg),
    };

    if !query.contains('=') {
        return None;
    }
    channel_from_pairs(url::form_urlencoded::parse(query.as_bytes()))
}

fn channel_from_pairs<'a>(
    pairs: impl Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
) -> Option<String> {
    pairs
        .filter(|(key, _)| key == CHANNEL_PARAM)
        .map(|(_, value)| value.into_owned())
        .find(|value| !value.is_empty())
}

/// `base` with its `channel` parameter set to `id`, other parameters kept
pub fn share_link(base: &str, id: &str) -> Result<String> {
    let mut url = Url::parse(base)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != CHANNEL_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(CHANNEL_PARAM, id);
    Ok(url.to_string())
}
