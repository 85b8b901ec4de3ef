//! Media attachment collection.
//!
//! Only sources served from the media CDN count; profile pictures and
//! banners share that CDN and are excluded by path. Sources that are not
//! absolute URLs are skipped.

use crate::locator::{Locator, MediaPolicy};
use crate::record::{MediaItem, MediaKind};
use scraper::ElementRef;
use tracing::debug;
use url::Url;

/// Media attachments of `container`, in encounter order.
pub fn collect(locator: &Locator, container: ElementRef<'_>) -> Vec<MediaItem> {
    locator
        .media
        .all_in(container)
        .into_iter()
        .filter_map(|el| {
            let src = el.value().attr("src")?;
            let kind = match el.value().name() {
                "img" => MediaKind::Image,
                _ => MediaKind::Video,
            };
            accept(&locator.media_policy, src, kind).then(|| MediaItem {
                url: src.to_string(),
                kind,
            })
        })
        .collect()
}

/// Whether `src` is an attachment under `policy`.
pub fn accept(policy: &MediaPolicy, src: &str, kind: MediaKind) -> bool {
    let url = match Url::parse(src) {
        Ok(url) => url,
        Err(e) => {
            debug!("skipping media source {src:?}: {e}");
            return false;
        }
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    let hosts = match kind {
        MediaKind::Image => &policy.hosts,
        MediaKind::Video => &policy.video_hosts,
    };
    if !hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        return false;
    }
    !policy
        .excluded_path_fragments
        .iter()
        .any(|fragment| url.path().contains(fragment.as_str()))
}
