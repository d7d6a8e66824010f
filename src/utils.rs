use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::Url;

/// Characters left alone by `encodeURIComponent`: alphanumerics plus
/// `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

pub fn decode_component(component: &str) -> String {
    percent_decode_str(component)
        .decode_utf8_lossy()
        .into_owned()
}

/// Decoded trailing path segment of a URL; the asset name release hosting
/// reports back through a download URL.
pub fn asset_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    Some(decode_component(last))
}

/// All network fan-out in this tool runs as cooperative tasks on a single
/// thread; the per-file barriers do the synchronization.
pub fn build_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_encoding_matches_the_url_convention() {
        assert_eq!(encode_component("v1.2.3"), "v1.2.3");
        assert_eq!(encode_component("a b+c/d"), "a%20b%2Bc%2Fd");
        assert_eq!(decode_component("a%20b%2Bc%2Fd"), "a b+c/d");
    }

    #[test]
    fn asset_name_is_the_decoded_trailing_segment() {
        assert_eq!(
            asset_name_from_url(
                "https://github.com/strapline/devkit/releases/download/v1.0.0/tool%20one"
            ),
            Some("tool one".to_string())
        );
        assert_eq!(asset_name_from_url("not a url"), None);
    }
}
