//! Action links
//!
//! Server text can mark a run as clickable. Activating it either sends a
//! command to the server, puts text into the input line, or opens an
//! ordinary external URL. The first two cases are carried as `mudterm://`
//! payloads so that the renderer only ever stores one opaque string per
//! link; anything that does not decode as such a payload is an external
//! reference.

use url::form_urlencoded;
use url::Url;

/// Placeholder in a link's action template, replaced with the text of the
/// run the link is attached to.
pub const EMBED_TEXT: &str = "&text;";

/// Payload scheme for links handled inside the client.
const SCHEME: &str = "mudterm";

/// Where activating a link routes its action text.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SendTo {
    /// Send the text to the server as a command.
    #[default]
    World,
    /// Put the text into the input line without sending.
    Input,
    /// The text is already a full URL; leave it untouched.
    Internet,
}

/// Link metadata attached to a text fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    /// Action template; may contain [`EMBED_TEXT`].
    pub action: String,
    /// Flyover hint.
    pub hint: Option<String>,
    /// Where to send the action text.
    pub sendto: SendTo,
}

impl Link {
    pub fn new(action: impl Into<String>, hint: Option<&str>, sendto: SendTo) -> Self {
        Self {
            action: action.into(),
            hint: hint.map(str::to_owned),
            sendto,
        }
    }
}

/// Encode a destination and action text as a link payload.
///
/// `Internet` actions are already complete URLs and pass through unchanged.
pub fn encode_action(sendto: SendTo, action: &str) -> String {
    let host = match sendto {
        SendTo::World => "send",
        SendTo::Input => "input",
        SendTo::Internet => return action.to_owned(),
    };
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("text", action)
        .finish();
    format!("{SCHEME}://{host}?{query}")
}

/// Decode a link payload produced by [`encode_action`].
///
/// Returns `None` for anything that is not a well-formed internal payload -
/// a foreign scheme, an unknown host, or a missing `text` parameter. Such
/// payloads are ordinary external references, not errors.
pub fn decode_action(payload: &str) -> Option<(SendTo, String)> {
    let url = Url::parse(payload).ok()?;
    if url.scheme() != SCHEME {
        return None;
    }
    let sendto = match url.host_str()? {
        "send" => SendTo::World,
        "input" => SendTo::Input,
        _ => return None,
    };
    let text = url
        .query_pairs()
        .find(|(key, _)| key == "text")
        .map(|(_, value)| value.into_owned())?;
    Some((sendto, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let samples = [
            "",
            "north",
            "say hello world",
            "cast 'magic missile' at troll",
            "a&b=c?d#e",
            "100%",
            "héllo wörld",
        ];
        for sendto in [SendTo::World, SendTo::Input] {
            for text in samples {
                let payload = encode_action(sendto, text);
                assert_eq!(
                    decode_action(&payload),
                    Some((sendto, text.to_owned())),
                    "round trip failed for {:?} {:?}",
                    sendto,
                    text
                );
            }
        }
    }

    #[test]
    fn test_encode_shape() {
        assert_eq!(encode_action(SendTo::World, "look"), "mudterm://send?text=look");
        assert_eq!(
            encode_action(SendTo::Input, "say "),
            "mudterm://input?text=say+"
        );
    }

    #[test]
    fn test_internet_passes_through() {
        let url = "https://example.com/help?page=1";
        assert_eq!(encode_action(SendTo::Internet, url), url);
        assert_eq!(decode_action(url), None);
    }

    #[test]
    fn test_decode_rejects_foreign_payloads() {
        assert_eq!(decode_action("not a url"), None);
        assert_eq!(decode_action("mailto:someone@example.com"), None);
        // Right scheme, unknown host
        assert_eq!(decode_action("mudterm://open?text=x"), None);
        // Missing the text parameter
        assert_eq!(decode_action("mudterm://send"), None);
        assert_eq!(decode_action("mudterm://send?other=x"), None);
    }

    #[test]
    fn test_decode_empty_text() {
        assert_eq!(
            decode_action("mudterm://input?text="),
            Some((SendTo::Input, String::new()))
        );
    }
}
