//! `curl` rendering of a serialized request, for logs and bug reports.
//!
//! ```text
//! $ curl -v \
//! 	-X POST \
//! 	-H "Accept: application/json" \
//! 	-H "Content-Type: application/json" \
//! 	-d "{\"title\":\"hi\"}" \
//! 	"https://api.example.com/posts"
//! ```
//!
//! Headers are sorted by name (case-insensitively) so two renderings of the
//! same request diff cleanly, whatever order the headers were attached in.
//! Double quotes in header values and the body are backslash-escaped; nothing
//! else is, so values containing `$`, backticks or backslashes are not safe to
//! paste into a shell as-is.

use crate::http::SerializedRequest;

const SEPARATOR: &str = " \\\n\t";

pub fn curl_command(request: &SerializedRequest) -> String {
    let mut parts = vec!["$ curl -v".to_string(), format!("-X {}", request.method)];

    let mut headers: Vec<&(String, String)> = request.headers.iter().collect();
    headers.sort_by(|(a, _), (b, _)| a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()).then_with(|| a.cmp(b)));
    for (name, value) in headers {
        parts.push(format!("-H \"{name}: {}\"", escape(value)));
    }

    if let Some(body) = &request.body {
        parts.push(format!("-d \"{}\"", escape(&String::from_utf8_lossy(body))));
    }

    parts.push(format!("\"{}\"", request.url()));
    parts.join(SEPARATOR)
}

fn escape(text: &str) -> String {
    text.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use uuid::Uuid;

    use super::*;
    use crate::descriptor::CachePolicy;
    use crate::http::HttpMethod;

    fn request(headers: &[(&str, &str)], body: Option<&str>) -> SerializedRequest {
        SerializedRequest {
            id: Uuid::nil(),
            method: HttpMethod::Post,
            scheme: "https".to_string(),
            authority: "api.example.com".to_string(),
            path: "/posts".to_string(),
            query: None,
            headers: headers.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect(),
            body: body.map(|b| b.as_bytes().to_vec()),
            timeout: Duration::from_secs(60),
            cache_policy: CachePolicy::ProtocolDefault,
            allows_metered_transport: true,
        }
    }

    #[test]
    fn full_command() {
        let req = request(
            &[("Content-Type", "application/json"), ("Accept", "application/json")],
            Some(r#"{"title":"hi"}"#),
        );
        assert_eq!(
            curl_command(&req),
            "$ curl -v \\\n\t-X POST \\\n\t-H \"Accept: application/json\" \\\n\t-H \"Content-Type: application/json\" \\\n\t-d \"{\\\"title\\\":\\\"hi\\\"}\" \\\n\t\"https://api.example.com/posts\""
        );
    }

    #[test]
    fn headers_sorted_regardless_of_attachment_order() {
        let a = curl_command(&request(&[("Authorization", "x"), ("Accept", "y")], None));
        let b = curl_command(&request(&[("Accept", "y"), ("Authorization", "x")], None));
        assert_eq!(a, b);
        assert!(a.find("-H \"Accept: y\"").unwrap() < a.find("-H \"Authorization: x\"").unwrap());
    }

    #[test]
    fn sorting_ignores_case() {
        let cmd = curl_command(&request(&[("x-b", "2"), ("X-A", "1")], None));
        assert!(cmd.find("X-A").unwrap() < cmd.find("x-b").unwrap());
    }

    #[test]
    fn no_body_no_data_flag() {
        let cmd = curl_command(&request(&[], None));
        assert!(!cmd.contains("-d "));
        assert_eq!(cmd, "$ curl -v \\\n\t-X POST \\\n\t\"https://api.example.com/posts\"");
    }

    #[test]
    fn only_double_quotes_are_escaped() {
        let cmd = curl_command(&request(&[("X-Quote", r#"say "hi" $HOME"#)], None));
        assert!(cmd.contains(r#"-H "X-Quote: say \"hi\" $HOME""#));
    }
}
