//! MetaWeblog XML-RPC publishing
//!
//! Posts are sent with `metaWeblog.newPost` (no post id yet) or
//! `metaWeblog.editPost` (post id known from the front matter). A
//! `<fault>` response is reported as [`Error::Publish`].

use log::{debug, info};
use quick_xml::escape::{escape, resolve_predefined_entity};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt::Write as _;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::weblog::config::WeblogInfo;

/// Upload timeout for a post.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// A rendered post ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostPayload {
    /// Existing post id; `None` creates a new post
    pub post_id: Option<String>,
    pub title: String,
    /// Rendered HTML body
    pub html: String,
    pub excerpt: String,
    pub keywords: String,
    pub categories: Vec<String>,
    pub publish: bool,
}

/// Sends posts to a weblog.
pub trait WeblogPublisher: Send + Sync {
    /// Publish `post` and return the weblog's post id.
    fn publish(&self, weblog: &WeblogInfo, password: &str, post: &PostPayload) -> Result<String>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

fn string_value(out: &mut String, value: &str) {
    let _ = write!(out, "<value><string>{}</string></value>", escape(value));
}

fn member(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, "<member><name>{}</name>", name);
    string_value(out, value);
    out.push_str("</member>");
}

/// Build the XML-RPC request body for a post.
pub fn build_request(weblog: &WeblogInfo, password: &str, post: &PostPayload) -> String {
    let (method, target) = match &post.post_id {
        Some(id) => ("metaWeblog.editPost", id.as_str()),
        None => ("metaWeblog.newPost", weblog.blog_id.as_str()),
    };

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
    let _ = write!(xml, "<methodCall><methodName>{}</methodName><params>", method);

    for value in [target, weblog.username.as_str(), password] {
        xml.push_str("<param>");
        string_value(&mut xml, value);
        xml.push_str("</param>");
    }

    xml.push_str("<param><value><struct>");
    member(&mut xml, "title", &post.title);
    member(&mut xml, "description", &post.html);
    member(&mut xml, "mt_excerpt", &post.excerpt);
    member(&mut xml, "mt_keywords", &post.keywords);
    xml.push_str("<member><name>categories</name><value><array><data>");
    for category in &post.categories {
        string_value(&mut xml, category);
    }
    xml.push_str("</data></array></value></member>");
    xml.push_str("</struct></value></param>");

    let _ = write!(
        xml,
        "<param><value><boolean>{}</boolean></value></param>",
        u8::from(post.publish)
    );
    xml.push_str("</params></methodCall>");
    xml
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// First scalar of a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcValue {
    Text(String),
    Boolean(bool),
}

const SCALAR_TYPES: &[&str] = &[
    "string",
    "int",
    "i4",
    "boolean",
    "double",
    "dateTime.iso8601",
    "base64",
];

fn xml_error(err: impl std::fmt::Display) -> Error {
    Error::Publish(format!("Invalid XML-RPC response: {}", err))
}

/// Parse an XML-RPC method response.
pub fn parse_response(xml: &str) -> Result<RpcValue> {
    let mut reader = Reader::from_str(xml);

    let mut in_fault = false;
    let mut last_start = String::new();
    let mut text = String::new();
    let mut member_name = String::new();
    let mut fault_code = String::new();
    let mut fault_string = String::new();
    let mut result: Option<(String, String)> = None;

    let mut scalar = |in_fault: bool, kind: &str, value: String, member_name: &str| {
        if in_fault {
            match member_name {
                "faultCode" => fault_code = value,
                "faultString" => fault_string = value,
                _ => {}
            }
        } else if result.is_none() {
            result = Some((kind.to_string(), value));
        }
    };

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                last_start = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if last_start == "fault" {
                    in_fault = true;
                }
                text.clear();
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if SCALAR_TYPES.contains(&name.as_str()) {
                    scalar(in_fault, &name, String::new(), &member_name);
                }
                last_start = name;
            }
            Event::Text(t) => text.push_str(&t.decode().map_err(xml_error)?),
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::GeneralRef(r) => match r.resolve_char_ref().map_err(xml_error)? {
                Some(ch) => text.push(ch),
                None => {
                    let name = r.decode().map_err(xml_error)?;
                    text.push_str(resolve_predefined_entity(&name).unwrap_or_default());
                }
            },
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let value = std::mem::take(&mut text);
                match name.as_str() {
                    "name" => member_name = value,
                    // `<value>text</value>` without a type element is a string
                    "value" if last_start == "value" => {
                        scalar(in_fault, "string", value, &member_name)
                    }
                    kind if SCALAR_TYPES.contains(&kind) => {
                        scalar(in_fault, kind, value, &member_name)
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if in_fault {
        return Err(Error::Publish(format!(
            "{} (fault {})",
            fault_string.trim(),
            fault_code.trim()
        )));
    }

    match result {
        Some((kind, value)) if kind == "boolean" => {
            Ok(RpcValue::Boolean(matches!(value.trim(), "1" | "true")))
        }
        Some((_, value)) => Ok(RpcValue::Text(value)),
        None => Err(Error::Publish("Empty XML-RPC response".to_string())),
    }
}

/// Map a response to the resulting post id.
///
/// `editPost` answers with a boolean, in which case the existing id is kept.
pub fn post_id_from_response(value: RpcValue, post: &PostPayload) -> Result<String> {
    match (value, &post.post_id) {
        (RpcValue::Text(id), _) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        (RpcValue::Boolean(true), Some(id)) => Ok(id.clone()),
        (RpcValue::Boolean(false), _) => {
            Err(Error::Publish("The weblog did not accept the post".to_string()))
        }
        _ => Err(Error::Publish("The weblog did not return a post id".to_string())),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// MetaWeblog client over reqwest's blocking API.
#[derive(Debug, Clone)]
pub struct MetaWeblogClient {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl Default for MetaWeblogClient {
    fn default() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            timeout: PUBLISH_TIMEOUT,
        }
    }
}

impl MetaWeblogClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WeblogPublisher for MetaWeblogClient {
    fn publish(&self, weblog: &WeblogInfo, password: &str, post: &PostPayload) -> Result<String> {
        if weblog.api_url.trim().is_empty() {
            return Err(Error::Publish(format!(
                "No API url configured for weblog '{}'",
                weblog.name
            )));
        }

        debug!("XML-RPC POST {} ({})", weblog.api_url, weblog.api_type.label());
        let response = self
            .client
            .post(&weblog.api_url)
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(build_request(weblog, password, post))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: weblog.api_url.clone(),
                status: status.as_u16(),
            });
        }

        let post_id = post_id_from_response(parse_response(&response.text()?)?, post)?;
        info!("Published '{}' to {} as {}", post.title, weblog.name, post_id);
        Ok(post_id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn weblog() -> WeblogInfo {
        WeblogInfo {
            name: "Personal".to_string(),
            api_url: "https://blog.test/xmlrpc".to_string(),
            blog_id: "7".to_string(),
            username: "rick".to_string(),
            ..Default::default()
        }
    }

    fn payload() -> PostPayload {
        PostPayload {
            title: "Fish & Chips".to_string(),
            html: "<p>Hello</p>".to_string(),
            categories: vec!["Food".to_string(), "UK".to_string()],
            publish: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_post_request() {
        let xml = build_request(&weblog(), "pw<1>", &payload());
        assert!(xml.contains("<methodName>metaWeblog.newPost</methodName>"));
        assert!(xml.contains("<param><value><string>7</string></value></param>"));
        assert!(xml.contains("<string>pw&lt;1&gt;</string>"));
        assert!(xml.contains("<string>Fish &amp; Chips</string>"));
        assert!(xml.contains("<string>&lt;p&gt;Hello&lt;/p&gt;</string>"));
        assert!(xml.contains(
            "<data><value><string>Food</string></value><value><string>UK</string></value></data>"
        ));
        assert!(xml.ends_with("<boolean>1</boolean></value></param></params></methodCall>"));
    }

    #[test]
    fn test_edit_post_request_targets_post_id() {
        let post = PostPayload {
            post_id: Some("1234".to_string()),
            publish: false,
            ..payload()
        };
        let xml = build_request(&weblog(), "pw", &post);
        assert!(xml.contains("<methodName>metaWeblog.editPost</methodName>"));
        assert!(xml.contains("<param><value><string>1234</string></value></param>"));
        assert!(!xml.contains("<string>7</string>"));
        assert!(xml.contains("<boolean>0</boolean>"));
    }

    #[test]
    fn test_parse_string_response() {
        let xml = r#"<?xml version="1.0"?>
            <methodResponse><params><param>
                <value><string>4711</string></value>
            </param></params></methodResponse>"#;
        assert_eq!(parse_response(xml).unwrap(), RpcValue::Text("4711".to_string()));
    }

    #[test]
    fn test_parse_untyped_and_int_values() {
        let untyped = "<methodResponse><params><param><value>abc</value></param></params></methodResponse>";
        assert_eq!(parse_response(untyped).unwrap(), RpcValue::Text("abc".to_string()));

        let int = "<methodResponse><params><param><value><i4>12</i4></value></param></params></methodResponse>";
        assert_eq!(parse_response(int).unwrap(), RpcValue::Text("12".to_string()));
    }

    #[test]
    fn test_parse_boolean_response() {
        let xml = "<methodResponse><params><param><value><boolean>1</boolean></value></param></params></methodResponse>";
        assert_eq!(parse_response(xml).unwrap(), RpcValue::Boolean(true));
    }

    #[test]
    fn test_parse_fault() {
        let xml = r#"<methodResponse><fault><value><struct>
            <member><name>faultCode</name><value><int>403</int></value></member>
            <member><name>faultString</name><value><string>Incorrect username &amp; password.</string></value></member>
            </struct></value></fault></methodResponse>"#;
        let err = parse_response(xml).unwrap_err();
        assert!(matches!(&err, Error::Publish(msg) if msg == "Incorrect username & password. (fault 403)"));
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(parse_response("<html>oops</body>"), Err(Error::Publish(_))));
        assert!(matches!(parse_response(""), Err(Error::Publish(_))));
    }

    #[test]
    fn test_post_id_from_response() {
        let new_post = payload();
        assert_eq!(
            post_id_from_response(RpcValue::Text(" 99 ".to_string()), &new_post).unwrap(),
            "99"
        );
        assert!(post_id_from_response(RpcValue::Boolean(true), &new_post).is_err());

        let edit = PostPayload {
            post_id: Some("12".to_string()),
            ..payload()
        };
        assert_eq!(post_id_from_response(RpcValue::Boolean(true), &edit).unwrap(), "12");
        assert!(post_id_from_response(RpcValue::Boolean(false), &edit).is_err());
    }

    #[test]
    fn test_publish_without_api_url_fails_fast() {
        let blog = WeblogInfo {
            api_url: String::new(),
            ..weblog()
        };
        let err = MetaWeblogClient::new().publish(&blog, "pw", &payload()).unwrap_err();
        assert!(matches!(err, Error::Publish(_)));
    }
}
