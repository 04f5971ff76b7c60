//! TwiML serialization for voice and messaging replies.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use wayfinder_dialog::{SmsReply, VoiceDirective, VoiceReply};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A rendered TwiML document, served as `text/xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwiML(pub String);

impl IntoResponse for TwiML {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], self.0).into_response()
    }
}

/// Escape text for use in XML content and attribute values.
///
/// Control characters XML 1.0 cannot carry are dropped; tab, newline and
/// carriage return are kept.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn say(out: &mut String, language: &str, text: &str) {
    out.push_str(&format!(
        r#"<Say language="{}">{}</Say>"#,
        escape_xml(language),
        escape_xml(text)
    ));
}

/// Render a voice reply as a `<Response>` document.
pub fn voice_response(reply: &VoiceReply) -> TwiML {
    let mut out = String::from(XML_DECLARATION);
    out.push_str("<Response>");

    for directive in &reply.directives {
        match directive {
            VoiceDirective::Say(text) => say(&mut out, &reply.language, text),
            VoiceDirective::Pause(secs) => {
                out.push_str(&format!(r#"<Pause length="{}"/>"#, secs));
            }
            VoiceDirective::Gather {
                prompt,
                action,
                timeout_secs,
            } => {
                out.push_str(&format!(
                    r#"<Gather input="speech" action="{}" method="POST" timeout="{}" language="{}">"#,
                    escape_xml(action),
                    timeout_secs,
                    escape_xml(&reply.language)
                ));
                say(&mut out, &reply.language, prompt);
                out.push_str("</Gather>");
            }
        }
    }

    out.push_str("</Response>");
    TwiML(out)
}

/// Render an SMS reply as a messaging `<Response>` document.
pub fn messaging_response(reply: &SmsReply) -> TwiML {
    TwiML(format!(
        "{}<Response><Message>{}</Message></Response>",
        XML_DECLARATION,
        escape_xml(&reply.body)
    ))
}
