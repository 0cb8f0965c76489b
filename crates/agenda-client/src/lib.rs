// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agenda_app::{
    AgendaSnapshot, Contact, ContactForm, ContactId, LogId, MeetingId, NewMeeting, ReferenceData,
    Row, SavePayload,
};
use reqwest::StatusCode;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::COOKIE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("server.base_url {0:?} is not an http(s) url -- fix it in the config file")]
    InvalidBaseUrl(String),

    #[error("cannot reach {base_url} -- is the agenda server running? ({source})")]
    Network {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server error ({status}): {message}")]
    Http { status: u16, message: String },

    /// The server answered with `success: false`; the message is shown as-is.
    #[error("{0}")]
    Rejected(String),

    #[error("decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("server response is missing {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    session_cookie: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, session_cookie: Option<&str>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        let parsed =
            Url::parse(&base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::Network {
                base_url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            base_url,
            timeout,
            session_cookie: session_cookie
                .map(str::trim)
                .filter(|cookie| !cookie.is_empty())
                .map(str::to_owned),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fetch_reference_data(&self) -> Result<ReferenceData> {
        self.fetch(
            self.http.get(self.url("/api/data/all")),
            "reference data",
            "reference data unavailable",
        )
    }

    pub fn fetch_agenda(&self, meeting_id: MeetingId) -> Result<AgendaSnapshot> {
        self.fetch(
            self.http
                .get(self.url(&format!("/api/agenda/get_logs/{meeting_id}"))),
            "agenda rows",
            "agenda unavailable",
        )
    }

    /// Sends every row and returns the server's canonical replacement.
    pub fn save_agenda(&self, payload: &SavePayload) -> Result<AgendaSnapshot> {
        let reply: Reply<SaveReply> = self.send(
            self.http.post(self.url("/agenda/update")).json(payload),
            "save reply",
        )?;
        let data = reply.accept("save failed")?;
        let rows = data.logs_data.ok_or(ClientError::MissingField("logs_data"))?;
        Ok(AgendaSnapshot {
            rows,
            project_speakers: data.project_speakers.unwrap_or_default(),
            meeting: None,
        })
    }

    pub fn delete_row(&self, id: LogId) -> Result<()> {
        let reply: Reply<Empty> = self.send(
            self.http.post(self.url(&format!("/agenda/delete/{id}"))),
            "delete reply",
        )?;
        reply.accept("delete failed")?;
        Ok(())
    }

    /// Moves the meeting to its next status and returns the new one.
    pub fn advance_status(&self, meeting_id: MeetingId) -> Result<String> {
        let reply: Reply<StatusReply> = self.send(
            self.http
                .post(self.url(&format!("/agenda/status/{meeting_id}"))),
            "status reply",
        )?;
        reply
            .accept("status change failed")?
            .status
            .ok_or(ClientError::MissingField("status"))
    }

    pub fn create_meeting(&self, meeting: &NewMeeting) -> Result<MeetingId> {
        let fields = meeting
            .fields()
            .map_err(|error| ClientError::InvalidInput(format!("{error:#}")))?;
        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        let reply: Reply<CreateReply> = self.send(
            self.http.post(self.url("/agenda/create")).multipart(form),
            "create reply",
        )?;
        reply
            .accept("meeting creation failed")?
            .meeting_id
            .ok_or(ClientError::MissingField("meeting_id"))
    }

    /// Creates a contact, or updates it when `id` is given.
    pub fn save_contact(&self, id: Option<ContactId>, form: &ContactForm) -> Result<Contact> {
        form.validate()
            .map_err(|error| ClientError::InvalidInput(format!("{error:#}")))?;
        let path = match id {
            Some(id) => format!("/contact/form/{id}"),
            None => "/contact/form".to_owned(),
        };
        let reply: Reply<ContactReply> = self.send(
            self.http.post(self.url(&path)).form(&form.fields()),
            "contact reply",
        )?;
        reply
            .accept("contact save failed")?
            .contact
            .ok_or(ClientError::MissingField("contact"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &'static str) -> Result<T> {
        let request = match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie.as_str()),
            None => request,
        };
        let response = request.send().map_err(|source| self.network(source))?;
        let status = response.status();
        log::debug!("{} {what}", status.as_u16());

        let body = response.text().map_err(|source| self.network(source))?;
        if !status.is_success() {
            return Err(clean_error_response(status, &body));
        }
        serde_json::from_str(&body).map_err(|source| ClientError::Decode { what, source })
    }

    /// Decodes a bare data reply. A body carrying `success: false` is a
    /// rejection even though the data fields all have defaults.
    fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &'static str,
        fallback: &str,
    ) -> Result<T> {
        let value: Value = self.send(request, what)?;
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let reply = Reply::<Empty>::deserialize(&value)
                .map_err(|source| ClientError::Decode { what, source })?;
            reply.accept(fallback)?;
        }
        serde_json::from_value(value).map_err(|source| ClientError::Decode { what, source })
    }

    fn network(&self, source: reqwest::Error) -> ClientError {
        log::warn!("request to {} failed: {source}", self.base_url);
        ClientError::Network {
            base_url: self.base_url.clone(),
            source,
        }
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> ClientError {
    if let Ok(parsed) = serde_json::from_str::<Reply<Empty>>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return ClientError::Http {
            status: status.as_u16(),
            message,
        };
    }

    let message = if body.len() < 100 && !body.contains('<') && !body.contains('{') {
        body.trim().to_owned()
    } else {
        status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_owned()
    };
    ClientError::Http {
        status: status.as_u16(),
        message,
    }
}

#[derive(Debug, Deserialize)]
struct Reply<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    data: T,
}

impl<T> Reply<T> {
    fn accept(self, fallback: &str) -> Result<T> {
        if self.success {
            return Ok(self.data);
        }
        Err(ClientError::Rejected(
            self.message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| fallback.to_owned()),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct Empty {}

#[derive(Debug, Deserialize)]
struct SaveReply {
    #[serde(default)]
    logs_data: Option<Vec<Row>>,
    #[serde(default)]
    project_speakers: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct StatusReply {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateReply {
    #[serde(default)]
    meeting_id: Option<MeetingId>,
}

#[derive(Debug, Deserialize)]
struct ContactReply {
    #[serde(default)]
    contact: Option<Contact>,
}

#[cfg(test)]
mod tests {
    use super::{ClientError, Empty, Reply, clean_error_response};
    use reqwest::StatusCode;

    #[test]
    fn error_body_message_is_kept() {
        let error = clean_error_response(
            StatusCode::FORBIDDEN,
            r#"{"success": false, "message": "Not allowed"}"#,
        );
        assert_eq!(error.to_string(), "server error (403): Not allowed");
    }

    #[test]
    fn html_error_pages_are_summarized() {
        let error = clean_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html><body>Traceback...</body></html>",
        );
        assert_eq!(error.to_string(), "server error (500): Internal Server Error");
    }

    #[test]
    fn short_plain_bodies_pass_through() {
        let error = clean_error_response(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(error.to_string(), "server error (502): upstream down");
    }

    #[test]
    fn rejected_reply_prefers_server_message() {
        let reply: Reply<Empty> =
            serde_json::from_str(r#"{"success": false, "message": "Meeting is locked"}"#)
                .expect("valid reply");
        let error = reply.accept("save failed").expect_err("rejected");
        assert!(matches!(error, ClientError::Rejected(ref message) if message == "Meeting is locked"));

        let reply: Reply<Empty> = serde_json::from_str("{}").expect("valid reply");
        assert_eq!(
            reply.accept("save failed").expect_err("rejected").to_string(),
            "save failed"
        );
    }
}
