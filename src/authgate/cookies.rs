//! Cookie-backed [`TokenStore`]. Values are read from the request `Cookie`
//! header; writes are collected and emitted as `Set-Cookie` headers on the
//! response. Values are form-urlencoded so opaque tokens keep `;`, `,`,
//! quotes and whitespace intact.

use crate::session::{Slot, TokenStore};
use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use axum::response::{IntoResponseParts, ResponseParts};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::convert::Infallible;
use tracing::error;
use url::form_urlencoded;

#[derive(Debug)]
pub struct CookieStore {
    secure: bool,
    current: HashMap<Slot, SecretString>,
    /// Slots written during this request; `None` means cleared.
    changes: HashMap<Slot, Option<SecretString>>,
}

impl CookieStore {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let mut current = HashMap::new();
        for slot in Slot::ALL {
            if let Some(value) = read_cookie(headers, slot.name()) {
                current.insert(slot, SecretString::from(value));
            }
        }

        Self {
            secure,
            current,
            changes: HashMap::new(),
        }
    }

    /// `Set-Cookie` values for every slot written during the request.
    #[must_use]
    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        Slot::ALL
            .iter()
            .filter_map(|slot| {
                let change = self.changes.get(slot)?;
                let cookie = match change {
                    Some(value) => self.cookie(slot.name(), value.expose_secret(), None),
                    None => self.cookie(slot.name(), "", Some(0)),
                };
                HeaderValue::from_str(&cookie)
                    .map_err(|err| error!("Failed to build {} cookie: {err}", slot.name()))
                    .ok()
            })
            .collect()
    }

    fn cookie(&self, name: &str, value: &str, max_age: Option<u64>) -> String {
        let value: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
        let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
        if let Some(max_age) = max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl TokenStore for CookieStore {
    fn get(&self, slot: Slot) -> Option<SecretString> {
        match self.changes.get(&slot) {
            Some(change) => change.clone(),
            None => self.current.get(&slot).cloned(),
        }
    }

    fn set(&mut self, slot: Slot, value: SecretString) {
        self.changes.insert(slot, Some(value));
    }

    fn remove(&mut self, slot: Slot) {
        self.changes.insert(slot, None);
    }
}

impl IntoResponseParts for CookieStore {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for cookie in self.set_cookie_headers() {
            res.headers_mut().append(SET_COOKIE, cookie);
        }
        Ok(res)
    }
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            // encoded values never contain '=' or '&', so the first pair is the cookie
            let Some((key, val)) = form_urlencoded::parse(pair.trim().as_bytes()).next() else {
                continue;
            };
            if key == name && !val.is_empty() {
                return Some(val.into_owned());
            }
        }
    }
    None
}
