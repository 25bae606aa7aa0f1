//! Cookie boundary
//!
//! The manager reads the session cookie through [`CookieSource`] and issues a
//! new one through [`CookieSink`]. Any HTTP stack can implement both; a
//! `Cookie` request header parser and plain collections are provided.

use std::collections::HashMap;
use std::fmt;

/// Read access to the cookies of an inbound request
pub trait CookieSource {
    /// Value of the cookie called `name`, if present
    fn cookie(&self, name: &str) -> Option<&str>;
}

/// Somewhere to put the cookie issued for a newly minted session
pub trait CookieSink {
    /// Queue `cookie` on the outbound response
    fn set_cookie(&mut self, cookie: SetCookie);
}

impl CookieSource for HashMap<String, String> {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl CookieSink for Vec<SetCookie> {
    fn set_cookie(&mut self, cookie: SetCookie) {
        self.push(cookie);
    }
}

/// Cookies parsed from a `Cookie` request header
///
/// The first occurrence of a name wins. Values are taken verbatim apart from
/// surrounding whitespace and optional double quotes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCookies {
    pairs: Vec<(String, String)>,
}

impl RequestCookies {
    /// Parse a header value such as `a=1; SESSIONKV_ID=abc`
    pub fn parse(header: &str) -> Self {
        let pairs = header
            .split(';')
            .filter_map(|part| {
                let (name, value) = part.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self { pairs }
    }

    /// Number of cookies parsed
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the header carried no cookies
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl CookieSource for RequestCookies {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A cookie to set on the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    /// Lifetime in seconds; `0` leaves the attribute out (browser session)
    pub max_age: i64,
}

impl fmt::Display for SetCookie {
    /// Render as a `Set-Cookie` header value
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if !self.domain.is_empty() {
            write!(f, "; Domain={}", self.domain)?;
        }
        match self.max_age {
            0 => Ok(()),
            age if age < 0 => write!(f, "; Max-Age=0"),
            age => write!(f, "; Max-Age={age}"),
        }
    }
}
