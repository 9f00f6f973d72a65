//! Request glue: maps a route, an optional format suffix and query parameters
//! to an [`Intent`], and runs it through a [`Renderer`].
//!
//! No HTTP framework is involved; a server only has to hand over the request
//! path and raw query string, then copy [`Rendered`] into its response.
//!
//! ```
//! use qrgen::config::RenderOptions;
//! use qrgen::dispatch::Request;
//! use qrgen::render::Renderer;
//!
//! let request = Request::from_path_and_query("/wifi/ascii", "ssid=SSID123&err=H").unwrap();
//! assert_eq!(request.intent.payload(), "WIFI:S:SSID123;;");
//!
//! let out = request.handle(&Renderer::new(RenderOptions::default())).unwrap();
//! assert_eq!(out.media_type, "text/plain");
//! ```

use percent_encoding::percent_decode_str;

use crate::encoder::QrEncoder;
use crate::error::{QrgenError, Result};
use crate::format::{ErrorCorrectionLevel, OutputFormat};
use crate::payload::{self, ContactFields, EventFields, MailFields, WifiFields, WifiType};
use crate::render::{Rendered, Renderer};

/// One route family of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Wifi,
    Text,
    Url,
    Mail,
    Tel,
    Sms,
    Facetime,
    FacetimeAudio,
    Geo,
    Youtube,
    GooglePlay,
    Event,
    Addr,
}

impl Route {
    /// Looks up a route by the first path segment.
    pub fn lookup(name: &str) -> Option<Self> {
        let route = match name {
            "wifi" => Route::Wifi,
            "text" => Route::Text,
            "url" => Route::Url,
            "mail" => Route::Mail,
            "tel" => Route::Tel,
            "sms" => Route::Sms,
            "facetime" => Route::Facetime,
            "facetime-audio" => Route::FacetimeAudio,
            "geo" | "map" => Route::Geo,
            "youtube" => Route::Youtube,
            "googleplay" => Route::GooglePlay,
            "event" => Route::Event,
            "addr" => Route::Addr,
            _ => return None,
        };
        Some(route)
    }

    /// Parses `/route` or `/route/{fmt}`. The format defaults to PNG.
    ///
    /// `/map` is an alias of `/geo`, but only without a format suffix.
    pub fn from_path(path: &str) -> Result<(Route, OutputFormat)> {
        let trimmed = path.trim_start_matches('/');
        let (name, fmt) = match trimmed.split_once('/') {
            Some((name, fmt)) => (name, Some(fmt)),
            None => (trimmed, None),
        };
        let route = Route::lookup(name).ok_or_else(|| QrgenError::UnknownRoute(path.to_string()))?;
        match fmt {
            None => Ok((route, OutputFormat::default())),
            Some(_) if name == "map" => Err(QrgenError::UnknownRoute(path.to_string())),
            Some(fmt) => Ok((route, fmt.parse()?)),
        }
    }
}

/// Decoded query parameters in their original order. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Parses an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        let pairs = query
            .trim_start_matches('?')
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (form_decode(key), form_decode(value))
            })
            .collect();
        Query { pairs }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Query {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// The last value given for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value given for `key`, in order.
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn required(&self, key: &'static str) -> Result<String> {
        self.string(key).ok_or(QrgenError::MissingField(key))
    }

    fn parsed<T: std::str::FromStr>(&self, key: &'static str) -> Result<Option<T>> {
        self.get(key)
            .map(|value| {
                value.parse().map_err(|_| QrgenError::InvalidField {
                    field: key,
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>> {
        self.get(key)
            .map(|value| {
                parse_bool(value).ok_or_else(|| QrgenError::InvalidField {
                    field: key,
                    value: value.to_string(),
                })
            })
            .transpose()
    }
}

/// A fully parsed request body for one of the payload builders.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Wifi(WifiFields),
    Text(String),
    Url { url: String, title: Option<String> },
    Mail(MailFields),
    Tel(String),
    Sms { dst: String, msg: Option<String> },
    Facetime(String),
    FacetimeAudio(String),
    Geo { lat: f64, lon: f64, size: Option<u32> },
    Youtube(String),
    GooglePlay(String),
    Event(EventFields),
    Contact(ContactFields),
}

impl Intent {
    /// Reads the parameters of `route` from `query`.
    ///
    /// # Errors
    ///
    /// [`QrgenError::MissingField`] when a required parameter is absent and
    /// [`QrgenError::InvalidField`] when a typed parameter does not parse.
    pub fn from_query(route: Route, query: &Query) -> Result<Intent> {
        let intent = match route {
            Route::Wifi => {
                let auth = query
                    .get("type")
                    .map(str::parse::<WifiType>)
                    .transpose()?;
                Intent::Wifi(WifiFields {
                    auth,
                    ssid: query.string("ssid"),
                    password: query.string("password"),
                    hidden: query.flag("hidden")?,
                    eap: query.string("eap"),
                    anonymous: query.string("anonymous"),
                    identity: query.string("identity"),
                    phase2: query.string("phase2"),
                })
            }
            Route::Text => Intent::Text(query.required("v")?),
            Route::Url => Intent::Url {
                url: query.required("url")?,
                title: query.string("title"),
            },
            Route::Mail => Intent::Mail(MailFields {
                addr: query.required("addr")?,
                subject: query.string("subject"),
                cc: query.string("cc"),
                bcc: query.string("bcc"),
                body: query.string("body"),
            }),
            Route::Tel => Intent::Tel(query.required("n")?),
            Route::Sms => Intent::Sms {
                dst: query.required("dst")?,
                msg: query.string("msg"),
            },
            Route::Facetime => Intent::Facetime(query.required("dst")?),
            Route::FacetimeAudio => Intent::FacetimeAudio(query.required("dst")?),
            Route::Geo => Intent::Geo {
                lat: query.parsed("lat")?.ok_or(QrgenError::MissingField("lat"))?,
                lon: query.parsed("lon")?.ok_or(QrgenError::MissingField("lon"))?,
                size: query.parsed("size")?,
            },
            Route::Youtube => Intent::Youtube(query.required("vid")?),
            Route::GooglePlay => Intent::GooglePlay(query.required("id")?),
            Route::Event => Intent::Event(EventFields {
                summary: query.required("summary")?,
                uid: query.required("uid")?,
                transp: query.required("transp")?,
                dtstart: query.required("dtstart")?,
                dtend: query.required("dtend")?,
            }),
            Route::Addr => Intent::Contact(ContactFields {
                name: query.string("name"),
                sound: query.string("sound"),
                tel: query.get_all("tel"),
                telav: query.get_all("telav"),
                email: query.get_all("email"),
                note: query.string("note"),
                bday: query.string("bday"),
                adr: query.get_all("adr"),
                url: query.get_all("url"),
                nickname: query.string("nickname"),
            }),
        };
        Ok(intent)
    }

    /// Builds the payload string for this intent.
    pub fn payload(&self) -> String {
        let payload = match self {
            Intent::Wifi(fields) => payload::wifi(fields),
            Intent::Text(value) => payload::text(value),
            Intent::Url { url, title } => payload::url(url, title.as_deref()),
            Intent::Mail(fields) => payload::mail(fields),
            Intent::Tel(number) => payload::tel(number),
            Intent::Sms { dst, msg } => payload::sms(dst, msg.as_deref()),
            Intent::Facetime(dst) => payload::facetime(dst),
            Intent::FacetimeAudio(dst) => payload::facetime_audio(dst),
            Intent::Geo { lat, lon, size } => payload::geo(*lat, *lon, *size),
            Intent::Youtube(vid) => payload::youtube(vid),
            Intent::GooglePlay(id) => payload::google_play(id),
            Intent::Event(fields) => payload::event(fields),
            Intent::Contact(fields) => payload::contact(fields),
        };
        log::debug!("built payload {payload:?}");
        payload
    }
}

/// A parsed request: what to encode, at which level, in which format.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub intent: Intent,
    pub format: OutputFormat,
    pub level: ErrorCorrectionLevel,
}

impl Request {
    /// Parses a request path such as `/addr/html` and its raw query string.
    /// The `err` parameter selects the error-correction level (`M` by default).
    pub fn from_path_and_query(path: &str, query: &str) -> Result<Request> {
        let (route, format) = Route::from_path(path)?;
        let query = Query::parse(query);
        let level = match query.get("err") {
            Some(err) => err.parse()?,
            None => ErrorCorrectionLevel::default(),
        };
        log::info!("fmt={format}, err={level}");
        Ok(Request {
            intent: Intent::from_query(route, &query)?,
            format,
            level,
        })
    }

    pub fn handle<E: QrEncoder>(&self, renderer: &Renderer<E>) -> Result<Rendered> {
        renderer.render(&self.intent.payload(), self.level, self.format)
    }
}

/// Accepts the usual spellings of a boolean query flag.
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "y" | "t" => Some(true),
        "false" | "0" | "no" | "off" | "n" | "f" => Some(false),
        _ => None,
    }
}

fn form_decode(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
