//! Payload builders.
//!
//! Each builder turns the typed fields of one intent into the single string that
//! is handed to the QR encoder. Builders are pure: absent fields are left out
//! entirely, field order is fixed per micro-format, and content is never
//! validated here.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::QrgenError;
use crate::escape::escape_wifi;

/// Bytes left unencoded in query strings, besides ASCII alphanumerics.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Same as [`QUERY`] but keeps `/`, for URI path-like components.
const COMPONENT: &AsciiSet = &QUERY.remove(b'/');

/// Dates of up to this many characters are bare dates, longer ones date-times.
const MAX_DATE_LEN: usize = 9;

/// Authentication type of a WiFi network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiType {
    Wep,
    Wpa,
    Wpa2Eap,
    NoPass,
}

impl WifiType {
    pub fn as_str(self) -> &'static str {
        match self {
            WifiType::Wep => "WEP",
            WifiType::Wpa => "WPA",
            WifiType::Wpa2Eap => "WPA2-EAP",
            WifiType::NoPass => "nopass",
        }
    }
}

impl fmt::Display for WifiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WifiType {
    type Err = QrgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WEP" => Ok(WifiType::Wep),
            "WPA" => Ok(WifiType::Wpa),
            "WPA2-EAP" => Ok(WifiType::Wpa2Eap),
            "nopass" => Ok(WifiType::NoPass),
            _ => Err(QrgenError::InvalidField {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}

/// Fields of a `WIFI:` network configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WifiFields {
    pub auth: Option<WifiType>,
    pub ssid: Option<String>,
    pub password: Option<String>,
    pub hidden: Option<bool>,
    pub eap: Option<String>,
    pub anonymous: Option<String>,
    pub identity: Option<String>,
    pub phase2: Option<String>,
}

/// Optional parts of a `mailto:` link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MailFields {
    pub addr: String,
    pub subject: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub body: Option<String>,
}

/// A calendar event. Dates are either `YYYYMMDD` or a full iCalendar date-time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFields {
    pub summary: String,
    pub uid: String,
    pub transp: String,
    pub dtstart: String,
    pub dtend: String,
}

/// A DoCoMo `MECARD:` contact. Repeated fields keep the order they were given in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFields {
    pub name: Option<String>,
    pub sound: Option<String>,
    pub tel: Vec<String>,
    pub telav: Vec<String>,
    pub email: Vec<String>,
    pub note: Option<String>,
    pub bday: Option<String>,
    pub adr: Vec<String>,
    pub url: Vec<String>,
    pub nickname: Option<String>,
}

/// Builds a `WIFI:` payload.
///
/// Fields are emitted in the order `T, S, P, H, E, A, I, PH2`, each escaped with
/// [`escape_wifi`], and the record is closed with `;;`.
///
/// # Example
///
/// ```
/// use qrgen::payload::{wifi, WifiFields};
///
/// let fields = WifiFields { ssid: Some("SSID123".into()), ..Default::default() };
/// assert_eq!(wifi(&fields), "WIFI:S:SSID123;;");
/// ```
pub fn wifi(fields: &WifiFields) -> String {
    let hidden = fields.hidden.map(|h| h.to_string());
    let params = [
        ("T", fields.auth.map(WifiType::as_str)),
        ("S", fields.ssid.as_deref()),
        ("P", fields.password.as_deref()),
        ("H", hidden.as_deref()),
        ("E", fields.eap.as_deref()),
        ("A", fields.anonymous.as_deref()),
        ("I", fields.identity.as_deref()),
        ("PH2", fields.phase2.as_deref()),
    ];
    let body = params
        .iter()
        .filter_map(|(k, v)| v.map(|v| format!("{}:{}", k, escape_wifi(v))))
        .collect::<Vec<_>>()
        .join(";");
    format!("WIFI:{body};;")
}

/// Raw text, passed through untouched.
pub fn text(value: &str) -> String {
    value.to_string()
}

/// A plain URL, or a `MEBKM:` bookmark when a non-empty title is given.
pub fn url(url: &str, title: Option<&str>) -> String {
    match title {
        Some(title) if !title.is_empty() => format!(
            "MEBKM:TITLE:{};URL:{};;",
            escape_wifi(title),
            escape_wifi(url)
        ),
        _ => url.to_string(),
    }
}

/// Builds a `mailto:` link. Only present optional fields end up in the query
/// string; with none present there is no `?` at all.
pub fn mail(fields: &MailFields) -> String {
    let params = [
        ("subject", fields.subject.as_deref()),
        ("cc", fields.cc.as_deref()),
        ("bcc", fields.bcc.as_deref()),
        ("body", fields.body.as_deref()),
    ];
    let query = params
        .iter()
        .filter_map(|(k, v)| v.map(|v| format!("{}={}", k, form_encode(v))))
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        format!("mailto:{}", fields.addr)
    } else {
        format!("mailto:{}?{}", fields.addr, query)
    }
}

pub fn tel(number: &str) -> String {
    format!("tel:{number}")
}

/// Builds an `sms:` link; a present, non-empty message is percent-encoded.
pub fn sms(dst: &str, msg: Option<&str>) -> String {
    match msg {
        Some(msg) if !msg.is_empty() => {
            format!("sms:{}:{}", dst, utf8_percent_encode(msg, COMPONENT))
        }
        _ => format!("sms:{dst}"),
    }
}

pub fn facetime(dst: &str) -> String {
    format!("facetime:{dst}")
}

pub fn facetime_audio(dst: &str) -> String {
    format!("facetime-audio:{dst}")
}

/// Builds a `geo:` URI. A `size` of zero counts as absent.
pub fn geo(lat: f64, lon: f64, size: Option<u32>) -> String {
    match size {
        Some(size) if size != 0 => format!("geo:{},{},{}", coord(lat), coord(lon), size),
        _ => format!("geo:{},{}", coord(lat), coord(lon)),
    }
}

pub fn youtube(vid: &str) -> String {
    format!("https://www.youtube.com/v/{vid}")
}

pub fn google_play(id: &str) -> String {
    format!("market://details?id={id}")
}

/// Builds a `VEVENT` block with CRLF line endings.
pub fn event(fields: &EventFields) -> String {
    [
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", fields.uid),
        format!("TRANSP:{}", fields.transp),
        format!("SUMMARY:{}", fields.summary),
        fix_date("DTSTART", &fields.dtstart),
        fix_date("DTEND", &fields.dtend),
        "END:VEVENT".to_string(),
    ]
    .join("\r\n")
}

/// Formats one date property, typing short values as bare dates.
///
/// ```
/// use qrgen::payload::fix_date;
///
/// assert_eq!(fix_date("DTSTART", "20240101"), "DTSTART;VALUE=DATE:20240101");
/// assert_eq!(fix_date("DTSTART", "20240101T000000"), "DTSTART:20240101T000000");
/// ```
pub fn fix_date(key: &str, value: &str) -> String {
    if value.chars().count() <= MAX_DATE_LEN {
        format!("{key};VALUE=DATE:{value}")
    } else {
        format!("{key}:{value}")
    }
}

/// Builds a `MECARD:` contact: singular fields first, then one segment per
/// repeated value in caller order, closed with `;;`.
pub fn contact(fields: &ContactFields) -> String {
    let singular = [
        ("N", fields.name.as_deref()),
        ("SOUND", fields.sound.as_deref()),
        ("NOTE", fields.note.as_deref()),
        ("BDAY", fields.bday.as_deref()),
        ("NICKNAME", fields.nickname.as_deref()),
    ];
    let repeated = [
        ("TEL", &fields.tel),
        ("TEL-AV", &fields.telav),
        ("EMAIL", &fields.email),
        ("ADR", &fields.adr),
        ("URL", &fields.url),
    ];

    let mut segments: Vec<String> = singular
        .iter()
        .filter_map(|(k, v)| v.map(|v| format!("{k}:{v}")))
        .collect();
    for (key, values) in repeated {
        segments.extend(values.iter().map(|v| format!("{key}:{v}")));
    }
    format!("MECARD:{};;", segments.join(";"))
}

/// `application/x-www-form-urlencoded` value encoding: spaces become `+`.
fn form_encode(value: &str) -> String {
    value
        .split(' ')
        .map(|part| utf8_percent_encode(part, QUERY).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Shortest round-trip decimal, always with a fractional part.
fn coord(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wifi_ssid_only() {
        let fields = WifiFields {
            ssid: Some("SSID123".into()),
            ..Default::default()
        };
        assert_eq!(wifi(&fields), "WIFI:S:SSID123;;");
    }

    #[test]
    fn test_wifi_empty() {
        assert_eq!(wifi(&WifiFields::default()), "WIFI:;;");
    }

    #[test]
    fn test_wifi_field_order_and_escaping() {
        let fields = WifiFields {
            phase2: Some("MSCHAPV2".into()),
            identity: Some("me".into()),
            anonymous: Some("anon".into()),
            eap: Some("PEAP".into()),
            hidden: Some(true),
            password: Some("p;a:ss".into()),
            ssid: Some("home,net".into()),
            auth: Some(WifiType::Wpa2Eap),
        };
        assert_eq!(
            wifi(&fields),
            "WIFI:T:WPA2-EAP;S:home\\,net;P:p\\;a\\:ss;H:true;E:PEAP;A:anon;I:me;PH2:MSCHAPV2;;"
        );
    }

    #[test]
    fn test_wifi_type_parse() {
        assert_eq!("nopass".parse::<WifiType>().unwrap(), WifiType::NoPass);
        assert_eq!("WPA2-EAP".parse::<WifiType>().unwrap(), WifiType::Wpa2Eap);
        assert!("wpa".parse::<WifiType>().is_err());
    }

    #[test]
    fn test_url_and_bookmark() {
        assert_eq!(url("https://example.com", None), "https://example.com");
        assert_eq!(url("https://example.com", Some("")), "https://example.com");
        assert_eq!(
            url("https://example.com", Some("Ex;ample")),
            "MEBKM:TITLE:Ex\\;ample;URL:https\\://example.com;;"
        );
    }

    #[test]
    fn test_mail_without_query() {
        let fields = MailFields {
            addr: "a@b.com".into(),
            ..Default::default()
        };
        assert_eq!(mail(&fields), "mailto:a@b.com");
    }

    #[test]
    fn test_mail_subject() {
        let fields = MailFields {
            addr: "a@b.com".into(),
            subject: Some("Hi".into()),
            ..Default::default()
        };
        assert_eq!(mail(&fields), "mailto:a@b.com?subject=Hi");
    }

    #[test]
    fn test_mail_query_encoding_and_order() {
        let fields = MailFields {
            addr: "a@b.com".into(),
            body: Some("see you at 5/6 & bye".into()),
            cc: Some("c@d.com".into()),
            subject: None,
            bcc: None,
        };
        assert_eq!(
            mail(&fields),
            "mailto:a@b.com?cc=c%40d.com&body=see+you+at+5%2F6+%26+bye"
        );
    }

    #[test]
    fn test_tel_facetime_youtube_play() {
        assert_eq!(tel("+15551234"), "tel:+15551234");
        assert_eq!(facetime("me@example.com"), "facetime:me@example.com");
        assert_eq!(facetime_audio("+1555"), "facetime-audio:+1555");
        assert_eq!(youtube("dQw4w9WgXcQ"), "https://www.youtube.com/v/dQw4w9WgXcQ");
        assert_eq!(google_play("org.example.app"), "market://details?id=org.example.app");
        assert_eq!(text("hello"), "hello");
    }

    #[test]
    fn test_sms() {
        assert_eq!(sms("+1555", None), "sms:+1555");
        assert_eq!(sms("+1555", Some("")), "sms:+1555");
        assert_eq!(sms("+1555", Some("hi there/you?")), "sms:+1555:hi%20there/you%3F");
        assert_eq!(sms("+1555", Some("é")), "sms:+1555:%C3%A9");
    }

    #[test]
    fn test_geo() {
        assert_eq!(geo(35.0, 139.5, None), "geo:35.0,139.5");
        assert_eq!(geo(-33.8688, 151.2093, Some(100)), "geo:-33.8688,151.2093,100");
        assert_eq!(geo(1.5, 2.0, Some(0)), "geo:1.5,2.0");
    }

    #[test]
    fn test_fix_date() {
        assert_eq!(fix_date("DTSTART", "20240101"), "DTSTART;VALUE=DATE:20240101");
        assert_eq!(fix_date("DTEND", "202401011"), "DTEND;VALUE=DATE:202401011");
        assert_eq!(fix_date("DTSTART", "20240101T000000"), "DTSTART:20240101T000000");
    }

    #[test]
    fn test_event() {
        let fields = EventFields {
            summary: "Party".into(),
            uid: "uid-1".into(),
            transp: "OPAQUE".into(),
            dtstart: "20240101".into(),
            dtend: "20240102T120000Z".into(),
        };
        let payload = event(&fields);
        assert_eq!(
            payload,
            "BEGIN:VEVENT\r\nUID:uid-1\r\nTRANSP:OPAQUE\r\nSUMMARY:Party\r\n\
             DTSTART;VALUE=DATE:20240101\r\nDTEND:20240102T120000Z\r\nEND:VEVENT"
        );
        assert!(!payload.ends_with("\r\n"));
    }

    #[test]
    fn test_contact_repeated_order() {
        let fields = ContactFields {
            name: Some("Doe,John".into()),
            tel: vec!["111".into(), "222".into()],
            email: vec!["j@d.com".into()],
            nickname: Some("JD".into()),
            ..Default::default()
        };
        let payload = contact(&fields);
        assert_eq!(payload, "MECARD:N:Doe,John;NICKNAME:JD;TEL:111;TEL:222;EMAIL:j@d.com;;");
        let first = payload.find("TEL:111").unwrap();
        let second = payload.find("TEL:222").unwrap();
        assert!(payload.find("NICKNAME").unwrap() < first && first < second);
    }

    #[test]
    fn test_contact_all_kinds() {
        let fields = ContactFields {
            name: Some("N".into()),
            sound: Some("S".into()),
            tel: vec!["1".into()],
            telav: vec!["2".into()],
            email: vec!["e".into()],
            note: Some("no".into()),
            bday: Some("19700101".into()),
            adr: vec!["a1".into(), "a2".into()],
            url: vec!["u".into()],
            nickname: Some("nick".into()),
        };
        assert_eq!(
            contact(&fields),
            "MECARD:N:N;SOUND:S;NOTE:no;BDAY:19700101;NICKNAME:nick;\
             TEL:1;TEL-AV:2;EMAIL:e;ADR:a1;ADR:a2;URL:u;;"
        );
        assert_eq!(contact(&ContactFields::default()), "MECARD:;;");
    }
}
