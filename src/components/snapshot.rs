use crate::domain::models::cookie_models::Cookie;
use crate::service::config::SnapshotPrecedence;
use chrono::{Local, TimeZone};
use std::collections::HashMap;

const RECORD_RULE_WIDTH: usize = 50;

/// The panel's view of a site's cookies: one entry per name, merged from
/// the exact-hostname query and the full-URL query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieSnapshot {
    cookies: Vec<Cookie>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Source {
    Domain,
    Url,
}

impl CookieSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Deduplicates by name. An entry keeps the position where its name
    /// first appeared (domain list first, then URL list). When both lists
    /// carry a name, `precedence` picks which value survives; inside one
    /// list the later entry wins.
    pub fn merge(
        domain_matches: Vec<Cookie>,
        url_matches: Vec<Cookie>,
        precedence: SnapshotPrecedence,
    ) -> Self {
        let preferred = match precedence {
            SnapshotPrecedence::DomainExactWins => Source::Domain,
            SnapshotPrecedence::UrlMatchWins => Source::Url,
        };

        let mut slots: Vec<(Cookie, Source)> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        let incoming = domain_matches
            .into_iter()
            .map(|cookie| (cookie, Source::Domain))
            .chain(url_matches.into_iter().map(|cookie| (cookie, Source::Url)));

        for (cookie, source) in incoming {
            match by_name.get(&cookie.name) {
                Some(&index) => {
                    let held = slots[index].1;
                    if source == preferred || held == source {
                        slots[index] = (cookie, source);
                    }
                }
                None => {
                    by_name.insert(cookie.name.clone(), slots.len());
                    slots.push((cookie, source));
                }
            }
        }

        Self {
            cookies: slots.into_iter().map(|(cookie, _)| cookie).collect(),
        }
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|cookie| cookie.name == name)
    }

    pub fn to_simple_string(&self) -> String {
        format_simple(&self.cookies)
    }

    pub fn to_detailed_string(&self) -> String {
        format_detailed(&self.cookies)
    }
}

/// `a=1; b=2`
pub fn format_simple(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(Cookie::pair)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn format_detailed(cookies: &[Cookie]) -> String {
    let separator = format!("\n\n{}\n\n", "=".repeat(RECORD_RULE_WIDTH));

    cookies
        .iter()
        .map(format_record)
        .collect::<Vec<_>>()
        .join(&separator)
}

fn format_record(cookie: &Cookie) -> String {
    let same_site = cookie
        .same_site
        .map(|same_site| same_site.to_string())
        .unwrap_or_else(|| "unset".to_string());

    [
        format!("Name: {}", cookie.name),
        format!("Value: {}", cookie.value),
        format!("Domain: {}", cookie.domain),
        format!("Path: {}", cookie.path),
        format!("Expires: {}", render_expiry(cookie.expiration_date)),
        format!("Secure: {}", yes_no(cookie.secure)),
        format!("HttpOnly: {}", yes_no(cookie.http_only)),
        format!("SameSite: {same_site}"),
    ]
    .join("\n")
}

/// Local date-time of an epoch-seconds expiry, or `session cookie`.
pub fn render_expiry(expiration_date: Option<f64>) -> String {
    let Some(seconds) = expiration_date else {
        return "session cookie".to_string();
    };

    let whole = seconds.trunc() as i64;
    let nanos = (seconds.fract() * 1e9) as u32;
    match Local.timestamp_opt(whole, nanos).single() {
        Some(local) => local.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("{seconds}"),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SameSite;

    fn cookie(domain: &str, name: &str, value: &str) -> Cookie {
        Cookie::new(domain, "/", name, value)
    }

    #[test]
    fn test_merge_dedups_by_name() {
        let snapshot = CookieSnapshot::merge(
            vec![cookie("example.com", "a", "1"), cookie("example.com", "b", "2")],
            vec![cookie(".example.com", "b", "parent"), cookie(".example.com", "c", "3")],
            SnapshotPrecedence::DomainExactWins,
        );

        let names: Vec<&str> = snapshot.cookies().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_domain_exact_wins_regardless_of_arrival_order() {
        let snapshot = CookieSnapshot::merge(
            vec![cookie("example.com", "sid", "exact")],
            vec![cookie(".example.com", "sid", "parent")],
            SnapshotPrecedence::DomainExactWins,
        );
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("sid").unwrap().value, "exact");
    }

    #[test]
    fn test_url_match_wins_when_configured() {
        let snapshot = CookieSnapshot::merge(
            vec![cookie("example.com", "sid", "exact")],
            vec![cookie(".example.com", "sid", "parent")],
            SnapshotPrecedence::UrlMatchWins,
        );
        assert_eq!(snapshot.get("sid").unwrap().value, "parent");
    }

    #[test]
    fn test_later_entry_wins_inside_one_list() {
        let snapshot = CookieSnapshot::merge(
            vec![
                Cookie::new("example.com", "/app", "sid", "deep"),
                Cookie::new("example.com", "/", "sid", "root"),
            ],
            vec![],
            SnapshotPrecedence::DomainExactWins,
        );
        assert_eq!(snapshot.get("sid").unwrap().value, "root");
    }

    #[test]
    fn test_simple_format() {
        let snapshot = CookieSnapshot::merge(
            vec![cookie("example.com", "a", "1"), cookie("example.com", "b", "x=y")],
            vec![],
            SnapshotPrecedence::DomainExactWins,
        );
        assert_eq!(snapshot.to_simple_string(), "a=1; b=x=y");
        assert_eq!(CookieSnapshot::empty().to_simple_string(), "");
    }

    #[test]
    fn test_detailed_format() {
        let mut unset = cookie("example.com", "b", "2");
        unset.same_site = None;
        let cookies = vec![
            cookie("example.com", "a", "1")
                .with_secure(true)
                .with_same_site(SameSite::Lax),
            unset,
        ];

        let text = format_detailed(&cookies);
        let records: Vec<&str> = text.split(&format!("\n\n{}\n\n", "=".repeat(50))).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            "Name: a\nValue: 1\nDomain: example.com\nPath: /\nExpires: session cookie\n\
             Secure: yes\nHttpOnly: no\nSameSite: lax"
        );
        assert!(records[1].ends_with("SameSite: unset"));
    }

    #[test]
    fn test_render_expiry() {
        assert_eq!(render_expiry(None), "session cookie");
        let rendered = render_expiry(Some(1_700_000_000.5));
        assert_eq!(rendered.len(), "2023-11-14 22:13:20".len());
    }
}
