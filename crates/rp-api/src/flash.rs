//! Transient notices carried across a redirect in the `flash` cookie.
//!
//! A redirecting handler sets the cookie; the next rendered page takes it and
//! clears it, so each notice is shown exactly once.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rp_ui::Notice;

pub const FLASH_COOKIE: &str = "flash";

/// Queues `notice` for the next rendered page.
pub fn set(jar: CookieJar, notice: Notice) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, encode(&notice)))
        .path("/")
        .http_only(true);
    jar.add(cookie)
}

/// Removes the pending notice, if any, and returns it.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Notice>) {
    let Some(notice) = jar.get(FLASH_COOKIE).map(|c| decode(c.value())) else {
        return (jar, None);
    };
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), notice)
}

fn encode(notice: &Notice) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}\n{}", notice.level, notice.text))
}

fn decode(value: &str) -> Option<Notice> {
    let raw = URL_SAFE_NO_PAD.decode(value).ok()?;
    let raw = String::from_utf8(raw).ok()?;
    let (level, text) = raw.split_once('\n')?;
    match level {
        "success" => Some(Notice::success(text)),
        "error" => Some(Notice::error(text)),
        _ => None,
    }
}
