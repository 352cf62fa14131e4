use crate::config::CookieConfig;
use crate::config::RunMode;

/// Builds `Set-Cookie` header values carrying the session token.
///
/// Cookies are `HttpOnly` on path `/`. Production deployments serve the
/// client cross-site, so there the cookie is `SameSite=None; Secure`;
/// everywhere else it is `SameSite=Lax`.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    max_age_secs: u64,
    production: bool,
}

impl SessionCookie {
    pub fn new(config: &CookieConfig, run_mode: RunMode) -> Self {
        Self {
            name: config.name.clone(),
            max_age_secs: config.max_age_ms / 1000,
            production: run_mode.is_production(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header value that stores `token` in the browser.
    pub fn set_header(&self, token: &str) -> String {
        self.render(token, self.max_age_secs)
    }

    /// Header value that removes the session cookie.
    pub fn clear_header(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age_secs: u64) -> String {
        let same_site = if self.production {
            "SameSite=None; Secure"
        } else {
            "SameSite=Lax"
        };

        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; {}",
            self.name, value, max_age_secs, same_site
        )
    }
}
