//! Request-scoped page context.
//!
//! Every full page renders inside the customer layout, which needs the
//! signed-in customer, their notifications, the locale and text direction,
//! and the marketplace's display settings. [`PageContext`] gathers all of it
//! once per request from the session and the backend's session-context
//! endpoint. A failed lookup degrades to guest defaults; it never fails the
//! page.
//!
//! HTMX fragment handlers only need to know who is calling; they take the
//! cheaper [`Visitor`] extractor instead.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use chrono::format::{Item, StrftimeItems};
use tower_sessions::Session;
use tracing::warn;

use souq_core::{CityId, Locale, Price, SymbolPlacement};

use crate::backend::{BackendError, Caller, DisplaySettings, Notification, SessionContext};
use crate::middleware::{clear_current_customer, current_customer};
use crate::models::{CurrentCustomer, session_keys};
use crate::state::AppState;

/// Recent notifications shown in the header dropdown.
const HEADER_NOTIFICATIONS: usize = 5;

// =============================================================================
// Visitor
// =============================================================================

/// Who is making the request: the session customer (if any) and the locale.
#[derive(Debug, Clone)]
pub struct Visitor {
    pub customer: Option<CurrentCustomer>,
    pub locale: Locale,
}

impl Visitor {
    /// Backend caller for this visitor.
    #[must_use]
    pub fn caller(&self) -> Caller {
        match &self.customer {
            Some(customer) => customer.caller(self.locale),
            None => Caller::guest(self.locale),
        }
    }

    /// Whether a customer is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.customer.is_some()
    }
}

impl FromRequestParts<AppState> for Visitor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let default_locale = state.config().default_locale;
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self {
                customer: None,
                locale: default_locale,
            });
        };

        let customer = current_customer(session).await;
        let locale = session
            .get::<Locale>(session_keys::LOCALE)
            .await
            .ok()
            .flatten()
            .unwrap_or(default_locale);

        Ok(Self { customer, locale })
    }
}

// =============================================================================
// Display formatting
// =============================================================================

/// Formats prices, dates and image URLs the way the marketplace is configured.
#[derive(Debug, Clone)]
pub struct DisplayFormat {
    currency_symbol: String,
    placement: SymbolPlacement,
    date_format: String,
    storage_url: Option<String>,
}

impl DisplayFormat {
    /// Build from the backend's settings.
    ///
    /// An invalid date pattern falls back to the default instead of panicking
    /// at render time.
    #[must_use]
    pub fn new(settings: &DisplaySettings, storage_url: Option<&str>) -> Self {
        let date_format = if is_valid_strftime(&settings.date_format) {
            settings.date_format.clone()
        } else {
            warn!(pattern = %settings.date_format, "Ignoring invalid date format");
            DisplaySettings::default().date_format
        };

        Self {
            currency_symbol: settings.currency_symbol.clone(),
            placement: if settings.symbol_before_amount {
                SymbolPlacement::Before
            } else {
                SymbolPlacement::After
            },
            date_format,
            storage_url: storage_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    /// `25.50 EGP`, or `$25.50` when the symbol goes first.
    #[must_use]
    pub fn price(&self, price: &Price) -> String {
        price.format(&self.currency_symbol, self.placement)
    }

    /// Date in the configured pattern.
    #[must_use]
    pub fn date(&self, at: &DateTime<Utc>) -> String {
        at.format(&self.date_format).to_string()
    }

    /// Date plus 24-hour time.
    #[must_use]
    pub fn date_time(&self, at: &DateTime<Utc>) -> String {
        format!("{} {}", self.date(at), at.format("%H:%M"))
    }

    /// Absolute URL for an image path from the backend.
    ///
    /// Absolute URLs pass through; relative storage paths are prefixed with
    /// the configured storage URL.
    #[must_use]
    pub fn image(&self, path: Option<&str>) -> Option<String> {
        let path = path.map(str::trim).filter(|p| !p.is_empty())?;
        if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:")
        {
            return Some(path.to_string());
        }
        Some(match &self.storage_url {
            Some(base) => format!("{base}/{}", path.trim_start_matches('/')),
            None => path.to_string(),
        })
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::new(&DisplaySettings::default(), None)
    }
}

fn is_valid_strftime(pattern: &str) -> bool {
    !pattern.is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

// =============================================================================
// Page context
// =============================================================================

/// Signed-in customer as shown in the header.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
    pub initials: String,
    pub avatar_url: Option<String>,
    pub default_city: Option<CityId>,
}

/// A header notification.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub title: String,
    pub body: Option<String>,
    pub time: String,
    pub unread: bool,
}

impl NotificationView {
    fn new(notification: &Notification, format: &DisplayFormat) -> Self {
        Self {
            title: notification.title.clone(),
            body: notification.body.clone(),
            time: format.date_time(&notification.created_at),
            unread: notification.read_at.is_none(),
        }
    }
}

/// Everything the customer layout needs, extracted once per request.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub visitor: Visitor,
    pub user: Option<UserView>,
    pub unread_notifications: u32,
    pub notifications: Vec<NotificationView>,
    pub lang: &'static str,
    pub dir: &'static str,
    pub format: DisplayFormat,
    pub current_path: String,
    pub flash: Option<String>,
}

impl PageContext {
    /// Assemble from the visitor and the backend's session context.
    #[must_use]
    pub fn assemble(
        visitor: Visitor,
        context: &SessionContext,
        storage_url: Option<&str>,
        current_path: String,
    ) -> Self {
        let format = DisplayFormat::new(&context.settings, storage_url);

        let user = match (&context.user, &visitor.customer) {
            (Some(user), _) => Some(UserView {
                name: user.name.clone(),
                initials: initials(&user.name),
                avatar_url: format.image(user.avatar.as_deref()),
                default_city: user.city_id,
            }),
            (None, Some(customer)) => Some(UserView {
                name: customer.name.clone(),
                initials: initials(&customer.name),
                avatar_url: None,
                default_city: customer.default_city,
            }),
            (None, None) => None,
        };

        let notifications = context
            .notifications
            .recent
            .iter()
            .take(HEADER_NOTIFICATIONS)
            .map(|n| NotificationView::new(n, &format))
            .collect();

        Self {
            lang: visitor.locale.as_str(),
            dir: visitor.locale.direction().as_str(),
            visitor,
            user,
            unread_notifications: context.notifications.unread_count,
            notifications,
            format,
            current_path,
            flash: None,
        }
    }

    /// Backend caller for this request.
    #[must_use]
    pub fn caller(&self) -> Caller {
        self.visitor.caller()
    }

    /// Whether a customer is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.visitor.is_authenticated()
    }

    /// The signed-in customer's default city.
    #[must_use]
    pub fn default_city(&self) -> Option<CityId> {
        self.user.as_ref().and_then(|u| u.default_city)
    }

    /// Locale offered by the language switcher.
    #[must_use]
    pub const fn other_locale(&self) -> Locale {
        match self.visitor.locale {
            Locale::Ar => Locale::En,
            Locale::En => Locale::Ar,
        }
    }

    /// Whether a sidebar link points at the current section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(prefix)
        }
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let mut visitor = Visitor::from_request_parts(parts, state).await?;
        let session = parts.extensions.get::<Session>().cloned();

        let context = match state.market().session_context(&visitor.caller()).await {
            Ok(context) => context,
            Err(BackendError::Unauthorized) if visitor.customer.is_some() => {
                // Token revoked or expired: continue as a guest
                if let Some(session) = &session
                    && let Err(e) = clear_current_customer(session).await
                {
                    warn!(error = %e, "Failed to clear expired customer from session");
                }
                visitor.customer = None;
                SessionContext::default()
            }
            Err(e) => {
                warn!(error = %e, "Session context unavailable, rendering with defaults");
                SessionContext::default()
            }
        };

        let flash = match &session {
            Some(session) => session
                .remove::<String>(session_keys::FLASH)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        let mut page = Self::assemble(
            visitor,
            &context,
            state.config().market.storage_url.as_deref(),
            parts.uri.path().to_string(),
        );
        page.flash = flash;
        Ok(page)
    }
}

/// Store a one-shot message for the next rendered page.
pub async fn set_flash(session: &Session, message: impl Into<String>) {
    if let Err(e) = session.insert(session_keys::FLASH, message.into()).await {
        warn!(error = %e, "Failed to store flash message");
    }
}

/// Up to two initials for the avatar placeholder.
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn settings(symbol_before: bool, date_format: &str) -> DisplaySettings {
        DisplaySettings {
            currency_code: "EGP".to_string(),
            currency_symbol: if symbol_before { "$" } else { "EGP" }.to_string(),
            symbol_before_amount: symbol_before,
            date_format: date_format.to_string(),
        }
    }

    #[test]
    fn test_price_formatting() {
        let after = DisplayFormat::new(&settings(false, "%d/%m/%Y"), None);
        assert_eq!(after.price(&Price::from_minor(2550)), "25.50 EGP");

        let before = DisplayFormat::new(&settings(true, "%d/%m/%Y"), None);
        assert_eq!(before.price(&Price::from_minor(700)), "$7.00");
    }

    #[test]
    fn test_date_formatting() {
        let format = DisplayFormat::new(&settings(false, "%Y-%m-%d"), None);
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 14, 30, 0).unwrap();
        assert_eq!(format.date(&at), "2026-05-01");
        assert_eq!(format.date_time(&at), "2026-05-01 14:30");
    }

    #[test]
    fn test_invalid_date_format_falls_back() {
        let format = DisplayFormat::new(&settings(false, "%Q %"), None);
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(format.date(&at), "01/05/2026");
    }

    #[test]
    fn test_image_urls() {
        let format =
            DisplayFormat::new(&DisplaySettings::default(), Some("https://cdn.souq.example/"));
        assert_eq!(
            format.image(Some("products/milk.jpg")).as_deref(),
            Some("https://cdn.souq.example/products/milk.jpg")
        );
        assert_eq!(
            format.image(Some("/avatars/1.png")).as_deref(),
            Some("https://cdn.souq.example/avatars/1.png")
        );
        assert_eq!(
            format.image(Some("https://other.example/a.png")).as_deref(),
            Some("https://other.example/a.png")
        );
        assert_eq!(format.image(Some("  ")), None);
        assert_eq!(format.image(None), None);
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("mona ahmed salem"), "MA");
        assert_eq!(initials("Omar"), "O");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn test_assemble_direction_follows_locale() {
        let visitor = Visitor {
            customer: None,
            locale: Locale::Ar,
        };
        let page = PageContext::assemble(visitor, &SessionContext::default(), None, "/".into());
        assert_eq!(page.dir, "rtl");
        assert_eq!(page.lang, "ar");
        assert_eq!(page.other_locale(), Locale::En);
        assert!(page.user.is_none());

        let visitor = Visitor {
            customer: None,
            locale: Locale::En,
        };
        let page = PageContext::assemble(visitor, &SessionContext::default(), None, "/".into());
        assert_eq!(page.dir, "ltr");
    }

    #[test]
    fn test_assemble_uses_backend_user() {
        let context: SessionContext = serde_json::from_str(
            r#"{
                "user": {"id": 1, "name": "Mona Ahmed", "phone": "0100", "city_id": 7},
                "notifications": {"unread_count": 2, "recent": [
                    {"id": "n1", "title": "Order delivered", "created_at": "2026-05-01T10:00:00Z"}
                ]}
            }"#,
        )
        .unwrap();
        let visitor = Visitor {
            customer: None,
            locale: Locale::En,
        };
        let page = PageContext::assemble(visitor, &context, None, "/orders/3".into());
        let user = page.user.as_ref().unwrap();
        assert_eq!(user.initials, "MA");
        assert_eq!(page.default_city(), Some(CityId::new(7)));
        assert_eq!(page.unread_notifications, 2);
        assert!(page.notifications[0].unread);
        assert!(page.is_active("/orders"));
        assert!(!page.is_active("/"));
    }
}
