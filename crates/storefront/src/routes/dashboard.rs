//! Customer dashboard: the landing page.
//!
//! Sections that fail to load are left out; the page itself always renders.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use souq_core::UpgradeRole;

use crate::backend::BackendError;
use crate::context::{PageContext, set_flash};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, RequireCustomer};
use crate::routes::categories::CategoryCardView;
use crate::routes::orders::OrderRowView;
use crate::routes::products::ProductCardView;
use crate::services::roles::{DriverApplicationView, UpgradeAction};
use crate::state::AppState;

/// Featured products shown on the dashboard.
const FEATURED_PRODUCTS: u32 = 8;

/// Categories in the strip.
const CATEGORY_STRIP: usize = 10;

/// Recent orders listed.
const RECENT_ORDERS: u32 = 5;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub greeting: String,
    pub featured: Vec<ProductCardView>,
    pub categories: Vec<CategoryCardView>,
    pub recent_orders: Vec<OrderRowView>,
    /// Role upgrade panel, for signed-in customers.
    pub driver: Option<DriverApplicationView>,
}

/// Role upgrade form data.
#[derive(Debug, Deserialize)]
pub struct UpgradeRoleForm {
    pub role: UpgradeRole,
}

fn greeting(page: &PageContext) -> String {
    page.user.as_ref().map_or_else(
        || "Welcome to Souq".to_string(),
        |user| {
            let first = user.name.split_whitespace().next().unwrap_or(&user.name);
            format!("Welcome back, {first}")
        },
    )
}

/// Log a failed section and leave it empty.
fn or_empty<T>(section: &str, result: std::result::Result<Vec<T>, BackendError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, section, "Dashboard section failed to load");
        Vec::new()
    })
}

/// Display the dashboard.
#[instrument(skip(state, page, nonce))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let caller = page.caller();
    let market = state.market();
    let featured_query = [
        ("featured", "1".to_string()),
        ("per_page", FEATURED_PRODUCTS.to_string()),
    ];

    let (featured, categories) = tokio::join!(
        market.products(&caller, &featured_query),
        market.categories(&caller),
    );
    let featured = or_empty("featured", featured.map(|page| page.data));
    let mut categories = or_empty("categories", categories);
    categories.truncate(CATEGORY_STRIP);

    let (recent_orders, driver) = if page.is_authenticated() {
        let (orders, application) = tokio::join!(
            market.recent_orders(&caller, RECENT_ORDERS),
            market.driver_application(&caller),
        );
        let driver = application.map_or_else(
            |e| {
                tracing::error!(error = %e, "Driver application failed to load");
                None
            },
            |application| Some(DriverApplicationView::from(application.as_ref())),
        );
        (or_empty("recent_orders", orders), driver)
    } else {
        (Vec::new(), None)
    };

    DashboardTemplate {
        greeting: greeting(&page),
        featured: ProductCardView::list(&featured, &page),
        categories: CategoryCardView::list(&categories, &page.format),
        recent_orders: recent_orders
            .iter()
            .map(|order| OrderRowView::new(order, &page.format))
            .collect(),
        driver,
        page,
        nonce,
    }
}

/// Ask for a role upgrade.
///
/// A driver upgrade goes to the application page; a store upgrade is sent
/// straight to the backend and the outcome flashed on the dashboard.
#[instrument(skip(state, session, page, customer), fields(customer_id = %customer.id))]
pub async fn upgrade_role(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    page: PageContext,
    Form(form): Form<UpgradeRoleForm>,
) -> Result<Redirect> {
    match UpgradeAction::for_role(form.role) {
        UpgradeAction::Navigate(path) => Ok(Redirect::to(path)),
        UpgradeAction::Submit(request) => {
            let message = match state.market().request_role_upgrade(&page.caller(), request).await {
                Ok(response) => {
                    add_breadcrumb("roles", "Requested role upgrade", Some(&[("role", form.role.as_str())]));
                    response
                        .message
                        .unwrap_or_else(|| "Your upgrade request was sent.".to_string())
                }
                Err(err @ BackendError::Rejected(_)) => err.user_message(),
                Err(err) => return Err(AppError::from(err)),
            };
            set_flash(&session, message).await;
            Ok(Redirect::to("/"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::SessionContext;
    use crate::context::Visitor;
    use souq_core::Locale;

    fn page(user_json: Option<&str>) -> PageContext {
        let mut context = SessionContext::default();
        context.user = user_json.map(|json| serde_json::from_str(json).unwrap());
        PageContext::assemble(
            Visitor {
                customer: None,
                locale: Locale::En,
            },
            &context,
            None,
            "/".to_string(),
        )
    }

    #[test]
    fn test_greeting_uses_first_name() {
        let page = page(Some(r#"{"id": 1, "name": "Mona Adel", "phone": "01012345678"}"#));
        assert_eq!(greeting(&page), "Welcome back, Mona");
    }

    #[test]
    fn test_guest_greeting() {
        assert_eq!(greeting(&page(None)), "Welcome to Souq");
    }

    #[test]
    fn test_upgrade_form_role() {
        let form: UpgradeRoleForm = serde_json::from_str(r#"{"role": "store"}"#).unwrap();
        assert_eq!(form.role, UpgradeRole::Store);
    }
}
