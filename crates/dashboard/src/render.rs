//! HTML rendering for the dashboard and login pages.

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

/// Template name for the dashboard page.
pub const INDEX_TEMPLATE: &str = "index";

/// Template name for the login page.
pub const LOGIN_TEMPLATE: &str = "login";

const INDEX_SOURCE: &str = include_str!("../templates/index.hbs");
const LOGIN_SOURCE: &str = include_str!("../templates/login.hbs");

/// Errors from template setup or rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A template failed to parse.
    #[error("Template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    /// Rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Format a dollar amount with thousands separators, e.g. `$1,234.56`.
#[must_use]
pub fn format_money(amount: f64) -> String {
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Create a Handlebars instance with custom helpers.
fn create_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();

    // Helper: {{money total_unbilled}}
    handlebars.register_helper(
        "money",
        Box::new(
            |h: &handlebars::Helper,
             _: &Handlebars,
             _: &handlebars::Context,
             _: &mut handlebars::RenderContext,
             out: &mut dyn handlebars::Output| {
                let amount = h
                    .param(0)
                    .and_then(|v| v.value().as_f64())
                    .unwrap_or(0.0);
                out.write(&format_money(amount))?;
                Ok(())
            },
        ),
    );

    // Helper: {{ips ../resource_ips id}}
    handlebars.register_helper(
        "ips",
        Box::new(
            |h: &handlebars::Helper,
             _: &Handlebars,
             _: &handlebars::Context,
             _: &mut handlebars::RenderContext,
             out: &mut dyn handlebars::Output| {
                let id = h.param(1).map(|v| match v.value() {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
                let list = h
                    .param(0)
                    .zip(id)
                    .and_then(|(map, id)| map.value().get(&id).cloned())
                    .and_then(|v| v.as_array().cloned());

                let text = match list {
                    Some(addresses) => addresses
                        .iter()
                        .filter_map(|a| a.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    None => "unavailable".to_string(),
                };
                out.write(&handlebars::html_escape(&text))?;
                Ok(())
            },
        ),
    );

    handlebars
}

/// Renders the dashboard and login templates.
pub struct Renderer {
    handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    /// Parse the embedded templates.
    ///
    /// # Errors
    /// Returns an error if a template does not parse.
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = create_handlebars();
        handlebars
            .register_template_string(INDEX_TEMPLATE, INDEX_SOURCE)
            .map_err(Box::new)?;
        handlebars
            .register_template_string(LOGIN_TEMPLATE, LOGIN_SOURCE)
            .map_err(Box::new)?;
        Ok(Self { handlebars })
    }

    /// Render the dashboard for `data`.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn dashboard<T: Serialize>(&self, data: &T) -> Result<String, RenderError> {
        Ok(self.handlebars.render(INDEX_TEMPLATE, data)?)
    }

    /// Render the login form.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn login(&self) -> Result<String, RenderError> {
        Ok(self
            .handlebars
            .render(LOGIN_TEMPLATE, &serde_json::json!({}))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DashboardAggregate;
    use crate::fetcher::{AccountResult, FetchError};
    use crate::testing::{instance, invoice};

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(5.5), "$5.50");
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_money(-42.1), "-$42.10");
        assert_eq!(format_money(-0.001), "$0.00");
    }

    #[test]
    fn test_login_page_has_form() {
        let page = Renderer::new().unwrap().login().unwrap();
        assert!(page.contains(r#"action="/login""#));
        assert!(page.contains(r#"name="passcode""#));
    }

    #[test]
    fn test_dashboard_shows_totals_ips_and_errors() {
        let mut ok = AccountResult::new("Prod <main>");
        ok.unbilled_amount = 12.0;
        ok.resources = vec![instance(1, "web-1"), instance(2, "db-1")];
        ok.resource_ips
            .insert(1, vec!["203.0.113.1".to_string(), "2600:3c00::1".to_string()]);
        ok.latest_invoice = Some(invoice(7, 1500.0));

        let failed = AccountResult::failed(
            "Staging",
            FetchError::AccountInfo("API error: 401 - Invalid Token".to_string()),
        );

        let data = DashboardAggregate::from_accounts(vec![ok, failed]);
        let page = Renderer::new().unwrap().dashboard(&data).unwrap();

        assert!(page.contains("Prod &lt;main&gt;"));
        assert!(page.contains("$1,500.00"));
        assert!(page.contains("$12.00"));
        assert!(page.contains("203.0.113.1, 2600:3c00::1"));
        assert!(page.contains("unavailable"));
        assert!(page.contains("Error fetching account info: API error: 401 - Invalid Token"));
    }

    #[test]
    fn test_failed_resource_list_still_shows_unbilled() {
        let mut ok = AccountResult::new("Prod");
        ok.unbilled_amount = 1.25;

        let mut partial = AccountResult::failed(
            "Staging",
            FetchError::ResourceList("API error: 500 - Internal".to_string()),
        );
        partial.unbilled_amount = 3.5;

        let data = DashboardAggregate::from_accounts(vec![ok, partial]);
        let page = Renderer::new().unwrap().dashboard(&data).unwrap();

        assert!(page.contains("$4.75"));
        assert!(page.contains("$1.25"));
        assert!(page.contains("$3.50"));
        assert!(page.contains("Error fetching Linodes"));
        assert_eq!(page.matches(r#"<table class="instances">"#).count(), 1);
    }
}
