//! View renderer seam for the HTML pages (login, index, model listing).
//!
//! The actual templating engine is a collaborator, not part of this crate:
//! implement [`ViewRenderer`] to plug one in. [`BasicViews`] ships a minimal
//! dependency-free rendering so the panel works out of the box.

use crate::error::PanelError;
use crate::panel::PanelRoute;
use axum::response::Html;

/// Arguments handed to every view.
#[derive(Clone, Debug, Default)]
pub struct ViewArgs {
    pub title: String,
    pub main_url: String,
    pub logout_url: Option<String>,
    pub auth_method: Option<String>,
    pub admin_routes: Vec<PanelRoute>,
}

pub trait ViewRenderer: Send + Sync {
    /// Render a named view ("login", "index", "model") with its arguments.
    fn view(&self, name: &str, args: &ViewArgs) -> Result<Html<String>, PanelError>;
}

/// Built-in minimal renderer.
pub struct BasicViews;

impl ViewRenderer for BasicViews {
    fn view(&self, name: &str, args: &ViewArgs) -> Result<Html<String>, PanelError> {
        let body = match name {
            "login" => login_page(args),
            "index" => index_page(args),
            "model" => model_page(args),
            other => {
                return Err(PanelError::Internal(format!("unknown view: {}", other)));
            }
        };
        Ok(Html(page(&args.title, &body)))
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>{}</body></html>",
        escape(title),
        body
    )
}

fn login_page(args: &ViewArgs) -> String {
    let method = args.auth_method.as_deref().unwrap_or("BasicAuth");
    format!(
        "<h1>{}</h1>\n<form method=\"post\" action=\"{}/login\">\
         <input type=\"hidden\" name=\"auth_method\" value=\"{}\">\
         <label>Username <input name=\"username\"></label>\
         <label>Password <input name=\"password\" type=\"password\"></label>\
         <button type=\"submit\">Sign in</button></form>",
        escape(&args.title),
        args.main_url,
        escape(method)
    )
}

fn index_page(args: &ViewArgs) -> String {
    let mut items = String::new();
    for r in &args.admin_routes {
        items.push_str(&format!(
            "<li><a href=\"{}\" data-icon=\"{}\">{}</a></li>\n",
            r.path,
            escape(&r.icon),
            escape(&r.title)
        ));
    }
    let logout = args
        .logout_url
        .as_deref()
        .map(|u| format!("<a href=\"{}\">Logout</a>", u))
        .unwrap_or_default();
    format!(
        "<h1>{}</h1>\n<ul>\n{}</ul>\n{}",
        escape(&args.title),
        items,
        logout
    )
}

fn model_page(args: &ViewArgs) -> String {
    let logout = args
        .logout_url
        .as_deref()
        .map(|u| format!("<a href=\"{}\">Logout</a>", u))
        .unwrap_or_default();
    format!(
        "<h1>{}</h1>\n<div id=\"listing\" data-source=\"?format=json\"></div>\n<a href=\"{}\">Back</a> {}",
        escape(&args.title),
        args.main_url,
        logout
    )
}

/// Naive English pluralization for listing titles ("Client" -> "Clients",
/// "Category" -> "Categories").
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.ends_with('y')
        && !lower.ends_with("ay")
        && !lower.ends_with("ey")
        && !lower.ends_with("oy")
        && !lower.ends_with("uy")
    {
        format!("{}ies", &word[..word.len() - 1])
    } else if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
