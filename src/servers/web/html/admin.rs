//! Admin console pages. English only.

use std::collections::HashMap;
use std::fmt::Write;

use super::{document, Esc, Render, Shell};
use crate::database::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    TextArea,
    Checkbox,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Arabic input, rendered right-to-left.
    pub rtl: bool,
    /// Not offered when creating a row.
    pub edit_only: bool,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind, required: bool) -> Field {
    Field {
        name,
        label,
        kind,
        required,
        rtl: false,
        edit_only: false,
    }
}

const fn rtl(mut f: Field) -> Field {
    f.rtl = true;
    f
}

const fn edit_only(mut f: Field) -> Field {
    f.edit_only = true;
    f
}

pub const DESTINATION_FIELDS: &[Field] = &[
    field("name_en", "Name (English)", FieldKind::Text, true),
    rtl(field("name_ar", "Name (Arabic)", FieldKind::Text, true)),
    field("days", "Days", FieldKind::Text, true),
    field("nights", "Nights", FieldKind::Text, true),
    field("people", "People", FieldKind::Text, true),
    field("price", "Price", FieldKind::Text, true),
    field("image", "Image URL", FieldKind::Text, true),
    field("display_order", "Display Order", FieldKind::Number, false),
    edit_only(field("active", "Active", FieldKind::Checkbox, false)),
];

pub const PACKAGE_FIELDS: &[Field] = &[
    field("name_en", "Name (English)", FieldKind::Text, true),
    rtl(field("name_ar", "Name (Arabic)", FieldKind::Text, true)),
    field("description_en", "Description (English)", FieldKind::TextArea, false),
    rtl(field("description_ar", "Description (Arabic)", FieldKind::TextArea, false)),
    field("days", "Days", FieldKind::Text, false),
    field("nights", "Nights", FieldKind::Text, false),
    field("price", "Price", FieldKind::Text, true),
    field("image", "Image URL", FieldKind::Text, false),
    field("display_order", "Display Order", FieldKind::Number, false),
    field("active", "Active", FieldKind::Checkbox, false),
];

pub fn fields_for(collection: Collection) -> &'static [Field] {
    match collection {
        Collection::Destinations => DESTINATION_FIELDS,
        Collection::Packages => PACKAGE_FIELDS,
    }
}

/// One line of a collection table.
#[derive(Debug, Clone)]
pub struct ListRow {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    pub duration: String,
    pub price: String,
    pub active: bool,
    pub display_order: i32,
}

fn shell(title: &str) -> Shell<'_> {
    Shell {
        lang: "en",
        dir: "ltr",
        title,
        description: "",
        body_class: "admin",
    }
}

/// Console chrome around `content`.
fn layout(title: &str, current: Option<Collection>, content: &str) -> Render {
    let mut body = String::with_capacity(content.len() + 1024);
    body.push_str(r#"<header class="admin-nav"><span class="brand">Holiday Travel Admin</span><nav>"#);
    for collection in [Collection::Destinations, Collection::Packages] {
        let class = if current == Some(collection) { " class=\"current\"" } else { "" };
        let label = match collection {
            Collection::Destinations => "Destinations",
            Collection::Packages => "Packages",
        };
        write!(body, r#"<a href="/admin/{}"{class}>{label}</a>"#, collection.slug())?;
    }
    write!(
        body,
        r#"<form method="post" action="/admin/logout"><button type="submit" class="link">Logout</button></form>
</nav></header>
<main class="admin-main">
{content}
</main>"#
    )?;
    document(&shell(title), &body)
}

pub fn login_page(username: &str, error: Option<&str>) -> Render {
    let mut body = String::new();
    body.push_str(
        r#"<main class="login"><form class="login-card" method="post" action="/admin/login">
<h1>Admin Login</h1>
"#,
    );
    if let Some(error) = error {
        writeln!(body, r#"<p class="notice notice-error" role="alert">{}</p>"#, Esc(error))?;
    }
    write!(
        body,
        r#"<label>Username <input type="text" name="username" value="{}" autocomplete="username" required></label>
<label>Password <input type="password" name="password" autocomplete="current-password" required></label>
<button class="btn btn-primary" type="submit">Sign in</button>
</form></main>"#,
        Esc(username),
    )?;
    document(&shell("Admin Login"), &body)
}

pub fn list_page(collection: Collection, rows: &[ListRow]) -> Render {
    let heading = match collection {
        Collection::Destinations => "Destinations",
        Collection::Packages => "Packages",
    };
    let slug = collection.slug();
    let mut content = String::new();
    write!(
        content,
        r#"<div class="admin-head"><h1>{heading}</h1><a class="btn btn-primary" href="/admin/{slug}/new">Add {}</a></div>
"#,
        collection.title(),
    )?;

    if rows.is_empty() {
        writeln!(content, r#"<p class="empty">No {slug} yet.</p>"#)?;
        return layout(heading, Some(collection), &content);
    }

    content.push_str(
        r#"<table class="admin-table">
<thead><tr><th>Name</th><th>Duration</th><th>Price</th><th>Order</th><th>Status</th><th>Actions</th></tr></thead>
<tbody>
"#,
    );
    for row in rows {
        let id = Esc(&row.id);
        let (status, toggle) = if row.active {
            ("Active", "Hide")
        } else {
            ("Hidden", "Show")
        };
        write!(
            content,
            r#"<tr class="{}">
<td><strong>{}</strong><br><span dir="rtl">{}</span></td>
<td>{}</td>
<td>{}</td>
<td>{}</td>
<td><span class="badge badge-{}">{status}</span></td>
<td class="actions">
<a href="/admin/{slug}/{id}/edit">Edit</a>
<form method="post" action="/admin/{slug}/{id}/toggle"><button type="submit" class="link">{toggle}</button></form>
<form method="post" action="/admin/{slug}/{id}/delete" onsubmit="return confirm('Are you sure you want to delete this {collection}?')"><button type="submit" class="link danger">Delete</button></form>
</td>
</tr>
"#,
            if row.active { "active" } else { "hidden" },
            Esc(&row.name_en),
            Esc(&row.name_ar),
            Esc(&row.duration),
            Esc(&row.price),
            row.display_order,
            status.to_ascii_lowercase(),
        )?;
    }
    content.push_str("</tbody></table>\n");
    layout(heading, Some(collection), &content)
}

/// Create form when `id` is `None`, edit form otherwise.
pub fn form_page(
    collection: Collection,
    id: Option<&str>,
    values: &HashMap<String, String>,
    error: Option<&str>,
) -> Render {
    let slug = collection.slug();
    let title = match id {
        Some(_) => format!("Edit {}", collection.title()),
        None => format!("Add {}", collection.title()),
    };
    let action = match id {
        Some(id) => format!("/admin/{slug}/{id}"),
        None => format!("/admin/{slug}"),
    };

    let mut content = String::new();
    writeln!(content, "<h1>{}</h1>", Esc(&title))?;
    if let Some(error) = error {
        writeln!(content, r#"<p class="notice notice-error" role="alert">{}</p>"#, Esc(error))?;
    }
    writeln!(content, r#"<form class="admin-form" method="post" action="{}">"#, Esc(&action))?;

    for f in fields_for(collection) {
        if f.edit_only && id.is_none() {
            continue;
        }
        let value = values.get(f.name).map(String::as_str).unwrap_or("");
        let required = if f.required { " required" } else { "" };
        let dir = if f.rtl { r#" dir="rtl""# } else { "" };
        match f.kind {
            FieldKind::Text | FieldKind::Number => {
                let kind = if f.kind == FieldKind::Number { "number" } else { "text" };
                writeln!(
                    content,
                    r#"<label>{} <input type="{kind}" name="{}" value="{}"{dir}{required}></label>"#,
                    f.label,
                    f.name,
                    Esc(value),
                )?;
            }
            FieldKind::TextArea => {
                writeln!(
                    content,
                    r#"<label>{} <textarea name="{}" rows="4"{dir}{required}>{}</textarea></label>"#,
                    f.label,
                    f.name,
                    Esc(value),
                )?;
            }
            FieldKind::Checkbox => {
                let checked = if is_checked(value) { " checked" } else { "" };
                writeln!(
                    content,
                    r#"<label class="checkbox"><input type="checkbox" name="{}" value="on"{checked}> {}</label>"#,
                    f.name,
                    f.label,
                )?;
            }
        }
    }
    write!(
        content,
        r#"<div class="form-actions"><button class="btn btn-primary" type="submit">Save</button> <a href="/admin/{slug}">Cancel</a></div>
</form>"#
    )?;
    layout(&title, Some(collection), &content)
}

/// Checkbox state as it comes back from a form or a stored row.
pub fn is_checked(value: &str) -> bool {
    matches!(value, "on" | "true" | "1")
}

pub fn not_found_page(message: &str) -> Render {
    message_page("Not found", message)
}

/// Shown when the database refused a read or write.
pub fn error_page(message: &str) -> Render {
    message_page("Something went wrong", message)
}

fn message_page(title: &str, message: &str) -> Render {
    let content = format!(
        r#"<h1>{}</h1><p>{}</p><p><a href="/admin">Back to the dashboard</a></p>"#,
        Esc(title),
        Esc(message)
    );
    layout(title, None, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(active: bool) -> ListRow {
        ListRow {
            id: "abc".into(),
            name_en: "Bali".into(),
            name_ar: "بالي".into(),
            duration: "5 days / 4 nights".into(),
            price: "$1,200".into(),
            active,
            display_order: 1,
        }
    }

    #[test]
    fn test_list_actions() {
        let html = list_page(Collection::Destinations, &[row(true), row(false)]).unwrap();
        assert!(html.contains(r#"action="/admin/destinations/abc/toggle""#));
        assert!(html.contains(r#"action="/admin/destinations/abc/delete""#));
        assert!(html.contains(">Hide<"));
        assert!(html.contains(">Show<"));
        assert!(html.contains("badge-hidden"));
    }

    #[test]
    fn test_empty_list() {
        let html = list_page(Collection::Packages, &[]).unwrap();
        assert!(html.contains("No packages yet."));
        assert!(html.contains(r#"href="/admin/packages/new""#));
    }

    #[test]
    fn test_new_destination_form_hides_active() {
        let html = form_page(Collection::Destinations, None, &HashMap::new(), None).unwrap();
        assert!(html.contains(r#"action="/admin/destinations""#));
        assert!(!html.contains(r#"name="active""#));
        assert!(html.contains(r#"name="name_ar" value="" dir="rtl" required"#));
    }

    #[test]
    fn test_edit_form_keeps_values() {
        let mut values = HashMap::new();
        values.insert("name_en".to_string(), "Umrah \"VIP\"".to_string());
        values.insert("active".to_string(), "true".to_string());
        let html = form_page(
            Collection::Packages,
            Some("p1"),
            &values,
            Some("Missing required fields: price"),
        )
        .unwrap();
        assert!(html.contains(r#"action="/admin/packages/p1""#));
        assert!(html.contains("Umrah &quot;VIP&quot;"));
        assert!(html.contains(r#"name="active" value="on" checked"#));
        assert!(html.contains("Missing required fields: price"));
    }

    #[test]
    fn test_login_page_error() {
        let html = login_page("admin<", Some("Invalid credentials")).unwrap();
        assert!(html.contains("Invalid credentials"));
        assert!(html.contains(r#"value="admin&lt;""#));
    }

    #[test]
    fn test_error_page_is_not_a_not_found_page() {
        let html = error_page("Failed to delete package.").unwrap();
        assert!(html.contains("<h1>Something went wrong</h1>"));
        assert!(html.contains("Failed to delete package."));
        assert!(!html.contains("Not found"));
    }
}
