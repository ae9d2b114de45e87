//! Minimal server-side page rendering: inline markup, no template engine.

use std::collections::BTreeMap;

use crate::db::Contact;
use crate::middleware::flash::Flash;

/// HTML-escape text interpolated into markup or attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    let mut notices = String::new();
    for flash in flashes {
        notices.push_str(&format!(
            "<div class=\"flash {}\">{}</div>\n",
            flash.level.css_class(),
            escape(&flash.message)
        ));
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{notices}{body}</body>\n</html>\n",
        title = escape(title),
    )
}

pub fn list_page(contacts: &[Contact], flashes: &[Flash]) -> String {
    let mut body = String::from("<h1>Simple Contacts</h1>\n");
    body.push_str("<p><a href=\"/create-contact\">Create New Contact</a></p>\n");
    if contacts.is_empty() {
        body.push_str("<p>No contacts found. Create your first contact!</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Name</th><th>Address</th><th></th></tr>\n");
        for contact in contacts {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>\
                 <form method=\"post\" action=\"/delete-contact/{}\">\
                 <button type=\"submit\">Delete</button></form>\
                 </td></tr>\n",
                escape(&contact.name),
                escape(&contact.address),
                contact.id,
            ));
        }
        body.push_str("</table>\n");
    }
    layout("Simple Contacts", flashes, &body)
}

pub fn form_page(
    name: &str,
    address: &str,
    errors: &BTreeMap<&'static str, &'static str>,
    flashes: &[Flash],
) -> String {
    let field_error = |field: &str| {
        errors
            .get(field)
            .map(|msg| format!("<p class=\"field-error\">{}</p>\n", escape(msg)))
            .unwrap_or_default()
    };
    let body = format!(
        "<h1>Create New Contact</h1>\n\
         <form method=\"post\" action=\"/create-contact\">\n\
         <label>Name <input type=\"text\" name=\"name\" value=\"{name}\"></label>\n\
         {name_error}\
         <label>Address <input type=\"text\" name=\"address\" value=\"{address}\"></label>\n\
         {address_error}\
         <button type=\"submit\">Save</button>\n\
         <a href=\"/\">Cancel</a>\n\
         </form>\n",
        name = escape(name),
        address = escape(address),
        name_error = field_error("name"),
        address_error = field_error("address"),
    );
    layout("Create New Contact", flashes, &body)
}
