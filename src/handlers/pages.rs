//! List / create / delete page handlers.
//!
//! Storage errors at this boundary become flash notices plus a safe degraded
//! render; the list and form pages never answer 5xx.

use std::collections::BTreeMap;

use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use sqlx::AnyConnection;
use tracing::{error, info, warn};

use crate::db::contacts;
use crate::error::RolodexError;
use crate::middleware::flash::{Flash, FlashLevel, push_flash, take_flash};
use crate::render;
use crate::router::RolodexState;
use crate::validate::validate_contact;

fn storage_notice(err: &RolodexError) -> &'static str {
    match err {
        RolodexError::Database(
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_),
        ) => "Database connection timeout. The page will retry automatically.",
        _ => "An unexpected error occurred. Please try refreshing the page.",
    }
}

pub async fn homepage(
    State(state): State<RolodexState>,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    let (jar, mut flashes) = take_flash(jar);
    let contacts = match state
        .db
        .with_session(|conn: &mut AnyConnection| Box::pin(async move { contacts::list_all(conn).await }))
        .await
    {
        Ok(list) => list,
        Err(err) => {
            error!(error = %err, "database error while listing contacts");
            flashes.push(Flash {
                level: FlashLevel::Error,
                message: storage_notice(&err).to_string(),
            });
            Vec::new()
        }
    };
    (jar, Html(render::list_page(&contacts, &flashes)))
}

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

pub async fn create_contact_form(jar: PrivateCookieJar) -> impl IntoResponse {
    let (jar, flashes) = take_flash(jar);
    (jar, Html(render::form_page("", "", &BTreeMap::new(), &flashes)))
}

pub async fn create_contact_submit(
    State(state): State<RolodexState>,
    jar: PrivateCookieJar,
    Form(form): Form<ContactForm>,
) -> Response {
    let name = form.name.trim().to_string();
    let address = form.address.trim().to_string();

    let errors = validate_contact(&name, &address);
    if !errors.is_empty() {
        return Html(render::form_page(&name, &address, &errors, &[])).into_response();
    }

    let (insert_name, insert_address) = (name.clone(), address.clone());
    let saved = state
        .db
        .with_session(move |conn: &mut AnyConnection| {
            Box::pin(async move { contacts::insert(conn, &insert_name, &insert_address).await })
        })
        .await;

    match saved {
        Ok(id) => {
            info!(id, name = %name, "contact created");
            let jar = push_flash(jar, FlashLevel::Success, "Contact created successfully!");
            (jar, Redirect::to("/")).into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to save contact");
            let flashes = vec![Flash {
                level: FlashLevel::Error,
                message: format!("Error saving contact: {err}"),
            }];
            Html(render::form_page(&name, &address, &BTreeMap::new(), &flashes)).into_response()
        }
    }
}

pub async fn delete_contact(
    State(state): State<RolodexState>,
    Path(contact_id): Path<i64>,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    let outcome = state
        .db
        .with_session(move |conn: &mut AnyConnection| {
            Box::pin(async move {
                match contacts::get_by_id(conn, contact_id).await? {
                    Some(contact) => {
                        contacts::delete_by_id(conn, contact_id).await?;
                        Ok(Some(contact.name))
                    }
                    None => Ok(None),
                }
            })
        })
        .await;

    let jar = match outcome {
        Ok(Some(name)) => {
            info!(id = contact_id, name = %name, "contact deleted");
            push_flash(jar, FlashLevel::Success, "Contact deleted successfully!")
        }
        Ok(None) => {
            warn!(id = contact_id, "contact not found");
            push_flash(jar, FlashLevel::Error, "Contact not found!")
        }
        Err(err) => {
            error!(id = contact_id, error = %err, "database error during deletion");
            push_flash(jar, FlashLevel::Error, format!("Error deleting contact: {err}"))
        }
    };
    (jar, Redirect::to("/"))
}
