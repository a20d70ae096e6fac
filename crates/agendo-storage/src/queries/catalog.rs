// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog lookups: categories, services, resources, and users.
//!
//! Name lookups are case-insensitive partial matches scoped to a
//! branch, so the assistant can pass through whatever the user typed.

use agendo_core::AgendoError;
use chrono::Utc;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{Category, Resource, Service, User};

// --- Categories ---

pub async fn list_categories(db: &Database, branch_id: &str) -> Result<Vec<Category>, AgendoError> {
    let branch_id = branch_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, branch_id, name, description, display_order
                 FROM categories WHERE branch_id = ?1
                 ORDER BY display_order ASC, name ASC",
            )?;
            let rows = stmt.query_map(params![branch_id], row_to_category)?;
            let mut categories = Vec::new();
            for row in rows {
                categories.push(row?);
            }
            Ok(categories)
        })
        .await
        .map_err(map_tr_err)
}

// --- Services ---

pub async fn get_service(db: &Database, id: &str) -> Result<Option<Service>, AgendoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("{SERVICE_SELECT} WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_service);
            match result {
                Ok(service) => Ok(Some(service)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_services(db: &Database, branch_id: &str) -> Result<Vec<Service>, AgendoError> {
    let branch_id = branch_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SERVICE_SELECT} WHERE branch_id = ?1 AND is_active = 1 ORDER BY name ASC"
            ))?;
            let rows = stmt.query_map(params![branch_id], row_to_service)?;
            let mut services = Vec::new();
            for row in rows {
                services.push(row?);
            }
            Ok(services)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_services_in_category(
    db: &Database,
    category_id: &str,
) -> Result<Vec<Service>, AgendoError> {
    let category_id = category_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SERVICE_SELECT} WHERE category_id = ?1 AND is_active = 1 ORDER BY name ASC"
            ))?;
            let rows = stmt.query_map(params![category_id], row_to_service)?;
            let mut services = Vec::new();
            for row in rows {
                services.push(row?);
            }
            Ok(services)
        })
        .await
        .map_err(map_tr_err)
}

/// Case-insensitive partial name match within a branch.
pub async fn find_service_by_name(
    db: &Database,
    branch_id: &str,
    name: &str,
) -> Result<Option<Service>, AgendoError> {
    let branch_id = branch_id.to_string();
    let pattern = format!("%{}%", name.to_lowercase());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SERVICE_SELECT}
                 WHERE branch_id = ?1 AND is_active = 1 AND LOWER(name) LIKE ?2
                 ORDER BY name ASC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![branch_id, pattern], row_to_service);
            match result {
                Ok(service) => Ok(Some(service)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

// --- Resources ---

pub async fn get_resource(db: &Database, id: &str) -> Result<Option<Resource>, AgendoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("{RESOURCE_SELECT} WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_resource);
            match result {
                Ok(resource) => Ok(Some(resource)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_resources(db: &Database, branch_id: &str) -> Result<Vec<Resource>, AgendoError> {
    let branch_id = branch_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{RESOURCE_SELECT} WHERE branch_id = ?1 AND is_active = 1 ORDER BY name ASC"
            ))?;
            let rows = stmt.query_map(params![branch_id], row_to_resource)?;
            let mut resources = Vec::new();
            for row in rows {
                resources.push(row?);
            }
            Ok(resources)
        })
        .await
        .map_err(map_tr_err)
}

/// Resources that serve a given service, via the join table.
pub async fn list_resources_for_service(
    db: &Database,
    service_id: &str,
) -> Result<Vec<Resource>, AgendoError> {
    let service_id = service_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.branch_id, r.name, r.external_calendar_id,
                        r.default_start, r.default_end, r.is_active
                 FROM resources r
                 JOIN resource_services rs ON r.id = rs.resource_id
                 WHERE rs.service_id = ?1 AND r.is_active = 1
                 ORDER BY r.name ASC",
            )?;
            let rows = stmt.query_map(params![service_id], row_to_resource)?;
            let mut resources = Vec::new();
            for row in rows {
                resources.push(row?);
            }
            Ok(resources)
        })
        .await
        .map_err(map_tr_err)
}

/// Case-insensitive partial name match within a branch.
pub async fn find_resource_by_name(
    db: &Database,
    branch_id: &str,
    name: &str,
) -> Result<Option<Resource>, AgendoError> {
    let branch_id = branch_id.to_string();
    let pattern = format!("%{}%", name.to_lowercase());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{RESOURCE_SELECT}
                 WHERE branch_id = ?1 AND is_active = 1 AND LOWER(name) LIKE ?2
                 ORDER BY name ASC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![branch_id, pattern], row_to_resource);
            match result {
                Ok(resource) => Ok(Some(resource)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

// --- Users ---

pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, AgendoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("{USER_SELECT} WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn find_user_by_phone(
    db: &Database,
    business_id: &str,
    phone: &str,
) -> Result<Option<User>, AgendoError> {
    let business_id = business_id.to_string();
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{USER_SELECT} WHERE business_id = ?1 AND phone_number = ?2 LIMIT 1"
            ))?;
            let result = stmt.query_row(params![business_id, phone], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn find_user_by_identification(
    db: &Database,
    business_id: &str,
    identification: &str,
) -> Result<Option<User>, AgendoError> {
    let business_id = business_id.to_string();
    let identification = identification.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{USER_SELECT} WHERE business_id = ?1 AND identification_number = ?2"
            ))?;
            let result = stmt.query_row(params![business_id, identification], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_user(db: &Database, user: &User) -> Result<(), AgendoError> {
    let user = user.clone();
    let now = Utc::now().naive_utc();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, business_id, phone_number, identification_number,
                                    full_name, email, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.id,
                    user.business_id,
                    user.phone_number,
                    user.identification_number,
                    user.full_name,
                    user.email,
                    now,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_category(db: &Database, category: &Category) -> Result<(), AgendoError> {
    let c = category.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO categories (id, branch_id, name, description, display_order)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![c.id, c.branch_id, c.name, c.description, c.display_order],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_service(db: &Database, service: &Service) -> Result<(), AgendoError> {
    let s = service.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO services (id, branch_id, category_id, name, description,
                                       price, duration_minutes, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    s.id,
                    s.branch_id,
                    s.category_id,
                    s.name,
                    s.description,
                    s.price,
                    s.duration_minutes,
                    s.is_active,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_resource(db: &Database, resource: &Resource) -> Result<(), AgendoError> {
    let r = resource.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO resources (id, branch_id, name, external_calendar_id,
                                        default_start, default_end, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    r.id,
                    r.branch_id,
                    r.name,
                    r.external_calendar_id,
                    r.default_start,
                    r.default_end,
                    r.is_active,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Links a resource to a service it can perform.
pub async fn link_resource_service(
    db: &Database,
    resource_id: &str,
    service_id: &str,
) -> Result<(), AgendoError> {
    let resource_id = resource_id.to_string();
    let service_id = service_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO resource_services (resource_id, service_id)
                 VALUES (?1, ?2)",
                params![resource_id, service_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

const SERVICE_SELECT: &str = "SELECT id, branch_id, category_id, name, description, price, \
                              duration_minutes, is_active FROM services";

const RESOURCE_SELECT: &str = "SELECT id, branch_id, name, external_calendar_id, default_start, \
                               default_end, is_active FROM resources";

const USER_SELECT: &str = "SELECT id, business_id, phone_number, identification_number, \
                           full_name, email FROM users";

fn row_to_category(row: &rusqlite::Row<'_>) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        branch_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        display_order: row.get(4)?,
    })
}

fn row_to_service(row: &rusqlite::Row<'_>) -> Result<Service, rusqlite::Error> {
    Ok(Service {
        id: row.get(0)?,
        branch_id: row.get(1)?,
        category_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        price: row.get(5)?,
        duration_minutes: row.get(6)?,
        is_active: row.get(7)?,
    })
}

fn row_to_resource(row: &rusqlite::Row<'_>) -> Result<Resource, rusqlite::Error> {
    Ok(Resource {
        id: row.get(0)?,
        branch_id: row.get(1)?,
        name: row.get(2)?,
        external_calendar_id: row.get(3)?,
        default_start: row.get(4)?,
        default_end: row.get(5)?,
        is_active: row.get(6)?,
    })
}

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        business_id: row.get(1)?,
        phone_number: row.get(2)?,
        identification_number: row.get(3)?,
        full_name: row.get(4)?,
        email: row.get(5)?,
    })
}
