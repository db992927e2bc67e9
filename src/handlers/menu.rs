use axum::Json;

use crate::entities::menu::MenuCategory;

/// The menu is served by the storefront's content backend; this API has none
/// of its own to offer.
pub async fn list_menu() -> Json<Vec<MenuCategory>> {
    Json(Vec::new())
}
