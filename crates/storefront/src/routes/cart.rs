//! Cart route handlers.
//!
//! Plain form posts that redirect back with a flash message. All cart
//! routes require a session in user mode.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bookstore_core::{BookId, CartItemId};

use crate::error::{AppError, Result};
use crate::middleware::{PageContext, RequireShopper, flash_error, flash_success};
use crate::models::Cart;
use crate::routes::views::CartLineView;
use crate::services::{CartError, CartService, CartUpdate};
use crate::state::AppState;

const fn default_quantity() -> i32 {
    1
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub book_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: i32,
    pub quantity: i32,
}

/// Remove line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: i32,
}

/// Cart display data for templates.
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub is_empty: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines.iter().map(CartLineView::from).collect(),
            total: cart.total().to_string(),
            is_empty: cart.is_empty(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
}

/// Flash a shopper-facing cart error; database failures become an error page.
async fn flash_cart_error(session: &Session, err: CartError) -> Result<()> {
    if matches!(err, CartError::Repository(_)) {
        return Err(AppError::Cart(err));
    }
    flash_error(session, err.to_string()).await;
    Ok(())
}

/// Display the cart.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
) -> Result<impl IntoResponse> {
    let cart = CartService::new(state.pool()).get(user.id).await?;

    Ok(CartTemplate {
        ctx: PageContext::load(&session).await,
        cart: CartView::from(&cart),
    })
}

/// Add copies of a book, then return to its page.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let book_id = BookId::new(form.book_id);
    let back = format!("/books/{book_id}");

    match CartService::new(state.pool())
        .add(user.id, book_id, form.quantity)
        .await
    {
        Ok(_) => {
            flash_success(&session, "Book added to cart successfully").await;
            Ok(Redirect::to(&back).into_response())
        }
        Err(CartError::BookNotFound) => {
            flash_error(&session, "Book not found").await;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            flash_cart_error(&session, e).await?;
            Ok(Redirect::to(&back).into_response())
        }
    }
}

/// Set a line's quantity; zero removes it.
#[instrument(skip(state, session, user))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    match CartService::new(state.pool())
        .update(user.id, CartItemId::new(form.item_id), form.quantity)
        .await
    {
        Ok(CartUpdate::Updated) => flash_success(&session, "Cart updated").await,
        Ok(CartUpdate::Removed) => flash_success(&session, "Item removed from cart").await,
        Err(e) => flash_cart_error(&session, e).await?,
    }
    Ok(Redirect::to("/cart").into_response())
}

/// Remove a line.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    match CartService::new(state.pool())
        .remove(user.id, CartItemId::new(form.item_id))
        .await
    {
        Ok(()) => flash_success(&session, "Item removed from cart").await,
        Err(e) => flash_cart_error(&session, e).await?,
    }
    Ok(Redirect::to("/cart").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookstore_core::Price;

    use super::*;
    use crate::models::CartLine;

    #[test]
    fn test_add_form_defaults_quantity() {
        let form: AddToCartForm = serde_json::from_str(r#"{"book_id": 4}"#).unwrap();
        assert_eq!(form.quantity, 1);
    }

    #[test]
    fn test_cart_view_totals() {
        let cart = Cart {
            lines: vec![CartLine {
                id: CartItemId::new(1),
                book_id: BookId::new(2),
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
                cover_image: None,
                price: Price::parse("7.25").unwrap(),
                stock: 1,
                is_active: true,
                quantity: 2,
            }],
        };
        let view = CartView::from(&cart);
        assert_eq!(view.total, "$14.50");
        assert!(!view.is_empty);
        assert!(view.lines.first().unwrap().over_stock);
        assert!(view.lines.first().unwrap().available);
        assert!(CartView::from(&Cart::default()).is_empty);
    }

    #[test]
    fn test_unavailable_line_can_only_be_removed() {
        let cart = Cart {
            lines: vec![CartLine {
                id: CartItemId::new(7),
                book_id: BookId::new(3),
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
                cover_image: None,
                price: Price::parse("7.25").unwrap(),
                stock: 10,
                is_active: false,
                quantity: 1,
            }],
        };
        let html = CartTemplate {
            ctx: PageContext::default(),
            cart: CartView::from(&cart),
        }
        .render()
        .unwrap();

        assert!(html.contains("No longer available"));
        assert!(html.contains("action=\"/cart/remove\""));
        assert!(!html.contains("action=\"/cart/update\""));
        assert!(html.contains("$0.00"));
    }
}
