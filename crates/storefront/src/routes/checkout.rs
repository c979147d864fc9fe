//! Checkout, payment and order confirmation route handlers.
//!
//! ```text
//! GET /checkout  -> review cart, choose payment method and address
//! POST /checkout -> place a pending order, remember it in the session
//! GET /payment   -> payment page for that order
//! POST /payment  -> complete the order, show the confirmation
//! ```

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bookstore_core::{OrderId, PaymentMethod};

use crate::error::{AppError, Result};
use crate::middleware::{PageContext, RequireShopper, flash_error, flash_success};
use crate::models::session::keys;
use crate::routes::cart::CartView;
use crate::routes::views::{OrderItemView, SelectOption, format_date};
use crate::services::{CartService, OrderError, OrderService};
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub shipping_address: String,
}

/// Checkout review template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
    pub payment_methods: Vec<SelectOption>,
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub ctx: PageContext,
    pub order_id: i32,
    pub total: String,
    pub payment_method: String,
    pub shipping_address: String,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "order.html")]
pub struct OrderTemplate {
    pub ctx: PageContext,
    pub order_id: i32,
    pub status: String,
    pub is_pending: bool,
    pub total: String,
    pub payment_method: String,
    pub shipping_address: String,
    pub created_at: String,
    pub items: Vec<OrderItemView>,
}

fn payment_options() -> Vec<SelectOption> {
    PaymentMethod::ALL
        .into_iter()
        .enumerate()
        .map(|(i, m)| SelectOption {
            value: m.as_str(),
            label: m.label(),
            selected: i == 0,
        })
        .collect()
}

/// Review the cart before placing the order.
#[instrument(skip(state, session, user))]
pub async fn review(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
) -> Result<Response> {
    let cart = CartService::new(state.pool()).get(user.id).await?;

    if cart.is_empty() {
        flash_error(&session, "Your cart is empty").await;
        return Ok(Redirect::to("/cart").into_response());
    }
    if let Some(line) = cart.first_unavailable() {
        flash_error(&session, format!("{} is no longer available", line.title)).await;
        return Ok(Redirect::to("/cart").into_response());
    }
    if let Some(line) = cart.first_over_stock() {
        flash_error(&session, format!("Not enough stock for {}", line.title)).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    Ok(CheckoutTemplate {
        ctx: PageContext::load(&session).await,
        cart: CartView::from(&cart),
        payment_methods: payment_options(),
    }
    .into_response())
}

/// Place the order and move on to payment.
#[instrument(skip(state, session, user, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let Ok(payment_method) = form.payment_method.parse::<PaymentMethod>() else {
        flash_error(&session, "Please select a payment method").await;
        return Ok(Redirect::to("/checkout").into_response());
    };

    let result = OrderService::new(state.pool())
        .place_order(user.id, payment_method, &form.shipping_address)
        .await;

    match result {
        Ok(order) => {
            session.insert(keys::PENDING_ORDER_ID, order.id).await?;
            Ok(Redirect::to("/payment").into_response())
        }
        Err(OrderError::MissingShippingAddress) => {
            flash_error(&session, OrderError::MissingShippingAddress.to_string()).await;
            Ok(Redirect::to("/checkout").into_response())
        }
        Err(OrderError::Checkout(e)) => {
            tracing::info!(error = %e, "Checkout rejected");
            flash_error(&session, e.to_string()).await;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn pending_order_id(session: &Session) -> Option<OrderId> {
    session
        .get::<OrderId>(keys::PENDING_ORDER_ID)
        .await
        .ok()
        .flatten()
}

/// Show the payment page for the order placed at checkout.
#[instrument(skip(state, session, user))]
pub async fn payment_page(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
) -> Result<Response> {
    let Some(order_id) = pending_order_id(&session).await else {
        return Ok(Redirect::to("/").into_response());
    };

    let order = match OrderService::new(state.pool())
        .pending_for_user(order_id, user.id)
        .await
    {
        Ok(order) => order,
        Err(OrderError::NotFound) => {
            session.remove::<OrderId>(keys::PENDING_ORDER_ID).await?;
            return Ok(Redirect::to("/").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(PaymentTemplate {
        ctx: PageContext::load(&session).await,
        order_id: order.id.as_i32(),
        total: order.total.to_string(),
        payment_method: order.payment_method.label().to_string(),
        shipping_address: order.shipping_address,
    }
    .into_response())
}

/// Complete the pending order. No money moves; this is a payment stub.
#[instrument(skip(state, session, user))]
pub async fn pay(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
) -> Result<Response> {
    let Some(order_id) = pending_order_id(&session).await else {
        return Ok(Redirect::to("/").into_response());
    };

    let result = OrderService::new(state.pool())
        .complete_payment(order_id, user.id)
        .await;
    session.remove::<OrderId>(keys::PENDING_ORDER_ID).await?;

    match result {
        Ok(()) => {
            flash_success(&session, "Payment successful! Thank you for your order.").await;
            Ok(Redirect::to(&format!("/orders/{order_id}")).into_response())
        }
        Err(OrderError::NotFound) => {
            flash_error(&session, "Order not found").await;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Order confirmation, visible to the order's owner only.
#[instrument(skip(state, session, user))]
pub async fn show_order(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(user): RequireShopper,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let found = OrderService::new(state.pool())
        .for_user(OrderId::new(id), user.id)
        .await
        .map_err(|e| match e {
            OrderError::NotFound => AppError::NotFound(format!("order {id}")),
            other => other.into(),
        })?;
    let order = found.order;

    Ok(OrderTemplate {
        ctx: PageContext::load(&session).await,
        order_id: order.id.as_i32(),
        status: order.status.to_string(),
        is_pending: order.status == bookstore_core::OrderStatus::Pending,
        total: order.total.to_string(),
        payment_method: order.payment_method.label().to_string(),
        shipping_address: order.shipping_address,
        created_at: format_date(order.created_at),
        items: found.items.iter().map(OrderItemView::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_options_cover_every_method() {
        let options = payment_options();
        assert_eq!(options.len(), PaymentMethod::ALL.len());
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.value == "paypal" && o.label == "PayPal"));
    }

    #[test]
    fn test_blank_payment_method_does_not_parse() {
        assert!("".parse::<PaymentMethod>().is_err());
        assert_eq!(
            "debit_card".parse::<PaymentMethod>().ok(),
            Some(PaymentMethod::DebitCard)
        );
    }
}
