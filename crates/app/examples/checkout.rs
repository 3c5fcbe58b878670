//! Checkout Walkthrough Example
//!
//! Places a cash-on-delivery order end to end against the in-memory store,
//! then cancels it and approves the refund, printing the invoice and the
//! operator's queue along the way.
//!
//! Run with `RUST_LOG=info` to see the services narrate each step.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use till::{
    address::AddressInfo,
    cart::{Cart, ProductView},
    checkout::CheckoutFlow,
    money::Amount,
    orders::PaymentMethod,
    refunds::RefundResolution,
};
use till_app::{
    config::Policies,
    context::AppContext,
    gateway::{CheckoutRequest, GatewayError, GatewayOutcome, PaymentGateway},
    identity::{Actor, StaticIdentity},
    memory::MemoryDocumentStore,
};
use tracing_subscriber::EnvFilter;

/// A gateway that approves every charge, for demonstration only.
struct AlwaysApprove;

#[async_trait]
impl PaymentGateway for AlwaysApprove {
    async fn collect(&self, request: CheckoutRequest) -> Result<GatewayOutcome, GatewayError> {
        Ok(GatewayOutcome::Success {
            transaction_ref: format!("demo_{}", request.amount_minor_units),
        })
    }
}

/// Checkout Walkthrough Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
#[tokio::main]
pub async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let meera = Actor::customer("user-1", "meera@example.com", "Meera Shah");
    let operator = Actor::operator("staff-1", "ops@example.com", "Ops Desk");

    let mut policies = Policies::default();
    policies.cod.ceiling = Amount::new(2000);

    let app = AppContext::new(
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(AlwaysApprove),
        Arc::new(StaticIdentity::signed_in(meera.clone())),
        policies,
    );

    // Two kettles at 700 each.
    let mut cart = Cart::default();
    cart.add(
        &ProductView {
            id: "sku-kettle".to_owned(),
            title: "Steel Kettle".to_owned(),
            price: Amount::new(700),
        },
        None,
        2,
    )?;
    println!("Cart subtotal: {}", cart.subtotal());

    // Walk the checkout to review and place the order as cash on delivery.
    let mut flow = CheckoutFlow::begin();
    flow.submit_address(AddressInfo {
        name: "Meera Shah".to_owned(),
        address: "14 Lake Road, Jaipur".to_owned(),
        state: "Rajasthan".to_owned(),
        pincode: "302001".to_owned(),
        phone_number: "9876543210".to_owned(),
    })?;
    flow.select_payment_method(PaymentMethod::CashOnDelivery)?;
    flow.proceed_to_review()?;

    let stored = app.submission.submit(&mut flow, &mut cart).await?;
    println!(
        "\nPlaced order #{} for {} ({})",
        stored.record.display_id, stored.record.total_amount, stored.record.payment_method
    );

    // The buyer's invoice.
    let invoice = app.orders.invoice(&meera, stored.uuid).await?;
    println!("\n{}", invoice.render());

    // Second thoughts: cancel and let the operator settle the refund.
    let refund = app.refunds.cancel_order(&meera, stored.uuid).await?;
    println!(
        "Cancelled order #{}; refund of {} is {}",
        refund.record.order_display_id, refund.record.refund_amount, refund.record.status
    );

    let resolved = app
        .refunds
        .resolve(&operator, refund.uuid, RefundResolution::Approve)
        .await?;
    println!(
        "Operator resolved the refund for order #{}: {}",
        resolved.record.order_display_id, resolved.record.status
    );

    Ok(())
}
