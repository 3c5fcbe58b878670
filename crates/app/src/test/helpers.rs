//! Test Helpers

use till::{
    address::AddressInfo,
    cart::{Cart, CartError, ProductView},
    checkout::{CheckoutError, CheckoutFlow},
    money::Amount,
    orders::PaymentMethod,
};

use crate::{
    config::Policies,
    gateway::{GatewayOutcome, MockPaymentGateway},
    identity::Actor,
    orders::{StoredOrder, SubmissionError},
    test::context::TestContext,
};

pub(crate) fn buyer_actor() -> Actor {
    Actor::customer("user-1", "meera@example.com", "Meera Shah")
}

pub(crate) fn operator_actor() -> Actor {
    Actor::operator("staff-1", "ops@example.com", "Ops Desk")
}

/// Default policies tightened to a 2000 cash-on-delivery ceiling and one
/// blocked pincode, so both refusal paths are reachable with small carts.
pub(crate) fn test_policies() -> Policies {
    let mut policies = Policies::default();
    policies.cod.ceiling = Amount::new(2000);
    policies.cod.blocked_pincodes.insert("110099".to_owned());

    policies
}

/// A gateway that approves everything with a fixed reference.
pub(crate) fn approving_gateway() -> MockPaymentGateway {
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_collect().returning(|_| {
        Ok(GatewayOutcome::Success {
            transaction_ref: "pay_test_1".to_owned(),
        })
    });

    gateway
}

pub(crate) fn kettle() -> ProductView {
    ProductView {
        id: "sku-kettle".to_owned(),
        title: "Steel Kettle".to_owned(),
        price: Amount::new(700),
    }
}

pub(crate) fn rajasthan_address() -> AddressInfo {
    AddressInfo {
        name: "Meera Shah".to_owned(),
        address: "14 Lake Road, Jaipur".to_owned(),
        state: "Rajasthan".to_owned(),
        pincode: "302001".to_owned(),
        phone_number: "9876543210".to_owned(),
    }
}

pub(crate) fn cart_with_kettles(quantity: u32) -> Result<Cart, CartError> {
    let mut cart = Cart::default();
    cart.add(&kettle(), None, quantity)?;

    Ok(cart)
}

/// A flow walked to the review step with the Rajasthan address.
pub(crate) fn flow_at_review(method: PaymentMethod) -> Result<CheckoutFlow, CheckoutError> {
    let mut flow = CheckoutFlow::begin();
    flow.submit_address(rajasthan_address())?;
    flow.select_payment_method(method)?;
    flow.proceed_to_review()?;

    Ok(flow)
}

/// Place an order for `kettles` kettles through the full submission path.
pub(crate) async fn place_order(
    ctx: &TestContext,
    kettles: u32,
    method: PaymentMethod,
) -> Result<StoredOrder, SubmissionError> {
    let mut cart = cart_with_kettles(kettles).expect("Failed to build the test cart");
    let mut flow = flow_at_review(method).expect("Failed to reach the review step");

    ctx.app.submission.submit(&mut flow, &mut cart).await
}
